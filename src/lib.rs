//! Notification channel adapters for the PulseWatch uptime monitor.
//!
//! Each channel implements the [`senders::Notifier`] capability contract and
//! is driven by the host's dispatch loop: the scheduler detects a service
//! up/down transition, then calls `on_failure` / `on_success` on every
//! configured channel. Channels render an opaque JSON template against the
//! current [`models::Service`] / [`models::Failure`] views and deliver it
//! with a single bounded HTTP POST. Retry, backoff and rate limiting are
//! owned by the host, not by the channels.

pub mod http;
pub mod models;
pub mod notification;
pub mod senders;
pub mod templating;
