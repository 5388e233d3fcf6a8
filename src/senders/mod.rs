use async_trait::async_trait;
use thiserror::Error;

use crate::http::HttpError;
use crate::models::{Failure, Service};
use crate::notification::{Notification, Values};

pub mod discord;

#[derive(Error, Debug)]
pub enum NotifierError {
    #[error("network error: {0}")]
    Http(#[from] HttpError),
    #[error("templating error: {0}")]
    Template(String),
    /// The webhook backend rejected the test payload, or answered with
    /// something that is not its error envelope. The raw response body is
    /// kept for diagnostics.
    #[error("incorrect URL, please confirm URL is correct")]
    IncorrectUrl { body: String },
}

/// The capability contract every notification channel implements. The host
/// dispatcher calls `on_failure` / `on_success` on service transitions,
/// `on_test` from the settings UI, and `validate` / `on_save` around
/// configuration persistence.
///
/// Channels are stateless per call; retry, backoff and rate limiting belong
/// to the host.
#[async_trait]
pub trait Notifier: Send + Sync {
    /// Returns the channel's descriptor. No side effects, cannot fail.
    fn select(&self) -> &Notification;

    /// Checks user-submitted configuration before it is persisted.
    fn validate(&self, values: &Values) -> Result<(), NotifierError>;

    /// Invoked when a monitored service becomes unreachable.
    async fn on_failure(
        &self,
        service: &Service,
        failure: &Failure,
    ) -> Result<String, NotifierError>;

    /// Invoked when a monitored service recovers.
    async fn on_success(&self, service: &Service) -> Result<String, NotifierError>;

    /// Invoked after the channel's configuration has been persisted.
    async fn on_save(&self) -> Result<(), NotifierError>;

    /// Connectivity test invoked from the settings UI.
    async fn on_test(&self) -> Result<String, NotifierError>;
}
