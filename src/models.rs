use std::time::Duration;

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

/// Read-only snapshot of a monitored service, supplied by the caller per
/// notification event. Channels never mutate or retain it.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Service {
    pub name: String,
    pub domain: String,
    pub last_online: Option<DateTime<Utc>>,
    pub last_offline: Option<DateTime<Utc>>,
    /// How long the service has been in its current down state. Zero when up.
    #[serde(with = "humantime_serde")]
    pub downtime: Duration,
    pub failures_last_24_hours: u64,
}

/// Read-only view of a single detected failure event. The zero-valued
/// `Default` is what recovery notifications render against.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Failure {
    pub issue: String,
    /// Measured latency of the failing check. Zero when unknown.
    #[serde(default, with = "humantime_serde")]
    pub ping: Duration,
    pub downtime_started: Option<DateTime<Utc>>,
}

/// Identity of the host system, used for template placeholders like the
/// payload footer ("PulseWatch Version x.y.z").
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct CoreInfo {
    pub app_name: String,
    pub domain: String,
    pub version: String,
}

impl Default for CoreInfo {
    fn default() -> Self {
        Self {
            app_name: "PulseWatch".to_string(),
            domain: String::new(),
            version: env!("CARGO_PKG_VERSION").to_string(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn default_failure_is_zero_valued() {
        let f = Failure::default();
        assert!(f.issue.is_empty());
        assert_eq!(f.ping, Duration::ZERO);
        assert!(f.downtime_started.is_none());
    }

    #[test]
    fn service_roundtrips_through_json() {
        let s = Service {
            name: "api".to_string(),
            domain: "https://api.example.com".to_string(),
            last_online: Some(Utc::now()),
            last_offline: None,
            downtime: Duration::from_secs(90),
            failures_last_24_hours: 3,
        };
        let json = serde_json::to_string(&s).unwrap();
        let back: Service = serde_json::from_str(&json).unwrap();
        assert_eq!(back.name, "api");
        assert_eq!(back.downtime, Duration::from_secs(90));
        assert_eq!(back.failures_last_24_hours, 3);
    }
}
