use std::collections::HashMap;
use std::time::Duration;

use serde::{Deserialize, Serialize};

/// User-submitted channel configuration, keyed by each form field's
/// `db_field`.
pub type Values = HashMap<String, String>;

/// Describes one user-editable field in a channel's settings form, used to
/// dynamically generate the UI.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct NotificationForm {
    #[serde(rename = "type")]
    pub field_type: String,
    pub title: String,
    pub placeholder: String,
    pub db_field: String,
    pub required: bool,
}

/// Descriptor for one notification channel: static identity plus the two
/// mutable template strings and the destination configuration.
///
/// Constructed once at startup from the channel's defaults, then overlaid
/// with user configuration loaded from storage. The host must serialize
/// configuration updates against in-flight sends; channels only ever read
/// these fields.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Notification {
    pub method: String,
    pub title: String,
    pub description: String,
    pub author: String,
    pub author_url: String,
    pub icon: String,
    /// Default pause between consecutive sends. Enforced by the host
    /// scheduler, declared here.
    #[serde(with = "humantime_serde")]
    pub delay: Duration,
    /// Maximum sends per window. Also enforced by the host scheduler.
    pub limits: u32,
    pub form: Vec<NotificationForm>,
    /// Template rendered when a service recovers. Opaque to the channel.
    pub success_data: String,
    /// Template rendered when a service goes down. Opaque to the channel.
    pub failure_data: String,
    /// Wire format of the rendered templates, e.g. "json".
    pub data_type: String,
    /// Destination webhook URL, stored under form field key "host". The URL
    /// itself carries the embedded secret; there is no other auth.
    pub host: String,
}

impl Notification {
    /// Overlays user-submitted values onto the descriptor. Unknown keys are
    /// ignored; only fields declared in the form are applied.
    pub fn apply_values(&mut self, values: &Values) {
        if let Some(host) = values.get("host") {
            self.host = host.clone();
        }
        if let Some(success) = values.get("success_data") {
            self.success_data = success.clone();
        }
        if let Some(failure) = values.get("failure_data") {
            self.failure_data = failure.clone();
        }
    }
}
