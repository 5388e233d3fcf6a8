use std::collections::HashMap;

use chrono::{DateTime, Utc};
use tera::{Context, Tera};

use crate::models::{CoreInfo, Failure, Service};
use crate::senders::NotifierError;

fn format_timestamp(ts: Option<DateTime<Utc>>) -> String {
    ts.map(|t| t.format("%Y-%m-%d %H:%M:%S UTC").to_string())
        .unwrap_or_default()
}

/// Flattens the per-event views into the string placeholders available to
/// channel templates. Zero-valued failure fields become empty/zero strings
/// so recovery templates render cleanly against `Failure::default()`.
pub fn build_context(
    service: &Service,
    failure: &Failure,
    core: &CoreInfo,
) -> HashMap<String, String> {
    let downtime_ago = failure
        .downtime_started
        .map(|start| {
            let since = (Utc::now() - start).to_std().unwrap_or_default();
            // Truncate to whole seconds so payloads stay readable.
            let since = std::time::Duration::from_secs(since.as_secs());
            format!("{} ago", humantime::format_duration(since))
        })
        .unwrap_or_default();

    let mut context = HashMap::new();
    context.insert("service_name".to_string(), service.name.clone());
    context.insert("service_domain".to_string(), service.domain.clone());
    context.insert(
        "service_downtime".to_string(),
        humantime::format_duration(service.downtime).to_string(),
    );
    context.insert(
        "service_last_online".to_string(),
        format_timestamp(service.last_online),
    );
    context.insert(
        "service_last_offline".to_string(),
        format_timestamp(service.last_offline),
    );
    context.insert(
        "service_failures_24h".to_string(),
        service.failures_last_24_hours.to_string(),
    );
    context.insert("failure_issue".to_string(), failure.issue.clone());
    context.insert(
        "failure_ping".to_string(),
        humantime::format_duration(failure.ping).to_string(),
    );
    context.insert("failure_downtime_ago".to_string(), downtime_ago);
    context.insert("core_name".to_string(), core.app_name.clone());
    context.insert("core_domain".to_string(), core.domain.clone());
    context.insert("core_version".to_string(), core.version.clone());
    context
}

/// Renders one opaque template against a flat placeholder map. The template
/// contents are never inspected beyond this render.
pub fn render(template: &str, context: &HashMap<String, String>) -> Result<String, NotifierError> {
    let mut tera_context = Context::new();
    for (key, value) in context {
        tera_context.insert(key, value);
    }
    Tera::one_off(template, &tera_context, false)
        .map_err(|e| NotifierError::Template(e.to_string()))
}
