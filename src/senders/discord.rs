use std::sync::Arc;
use std::time::Duration;

use async_trait::async_trait;
use serde::Deserialize;

use super::{Notifier, NotifierError};
use crate::http::HttpPoster;
use crate::models::{CoreInfo, Failure, Service};
use crate::notification::{Notification, NotificationForm, Values};
use crate::templating;

const TEST_PAYLOAD: &str = r#"{"content": "Testing the discord notifier"}"#;

const SUCCESS_TEMPLATE: &str = r#"{
  "embeds": [
    {
      "title": "{{ service_name }} is back up",
      "description": "Your service ['{{ service_name }}']({{ service_domain }}) is currently back online and was down for {{ service_downtime }}.",
      "url": "{{ service_domain }}",
      "color": 8311585,
      "footer": {
        "text": "{{ core_name }} Version {{ core_version }}"
      },
      "author": {
        "name": "{{ core_name }}",
        "url": "{{ core_domain }}"
      },
      "fields": [
        {
          "name": "Last Online",
          "value": "{{ service_last_online }}",
          "inline": true
        },
        {
          "name": "Last Offline",
          "value": "{{ service_last_offline }}",
          "inline": true
        },
        {
          "name": "Failures 24 Hours",
          "value": "{{ service_failures_24h }}",
          "inline": true
        }
      ]
    }
  ]
}"#;

const FAILURE_TEMPLATE: &str = r#"{
  "embeds": [
    {
      "title": "Your service '{{ service_name }}' is failing",
      "description": "Your service ['{{ service_name }}']({{ service_domain }}) is currently offline for {{ service_downtime }}!",
      "url": "{{ service_domain }}",
      "color": 13632027,
      "footer": {
        "text": "{{ core_name }} Version {{ core_version }}"
      },
      "author": {
        "name": "{{ core_name }}",
        "url": "{{ core_domain }}"
      },
      "fields": [
        {
          "name": "Downtime Start",
          "value": "{{ failure_downtime_ago }}"
        },
        {
          "name": "Reason",
          "value": "{{ failure_issue }}",
          "inline": true
        },
        {
          "name": "Ping",
          "value": "{{ failure_ping }}",
          "inline": true
        },
        {
          "name": "Failures 24 Hours",
          "value": "{{ service_failures_24h }}",
          "inline": true
        }
      ]
    }
  ]
}"#;

/// Discord's error envelope on rejected webhook calls. Both fields default
/// so an absent `code` decodes to zero.
#[derive(Debug, Deserialize)]
struct TestResponse {
    #[serde(default)]
    code: i64,
    #[serde(default)]
    #[allow(dead_code)]
    message: String,
}

/// Webhook channel for Discord. Renders one of two embed templates and
/// POSTs it to the user-configured webhook URL.
pub struct DiscordNotifier {
    notification: Notification,
    core: CoreInfo,
    http: Arc<dyn HttpPoster>,
}

impl DiscordNotifier {
    pub fn new(notification: Notification, core: CoreInfo, http: Arc<dyn HttpPoster>) -> Self {
        Self {
            notification,
            core,
            http,
        }
    }

    /// The channel's immutable default descriptor. The host overlays stored
    /// user configuration on a clone of this before constructing the channel.
    pub fn default_notification() -> Notification {
        Notification {
            method: "discord".to_string(),
            title: "Discord".to_string(),
            description: "Send notifications to your discord channel using discord webhooks. \
                          Insert your discord channel Webhook URL to receive notifications."
                .to_string(),
            author: "PulseWatch".to_string(),
            author_url: "https://github.com/pulsewatch".to_string(),
            icon: "fab fa-discord".to_string(),
            delay: Duration::from_secs(5),
            limits: 60,
            form: vec![NotificationForm {
                field_type: "text".to_string(),
                title: "discord webhooker URL".to_string(),
                placeholder: "https://discordapp.com/api/webhooks/****/*****".to_string(),
                db_field: "host".to_string(),
                required: false,
            }],
            success_data: SUCCESS_TEMPLATE.to_string(),
            failure_data: FAILURE_TEMPLATE.to_string(),
            data_type: "json".to_string(),
            host: String::new(),
        }
    }

    async fn send_request(&self, msg: String) -> Result<String, NotifierError> {
        let body = self.http.post_json(&self.notification.host, msg).await?;
        Ok(body)
    }
}

#[async_trait]
impl Notifier for DiscordNotifier {
    fn select(&self) -> &Notification {
        &self.notification
    }

    /// Deliberately accepts any configuration, including an empty or
    /// malformed URL. A bad URL surfaces through `on_test` instead.
    fn validate(&self, _values: &Values) -> Result<(), NotifierError> {
        Ok(())
    }

    async fn on_failure(
        &self,
        service: &Service,
        failure: &Failure,
    ) -> Result<String, NotifierError> {
        let context = templating::build_context(service, failure, &self.core);
        let msg = templating::render(&self.notification.failure_data, &context)?;
        self.send_request(msg).await
    }

    async fn on_success(&self, service: &Service) -> Result<String, NotifierError> {
        let context = templating::build_context(service, &Failure::default(), &self.core);
        let msg = templating::render(&self.notification.success_data, &context)?;
        self.send_request(msg).await
    }

    async fn on_save(&self) -> Result<(), NotifierError> {
        Ok(())
    }

    /// Interprets the webhook backend's answer to a fixed test payload.
    /// An empty body is a success: Discord answers 204 with no body on
    /// delivery. Otherwise the body must decode as the error envelope with
    /// a non-zero `code`; anything else means the URL is wrong.
    async fn on_test(&self) -> Result<String, NotifierError> {
        let contents = self
            .http
            .post_json(&self.notification.host, TEST_PAYLOAD.to_string())
            .await?;

        if contents.is_empty() {
            return Ok(String::new());
        }
        let decoded: TestResponse = match serde_json::from_str(&contents) {
            Ok(d) => d,
            Err(_) => return Err(NotifierError::IncorrectUrl { body: contents }),
        };
        if decoded.code == 0 {
            return Err(NotifierError::IncorrectUrl { body: contents });
        }
        Ok(contents)
    }
}

#[cfg(test)]
mod tests {
    use std::sync::Mutex;

    use chrono::Utc;

    use super::*;
    use crate::http::HttpError;

    /// Stub poster returning a canned response and recording every request.
    struct StubPoster {
        response: Result<String, ()>,
        requests: Mutex<Vec<(String, String)>>,
    }

    impl StubPoster {
        fn ok(body: &str) -> Self {
            Self {
                response: Ok(body.to_string()),
                requests: Mutex::new(Vec::new()),
            }
        }

        fn transport_error() -> Self {
            Self {
                response: Err(()),
                requests: Mutex::new(Vec::new()),
            }
        }
    }

    #[async_trait]
    impl HttpPoster for StubPoster {
        async fn post_json(&self, url: &str, body: String) -> Result<String, HttpError> {
            self.requests
                .lock()
                .unwrap()
                .push((url.to_string(), body));
            match &self.response {
                Ok(b) => Ok(b.clone()),
                Err(()) => Err(HttpError::Timeout),
            }
        }
    }

    fn notifier(stub: Arc<StubPoster>) -> DiscordNotifier {
        let mut notification = DiscordNotifier::default_notification();
        notification.host = "https://discordapp.com/api/webhooks/1/secret".to_string();
        DiscordNotifier::new(notification, CoreInfo::default(), stub)
    }

    fn service() -> Service {
        Service {
            name: "api".to_string(),
            domain: "https://api.example.com".to_string(),
            last_online: Some(Utc::now()),
            last_offline: Some(Utc::now()),
            downtime: Duration::from_secs(120),
            failures_last_24_hours: 4,
        }
    }

    fn failure() -> Failure {
        Failure {
            issue: "connection refused".to_string(),
            ping: Duration::from_millis(250),
            downtime_started: Some(Utc::now() - chrono::Duration::minutes(2)),
        }
    }

    #[tokio::test]
    async fn on_failure_substitutes_all_placeholders() {
        let stub = Arc::new(StubPoster::ok(""));
        let n = notifier(stub.clone());

        n.on_failure(&service(), &failure()).await.unwrap();

        let requests = stub.requests.lock().unwrap();
        let (url, body) = &requests[0];
        assert_eq!(url, "https://discordapp.com/api/webhooks/1/secret");
        assert!(body.contains("api"));
        assert!(body.contains("connection refused"));
        assert!(body.contains("250ms"));
        assert!(!body.contains("{{"), "unresolved token in: {body}");
    }

    #[tokio::test]
    async fn on_success_renders_with_zero_failure() {
        let stub = Arc::new(StubPoster::ok(""));
        let n = notifier(stub.clone());

        n.on_success(&service()).await.unwrap();

        let requests = stub.requests.lock().unwrap();
        let (_, body) = &requests[0];
        assert!(body.contains("api is back up"));
        assert!(!body.contains("{{"));
    }

    #[tokio::test]
    async fn on_failure_returns_raw_response_body() {
        let stub = Arc::new(StubPoster::ok("delivered"));
        let n = notifier(stub);
        let out = n.on_failure(&service(), &failure()).await.unwrap();
        assert_eq!(out, "delivered");
    }

    #[tokio::test]
    async fn on_test_empty_body_is_success() {
        let stub = Arc::new(StubPoster::ok(""));
        let n = notifier(stub.clone());
        let out = n.on_test().await.unwrap();
        assert_eq!(out, "");
        let requests = stub.requests.lock().unwrap();
        assert_eq!(requests[0].1, TEST_PAYLOAD);
    }

    #[tokio::test]
    async fn on_test_nonzero_code_is_success() {
        let stub = Arc::new(StubPoster::ok(r#"{"code":1,"message":"ok"}"#));
        let n = notifier(stub);
        let out = n.on_test().await.unwrap();
        assert_eq!(out, r#"{"code":1,"message":"ok"}"#);
    }

    #[tokio::test]
    async fn on_test_absent_code_is_incorrect_url() {
        let stub = Arc::new(StubPoster::ok(r#"{"message":"bad"}"#));
        let n = notifier(stub);
        let err = n.on_test().await.unwrap_err();
        match err {
            NotifierError::IncorrectUrl { body } => {
                assert_eq!(body, r#"{"message":"bad"}"#);
            }
            other => panic!("expected IncorrectUrl, got {other:?}"),
        }
        assert_eq!(
            NotifierError::IncorrectUrl { body: String::new() }.to_string(),
            "incorrect URL, please confirm URL is correct"
        );
    }

    #[tokio::test]
    async fn on_test_non_json_body_is_incorrect_url() {
        let stub = Arc::new(StubPoster::ok("oops"));
        let n = notifier(stub);
        let err = n.on_test().await.unwrap_err();
        match err {
            NotifierError::IncorrectUrl { body } => assert_eq!(body, "oops"),
            other => panic!("expected IncorrectUrl, got {other:?}"),
        }
    }

    #[tokio::test]
    async fn on_test_transport_error_propagates() {
        let stub = Arc::new(StubPoster::transport_error());
        let n = notifier(stub);
        let err = n.on_test().await.unwrap_err();
        assert!(matches!(err, NotifierError::Http(HttpError::Timeout)));
    }

    #[tokio::test]
    async fn validate_accepts_anything() {
        let n = notifier(Arc::new(StubPoster::ok("")));
        assert!(n.validate(&Values::new()).is_ok());

        let mut garbage = Values::new();
        garbage.insert("host".to_string(), "not a url at all".to_string());
        garbage.insert("unrelated".to_string(), "\0\u{fffd}".to_string());
        assert!(n.validate(&garbage).is_ok());
    }

    #[tokio::test]
    async fn on_save_is_a_noop() {
        let n = notifier(Arc::new(StubPoster::ok("")));
        assert!(n.on_save().await.is_ok());
    }

    #[test]
    fn default_descriptor_declares_host_field() {
        let n = DiscordNotifier::default_notification();
        assert_eq!(n.method, "discord");
        assert_eq!(n.delay, Duration::from_secs(5));
        assert_eq!(n.limits, 60);
        assert_eq!(n.data_type, "json");
        assert_eq!(n.form.len(), 1);
        assert_eq!(n.form[0].db_field, "host");
        assert!(!n.form[0].required);
    }
}
