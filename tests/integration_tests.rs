//! Integration tests for update-reporter
//!
//! These tests verify:
//! - Wire formats posted by each service against a mock HTTP server
//! - Report status lines and failure handling
//! - Reporter runs across multiple services configured by manifest and environment

use async_trait::async_trait;
use serde_json::{json, Value};
use std::sync::{Arc, Mutex};
use update_reporter::config::{Configuration, MapEnvironment, ProjectMetadata};
use update_reporter::domain::{OutdatedPackage, UpdateCheckResult};
use update_reporter::error::TransportError;
use update_reporter::options::Options;
use update_reporter::output::{BufferOutput, OutputBehavior, Style, Verbosity};
use update_reporter::registry::Registry;
use update_reporter::reporter::{Reporter, ServiceStatus};
use update_reporter::service::{
    BetterUptime, Email, GitLab, Mattermost, NotificationService, Slack, Teams, Webhook,
};
use update_reporter::transport::{MailMessage, MailTransport};
use wiremock::matchers::{header, method, path};
use wiremock::{Mock, MockServer, ResponseTemplate};

/// Single secure package used by most scenarios
fn one_package() -> UpdateCheckResult {
    UpdateCheckResult::new(vec![OutdatedPackage::new("foo/foo", "1.0.0", "1.0.5")])
}

/// Behavior writing into a buffer
fn buffered(style: Style) -> (OutputBehavior, Arc<BufferOutput>) {
    let buffer = Arc::new(BufferOutput::new());
    (
        OutputBehavior::new(style, Verbosity::Normal, buffer.clone()),
        buffer,
    )
}

/// Mock server answering every POST with the given status
async fn mock_server(status: u16) -> MockServer {
    let server = MockServer::start().await;
    Mock::given(method("POST"))
        .respond_with(ResponseTemplate::new(status))
        .mount(&server)
        .await;
    server
}

/// Bodies of all requests received by the server
async fn received_bodies(server: &MockServer) -> Vec<Vec<u8>> {
    server
        .received_requests()
        .await
        .unwrap_or_default()
        .into_iter()
        .map(|r| r.body)
        .collect()
}

mod gitlab_service {
    use super::*;

    #[tokio::test]
    async fn test_report_posts_exact_payload() {
        let server = MockServer::start().await;
        Mock::given(method("POST"))
            .and(header("authorization", "Bearer foo"))
            .and(header("accept", "application/json"))
            .respond_with(ResponseTemplate::new(200))
            .expect(1)
            .mount(&server)
            .await;

        let service = GitLab::new(&server.uri(), "foo").unwrap();
        let (behavior, buffer) = buffered(Style::Normal);

        assert!(service.report(&one_package(), &behavior, &Options::new()).await);

        let bodies = received_bodies(&server).await;
        assert_eq!(
            String::from_utf8(bodies[0].clone()).unwrap(),
            r#"{"title":"1 outdated package","foo/foo":"Outdated version: 1.0.0, new version: 1.0.5"}"#
        );
        assert!(buffer.output().contains("Sending report to GitLab..."));
        assert!(buffer.output().contains("GitLab report was successful"));
    }

    #[tokio::test]
    async fn test_report_marks_insecure_packages() {
        let server = mock_server(200).await;
        let service = GitLab::new(&server.uri(), "foo").unwrap();
        let result = UpdateCheckResult::new(vec![
            OutdatedPackage::new("foo/foo", "1.0.0", "1.0.5").with_insecure(true)
        ]);

        assert!(service.report(&result, &OutputBehavior::default(), &Options::new()).await);

        let body: Value = serde_json::from_slice(&received_bodies(&server).await[0]).unwrap();
        assert_eq!(
            body["foo/foo"],
            "Outdated version: 1.0.0 (insecure), new version: 1.0.5"
        );
    }

    #[tokio::test]
    async fn test_not_found_response_fails_report() {
        let server = mock_server(404).await;
        let service = GitLab::new(&server.uri(), "foo").unwrap();
        let (behavior, buffer) = buffered(Style::Normal);

        assert!(!service.report(&one_package(), &behavior, &Options::new()).await);

        let errors = buffer.errors();
        assert_eq!(errors.len(), 1);
        assert!(errors[0].contains("Error during GitLab report"));
        assert!(!buffer.output().contains("was successful"));
    }
}

mod skipped_reports {
    use super::*;

    #[tokio::test]
    async fn test_empty_result_sends_nothing() {
        let server = mock_server(200).await;
        let (behavior, buffer) = buffered(Style::Normal);
        let services: Vec<Box<dyn NotificationService>> = vec![
            Box::new(GitLab::new(&server.uri(), "foo").unwrap()),
            Box::new(Slack::new(&server.uri()).unwrap()),
            Box::new(Teams::new(&server.uri()).unwrap()),
            Box::new(Mattermost::new(&server.uri(), "foo", None).unwrap()),
            Box::new(Webhook::new(&server.uri(), None).unwrap()),
        ];

        for service in &services {
            assert!(
                service
                    .report(&UpdateCheckResult::default(), &behavior, &Options::new())
                    .await
            );
        }

        assert!(received_bodies(&server).await.is_empty());
        assert!(buffer.output().contains("Skipped Slack report"));
        assert!(buffer.output().contains("Skipped MS Teams report"));
    }

    #[tokio::test]
    async fn test_skip_line_suppressed_in_json_style() {
        let server = mock_server(200).await;
        let (behavior, buffer) = buffered(Style::Json);
        let service = Slack::new(&server.uri()).unwrap();

        assert!(
            service
                .report(&UpdateCheckResult::default(), &behavior, &Options::new())
                .await
        );
        assert!(buffer.lines().is_empty());
    }
}

mod slack_service {
    use super::*;

    #[tokio::test]
    async fn test_fifty_packages_are_truncated() {
        let server = mock_server(200).await;
        let service = Slack::new(&server.uri()).unwrap();
        let packages = (0..50)
            .map(|_| OutdatedPackage::new("foo/foo", "1.0.0", "1.0.5"))
            .collect();

        assert!(
            service
                .report(
                    &UpdateCheckResult::new(packages),
                    &OutputBehavior::default(),
                    &Options::new()
                )
                .await
        );

        let body: Value = serde_json::from_slice(&received_bodies(&server).await[0]).unwrap();
        let blocks = body["blocks"].as_array().unwrap();
        let rows = blocks.iter().filter(|b| b.get("fields").is_some()).count();

        assert_eq!(blocks[0]["text"]["text"], "50 outdated packages");
        assert_eq!(rows, 47);
        assert_eq!(blocks.last().unwrap()["text"]["text"], "... and 3 more");
    }

    #[tokio::test]
    async fn test_server_error_fails_report() {
        let server = mock_server(500).await;
        let service = Slack::new(&server.uri()).unwrap();
        let (behavior, buffer) = buffered(Style::Json);

        assert!(!service.report(&one_package(), &behavior, &Options::new()).await);
        assert!(buffer.errors()[0].contains("Error during Slack report"));
    }
}

mod teams_service {
    use super::*;

    #[tokio::test]
    async fn test_report_posts_message_card() {
        let server = mock_server(200).await;
        let service = Teams::new(&server.uri()).unwrap();
        let options = Options::new().with_project_name("foo/baz");

        assert!(service.report(&one_package(), &OutputBehavior::default(), &options).await);

        let body: Value = serde_json::from_slice(&received_bodies(&server).await[0]).unwrap();
        assert_eq!(body["title"], "🚨 1 outdated package @ foo/baz");
        assert_eq!(body["summary"], "1 package is outdated");
    }
}

mod mattermost_service {
    use super::*;

    #[tokio::test]
    async fn test_report_posts_attachment() {
        let server = mock_server(200).await;
        let service = Mattermost::new(&server.uri(), "foo", Some("baz".to_string())).unwrap();

        assert!(
            service
                .report(&one_package(), &OutputBehavior::default(), &Options::new())
                .await
        );

        let body: Value = serde_json::from_slice(&received_bodies(&server).await[0]).unwrap();
        assert_eq!(body["channel"], "foo");
        assert_eq!(body["username"], "baz");
        assert_eq!(body["attachments"][0]["color"], "#EE0000");
        assert!(body["attachments"][0]["text"]
            .as_str()
            .unwrap()
            .starts_with("#### :rotating_light: 1 outdated package"));
    }
}

mod better_uptime_service {
    use super::*;

    #[tokio::test]
    async fn test_report_opens_incident() {
        let server = MockServer::start().await;
        Mock::given(method("POST"))
            .and(path("/api/v1/incident"))
            .and(header("authorization", "Bearer foo"))
            .respond_with(ResponseTemplate::new(201))
            .expect(1)
            .mount(&server)
            .await;

        let url = format!("{}/api/v1/incident", server.uri());
        let options = json!({"urgency": "high", "summary": "ignored"});
        let service = BetterUptime::new(
            "foo",
            "baz@example.org",
            options.as_object().unwrap().clone(),
            Some(&url),
        )
        .unwrap();

        assert!(
            service
                .report(&one_package(), &OutputBehavior::default(), &Options::new())
                .await
        );

        let body: Value = serde_json::from_slice(&received_bodies(&server).await[0]).unwrap();
        assert_eq!(
            body,
            json!({
                "requester_email": "baz@example.org",
                "summary": "1 outdated package",
                "description": "foo/foo (1.0.0 => 1.0.5)",
                "urgency": "high",
            })
        );
    }
}

mod webhook_service {
    use super::*;

    #[tokio::test]
    async fn test_report_posts_document_with_token() {
        let server = MockServer::start().await;
        Mock::given(method("POST"))
            .and(path("/hook"))
            .and(header("authorization", "Bearer secret"))
            .respond_with(ResponseTemplate::new(204))
            .expect(1)
            .mount(&server)
            .await;

        let url = format!("{}/hook", server.uri());
        let service = Webhook::new(&url, Some("secret".to_string())).unwrap();

        assert!(
            service
                .report(&one_package(), &OutputBehavior::default(), &Options::new())
                .await
        );

        let body: Value = serde_json::from_slice(&received_bodies(&server).await[0]).unwrap();
        assert_eq!(body["title"], "1 outdated package");
        assert_eq!(body["packages"][0]["name"], "foo/foo");
        assert!(body.get("project").is_none());
    }
}

mod email_service {
    use super::*;

    /// Mail transport recording every message
    #[derive(Default)]
    struct RecordingTransport {
        messages: Mutex<Vec<MailMessage>>,
        fail: bool,
    }

    #[async_trait]
    impl MailTransport for RecordingTransport {
        async fn send(&self, message: &MailMessage) -> Result<(), TransportError> {
            if self.fail {
                return Err(TransportError::mail("test", "connection refused"));
            }
            self.messages.lock().unwrap().push(message.clone());
            Ok(())
        }
    }

    fn email(transport: Arc<RecordingTransport>) -> Email {
        Email::new(
            "smtp://localhost:1025",
            vec!["foo@example.org".to_string()],
            "baz@example.org",
        )
        .unwrap()
        .with_transport(transport)
    }

    #[tokio::test]
    async fn test_report_sends_mail() {
        let transport = Arc::new(RecordingTransport::default());
        let (behavior, buffer) = buffered(Style::Normal);
        let options = Options::new().with_project_name("foo/baz");

        assert!(email(transport.clone()).report(&one_package(), &behavior, &options).await);

        let messages = transport.messages.lock().unwrap();
        assert_eq!(messages.len(), 1);
        assert_eq!(messages[0].subject, "1 outdated package @ foo/baz");
        assert_eq!(messages[0].to, vec!["foo@example.org"]);
        assert!(buffer.output().contains("E-mail report was successful"));
    }

    #[tokio::test]
    async fn test_transport_failure_fails_report() {
        let transport = Arc::new(RecordingTransport {
            fail: true,
            ..Default::default()
        });
        let (behavior, buffer) = buffered(Style::Normal);

        assert!(!email(transport).report(&one_package(), &behavior, &Options::new()).await);
        assert!(buffer.errors()[0].contains("Error during E-mail report"));
        assert!(buffer.errors()[0].contains("connection refused"));
    }

    #[tokio::test]
    async fn test_empty_result_sends_no_mail() {
        let transport = Arc::new(RecordingTransport::default());
        assert!(
            email(transport.clone())
                .report(
                    &UpdateCheckResult::default(),
                    &OutputBehavior::default(),
                    &Options::new()
                )
                .await
        );
        assert!(transport.messages.lock().unwrap().is_empty());
    }
}

mod reporter_runs {
    use super::*;

    #[tokio::test]
    async fn test_reporter_dispatches_configured_services() {
        let server = mock_server(200).await;
        let configuration = Configuration::new()
            .with_service("slack", json!({"enable": true, "url": server.uri()}))
            .with_service("teams", json!({"enable": false, "url": server.uri()}));
        let env = MapEnvironment::new()
            .with("GITLAB_ENABLE", "1")
            .with("GITLAB_URL", server.uri())
            .with("GITLAB_AUTH_KEY", "foo");

        let mut reporter = Reporter::new(ProjectMetadata::new(
            Some("foo/baz".to_string()),
            configuration,
        ))
        .with_environment(Arc::new(env));
        let (behavior, buffer) = buffered(Style::Normal);
        reporter.set_behavior(behavior);

        let summary = reporter.report(&one_package()).await;

        let ids: Vec<&str> = summary
            .outcomes()
            .iter()
            .map(|o| o.identifier.as_str())
            .collect();
        assert_eq!(ids, vec!["gitlab", "slack"]);
        assert!(summary.all_succeeded());
        assert_eq!(received_bodies(&server).await.len(), 2);
        assert!(buffer.output().contains("Slack report was successful"));

        let gitlab: Value = serde_json::from_slice(&received_bodies(&server).await[0]).unwrap();
        assert_eq!(gitlab["title"], "1 outdated package @ foo/baz");
    }

    #[tokio::test]
    async fn test_environment_disable_overrides_configuration() {
        let server = mock_server(200).await;
        let configuration = Configuration::new()
            .with_service("slack", json!({"enable": true, "url": server.uri()}));
        let env = MapEnvironment::new().with("SLACK_ENABLE", "0");

        let reporter = Reporter::new(ProjectMetadata::new(None, configuration))
            .with_environment(Arc::new(env));
        let summary = reporter.report(&one_package()).await;

        assert!(summary.is_empty());
        assert!(received_bodies(&server).await.is_empty());
    }

    #[tokio::test]
    async fn test_one_failing_service_does_not_stop_others() {
        let failing = mock_server(404).await;
        let working = mock_server(200).await;
        let configuration = Configuration::new()
            .with_service(
                "mattermost",
                json!({"enable": true, "url": failing.uri(), "channel": "foo"}),
            )
            .with_service("slack", json!({"enable": true}))
            .with_service("teams", json!({"enable": true, "url": working.uri()}));

        let mut reporter = Reporter::new(ProjectMetadata::new(None, configuration))
            .with_environment(Arc::new(MapEnvironment::new()));
        let (behavior, buffer) = buffered(Style::Normal);
        reporter.set_behavior(behavior);

        let summary = reporter.report(&one_package()).await;

        assert_eq!(summary.get("mattermost").unwrap().status, ServiceStatus::Failed);
        assert!(matches!(
            summary.get("slack").unwrap().status,
            ServiceStatus::SetupFailed(_)
        ));
        assert_eq!(summary.get("teams").unwrap().status, ServiceStatus::Succeeded);
        assert_eq!(summary.failed().count(), 2);
        assert_eq!(buffer.errors().len(), 2);
        assert_eq!(received_bodies(&working).await.len(), 1);
    }

    #[tokio::test]
    async fn test_restricted_registry() {
        let server = mock_server(200).await;
        let configuration = Configuration::new()
            .with_service("slack", json!({"enable": true, "url": server.uri()}))
            .with_service("teams", json!({"enable": true, "url": server.uri()}));

        let mut registry = Registry::new();
        registry.register_identifier("teams").unwrap();
        let reporter = Reporter::new(ProjectMetadata::new(None, configuration))
            .with_environment(Arc::new(MapEnvironment::new()))
            .with_registry(registry);

        let summary = reporter.report(&one_package()).await;
        assert_eq!(summary.outcomes().len(), 1);
        assert_eq!(summary.outcomes()[0].name, "MS Teams");
    }
}
