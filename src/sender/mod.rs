//! Real mail through the configured backends, SES first with SMTP as the
//! fallback.

mod error;

pub use error::SenderError;

use tracing::{debug, info, warn};

use crate::address::is_valid_format;
use crate::config::MailerConfig;
use crate::delivery::{
    self, BackendKind, BackendSet, DeliveryError, OutgoingEmail, SendResult,
};

/// How [`EmailSender::send`] picks a backend.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub enum BackendPreference {
    /// Configured backends in order until one accepts the message.
    #[default]
    Auto,
    /// Exactly this backend, no fallback.
    Only(BackendKind),
}

/// Connectivity of one backend.
#[cfg_attr(feature = "with-serde", derive(serde::Serialize, serde::Deserialize))]
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct BackendConnection {
    pub backend: BackendKind,
    pub configured: bool,
    pub connected: bool,
    pub detail: Option<String>,
    pub error: Option<String>,
}

#[cfg_attr(feature = "with-serde", derive(serde::Serialize, serde::Deserialize))]
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ConnectionReport {
    pub backends: Vec<BackendConnection>,
}

impl ConnectionReport {
    pub fn any_connected(&self) -> bool {
        self.backends.iter().any(|b| b.connected)
    }
}

#[cfg_attr(feature = "with-serde", derive(serde::Serialize, serde::Deserialize))]
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ConfigStatus {
    pub backends: Vec<BackendKind>,
    pub preferred: Option<BackendKind>,
    pub default_from: Option<String>,
}

#[derive(Debug, Clone)]
pub struct EmailSender {
    backends: BackendSet,
    default_from: Option<String>,
}

impl EmailSender {
    pub fn new(config: MailerConfig) -> Result<Self, SenderError> {
        let backends = BackendSet::from_config(&config)?;
        debug!(backends = ?backends, "email sender ready");
        Ok(Self::with_backends(backends, config.default_from))
    }

    pub fn with_backends(backends: BackendSet, default_from: Option<String>) -> Self {
        Self {
            backends,
            default_from,
        }
    }

    pub fn set_default_from(&mut self, address: &str) -> Result<(), SenderError> {
        if !is_valid_format(address) {
            return Err(SenderError::invalid_sender(address));
        }
        self.default_from = Some(address.trim().to_string());
        Ok(())
    }

    pub fn default_from(&self) -> Option<&str> {
        self.default_from.as_deref()
    }

    pub async fn send(&self, email: &OutgoingEmail, preference: BackendPreference) -> SendResult {
        let email = match email.sender(self.default_from.as_deref()) {
            Ok(from) => email.clone().with_from(from),
            Err(err) => return SendResult::unrouted(err),
        };

        match preference {
            BackendPreference::Only(kind) => match self.backends.get(kind) {
                Some(backend) => delivery::attempt(backend.as_ref(), &email).await,
                None => SendResult::failed(kind, DeliveryError::not_configured(kind)),
            },
            BackendPreference::Auto => self.send_with_fallback(&email).await,
        }
    }

    async fn send_with_fallback(&self, email: &OutgoingEmail) -> SendResult {
        let mut last = None;
        for backend in self.backends.ordered() {
            let result = delivery::attempt(backend.as_ref(), email).await;
            if result.success {
                info!(backend = %backend.kind(), recipients = email.recipients().count(), "message sent");
                return result;
            }
            debug!(backend = %backend.kind(), "trying next backend");
            last = Some(result);
        }
        last.unwrap_or_else(|| {
            warn!("no delivery backend configured");
            SendResult::unrouted("no delivery backend configured (set SES or SMTP variables)")
        })
    }

    /// Probes each backend without sending mail.
    pub async fn test_connection(&self) -> ConnectionReport {
        let mut backends = Vec::new();
        for kind in [BackendKind::AwsSes, BackendKind::Smtp] {
            let Some(backend) = self.backends.get(kind) else {
                backends.push(BackendConnection {
                    backend: kind,
                    configured: false,
                    connected: false,
                    detail: None,
                    error: Some(DeliveryError::not_configured(kind).to_string()),
                });
                continue;
            };
            let connection = match backend.probe().await {
                Ok(detail) => BackendConnection {
                    backend: kind,
                    configured: true,
                    connected: true,
                    detail: Some(detail),
                    error: None,
                },
                Err(err) => {
                    warn!(backend = %kind, error = %err, "connection test failed");
                    BackendConnection {
                        backend: kind,
                        configured: true,
                        connected: false,
                        detail: None,
                        error: Some(err.to_string()),
                    }
                }
            };
            backends.push(connection);
        }
        ConnectionReport { backends }
    }

    pub fn config_status(&self) -> ConfigStatus {
        let backends = self.backends.kinds();
        ConfigStatus {
            preferred: backends.first().copied(),
            backends,
            default_from: self.default_from.clone(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::delivery::Attachment;
    use crate::delivery::tests::StubBackend;

    fn email() -> OutgoingEmail {
        OutgoingEmail::new("bob@example.com", "Hello").with_text("hi")
    }

    #[tokio::test]
    async fn auto_prefers_ses() {
        let ses = StubBackend::ok(BackendKind::AwsSes);
        let smtp = StubBackend::ok(BackendKind::Smtp);
        let sender = EmailSender::with_backends(
            BackendSet::default()
                .with_backend(smtp.clone())
                .with_backend(ses.clone()),
            Some("noreply@example.com".to_string()),
        );

        let result = sender.send(&email(), BackendPreference::Auto).await;

        assert!(result.success);
        assert_eq!(result.backend, Some(BackendKind::AwsSes));
        assert_eq!((ses.calls(), smtp.calls()), (1, 0));
        assert_eq!(ses.sent()[0].from.as_deref(), Some("noreply@example.com"));
    }

    #[tokio::test]
    async fn auto_falls_back_to_smtp() {
        let ses = StubBackend::failing(BackendKind::AwsSes);
        let smtp = StubBackend::ok(BackendKind::Smtp);
        let sender = EmailSender::with_backends(
            BackendSet::default()
                .with_backend(ses.clone())
                .with_backend(smtp.clone()),
            Some("noreply@example.com".to_string()),
        );

        let result = sender.send(&email(), BackendPreference::Auto).await;

        assert!(result.success);
        assert_eq!(result.backend, Some(BackendKind::Smtp));
        assert_eq!((ses.calls(), smtp.calls()), (1, 1));
    }

    #[tokio::test]
    async fn explicit_backend_skips_fallback() {
        let ses = StubBackend::failing(BackendKind::AwsSes);
        let smtp = StubBackend::ok(BackendKind::Smtp);
        let sender = EmailSender::with_backends(
            BackendSet::default()
                .with_backend(ses.clone())
                .with_backend(smtp.clone()),
            Some("noreply@example.com".to_string()),
        );

        let result = sender
            .send(&email(), BackendPreference::Only(BackendKind::AwsSes))
            .await;

        assert!(!result.success);
        assert_eq!(smtp.calls(), 0);
    }

    #[tokio::test]
    async fn explicit_unconfigured_backend_fails() {
        let sender = EmailSender::with_backends(
            BackendSet::default().with_backend(StubBackend::ok(BackendKind::AwsSes)),
            Some("noreply@example.com".to_string()),
        );
        let result = sender
            .send(&email(), BackendPreference::Only(BackendKind::Smtp))
            .await;
        assert!(!result.success);
        assert!(result.error.as_deref().unwrap_or("").contains("not configured"));
    }

    #[tokio::test]
    async fn missing_sender_is_reported() {
        let smtp = StubBackend::ok(BackendKind::Smtp);
        let sender =
            EmailSender::with_backends(BackendSet::default().with_backend(smtp.clone()), None);
        let result = sender.send(&email(), BackendPreference::Auto).await;
        assert!(!result.success);
        assert_eq!(result.backend, None);
        assert_eq!(smtp.calls(), 0);
    }

    #[tokio::test]
    async fn nothing_configured_is_reported() {
        let sender =
            EmailSender::with_backends(BackendSet::default(), Some("a@example.com".to_string()));
        let result = sender.send(&email(), BackendPreference::Auto).await;
        assert!(!result.success);
        assert!(result.error.as_deref().unwrap_or("").contains("no delivery backend"));
    }

    #[tokio::test]
    async fn attachments_and_recipients_reach_backend() {
        let ses = StubBackend::ok(BackendKind::AwsSes);
        let sender = EmailSender::with_backends(BackendSet::default().with_backend(ses.clone()), None);
        let message = email()
            .with_from("me@example.com")
            .with_cc("carol@example.com")
            .with_bcc("eve@example.com")
            .with_attachment(Attachment::new("a.txt", b"x".to_vec(), "text/plain"));

        assert!(sender.send(&message, BackendPreference::Auto).await.success);

        let sent = ses.sent();
        assert_eq!(sent[0].recipients().count(), 3);
        assert!(sent[0].needs_raw());
    }

    #[tokio::test]
    async fn connection_report_covers_every_backend() {
        let sender = EmailSender::with_backends(
            BackendSet::default().with_backend(StubBackend::failing(BackendKind::Smtp)),
            None,
        );
        let report = sender.test_connection().await;

        assert_eq!(report.backends.len(), 2);
        let ses = &report.backends[0];
        assert!(!ses.configured && !ses.connected);
        let smtp = &report.backends[1];
        assert!(smtp.configured);
        assert!(!smtp.connected);
        assert!(smtp.error.is_some());
        assert!(!report.any_connected());
    }

    #[test]
    fn config_status_and_default_sender() {
        let mut sender = EmailSender::with_backends(
            BackendSet::default()
                .with_backend(StubBackend::ok(BackendKind::Smtp))
                .with_backend(StubBackend::ok(BackendKind::AwsSes)),
            None,
        );

        let status = sender.config_status();
        assert_eq!(status.backends, vec![BackendKind::AwsSes, BackendKind::Smtp]);
        assert_eq!(status.preferred, Some(BackendKind::AwsSes));
        assert_eq!(status.default_from, None);

        assert!(matches!(
            sender.set_default_from("not-an-address"),
            Err(SenderError::InvalidSender { .. })
        ));
        sender
            .set_default_from(" ops@example.com ")
            .expect("valid sender");
        assert_eq!(sender.config_status().default_from.as_deref(), Some("ops@example.com"));
    }
}
