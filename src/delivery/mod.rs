//! Delivery backends: SMTP relay and Amazon SES.
//!
//! Each backend wraps one client library behind [`DeliveryBackend`]. Callers
//! never see transport errors directly; the tester and the sender fold them
//! into a [`SendResult`].

mod error;
mod message;
mod ses;
mod smtp;

pub use error::DeliveryError;
pub use message::{Attachment, OutgoingEmail};
pub use ses::SesBackend;
pub use smtp::SmtpBackend;

use std::fmt;
use std::str::FromStr;
use std::sync::Arc;

use async_trait::async_trait;
use tracing::warn;

use crate::config::MailerConfig;

/// Message id reported when delivery was skipped on request.
pub const SKIPPED_MESSAGE_ID: &str = "skipped-real-delivery";

#[cfg_attr(feature = "with-serde", derive(serde::Serialize, serde::Deserialize))]
#[cfg_attr(feature = "with-serde", serde(rename_all = "kebab-case"))]
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum BackendKind {
    AwsSes,
    Smtp,
}

impl BackendKind {
    pub fn as_str(self) -> &'static str {
        match self {
            Self::AwsSes => "aws-ses",
            Self::Smtp => "smtp",
        }
    }
}

impl fmt::Display for BackendKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for BackendKind {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_ascii_lowercase().as_str() {
            "aws-ses" | "ses" | "aws" => Ok(Self::AwsSes),
            "smtp" => Ok(Self::Smtp),
            other => Err(format!("unknown backend {other:?} (expected aws-ses or smtp)")),
        }
    }
}

/// Outcome of one send attempt.
#[cfg_attr(feature = "with-serde", derive(serde::Serialize, serde::Deserialize))]
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SendResult {
    pub success: bool,
    pub message_id: Option<String>,
    pub error: Option<String>,
    pub backend: Option<BackendKind>,
}

impl SendResult {
    pub fn delivered(backend: BackendKind, message_id: Option<String>) -> Self {
        Self {
            success: true,
            message_id,
            error: None,
            backend: Some(backend),
        }
    }

    pub fn failed(backend: BackendKind, error: impl fmt::Display) -> Self {
        Self {
            success: false,
            message_id: None,
            error: Some(error.to_string()),
            backend: Some(backend),
        }
    }

    pub fn skipped(backend: BackendKind) -> Self {
        Self::delivered(backend, Some(SKIPPED_MESSAGE_ID.to_string()))
    }

    /// Failure that no backend handled.
    pub fn unrouted(error: impl fmt::Display) -> Self {
        Self {
            success: false,
            message_id: None,
            error: Some(error.to_string()),
            backend: None,
        }
    }

    pub fn is_skipped(&self) -> bool {
        self.success && self.message_id.as_deref() == Some(SKIPPED_MESSAGE_ID)
    }
}

#[async_trait]
pub trait DeliveryBackend: Send + Sync {
    fn kind(&self) -> BackendKind;

    /// Sends `email`, returning the provider's message id when it gives one.
    async fn send(&self, email: &OutgoingEmail) -> Result<Option<String>, DeliveryError>;

    /// Checks connectivity without sending mail.
    async fn probe(&self) -> Result<String, DeliveryError>;
}

/// Runs `backend.send` and folds the outcome into a [`SendResult`].
pub async fn attempt(backend: &dyn DeliveryBackend, email: &OutgoingEmail) -> SendResult {
    let kind = backend.kind();
    match backend.send(email).await {
        Ok(message_id) => SendResult::delivered(kind, message_id),
        Err(err) => {
            warn!(backend = %kind, error = %err, "send failed");
            SendResult::failed(kind, err)
        }
    }
}

/// The configured backends, SES first.
#[derive(Clone, Default)]
pub struct BackendSet {
    ses: Option<Arc<dyn DeliveryBackend>>,
    smtp: Option<Arc<dyn DeliveryBackend>>,
}

impl fmt::Debug for BackendSet {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_list()
            .entries(self.ordered().map(|backend| backend.kind()))
            .finish()
    }
}

impl BackendSet {
    pub fn from_config(config: &MailerConfig) -> Result<Self, DeliveryError> {
        let ses = config.ses.as_ref().map(|settings| {
            Arc::new(SesBackend::new(settings, config.default_from.clone()))
                as Arc<dyn DeliveryBackend>
        });
        let smtp = match &config.smtp {
            Some(settings) => Some(
                Arc::new(SmtpBackend::new(settings, config.default_from.clone())?)
                    as Arc<dyn DeliveryBackend>,
            ),
            None => None,
        };
        Ok(Self { ses, smtp })
    }

    pub fn with_backend(mut self, backend: Arc<dyn DeliveryBackend>) -> Self {
        match backend.kind() {
            BackendKind::AwsSes => self.ses = Some(backend),
            BackendKind::Smtp => self.smtp = Some(backend),
        }
        self
    }

    pub fn get(&self, kind: BackendKind) -> Option<&Arc<dyn DeliveryBackend>> {
        match kind {
            BackendKind::AwsSes => self.ses.as_ref(),
            BackendKind::Smtp => self.smtp.as_ref(),
        }
    }

    pub fn ordered(&self) -> impl Iterator<Item = &Arc<dyn DeliveryBackend>> {
        self.ses.iter().chain(self.smtp.iter())
    }

    pub fn kinds(&self) -> Vec<BackendKind> {
        self.ordered().map(|backend| backend.kind()).collect()
    }

    pub fn is_empty(&self) -> bool {
        self.ses.is_none() && self.smtp.is_none()
    }
}
