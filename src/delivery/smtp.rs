use async_trait::async_trait;
use lettre::transport::smtp::authentication::Credentials;
use lettre::transport::smtp::client::{Tls, TlsParameters};
use lettre::{AsyncSmtpTransport, AsyncTransport, Tokio1Executor};
use tracing::{debug, info};

use crate::config::SmtpSettings;

use super::message::message_id;
use super::{BackendKind, DeliveryBackend, DeliveryError, OutgoingEmail};

/// SMTP relay through lettre's async transport.
pub struct SmtpBackend {
    transport: AsyncSmtpTransport<Tokio1Executor>,
    host: String,
    port: u16,
    default_from: Option<String>,
}

impl std::fmt::Debug for SmtpBackend {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("SmtpBackend")
            .field("host", &self.host)
            .field("port", &self.port)
            .field("default_from", &self.default_from)
            .finish_non_exhaustive()
    }
}

impl SmtpBackend {
    pub fn new(settings: &SmtpSettings, default_from: Option<String>) -> Result<Self, DeliveryError> {
        let params = TlsParameters::new(settings.host.clone()).map_err(DeliveryError::smtp)?;
        let tls = if settings.secure {
            Tls::Wrapper(params)
        } else {
            Tls::Opportunistic(params)
        };

        let mut builder =
            AsyncSmtpTransport::<Tokio1Executor>::builder_dangerous(settings.host.clone())
                .port(settings.port())
                .tls(tls);
        if let Some((user, password)) = settings.credentials() {
            builder = builder.credentials(Credentials::new(user.to_string(), password.to_string()));
        }

        Ok(Self {
            transport: builder.build(),
            host: settings.host.clone(),
            port: settings.port(),
            default_from,
        })
    }

    async fn verify(&self) -> Result<(), DeliveryError> {
        debug!(host = %self.host, port = self.port, "verifying SMTP connection");
        match self.transport.test_connection().await {
            Ok(true) => Ok(()),
            Ok(false) => Err(DeliveryError::ConnectionRefused {
                host: self.host.clone(),
                port: self.port,
            }),
            Err(err) => Err(DeliveryError::smtp(err)),
        }
    }
}

#[async_trait]
impl DeliveryBackend for SmtpBackend {
    fn kind(&self) -> BackendKind {
        BackendKind::Smtp
    }

    async fn send(&self, email: &OutgoingEmail) -> Result<Option<String>, DeliveryError> {
        let from = email.sender(self.default_from.as_deref())?;
        let message = email.to_message(from)?;
        let id = message_id(&message);

        self.verify().await?;
        let response = self
            .transport
            .send(message)
            .await
            .map_err(DeliveryError::smtp)?;

        info!(
            host = %self.host,
            code = %response.code(),
            message_id = id.as_deref().unwrap_or(""),
            "message accepted by SMTP server"
        );
        Ok(id)
    }

    async fn probe(&self) -> Result<String, DeliveryError> {
        self.verify().await?;
        Ok(format!("{}:{} accepted the handshake", self.host, self.port))
    }
}
