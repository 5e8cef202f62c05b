use async_trait::async_trait;
use aws_sdk_sesv2::config::{BehaviorVersion, Credentials, Region};
use aws_sdk_sesv2::error::DisplayErrorContext;
use aws_sdk_sesv2::primitives::Blob;
use aws_sdk_sesv2::types::{Body, Content, Destination, EmailContent, Message, RawMessage};
use aws_sdk_sesv2::Client;
use tracing::{debug, info};

use crate::config::SesSettings;

use super::{BackendKind, DeliveryBackend, DeliveryError, OutgoingEmail};

const CREDENTIALS_PROVIDER: &str = "mailprobe";

/// Amazon SES v2 client. Plain messages use simple content; anything with
/// attachments or custom headers goes out as raw MIME.
#[derive(Debug, Clone)]
pub struct SesBackend {
    client: Client,
    region: String,
    default_from: Option<String>,
}

impl SesBackend {
    pub fn new(settings: &SesSettings, default_from: Option<String>) -> Self {
        let credentials = Credentials::new(
            settings.access_key_id.clone(),
            settings.secret_access_key.clone(),
            None,
            None,
            CREDENTIALS_PROVIDER,
        );
        let config = aws_sdk_sesv2::Config::builder()
            .behavior_version(BehaviorVersion::latest())
            .region(Region::new(settings.region.clone()))
            .credentials_provider(credentials)
            .build();
        Self {
            client: Client::from_conf(config),
            region: settings.region.clone(),
            default_from,
        }
    }

    fn simple_content(email: &OutgoingEmail) -> Result<EmailContent, DeliveryError> {
        let mut body = Body::builder();
        if let Some(text) = &email.text {
            body = body.text(utf8(text)?);
        }
        if let Some(html) = &email.html {
            body = body.html(utf8(html)?);
        }
        if email.text.is_none() && email.html.is_none() {
            body = body.text(utf8("")?);
        }
        let message = Message::builder()
            .subject(utf8(&email.subject)?)
            .body(body.build())
            .build();
        Ok(EmailContent::builder().simple(message).build())
    }

    fn raw_content(email: &OutgoingEmail, from: &str) -> Result<EmailContent, DeliveryError> {
        let mime = email.to_message(from)?.formatted();
        let raw = RawMessage::builder()
            .data(Blob::new(mime))
            .build()
            .map_err(|err| DeliveryError::ses(DisplayErrorContext(err).to_string()))?;
        Ok(EmailContent::builder().raw(raw).build())
    }
}

fn utf8(data: &str) -> Result<Content, DeliveryError> {
    Content::builder()
        .data(data)
        .charset("UTF-8")
        .build()
        .map_err(|err| DeliveryError::ses(DisplayErrorContext(err).to_string()))
}

fn non_empty(list: &[String]) -> Option<Vec<String>> {
    (!list.is_empty()).then(|| list.to_vec())
}

#[async_trait]
impl DeliveryBackend for SesBackend {
    fn kind(&self) -> BackendKind {
        BackendKind::AwsSes
    }

    async fn send(&self, email: &OutgoingEmail) -> Result<Option<String>, DeliveryError> {
        let from = email.sender(self.default_from.as_deref())?;
        if email.recipients().next().is_none() {
            return Err(DeliveryError::NoRecipients);
        }

        let content = if email.needs_raw() {
            debug!(attachments = email.attachments.len(), "using SES raw message");
            Self::raw_content(email, from)?
        } else {
            Self::simple_content(email)?
        };

        let destination = Destination::builder()
            .set_to_addresses(non_empty(&email.to))
            .set_cc_addresses(non_empty(&email.cc))
            .set_bcc_addresses(non_empty(&email.bcc))
            .build();

        let output = self
            .client
            .send_email()
            .from_email_address(from)
            .destination(destination)
            .content(content)
            .set_reply_to_addresses(non_empty(&email.reply_to))
            .send()
            .await
            .map_err(|err| DeliveryError::ses(DisplayErrorContext(err).to_string()))?;

        let id = output.message_id().map(str::to_string);
        info!(
            region = %self.region,
            message_id = id.as_deref().unwrap_or(""),
            "message accepted by SES"
        );
        Ok(id)
    }

    async fn probe(&self) -> Result<String, DeliveryError> {
        let account = self
            .client
            .get_account()
            .send()
            .await
            .map_err(|err| DeliveryError::ses(DisplayErrorContext(err).to_string()))?;
        let detail = match account.send_quota() {
            Some(quota) => format!(
                "{}: sent {} of {} in the last 24h",
                self.region, quota.sent_last24_hours, quota.max24_hour_send
            ),
            None => format!("{}: account reachable", self.region),
        };
        Ok(detail)
    }
}
