use std::path::Path;

use lettre::message::header::{ContentType, HeaderName, HeaderValue};
use lettre::message::{Mailbox, Message, MessageBuilder, MultiPart, SinglePart};

use super::DeliveryError;

/// A file attached to an [`OutgoingEmail`].
#[derive(Clone, PartialEq, Eq)]
pub struct Attachment {
    pub filename: String,
    pub content: Vec<u8>,
    pub content_type: String,
}

impl std::fmt::Debug for Attachment {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Attachment")
            .field("filename", &self.filename)
            .field("bytes", &self.content.len())
            .field("content_type", &self.content_type)
            .finish()
    }
}

impl Attachment {
    pub fn new(
        filename: impl Into<String>,
        content: Vec<u8>,
        content_type: impl Into<String>,
    ) -> Self {
        Self {
            filename: filename.into(),
            content,
            content_type: content_type.into(),
        }
    }

    /// Reads `path`; the content type is guessed from its extension.
    pub async fn from_path(path: impl AsRef<Path>) -> Result<Self, DeliveryError> {
        let path = path.as_ref();
        let content = tokio::fs::read(path)
            .await
            .map_err(|err| DeliveryError::attachment(path.display().to_string(), err))?;
        let filename = path
            .file_name()
            .map(|name| name.to_string_lossy().into_owned())
            .unwrap_or_else(|| "attachment".to_string());
        let content_type = guess_content_type(path);
        Ok(Self {
            filename,
            content,
            content_type: content_type.to_string(),
        })
    }

    fn to_part(&self) -> Result<SinglePart, DeliveryError> {
        let content_type = ContentType::parse(&self.content_type).map_err(|_| {
            DeliveryError::InvalidContentType {
                filename: self.filename.clone(),
                value: self.content_type.clone(),
            }
        })?;
        Ok(lettre::message::Attachment::new(self.filename.clone())
            .body(self.content.clone(), content_type))
    }
}

pub(crate) fn guess_content_type(path: &Path) -> &'static str {
    let extension = path
        .extension()
        .and_then(|ext| ext.to_str())
        .map(str::to_ascii_lowercase)
        .unwrap_or_default();
    match extension.as_str() {
        "txt" | "log" => "text/plain",
        "csv" => "text/csv",
        "html" | "htm" => "text/html",
        "pdf" => "application/pdf",
        "json" => "application/json",
        "xml" => "application/xml",
        "zip" => "application/zip",
        "png" => "image/png",
        "jpg" | "jpeg" => "image/jpeg",
        "gif" => "image/gif",
        "svg" => "image/svg+xml",
        _ => "application/octet-stream",
    }
}

/// A message handed to a delivery backend.
///
/// `from` may be left empty; backends fall back to the configured default
/// sender.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct OutgoingEmail {
    pub from: Option<String>,
    pub to: Vec<String>,
    pub cc: Vec<String>,
    pub bcc: Vec<String>,
    pub reply_to: Vec<String>,
    pub subject: String,
    pub text: Option<String>,
    pub html: Option<String>,
    pub attachments: Vec<Attachment>,
    pub headers: Vec<(String, String)>,
}

enum Body {
    Single(SinglePart),
    Alternative(MultiPart),
}

impl OutgoingEmail {
    pub fn new(to: impl Into<String>, subject: impl Into<String>) -> Self {
        Self {
            to: vec![to.into()],
            subject: subject.into(),
            ..Self::default()
        }
    }

    pub fn with_from(mut self, from: impl Into<String>) -> Self {
        self.from = Some(from.into());
        self
    }

    pub fn with_cc(mut self, cc: impl Into<String>) -> Self {
        self.cc.push(cc.into());
        self
    }

    pub fn with_bcc(mut self, bcc: impl Into<String>) -> Self {
        self.bcc.push(bcc.into());
        self
    }

    pub fn with_reply_to(mut self, reply_to: impl Into<String>) -> Self {
        self.reply_to.push(reply_to.into());
        self
    }

    pub fn with_text(mut self, text: impl Into<String>) -> Self {
        self.text = Some(text.into());
        self
    }

    pub fn with_html(mut self, html: impl Into<String>) -> Self {
        self.html = Some(html.into());
        self
    }

    pub fn with_attachment(mut self, attachment: Attachment) -> Self {
        self.attachments.push(attachment);
        self
    }

    pub fn with_header(mut self, name: impl Into<String>, value: impl Into<String>) -> Self {
        self.headers.push((name.into(), value.into()));
        self
    }

    /// Every envelope recipient: to, then cc, then bcc.
    pub fn recipients(&self) -> impl Iterator<Item = &str> {
        self.to
            .iter()
            .chain(&self.cc)
            .chain(&self.bcc)
            .map(String::as_str)
    }

    /// Attachments and custom headers cannot go through SES simple content.
    pub fn needs_raw(&self) -> bool {
        !self.attachments.is_empty() || !self.headers.is_empty()
    }

    pub(crate) fn sender<'a>(&'a self, default: Option<&'a str>) -> Result<&'a str, DeliveryError> {
        self.from
            .as_deref()
            .or(default)
            .map(str::trim)
            .filter(|from| !from.is_empty())
            .ok_or(DeliveryError::MissingSender)
    }

    /// Builds the MIME message sent by `from`.
    pub fn to_message(&self, from: &str) -> Result<Message, DeliveryError> {
        if self.recipients().next().is_none() {
            return Err(DeliveryError::NoRecipients);
        }

        let mut builder = Message::builder()
            .message_id(None)
            .from(mailbox(from)?)
            .subject(self.subject.clone());
        for to in &self.to {
            builder = builder.to(mailbox(to)?);
        }
        for cc in &self.cc {
            builder = builder.cc(mailbox(cc)?);
        }
        for bcc in &self.bcc {
            builder = builder.bcc(mailbox(bcc)?);
        }
        for reply_to in &self.reply_to {
            builder = builder.reply_to(mailbox(reply_to)?);
        }
        builder = self.apply_headers(builder)?;

        let body = match (&self.text, &self.html) {
            (Some(text), Some(html)) => Body::Alternative(MultiPart::alternative_plain_html(
                text.clone(),
                html.clone(),
            )),
            (None, Some(html)) => Body::Single(SinglePart::html(html.clone())),
            (text, None) => Body::Single(SinglePart::plain(text.clone().unwrap_or_default())),
        };

        let message = if self.attachments.is_empty() {
            match body {
                Body::Single(part) => builder.singlepart(part),
                Body::Alternative(parts) => builder.multipart(parts),
            }
        } else {
            let mut mixed = match body {
                Body::Single(part) => MultiPart::mixed().singlepart(part),
                Body::Alternative(parts) => MultiPart::mixed().multipart(parts),
            };
            for attachment in &self.attachments {
                mixed = mixed.singlepart(attachment.to_part()?);
            }
            builder.multipart(mixed)
        };

        message.map_err(DeliveryError::build)
    }

    fn apply_headers(&self, mut builder: MessageBuilder) -> Result<MessageBuilder, DeliveryError> {
        for (name, value) in &self.headers {
            // RFC 5322 ftext: printable ASCII without ':'
            let ftext = !name.is_empty() && name.bytes().all(|b| (33..=126).contains(&b) && b != b':');
            let header = HeaderName::new_from_ascii(name.clone())
                .ok()
                .filter(|_| ftext)
                .ok_or_else(|| DeliveryError::InvalidHeader { name: name.clone() })?;
            builder = builder.raw_header(HeaderValue::new(header, value.clone()));
        }
        Ok(builder)
    }
}

fn mailbox(address: &str) -> Result<Mailbox, DeliveryError> {
    address
        .trim()
        .parse::<Mailbox>()
        .map_err(|err| DeliveryError::invalid_address(address, err))
}

/// The `Message-ID` header lettre assigned while building.
pub(crate) fn message_id(message: &Message) -> Option<String> {
    message
        .headers()
        .get_raw("Message-ID")
        .map(|id| id.trim().to_string())
}
