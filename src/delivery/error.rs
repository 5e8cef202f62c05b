use thiserror::Error;

use super::BackendKind;

/// Errors raised while building or transmitting a message.
#[derive(Debug, Error)]
pub enum DeliveryError {
    #[error("{kind} backend is not configured")]
    NotConfigured { kind: BackendKind },
    #[error("no sender address: set one on the message or configure a default")]
    MissingSender,
    #[error("no recipients")]
    NoRecipients,
    #[error("invalid address {address:?}")]
    InvalidAddress {
        address: String,
        #[source]
        source: lettre::address::AddressError,
    },
    #[error("invalid header name {name:?}")]
    InvalidHeader { name: String },
    #[error("invalid content type {value:?} for attachment {filename:?}")]
    InvalidContentType { filename: String, value: String },
    #[error("failed to build message: {source}")]
    Build {
        #[source]
        source: lettre::error::Error,
    },
    #[error("SMTP error: {source}")]
    Smtp {
        #[source]
        source: lettre::transport::smtp::Error,
    },
    #[error("SMTP server {host}:{port} refused the connection")]
    ConnectionRefused { host: String, port: u16 },
    #[error("SES error: {message}")]
    Ses { message: String },
    #[error("cannot read attachment {path}: {source}")]
    Attachment {
        path: String,
        #[source]
        source: std::io::Error,
    },
}

impl DeliveryError {
    pub(crate) fn not_configured(kind: BackendKind) -> Self {
        Self::NotConfigured { kind }
    }

    pub(crate) fn invalid_address(
        address: impl Into<String>,
        source: lettre::address::AddressError,
    ) -> Self {
        Self::InvalidAddress {
            address: address.into(),
            source,
        }
    }

    pub(crate) fn build(source: lettre::error::Error) -> Self {
        Self::Build { source }
    }

    pub(crate) fn smtp(source: lettre::transport::smtp::Error) -> Self {
        Self::Smtp { source }
    }

    pub(crate) fn ses(message: impl Into<String>) -> Self {
        Self::Ses {
            message: message.into(),
        }
    }

    pub(crate) fn attachment(path: impl Into<String>, source: std::io::Error) -> Self {
        Self::Attachment {
            path: path.into(),
            source,
        }
    }
}
