use thiserror::Error;

use crate::delivery::DeliveryError;

#[derive(Debug, Error)]
pub enum SenderError {
    #[error("{address:?} is not a valid sender address")]
    InvalidSender { address: String },
    #[error(transparent)]
    Delivery(#[from] DeliveryError),
}

impl SenderError {
    pub(crate) fn invalid_sender(address: impl Into<String>) -> Self {
        Self::InvalidSender {
            address: address.into(),
        }
    }
}
