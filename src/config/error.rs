use thiserror::Error;

#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("{name}={value} is not a valid port")]
    InvalidPort {
        name: String,
        value: String,
        #[source]
        source: std::num::ParseIntError,
    },
    #[error("{name}={value} is not a boolean (use true/false)")]
    InvalidFlag { name: String, value: String },
    #[error("SMTP settings given but no SMTP host is configured")]
    MissingSmtpHost,
}
