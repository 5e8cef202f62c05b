//! Recognised environment variable names. The first non-empty alias wins.

pub(crate) const ACCESS_KEY: &[&str] = &["AWS_ACCESS_KEY_ID", "AWS_ACCESS_KEY", "SES_ACCESS_KEY_ID"];
pub(crate) const SECRET_KEY: &[&str] = &[
    "AWS_SECRET_ACCESS_KEY",
    "AWS_SECRET_KEY",
    "SES_SECRET_ACCESS_KEY",
];
pub(crate) const REGION: &[&str] = &["AWS_REGION", "AWS_DEFAULT_REGION", "SES_REGION"];
pub(crate) const DEFAULT_FROM: &[&str] = &[
    "DEFAULT_FROM_EMAIL",
    "FROM_EMAIL",
    "SES_FROM_EMAIL",
    "SMTP_FROM",
    "EMAIL_FROM",
];

// SMPT_* is a long-standing typo some deployments still rely on.
pub(crate) const SMTP_HOST: &[&str] = &["SMTP_HOST", "EMAIL_HOST", "SMPT_HOST"];
pub(crate) const SMTP_PORT: &[&str] = &["SMTP_PORT", "EMAIL_PORT", "SMPT_PORT"];
pub(crate) const SMTP_USER: &[&str] = &["SMTP_USER", "SMTP_USERNAME", "EMAIL_USER", "SMPT_USER"];
pub(crate) const SMTP_PASSWORD: &[&str] = &[
    "SMTP_PASSWORD",
    "SMTP_PASS",
    "EMAIL_PASSWORD",
    "SMPT_PASS",
    "SMPT_PASSWORD",
];
pub(crate) const SMTP_SECURE: &[&str] = &["SMTP_SECURE", "EMAIL_SECURE", "SMPT_SECURE"];

/// Returns `(name, value)` for the first alias with a non-blank value.
pub(crate) fn first_set<F>(lookup: &F, names: &[&str]) -> Option<(String, String)>
where
    F: Fn(&str) -> Option<String>,
{
    names.iter().find_map(|name| {
        lookup(name)
            .map(|value| value.trim().to_string())
            .filter(|value| !value.is_empty())
            .map(|value| (name.to_string(), value))
    })
}

pub(crate) fn parse_flag(name: &str, value: &str) -> Result<bool, super::ConfigError> {
    match value.to_ascii_lowercase().as_str() {
        "1" | "true" | "yes" | "on" => Ok(true),
        "0" | "false" | "no" | "off" => Ok(false),
        _ => Err(super::ConfigError::InvalidFlag {
            name: name.to_string(),
            value: value.to_string(),
        }),
    }
}

pub(crate) fn parse_port(name: &str, value: &str) -> Result<u16, super::ConfigError> {
    value
        .parse::<u16>()
        .map_err(|source| super::ConfigError::InvalidPort {
            name: name.to_string(),
            value: value.to_string(),
            source,
        })
}
