//! Mailer configuration, resolved once at startup.
//!
//! [`MailerConfig::from_env`] reads the recognised variables (see the alias
//! tables in `env.rs`); tests and embedders use [`MailerConfig::from_source`]
//! with their own lookup function instead of touching the process
//! environment.

mod env;
mod error;

pub use error::ConfigError;

use std::fmt;

use env::{first_set, parse_flag, parse_port};

pub const DEFAULT_REGION: &str = "us-east-1";
pub const DEFAULT_SMTP_PORT: u16 = 587;
pub const DEFAULT_SMTPS_PORT: u16 = 465;

#[derive(Clone, PartialEq, Eq)]
pub struct SesSettings {
    pub access_key_id: String,
    pub secret_access_key: String,
    pub region: String,
}

impl fmt::Debug for SesSettings {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("SesSettings")
            .field("access_key_id", &self.access_key_id)
            .field("secret_access_key", &"***")
            .field("region", &self.region)
            .finish()
    }
}

#[derive(Clone, PartialEq, Eq)]
pub struct SmtpSettings {
    pub host: String,
    /// Unset picks 587, or 465 when `secure`.
    pub port: Option<u16>,
    pub username: Option<String>,
    pub password: Option<String>,
    /// Implicit TLS on connect. When false, STARTTLS is used if offered.
    pub secure: bool,
}

impl SmtpSettings {
    pub fn new(host: impl Into<String>) -> Self {
        Self {
            host: host.into(),
            port: None,
            username: None,
            password: None,
            secure: false,
        }
    }

    pub fn port(&self) -> u16 {
        match self.port {
            Some(port) => port,
            None if self.secure => DEFAULT_SMTPS_PORT,
            None => DEFAULT_SMTP_PORT,
        }
    }

    pub fn credentials(&self) -> Option<(&str, &str)> {
        match (&self.username, &self.password) {
            (Some(user), Some(password)) => Some((user, password)),
            _ => None,
        }
    }
}

impl fmt::Debug for SmtpSettings {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("SmtpSettings")
            .field("host", &self.host)
            .field("port", &self.port())
            .field("username", &self.username)
            .field("password", &self.password.as_ref().map(|_| "***"))
            .field("secure", &self.secure)
            .finish()
    }
}

/// Command-line replacements for individual SMTP settings.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct SmtpOverrides {
    pub host: Option<String>,
    pub port: Option<u16>,
    pub username: Option<String>,
    pub password: Option<String>,
    pub secure: Option<bool>,
}

impl SmtpOverrides {
    pub fn is_empty(&self) -> bool {
        self == &Self::default()
    }
}

#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct MailerConfig {
    pub ses: Option<SesSettings>,
    pub smtp: Option<SmtpSettings>,
    pub default_from: Option<String>,
}

impl MailerConfig {
    pub fn from_env() -> Result<Self, ConfigError> {
        Self::from_source(|name| std::env::var(name).ok())
    }

    pub fn from_source<F>(lookup: F) -> Result<Self, ConfigError>
    where
        F: Fn(&str) -> Option<String>,
    {
        let ses = match (
            first_set(&lookup, env::ACCESS_KEY),
            first_set(&lookup, env::SECRET_KEY),
        ) {
            (Some((_, access_key_id)), Some((_, secret_access_key))) => Some(SesSettings {
                access_key_id,
                secret_access_key,
                region: first_set(&lookup, env::REGION)
                    .map(|(_, region)| region)
                    .unwrap_or_else(|| DEFAULT_REGION.to_string()),
            }),
            _ => None,
        };

        let smtp = match first_set(&lookup, env::SMTP_HOST) {
            Some((_, host)) => {
                let secure = match first_set(&lookup, env::SMTP_SECURE) {
                    Some((name, value)) => parse_flag(&name, &value)?,
                    None => false,
                };
                let port = match first_set(&lookup, env::SMTP_PORT) {
                    Some((name, value)) => Some(parse_port(&name, &value)?),
                    None => None,
                };
                Some(SmtpSettings {
                    host,
                    port,
                    username: first_set(&lookup, env::SMTP_USER).map(|(_, v)| v),
                    password: first_set(&lookup, env::SMTP_PASSWORD).map(|(_, v)| v),
                    secure,
                })
            }
            None => None,
        };

        Ok(Self {
            ses,
            smtp,
            default_from: first_set(&lookup, env::DEFAULT_FROM).map(|(_, v)| v),
        })
    }

    /// Applies command-line SMTP settings on top of the resolved ones.
    pub fn with_smtp_overrides(mut self, overrides: SmtpOverrides) -> Result<Self, ConfigError> {
        if overrides.is_empty() {
            return Ok(self);
        }

        let mut smtp = match (self.smtp.take(), overrides.host) {
            (_, Some(host)) => SmtpSettings::new(host),
            (Some(existing), None) => existing,
            (None, None) => return Err(ConfigError::MissingSmtpHost),
        };

        if let Some(port) = overrides.port {
            smtp.port = Some(port);
        }
        if let Some(username) = overrides.username {
            smtp.username = Some(username);
        }
        if let Some(password) = overrides.password {
            smtp.password = Some(password);
        }
        if let Some(secure) = overrides.secure {
            smtp.secure = secure;
        }

        self.smtp = Some(smtp);
        Ok(self)
    }

    pub fn with_default_from(mut self, from: impl Into<String>) -> Self {
        self.default_from = Some(from.into());
        self
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::collections::HashMap;

    fn source(pairs: &[(&str, &str)]) -> impl Fn(&str) -> Option<String> {
        let map: HashMap<String, String> = pairs
            .iter()
            .map(|(k, v)| (k.to_string(), v.to_string()))
            .collect();
        move |name| map.get(name).cloned()
    }

    #[test]
    fn empty_environment_configures_nothing() {
        let config = MailerConfig::from_source(source(&[])).expect("config");
        assert_eq!(config, MailerConfig::default());
    }

    #[test]
    fn ses_needs_both_keys_and_defaults_region() {
        let partial = MailerConfig::from_source(source(&[("AWS_ACCESS_KEY_ID", "AKIA")]))
            .expect("config");
        assert!(partial.ses.is_none());

        let config = MailerConfig::from_source(source(&[
            ("AWS_ACCESS_KEY_ID", "AKIA"),
            ("AWS_SECRET_ACCESS_KEY", "secret"),
        ]))
        .expect("config");
        let ses = config.ses.expect("ses configured");
        assert_eq!(ses.region, DEFAULT_REGION);
    }

    #[test]
    fn blank_values_fall_through_to_next_alias() {
        let config = MailerConfig::from_source(source(&[
            ("DEFAULT_FROM_EMAIL", "  "),
            ("FROM_EMAIL", "noreply@example.com"),
        ]))
        .expect("config");
        assert_eq!(config.default_from.as_deref(), Some("noreply@example.com"));
    }

    #[test]
    fn misspelled_smtp_family_is_recognised() {
        let config = MailerConfig::from_source(source(&[
            ("SMPT_HOST", "mail.example.com"),
            ("SMPT_PORT", "2525"),
            ("SMPT_USER", "bot"),
            ("SMPT_PASS", "hunter2"),
        ]))
        .expect("config");
        let smtp = config.smtp.expect("smtp configured");
        assert_eq!(smtp.host, "mail.example.com");
        assert_eq!(smtp.port(), 2525);
        assert_eq!(smtp.credentials(), Some(("bot", "hunter2")));
    }

    #[test]
    fn secure_flag_switches_default_port() {
        let config = MailerConfig::from_source(source(&[
            ("SMTP_HOST", "mail.example.com"),
            ("SMTP_SECURE", "TRUE"),
        ]))
        .expect("config");
        let smtp = config.smtp.expect("smtp configured");
        assert!(smtp.secure);
        assert_eq!(smtp.port(), DEFAULT_SMTPS_PORT);
    }

    #[test]
    fn bad_port_is_an_error() {
        let err = MailerConfig::from_source(source(&[
            ("SMTP_HOST", "mail.example.com"),
            ("SMTP_PORT", "smtp"),
        ]))
        .expect_err("port must be numeric");
        assert!(matches!(err, ConfigError::InvalidPort { ref name, .. } if name == "SMTP_PORT"));
    }

    #[test]
    fn overrides_replace_individual_fields() {
        let config = MailerConfig::from_source(source(&[
            ("SMTP_HOST", "mail.example.com"),
            ("SMTP_USER", "bot"),
        ]))
        .expect("config")
        .with_smtp_overrides(SmtpOverrides {
            port: Some(25),
            ..SmtpOverrides::default()
        })
        .expect("overrides");
        let smtp = config.smtp.expect("smtp configured");
        assert_eq!(smtp.host, "mail.example.com");
        assert_eq!(smtp.port(), 25);
        assert_eq!(smtp.username.as_deref(), Some("bot"));
    }

    #[test]
    fn secure_override_moves_a_defaulted_port_to_465() {
        let config = MailerConfig::from_source(source(&[("SMTP_HOST", "mail.example.com")]))
            .expect("config")
            .with_smtp_overrides(SmtpOverrides {
                secure: Some(true),
                ..SmtpOverrides::default()
            })
            .expect("overrides");
        let smtp = config.smtp.expect("smtp configured");
        assert!(smtp.secure);
        assert_eq!(smtp.port(), DEFAULT_SMTPS_PORT);
    }

    #[test]
    fn secure_override_keeps_an_explicit_port() {
        let config = MailerConfig::from_source(source(&[
            ("SMTP_HOST", "mail.example.com"),
            ("SMTP_PORT", "2465"),
        ]))
        .expect("config")
        .with_smtp_overrides(SmtpOverrides {
            secure: Some(true),
            ..SmtpOverrides::default()
        })
        .expect("overrides");
        assert_eq!(config.smtp.expect("smtp configured").port(), 2465);

        let config = MailerConfig::default()
            .with_smtp_overrides(SmtpOverrides {
                host: Some("relay.example.com".to_string()),
                secure: Some(true),
                ..SmtpOverrides::default()
            })
            .expect("overrides");
        assert_eq!(config.smtp.expect("smtp configured").port(), DEFAULT_SMTPS_PORT);
    }

    #[test]
    fn overrides_without_any_host_fail() {
        let err = MailerConfig::default()
            .with_smtp_overrides(SmtpOverrides {
                username: Some("bot".to_string()),
                ..SmtpOverrides::default()
            })
            .expect_err("host required");
        assert!(matches!(err, ConfigError::MissingSmtpHost));
    }

    #[test]
    fn debug_hides_secrets() {
        let settings = SesSettings {
            access_key_id: "AKIA".to_string(),
            secret_access_key: "very-secret".to_string(),
            region: "eu-west-1".to_string(),
        };
        assert!(!format!("{settings:?}").contains("very-secret"));
    }
}
