use std::fmt;
use std::str::FromStr;

use crate::auth::{DmarcStatus, SpfStatus};
use crate::delivery::{BackendKind, SendResult};
use crate::dns::{DomainStatus, MxRecord};

pub const DEFAULT_SUBJECT: &str = "Email deliverability test";
pub const DEFAULT_MESSAGE: &str =
    "This is an automated deliverability test. No action is required.";

/// Which backends a test run should exercise.
#[cfg_attr(feature = "with-serde", derive(serde::Serialize, serde::Deserialize))]
#[cfg_attr(feature = "with-serde", serde(rename_all = "kebab-case"))]
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub enum BackendSelection {
    #[default]
    None,
    AwsSes,
    Smtp,
    Both,
}

impl BackendSelection {
    pub fn kinds(self) -> &'static [BackendKind] {
        match self {
            Self::None => &[],
            Self::AwsSes => &[BackendKind::AwsSes],
            Self::Smtp => &[BackendKind::Smtp],
            Self::Both => &[BackendKind::AwsSes, BackendKind::Smtp],
        }
    }
}

impl fmt::Display for BackendSelection {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(match self {
            Self::None => "none",
            Self::AwsSes => "aws-ses",
            Self::Smtp => "smtp",
            Self::Both => "both",
        })
    }
}

impl FromStr for BackendSelection {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_ascii_lowercase().as_str() {
            "none" => Ok(Self::None),
            "aws-ses" | "ses" | "aws" => Ok(Self::AwsSes),
            "smtp" => Ok(Self::Smtp),
            "both" | "all" => Ok(Self::Both),
            other => Err(format!(
                "unknown provider {other:?} (expected aws-ses, smtp, both or none)"
            )),
        }
    }
}

/// Per-address settings for [`DeliverabilityTester::test_address`](super::DeliverabilityTester::test_address).
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct TestOptions {
    pub backends: BackendSelection,
    pub skip_delivery: bool,
    pub subject: String,
    pub message: String,
}

impl Default for TestOptions {
    fn default() -> Self {
        Self {
            backends: BackendSelection::None,
            skip_delivery: false,
            subject: DEFAULT_SUBJECT.to_string(),
            message: DEFAULT_MESSAGE.to_string(),
        }
    }
}

impl TestOptions {
    /// DNS checks only, no backend involved.
    pub fn validate_only() -> Self {
        Self::default().with_skip_delivery(true)
    }

    pub fn with_backends(mut self, backends: BackendSelection) -> Self {
        self.backends = backends;
        self
    }

    pub fn with_skip_delivery(mut self, skip: bool) -> Self {
        self.skip_delivery = skip;
        self
    }

    pub fn with_subject(mut self, subject: impl Into<String>) -> Self {
        self.subject = subject.into();
        self
    }

    pub fn with_message(mut self, message: impl Into<String>) -> Self {
        self.message = message.into();
        self
    }
}

/// Everything learned about one address.
#[cfg_attr(feature = "with-serde", derive(serde::Serialize, serde::Deserialize))]
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct TestResult {
    pub email: String,
    pub is_valid: bool,
    pub domain: Option<String>,
    pub domain_exists: bool,
    pub domain_status: DomainStatus,
    pub mx_records: Vec<MxRecord>,
    /// Published record when exactly one `v=spf1` string exists.
    pub spf_record: Option<String>,
    pub spf: SpfStatus,
    pub dmarc_record: Option<String>,
    pub dmarc: DmarcStatus,
    pub deliveries: Vec<SendResult>,
    pub recommendations: Vec<String>,
    pub elapsed_ms: u64,
}

impl TestResult {
    pub(crate) fn invalid_format(email: &str) -> Self {
        Self {
            email: email.to_string(),
            is_valid: false,
            domain: None,
            domain_exists: false,
            domain_status: DomainStatus::NotChecked,
            mx_records: Vec::new(),
            spf_record: None,
            spf: SpfStatus::Missing,
            dmarc_record: None,
            dmarc: DmarcStatus::Missing,
            deliveries: Vec::new(),
            recommendations: Vec::new(),
            elapsed_ms: 0,
        }
    }

    /// Valid format, an existing domain and at least one usable MX host.
    pub fn is_deliverable(&self) -> bool {
        self.is_valid && self.domain_exists && !self.mx_records.is_empty()
    }

    pub fn human_summary(&self) -> String {
        let verdict = if self.is_deliverable() {
            "deliverable"
        } else if self.is_valid {
            "undeliverable"
        } else {
            "invalid"
        };
        let mut out = format!("{} => {verdict}", self.email);
        if !self.is_valid {
            return out;
        }
        out.push_str(&format!(
            " [mx={} spf={} dmarc={}]",
            self.mx_records.len(),
            self.spf.summary(),
            self.dmarc.summary()
        ));
        out
    }

    /// Row for CSV output.
    #[cfg(feature = "with-csv")]
    pub fn csv_fields(&self) -> Vec<String> {
        let mx = self
            .mx_records
            .iter()
            .map(|record| format!("{}:{}", record.preference, record.exchange))
            .collect::<Vec<_>>()
            .join(" ");
        let deliveries = self
            .deliveries
            .iter()
            .map(|result| {
                let backend = result
                    .backend
                    .map(|kind| kind.to_string())
                    .unwrap_or_else(|| "-".to_string());
                format!("{backend}={}", if result.success { "ok" } else { "failed" })
            })
            .collect::<Vec<_>>()
            .join(" ");
        vec![
            self.email.clone(),
            self.is_valid.to_string(),
            self.domain.clone().unwrap_or_default(),
            self.domain_exists.to_string(),
            mx,
            self.spf.summary(),
            self.dmarc.summary(),
            deliveries,
            self.recommendations.join(" | "),
            self.elapsed_ms.to_string(),
        ]
    }
}

#[cfg(feature = "with-csv")]
pub const CSV_HEADER: [&str; 10] = [
    "email",
    "is_valid",
    "domain",
    "domain_exists",
    "mx_records",
    "spf",
    "dmarc",
    "deliveries",
    "recommendations",
    "elapsed_ms",
];
