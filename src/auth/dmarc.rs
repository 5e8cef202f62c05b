use std::collections::HashMap;

use super::{RecordSelection, select_records};

#[cfg_attr(feature = "with-serde", derive(serde::Serialize, serde::Deserialize))]
#[cfg_attr(feature = "with-serde", serde(tag = "status", rename_all = "snake_case"))]
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum DmarcStatus {
    Missing,
    MultipleRecords {
        records: Vec<String>,
    },
    Malformed {
        record: String,
        issue: DmarcIssue,
    },
    /// `p=none`: reports only.
    Monitoring {
        record: String,
    },
    Enforced {
        record: String,
        policy: DmarcPolicy,
        /// `pct=` tag, 100 when absent.
        percent: u8,
    },
}

#[cfg_attr(feature = "with-serde", derive(serde::Serialize, serde::Deserialize))]
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum DmarcIssue {
    InvalidVersion,
    MissingPolicy,
    UnknownPolicy { policy: String },
}

#[cfg_attr(feature = "with-serde", derive(serde::Serialize, serde::Deserialize))]
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum DmarcPolicy {
    Quarantine,
    Reject,
}

impl DmarcStatus {
    pub fn record(&self) -> Option<&str> {
        match self {
            Self::Missing | Self::MultipleRecords { .. } => None,
            Self::Malformed { record, .. }
            | Self::Monitoring { record }
            | Self::Enforced { record, .. } => Some(record),
        }
    }

    pub fn summary(&self) -> String {
        match self {
            Self::Missing => "missing".to_string(),
            Self::MultipleRecords { records } => format!("{} records published", records.len()),
            Self::Malformed { issue, .. } => match issue {
                DmarcIssue::InvalidVersion => "malformed (version)".to_string(),
                DmarcIssue::MissingPolicy => "malformed (no p= tag)".to_string(),
                DmarcIssue::UnknownPolicy { policy } => format!("malformed (p={policy})"),
            },
            Self::Monitoring { .. } => "monitoring (p=none)".to_string(),
            Self::Enforced {
                policy, percent, ..
            } => {
                let policy = match policy {
                    DmarcPolicy::Quarantine => "quarantine",
                    DmarcPolicy::Reject => "reject",
                };
                if *percent < 100 {
                    format!("enforced (p={policy}, pct={percent})")
                } else {
                    format!("enforced (p={policy})")
                }
            }
        }
    }
}

pub(crate) fn evaluate(records: &[String]) -> DmarcStatus {
    let record = match select_records(records, "v=dmarc1") {
        RecordSelection::None => return DmarcStatus::Missing,
        RecordSelection::Many(records) => return DmarcStatus::MultipleRecords { records },
        RecordSelection::One(record) => record,
    };

    let tags = parse_tags(&record);
    if !tags
        .get("v")
        .is_some_and(|version| version.eq_ignore_ascii_case("dmarc1"))
    {
        return DmarcStatus::Malformed {
            record,
            issue: DmarcIssue::InvalidVersion,
        };
    }

    let Some(policy) = tags.get("p").map(|p| p.to_ascii_lowercase()) else {
        return DmarcStatus::Malformed {
            record,
            issue: DmarcIssue::MissingPolicy,
        };
    };

    let percent = tags
        .get("pct")
        .and_then(|pct| pct.parse::<u8>().ok())
        .map_or(100, |pct| pct.min(100));

    let policy = match policy.as_str() {
        "none" => return DmarcStatus::Monitoring { record },
        "quarantine" => DmarcPolicy::Quarantine,
        "reject" => DmarcPolicy::Reject,
        _ => {
            return DmarcStatus::Malformed {
                record,
                issue: DmarcIssue::UnknownPolicy { policy },
            };
        }
    };

    DmarcStatus::Enforced {
        record,
        policy,
        percent,
    }
}

fn parse_tags(record: &str) -> HashMap<String, String> {
    record
        .split(';')
        .map(str::trim)
        .filter(|part| !part.is_empty())
        .map(|part| match part.split_once('=') {
            Some((key, value)) => (key.trim().to_ascii_lowercase(), value.trim().to_string()),
            None => (part.to_ascii_lowercase(), String::new()),
        })
        .collect()
}
