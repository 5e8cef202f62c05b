use super::{RecordSelection, select_records};

#[cfg_attr(feature = "with-serde", derive(serde::Serialize, serde::Deserialize))]
#[cfg_attr(feature = "with-serde", serde(tag = "status", rename_all = "snake_case"))]
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum SpfStatus {
    Missing,
    MultipleRecords {
        records: Vec<String>,
    },
    Malformed {
        record: String,
        issue: SpfIssue,
    },
    /// `redirect=` with no `all` mechanism: policy lives elsewhere.
    Redirect {
        record: String,
        target: String,
    },
    /// `?all` or `+all`: anyone may send.
    Permissive {
        record: String,
        qualifier: SpfQualifier,
    },
    /// `-all` or `~all`.
    Enforced {
        record: String,
        qualifier: SpfQualifier,
    },
}

#[cfg_attr(feature = "with-serde", derive(serde::Serialize, serde::Deserialize))]
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SpfIssue {
    InvalidVersion,
    MissingAllMechanism,
}

#[cfg_attr(feature = "with-serde", derive(serde::Serialize, serde::Deserialize))]
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SpfQualifier {
    Fail,
    SoftFail,
    Neutral,
    Pass,
}

impl SpfStatus {
    /// The single published record, if exactly one was found.
    pub fn record(&self) -> Option<&str> {
        match self {
            Self::Missing | Self::MultipleRecords { .. } => None,
            Self::Malformed { record, .. }
            | Self::Redirect { record, .. }
            | Self::Permissive { record, .. }
            | Self::Enforced { record, .. } => Some(record),
        }
    }

    pub fn summary(&self) -> String {
        match self {
            Self::Missing => "missing".to_string(),
            Self::MultipleRecords { records } => format!("{} records published", records.len()),
            Self::Malformed { issue, .. } => match issue {
                SpfIssue::InvalidVersion => "malformed (version)".to_string(),
                SpfIssue::MissingAllMechanism => "malformed (no all mechanism)".to_string(),
            },
            Self::Redirect { target, .. } => format!("redirect to {target}"),
            Self::Permissive { qualifier, .. } => format!("permissive ({})", qualifier.token()),
            Self::Enforced { qualifier, .. } => format!("enforced ({})", qualifier.token()),
        }
    }
}

impl SpfQualifier {
    fn from_token(token: &str) -> Option<Self> {
        match token {
            "-all" => Some(Self::Fail),
            "~all" => Some(Self::SoftFail),
            "?all" => Some(Self::Neutral),
            "all" | "+all" => Some(Self::Pass),
            _ => None,
        }
    }

    pub fn token(self) -> &'static str {
        match self {
            Self::Fail => "-all",
            Self::SoftFail => "~all",
            Self::Neutral => "?all",
            Self::Pass => "+all",
        }
    }
}

pub(crate) fn evaluate(records: &[String]) -> SpfStatus {
    let record = match select_records(records, "v=spf1") {
        RecordSelection::None => return SpfStatus::Missing,
        RecordSelection::Many(records) => return SpfStatus::MultipleRecords { records },
        RecordSelection::One(record) => record,
    };

    let mut terms = record.split_whitespace();
    // "v=spf10" passes the prefix filter but is not version 1.
    if !terms
        .next()
        .is_some_and(|version| version.eq_ignore_ascii_case("v=spf1"))
    {
        return SpfStatus::Malformed {
            record,
            issue: SpfIssue::InvalidVersion,
        };
    }

    let mut qualifier = None;
    let mut redirect = None;
    for term in terms {
        let lower = term.to_ascii_lowercase();
        qualifier = qualifier.or_else(|| SpfQualifier::from_token(&lower));
        if redirect.is_none() && lower.starts_with("redirect=") {
            redirect = term
                .split_once('=')
                .map(|(_, target)| target.trim())
                .filter(|target| !target.is_empty())
                .map(str::to_string);
        }
    }

    match (qualifier, redirect) {
        (Some(qualifier @ (SpfQualifier::Fail | SpfQualifier::SoftFail)), _) => {
            SpfStatus::Enforced { record, qualifier }
        }
        (Some(qualifier), _) => SpfStatus::Permissive { record, qualifier },
        (None, Some(target)) => SpfStatus::Redirect { record, target },
        (None, None) => SpfStatus::Malformed {
            record,
            issue: SpfIssue::MissingAllMechanism,
        },
    }
}
