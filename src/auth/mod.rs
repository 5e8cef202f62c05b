//! SPF and DMARC record checks.

mod dmarc;
mod spf;

pub use dmarc::{DmarcIssue, DmarcPolicy, DmarcStatus};
pub use spf::{SpfIssue, SpfQualifier, SpfStatus};

use tracing::debug;

use crate::dns::{DnsLookup, Lookup, fqdn, resolve_txt};

/// SPF and DMARC findings for one domain.
#[cfg_attr(feature = "with-serde", derive(serde::Serialize, serde::Deserialize))]
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct AuthRecords {
    pub domain: String,
    pub spf: SpfStatus,
    pub dmarc: DmarcStatus,
}

/// Looks up TXT at `ascii_domain` and `_dmarc.<ascii_domain>`.
///
/// A failed lookup is treated like an absent record.
pub async fn check_auth_records<R>(resolver: &R, ascii_domain: &str) -> AuthRecords
where
    R: DnsLookup + ?Sized,
{
    let spf_records = txt_or_empty(resolver, ascii_domain).await;
    let dmarc_records = txt_or_empty(resolver, &fqdn("_dmarc", ascii_domain)).await;

    AuthRecords {
        domain: ascii_domain.to_string(),
        spf: spf::evaluate(&spf_records),
        dmarc: dmarc::evaluate(&dmarc_records),
    }
}

async fn txt_or_empty<R>(resolver: &R, name: &str) -> Vec<String>
where
    R: DnsLookup + ?Sized,
{
    match resolve_txt(resolver, name).await {
        Lookup::Found(records) => records,
        Lookup::NotFound => Vec::new(),
        Lookup::Failed(message) => {
            debug!(record = name, %message, "treating failed TXT lookup as absent");
            Vec::new()
        }
    }
}

pub(crate) enum RecordSelection {
    None,
    One(String),
    Many(Vec<String>),
}

/// Trimmed records starting with `prefix` (ASCII case-insensitive).
pub(crate) fn select_records(records: &[String], prefix: &str) -> RecordSelection {
    let mut matching: Vec<String> = records
        .iter()
        .map(|record| record.trim())
        .filter(|record| {
            record
                .get(..prefix.len())
                .is_some_and(|head| head.eq_ignore_ascii_case(prefix))
        })
        .map(str::to_string)
        .collect();

    match matching.len() {
        0 => RecordSelection::None,
        1 => RecordSelection::One(matching.remove(0)),
        _ => {
            matching.sort();
            matching.dedup();
            RecordSelection::Many(matching)
        }
    }
}

#[cfg(test)]
mod tests;
