use crate::auth::{DmarcStatus, SpfStatus};
use crate::dns::DomainStatus;

use super::TestResult;

pub(crate) const ALL_CLEAR: &str = "Email configuration looks good for deliverability.";

/// One line per problem found in `result`, or [`ALL_CLEAR`].
pub(crate) fn recommend(result: &TestResult) -> Vec<String> {
    let mut lines = Vec::new();

    if !result.is_valid {
        lines.push(format!(
            "Invalid email format: {:?} does not look like local@domain.tld.",
            result.email
        ));
        return lines;
    }

    let domain = result.domain.as_deref().unwrap_or("");
    match &result.domain_status {
        DomainStatus::NotFound => lines.push(format!(
            "Domain {domain} does not exist or publishes no MX records; mail to it cannot be delivered."
        )),
        DomainStatus::LookupFailed { message } => lines.push(format!(
            "DNS lookup for domain {domain} failed ({message}); retry before treating the address as bad."
        )),
        DomainStatus::Exists if result.mx_records.is_empty() => lines.push(format!(
            "Domain {domain} publishes a null MX and explicitly accepts no mail."
        )),
        DomainStatus::Exists | DomainStatus::NotChecked => {}
    }

    match &result.spf {
        SpfStatus::Missing => lines.push(format!(
            "No SPF record found for {domain}; publish a v=spf1 TXT record."
        )),
        SpfStatus::MultipleRecords { records } => lines.push(format!(
            "{domain} publishes {} SPF records; merge them into one.",
            records.len()
        )),
        SpfStatus::Malformed { .. } => lines.push(format!(
            "SPF record for {domain} is malformed ({}).",
            result.spf.summary()
        )),
        SpfStatus::Permissive { qualifier, .. } => lines.push(format!(
            "SPF record for {domain} ends in {} and lets anyone send; use ~all or -all.",
            qualifier.token()
        )),
        SpfStatus::Enforced { .. } | SpfStatus::Redirect { .. } => {}
    }

    match &result.dmarc {
        DmarcStatus::Missing => lines.push(format!(
            "No DMARC record found at _dmarc.{domain}; publish one to protect the domain."
        )),
        DmarcStatus::MultipleRecords { .. } => lines.push(format!(
            "_dmarc.{domain} publishes several DMARC records; receivers will ignore them all."
        )),
        DmarcStatus::Malformed { .. } => lines.push(format!(
            "DMARC record for {domain} is malformed ({}).",
            result.dmarc.summary()
        )),
        DmarcStatus::Monitoring { .. } => lines.push(format!(
            "DMARC policy for {domain} is p=none; move to quarantine or reject once reports are clean."
        )),
        DmarcStatus::Enforced { .. } => {}
    }

    for delivery in result.deliveries.iter().filter(|d| !d.success) {
        let backend = delivery
            .backend
            .map(|kind| kind.to_string())
            .unwrap_or_else(|| "delivery".to_string());
        lines.push(format!(
            "Delivery through {backend} failed: {}",
            delivery.error.as_deref().unwrap_or("unknown error")
        ));
    }

    if lines.is_empty() {
        lines.push(ALL_CLEAR.to_string());
    }
    lines
}
