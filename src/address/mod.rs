//! Address shape checks.
//!
//! [`is_valid_format`] is the gate used by the deliverability tester: it only
//! asks for something shaped like `local@domain.tld`. [`check_address`] goes
//! further and lists every rule the address breaks, which the CLI prints next
//! to the verdict.

mod domain;
mod types;

pub use types::{AddressReport, ParsedAddress};

pub(crate) use domain::normalize_domain;

use std::sync::OnceLock;

use regex::Regex;

use domain::check_domain;

const SHAPE_PATTERN: &str = r"^[^\s@]+@[^\s@]+\.[^\s@]+$";

fn shape() -> &'static Regex {
    static SHAPE: OnceLock<Regex> = OnceLock::new();
    SHAPE.get_or_init(|| Regex::new(SHAPE_PATTERN).expect("address pattern is a valid regex"))
}

/// Returns `true` when `email` looks like `local@domain.tld`.
///
/// Leading and trailing whitespace is ignored.
pub fn is_valid_format(email: &str) -> bool {
    shape().is_match(email.trim())
}

/// Splits `email` on its last `@`. No validation is performed.
pub fn split_address(email: &str) -> Option<(&str, &str)> {
    email.trim().rsplit_once('@')
}

/// Full rule check: shape, lengths, local-part dots, domain labels.
pub fn check_address(email: &str) -> AddressReport {
    let input = email.trim();
    let mut reasons = Vec::new();

    if input.len() > 254 {
        reasons.push(format!("total length {} > 254", input.len()));
    }

    if !is_valid_format(input) {
        reasons.push("does not match local@domain.tld".to_string());
    }

    let Some((local, domain)) = input.split_once('@') else {
        reasons.push("missing '@'".to_string());
        return AddressReport::invalid(input, reasons);
    };
    if domain.contains('@') {
        reasons.push("must contain exactly one '@'".to_string());
        return AddressReport::invalid(input, reasons);
    }

    if local.is_empty() || local.len() > 64 {
        reasons.push(format!(
            "local part length {} invalid (1..=64)",
            local.len()
        ));
    }
    if local.starts_with('.') || local.ends_with('.') || local.contains("..") {
        reasons.push("local part has a leading, trailing or doubled '.'".to_string());
    }

    let ascii_domain = normalize_domain(domain);
    match &ascii_domain {
        Some(ascii) => check_domain(ascii, &mut reasons),
        None => reasons.push("domain punycode conversion failed".to_string()),
    }

    AddressReport {
        original: input.to_string(),
        ok: reasons.is_empty(),
        reasons,
        parsed: Some(ParsedAddress {
            local: local.to_string(),
            domain: domain.to_string(),
            ascii_domain: ascii_domain.unwrap_or_default(),
        }),
    }
}
