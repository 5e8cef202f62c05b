/// IDNA-normalises `domain` for DNS queries: trimmed, trailing dot removed,
/// punycode-encoded and lower-cased. Returns `None` when nothing usable is left.
pub(crate) fn normalize_domain(domain: &str) -> Option<String> {
    let trimmed = domain.trim().trim_end_matches('.');
    if trimmed.is_empty() {
        return None;
    }
    idna::domain_to_ascii(trimmed)
        .ok()
        .filter(|ascii| !ascii.is_empty())
}

/// Label rules for an already ASCII domain. Violations are pushed to `reasons`.
pub(crate) fn check_domain(ascii: &str, reasons: &mut Vec<String>) {
    if !ascii.contains('.') {
        reasons.push("domain must contain at least one dot".to_string());
    }

    for label in ascii.split('.') {
        if label.is_empty() {
            reasons.push("empty domain label".to_string());
            continue;
        }
        if label.len() > 63 {
            reasons.push(format!("domain label '{label}' length {} > 63", label.len()));
        }
        if label.starts_with('-') || label.ends_with('-') {
            reasons.push(format!("domain label '{label}' cannot start/end with '-'"));
        }
        if !label.chars().all(|c| c.is_ascii_alphanumeric() || c == '-') {
            reasons.push(format!("domain label '{label}' has invalid chars"));
        }
    }
}
