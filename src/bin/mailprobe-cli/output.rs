#[cfg(any(feature = "with-serde", feature = "with-csv"))]
use anyhow::Context;
use anyhow::{Result, bail};

use mailprobe_lib::{DomainStatus, MxRecord, SendResult, TestResult, check_address};

use crate::args::Cli;

pub fn write_reports(results: &[TestResult], cli: &Cli) -> Result<()> {
    match cli.format.as_str() {
        "human" => write_text(&render_human(results), cli.out.as_deref()),
        "json" => write_json(results, cli.out.as_deref()),
        "ndjson" => write_ndjson(results, cli.out.as_deref()),
        "csv" => write_csv(results, cli.out.as_deref()),
        other => bail!("unknown --format '{other}', use: human|json|ndjson|csv"),
    }
}

pub fn render_human(results: &[TestResult]) -> String {
    let mut out = String::new();
    for result in results {
        let tag = if result.is_deliverable() {
            "[OK]"
        } else if result.is_valid {
            "[UNDELIVERABLE]"
        } else {
            "[INVALID]"
        };
        out.push_str(&format!("{tag} {}\n", result.email));

        if !result.is_valid {
            let report = check_address(&result.email);
            out.push_str(&format!("    reasons: {}\n", report.reasons.join("; ")));
        } else {
            out.push_str(&format!(
                "    domain: {} ({})\n",
                result.domain.as_deref().unwrap_or(""),
                domain_label(&result.domain_status)
            ));
            out.push_str(&format!("    mx: {}\n", mx_summary(&result.mx_records)));
            out.push_str(&format!("    spf: {}\n", result.spf.summary()));
            out.push_str(&format!("    dmarc: {}\n", result.dmarc.summary()));
        }
        for delivery in &result.deliveries {
            out.push_str(&format!("    delivery: {}\n", delivery_summary(delivery)));
        }
        for line in &result.recommendations {
            out.push_str(&format!("    - {line}\n"));
        }
    }
    out
}

fn domain_label(status: &DomainStatus) -> String {
    match status {
        DomainStatus::Exists => "exists".to_string(),
        DomainStatus::NotFound => "not found".to_string(),
        DomainStatus::LookupFailed { message } => format!("lookup failed: {message}"),
        DomainStatus::NotChecked => "not checked".to_string(),
    }
}

fn mx_summary(records: &[MxRecord]) -> String {
    if records.is_empty() {
        return "none".to_string();
    }
    records
        .iter()
        .map(|record| format!("{} {}", record.preference, record.exchange))
        .collect::<Vec<_>>()
        .join(", ")
}

pub fn delivery_summary(result: &SendResult) -> String {
    let backend = result
        .backend
        .map(|kind| kind.to_string())
        .unwrap_or_else(|| "-".to_string());
    if result.is_skipped() {
        format!("{backend} skipped")
    } else if result.success {
        match &result.message_id {
            Some(id) => format!("{backend} ok ({id})"),
            None => format!("{backend} ok"),
        }
    } else {
        format!(
            "{backend} failed: {}",
            result.error.as_deref().unwrap_or("unknown error")
        )
    }
}

pub fn write_text(text: &str, out: Option<&str>) -> Result<()> {
    match out {
        Some(path) => write_all_atomically(path, text.as_bytes()),
        None => {
            print!("{text}");
            Ok(())
        }
    }
}

#[cfg(feature = "with-serde")]
pub fn write_json<T: serde::Serialize + ?Sized>(value: &T, out: Option<&str>) -> Result<()> {
    let mut s = serde_json::to_string_pretty(value).context("serialize report")?;
    s.push('\n');
    write_text(&s, out)
}

#[cfg(not(feature = "with-serde"))]
pub fn write_json<T: ?Sized>(_value: &T, _out: Option<&str>) -> Result<()> {
    bail!("format=json nécessite la feature 'with-serde'")
}

#[cfg(feature = "with-serde")]
fn write_ndjson(results: &[TestResult], out: Option<&str>) -> Result<()> {
    let mut buf = String::new();
    for result in results {
        buf.push_str(&serde_json::to_string(result).context("serialize result")?);
        buf.push('\n');
    }
    write_text(&buf, out)
}

#[cfg(not(feature = "with-serde"))]
fn write_ndjson(_results: &[TestResult], _out: Option<&str>) -> Result<()> {
    bail!("format=ndjson nécessite la feature 'with-serde'")
}

#[cfg(feature = "with-csv")]
fn write_csv(results: &[TestResult], out: Option<&str>) -> Result<()> {
    let mut wtr = csv::Writer::from_writer(Vec::new());
    wtr.write_record(mailprobe_lib::tester::CSV_HEADER)?;
    for result in results {
        wtr.write_record(result.csv_fields())?;
    }
    let data = wtr.into_inner().context("flush csv")?;
    match out {
        Some(path) => write_all_atomically(path, &data),
        None => {
            use std::io::Write;
            std::io::stdout().write_all(&data)?;
            Ok(())
        }
    }
}

#[cfg(not(feature = "with-csv"))]
fn write_csv(_results: &[TestResult], _out: Option<&str>) -> Result<()> {
    bail!("format=csv nécessite la feature 'with-csv'")
}

fn write_all_atomically(path: &str, bytes: &[u8]) -> Result<()> {
    use std::io::Write;

    let tmp = format!("{path}.tmp");
    {
        let mut f = std::fs::File::create(&tmp)?;
        f.write_all(bytes)?;
        f.sync_all()?;
    }
    std::fs::rename(&tmp, path).map_err(|err| anyhow::anyhow!("rename {tmp} -> {path}: {err}"))?;
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use mailprobe_lib::auth::{DmarcPolicy, SpfQualifier};
    use mailprobe_lib::{BackendKind, DmarcStatus, SpfStatus};

    fn deliverable() -> TestResult {
        TestResult {
            email: "alice@example.com".to_string(),
            is_valid: true,
            domain: Some("example.com".to_string()),
            domain_exists: true,
            domain_status: DomainStatus::Exists,
            mx_records: vec![
                MxRecord::new(10, "mx1.example.com"),
                MxRecord::new(20, "mx2.example.com"),
            ],
            spf_record: Some("v=spf1 ~all".to_string()),
            spf: SpfStatus::Enforced {
                record: "v=spf1 ~all".to_string(),
                qualifier: SpfQualifier::SoftFail,
            },
            dmarc_record: Some("v=DMARC1; p=reject".to_string()),
            dmarc: DmarcStatus::Enforced {
                record: "v=DMARC1; p=reject".to_string(),
                policy: DmarcPolicy::Reject,
                percent: 100,
            },
            deliveries: vec![SendResult::skipped(BackendKind::Smtp)],
            recommendations: vec!["Email configuration looks good for deliverability.".to_string()],
            elapsed_ms: 12,
        }
    }

    fn invalid() -> TestResult {
        TestResult {
            email: "invalid-email".to_string(),
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
            recommendations: vec!["Invalid email format.".to_string()],
            elapsed_ms: 0,
        }
    }

    #[test]
    fn human_report() {
        let rendered = render_human(&[deliverable(), invalid()]);
        insta::assert_snapshot!(rendered.trim_end(), @r"
        [OK] alice@example.com
            domain: example.com (exists)
            mx: 10 mx1.example.com, 20 mx2.example.com
            spf: enforced (~all)
            dmarc: enforced (p=reject)
            delivery: smtp skipped
            - Email configuration looks good for deliverability.
        [INVALID] invalid-email
            reasons: does not match local@domain.tld; missing '@'
            - Invalid email format.
        ");
    }

    #[test]
    fn delivery_lines() {
        assert_eq!(
            delivery_summary(&SendResult::delivered(BackendKind::AwsSes, Some("abc".into()))),
            "aws-ses ok (abc)"
        );
        assert_eq!(
            delivery_summary(&SendResult::unrouted("no sender")),
            "- failed: no sender"
        );
    }

    #[cfg(feature = "with-serde")]
    #[test]
    fn json_keeps_typed_statuses() {
        let value = serde_json::to_value(deliverable()).expect("json");
        assert_eq!(value["domain_status"]["status"], "exists");
        assert_eq!(value["deliveries"][0]["backend"], "smtp");
        assert_eq!(value["deliveries"][0]["message_id"], "skipped-real-delivery");
    }
}
