use super::{
    DmarcIssue, DmarcPolicy, DmarcStatus, SpfIssue, SpfQualifier, SpfStatus, check_auth_records,
    dmarc, spf,
};
use crate::dns::tests::StubResolver;

fn records(input: &[&str]) -> Vec<String> {
    input.iter().map(|r| r.to_string()).collect()
}

#[test]
fn spf_reports_missing_when_no_records() {
    assert_eq!(spf::evaluate(&[]), SpfStatus::Missing);
    assert_eq!(
        spf::evaluate(&records(&["google-site-verification=abc"])),
        SpfStatus::Missing
    );
}

#[test]
fn spf_softfail_is_enforced() {
    let status = spf::evaluate(&records(&["v=spf1 include:_spf.example.net ~all"]));
    assert!(matches!(
        status,
        SpfStatus::Enforced {
            qualifier: SpfQualifier::SoftFail,
            ..
        }
    ));
    assert_eq!(status.record(), Some("v=spf1 include:_spf.example.net ~all"));
}

#[test]
fn spf_plus_all_is_permissive() {
    let status = spf::evaluate(&records(&["V=SPF1 +all"]));
    assert_eq!(status.summary(), "permissive (+all)");
}

#[test]
fn spf_redirect_marked_redirect() {
    match spf::evaluate(&records(&["v=spf1 redirect=_spf.example.net"])) {
        SpfStatus::Redirect { target, .. } => assert_eq!(target, "_spf.example.net"),
        other => panic!("expected redirect, got {other:?}"),
    }
}

#[test]
fn spf_without_all_or_redirect_is_malformed() {
    let status = spf::evaluate(&records(&["v=spf1 ip4:192.0.2.1"]));
    assert!(matches!(
        status,
        SpfStatus::Malformed {
            issue: SpfIssue::MissingAllMechanism,
            ..
        }
    ));
}

#[test]
fn spf_duplicates_reported() {
    let status = spf::evaluate(&records(&["v=spf1 -all", "v=spf1 ~all"]));
    assert!(matches!(status, SpfStatus::MultipleRecords { ref records } if records.len() == 2));
    assert_eq!(status.record(), None);
}

#[test]
fn dmarc_none_policy_is_monitoring() {
    let status = dmarc::evaluate(&records(&["v=DMARC1; p=none; rua=mailto:d@example.com"]));
    assert!(matches!(status, DmarcStatus::Monitoring { .. }));
}

#[test]
fn dmarc_partial_quarantine_keeps_percent() {
    let status = dmarc::evaluate(&records(&["v=DMARC1; p=quarantine; pct=25"]));
    assert_eq!(
        status,
        DmarcStatus::Enforced {
            record: "v=DMARC1; p=quarantine; pct=25".to_string(),
            policy: DmarcPolicy::Quarantine,
            percent: 25,
        }
    );
    assert_eq!(status.summary(), "enforced (p=quarantine, pct=25)");
}

#[test]
fn dmarc_unknown_policy_is_malformed() {
    let status = dmarc::evaluate(&records(&["v=DMARC1; p=bounce"]));
    assert!(matches!(
        status,
        DmarcStatus::Malformed {
            issue: DmarcIssue::UnknownPolicy { ref policy },
            ..
        } if policy == "bounce"
    ));
}

#[tokio::test]
async fn check_auth_records_combines_findings() {
    let stub = StubResolver::new()
        .with_txt("example.com", ["v=spf1 ip4:192.0.2.1 -all", "unrelated"])
        .with_txt("_dmarc.example.com", ["v=DMARC1; p=reject"]);

    let status = check_auth_records(&stub, "example.com").await;
    assert!(matches!(
        status.spf,
        SpfStatus::Enforced {
            qualifier: SpfQualifier::Fail,
            ..
        }
    ));
    assert!(matches!(
        status.dmarc,
        DmarcStatus::Enforced {
            policy: DmarcPolicy::Reject,
            percent: 100,
            ..
        }
    ));
}

#[tokio::test]
async fn failed_lookups_read_as_missing() {
    let stub = StubResolver::new()
        .failing("example.com")
        .failing("_dmarc.example.com");
    let status = check_auth_records(&stub, "example.com").await;
    assert_eq!(status.spf, SpfStatus::Missing);
    assert_eq!(status.dmarc, DmarcStatus::Missing);
}
