//! Deliverability checks for one address: format, MX, SPF, DMARC and an
//! optional test send through the configured backends.

mod recommendations;
mod types;

#[cfg(feature = "with-csv")]
pub use types::CSV_HEADER;
pub use types::{BackendSelection, DEFAULT_MESSAGE, DEFAULT_SUBJECT, TestOptions, TestResult};

use std::time::Instant;

use tracing::debug;

use crate::address::{is_valid_format, normalize_domain, split_address};
use crate::auth::check_auth_records;
use crate::config::MailerConfig;
use crate::delivery::{
    self, BackendKind, BackendSet, DeliveryError, OutgoingEmail, SendResult,
};
use crate::dns::{DnsLookup, DomainStatus, SystemResolver, resolve_mx};

use recommendations::recommend;

/// Runs the checks behind [`test_address`](Self::test_address).
///
/// Holds the resolver and backend handles; build it once and reuse it.
pub struct DeliverabilityTester<R = SystemResolver> {
    resolver: R,
    backends: BackendSet,
}

impl DeliverabilityTester<SystemResolver> {
    pub fn new(config: &MailerConfig) -> Result<Self, DeliveryError> {
        Ok(Self::with_parts(
            SystemResolver::new(),
            BackendSet::from_config(config)?,
        ))
    }
}

impl<R: DnsLookup> DeliverabilityTester<R> {
    pub fn with_parts(resolver: R, backends: BackendSet) -> Self {
        Self { resolver, backends }
    }

    pub fn backends(&self) -> &BackendSet {
        &self.backends
    }

    /// Never fails: problems are reported through the returned fields and
    /// its recommendations.
    pub async fn test_address(&self, email: &str, options: &TestOptions) -> TestResult {
        let started = Instant::now();
        let email = email.trim();

        let mut result = match split_address(email) {
            Some((_, domain)) if is_valid_format(email) => {
                self.inspect(email, domain, options).await
            }
            _ => {
                debug!(email, "rejected by format check");
                TestResult::invalid_format(email)
            }
        };

        result.recommendations = recommend(&result);
        result.elapsed_ms = u64::try_from(started.elapsed().as_millis()).unwrap_or(u64::MAX);
        result
    }

    /// [`test_address`](Self::test_address) without any backend.
    pub async fn validate_address(&self, email: &str) -> TestResult {
        self.test_address(email, &TestOptions::validate_only()).await
    }

    async fn inspect(&self, email: &str, domain: &str, options: &TestOptions) -> TestResult {
        let ascii_domain = normalize_domain(domain).unwrap_or_else(|| domain.to_ascii_lowercase());

        let mx = resolve_mx(&self.resolver, &ascii_domain).await;
        let domain_status = DomainStatus::from(&mx);
        let auth = check_auth_records(&self.resolver, &ascii_domain).await;

        let mut deliveries = Vec::with_capacity(options.backends.kinds().len());
        for &kind in options.backends.kinds() {
            deliveries.push(self.deliver(kind, email, options).await);
        }

        TestResult {
            email: email.to_string(),
            is_valid: true,
            domain: Some(domain.to_string()),
            domain_exists: domain_status.exists(),
            domain_status,
            mx_records: mx.into_records(),
            spf_record: auth.spf.record().map(str::to_string),
            spf: auth.spf,
            dmarc_record: auth.dmarc.record().map(str::to_string),
            dmarc: auth.dmarc,
            deliveries,
            recommendations: Vec::new(),
            elapsed_ms: 0,
        }
    }

    async fn deliver(&self, kind: BackendKind, email: &str, options: &TestOptions) -> SendResult {
        if options.skip_delivery {
            debug!(backend = %kind, email, "delivery skipped");
            return SendResult::skipped(kind);
        }
        let Some(backend) = self.backends.get(kind) else {
            return SendResult::failed(kind, DeliveryError::not_configured(kind));
        };
        let message = OutgoingEmail::new(email, options.subject.clone())
            .with_text(options.message.clone());
        delivery::attempt(backend.as_ref(), &message).await
    }
}
