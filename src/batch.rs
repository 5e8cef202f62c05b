//! Sequential runs of the tester over many addresses.

use std::time::Instant;

use tracing::info;

use crate::dns::DnsLookup;
use crate::tester::{DeliverabilityTester, TestOptions, TestResult};

/// One address and the options to test it with.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct BatchItem {
    pub email: String,
    pub options: TestOptions,
}

impl BatchItem {
    pub fn new(email: impl Into<String>, options: TestOptions) -> Self {
        Self {
            email: email.into(),
            options,
        }
    }
}

#[cfg_attr(feature = "with-serde", derive(serde::Serialize, serde::Deserialize))]
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct BatchResult {
    pub total: usize,
    pub success: usize,
    pub failed: usize,
    pub results: Vec<TestResult>,
    pub duration_ms: u64,
}

/// Validate-only classification of a list of addresses.
#[cfg_attr(feature = "with-serde", derive(serde::Serialize, serde::Deserialize))]
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ValidationBatch {
    pub total: usize,
    pub valid: usize,
    pub invalid: usize,
    pub valid_emails: Vec<TestResult>,
    pub invalid_emails: Vec<TestResult>,
}

impl<R: DnsLookup> DeliverabilityTester<R> {
    /// Tests every item in order. A result counts as a success when it
    /// [is deliverable](TestResult::is_deliverable).
    pub async fn run_batch(&self, items: Vec<BatchItem>) -> BatchResult {
        let started = Instant::now();
        let total = items.len();
        let mut results = Vec::with_capacity(total);

        for item in items {
            results.push(self.test_address(&item.email, &item.options).await);
        }

        let success = results.iter().filter(|r| r.is_deliverable()).count();
        let duration_ms = u64::try_from(started.elapsed().as_millis()).unwrap_or(u64::MAX);
        info!(total, success, duration_ms, "batch finished");

        BatchResult {
            total,
            success,
            failed: total - success,
            results,
            duration_ms,
        }
    }

    /// Splits `emails` into deliverable and undeliverable addresses without
    /// touching any backend.
    pub async fn validate_batch<I, S>(&self, emails: I) -> ValidationBatch
    where
        I: IntoIterator<Item = S>,
        S: AsRef<str>,
    {
        let mut batch = ValidationBatch::default();
        for email in emails {
            let result = self.validate_address(email.as_ref()).await;
            batch.total += 1;
            if result.is_deliverable() {
                batch.valid_emails.push(result);
            } else {
                batch.invalid_emails.push(result);
            }
        }
        batch.valid = batch.valid_emails.len();
        batch.invalid = batch.invalid_emails.len();
        batch
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::delivery::BackendSet;
    use crate::dns::tests::StubResolver;
    use crate::tester::BackendSelection;
    use proptest::prelude::*;

    fn tester() -> DeliverabilityTester<StubResolver> {
        DeliverabilityTester::with_parts(StubResolver::healthy("gmail.com"), BackendSet::default())
    }

    #[tokio::test]
    async fn empty_validation_batch() {
        let batch = tester().validate_batch(Vec::<String>::new()).await;
        assert_eq!(batch, ValidationBatch::default());
    }

    #[tokio::test]
    async fn validation_batch_partitions_every_address() {
        let emails = [
            "valid@gmail.com",
            "invalid-email",
            "test@nonexistentdomain12345.com",
        ];
        let batch = tester().validate_batch(emails).await;

        assert_eq!(batch.total, 3);
        assert_eq!(batch.valid_emails.len() + batch.invalid_emails.len(), 3);
        assert_eq!(batch.valid, 1);
        assert_eq!(batch.invalid, 2);
        assert_eq!(batch.valid_emails[0].email, "valid@gmail.com");
    }

    #[tokio::test]
    async fn run_batch_keeps_order_and_counts() {
        let skip = TestOptions::default()
            .with_backends(BackendSelection::Both)
            .with_skip_delivery(true);
        let items = vec![
            BatchItem::new("valid@gmail.com", skip.clone()),
            BatchItem::new("invalid-email", skip.clone()),
            BatchItem::new("test@nonexistentdomain12345.com", skip),
        ];

        let result = tester().run_batch(items).await;

        assert_eq!(result.total, 3);
        assert_eq!(result.success, 1);
        assert_eq!(result.failed, 2);
        let order: Vec<&str> = result.results.iter().map(|r| r.email.as_str()).collect();
        assert_eq!(
            order,
            ["valid@gmail.com", "invalid-email", "test@nonexistentdomain12345.com"]
        );
        assert_eq!(result.results[0].deliveries.len(), 2);
        for result in &result.results {
            for delivery in &result.deliveries {
                assert!(delivery.success && delivery.is_skipped(), "{delivery:?}");
            }
        }
    }

    fn address() -> impl Strategy<Value = String> {
        prop_oneof![
            "[a-z]{1,8}@gmail\\.com",
            "[a-z]{1,8}@[a-z]{1,8}\\.(com|org)",
            "[^@\\s]{0,12}",
            "[a-z@. ]{0,16}",
        ]
    }

    proptest! {
        #[test]
        fn validation_batch_accounts_for_every_address(emails in prop::collection::vec(address(), 0..12)) {
            let runtime = tokio::runtime::Builder::new_current_thread()
                .build()
                .expect("runtime");
            let batch = runtime.block_on(tester().validate_batch(emails.clone()));
            prop_assert_eq!(batch.total, emails.len());
            prop_assert_eq!(batch.valid + batch.invalid, emails.len());
            prop_assert_eq!(batch.valid_emails.len(), batch.valid);
            prop_assert_eq!(batch.invalid_emails.len(), batch.invalid);
        }
    }

    #[tokio::test]
    async fn run_batch_empty() {
        let result = tester().run_batch(Vec::new()).await;
        assert_eq!((result.total, result.success, result.failed), (0, 0, 0));
        assert!(result.results.is_empty());
    }
}
