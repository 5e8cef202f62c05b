use async_trait::async_trait;
use tracing::warn;
use trust_dns_resolver::{
    TokioAsyncResolver,
    config::{ResolverConfig, ResolverOpts},
    error::{ResolveError, ResolveErrorKind},
    lookup::TxtLookup,
};

use super::{DnsError, MxRecord};

/// The two queries the deliverability checks need.
///
/// "No such record" is an empty `Ok`; only resolver trouble is an `Err`.
#[async_trait]
pub trait DnsLookup: Send + Sync {
    async fn lookup_mx(&self, name: &str) -> Result<Vec<MxRecord>, DnsError>;
    async fn lookup_txt(&self, name: &str) -> Result<Vec<String>, DnsError>;
}

/// [`DnsLookup`] backed by the platform resolver configuration.
#[derive(Clone)]
pub struct SystemResolver {
    inner: TokioAsyncResolver,
}

impl SystemResolver {
    /// Reads `/etc/resolv.conf` (or the platform equivalent), falling back to
    /// the public default configuration when that fails.
    pub fn new() -> Self {
        Self::from_system_conf().unwrap_or_else(|err| {
            warn!(error = %err, "using default resolver configuration");
            Self::with_defaults()
        })
    }

    pub fn from_system_conf() -> Result<Self, DnsError> {
        let inner = TokioAsyncResolver::tokio_from_system_conf().map_err(DnsError::resolver_init)?;
        Ok(Self { inner })
    }

    pub fn with_defaults() -> Self {
        Self {
            inner: TokioAsyncResolver::tokio(ResolverConfig::default(), ResolverOpts::default()),
        }
    }
}

impl Default for SystemResolver {
    fn default() -> Self {
        Self::new()
    }
}

#[async_trait]
impl DnsLookup for SystemResolver {
    async fn lookup_mx(&self, name: &str) -> Result<Vec<MxRecord>, DnsError> {
        let lookup = match self.inner.mx_lookup(absolute_name(name)).await {
            Ok(lookup) => lookup,
            Err(err) if should_treat_as_empty(&err) => return Ok(Vec::new()),
            Err(err) => return Err(DnsError::mx_lookup(name, err)),
        };
        Ok(lookup
            .iter()
            .map(|mx| MxRecord::new(mx.preference(), normalize_exchange(&mx.exchange().to_utf8())))
            .collect())
    }

    async fn lookup_txt(&self, name: &str) -> Result<Vec<String>, DnsError> {
        let lookup = match self.inner.txt_lookup(absolute_name(name)).await {
            Ok(lookup) => lookup,
            Err(err) if should_treat_as_empty(&err) => return Ok(Vec::new()),
            Err(err) => return Err(DnsError::txt_lookup(name, err)),
        };
        collect_txt_records(name, &lookup)
    }
}

fn collect_txt_records(name: &str, lookup: &TxtLookup) -> Result<Vec<String>, DnsError> {
    let mut records = Vec::new();
    for txt in lookup.iter() {
        let mut record = String::new();
        for piece in txt.txt_data().iter() {
            let segment = std::str::from_utf8(piece.as_ref())
                .map_err(|err| DnsError::txt_data_utf8(name, err))?;
            record.push_str(segment);
        }
        records.push(record);
    }
    Ok(records)
}

fn should_treat_as_empty(err: &ResolveError) -> bool {
    matches!(err.kind(), ResolveErrorKind::NoRecordsFound { .. })
}

/// `name` with the root dot appended, so resolv.conf `search` domains are
/// never tried.
pub(crate) fn absolute_name(name: &str) -> String {
    let name = name.trim();
    if name.ends_with('.') {
        name.to_string()
    } else {
        format!("{name}.")
    }
}

/// Lower-cases and drops the trailing root dot. The root itself becomes `""`.
pub(crate) fn normalize_exchange(exchange: &str) -> String {
    exchange.trim_end_matches('.').to_ascii_lowercase()
}

/// `label.domain`, or `domain` alone when `label` is blank.
pub(crate) fn fqdn(label: &str, domain: &str) -> String {
    let trimmed = label.trim().trim_end_matches('.');
    if trimmed.is_empty() {
        domain.to_string()
    } else {
        format!("{}.{}", trimmed.to_ascii_lowercase(), domain)
    }
}
