use thiserror::Error;
use trust_dns_resolver::error::ResolveError;

/// Errors raised by the DNS layer. The tester never surfaces these directly;
/// they end up as [`Lookup::Failed`](super::Lookup::Failed).
#[derive(Debug, Error)]
pub enum DnsError {
    #[error("resolver initialization failed: {source}")]
    ResolverInit {
        #[source]
        source: ResolveError,
    },
    #[error("MX lookup failed for {name}: {source}")]
    MxLookup {
        name: String,
        #[source]
        source: ResolveError,
    },
    #[error("TXT lookup failed for {name}: {source}")]
    TxtLookup {
        name: String,
        #[source]
        source: ResolveError,
    },
    #[error("TXT record {name} contains invalid UTF-8 data: {source}")]
    TxtDataUtf8 {
        name: String,
        #[source]
        source: std::str::Utf8Error,
    },
}

impl DnsError {
    pub(crate) fn resolver_init(source: ResolveError) -> Self {
        Self::ResolverInit { source }
    }

    pub(crate) fn mx_lookup(name: impl Into<String>, source: ResolveError) -> Self {
        Self::MxLookup {
            name: name.into(),
            source,
        }
    }

    pub(crate) fn txt_lookup(name: impl Into<String>, source: ResolveError) -> Self {
        Self::TxtLookup {
            name: name.into(),
            source,
        }
    }

    pub(crate) fn txt_data_utf8(name: impl Into<String>, source: std::str::Utf8Error) -> Self {
        Self::TxtDataUtf8 {
            name: name.into(),
            source,
        }
    }
}
