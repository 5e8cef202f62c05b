//! DNS lookups behind the [`DnsLookup`] seam.
//!
//! [`resolve_mx`] and [`resolve_txt`] never fail: resolver errors are logged
//! and folded into [`Lookup::Failed`], so callers decide how much to trust a
//! negative answer.

mod error;
mod resolver;
mod types;

pub use error::DnsError;
pub use resolver::{DnsLookup, SystemResolver};
pub use types::{DomainStatus, Lookup, MxRecord};

pub(crate) use resolver::fqdn;

use tracing::{debug, warn};

/// MX records for `ascii_domain`, sorted by preference and deduplicated.
///
/// A null MX is kept out of the list but still counts as [`Lookup::Found`].
pub async fn resolve_mx<R>(resolver: &R, ascii_domain: &str) -> Lookup<MxRecord>
where
    R: DnsLookup + ?Sized,
{
    match resolver.lookup_mx(ascii_domain).await {
        Ok(records) if records.is_empty() => {
            debug!(domain = ascii_domain, "no MX records");
            Lookup::NotFound
        }
        Ok(mut records) => {
            records.retain(|record| !record.is_null());
            records.sort();
            records.dedup();
            debug!(domain = ascii_domain, count = records.len(), "MX records resolved");
            Lookup::Found(records)
        }
        Err(err) => {
            warn!(domain = ascii_domain, error = %err, "MX lookup failed");
            Lookup::Failed(err.to_string())
        }
    }
}

/// TXT strings published at `name`.
pub async fn resolve_txt<R>(resolver: &R, name: &str) -> Lookup<String>
where
    R: DnsLookup + ?Sized,
{
    match resolver.lookup_txt(name).await {
        Ok(records) if records.is_empty() => Lookup::NotFound,
        Ok(records) => Lookup::Found(records),
        Err(err) => {
            warn!(record = name, error = %err, "TXT lookup failed");
            Lookup::Failed(err.to_string())
        }
    }
}
