use crate::error::{ConfigError, LookupError};
use crate::validation::disposable::DisposableDomains;
use async_trait::async_trait;
use std::sync::Arc;
use std::time::Duration;
use tracing::debug;
use trust_dns_resolver::{
    TokioAsyncResolver,
    error::{ResolveError, ResolveErrorKind},
    system_conf::read_system_conf,
};

/// One mail exchanger from an MX answer.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct MxHost {
    pub preference: u16,
    /// Exchange name without the trailing root dot.
    pub exchange: String,
}

/// DNS queries the validation pipeline depends on.
///
/// Implementations must bound every call by their own timeout and report
/// failures as [`LookupError`] rather than panicking.
#[cfg_attr(test, mockall::automock)]
#[async_trait]
pub trait DnsLookup: Send + Sync {
    /// MX records for `domain`, in resolver order.
    async fn mx_lookup(&self, domain: &str) -> Result<Vec<MxHost>, LookupError>;

    /// TXT records for `name`, one string per record with its chunks concatenated.
    async fn txt_lookup(&self, name: &str) -> Result<Vec<String>, LookupError>;
}

/// [`DnsLookup`] backed by the async trust-dns resolver and the system configuration.
pub struct TrustDnsLookup {
    resolver: TokioAsyncResolver,
    timeout: Duration,
}

impl TrustDnsLookup {
    /// Creates a resolver from `/etc/resolv.conf` (or the platform equivalent)
    ///
    /// Configures the resolver with:
    /// - `timeout` per request, also enforced as a hard bound around each lookup
    /// - 2 attempts per query
    pub fn from_system_conf(timeout: Duration) -> Result<Self, ConfigError> {
        let (config, mut opts) =
            read_system_conf().map_err(|e| ConfigError::Resolver(e.to_string()))?;
        opts.timeout = timeout;
        opts.attempts = 2;

        Ok(Self {
            resolver: TokioAsyncResolver::tokio(config, opts),
            timeout,
        })
    }
}

#[async_trait]
impl DnsLookup for TrustDnsLookup {
    async fn mx_lookup(&self, domain: &str) -> Result<Vec<MxHost>, LookupError> {
        let lookup = tokio::time::timeout(self.timeout, self.resolver.mx_lookup(domain))
            .await
            .map_err(|_| LookupError::Timeout)?
            .map_err(classify)?;

        Ok(lookup
            .iter()
            .map(|mx| MxHost {
                preference: mx.preference(),
                exchange: mx.exchange().to_utf8().trim_end_matches('.').to_string(),
            })
            .collect())
    }

    async fn txt_lookup(&self, name: &str) -> Result<Vec<String>, LookupError> {
        let lookup = tokio::time::timeout(self.timeout, self.resolver.txt_lookup(name))
            .await
            .map_err(|_| LookupError::Timeout)?
            .map_err(classify)?;

        Ok(lookup
            .iter()
            .map(|txt| {
                txt.txt_data()
                    .iter()
                    .map(|chunk| String::from_utf8_lossy(chunk))
                    .collect::<String>()
            })
            .collect())
    }
}

fn classify(err: ResolveError) -> LookupError {
    match err.kind() {
        ResolveErrorKind::NoRecordsFound { .. } => LookupError::NoRecords,
        ResolveErrorKind::Timeout => LookupError::Timeout,
        _ => LookupError::Resolver(err.to_string()),
    }
}

/// What DNS and the disposable list say about one domain.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct DomainReport {
    pub has_mx: bool,
    /// Resolved exchangers, kept so the SMTP probe needs no second MX query.
    pub mx_hosts: Vec<MxHost>,
    /// `None` when the TXT lookup failed for a reason other than "no records".
    pub spf: Option<bool>,
    /// Any DMARC lookup failure reads as `false`.
    pub dmarc: bool,
    pub disposable: bool,
}

/// DNS-backed domain checks: MX presence, SPF, DMARC and disposable membership.
///
/// The three DNS lookups run concurrently and fail independently; none of
/// them ever returns an error to the caller.
#[derive(Clone)]
pub struct DomainIntelligence {
    dns: Arc<dyn DnsLookup>,
    disposable: Arc<DisposableDomains>,
}

impl DomainIntelligence {
    pub fn new(dns: Arc<dyn DnsLookup>, disposable: Arc<DisposableDomains>) -> Self {
        Self { dns, disposable }
    }

    pub fn disposable_domains(&self) -> &Arc<DisposableDomains> {
        &self.disposable
    }

    /// Runs every check for `domain` (already lowercased).
    pub async fn inspect(&self, domain: &str) -> DomainReport {
        let disposable = self.is_disposable(domain);
        let (mx_hosts, spf, dmarc) = tokio::join!(
            self.lookup_mx(domain),
            self.lookup_spf(domain),
            self.lookup_dmarc(domain)
        );

        DomainReport {
            has_mx: !mx_hosts.is_empty(),
            mx_hosts,
            spf,
            dmarc,
            disposable,
        }
    }

    pub fn is_disposable(&self, domain: &str) -> bool {
        self.disposable.contains(domain)
    }

    /// MX records, or an empty list when resolution fails for any reason.
    pub async fn lookup_mx(&self, domain: &str) -> Vec<MxHost> {
        match self.dns.mx_lookup(domain).await {
            Ok(hosts) => {
                debug!(domain, count = hosts.len(), "MX lookup succeeded");
                hosts
            }
            Err(e) => {
                debug!(domain, error = %e, "MX lookup failed");
                Vec::new()
            }
        }
    }

    /// `Some(true)` if any TXT record is an SPF policy, `Some(false)` if none is
    /// (including an empty answer), `None` if the lookup itself failed.
    pub async fn lookup_spf(&self, domain: &str) -> Option<bool> {
        match self.dns.txt_lookup(domain).await {
            Ok(records) => Some(records.iter().any(|r| is_spf_record(r))),
            Err(LookupError::NoRecords) => Some(false),
            Err(e) => {
                debug!(domain, error = %e, "SPF lookup failed");
                None
            }
        }
    }

    /// `true` iff `_dmarc.<domain>` returns at least one TXT record.
    pub async fn lookup_dmarc(&self, domain: &str) -> bool {
        let name = format!("_dmarc.{}", domain);
        match self.dns.txt_lookup(&name).await {
            Ok(records) => !records.is_empty(),
            Err(e) => {
                debug!(domain, error = %e, "DMARC lookup failed");
                false
            }
        }
    }
}

/// Case-insensitive `v=spf1` version token at the start of the record.
pub fn is_spf_record(record: &str) -> bool {
    let record = record.trim_start();
    match record.get(..6) {
        Some(prefix) if prefix.eq_ignore_ascii_case("v=spf1") => record[6..]
            .chars()
            .next()
            .is_none_or(char::is_whitespace),
        _ => false,
    }
}

/// Most preferred exchanger: lowest preference value, ties broken by resolver order.
///
/// Null MX entries (RFC 7505, exchange `.`) are never selected.
pub fn preferred_mx(hosts: &[MxHost]) -> Option<&MxHost> {
    hosts
        .iter()
        .filter(|h| !h.exchange.is_empty())
        .min_by_key(|h| h.preference)
}
