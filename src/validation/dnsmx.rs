use std::net::IpAddr;

use async_trait::async_trait;
#[cfg(test)]
use mockall::automock;
use thiserror::Error;
use tokio::sync::OnceCell;
use tracing::debug;
use trust_dns_resolver::{
    TokioAsyncResolver,
    config::{ResolverConfig, ResolverOpts},
    error::{ResolveError, ResolveErrorKind},
    system_conf,
};

use crate::config::ValidatorConfig;
use crate::error::ValidationError;
use crate::validation::deep::DeepValidation;

/// Top-level names that never resolve on the public internet
/// (RFC 2606, RFC 6761, RFC 6762 and common private-use names).
pub const RESERVED_TOP_LEVEL_NAMES: &[&str] = &[
    "alt", "arpa", "corp", "example", "home", "internal", "intranet", "invalid", "lan", "local",
    "localhost", "mail", "onion", "private", "test",
];

pub const LOCAL_OR_RESERVED_DOMAIN: &str = "Local or reserved domain";
pub const UNABLE_TO_GET_RECORDS: &str = "Unable to get DNS records for the domain";
pub const DOMAIN_ACCEPTS_NO_MAIL: &str = "Domain accepts no mail (Null MX)";
pub const NO_DNS_RECORD: &str = "No MX, A or AAAA record was found for this domain";
pub const NO_MX_RECORD: &str = "No MX record was found for this domain, falling back to A/AAAA";

/// Errors returned by a [`RecordResolver`].
#[derive(Debug, Error)]
pub enum DnsLookupError {
    /// The query was sent but failed (SERVFAIL, timeout, refused, ...).
    #[error("DNS lookup failed: {0}")]
    Failed(String),

    /// The resolver itself could not be set up.
    #[error("DNS resolver unavailable: {0}")]
    Unavailable(String),
}

/// A mail exchanger for a domain.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct MxRecord {
    pub preference: u16,
    pub exchange: String,
}

impl MxRecord {
    /// A "Null MX" (RFC 7505) announces that the domain accepts no mail.
    pub fn is_null(&self) -> bool {
        self.exchange.is_empty() || self.exchange == "."
    }
}

/// DNS lookups needed by [`DnsRecordCheck`]. A missing record set is an
/// empty `Vec`, not an error.
#[cfg_attr(test, automock)]
#[async_trait]
pub trait RecordResolver: Send + Sync {
    async fn mx(&self, host: &str) -> Result<Vec<MxRecord>, DnsLookupError>;

    async fn addresses(&self, host: &str) -> Result<Vec<IpAddr>, DnsLookupError>;
}

/// [`RecordResolver`] backed by `trust-dns-resolver`.
///
/// The underlying resolver is built on first use, with:
/// - `DNS_TIMEOUT_SECS` timeout per request
/// - `DNS_ATTEMPTS` retry attempts
/// - the system resolver configuration, or the built-in upstreams when
///   `DNS_USE_SYSTEM_CONF` is off
pub struct TrustDnsResolver {
    config: ValidatorConfig,
    resolver: OnceCell<TokioAsyncResolver>,
}

impl TrustDnsResolver {
    pub fn new(config: &ValidatorConfig) -> Self {
        Self {
            config: config.clone(),
            resolver: OnceCell::new(),
        }
    }

    async fn resolver(&self) -> Result<&TokioAsyncResolver, DnsLookupError> {
        self.resolver
            .get_or_try_init(|| async { create_resolver(&self.config) })
            .await
    }
}

fn create_resolver(config: &ValidatorConfig) -> Result<TokioAsyncResolver, DnsLookupError> {
    let (resolver_config, mut opts) = if config.dns_use_system_conf {
        system_conf::read_system_conf().map_err(|e| DnsLookupError::Unavailable(e.to_string()))?
    } else {
        (ResolverConfig::default(), ResolverOpts::default())
    };
    opts.timeout = config.dns_timeout();
    opts.attempts = config.dns_attempts;

    Ok(TokioAsyncResolver::tokio(resolver_config, opts))
}

fn is_no_records(error: &ResolveError) -> bool {
    matches!(error.kind(), ResolveErrorKind::NoRecordsFound { .. })
}

#[async_trait]
impl RecordResolver for TrustDnsResolver {
    async fn mx(&self, host: &str) -> Result<Vec<MxRecord>, DnsLookupError> {
        match self.resolver().await?.mx_lookup(host).await {
            Ok(lookup) => Ok(lookup
                .iter()
                .map(|mx| MxRecord {
                    preference: mx.preference(),
                    exchange: mx.exchange().to_utf8(),
                })
                .collect()),
            Err(e) if is_no_records(&e) => Ok(Vec::new()),
            Err(e) => Err(DnsLookupError::Failed(e.to_string())),
        }
    }

    async fn addresses(&self, host: &str) -> Result<Vec<IpAddr>, DnsLookupError> {
        match self.resolver().await?.lookup_ip(host).await {
            Ok(lookup) => Ok(lookup.iter().collect()),
            Err(e) if is_no_records(&e) => Ok(Vec::new()),
            Err(e) => Err(DnsLookupError::Failed(e.to_string())),
        }
    }
}

/// Checks that a domain can receive mail according to DNS.
///
/// 1. Rejects single-label and reserved top-level domains without a lookup
/// 2. Looks up MX records, rejecting a Null MX
/// 3. Falls back to A/AAAA records when there is no MX, with a warning
pub struct DnsRecordCheck {
    resolver: Box<dyn RecordResolver>,
}

impl DnsRecordCheck {
    pub fn new(resolver: Box<dyn RecordResolver>) -> Self {
        Self { resolver }
    }

    /// # Errors
    /// Returns [`ValidationError::Internal`] only when the resolver could not
    /// be set up. Lookup failures are reported inside the returned
    /// [`DeepValidation`].
    pub async fn check(&self, domain: &str) -> Result<DeepValidation, ValidationError> {
        if is_local_or_reserved(domain) {
            return Ok(DeepValidation::rejected(LOCAL_OR_RESERVED_DOMAIN));
        }

        // Fully qualified, so resolv.conf search domains are never appended.
        let host = format!("{}.", domain.trim_end_matches('.'));

        let mx_records = match self.resolver.mx(&host).await {
            Ok(records) => records,
            Err(DnsLookupError::Unavailable(reason)) => {
                return Err(ValidationError::Internal(reason));
            }
            Err(DnsLookupError::Failed(reason)) => {
                debug!(domain, %reason, "MX lookup failed");
                return Ok(DeepValidation::rejected(UNABLE_TO_GET_RECORDS));
            }
        };

        if mx_records.iter().any(MxRecord::is_null) {
            return Ok(DeepValidation::rejected(DOMAIN_ACCEPTS_NO_MAIL));
        }

        if !mx_records.is_empty() {
            return Ok(DeepValidation::passed());
        }

        match self.resolver.addresses(&host).await {
            Ok(addresses) if addresses.is_empty() => Ok(DeepValidation::rejected(NO_DNS_RECORD)),
            Ok(_) => Ok(DeepValidation::passed().with_warning(NO_MX_RECORD)),
            Err(DnsLookupError::Unavailable(reason)) => Err(ValidationError::Internal(reason)),
            Err(DnsLookupError::Failed(reason)) => {
                debug!(domain, %reason, "A/AAAA lookup failed");
                Ok(DeepValidation::rejected(UNABLE_TO_GET_RECORDS))
            }
        }
    }
}

fn is_local_or_reserved(domain: &str) -> bool {
    let labels: Vec<&str> = domain.trim_end_matches('.').split('.').collect();
    if labels.len() <= 1 {
        return true;
    }

    labels.last().is_some_and(|tld| {
        let tld = tld.to_lowercase();
        RESERVED_TOP_LEVEL_NAMES.contains(&tld.as_str())
    })
}
