use std::ops::Range;
use std::time::Duration;

use async_trait::async_trait;
#[cfg(test)]
use mockall::automock;
use reqwest::{Client, redirect::Policy};
use tracing::debug;

use crate::config::ValidatorConfig;
use crate::error::{ProbeError, ValidationError};
use crate::validation::syntax::is_valid_host_name;

/// Status codes treated as "the domain answers". Redirects count, a domain
/// commonly sends visitors on to its main site.
pub const REACHABLE_STATUS: Range<u16> = 200..400;

/// A single outbound request against a domain, returning its HTTP status.
#[cfg_attr(test, automock)]
#[async_trait]
pub trait DomainProbe: Send + Sync {
    async fn status(&self, domain: &str) -> Result<u16, ProbeError>;
}

/// Probes a domain with `HEAD http://<domain>/` using a native HTTP client.
///
/// Configured with:
/// - an explicit request timeout (`PROBE_TIMEOUT_SECS`)
/// - a redirect limit (`PROBE_MAX_REDIRECTS`, `0` disables following)
#[derive(Clone)]
pub struct HttpProbe {
    client: Client,
}

impl HttpProbe {
    /// Builds the prober and its HTTP client.
    ///
    /// # Arguments
    /// * `timeout` - Upper bound for the whole request, connect included.
    /// * `max_redirects` - Redirects to follow before giving up; `0` returns
    ///   the 3xx status as is.
    ///
    /// # Errors
    /// [`ValidationError::Internal`] if the client cannot be built (no TLS
    /// backend available).
    pub fn new(timeout: Duration, max_redirects: usize) -> Result<Self, ValidationError> {
        let redirect = if max_redirects == 0 {
            Policy::none()
        } else {
            Policy::limited(max_redirects)
        };

        let client = Client::builder()
            .timeout(timeout)
            .redirect(redirect)
            .build()
            .map_err(|e| ValidationError::Internal(format!("Failed to build HTTP client: {e}")))?;

        Ok(Self { client })
    }

    /// Same as [`HttpProbe::new`] with `PROBE_TIMEOUT_SECS` and
    /// `PROBE_MAX_REDIRECTS`.
    pub fn from_config(config: &ValidatorConfig) -> Result<Self, ValidationError> {
        Self::new(config.probe_timeout(), config.probe_max_redirects)
    }
}

#[async_trait]
impl DomainProbe for HttpProbe {
    async fn status(&self, domain: &str) -> Result<u16, ProbeError> {
        let url = format!("http://{domain}/");
        debug!(%url, "Probing domain");

        let response = self.client.head(&url).send().await.map_err(|e| {
            if e.is_timeout() {
                ProbeError::Timeout {
                    domain: domain.to_string(),
                }
            } else if e.is_connect() {
                ProbeError::Connect {
                    domain: domain.to_string(),
                    reason: e.to_string(),
                }
            } else {
                ProbeError::Request {
                    domain: domain.to_string(),
                    reason: e.to_string(),
                }
            }
        })?;

        Ok(response.status().as_u16())
    }
}

/// Classifies a domain as reachable or not through an injected [`DomainProbe`].
pub struct ReachabilityChecker {
    probe: Box<dyn DomainProbe>,
}

impl ReachabilityChecker {
    /// Wraps `probe`; every reachability check goes through it.
    pub fn new(probe: Box<dyn DomainProbe>) -> Self {
        Self { probe }
    }

    /// Checks whether `domain` answers with a status in [`REACHABLE_STATUS`].
    ///
    /// # Errors
    /// - [`ValidationError::InvalidDomain`] if `domain` is not a host name,
    ///   no probe is issued in that case
    /// - [`ValidationError::Probe`] if the probe itself failed
    pub async fn is_domain_reachable(&self, domain: &str) -> Result<bool, ValidationError> {
        if !is_valid_host_name(domain) {
            return Err(ValidationError::InvalidDomain(domain.to_string()));
        }

        let status = self.probe.status(domain).await?;
        debug!(domain, status, "Probe answered");

        Ok(REACHABLE_STATUS.contains(&status))
    }
}
