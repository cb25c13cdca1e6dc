use async_trait::async_trait;
#[cfg(test)]
use mockall::automock;
use serde::Serialize;

use crate::config::ValidatorConfig;
use crate::error::ValidationError;
use crate::validation::dnsmx::{DnsRecordCheck, RecordResolver, TrustDnsResolver};
use crate::validation::domain::extract_domain;
use crate::validation::syntax::is_syntactically_valid;

pub const INVALID_SYNTAX: &str = "Email address has invalid syntax";

/// Outcome of a deep validation: the verdict plus whatever the sub-checks
/// had to say about the address.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
pub struct DeepValidation {
    pub is_valid: bool,
    pub warnings: Vec<String>,
    pub error: Option<String>,
}

impl DeepValidation {
    /// A clean pass: valid, no warnings, no error.
    pub fn passed() -> Self {
        Self {
            is_valid: true,
            ..Self::default()
        }
    }

    /// An invalid verdict carrying `reason` as its error.
    pub fn rejected(reason: impl Into<String>) -> Self {
        Self {
            is_valid: false,
            warnings: Vec::new(),
            error: Some(reason.into()),
        }
    }

    /// Adds a warning without touching the verdict.
    #[must_use]
    pub fn with_warning(mut self, warning: impl Into<String>) -> Self {
        self.warnings.push(warning.into());
        self
    }

    /// Errors as a list, the shape they are logged in.
    pub fn errors(&self) -> Vec<String> {
        self.error.iter().cloned().collect()
    }

    pub fn has_findings(&self) -> bool {
        self.error.is_some() || !self.warnings.is_empty()
    }

    /// Logical AND of two sub-checks. Stops at the first rejection, so the
    /// error always comes from the check that failed first.
    #[must_use]
    pub fn and(mut self, other: Self) -> Self {
        if !self.is_valid {
            return self;
        }
        self.is_valid = other.is_valid;
        self.error = other.error;
        self.warnings.extend(other.warnings);
        self
    }
}

/// The stage run once an address has passed base validation.
#[cfg_attr(test, automock)]
#[async_trait]
pub trait DeepValidator: Send + Sync {
    /// # Errors
    /// Only unexpected backend failures are errors; a rejected address is an
    /// `Ok` with `is_valid == false`.
    async fn validate(&self, address: &str) -> Result<DeepValidation, ValidationError>;
}

/// Syntax check AND DNS record check.
pub struct RfcDnsValidator {
    dns: DnsRecordCheck,
}

impl RfcDnsValidator {
    /// # Arguments
    /// * `resolver` - DNS backend used for the MX and A/AAAA lookups.
    pub fn new(resolver: Box<dyn RecordResolver>) -> Self {
        Self {
            dns: DnsRecordCheck::new(resolver),
        }
    }

    /// Uses the `trust-dns` resolver with the configured timeout and attempts.
    /// The resolver itself is created on the first lookup.
    pub fn from_config(config: &ValidatorConfig) -> Self {
        Self::new(Box::new(TrustDnsResolver::new(config)))
    }
}

#[async_trait]
impl DeepValidator for RfcDnsValidator {
    async fn validate(&self, address: &str) -> Result<DeepValidation, ValidationError> {
        if !is_syntactically_valid(address) {
            return Ok(DeepValidation::rejected(INVALID_SYNTAX));
        }

        let domain = extract_domain(address)?;
        let dns = self.dns.check(domain).await?;

        Ok(DeepValidation::passed().and(dns))
    }
}
