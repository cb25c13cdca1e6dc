use std::collections::HashMap;

use async_trait::async_trait;
#[cfg(test)]
use mockall::automock;
use serde::Serialize;
use tracing::{Instrument, debug, info_span, warn};
use uuid::Uuid;

use crate::cache::ValidationCache;
use crate::config::ValidatorConfig;
use crate::error::{BatchAbort, ValidationError};
use crate::validation::deep::{DeepValidation, DeepValidator, RfcDnsValidator};
use crate::validation::domain::extract_domain;
use crate::validation::reachability::{DomainProbe, HttpProbe, ReachabilityChecker};
use crate::validation::syntax::is_syntactically_valid;

/// Where an address ended up in the pipeline. Every state is terminal.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub enum AddressState {
    /// A verdict was already cached, nothing was re-checked.
    CacheHit,
    SyntaxFail,
    /// The domain did not answer, answered outside 2xx/3xx, or could not
    /// be probed at all.
    DomainUnreachable,
    /// Base validation passed and the deep validator decided the verdict.
    DeepValidated,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub struct AddressOutcome {
    pub verdict: bool,
    pub state: AddressState,
}

enum BaseOutcome {
    Passed,
    Failed(AddressState),
}

/// Validates batches of email addresses.
#[cfg_attr(test, automock)]
#[async_trait]
pub trait EmailValidator: Send {
    /// Validates every address and maps each one to its verdict
    /// (`true` = the address probably exists).
    ///
    /// # Errors
    /// Returns [`BatchAbort`] when an unrecoverable error interrupts the
    /// batch. No verdicts are returned in that case, not even the ones
    /// computed before the failure.
    async fn validate_email(
        &mut self,
        addresses: &[String],
        log_failures: bool,
    ) -> Result<HashMap<String, bool>, BatchAbort>;
}

/// The validation pipeline: cache lookup, base validation (syntax and domain
/// reachability), then deep validation.
///
/// Addresses are checked one at a time with one probe each. Mail and web
/// servers tend to refuse bulk verification from a single client, so
/// nothing here runs concurrently.
pub struct SmtpValidator {
    reachability: ReachabilityChecker,
    deep: Box<dyn DeepValidator>,
    cache: ValidationCache,
}

impl SmtpValidator {
    /// # Arguments
    /// * `probe` - Reachability prober for the domain check.
    /// * `deep` - Validator run after base validation passes.
    ///
    /// The cache starts empty.
    pub fn new(probe: Box<dyn DomainProbe>, deep: Box<dyn DeepValidator>) -> Self {
        Self {
            reachability: ReachabilityChecker::new(probe),
            deep,
            cache: ValidationCache::new(),
        }
    }

    /// Builds the validator with the HTTP prober and the DNS-backed deep
    /// validator.
    pub fn from_config(config: &ValidatorConfig) -> Result<Self, ValidationError> {
        Ok(Self::new(
            Box::new(HttpProbe::from_config(config)?),
            Box::new(RfcDnsValidator::from_config(config)),
        ))
    }

    /// Verdicts collected so far.
    pub fn cache(&self) -> &ValidationCache {
        &self.cache
    }

    pub fn clear_cache(&mut self) {
        self.cache.clear();
    }

    /// Syntax and domain reachability only. Cheaper than deep validation and
    /// catches domains that have DNS records but no live host.
    ///
    /// Failures are cached as `false`. A pass is not cached, the final
    /// verdict of a passing address belongs to deep validation.
    pub async fn do_base_validation(&mut self, address: &str, log_failures: bool) -> bool {
        if let Some(verdict) = self.cache.get(address) {
            return verdict;
        }

        match self.run_base_validation(address, log_failures).await {
            BaseOutcome::Passed => true,
            BaseOutcome::Failed(_) => {
                self.cache.put(address, false);
                false
            }
        }
    }

    /// Runs one address through the pipeline and caches its verdict.
    ///
    /// # Errors
    /// Only errors that are not [recoverable](ValidationError::is_recoverable)
    /// are returned; every other failure becomes a `false` verdict.
    pub async fn validate_address(
        &mut self,
        address: &str,
        log_failures: bool,
    ) -> Result<AddressOutcome, ValidationError> {
        if let Some(verdict) = self.cache.get(address) {
            return Ok(AddressOutcome {
                verdict,
                state: AddressState::CacheHit,
            });
        }

        if let BaseOutcome::Failed(state) = self.run_base_validation(address, log_failures).await {
            self.cache.put(address, false);
            return Ok(AddressOutcome {
                verdict: false,
                state,
            });
        }

        let deep = match self.deep.validate(address).await {
            Ok(deep) => deep,
            Err(e) if e.is_recoverable() => DeepValidation::rejected(e.to_string()),
            Err(e) => return Err(e),
        };

        if deep.has_findings() {
            warn!(
                address,
                errors = ?deep.errors(),
                warnings = ?deep.warnings,
                "E-mail did not pass deep validation cleanly"
            );
        }

        self.cache.put(address, deep.is_valid);
        Ok(AddressOutcome {
            verdict: deep.is_valid,
            state: AddressState::DeepValidated,
        })
    }

    async fn run_base_validation(&self, address: &str, log_failures: bool) -> BaseOutcome {
        if !is_syntactically_valid(address) {
            if log_failures {
                warn!(address, stage = "syntax", "This is not a syntactically valid email");
            }
            return BaseOutcome::Failed(AddressState::SyntaxFail);
        }

        match self.validate_by_domain(address).await {
            Ok(true) => BaseOutcome::Passed,
            Ok(false) => {
                if log_failures {
                    warn!(address, stage = "domain", "This email is not valid, host is not reachable");
                }
                BaseOutcome::Failed(AddressState::DomainUnreachable)
            }
            Err(e) => {
                // Probe errors are logged even when failures are not.
                if log_failures || matches!(e, ValidationError::Probe(_)) {
                    warn!(
                        address,
                        stage = "domain",
                        kind = e.kind(),
                        error = %e,
                        "Could not check domain, treating it as unreachable"
                    );
                }
                BaseOutcome::Failed(AddressState::DomainUnreachable)
            }
        }
    }

    async fn validate_by_domain(&self, address: &str) -> Result<bool, ValidationError> {
        let domain = extract_domain(address)?;
        self.reachability.is_domain_reachable(domain).await
    }
}

#[async_trait]
impl EmailValidator for SmtpValidator {
    async fn validate_email(
        &mut self,
        addresses: &[String],
        log_failures: bool,
    ) -> Result<HashMap<String, bool>, BatchAbort> {
        let batch_id = Uuid::new_v4();
        let span = info_span!("validate_email", %batch_id, size = addresses.len());

        async {
            let mut results = HashMap::with_capacity(addresses.len());

            for (processed, address) in addresses.iter().enumerate() {
                match self.validate_address(address, log_failures).await {
                    Ok(outcome) => {
                        debug!(
                            address = %address,
                            state = ?outcome.state,
                            verdict = outcome.verdict,
                            "Address checked"
                        );
                        results.insert(address.clone(), outcome.verdict);
                    }
                    Err(source) => {
                        let abort = BatchAbort {
                            processed,
                            address: address.clone(),
                            source,
                        };
                        handle_validation_failure(&abort);
                        return Err(abort);
                    }
                }
            }

            Ok(results)
        }
        .instrument(span)
        .await
    }
}

fn handle_validation_failure(abort: &BatchAbort) {
    warn!(
        exception.message = %abort,
        exception.class = abort.source.kind(),
        exception.trace = ?abort,
        processed = abort.processed,
        "Could not validate e-mail batch"
    );
}
