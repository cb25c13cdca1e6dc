use thiserror::Error;

/// Errors raised while validating a single address.
///
/// Only [`ValidationError::Internal`] is fatal to a batch, everything else
/// is contained by the pipeline and turned into a `false` verdict.
#[derive(Debug, Error)]
pub enum ValidationError {
    /// The address failed the syntax rules or has no `@`.
    #[error("This is not a valid email: {0}")]
    InvalidAddress(String),

    /// The domain is not a well-formed host name.
    #[error("This is not a valid domain: {0}")]
    InvalidDomain(String),

    /// The reachability probe did not produce an HTTP status.
    #[error("Probe failed: {0}")]
    Probe(#[from] ProbeError),

    /// A validation backend failed in a way the pipeline cannot interpret.
    #[error("Internal validation failure: {0}")]
    Internal(String),
}

impl ValidationError {
    /// Returns `true` if the pipeline may convert this error into a `false`
    /// verdict and move on to the next address.
    #[must_use]
    pub const fn is_recoverable(&self) -> bool {
        !matches!(self, Self::Internal(_))
    }

    /// Short name of the error kind, used as a structured log field.
    #[must_use]
    pub const fn kind(&self) -> &'static str {
        match self {
            Self::InvalidAddress(_) => "InvalidAddress",
            Self::InvalidDomain(_) => "InvalidDomain",
            Self::Probe(_) => "ProbeError",
            Self::Internal(_) => "Internal",
        }
    }
}

/// Network-level failures of a reachability probe.
///
/// These are noise as far as deliverability is concerned: a remote host
/// refusing connections looks the same as a domain that does not exist.
#[derive(Debug, Error)]
pub enum ProbeError {
    #[error("Probe of {domain} timed out")]
    Timeout { domain: String },

    #[error("Could not connect to {domain}: {reason}")]
    Connect { domain: String, reason: String },

    #[error("Request to {domain} failed: {reason}")]
    Request { domain: String, reason: String },
}

/// A batch was aborted by an unrecoverable error.
///
/// Verdicts computed before the failure are discarded, callers never see a
/// partially populated result.
#[derive(Debug, Error)]
#[error("Validation batch aborted at {address} after {processed} address(es): {source}")]
pub struct BatchAbort {
    /// Number of addresses fully processed before the failure.
    pub processed: usize,
    /// Address being validated when the failure happened.
    pub address: String,
    #[source]
    pub source: ValidationError,
}
