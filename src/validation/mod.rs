/// Structural check of an email address, run before any network call.
///
/// # Examples
/// ```
/// use smtp_email_validator::validation::syntax::is_syntactically_valid;
///
/// assert!(is_syntactically_valid("user.name+tag@example.com"));
/// assert!(!is_syntactically_valid("invalid@ex_mple.com"));
/// ```
pub mod syntax;

/// Domain extraction from a (re-validated) email address.
pub mod domain;

/// HTTP reachability probe for the domain of an address.
///
/// A domain is reachable when it answers with a status in `200..400`.
/// Probe failures (timeouts, refused connections, DNS errors) are reported
/// as errors, not as "unreachable", so callers can tell them apart.
pub mod reachability;

/// DNS record check: MX lookup with A/AAAA fallback, Null MX and reserved
/// top-level domain rejection.
pub mod dnsmx;

/// Deep validation run after base validation passes, syntax AND DNS records.
pub mod deep;

#[cfg(test)]
mod syntax_test;
