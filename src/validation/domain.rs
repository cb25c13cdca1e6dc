use crate::error::ValidationError;
use crate::validation::syntax::is_syntactically_valid;

/// Extracts the domain part of an email address.
///
/// The address is re-validated so the extractor is safe to use on its own.
/// Everything after the last `@` is returned with its casing preserved.
///
/// # Errors
/// Returns [`ValidationError::InvalidAddress`] when the address has no `@`
/// or fails the syntax check.
///
/// # Examples
/// ```
/// use smtp_email_validator::validation::domain::extract_domain;
///
/// assert_eq!(extract_domain("user@Example.com").unwrap(), "Example.com");
/// assert!(extract_domain("no-at-sign").is_err());
/// ```
pub fn extract_domain(address: &str) -> Result<&str, ValidationError> {
    if !is_syntactically_valid(address) {
        return Err(ValidationError::InvalidAddress(address.to_string()));
    }

    address
        .rsplit_once('@')
        .map(|(_, domain)| domain)
        .ok_or_else(|| ValidationError::InvalidAddress(address.to_string()))
}
