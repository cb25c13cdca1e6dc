use chrono::Utc;
use serde::{Deserialize, Serialize};

/// # Verdict Report
///
/// The verdict for one address as printed by `validate-email --json`.
///
/// ## Fields
/// - `email`: the address exactly as it was checked
/// - `exists`: `true` when the address is probably deliverable
/// - `checked_at`: RFC 3339 timestamp of the check
///
/// ## Example JSON
/// ```json
/// {
///   "email": "user@example.com",
///   "exists": true,
///   "checked_at": "2024-03-10T15:30:45.123456789+00:00"
/// }
/// ```
#[derive(Serialize, Debug, PartialEq, Deserialize)]
pub struct VerdictReport {
    pub email: String,
    pub exists: bool,
    pub checked_at: String,
}

impl VerdictReport {
    pub fn new(email: impl Into<String>, exists: bool) -> Self {
        Self {
            email: email.into(),
            exists,
            checked_at: Utc::now().to_rfc3339(),
        }
    }

    /// The one-line, human readable form of the verdict.
    pub fn summary(&self) -> String {
        if self.exists {
            format!("E-mail: {} EXISTS", self.email)
        } else {
            format!("E-mail: {} DOES NOT EXIST", self.email)
        }
    }
}
