/// # Verdict Report
///
/// Serializable verdict for a single address, with the time it was checked.
/// Used by the command line for both its plain and JSON output.
pub mod report;

pub use report::VerdictReport;
