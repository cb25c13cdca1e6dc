use std::io::Write;

use clap::Parser;
use thiserror::Error;

use crate::error::BatchAbort;
use crate::models::VerdictReport;
use crate::pipeline::EmailValidator;

/// Command-line interface definition.
///
/// The exit status only reflects whether the check could be carried out,
/// the verdict itself is printed.
#[derive(Parser, Debug, Clone)]
#[command(
    name = "validate-email",
    author,
    version,
    about = "Will check if given E-Mail is reachable"
)]
pub struct Cli {
    /// E-Mail to be checked
    #[arg(long)]
    pub email: String,

    /// Print a JSON report instead of a sentence
    #[arg(long, default_value_t = false)]
    pub json: bool,

    /// Do not log addresses that fail syntax or reachability checks
    #[arg(long = "quiet-failures", default_value_t = false)]
    pub quiet_failures: bool,
}

#[derive(Debug, Error)]
pub enum CliError {
    #[error("Provide valid E-Mail!")]
    MissingEmail,

    #[error("Could not validate {email}: {source}")]
    Aborted {
        email: String,
        #[source]
        source: BatchAbort,
    },

    #[error("No verdict was produced for {0}")]
    MissingVerdict(String),

    #[error("Failed to write output: {0}")]
    Io(#[from] std::io::Error),

    #[error("Failed to serialize report: {0}")]
    Json(#[from] serde_json::Error),
}

/// Validates the address given on the command line and writes the verdict
/// to `out`.
///
/// # Errors
/// - [`CliError::MissingEmail`] when `--email` is blank
/// - [`CliError::Aborted`] when the validator could not reach a verdict,
///   which is never reported as "DOES NOT EXIST"
pub async fn run<V, W>(
    cli: &Cli,
    validator: &mut V,
    log_failures: bool,
    out: &mut W,
) -> Result<VerdictReport, CliError>
where
    V: EmailValidator + ?Sized,
    W: Write,
{
    if cli.email.trim().is_empty() {
        return Err(CliError::MissingEmail);
    }

    let results = validator
        .validate_email(std::slice::from_ref(&cli.email), log_failures)
        .await
        .map_err(|source| CliError::Aborted {
            email: cli.email.clone(),
            source,
        })?;

    let exists = *results
        .get(&cli.email)
        .ok_or_else(|| CliError::MissingVerdict(cli.email.clone()))?;
    let report = VerdictReport::new(cli.email.clone(), exists);

    if cli.json {
        serde_json::to_writer_pretty(&mut *out, &report)?;
        writeln!(out)?;
    } else {
        writeln!(out, "{}", report.summary())?;
    }

    Ok(report)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::error::ValidationError;
    use crate::pipeline::MockEmailValidator;
    use std::collections::HashMap;

    fn cli(email: &str, json: bool) -> Cli {
        Cli {
            email: email.to_string(),
            json,
            quiet_failures: false,
        }
    }

    fn validator_answering(verdict: bool) -> MockEmailValidator {
        let mut validator = MockEmailValidator::new();
        validator
            .expect_validate_email()
            .times(1)
            .returning(move |addresses, _| {
                Ok(addresses
                    .iter()
                    .map(|address| (address.clone(), verdict))
                    .collect::<HashMap<_, _>>())
            });
        validator
    }

    #[test]
    fn test_parses_email_flag() {
        let parsed = Cli::try_parse_from(["validate-email", "--email", "user@example.com"]).unwrap();
        assert_eq!(parsed.email, "user@example.com");
        assert!(!parsed.json);
        assert!(!parsed.quiet_failures);
    }

    #[test]
    fn test_email_flag_is_required() {
        assert!(Cli::try_parse_from(["validate-email"]).is_err());
        assert!(Cli::try_parse_from(["validate-email", "user@example.com"]).is_err());
    }

    #[tokio::test]
    async fn test_prints_exists() {
        let mut validator = validator_answering(true);
        let mut out = Vec::new();

        let report = run(&cli("good@example.com", false), &mut validator, true, &mut out)
            .await
            .unwrap();

        assert!(report.exists);
        assert_eq!(String::from_utf8(out).unwrap(), "E-mail: good@example.com EXISTS\n");
    }

    #[tokio::test]
    async fn test_prints_does_not_exist() {
        let mut validator = validator_answering(false);
        let mut out = Vec::new();

        run(&cli("bad-address", false), &mut validator, true, &mut out)
            .await
            .unwrap();

        assert_eq!(
            String::from_utf8(out).unwrap(),
            "E-mail: bad-address DOES NOT EXIST\n"
        );
    }

    #[tokio::test]
    async fn test_json_output() {
        let mut validator = validator_answering(true);
        let mut out = Vec::new();

        run(&cli("good@example.com", true), &mut validator, true, &mut out)
            .await
            .unwrap();

        let parsed: VerdictReport = serde_json::from_slice(&out).unwrap();
        assert_eq!(parsed.email, "good@example.com");
        assert!(parsed.exists);
    }

    #[tokio::test]
    async fn test_blank_email_fails_fast() {
        let mut validator = MockEmailValidator::new();
        validator.expect_validate_email().never();
        let mut out = Vec::new();

        for email in ["", "   "] {
            let err = run(&cli(email, false), &mut validator, true, &mut out)
                .await
                .unwrap_err();
            assert!(matches!(err, CliError::MissingEmail));
        }
        assert!(out.is_empty());
    }

    #[tokio::test]
    async fn test_abort_is_an_error_not_a_verdict() {
        let mut validator = MockEmailValidator::new();
        validator.expect_validate_email().returning(|addresses, _| {
            Err(BatchAbort {
                processed: 0,
                address: addresses[0].clone(),
                source: ValidationError::Internal("resolver unavailable".into()),
            })
        });
        let mut out = Vec::new();

        let err = run(&cli("user@example.com", false), &mut validator, true, &mut out)
            .await
            .unwrap_err();

        assert!(matches!(err, CliError::Aborted { .. }));
        assert!(out.is_empty());
    }

    #[tokio::test]
    async fn test_missing_verdict_is_an_error() {
        let mut validator = MockEmailValidator::new();
        validator
            .expect_validate_email()
            .returning(|_, _| Ok(HashMap::new()));
        let mut out = Vec::new();

        let err = run(&cli("user@example.com", false), &mut validator, true, &mut out)
            .await
            .unwrap_err();

        assert!(matches!(err, CliError::MissingVerdict(ref email) if email == "user@example.com"));
    }
}
