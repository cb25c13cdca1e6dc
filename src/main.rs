use clap::Parser;
use smtp_email_validator::cli::{self, Cli};
use smtp_email_validator::config::ValidatorConfig;
use smtp_email_validator::logging;
use smtp_email_validator::pipeline::SmtpValidator;

/// Email Validator Entry Point
///
/// Checks a single address given with `--email` and prints whether it
/// probably exists:
/// - syntax check
/// - HTTP reachability probe of the domain
/// - DNS record check (MX, falling back to A/AAAA)
///
/// # Configuration
/// - Environment variables loaded from `.env` file (if present)
/// - See [`ValidatorConfig`] for the recognised variables
/// - `LOG_LEVEL` sets the log verbosity, logs are written to stderr
#[tokio::main]
async fn main() -> Result<(), Box<dyn std::error::Error>> {
    dotenv::dotenv().ok();
    logging::init()?;

    let cli = Cli::parse();
    let config = ValidatorConfig::from_env();
    let log_failures = config.log_failed_validation && !cli.quiet_failures;

    let mut validator = SmtpValidator::from_config(&config)?;
    let mut stdout = std::io::stdout();
    cli::run(&cli, &mut validator, log_failures, &mut stdout).await?;

    Ok(())
}
