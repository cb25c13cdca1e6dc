use std::env;
use std::str::FromStr;
use std::time::Duration;

use serde::{Deserialize, Serialize};
use tracing::warn;

const DEFAULT_PROBE_TIMEOUT_SECS: u64 = 5;
const DEFAULT_PROBE_MAX_REDIRECTS: usize = 0;
const DEFAULT_DNS_TIMEOUT_SECS: u64 = 2;
const DEFAULT_DNS_ATTEMPTS: usize = 2;

/// Runtime settings for the validator.
///
/// ## Environment
/// | Variable                | Default |
/// |-------------------------|---------|
/// | `PROBE_TIMEOUT_SECS`    | `5`     |
/// | `PROBE_MAX_REDIRECTS`   | `0`     |
/// | `DNS_TIMEOUT_SECS`      | `2`     |
/// | `DNS_ATTEMPTS`          | `2`     |
/// | `DNS_USE_SYSTEM_CONF`   | `true`  |
/// | `LOG_FAILED_VALIDATION` | `true`  |
///
/// The binary loads a `.env` file from the working directory before reading these.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct ValidatorConfig {
    pub probe_timeout_secs: u64,
    pub probe_max_redirects: usize,
    pub dns_timeout_secs: u64,
    pub dns_attempts: usize,
    /// Read `/etc/resolv.conf` instead of the resolver's built-in upstreams.
    pub dns_use_system_conf: bool,
    pub log_failed_validation: bool,
}

impl Default for ValidatorConfig {
    fn default() -> Self {
        Self {
            probe_timeout_secs: DEFAULT_PROBE_TIMEOUT_SECS,
            probe_max_redirects: DEFAULT_PROBE_MAX_REDIRECTS,
            dns_timeout_secs: DEFAULT_DNS_TIMEOUT_SECS,
            dns_attempts: DEFAULT_DNS_ATTEMPTS,
            dns_use_system_conf: true,
            log_failed_validation: true,
        }
    }
}

impl ValidatorConfig {
    /// Reads the configuration from environment variables, falling back to
    /// defaults for missing or malformed values.
    pub fn from_env() -> Self {
        Self::from_lookup(|key| env::var(key).ok())
    }

    /// Parses a JSON configuration document. Missing fields take defaults,
    /// as do zero timeouts and attempts.
    pub fn from_json(json: &str) -> Result<Self, serde_json::Error> {
        serde_json::from_str(json).map(Self::without_zeros)
    }

    fn from_lookup(lookup: impl Fn(&str) -> Option<String>) -> Self {
        let defaults = Self::default();

        Self {
            probe_timeout_secs: parse_or(&lookup, "PROBE_TIMEOUT_SECS", defaults.probe_timeout_secs),
            probe_max_redirects: parse_or(
                &lookup,
                "PROBE_MAX_REDIRECTS",
                defaults.probe_max_redirects,
            ),
            dns_timeout_secs: parse_or(&lookup, "DNS_TIMEOUT_SECS", defaults.dns_timeout_secs),
            dns_attempts: parse_or(&lookup, "DNS_ATTEMPTS", defaults.dns_attempts),
            dns_use_system_conf: parse_or(
                &lookup,
                "DNS_USE_SYSTEM_CONF",
                defaults.dns_use_system_conf,
            ),
            log_failed_validation: parse_or(
                &lookup,
                "LOG_FAILED_VALIDATION",
                defaults.log_failed_validation,
            ),
        }
        .without_zeros()
    }

    // A zero timeout fails every lookup immediately and zero attempts never
    // ask at all, both would reject every address.
    fn without_zeros(self) -> Self {
        let defaults = Self::default();

        Self {
            probe_timeout_secs: nonzero_or(
                "PROBE_TIMEOUT_SECS",
                self.probe_timeout_secs,
                defaults.probe_timeout_secs,
            ),
            dns_timeout_secs: nonzero_or(
                "DNS_TIMEOUT_SECS",
                self.dns_timeout_secs,
                defaults.dns_timeout_secs,
            ),
            dns_attempts: nonzero_or("DNS_ATTEMPTS", self.dns_attempts, defaults.dns_attempts),
            ..self
        }
    }

    pub fn probe_timeout(&self) -> Duration {
        Duration::from_secs(self.probe_timeout_secs)
    }

    pub fn dns_timeout(&self) -> Duration {
        Duration::from_secs(self.dns_timeout_secs)
    }
}

fn parse_or<T>(lookup: &impl Fn(&str) -> Option<String>, key: &str, default: T) -> T
where
    T: FromStr + std::fmt::Display + Copy,
{
    match lookup(key) {
        Some(raw) => raw.trim().parse().unwrap_or_else(|_| {
            warn!(key, value = %raw, %default, "Invalid configuration value, using default");
            default
        }),
        None => default,
    }
}

fn nonzero_or<T>(key: &str, value: T, default: T) -> T
where
    T: Default + PartialEq + std::fmt::Display,
{
    if value == T::default() {
        warn!(key, %default, "Zero is not a usable value, using default");
        default
    } else {
        value
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::collections::HashMap;

    fn lookup_from(pairs: &[(&str, &str)]) -> impl Fn(&str) -> Option<String> {
        let vars: HashMap<String, String> = pairs
            .iter()
            .map(|(k, v)| (k.to_string(), v.to_string()))
            .collect();
        move |key| vars.get(key).cloned()
    }

    #[test]
    fn test_defaults_when_unset() {
        let config = ValidatorConfig::from_lookup(lookup_from(&[]));
        assert_eq!(config, ValidatorConfig::default());
        assert_eq!(config.probe_timeout(), Duration::from_secs(5));
        assert_eq!(config.dns_timeout(), Duration::from_secs(2));
    }

    #[test]
    fn test_reads_values() {
        let config = ValidatorConfig::from_lookup(lookup_from(&[
            ("PROBE_TIMEOUT_SECS", "10"),
            ("PROBE_MAX_REDIRECTS", "3"),
            ("DNS_ATTEMPTS", " 4 "),
            ("DNS_USE_SYSTEM_CONF", "false"),
            ("LOG_FAILED_VALIDATION", "false"),
        ]));

        assert_eq!(config.probe_timeout_secs, 10);
        assert_eq!(config.probe_max_redirects, 3);
        assert_eq!(config.dns_attempts, 4);
        assert_eq!(config.dns_timeout_secs, DEFAULT_DNS_TIMEOUT_SECS);
        assert!(!config.dns_use_system_conf);
        assert!(!config.log_failed_validation);
    }

    #[test]
    fn test_malformed_values_fall_back() {
        let config = ValidatorConfig::from_lookup(lookup_from(&[
            ("PROBE_TIMEOUT_SECS", "soon"),
            ("LOG_FAILED_VALIDATION", "yes"),
        ]));

        assert_eq!(config.probe_timeout_secs, DEFAULT_PROBE_TIMEOUT_SECS);
        assert!(config.log_failed_validation);
    }

    #[test]
    fn test_zero_timeouts_and_attempts_fall_back() {
        let config = ValidatorConfig::from_lookup(lookup_from(&[
            ("PROBE_TIMEOUT_SECS", "0"),
            ("DNS_TIMEOUT_SECS", "0"),
            ("DNS_ATTEMPTS", "0"),
            ("PROBE_MAX_REDIRECTS", "0"),
        ]));

        assert_eq!(config.probe_timeout_secs, DEFAULT_PROBE_TIMEOUT_SECS);
        assert_eq!(config.dns_timeout_secs, DEFAULT_DNS_TIMEOUT_SECS);
        assert_eq!(config.dns_attempts, DEFAULT_DNS_ATTEMPTS);
        assert_eq!(config.probe_max_redirects, 0);
    }

    #[test]
    fn test_from_json_zero_timeout_falls_back() {
        let config =
            ValidatorConfig::from_json(r#"{"probe_timeout_secs": 0, "dns_attempts": 3}"#).unwrap();
        assert_eq!(config.probe_timeout_secs, DEFAULT_PROBE_TIMEOUT_SECS);
        assert_eq!(config.dns_attempts, 3);
    }

    #[test]
    fn test_from_json_partial() {
        let config = ValidatorConfig::from_json(r#"{"probe_timeout_secs": 1}"#).unwrap();
        assert_eq!(config.probe_timeout_secs, 1);
        assert_eq!(config.dns_attempts, DEFAULT_DNS_ATTEMPTS);
    }

    #[test]
    fn test_from_json_rejects_wrong_types() {
        assert!(ValidatorConfig::from_json(r#"{"probe_timeout_secs": "five"}"#).is_err());
    }
}
