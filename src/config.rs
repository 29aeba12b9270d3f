use crate::error::ConfigError;
use std::env;
use std::str::FromStr;
use std::time::Duration;

/// # Service Configuration
///
/// Loaded from the process environment (and a `.env` file, if present) by
/// [`Config::from_env`]. Every value has a default, so an empty environment
/// yields a working service on port 3000.
///
/// ## Variables
/// - `HOST`, `PORT`: listen address
/// - `BULK_CONCURRENCY`: in-flight pipeline ceiling for bulk runs
/// - `BULK_MAX_EMAILS`: longest accepted bulk list
/// - `PROBE_TIMEOUT_MS`, `MAX_PROBE_TIMEOUT_MS`: default and maximum SMTP probe budget
/// - `DNS_TIMEOUT_MS`: per-lookup DNS budget
/// - `SMTP_PORT`, `PROBE_SENDER`, `PROBE_HELO`: SMTP probe identity
/// - `DISPOSABLE_DOMAINS_FILE`: optional disposable domain list
/// - `JSON_BODY_LIMIT`: transport body size limit in bytes
/// - `LOG_FORMAT`: `text` or `json`
#[derive(Debug, Clone)]
pub struct Config {
    pub host: String,
    pub port: u16,
    pub bulk_concurrency: usize,
    pub bulk_max_emails: usize,
    pub probe_timeout: Duration,
    pub max_probe_timeout: Duration,
    pub dns_timeout: Duration,
    pub smtp_port: u16,
    pub probe_sender: String,
    pub probe_helo: String,
    pub disposable_domains_file: Option<String>,
    pub json_body_limit: usize,
    pub log_format: LogFormat,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum LogFormat {
    Text,
    Json,
}

impl Default for Config {
    fn default() -> Self {
        Self {
            host: "0.0.0.0".to_string(),
            port: 3000,
            bulk_concurrency: 100,
            bulk_max_emails: 10_000,
            probe_timeout: Duration::from_millis(5000),
            max_probe_timeout: Duration::from_millis(30_000),
            dns_timeout: Duration::from_millis(5000),
            smtp_port: 25,
            probe_sender: "verify@example.com".to_string(),
            probe_helo: "localhost".to_string(),
            disposable_domains_file: None,
            json_body_limit: 50 * 1024 * 1024,
            log_format: LogFormat::Text,
        }
    }
}

impl Config {
    pub fn from_env() -> Result<Self, ConfigError> {
        dotenv::dotenv().ok();
        Self::from_lookup(|key| env::var(key).ok())
    }

    /// Builds a configuration from an arbitrary key lookup, falling back to defaults.
    pub fn from_lookup<F>(lookup: F) -> Result<Self, ConfigError>
    where
        F: Fn(&str) -> Option<String>,
    {
        let defaults = Config::default();

        let bulk_concurrency = parse_or(&lookup, "BULK_CONCURRENCY", defaults.bulk_concurrency)?;
        if bulk_concurrency == 0 {
            return Err(invalid("BULK_CONCURRENCY", "0", "must be at least 1"));
        }

        let probe_timeout_ms = parse_or(&lookup, "PROBE_TIMEOUT_MS", 5000u64)?;
        if probe_timeout_ms == 0 {
            return Err(invalid("PROBE_TIMEOUT_MS", "0", "must be greater than 0"));
        }
        let max_probe_timeout_ms = parse_or(&lookup, "MAX_PROBE_TIMEOUT_MS", 30_000u64)?;
        if max_probe_timeout_ms < probe_timeout_ms {
            return Err(invalid(
                "MAX_PROBE_TIMEOUT_MS",
                &max_probe_timeout_ms.to_string(),
                "must not be below PROBE_TIMEOUT_MS",
            ));
        }

        let dns_timeout_ms = parse_or(&lookup, "DNS_TIMEOUT_MS", 5000u64)?;
        if dns_timeout_ms == 0 {
            return Err(invalid("DNS_TIMEOUT_MS", "0", "must be greater than 0"));
        }

        let log_format = match lookup("LOG_FORMAT").as_deref().map(str::trim) {
            None | Some("") | Some("text") => LogFormat::Text,
            Some("json") => LogFormat::Json,
            Some(other) => return Err(invalid("LOG_FORMAT", other, "expected 'text' or 'json'")),
        };

        Ok(Self {
            host: lookup("HOST").unwrap_or(defaults.host),
            port: parse_or(&lookup, "PORT", defaults.port)?,
            bulk_concurrency,
            bulk_max_emails: parse_or(&lookup, "BULK_MAX_EMAILS", defaults.bulk_max_emails)?,
            probe_timeout: Duration::from_millis(probe_timeout_ms),
            max_probe_timeout: Duration::from_millis(max_probe_timeout_ms),
            dns_timeout: Duration::from_millis(dns_timeout_ms),
            smtp_port: parse_or(&lookup, "SMTP_PORT", defaults.smtp_port)?,
            probe_sender: lookup("PROBE_SENDER").unwrap_or(defaults.probe_sender),
            probe_helo: lookup("PROBE_HELO").unwrap_or(defaults.probe_helo),
            disposable_domains_file: lookup("DISPOSABLE_DOMAINS_FILE").filter(|p| !p.is_empty()),
            json_body_limit: parse_or(&lookup, "JSON_BODY_LIMIT", defaults.json_body_limit)?,
            log_format,
        })
    }
}

fn parse_or<F, T>(lookup: &F, var: &'static str, default: T) -> Result<T, ConfigError>
where
    F: Fn(&str) -> Option<String>,
    T: FromStr,
    T::Err: std::fmt::Display,
{
    match lookup(var) {
        None => Ok(default),
        Some(raw) if raw.trim().is_empty() => Ok(default),
        Some(raw) => raw
            .trim()
            .parse()
            .map_err(|e: T::Err| invalid(var, &raw, &e.to_string())),
    }
}

fn invalid(var: &'static str, value: &str, reason: &str) -> ConfigError {
    ConfigError::Invalid {
        var,
        value: value.to_string(),
        reason: reason.to_string(),
    }
}
