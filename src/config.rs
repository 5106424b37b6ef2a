use anyhow::{anyhow, Context, Result};
use chrono_tz::Tz;
use std::path::PathBuf;
use std::str::FromStr;
use std::time::Duration;

use crate::constants;
use crate::dataset::{DatasetSource, LoadOptions};
use crate::matching::NormalizationPolicy;
use crate::utils::parse_timezone;

/// Log output format
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum LogFormat {
    Pretty,
    Json,
}

impl FromStr for LogFormat {
    type Err = anyhow::Error;

    fn from_str(s: &str) -> Result<Self> {
        match s.trim().to_ascii_lowercase().as_str() {
            "pretty" | "text" => Ok(Self::Pretty),
            "json" => Ok(Self::Json),
            other => Err(anyhow!("unknown log format '{other}', expected 'pretty' or 'json'")),
        }
    }
}

/// Application configuration, read from environment variables
#[derive(Debug, Clone)]
pub struct AppConfig {
    pub host: String,
    pub port: u16,
    pub cors_origins: String,
    pub production: bool,
    pub dataset_source: DatasetSource,
    pub load_options: LoadOptions,
    pub match_policy: NormalizationPolicy,
    pub static_assets_path: Option<PathBuf>,
    pub timezone: Tz,
    pub reload_rate_limit_per_minute: u32,
    pub log_format: LogFormat,
}

impl AppConfig {
    /// Load configuration from the process environment
    pub fn from_env() -> Result<Self> {
        Self::from_lookup(|key| std::env::var(key).ok())
    }

    /// Load configuration through `lookup`, which returns a variable's value if set
    pub fn from_lookup<F>(lookup: F) -> Result<Self>
    where
        F: Fn(&str) -> Option<String>,
    {
        let var = |key: &str| lookup(key).filter(|v| !v.trim().is_empty());

        let port = match var("SERVER_PORT") {
            Some(v) => v
                .trim()
                .parse::<u16>()
                .with_context(|| format!("Invalid SERVER_PORT: {v}"))?,
            None => constants::DEFAULT_SERVER_PORT,
        };

        let timeout_secs = match var("DATASET_LOAD_TIMEOUT_SECS") {
            Some(v) => v
                .trim()
                .parse::<u64>()
                .with_context(|| format!("Invalid DATASET_LOAD_TIMEOUT_SECS: {v}"))?,
            None => constants::DEFAULT_LOAD_TIMEOUT_SECS,
        };

        let retries = match var("DATASET_LOAD_RETRIES") {
            Some(v) => v
                .trim()
                .parse::<u32>()
                .with_context(|| format!("Invalid DATASET_LOAD_RETRIES: {v}"))?,
            None => constants::DEFAULT_LOAD_RETRIES,
        };

        let match_policy = match var("MATCH_POLICY") {
            Some(v) => v.parse::<NormalizationPolicy>().map_err(|e| anyhow!(e))?,
            None => NormalizationPolicy::default(),
        };

        let timezone = parse_timezone(
            &var("APP_TIMEZONE").unwrap_or_else(|| constants::DEFAULT_TIMEZONE.to_string()),
        )?;

        let reload_rate_limit_per_minute = match var("RELOAD_RATE_LIMIT_PER_MINUTE") {
            Some(v) => v
                .trim()
                .parse::<u32>()
                .ok()
                .filter(|n| *n > 0)
                .with_context(|| format!("Invalid RELOAD_RATE_LIMIT_PER_MINUTE: {v}"))?,
            None => constants::RELOAD_RATE_LIMIT_PER_MINUTE,
        };

        let log_format = match var("LOG_FORMAT") {
            Some(v) => v.parse()?,
            None => LogFormat::Pretty,
        };

        Ok(Self {
            host: var("SERVER_HOST").unwrap_or_else(|| constants::DEFAULT_SERVER_HOST.to_string()),
            port,
            cors_origins: var("CORS_ORIGINS").unwrap_or_else(|| "*".to_string()),
            production: var("RUST_ENV").is_some_and(|v| v == "production"),
            dataset_source: DatasetSource::parse(
                &var("DATASET_SOURCE")
                    .unwrap_or_else(|| constants::DEFAULT_DATASET_SOURCE.to_string()),
            ),
            load_options: LoadOptions {
                timeout: Duration::from_secs(timeout_secs),
                retries,
            },
            match_policy,
            static_assets_path: var("STATIC_ASSETS_PATH").map(PathBuf::from),
            timezone,
            reload_rate_limit_per_minute,
            log_format,
        })
    }

    pub fn bind_address(&self) -> String {
        format!("{}:{}", self.host, self.port)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::collections::HashMap;

    fn config_from(pairs: &[(&str, &str)]) -> Result<AppConfig> {
        let vars: HashMap<String, String> = pairs
            .iter()
            .map(|(k, v)| (k.to_string(), v.to_string()))
            .collect();
        AppConfig::from_lookup(|key| vars.get(key).cloned())
    }

    #[test]
    fn test_defaults() {
        let config = config_from(&[]).unwrap();
        assert_eq!(config.bind_address(), "0.0.0.0:4410");
        assert_eq!(config.match_policy, NormalizationPolicy::Gs1Aware);
        assert_eq!(
            config.dataset_source,
            DatasetSource::File(PathBuf::from("warehouse_data.json"))
        );
        assert_eq!(config.load_options.timeout, Duration::from_secs(10));
        assert_eq!(config.load_options.retries, 1);
        assert_eq!(config.timezone, chrono_tz::UTC);
        assert_eq!(config.log_format, LogFormat::Pretty);
        assert!(config.static_assets_path.is_none());
        assert!(!config.production);
    }

    #[test]
    fn test_overrides() {
        let config = config_from(&[
            ("SERVER_PORT", "8080"),
            ("MATCH_POLICY", "plain"),
            ("DATASET_SOURCE", "https://intranet.local/warehouse_data.json"),
            ("APP_TIMEZONE", "Asia/Bangkok"),
            ("LOG_FORMAT", "json"),
            ("RUST_ENV", "production"),
            ("STATIC_ASSETS_PATH", "public"),
        ])
        .unwrap();
        assert_eq!(config.port, 8080);
        assert_eq!(config.match_policy, NormalizationPolicy::PlainTrim);
        assert!(matches!(config.dataset_source, DatasetSource::Url(_)));
        assert_eq!(config.timezone, chrono_tz::Asia::Bangkok);
        assert_eq!(config.log_format, LogFormat::Json);
        assert!(config.production);
        assert_eq!(config.static_assets_path, Some(PathBuf::from("public")));
    }

    #[test]
    fn test_blank_values_use_defaults() {
        let config = config_from(&[("SERVER_PORT", "  "), ("MATCH_POLICY", "")]).unwrap();
        assert_eq!(config.port, constants::DEFAULT_SERVER_PORT);
        assert_eq!(config.match_policy, NormalizationPolicy::Gs1Aware);
    }

    #[test]
    fn test_invalid_values_are_errors() {
        assert!(config_from(&[("SERVER_PORT", "not-a-port")]).is_err());
        assert!(config_from(&[("MATCH_POLICY", "fuzzy")]).is_err());
        assert!(config_from(&[("APP_TIMEZONE", "Nowhere/Town")]).is_err());
        assert!(config_from(&[("RELOAD_RATE_LIMIT_PER_MINUTE", "0")]).is_err());
        assert!(config_from(&[("LOG_FORMAT", "xml")]).is_err());
    }
}
