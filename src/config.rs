//! Layered configuration: a TOML file, overridden by `PINELINT_*`
//! environment variables, overridden by CLI flags.

use std::path::{Path, PathBuf};
use std::time::Duration;

use anyhow::{anyhow, Context, Result};
use serde::{Deserialize, Serialize};
use tracing::{debug, info};

use pinelint_core::review::SeverityFilter;
use pinelint_server::dispatch::DispatcherLimits;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, Default)]
#[serde(rename_all = "lowercase")]
pub enum LogFormat {
    #[default]
    Text,
    Json,
}

impl std::str::FromStr for LogFormat {
    type Err = anyhow::Error;

    fn from_str(s: &str) -> Result<Self> {
        match s.to_lowercase().as_str() {
            "text" => Ok(LogFormat::Text),
            "json" => Ok(LogFormat::Json),
            other => Err(anyhow!("unsupported log format: {}", other)),
        }
    }
}

/// Resolved runtime configuration. Every field has a
/// default, so a missing config file and unset environment are both fine.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct PinelintConfig {
    pub docs_path: PathBuf,
    pub scan_root: PathBuf,
    pub default_severity_filter: SeverityFilter,
    pub default_chunk_size: u32,
    pub request_timeout_ms: u64,
    pub validator_timeout_ms: u64,
    pub max_request_bytes: u64,
    pub log_format: LogFormat,
}

impl Default for PinelintConfig {
    fn default() -> Self {
        PinelintConfig {
            docs_path: PathBuf::from("docs/reference.json"),
            scan_root: PathBuf::from("."),
            default_severity_filter: SeverityFilter::All,
            default_chunk_size: 20,
            request_timeout_ms: pinelint_core::review::DEFAULT_REQUEST_BUDGET.as_millis() as u64,
            validator_timeout_ms: pinelint_core::review::DEFAULT_VALIDATOR_BUDGET.as_millis() as u64,
            max_request_bytes: 16 * 1024 * 1024,
            log_format: LogFormat::Text,
        }
    }
}

impl PinelintConfig {
    /// Load the file layer, then apply environment overrides. CLI overrides
    /// are applied separately by the caller via [`PinelintConfig::apply_cli`]
    /// once `clap` has parsed argv, keeping this function free of any
    /// dependency on the CLI's argument type.
    pub fn load(config_path: Option<&Path>) -> Result<Self> {
        let mut config = match config_path {
            Some(path) => Self::from_file(path)?,
            None => match Self::default_config_path() {
                Some(path) if path.exists() => Self::from_file(&path)?,
                _ => PinelintConfig::default(),
            },
        };
        config.apply_env_overrides();
        Ok(config)
    }

    fn default_config_path() -> Option<PathBuf> {
        Some(PathBuf::from("pinelint.toml"))
    }

    fn from_file(path: &Path) -> Result<Self> {
        let content = std::fs::read_to_string(path)
            .with_context(|| format!("failed to read config file {}", path.display()))?;
        let config: PinelintConfig =
            toml::from_str(&content).with_context(|| format!("failed to parse config file {}", path.display()))?;
        info!(path = %path.display(), "loaded configuration file");
        Ok(config)
    }

    /// `PINELINT_*` environment overrides. Unparseable
    /// values are logged and ignored rather than treated as fatal — an
    /// operator typo in an env var should not crash a linter.
    fn apply_env_overrides(&mut self) {
        if let Ok(v) = std::env::var("PINELINT_DOCS_PATH") {
            self.docs_path = PathBuf::from(v);
            debug!("applied PINELINT_DOCS_PATH override");
        }
        if let Ok(v) = std::env::var("PINELINT_SCAN_ROOT") {
            self.scan_root = PathBuf::from(v);
            debug!("applied PINELINT_SCAN_ROOT override");
        }
        if let Ok(v) = std::env::var("PINELINT_DEFAULT_SEVERITY_FILTER") {
            match v.to_lowercase().as_str() {
                "all" => self.default_severity_filter = SeverityFilter::All,
                "error" => self.default_severity_filter = SeverityFilter::Error,
                "warning" => self.default_severity_filter = SeverityFilter::Warning,
                "suggestion" => self.default_severity_filter = SeverityFilter::Suggestion,
                other => debug!(value = other, "ignoring unrecognized PINELINT_DEFAULT_SEVERITY_FILTER"),
            }
        }
        if let Ok(v) = std::env::var("PINELINT_DEFAULT_CHUNK_SIZE") {
            match v.parse() {
                Ok(n) => self.default_chunk_size = n,
                Err(_) => debug!(value = %v, "ignoring unparseable PINELINT_DEFAULT_CHUNK_SIZE"),
            }
        }
        if let Ok(v) = std::env::var("PINELINT_REQUEST_TIMEOUT_MS") {
            match v.parse() {
                Ok(n) => self.request_timeout_ms = n,
                Err(_) => debug!(value = %v, "ignoring unparseable PINELINT_REQUEST_TIMEOUT_MS"),
            }
        }
        if let Ok(v) = std::env::var("PINELINT_VALIDATOR_TIMEOUT_MS") {
            match v.parse() {
                Ok(n) => self.validator_timeout_ms = n,
                Err(_) => debug!(value = %v, "ignoring unparseable PINELINT_VALIDATOR_TIMEOUT_MS"),
            }
        }
        if let Ok(v) = std::env::var("PINELINT_MAX_REQUEST_BYTES") {
            match v.parse() {
                Ok(n) => self.max_request_bytes = n,
                Err(_) => debug!(value = %v, "ignoring unparseable PINELINT_MAX_REQUEST_BYTES"),
            }
        }
        if let Ok(v) = std::env::var("PINELINT_LOG_FORMAT") {
            match v.parse() {
                Ok(f) => self.log_format = f,
                Err(_) => debug!(value = %v, "ignoring unrecognized PINELINT_LOG_FORMAT"),
            }
        }
    }

    pub fn into_dispatcher_limits(self) -> DispatcherLimits {
        DispatcherLimits {
            scan_root: self.scan_root,
            default_severity_filter: self.default_severity_filter,
            default_chunk_size: self.default_chunk_size,
            request_timeout: Duration::from_millis(self.request_timeout_ms),
            validator_timeout: Duration::from_millis(self.validator_timeout_ms),
            max_request_bytes: self.max_request_bytes,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::tempdir;

    #[test]
    fn default_config_is_permissive() {
        let config = PinelintConfig::default();
        assert_eq!(config.default_severity_filter, SeverityFilter::All);
        assert_eq!(config.default_chunk_size, 20);
    }

    #[test]
    fn loads_from_toml_file() {
        let dir = tempdir().unwrap();
        let path = dir.path().join("pinelint.toml");
        std::fs::write(
            &path,
            r#"
docs_path = "custom/docs.json"
scan_root = "."
default_severity_filter = "error"
default_chunk_size = 50
request_timeout_ms = 1000
validator_timeout_ms = 25
max_request_bytes = 1024
log_format = "json"
"#,
        )
        .unwrap();

        let config = PinelintConfig::load(Some(&path)).unwrap();
        assert_eq!(config.docs_path, PathBuf::from("custom/docs.json"));
        assert_eq!(config.default_severity_filter, SeverityFilter::Error);
        assert_eq!(config.default_chunk_size, 50);
        assert_eq!(config.log_format, LogFormat::Json);
    }

    #[test]
    fn env_override_wins_over_file() {
        let dir = tempdir().unwrap();
        let path = dir.path().join("pinelint.toml");
        std::fs::write(&path, "default_chunk_size = 50\n").unwrap();

        std::env::set_var("PINELINT_DEFAULT_CHUNK_SIZE", "7");
        let config = PinelintConfig::load(Some(&path)).unwrap();
        std::env::remove_var("PINELINT_DEFAULT_CHUNK_SIZE");

        assert_eq!(config.default_chunk_size, 7);
    }

    #[test]
    fn unparseable_env_override_is_ignored_not_fatal() {
        std::env::set_var("PINELINT_DEFAULT_CHUNK_SIZE", "not-a-number");
        let config = PinelintConfig::load(None);
        std::env::remove_var("PINELINT_DEFAULT_CHUNK_SIZE");
        assert!(config.is_ok());
    }
}
