use std::env;
use std::path::PathBuf;

use serde::Serialize;
use thiserror::Error;

#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("{0}")]
    Message(String),
}

#[derive(Debug, Clone, Serialize)]
pub struct Config {
    pub streams_dir: PathBuf,
    pub output_dir: PathBuf,
    pub validation_results_file: PathBuf,
    pub validation: StreamValidationConfig,
}

#[derive(Debug, Clone, Serialize)]
pub struct StreamValidationConfig {
    pub timeout_ms: u64,
    pub concurrency: usize,
    pub progress_interval: usize,
    pub user_agent: String,
}

impl Config {
    pub fn load() -> Result<Self, ConfigError> {
        let streams_dir = env_path("STREAMS_DIR", "streams");
        let output_dir = env_path("OUTPUT_DIR", "site_data");
        let validation_results_file =
            env_path("VALIDATION_RESULTS_FILE", "validation-results.json");
        let validation = StreamValidationConfig::from_env()?;

        Ok(Self {
            streams_dir,
            output_dir,
            validation_results_file,
            validation,
        })
    }

    pub fn metadata_dir(&self) -> PathBuf {
        self.output_dir.join("metadata")
    }

    pub fn catalog_file(&self) -> PathBuf {
        self.metadata_dir().join("catalog.json")
    }

    pub fn unified_playlist_file(&self) -> PathBuf {
        self.output_dir.join("all_stations.m3u")
    }

    pub fn by_country_dir(&self) -> PathBuf {
        self.output_dir.join("by_country")
    }

    pub fn summary_file(&self) -> PathBuf {
        self.output_dir.join("summary.json")
    }
}

impl StreamValidationConfig {
    fn from_env() -> Result<Self, ConfigError> {
        let timeout_ms = env_u64("STREAM_VALIDATION_TIMEOUT_MS", 10_000)?;
        let concurrency = env_usize("STREAM_VALIDATION_CONCURRENCY", 20)?;
        let progress_interval = env_usize("STREAM_VALIDATION_PROGRESS_INTERVAL", 100)?;
        let user_agent = env::var("STREAM_VALIDATION_USER_AGENT")
            .unwrap_or_else(|_| concat!(env!("CARGO_PKG_NAME"), "/1.0").to_string());

        let config = Self {
            timeout_ms,
            concurrency,
            progress_interval,
            user_agent,
        };
        config.validate()?;
        Ok(config)
    }

    fn validate(&self) -> Result<(), ConfigError> {
        if self.timeout_ms == 0 {
            return Err(ConfigError::Message(
                "STREAM_VALIDATION_TIMEOUT_MS must be greater than zero.".into(),
            ));
        }
        if self.concurrency == 0 {
            return Err(ConfigError::Message(
                "STREAM_VALIDATION_CONCURRENCY must be greater than zero.".into(),
            ));
        }
        if self.progress_interval == 0 {
            return Err(ConfigError::Message(
                "STREAM_VALIDATION_PROGRESS_INTERVAL must be greater than zero.".into(),
            ));
        }
        if self.user_agent.trim().is_empty() {
            return Err(ConfigError::Message(
                "STREAM_VALIDATION_USER_AGENT must not be blank.".into(),
            ));
        }
        Ok(())
    }
}

fn env_path(key: &str, default: &str) -> PathBuf {
    match env::var(key) {
        Ok(value) if !value.trim().is_empty() => PathBuf::from(value),
        _ => PathBuf::from(default),
    }
}

fn env_u64(key: &str, default: u64) -> Result<u64, ConfigError> {
    match env::var(key) {
        Ok(value) => value
            .parse()
            .map_err(|_| ConfigError::Message(format!("{key} must be a valid u64"))),
        Err(_) => Ok(default),
    }
}

fn env_usize(key: &str, default: usize) -> Result<usize, ConfigError> {
    match env::var(key) {
        Ok(value) => value
            .parse()
            .map_err(|_| ConfigError::Message(format!("{key} must be a valid usize"))),
        Err(_) => Ok(default),
    }
}

#[cfg(test)]
mod tests {
    use super::StreamValidationConfig;

    fn base_config() -> StreamValidationConfig {
        StreamValidationConfig {
            timeout_ms: 10_000,
            concurrency: 20,
            progress_interval: 100,
            user_agent: "radio-catalog-rs/1.0".into(),
        }
    }

    #[test]
    fn default_shape_passes_validation() {
        assert!(base_config().validate().is_ok());
    }

    #[test]
    fn zero_concurrency_is_rejected() {
        let config = StreamValidationConfig {
            concurrency: 0,
            ..base_config()
        };
        assert!(config.validate().is_err());
    }

    #[test]
    fn blank_user_agent_is_rejected() {
        let config = StreamValidationConfig {
            user_agent: "   ".into(),
            ..base_config()
        };
        assert!(config.validate().is_err());
    }
}
