//! Runtime configuration.
//!
//! Sources are merged in order: built-in defaults, an optional `opine.toml`,
//! `OPINE_*` environment variables, then programmatic overrides. The merged
//! result is validated once at the end.

use std::env;
use std::fs;
use std::path::{Path, PathBuf};

use secrecy::{ExposeSecret, SecretString};
use serde::{Deserialize, Serialize};
use thiserror::Error;

pub const DEFAULT_BASE_URL: &str = "https://api.tryopine.com/v1";
pub const API_KEY_ENV: &str = "OPINE_API_KEY";
pub const DEFAULT_TIMEOUT_SECS: u64 = 30;
pub const MAX_TIMEOUT_SECS: u64 = 300;

const CONFIG_FILE_CANDIDATES: [&str; 2] = ["opine.toml", "config/opine.toml"];
const LOG_LEVELS: [&str; 5] = ["trace", "debug", "info", "warn", "error"];

#[derive(Clone, Debug)]
pub struct AppConfig {
    pub api: ApiConfig,
    pub logging: LoggingConfig,
}

/// Connection settings for the Opine API. `api_key` is redacted in `Debug`.
#[derive(Clone, Debug)]
pub struct ApiConfig {
    pub api_key: SecretString,
    pub base_url: String,
    pub timeout_secs: u64,
}

#[derive(Clone, Debug)]
pub struct LoggingConfig {
    pub level: String,
    pub format: LogFormat,
}

#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum LogFormat {
    Compact,
    Pretty,
    Json,
}

#[derive(Clone, Debug, Default)]
pub struct ConfigOverrides {
    pub api_key: Option<String>,
    pub base_url: Option<String>,
    pub timeout_secs: Option<u64>,
    pub log_level: Option<String>,
    pub log_format: Option<LogFormat>,
}

#[derive(Clone, Debug, Default)]
pub struct LoadOptions {
    pub config_path: Option<PathBuf>,
    pub require_file: bool,
    pub overrides: ConfigOverrides,
}

#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("could not read config file `{path}`: {source}")]
    ReadFile { path: PathBuf, source: std::io::Error },
    #[error("could not parse config file `{path}`: {source}")]
    ParseFile { path: PathBuf, source: toml::de::Error },
    #[error("required config file was not found: `{0}`")]
    MissingConfigFile(PathBuf),
    #[error("config file references unset environment variable `{var}`")]
    MissingEnvInterpolation { var: String },
    #[error("config file has an unterminated `${{...}}` reference")]
    UnterminatedInterpolation,
    #[error("invalid value for `{key}`: `{value}`")]
    InvalidEnvOverride { key: String, value: String },
    #[error("configuration validation failed: {0}")]
    Validation(String),
}

impl Default for AppConfig {
    fn default() -> Self {
        Self {
            api: ApiConfig {
                api_key: SecretString::from(String::new()),
                base_url: DEFAULT_BASE_URL.to_string(),
                timeout_secs: DEFAULT_TIMEOUT_SECS,
            },
            logging: LoggingConfig { level: "info".to_string(), format: LogFormat::Compact },
        }
    }
}

impl std::str::FromStr for LogFormat {
    type Err = ConfigError;

    fn from_str(value: &str) -> Result<Self, Self::Err> {
        match value.trim().to_ascii_lowercase().as_str() {
            "compact" => Ok(Self::Compact),
            "pretty" => Ok(Self::Pretty),
            "json" => Ok(Self::Json),
            other => Err(ConfigError::Validation(format!(
                "unsupported log format `{other}` (expected compact|pretty|json)"
            ))),
        }
    }
}

impl AppConfig {
    pub fn load(options: LoadOptions) -> Result<Self, ConfigError> {
        let LoadOptions { config_path, require_file, overrides } = options;
        let mut config = Self::default();

        match locate_config_file(config_path.as_deref()) {
            Some(path) => config.merge_file(read_file_config(&path)?),
            None if require_file => {
                let expected =
                    config_path.unwrap_or_else(|| PathBuf::from(CONFIG_FILE_CANDIDATES[0]));
                return Err(ConfigError::MissingConfigFile(expected));
            }
            None => {}
        }

        config.merge_env()?;
        config.merge_overrides(overrides);
        config.validate()?;

        Ok(config)
    }

    fn merge_file(&mut self, file: FileConfig) {
        let FileConfig { api, logging } = file;

        if let Some(api) = api {
            if let Some(key) = api.api_key {
                self.api.api_key = SecretString::from(key);
            }
            replace_if_some(&mut self.api.base_url, api.base_url);
            replace_if_some(&mut self.api.timeout_secs, api.timeout_secs);
        }

        if let Some(logging) = logging {
            replace_if_some(&mut self.logging.level, logging.level);
            replace_if_some(&mut self.logging.format, logging.format);
        }
    }

    fn merge_env(&mut self) -> Result<(), ConfigError> {
        if let Some(key) = non_blank_env(API_KEY_ENV) {
            self.api.api_key = SecretString::from(key);
        }
        replace_if_some(&mut self.api.base_url, non_blank_env("OPINE_BASE_URL"));
        if let Some(raw) = non_blank_env("OPINE_TIMEOUT_SECS") {
            self.api.timeout_secs = raw.trim().parse().map_err(|_| ConfigError::InvalidEnvOverride {
                key: "OPINE_TIMEOUT_SECS".to_string(),
                value: raw.clone(),
            })?;
        }

        replace_if_some(&mut self.logging.level, non_blank_env("OPINE_LOG_LEVEL"));
        if let Some(raw) = non_blank_env("OPINE_LOG_FORMAT") {
            self.logging.format = raw.parse()?;
        }

        Ok(())
    }

    fn merge_overrides(&mut self, overrides: ConfigOverrides) {
        if let Some(key) = overrides.api_key {
            self.api.api_key = SecretString::from(key);
        }
        replace_if_some(&mut self.api.base_url, overrides.base_url);
        replace_if_some(&mut self.api.timeout_secs, overrides.timeout_secs);
        replace_if_some(&mut self.logging.level, overrides.log_level);
        replace_if_some(&mut self.logging.format, overrides.log_format);
    }

    pub fn validate(&self) -> Result<(), ConfigError> {
        if self.api.api_key.expose_secret().trim().is_empty() {
            return Err(ConfigError::Validation(format!(
                "{API_KEY_ENV} environment variable is required (or set api.api_key in opine.toml)"
            )));
        }

        let base_url = self.api.base_url.trim();
        if !(base_url.starts_with("http://") || base_url.starts_with("https://")) {
            return Err(ConfigError::Validation(format!(
                "api.base_url `{base_url}` must use http:// or https://"
            )));
        }

        if !(1..=MAX_TIMEOUT_SECS).contains(&self.api.timeout_secs) {
            return Err(ConfigError::Validation(format!(
                "api.timeout_secs must be between 1 and {MAX_TIMEOUT_SECS}, got {}",
                self.api.timeout_secs
            )));
        }

        let level = self.logging.level.trim().to_ascii_lowercase();
        if !LOG_LEVELS.contains(&level.as_str()) {
            return Err(ConfigError::Validation(format!(
                "logging.level `{}` is not one of {}",
                self.logging.level,
                LOG_LEVELS.join("|")
            )));
        }

        Ok(())
    }
}

fn replace_if_some<T>(slot: &mut T, value: Option<T>) {
    if let Some(value) = value {
        *slot = value;
    }
}

fn non_blank_env(key: &str) -> Option<String> {
    env::var(key).ok().filter(|value| !value.trim().is_empty())
}

fn locate_config_file(explicit: Option<&Path>) -> Option<PathBuf> {
    match explicit {
        Some(path) => path.is_file().then(|| path.to_path_buf()),
        None => CONFIG_FILE_CANDIDATES.into_iter().map(PathBuf::from).find(|path| path.is_file()),
    }
}

fn read_file_config(path: &Path) -> Result<FileConfig, ConfigError> {
    let raw = fs::read_to_string(path)
        .map_err(|source| ConfigError::ReadFile { path: path.to_path_buf(), source })?;

    toml::from_str(&expand_env_refs(&raw)?)
        .map_err(|source| ConfigError::ParseFile { path: path.to_path_buf(), source })
}

/// Replaces each `${VAR}` with the value of `VAR`. Unset variables are errors.
fn expand_env_refs(input: &str) -> Result<String, ConfigError> {
    let mut expanded = String::with_capacity(input.len());
    let mut rest = input;

    while let Some(start) = rest.find("${") {
        expanded.push_str(&rest[..start]);
        let tail = &rest[start + 2..];
        let end = tail.find('}').ok_or(ConfigError::UnterminatedInterpolation)?;
        let var = &tail[..end];
        let value = env::var(var)
            .map_err(|_| ConfigError::MissingEnvInterpolation { var: var.to_string() })?;
        expanded.push_str(&value);
        rest = &tail[end + 1..];
    }

    expanded.push_str(rest);
    Ok(expanded)
}

/// On-disk shape of `opine.toml`. Every key is optional.
#[derive(Debug, Default, Deserialize)]
#[serde(deny_unknown_fields)]
struct FileConfig {
    api: Option<FileApiSection>,
    logging: Option<FileLoggingSection>,
}

#[derive(Debug, Default, Deserialize)]
#[serde(deny_unknown_fields)]
struct FileApiSection {
    api_key: Option<String>,
    base_url: Option<String>,
    timeout_secs: Option<u64>,
}

#[derive(Debug, Default, Deserialize)]
#[serde(deny_unknown_fields)]
struct FileLoggingSection {
    level: Option<String>,
    format: Option<LogFormat>,
}
