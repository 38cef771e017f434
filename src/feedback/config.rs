//! Feedback endpoint configuration.
//!
//! The endpoint URL and optional success marker come from the `[feedback]`
//! table of `.visigov/config.toml`; `VISIGOV_FEEDBACK_URL` overrides the
//! file. A missing endpoint is a recoverable error: the hosting panel shows
//! a configuration notice and keeps the widgets disabled instead of ever
//! reaching the transport.

use std::path::{Path, PathBuf};

use serde::Deserialize;
use url::Url;

use crate::app_dirs;

/// Default filename used to store the app configuration.
pub const CONFIG_FILE_NAME: &str = "config.toml";

/// Environment variable overriding the configured endpoint URL.
pub const ENDPOINT_ENV: &str = "VISIGOV_FEEDBACK_URL";

/// Errors raised while loading or validating the feedback configuration.
#[derive(Debug, thiserror::Error)]
pub enum ConfigError {
    /// No suitable base config directory could be resolved.
    #[error("No suitable config directory available")]
    NoConfigDir,
    /// The config directory exists but could not be prepared.
    #[error("Failed to create config directory at {path}: {source}")]
    CreateDir {
        path: PathBuf,
        source: std::io::Error,
    },
    /// Failed to read the configuration file.
    #[error("Failed to read config at {path}: {source}")]
    Read {
        path: PathBuf,
        source: std::io::Error,
    },
    /// The configuration file is not valid TOML.
    #[error("Failed to parse config at {path}: {source}")]
    ParseToml {
        path: PathBuf,
        source: toml::de::Error,
    },
    /// Neither the file nor the environment supplies an endpoint URL.
    #[error("No feedback endpoint configured; set [feedback] endpoint_url or {ENDPOINT_ENV}")]
    EndpointMissing,
    /// The configured endpoint is not a usable HTTP(S) URL.
    #[error("Invalid feedback endpoint {value:?}: {reason}")]
    InvalidEndpoint { value: String, reason: String },
}

/// Resolved, validated feedback configuration.
#[derive(Clone, Debug)]
pub struct FeedbackConfig {
    /// Where submissions are POSTed.
    pub endpoint: Url,
    /// When set, a 2xx response body must contain this marker to count as success.
    pub success_marker: Option<String>,
}

#[derive(Debug, Default, Deserialize)]
struct ConfigFile {
    #[serde(default)]
    feedback: FeedbackSection,
}

#[derive(Debug, Default, Deserialize)]
struct FeedbackSection {
    endpoint_url: Option<String>,
    success_marker: Option<String>,
}

/// Resolve the configuration file path inside the app root.
pub fn config_path() -> Result<PathBuf, ConfigError> {
    let dir = app_dirs::app_root_dir().map_err(|error| match error {
        app_dirs::AppDirError::NoBaseDir => ConfigError::NoConfigDir,
        app_dirs::AppDirError::CreateDir { path, source } => {
            ConfigError::CreateDir { path, source }
        }
    })?;
    Ok(dir.join(CONFIG_FILE_NAME))
}

/// Load the feedback configuration from disk and the environment.
pub fn load() -> Result<FeedbackConfig, ConfigError> {
    let path = config_path()?;
    let section = read_section(&path)?;
    resolve(section, |key| std::env::var(key).ok())
}

fn read_section(path: &Path) -> Result<FeedbackSection, ConfigError> {
    if !path.exists() {
        return Ok(FeedbackSection::default());
    }
    let text = std::fs::read_to_string(path).map_err(|source| ConfigError::Read {
        path: path.to_path_buf(),
        source,
    })?;
    let file: ConfigFile = toml::from_str(&text).map_err(|source| ConfigError::ParseToml {
        path: path.to_path_buf(),
        source,
    })?;
    Ok(file.feedback)
}

fn resolve(
    section: FeedbackSection,
    env: impl Fn(&str) -> Option<String>,
) -> Result<FeedbackConfig, ConfigError> {
    let raw = env(ENDPOINT_ENV)
        .filter(|value| !value.trim().is_empty())
        .or(section.endpoint_url)
        .ok_or(ConfigError::EndpointMissing)?;
    let endpoint = parse_endpoint(raw.trim())?;
    let success_marker = section
        .success_marker
        .filter(|marker| !marker.trim().is_empty());
    Ok(FeedbackConfig {
        endpoint,
        success_marker,
    })
}

fn parse_endpoint(raw: &str) -> Result<Url, ConfigError> {
    let endpoint = Url::parse(raw).map_err(|source| ConfigError::InvalidEndpoint {
        value: raw.to_string(),
        reason: source.to_string(),
    })?;
    if !matches!(endpoint.scheme(), "http" | "https") {
        return Err(ConfigError::InvalidEndpoint {
            value: raw.to_string(),
            reason: format!("unsupported scheme {:?}", endpoint.scheme()),
        });
    }
    Ok(endpoint)
}
