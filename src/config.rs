//! Application configuration parsed from environment variables.

use std::path::PathBuf;

pub const DEFAULT_TMDB_BASE_URL: &str = "https://api.themoviedb.org/3";
pub const DEFAULT_LANGUAGE: &str = "ko-KR";
pub const DEFAULT_REQUEST_TIMEOUT_SECS: u64 = 30;
pub const DEFAULT_CONNECT_TIMEOUT_SECS: u64 = 10;
pub const DEFAULT_STORAGE_PATH: &str = ".cinebox/storage.json";

#[derive(Debug, thiserror::Error, PartialEq, Eq)]
pub enum ConfigError {
    #[error("invalid {var}: expected a whole number of seconds, got {value:?}")]
    InvalidNumber { var: &'static str, value: String },
    #[error("invalid {var}: expected a boolean, got {value:?}")]
    InvalidBool { var: &'static str, value: String },
    #[error("{var} must not be empty")]
    Empty { var: &'static str },
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ApiTimeouts {
    pub request_secs: u64,
    pub connect_secs: u64,
}

/// Upstream catalog settings shared by every request.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ApiConfig {
    pub base_url: String,
    pub language: String,
    pub timeouts: ApiTimeouts,
}

impl Default for ApiConfig {
    fn default() -> Self {
        Self {
            base_url: DEFAULT_TMDB_BASE_URL.to_owned(),
            language: DEFAULT_LANGUAGE.to_owned(),
            timeouts: ApiTimeouts {
                request_secs: DEFAULT_REQUEST_TIMEOUT_SECS,
                connect_secs: DEFAULT_CONNECT_TIMEOUT_SECS,
            },
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct AppConfig {
    pub api: ApiConfig,
    pub storage_path: PathBuf,
    /// Probe the upstream API with a candidate credential before registering it.
    pub validate_credentials: bool,
}

impl Default for AppConfig {
    fn default() -> Self {
        Self {
            api: ApiConfig::default(),
            storage_path: PathBuf::from(DEFAULT_STORAGE_PATH),
            validate_credentials: false,
        }
    }
}

impl AppConfig {
    /// Build typed config from environment variables.
    ///
    /// Optional:
    /// - `TMDB_BASE_URL`: default `https://api.themoviedb.org/3`
    /// - `TMDB_LANGUAGE`: default `ko-KR`
    /// - `TMDB_REQUEST_TIMEOUT_SECS`: default 30
    /// - `TMDB_CONNECT_TIMEOUT_SECS`: default 10
    /// - `CINEBOX_STORAGE_PATH`: default `.cinebox/storage.json`
    /// - `CINEBOX_VALIDATE_CREDENTIALS`: default false
    ///
    /// # Errors
    ///
    /// Returns an error if a variable is set to an unparsable value.
    pub fn from_env() -> Result<Self, ConfigError> {
        Self::from_lookup(|key| std::env::var(key).ok())
    }

    /// Build typed config from an arbitrary key lookup.
    ///
    /// # Errors
    ///
    /// Returns an error if a variable is set to an unparsable value.
    pub fn from_lookup<F>(lookup: F) -> Result<Self, ConfigError>
    where
        F: Fn(&str) -> Option<String>,
    {
        let base_url = lookup("TMDB_BASE_URL")
            .unwrap_or_else(|| DEFAULT_TMDB_BASE_URL.to_owned())
            .trim_end_matches('/')
            .to_owned();
        if base_url.is_empty() {
            return Err(ConfigError::Empty { var: "TMDB_BASE_URL" });
        }

        let language = lookup("TMDB_LANGUAGE").unwrap_or_else(|| DEFAULT_LANGUAGE.to_owned());
        let timeouts = ApiTimeouts {
            request_secs: parse_secs(&lookup, "TMDB_REQUEST_TIMEOUT_SECS", DEFAULT_REQUEST_TIMEOUT_SECS)?,
            connect_secs: parse_secs(&lookup, "TMDB_CONNECT_TIMEOUT_SECS", DEFAULT_CONNECT_TIMEOUT_SECS)?,
        };

        let storage_path = lookup("CINEBOX_STORAGE_PATH")
            .filter(|v| !v.trim().is_empty())
            .map_or_else(|| PathBuf::from(DEFAULT_STORAGE_PATH), PathBuf::from);
        let validate_credentials = match lookup("CINEBOX_VALIDATE_CREDENTIALS") {
            Some(raw) => parse_bool(&raw).ok_or(ConfigError::InvalidBool { var: "CINEBOX_VALIDATE_CREDENTIALS", value: raw })?,
            None => false,
        };

        Ok(Self { api: ApiConfig { base_url, language, timeouts }, storage_path, validate_credentials })
    }
}

fn parse_secs<F>(lookup: &F, var: &'static str, default: u64) -> Result<u64, ConfigError>
where
    F: Fn(&str) -> Option<String>,
{
    match lookup(var) {
        Some(raw) => raw
            .trim()
            .parse::<u64>()
            .map_err(|_| ConfigError::InvalidNumber { var, value: raw }),
        None => Ok(default),
    }
}

pub(crate) fn parse_bool(raw: &str) -> Option<bool> {
    match raw.trim().to_ascii_lowercase().as_str() {
        "1" | "true" | "yes" | "on" => Some(true),
        "0" | "false" | "no" | "off" => Some(false),
        _ => None,
    }
}

#[cfg(test)]
#[path = "config_test.rs"]
mod tests;
