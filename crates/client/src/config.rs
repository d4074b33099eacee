//! Client configuration loaded from environment variables.
//!
//! # Environment Variables
//!
//! ## Required
//! - `QUORUM_AUTH_URL` - Auth endpoint (send/verify one-time codes)
//! - `QUORUM_POLLS_URL` - Poll endpoint (list polls, vote history, voting)
//! - `QUORUM_ADMIN_URL` - Poll administration endpoint (create/close/delete)
//!
//! ## Optional
//! - `QUORUM_SESSION_DIR` - Directory holding the persisted session
//!   (default: `<platform config dir>/quorum`)
//! - `QUORUM_LOG_FORMAT` - `text` (default) or `json`

use std::path::PathBuf;

use thiserror::Error;
use url::Url;

const SESSION_DIR_NAME: &str = "quorum";

/// Configuration errors that can occur during loading.
#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("Missing environment variable: {0}")]
    MissingEnvVar(String),
    #[error("Invalid environment variable {0}: {1}")]
    InvalidEnvVar(String, String),
}

/// The three remote endpoints the client talks to.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Endpoints {
    /// Code issuance and verification.
    pub auth: Url,
    /// Poll listing, vote history and voting.
    pub polls: Url,
    /// Owner-only poll administration.
    pub admin: Url,
}

impl Endpoints {
    /// Parse the three endpoint URLs.
    ///
    /// # Errors
    ///
    /// Returns `ConfigError::InvalidEnvVar` naming the offending endpoint if a
    /// URL does not parse or is not http(s).
    pub fn parse(auth: &str, polls: &str, admin: &str) -> Result<Self, ConfigError> {
        Ok(Self {
            auth: parse_http_url("QUORUM_AUTH_URL", auth)?,
            polls: parse_http_url("QUORUM_POLLS_URL", polls)?,
            admin: parse_http_url("QUORUM_ADMIN_URL", admin)?,
        })
    }
}

/// Log output format for the CLI subscriber.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum LogFormat {
    #[default]
    Text,
    Json,
}

/// Client configuration.
#[derive(Debug, Clone)]
pub struct ClientConfig {
    pub endpoints: Endpoints,
    /// Directory the file session backend writes to.
    pub session_dir: PathBuf,
    pub log_format: LogFormat,
}

impl ClientConfig {
    /// Load configuration from environment variables.
    ///
    /// Calls `dotenvy::dotenv()` to load from `.env` file if present.
    ///
    /// # Errors
    ///
    /// Returns `ConfigError` if required variables are missing or invalid.
    pub fn from_env() -> Result<Self, ConfigError> {
        // Load .env file if present (ignore errors if not found)
        let _ = dotenvy::dotenv();
        Self::from_lookup(|key| std::env::var(key).ok())
    }

    /// Build configuration from an arbitrary variable lookup.
    ///
    /// # Errors
    ///
    /// Returns `ConfigError` if required variables are missing or invalid.
    pub fn from_lookup<F>(lookup: F) -> Result<Self, ConfigError>
    where
        F: Fn(&str) -> Option<String>,
    {
        let required = |key: &str| {
            lookup(key)
                .filter(|v| !v.trim().is_empty())
                .ok_or_else(|| ConfigError::MissingEnvVar(key.to_string()))
        };

        let endpoints = Endpoints::parse(
            &required("QUORUM_AUTH_URL")?,
            &required("QUORUM_POLLS_URL")?,
            &required("QUORUM_ADMIN_URL")?,
        )?;

        let session_dir = match lookup("QUORUM_SESSION_DIR") {
            Some(dir) if !dir.trim().is_empty() => PathBuf::from(dir),
            _ => default_session_dir()?,
        };

        let log_format = match lookup("QUORUM_LOG_FORMAT").as_deref().map(str::trim) {
            None | Some("" | "text") => LogFormat::Text,
            Some("json") => LogFormat::Json,
            Some(other) => {
                return Err(ConfigError::InvalidEnvVar(
                    "QUORUM_LOG_FORMAT".to_string(),
                    format!("expected 'text' or 'json', got '{other}'"),
                ));
            }
        };

        Ok(Self {
            endpoints,
            session_dir,
            log_format,
        })
    }
}

fn default_session_dir() -> Result<PathBuf, ConfigError> {
    dirs::config_dir()
        .map(|dir| dir.join(SESSION_DIR_NAME))
        .ok_or_else(|| {
            ConfigError::MissingEnvVar(
                "QUORUM_SESSION_DIR (no platform config directory)".to_string(),
            )
        })
}

fn parse_http_url(key: &str, value: &str) -> Result<Url, ConfigError> {
    let url = Url::parse(value.trim())
        .map_err(|e| ConfigError::InvalidEnvVar(key.to_string(), e.to_string()))?;
    match url.scheme() {
        "http" | "https" => Ok(url),
        scheme => Err(ConfigError::InvalidEnvVar(
            key.to_string(),
            format!("unsupported scheme '{scheme}'"),
        )),
    }
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use std::collections::HashMap;

    use super::*;

    fn env(pairs: &[(&str, &str)]) -> HashMap<String, String> {
        pairs
            .iter()
            .map(|(k, v)| ((*k).to_string(), (*v).to_string()))
            .collect()
    }

    fn base() -> HashMap<String, String> {
        env(&[
            ("QUORUM_AUTH_URL", "https://api.example.com/auth"),
            ("QUORUM_POLLS_URL", "https://api.example.com/polls"),
            ("QUORUM_ADMIN_URL", "https://api.example.com/manage-polls"),
            ("QUORUM_SESSION_DIR", "/tmp/quorum-test"),
        ])
    }

    #[test]
    fn test_loads_required_endpoints() {
        let vars = base();
        let config = ClientConfig::from_lookup(|k| vars.get(k).cloned()).unwrap();
        assert_eq!(config.endpoints.polls.path(), "/polls");
        assert_eq!(config.session_dir, PathBuf::from("/tmp/quorum-test"));
        assert_eq!(config.log_format, LogFormat::Text);
    }

    #[test]
    fn test_missing_endpoint() {
        let mut vars = base();
        vars.remove("QUORUM_ADMIN_URL");
        let err = ClientConfig::from_lookup(|k| vars.get(k).cloned()).unwrap_err();
        assert!(matches!(err, ConfigError::MissingEnvVar(ref k) if k == "QUORUM_ADMIN_URL"));
    }

    #[test]
    fn test_rejects_non_http_scheme() {
        let mut vars = base();
        vars.insert("QUORUM_AUTH_URL".to_string(), "ftp://example.com".to_string());
        let err = ClientConfig::from_lookup(|k| vars.get(k).cloned()).unwrap_err();
        assert!(matches!(err, ConfigError::InvalidEnvVar(ref k, _) if k == "QUORUM_AUTH_URL"));
    }

    #[test]
    fn test_json_log_format() {
        let mut vars = base();
        vars.insert("QUORUM_LOG_FORMAT".to_string(), "json".to_string());
        let config = ClientConfig::from_lookup(|k| vars.get(k).cloned()).unwrap();
        assert_eq!(config.log_format, LogFormat::Json);

        vars.insert("QUORUM_LOG_FORMAT".to_string(), "yaml".to_string());
        assert!(ClientConfig::from_lookup(|k| vars.get(k).cloned()).is_err());
    }
}
