//! Server configuration from environment variables
//!
//! - `PROBLEM_ADMIN_PORT` - listen port (default 3001)
//! - `PROBLEM_ADMIN_DB_PATH` - database file (default
//!   `~/.problem-admin/database/problems.db`)
//! - `CORS_ALLOW_ORIGIN` - comma-separated allowed origins (default: the
//!   local editor dev servers)

use axum::http::HeaderValue;
use std::path::PathBuf;
use thiserror::Error;

pub const DEFAULT_PORT: u16 = 3001;

const DEFAULT_CORS_ORIGINS: [&str; 3] = [
    "http://localhost:1420",
    "http://localhost:5173",
    "http://localhost:1421",
];

#[derive(Error, Debug, PartialEq, Eq)]
pub enum ConfigError {
    #[error("Invalid PROBLEM_ADMIN_PORT '{0}': expected a port number")]
    InvalidPort(String),

    #[error("Invalid CORS_ALLOW_ORIGIN entry '{0}': must be a valid HTTP origin")]
    InvalidOrigin(String),

    #[error("Failed to determine home directory for the default database path")]
    NoHomeDirectory,
}

#[derive(Debug, Clone)]
pub struct ServerConfig {
    pub port: u16,
    pub db_path: PathBuf,
    pub cors_origins: Vec<HeaderValue>,
}

impl ServerConfig {
    pub fn from_env() -> Result<Self, ConfigError> {
        Self::from_lookup(|key| std::env::var(key).ok())
    }

    /// Build from an arbitrary variable source; unset and empty values fall
    /// back to the defaults
    pub fn from_lookup(lookup: impl Fn(&str) -> Option<String>) -> Result<Self, ConfigError> {
        let var = |key: &str| lookup(key).filter(|v| !v.trim().is_empty());

        let port = match var("PROBLEM_ADMIN_PORT") {
            Some(raw) => raw
                .trim()
                .parse::<u16>()
                .map_err(|_| ConfigError::InvalidPort(raw.clone()))?,
            None => DEFAULT_PORT,
        };

        let db_path = match var("PROBLEM_ADMIN_DB_PATH") {
            Some(path) => PathBuf::from(path),
            None => default_db_path()?,
        };

        let cors_origins = match var("CORS_ALLOW_ORIGIN") {
            Some(raw) => parse_origins(&raw)?,
            None => default_cors_origins(),
        };

        Ok(Self {
            port,
            db_path,
            cors_origins,
        })
    }
}

fn default_db_path() -> Result<PathBuf, ConfigError> {
    let home_dir = dirs::home_dir().ok_or(ConfigError::NoHomeDirectory)?;
    Ok(home_dir
        .join(".problem-admin")
        .join("database")
        .join("problems.db"))
}

pub fn default_cors_origins() -> Vec<HeaderValue> {
    DEFAULT_CORS_ORIGINS
        .into_iter()
        .map(HeaderValue::from_static)
        .collect()
}

fn parse_origins(raw: &str) -> Result<Vec<HeaderValue>, ConfigError> {
    raw.split(',')
        .map(str::trim)
        .filter(|origin| !origin.is_empty())
        .map(|origin| {
            origin
                .parse::<HeaderValue>()
                .map_err(|_| ConfigError::InvalidOrigin(origin.to_string()))
        })
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::collections::HashMap;

    fn config_from(vars: &[(&str, &str)]) -> Result<ServerConfig, ConfigError> {
        let vars: HashMap<String, String> = vars
            .iter()
            .map(|(k, v)| (k.to_string(), v.to_string()))
            .collect();
        ServerConfig::from_lookup(|key| vars.get(key).cloned())
    }

    #[test]
    fn test_explicit_values() {
        let config = config_from(&[
            ("PROBLEM_ADMIN_PORT", "8080"),
            ("PROBLEM_ADMIN_DB_PATH", "/tmp/problems.db"),
            ("CORS_ALLOW_ORIGIN", "http://a.test, http://b.test"),
        ])
        .unwrap();

        assert_eq!(config.port, 8080);
        assert_eq!(config.db_path, PathBuf::from("/tmp/problems.db"));
        assert_eq!(
            config.cors_origins,
            vec![
                HeaderValue::from_static("http://a.test"),
                HeaderValue::from_static("http://b.test")
            ]
        );
    }

    #[test]
    fn test_defaults() {
        let config = config_from(&[("PROBLEM_ADMIN_DB_PATH", "/tmp/x.db")]).unwrap();
        assert_eq!(config.port, DEFAULT_PORT);
        assert_eq!(config.cors_origins.len(), 3);
    }

    #[test]
    fn test_invalid_port() {
        let err = config_from(&[
            ("PROBLEM_ADMIN_PORT", "not-a-port"),
            ("PROBLEM_ADMIN_DB_PATH", "/tmp/x.db"),
        ])
        .unwrap_err();
        assert_eq!(err, ConfigError::InvalidPort("not-a-port".to_string()));
    }

    #[test]
    fn test_invalid_origin() {
        let err = config_from(&[
            ("PROBLEM_ADMIN_DB_PATH", "/tmp/x.db"),
            ("CORS_ALLOW_ORIGIN", "http://ok.test,bad\norigin"),
        ])
        .unwrap_err();
        assert!(matches!(err, ConfigError::InvalidOrigin(_)));
    }
}
