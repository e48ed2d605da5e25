//! Deployment configuration, validated once at boot.

use std::env;
use std::fmt;

use serde::{Deserialize, Serialize};

/// Deployment environment.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Environment {
    Development,
    Staging,
    Production,
}

impl Environment {
    /// Parse from the `ENVIRONMENT` variable value.
    pub fn parse(value: &str) -> Option<Self> {
        match value {
            "development" => Some(Self::Development),
            "staging" => Some(Self::Staging),
            "production" => Some(Self::Production),
            _ => None,
        }
    }

    /// Check whether this is the production environment.
    pub fn is_production(&self) -> bool {
        matches!(self, Self::Production)
    }
}

impl fmt::Display for Environment {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Development => write!(f, "development"),
            Self::Staging => write!(f, "staging"),
            Self::Production => write!(f, "production"),
        }
    }
}

/// Minimum log level. `None` disables all output.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum LogLevel {
    Debug,
    Info,
    Warn,
    Error,
    None,
}

impl LogLevel {
    /// Parse from the `LOG_LEVEL` variable value.
    pub fn parse(value: &str) -> Option<Self> {
        match value {
            "debug" => Some(Self::Debug),
            "info" => Some(Self::Info),
            "warn" => Some(Self::Warn),
            "error" => Some(Self::Error),
            "none" => Some(Self::None),
            _ => None,
        }
    }
}

impl fmt::Display for LogLevel {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Debug => write!(f, "debug"),
            Self::Info => write!(f, "info"),
            Self::Warn => write!(f, "warn"),
            Self::Error => write!(f, "error"),
            Self::None => write!(f, "none"),
        }
    }
}

/// Immutable descriptor of the deployed code version.
///
/// The id scopes every cache key, so deploying new code invalidates all
/// entries written by previous deployments.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct VersionMetadata {
    /// Unique identifier of the deployment.
    pub id: String,
    /// Human-readable tag (may be empty).
    pub tag: String,
    /// When the version was deployed.
    pub timestamp: String,
}

/// Validated application configuration.
///
/// Constructed once per deployment boundary via [`Config::from_env`] and
/// never mutated afterwards.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Config {
    /// Shared-cache TTL in seconds; entries older than this are stale.
    pub s_maxage: u64,
    /// Stale-while-revalidate window in seconds.
    pub swr_ttl: u64,
    /// Deployment environment.
    pub environment: Environment,
    /// Secret that authorizes a cache-bypassing refresh.
    pub admin_key: String,
    /// Spreadsheet API key for the origin fetch.
    pub sheets_api_key: String,
    /// Identifier of the source spreadsheet.
    pub sheet_id: String,
    /// Minimum log level.
    pub log_level: LogLevel,
    /// Deployed code version.
    pub version: VersionMetadata,
}

/// Environment validation failure, naming every offending variable.
#[derive(Debug, Clone, thiserror::Error)]
#[error("environment validation failed: {}", .fields.join(", "))]
pub struct ConfigError {
    /// Variables that were missing or malformed.
    pub fields: Vec<String>,
}

impl Config {
    /// Build and validate the configuration from process environment
    /// variables. Every field is checked before first use; any failure is
    /// fatal and the process must not serve traffic.
    pub fn from_env() -> Result<Self, ConfigError> {
        let mut problems = Vec::new();

        let sheets_api_key = require("GOOGLE_SHEETS_API_KEY", &mut problems);
        let sheet_id = require("GOOGLE_SHEET_ID", &mut problems);
        let admin_key = require("ADMIN_KEY", &mut problems);
        let s_maxage = require_u64("S_MAXAGE", &mut problems);
        let swr_ttl = require_u64("SWR_TTL", &mut problems);

        let log_level = require("LOG_LEVEL", &mut problems);
        let log_level = LogLevel::parse(&log_level).unwrap_or_else(|| {
            problems.push("LOG_LEVEL".to_string());
            LogLevel::Info
        });

        let environment = require("ENVIRONMENT", &mut problems);
        let environment = Environment::parse(&environment).unwrap_or_else(|| {
            problems.push("ENVIRONMENT".to_string());
            Environment::Development
        });

        let version = VersionMetadata {
            id: require("VERSION_ID", &mut problems),
            // The tag is allowed to be empty (e.g. unlabelled deploys).
            tag: env::var("VERSION_TAG").unwrap_or_default(),
            timestamp: require("VERSION_TIMESTAMP", &mut problems),
        };

        if !problems.is_empty() {
            problems.dedup();
            return Err(ConfigError { fields: problems });
        }

        Ok(Self {
            s_maxage,
            swr_ttl,
            environment,
            admin_key,
            sheets_api_key,
            sheet_id,
            log_level,
            version,
        })
    }
}

fn require(name: &str, problems: &mut Vec<String>) -> String {
    match env::var(name) {
        Ok(value) if !value.trim().is_empty() => value,
        _ => {
            problems.push(name.to_string());
            String::new()
        }
    }
}

fn require_u64(name: &str, problems: &mut Vec<String>) -> u64 {
    match env::var(name).ok().and_then(|v| v.trim().parse().ok()) {
        Some(value) => value,
        None => {
            problems.push(name.to_string());
            0
        }
    }
}
