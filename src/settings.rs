// SPDX-License-Identifier: Apache-2.0
use std::fmt;
use std::path::PathBuf;
use std::str::FromStr;

use thiserror::Error;
use tracing::info;

/// Environment variable names
pub const ENVIRONMENT_ENV: &str = "PROSPECTA_ENV";
pub const FIRM_CONFIG_ENV: &str = "PROSPECTA_FIRM_CONFIG";
pub const PROSPECTS_FILE_ENV: &str = "PROSPECTA_PROSPECTS_FILE";
pub const TEMPLATES_DIR_ENV: &str = "PROSPECTA_TEMPLATES_DIR";
pub const STATIC_DIR_ENV: &str = "PROSPECTA_STATIC_DIR";
pub const BIND_ADDR_ENV: &str = "PROSPECTA_BIND_ADDR";
pub const LOG_FORMAT_ENV: &str = "PROSPECTA_LOG_FORMAT";

/// Defaults used when the variables are unset
pub const DEFAULT_FIRM_CONFIG: &str = "config/escritorio.json";
pub const DEFAULT_PROSPECTS_FILE: &str = "data/prospects.json";
pub const DEFAULT_TEMPLATES_DIR: &str = "templates";
pub const DEFAULT_STATIC_DIR: &str = "static";
pub const DEFAULT_BIND_ADDR: &str = "0.0.0.0:5000";

#[derive(Debug, Error, PartialEq, Eq)]
pub enum SettingsError {
    #[error("unknown environment '{0}', expected 'development' or 'production'")]
    UnknownEnvironment(String),
    #[error("unknown log format '{0}', expected 'console' or 'json'")]
    UnknownLogFormat(String),
}

/// Deployment mode. Only `Development` may fall back to placeholder firm data.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum Environment {
    Development,
    #[default]
    Production,
}

impl Environment {
    pub fn is_development(self) -> bool {
        self == Environment::Development
    }
}

impl FromStr for Environment {
    type Err = SettingsError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_lowercase().as_str() {
            "development" | "dev" => Ok(Environment::Development),
            "production" | "prod" => Ok(Environment::Production),
            other => Err(SettingsError::UnknownEnvironment(other.to_owned())),
        }
    }
}

impl fmt::Display for Environment {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Environment::Development => f.write_str("development"),
            Environment::Production => f.write_str("production"),
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum LogFormat {
    #[default]
    Console,
    Json,
}

impl FromStr for LogFormat {
    type Err = SettingsError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_lowercase().as_str() {
            "console" | "pretty" => Ok(LogFormat::Console),
            "json" | "bunyan" => Ok(LogFormat::Json),
            other => Err(SettingsError::UnknownLogFormat(other.to_owned())),
        }
    }
}

/// Process-wide settings
#[derive(Debug, Clone)]
pub struct Settings {
    pub environment: Environment,
    pub firm_config: PathBuf,
    pub prospects_file: PathBuf,
    pub templates_dir: PathBuf,
    pub static_dir: PathBuf,
    pub bind_addr: String,
    pub log_format: LogFormat,
}

impl Default for Settings {
    fn default() -> Self {
        Self {
            environment: Environment::default(),
            firm_config: DEFAULT_FIRM_CONFIG.into(),
            prospects_file: DEFAULT_PROSPECTS_FILE.into(),
            templates_dir: DEFAULT_TEMPLATES_DIR.into(),
            static_dir: DEFAULT_STATIC_DIR.into(),
            bind_addr: DEFAULT_BIND_ADDR.to_owned(),
            log_format: LogFormat::default(),
        }
    }
}

impl Settings {
    /// Load settings from environment variables or use defaults
    pub fn from_env() -> Result<Self, SettingsError> {
        Self::from_lookup(|key| std::env::var(key).ok())
    }

    /// Same as `from_env`, reading variables through `lookup`
    pub fn from_lookup<F>(lookup: F) -> Result<Self, SettingsError>
    where
        F: Fn(&str) -> Option<String>,
    {
        let defaults = Self::default();
        // Empty values count as unset
        let var = |key: &str| lookup(key).filter(|v| !v.trim().is_empty());

        let environment = var(ENVIRONMENT_ENV)
            .map(|v| v.parse::<Environment>())
            .transpose()?
            .unwrap_or(defaults.environment);

        let log_format = var(LOG_FORMAT_ENV)
            .map(|v| v.parse::<LogFormat>())
            .transpose()?
            .unwrap_or(defaults.log_format);

        Ok(Self {
            environment,
            firm_config: var(FIRM_CONFIG_ENV).map_or(defaults.firm_config, PathBuf::from),
            prospects_file: var(PROSPECTS_FILE_ENV).map_or(defaults.prospects_file, PathBuf::from),
            templates_dir: var(TEMPLATES_DIR_ENV).map_or(defaults.templates_dir, PathBuf::from),
            static_dir: var(STATIC_DIR_ENV).map_or(defaults.static_dir, PathBuf::from),
            bind_addr: var(BIND_ADDR_ENV).unwrap_or(defaults.bind_addr),
            log_format,
        })
    }

    pub fn log_summary(&self) {
        info!("Settings:");
        info!("  Environment: {}", self.environment);
        info!("  Firm config: {}", self.firm_config.display());
        info!("  Prospects file: {}", self.prospects_file.display());
        info!("  Templates: {}", self.templates_dir.display());
        info!("  Bind address: {}", self.bind_addr);
    }
}
