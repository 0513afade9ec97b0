/*
 *  Copyright 2025-2026 Colliery Software
 *
 *  Licensed under the Apache License, Version 2.0 (the "License");
 *  you may not use this file except in compliance with the License.
 *  You may obtain a copy of the License at
 *
 *      http://www.apache.org/licenses/LICENSE-2.0
 *
 *  Unless required by applicable law or agreed to in writing, software
 *  distributed under the License is distributed on an "AS IS" BASIS,
 *  WITHOUT WARRANTIES OR CONDITIONS OF ANY KIND, either express or implied.
 *  See the License for the specific language governing permissions and
 *  limitations under the License.
 */

//! Service configuration.
//!
//! Values are resolved in layers, later layers winning:
//!
//! 1. built-in defaults
//! 2. an optional TOML file
//! 3. environment variables, including any loaded from a `.env` file by
//!    [`load_env_file`]
//!
//! Command-line flags are applied on top by the server binary.
//!
//! ```toml
//! [server]
//! host = "0.0.0.0"
//! port = 8088
//!
//! [database]
//! url = "sqlite://adreel.db"
//! pool_size = 1
//!
//! [logging]
//! level = "info"
//! format = "text"
//! ```

use std::path::{Path, PathBuf};

use serde::{Deserialize, Serialize};
use thiserror::Error;

use crate::database::BackendType;

/// Port used when neither the file nor the environment sets one.
pub const DEFAULT_PORT: u16 = 8088;

const LOG_LEVELS: &[&str] = &["error", "warn", "info", "debug", "trace"];
const LOG_FORMATS: &[&str] = &["text", "json"];

#[derive(Error, Debug)]
pub enum ConfigError {
    #[error("Failed to read configuration file {path}: {source}")]
    ReadError {
        path: PathBuf,
        source: std::io::Error,
    },

    #[error("Failed to parse TOML configuration: {0}")]
    TomlParseError(#[from] toml::de::Error),

    #[error("Invalid value for environment variable {name}: {value}")]
    InvalidEnv { name: &'static str, value: String },

    #[error("Configuration validation failed: {}", .0.join("; "))]
    Invalid(Vec<String>),
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct ServerConfig {
    pub host: String,
    pub port: u16,
}

impl Default for ServerConfig {
    fn default() -> Self {
        Self {
            host: "0.0.0.0".to_string(),
            port: DEFAULT_PORT,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct DatabaseConfig {
    /// `memory://`, a SQLite file path, or a `sqlite://` URL
    pub url: String,
    pub pool_size: u32,
}

impl Default for DatabaseConfig {
    fn default() -> Self {
        Self {
            url: "memory://".to_string(),
            pool_size: 1,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct LoggingConfig {
    pub level: String,
    /// `text` or `json`
    pub format: String,
}

impl Default for LoggingConfig {
    fn default() -> Self {
        Self {
            level: "info".to_string(),
            format: "text".to_string(),
        }
    }
}

/// Complete service configuration.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct AdreelConfig {
    pub server: ServerConfig,
    pub database: DatabaseConfig,
    pub logging: LoggingConfig,
}

impl AdreelConfig {
    /// Parses a TOML document; absent sections and keys keep their defaults.
    pub fn from_toml_str(contents: &str) -> Result<Self, ConfigError> {
        Ok(toml::from_str(contents)?)
    }

    pub fn from_file(path: &Path) -> Result<Self, ConfigError> {
        let contents = std::fs::read_to_string(path).map_err(|source| ConfigError::ReadError {
            path: path.to_path_buf(),
            source,
        })?;
        Self::from_toml_str(&contents)
    }

    /// Resolves defaults, the optional file and the process environment,
    /// then validates the result.
    pub fn load(path: Option<&Path>) -> Result<Self, ConfigError> {
        let mut config = match path {
            Some(path) => Self::from_file(path)?,
            None => Self::default(),
        };
        config.apply_env(|name| std::env::var(name).ok())?;
        config.validate()?;
        Ok(config)
    }

    /// Applies overrides from `DATABASE_URL`, `DATABASE_POOL_SIZE`, `PORT`,
    /// `ADREEL_HOST`, `ADREEL_LOG_LEVEL` and `ADREEL_LOG_FORMAT`.
    ///
    /// The lookup is injected so tests never touch the real environment.
    pub fn apply_env<F>(&mut self, lookup: F) -> Result<(), ConfigError>
    where
        F: Fn(&str) -> Option<String>,
    {
        if let Some(url) = lookup("DATABASE_URL") {
            self.database.url = url;
        }
        if let Some(size) = lookup("DATABASE_POOL_SIZE") {
            self.database.pool_size = size.parse().map_err(|_| ConfigError::InvalidEnv {
                name: "DATABASE_POOL_SIZE",
                value: size.clone(),
            })?;
        }
        if let Some(port) = lookup("PORT") {
            self.server.port = port.parse().map_err(|_| ConfigError::InvalidEnv {
                name: "PORT",
                value: port.clone(),
            })?;
        }
        if let Some(host) = lookup("ADREEL_HOST") {
            self.server.host = host;
        }
        if let Some(level) = lookup("ADREEL_LOG_LEVEL") {
            self.logging.level = level;
        }
        if let Some(format) = lookup("ADREEL_LOG_FORMAT") {
            self.logging.format = format;
        }
        Ok(())
    }

    /// Checks every setting and reports all problems together.
    pub fn validate(&self) -> Result<(), ConfigError> {
        let mut errors = Vec::new();

        if self.server.port == 0 {
            errors.push("server.port must be between 1 and 65535".to_string());
        }
        if self.server.host.trim().is_empty() {
            errors.push("server.host must not be empty".to_string());
        }
        if !(1..=100).contains(&self.database.pool_size) {
            errors.push(format!(
                "database.pool_size {} must be between 1 and 100",
                self.database.pool_size
            ));
        }
        if BackendType::from_url(&self.database.url).is_none() {
            errors.push(format!(
                "database.url '{}' is not a supported store \
                 (expected memory://, sqlite:// or a file path)",
                self.database.url
            ));
        }
        if is_in_memory_sqlite(&self.database.url) && self.database.pool_size > 1 {
            errors.push(format!(
                "database.pool_size {} must be 1 for an in-memory SQLite database",
                self.database.pool_size
            ));
        }
        if !LOG_LEVELS.contains(&self.logging.level.to_lowercase().as_str()) {
            errors.push(format!(
                "logging.level '{}' must be one of: {}",
                self.logging.level,
                LOG_LEVELS.join(", ")
            ));
        }
        if !LOG_FORMATS.contains(&self.logging.format.to_lowercase().as_str()) {
            errors.push(format!(
                "logging.format '{}' must be one of: {}",
                self.logging.format,
                LOG_FORMATS.join(", ")
            ));
        }

        if errors.is_empty() {
            Ok(())
        } else {
            Err(ConfigError::Invalid(errors))
        }
    }

    /// `host:port` for binding the listener.
    pub fn bind_address(&self) -> String {
        format!("{}:{}", self.server.host, self.server.port)
    }
}

/// Loads a `.env` file into the process environment without overriding
/// variables that are already set.
///
/// With no `path`, `.env` is searched for from the working directory
/// upwards. Returns the file that was loaded, if any.
pub fn load_env_file(path: Option<&Path>) -> Option<PathBuf> {
    match path {
        Some(path) => dotenvy::from_path(path).ok().map(|_| path.to_path_buf()),
        None => dotenvy::dotenv().ok(),
    }
}

fn is_in_memory_sqlite(url: &str) -> bool {
    url.strip_prefix("sqlite://").unwrap_or(url) == ":memory:"
}
