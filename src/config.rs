//! Settings: `despensa.toml` in the working directory, overridable with
//! `DESPENSA_*` environment variables. Everything has a default so the tool
//! works with no config file at all.

use serde::Deserialize;
use std::path::Path;

use crate::error::{Error, Result};

pub const CONFIG_FILE: &str = "despensa.toml";
pub const DEFAULT_DATABASE_FILE: &str = "database.db";
pub const DEFAULT_LOGGING_LEVEL: &str = "info";

#[derive(Debug, Clone, Deserialize, PartialEq)]
#[serde(default)]
pub struct Settings {
    /// SQLite database path. Ignored when `in_memory` is set.
    pub database_file: String,

    /// Keep the catalog in memory — nothing persists past the process.
    pub in_memory: bool,

    /// Log filter passed to the tracing subscriber ("info", "despensa=debug", ...).
    pub logging_level: String,
}

impl Default for Settings {
    fn default() -> Self {
        Self {
            database_file: DEFAULT_DATABASE_FILE.to_string(),
            in_memory: false,
            logging_level: DEFAULT_LOGGING_LEVEL.to_string(),
        }
    }
}

impl Settings {
    /// Load from `despensa.toml` if present, then apply environment overrides.
    pub fn load() -> Result<Self> {
        let mut settings = Self::from_file(Path::new(CONFIG_FILE))?;
        settings.apply_env_overrides();
        Ok(settings)
    }

    pub fn from_file(path: &Path) -> Result<Self> {
        if !path.exists() {
            return Ok(Self::default());
        }
        let content = std::fs::read_to_string(path)?;
        toml::from_str(&content)
            .map_err(|e| Error::parsing(format!("invalid config file {}: {e}", path.display())))
    }

    fn apply_env_overrides(&mut self) {
        if let Ok(v) = std::env::var("DESPENSA_DATABASE_FILE") {
            self.database_file = v;
        }
        if let Ok(v) = std::env::var("DESPENSA_IN_MEMORY") {
            self.in_memory = matches!(v.as_str(), "1" | "true" | "yes");
        }
        if let Ok(v) = std::env::var("DESPENSA_LOGGING_LEVEL") {
            self.logging_level = v;
        }
    }
}
