//! Planner settings loading from config.toml
//!
//! Every field is optional in the file; anything missing falls back to the
//! defaults below. The file itself is optional too: a planner started without
//! one runs on defaults.

use crate::errors::{Error, Result};
use serde::Deserialize;
use std::path::Path;
use tracing::{debug, info};

/// Environment variable naming the settings file
pub const CONFIG_PATH_VAR: &str = "MEAL_PLANNER_CONFIG";

/// Configuration structure representing the entire config.toml file
#[derive(Debug, Clone, Default, Deserialize, PartialEq)]
#[serde(default)]
pub struct Settings {
    /// Database URL; `DATABASE_URL` takes precedence
    pub database_url: Option<String>,
    /// Tracing filter directive used when `RUST_LOG` is unset
    pub log_filter: Option<String>,
    /// Defaults for ingredients created by a restock
    pub inventory: InventoryDefaults,
}

/// Values used when stock is credited to an ingredient id the store has never
/// seen (a manual shopping item, or a recipe line naming an unknown ingredient).
#[derive(Debug, Clone, Deserialize, PartialEq)]
#[serde(default)]
pub struct InventoryDefaults {
    /// Name when the request carries none
    pub name: String,
    /// Unit when the request carries none
    pub unit: String,
    /// Pantry category for the new record
    pub category: String,
    /// Price when the request carries none
    pub price_per_unit: f64,
}

impl Default for InventoryDefaults {
    fn default() -> Self {
        Self {
            name: "Nuevo producto".to_string(),
            unit: "unidades".to_string(),
            category: "otros".to_string(),
            price_per_unit: 0.0,
        }
    }
}

/// Loads settings from a TOML file
///
/// # Errors
/// Returns an error if:
/// - The file cannot be read
/// - The TOML syntax is invalid
pub fn load_settings<P: AsRef<Path>>(path: P) -> Result<Settings> {
    let path = path.as_ref();
    debug!("Loading settings from {}", path.display());
    let contents = std::fs::read_to_string(path).map_err(|e| Error::Config {
        message: format!("Failed to read config file {}: {e}", path.display()),
    })?;

    parse_settings(&contents)
}

/// Parses settings from TOML text.
pub fn parse_settings(contents: &str) -> Result<Settings> {
    toml::from_str(contents).map_err(|e| Error::Config {
        message: format!("Failed to parse config.toml: {e}"),
    })
}

/// Loads settings from `$MEAL_PLANNER_CONFIG`, or `./config.toml`.
/// A missing file yields [`Settings::default`]; a malformed one is an error.
pub fn load_default_settings() -> Result<Settings> {
    let path = std::env::var(CONFIG_PATH_VAR).unwrap_or_else(|_| "config.toml".to_string());
    if Path::new(&path).exists() {
        load_settings(&path)
    } else {
        info!("No settings file at {path}, using defaults");
        Ok(Settings::default())
    }
}
