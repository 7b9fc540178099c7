//! Field settings loaded from TOML.
//!
//! ```toml
//! [field]
//! log_reports = true
//!
//! [[signal]]
//! id = 0
//! delta = 25.0
//! epsilon = 1e-3
//!
//! [[signal]]
//! id = 3
//! delta = 4.0
//! ```

use cellfield_core::error::FieldError;
use cellfield_core::types::SignalId;
use cellfield_fgt::config::{DiffusionConfig, DiffusiveSignal};
use serde::{Deserialize, Serialize};
use std::path::Path;
use thiserror::Error;

/// Errors raised while reading or writing settings.
#[derive(Error, Debug)]
pub enum SettingsError {
    #[error("Failed to read settings {path}: {source}")]
    Read {
        path: String,
        #[source]
        source: std::io::Error,
    },

    #[error("Failed to write settings {path}: {source}")]
    Write {
        path: String,
        #[source]
        source: std::io::Error,
    },

    #[error("Failed to parse settings: {0}")]
    Parse(#[from] toml::de::Error),

    #[error("Failed to serialize settings: {0}")]
    Serialize(#[from] toml::ser::Error),

    #[error("Invalid settings: {0}")]
    Invalid(#[from] FieldError),
}

pub type SettingsResult<T> = Result<T, SettingsError>;

/// Top-level settings file.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct FieldSettings {
    #[serde(default)]
    pub field: StepSettings,
    #[serde(default, rename = "signal")]
    pub signals: Vec<SignalSettings>,
}

/// How each simulation step runs the field computation.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct StepSettings {
    /// Emit each transform report at `info` level.
    #[serde(default = "default_log_reports")]
    pub log_reports: bool,
    /// Clear previously received fields before each step.
    #[serde(default = "default_reset_fields")]
    pub reset_fields: bool,
}

/// One `[[signal]]` table.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct SignalSettings {
    pub id: u16,
    #[serde(default = "default_delta")]
    pub delta: f64,
    #[serde(default = "default_epsilon")]
    pub epsilon: f64,
}

fn default_log_reports() -> bool { true }
fn default_reset_fields() -> bool { true }
fn default_delta() -> f64 { 1.0 }
fn default_epsilon() -> f64 { 1e-3 }

impl Default for StepSettings {
    fn default() -> Self {
        Self {
            log_reports: default_log_reports(),
            reset_fields: default_reset_fields(),
        }
    }
}

impl Default for FieldSettings {
    fn default() -> Self {
        Self {
            field: StepSettings::default(),
            signals: Vec::new(),
        }
    }
}

impl SignalSettings {
    pub fn new(id: u16, delta: f64, epsilon: f64) -> Self {
        Self { id, delta, epsilon }
    }
}

impl FieldSettings {
    /// Parse settings from a TOML string.
    pub fn from_toml_str(content: &str) -> SettingsResult<Self> {
        Ok(toml::from_str(content)?)
    }

    /// Load settings from a file.
    pub fn load(path: &Path) -> SettingsResult<Self> {
        let content = std::fs::read_to_string(path).map_err(|source| SettingsError::Read {
            path: path.display().to_string(),
            source,
        })?;
        Self::from_toml_str(&content)
    }

    /// Save settings to a file, creating parent directories.
    pub fn save(&self, path: &Path) -> SettingsResult<()> {
        let content = self.to_toml()?;
        let write_err = |source| SettingsError::Write {
            path: path.display().to_string(),
            source,
        };
        if let Some(parent) = path.parent() {
            std::fs::create_dir_all(parent).map_err(write_err)?;
        }
        std::fs::write(path, content).map_err(write_err)
    }

    pub fn to_toml(&self) -> SettingsResult<String> {
        Ok(toml::to_string_pretty(self)?)
    }

    /// The diffusion configuration these settings describe.
    pub fn diffusion_config(&self) -> SettingsResult<DiffusionConfig> {
        let entries = self
            .signals
            .iter()
            .map(|s| DiffusiveSignal::new(SignalId(s.id), s.delta, s.epsilon))
            .collect();
        Ok(DiffusionConfig::from_entries(entries)?)
    }

    /// Settings describing an existing configuration.
    pub fn from_config(config: &DiffusionConfig) -> Self {
        Self {
            field: StepSettings::default(),
            signals: config
                .entries()
                .iter()
                .map(|e| SignalSettings::new(e.signal.as_u16(), e.delta, e.epsilon))
                .collect(),
        }
    }
}
