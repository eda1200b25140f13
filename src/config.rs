//! TOML-based configuration.
//!
//! Supports a config file (prism.toml) with environment variable expansion.
//! Every knob has a default, so the library works without any file.
//!
//! Example configuration:
//! ```toml
//! [analyze]
//! sample_size = 500
//! categorical_max_distinct = 12
//!
//! [suggest]
//! pie_max_slices = 8
//!
//! [engine]
//! default_limit = 1000
//! ```

use serde::{Deserialize, Serialize};
use std::env;
use std::fs;
use std::path::{Path, PathBuf};

/// Error type for settings.
#[derive(Debug, thiserror::Error)]
pub enum SettingsError {
    #[error("Config file not found: {0}")]
    FileNotFound(PathBuf),

    #[error("Failed to read config file: {0}")]
    ReadError(#[from] std::io::Error),

    #[error("Failed to parse config file: {0}")]
    ParseError(#[from] toml::de::Error),

    #[error("Missing environment variable: {0}")]
    MissingEnvVar(String),
}

/// Column analysis knobs.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct AnalyzeSettings {
    /// Values sampled per column.
    pub sample_size: usize,
    /// A column with at most this many distinct values reads as categorical.
    pub categorical_max_distinct: usize,
    /// Unique ratio at or above which a string column reads as an identifier.
    pub identifier_unique_ratio: f64,
    /// Identifier detection only applies to short tokens (mean length cap).
    pub identifier_max_token_len: usize,
}

impl Default for AnalyzeSettings {
    fn default() -> Self {
        Self {
            sample_size: 1000,
            categorical_max_distinct: 20,
            identifier_unique_ratio: 0.95,
            identifier_max_token_len: 36,
        }
    }
}

/// Chart suggestion knobs.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct SuggestSettings {
    /// Pie charts beyond this many slices are unreadable.
    pub pie_max_slices: usize,
    /// Scatter plots need at least this many rows to say anything.
    pub scatter_min_rows: usize,
}

impl Default for SuggestSettings {
    fn default() -> Self {
        Self {
            pie_max_slices: 10,
            scatter_min_rows: 10,
        }
    }
}

/// Execution defaults.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct EngineSettings {
    /// Row cap applied when an insight declares no limit.
    pub default_limit: u64,
}

impl Default for EngineSettings {
    fn default() -> Self {
        Self {
            default_limit: 10_000,
        }
    }
}

/// Top-level settings.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct Settings {
    pub analyze: AnalyzeSettings,
    pub suggest: SuggestSettings,
    pub engine: EngineSettings,
}

impl Settings {
    /// Load settings from a TOML file, expanding `${VAR}` references.
    pub fn load(path: &Path) -> Result<Self, SettingsError> {
        if !path.exists() {
            return Err(SettingsError::FileNotFound(path.to_path_buf()));
        }
        let raw = fs::read_to_string(path)?;
        let expanded = expand_env_vars(&raw)?;
        Ok(toml::from_str(&expanded)?)
    }

    /// Load from `prism.toml` in the working directory, or defaults when
    /// the file does not exist.
    pub fn load_or_default() -> Self {
        let path = Path::new("prism.toml");
        if path.exists() {
            Self::load(path).unwrap_or_default()
        } else {
            Self::default()
        }
    }
}

/// Replace `${VAR}` references with environment variable values.
fn expand_env_vars(input: &str) -> Result<String, SettingsError> {
    let mut output = String::with_capacity(input.len());
    let mut rest = input;

    while let Some(start) = rest.find("${") {
        output.push_str(&rest[..start]);
        let after = &rest[start + 2..];
        match after.find('}') {
            Some(end) => {
                let var = &after[..end];
                match env::var(var) {
                    Ok(value) => output.push_str(&value),
                    Err(_) => return Err(SettingsError::MissingEnvVar(var.to_string())),
                }
                rest = &after[end + 1..];
            }
            None => {
                // Unterminated reference; keep the literal text
                output.push_str(&rest[start..]);
                rest = "";
            }
        }
    }
    output.push_str(rest);
    Ok(output)
}
