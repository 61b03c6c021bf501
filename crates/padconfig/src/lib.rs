//! Playground configuration: pane grid geometry and run-time behaviour.
//!
//! Loaded from a TOML file when one exists; every field has a default so an
//! empty file (or none at all) yields a working eight-pane playground.

use serde::{Deserialize, Serialize};

#[derive(Debug, thiserror::Error)]
pub enum ConfigError {
    #[error("failed to parse configuration: {0}")]
    Parse(#[from] toml::de::Error),
    #[error("invalid configuration: {0}")]
    Invalid(String),
}

#[derive(Debug, Clone, PartialEq, Deserialize, Serialize)]
pub struct PadConfig {
    /// Number of panes in the playground.
    #[serde(default = "default_panes")]
    pub panes: usize,
    /// Panes per row before the grid wraps.
    #[serde(default = "default_panes_per_row")]
    pub panes_per_row: usize,
    /// Logical pane width in density-independent pixels.
    #[serde(default = "default_pane_width")]
    pub pane_width: f64,
    /// Logical pane height in density-independent pixels.
    #[serde(default = "default_pane_height")]
    pub pane_height: f64,
    /// Uniform gap between panes and around the grid.
    #[serde(default = "default_gap")]
    pub gap: f64,
    /// Optional FPS cap; absent or non-positive means render every refresh.
    #[serde(default)]
    pub fps: Option<f32>,
    /// Freeze real-time advancement; frames advance only on the step key,
    /// with a synthetic fixed-increment clock.
    #[serde(default)]
    pub manual_step: bool,
}

fn default_panes() -> usize {
    8
}

fn default_panes_per_row() -> usize {
    4
}

fn default_pane_width() -> f64 {
    700.0
}

fn default_pane_height() -> f64 {
    350.0
}

fn default_gap() -> f64 {
    12.0
}

impl Default for PadConfig {
    fn default() -> Self {
        Self {
            panes: default_panes(),
            panes_per_row: default_panes_per_row(),
            pane_width: default_pane_width(),
            pane_height: default_pane_height(),
            gap: default_gap(),
            fps: None,
            manual_step: false,
        }
    }
}

impl PadConfig {
    pub fn from_toml_str(raw: &str) -> Result<Self, ConfigError> {
        let config: PadConfig = toml::from_str(raw)?;
        config.validate()?;
        Ok(config)
    }

    pub fn validate(&self) -> Result<(), ConfigError> {
        if self.panes == 0 {
            return Err(ConfigError::Invalid("panes must be at least 1".into()));
        }
        if self.panes_per_row == 0 {
            return Err(ConfigError::Invalid(
                "panes_per_row must be at least 1".into(),
            ));
        }
        if !(self.pane_width > 0.0 && self.pane_height > 0.0) {
            return Err(ConfigError::Invalid(
                "pane dimensions must be positive".into(),
            ));
        }
        if self.gap < 0.0 {
            return Err(ConfigError::Invalid("gap must not be negative".into()));
        }
        Ok(())
    }

    /// Effective FPS cap: non-positive values map to uncapped.
    pub fn effective_fps(&self) -> Option<f32> {
        self.fps.and_then(|fps| if fps > 0.0 { Some(fps) } else { None })
    }
}
