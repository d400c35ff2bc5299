use crate::mouse_gestures::engine::{
    GestureEngineConfig, DEFAULT_MAX_SAMPLES, DEFAULT_WIGGLE_RADIUS_PX,
};
use crate::mouse_gestures::session::MIN_SAMPLES;
use anyhow::Context;
use serde::{Deserialize, Serialize};
use std::io::ErrorKind;
use std::path::PathBuf;

#[derive(Debug, Serialize, Deserialize, Clone, PartialEq)]
pub struct Settings {
    /// When enabled the logger is initialised at debug level and honours
    /// `RUST_LOG`. Defaults to `false` when the field is missing.
    #[serde(default)]
    pub debug_logging: bool,
    /// Optional file that receives a copy of every log line.
    #[serde(default)]
    pub log_file: Option<PathBuf>,
    /// Pointer travel in pixels before movement counts as a direction.
    #[serde(default = "default_wiggle_radius_px")]
    pub wiggle_radius_px: u32,
    /// Maximum number of raw samples buffered per movement segment.
    #[serde(default = "default_max_samples")]
    pub max_samples: usize,
}

impl Default for Settings {
    fn default() -> Self {
        Self {
            debug_logging: false,
            log_file: None,
            wiggle_radius_px: default_wiggle_radius_px(),
            max_samples: default_max_samples(),
        }
    }
}

fn default_wiggle_radius_px() -> u32 {
    DEFAULT_WIGGLE_RADIUS_PX
}

fn default_max_samples() -> usize {
    DEFAULT_MAX_SAMPLES
}

impl Settings {
    pub fn load(path: &str) -> anyhow::Result<Self> {
        let content = match std::fs::read_to_string(path) {
            Ok(content) => content,
            Err(err) if err.kind() == ErrorKind::NotFound => String::new(),
            Err(err) => {
                return Err(err).with_context(|| format!("failed to read settings from {path}"))
            }
        };
        if content.trim().is_empty() {
            return Ok(Self::default());
        }
        Ok(serde_json::from_str(&content)?)
    }

    pub fn save(&self, path: &str) -> anyhow::Result<()> {
        let json = serde_json::to_string_pretty(self)?;
        std::fs::write(path, json)?;
        Ok(())
    }

    pub fn engine_config(&self) -> GestureEngineConfig {
        if self.wiggle_radius_px == 0 {
            tracing::warn!("wiggle_radius_px is 0; every pixel of travel will be classified");
        }
        let max_samples = if self.max_samples < MIN_SAMPLES {
            tracing::warn!(
                "max_samples {} is too small; using {}",
                self.max_samples,
                MIN_SAMPLES
            );
            MIN_SAMPLES
        } else {
            self.max_samples
        };
        GestureEngineConfig {
            max_samples,
            ..GestureEngineConfig::with_wiggle_radius(self.wiggle_radius_px)
        }
    }
}
