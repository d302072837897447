/// Viewer configuration loaded from TOML
use std::path::Path;

use anyhow::Context;
use bodyfit_core::RigConfig;
use serde::{Deserialize, Serialize};

/// Terminal viewer settings; every field may be omitted
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct ViewerConfig {
    pub rig: RigConfig,
    /// Playback speed multiplier
    pub speed: f64,
    /// Longest wall-clock step fed to playback in one tick
    pub max_tick_sec: f64,
    pub target_fps: u32,
    pub autoplay: bool,
}

impl Default for ViewerConfig {
    fn default() -> Self {
        Self {
            rig: RigConfig::default(),
            speed: 1.0,
            max_tick_sec: 0.05,
            target_fps: 30,
            autoplay: true,
        }
    }
}

impl ViewerConfig {
    pub fn from_toml(text: &str) -> anyhow::Result<Self> {
        toml::from_str(text).context("invalid viewer config")
    }

    /// Load from `path`, or the defaults when no path is given
    pub fn load(path: Option<&Path>) -> anyhow::Result<Self> {
        let Some(path) = path else {
            return Ok(Self::default());
        };
        let text = std::fs::read_to_string(path)
            .with_context(|| format!("failed to read config {}", path.display()))?;
        Self::from_toml(&text).with_context(|| format!("in {}", path.display()))
    }
}
