//! Generator settings persistence.
//!
//! Settings live in `<config dir>/algoviz/stepgen.json`. A missing or broken
//! file never stops generation: the defaults are used and the problem is
//! logged. Command-line flags are applied on top by the binary.

use crate::layout::CycleLayering;
use anyhow::{Context, Result};
use serde::{Deserialize, Serialize};
use std::fs;
use std::path::{Path, PathBuf};

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct StepgenConfig {
    /// Drop default-valued fields from every frame.
    pub compact: bool,
    /// Brotli-compress the output when no explicit path is given.
    pub brotli: bool,
    pub output: Option<PathBuf>,
    pub palette: String,
    pub cycle_layering: CycleLayering,
}

impl Default for StepgenConfig {
    fn default() -> Self {
        StepgenConfig {
            compact: true,
            brotli: false,
            output: None,
            palette: "Mocha".to_string(),
            cycle_layering: CycleLayering::PerNode,
        }
    }
}

impl StepgenConfig {
    /// Default location of the settings file, if the platform has a config dir.
    pub fn default_path() -> Option<PathBuf> {
        dirs::config_dir().map(|dir| dir.join("algoviz").join("stepgen.json"))
    }

    /// Loads settings from the default location, falling back to defaults.
    pub fn load() -> Self {
        match Self::default_path() {
            Some(path) => Self::load_or_default(&path),
            None => {
                tracing::debug!("no config directory on this platform, using defaults");
                Self::default()
            }
        }
    }

    /// Loads settings from `path`. A missing file yields the defaults
    /// silently; an unreadable or malformed one yields them with a warning.
    pub fn load_or_default(path: &Path) -> Self {
        if !path.exists() {
            return Self::default();
        }
        match Self::load_from(path) {
            Ok(config) => {
                tracing::info!(path = %path.display(), "loaded settings");
                config
            }
            Err(e) => {
                tracing::warn!(path = %path.display(), error = %format!("{:#}", e), "ignoring settings file");
                Self::default()
            }
        }
    }

    pub fn load_from(path: &Path) -> Result<Self> {
        let text = fs::read_to_string(path)
            .with_context(|| format!("Failed to read settings: {}", path.display()))?;
        serde_json::from_str(&text).with_context(|| format!("Failed to parse settings: {}", path.display()))
    }

    pub fn save_to(&self, path: &Path) -> Result<()> {
        if let Some(parent) = path.parent() {
            fs::create_dir_all(parent)
                .with_context(|| format!("Failed to create directory: {}", parent.display()))?;
        }
        let json = serde_json::to_string_pretty(self).context("Failed to serialize settings")?;
        fs::write(path, json).with_context(|| format!("Failed to write settings: {}", path.display()))
    }

    /// Output path: the explicit one, else `steps.jsonl` (or `.br`).
    pub fn output_path(&self) -> PathBuf {
        match &self.output {
            Some(path) => path.clone(),
            None if self.brotli => PathBuf::from("steps.jsonl.br"),
            None => PathBuf::from("steps.jsonl"),
        }
    }
}
