use crate::constants::AUTOSAVE_DELAY;
use anyhow::Context;
use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};
use std::time::Duration;

pub const DEFAULT_SAVE_PATH: &str = "pocket-tamer-save.json";

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default, rename_all = "camelCase")]
pub struct GameConfig {
    pub save_path: PathBuf,
    pub autosave_delay_ms: u64,
    /// Fixed RNG seed for reproducible sessions; entropy when absent.
    pub seed: Option<u64>,
}

impl Default for GameConfig {
    fn default() -> Self {
        Self {
            save_path: PathBuf::from(DEFAULT_SAVE_PATH),
            autosave_delay_ms: AUTOSAVE_DELAY.as_millis() as u64,
            seed: None,
        }
    }
}

impl GameConfig {
    pub fn autosave_delay(&self) -> Duration {
        Duration::from_millis(self.autosave_delay_ms)
    }
}

pub fn load_config(path: &Path) -> anyhow::Result<GameConfig> {
    let raw = std::fs::read_to_string(path)
        .with_context(|| format!("Failed to read config file at {}", path.display()))?;
    let config: GameConfig = serde_json::from_str(&raw)
        .with_context(|| format!("Failed to parse JSON from {}", path.display()))?;
    if config.autosave_delay_ms == 0 {
        anyhow::bail!("autosaveDelayMs must be > 0 in {}", path.display());
    }
    Ok(config)
}
