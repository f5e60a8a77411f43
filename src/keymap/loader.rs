use std::fs;
use std::path::PathBuf;

use crate::keymap::EngineConfig;

const CONFIG_DIR: &str = "deskgrid";
const CONFIG_FILE: &str = "config.toml";

pub fn config_dir() -> Option<PathBuf> {
    dirs::config_dir().map(|p| p.join(CONFIG_DIR))
}

pub fn config_path() -> Option<PathBuf> {
    config_dir().map(|p| p.join(CONFIG_FILE))
}

pub fn load() -> color_eyre::Result<EngineConfig> {
    let path = match config_path() {
        Some(p) => p,
        None => {
            tracing::debug!("No config directory found, using defaults");
            return Ok(EngineConfig::default());
        }
    };

    if !path.exists() {
        tracing::debug!("Config file not found at {:?}, using defaults", path);
        return Ok(EngineConfig::default());
    }

    let content = fs::read_to_string(&path)?;
    let config: EngineConfig = toml::from_str(&content)?;
    tracing::debug!("Loaded config from {:?}", path);
    Ok(config)
}
