//! Key bindings and engine configuration.
//!
//! Bindings are grouped by concern (navigation, form, table), loaded from a
//! TOML config file with full defaulting, and dispatched through
//! [`KeyResolver`] so components never match on raw key codes themselves.

pub mod actions;
pub mod bindings;
pub mod key;
pub mod loader;
pub mod resolver;

pub use actions::{FormAction, NavAction, TableAction};
use bindings::KeymapConfig;
pub use key::{Key, KeyBinding};
pub use loader::load;
pub use resolver::KeyResolver;
use serde::{Deserialize, Serialize};

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ThemeConfig {
    pub name: String,
}

impl Default for ThemeConfig {
    fn default() -> Self {
        Self {
            name: "Catppuccin Mocha".to_string(),
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize, Default)]
pub struct EngineConfig {
    #[serde(default)]
    pub theme: ThemeConfig,
    #[serde(default)]
    pub keymap: KeymapConfig,
}
