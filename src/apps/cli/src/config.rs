//! CLI-side persisted settings.
//!
//! The stored API key and base url live here, outside the core: the
//! library only ever sees the in-memory credential it is handed.

use serde::{Deserialize, Serialize};
use std::path::PathBuf;

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct CliConfig {
    pub api_key: Option<String>,
    pub base_url: Option<String>,
}

impl CliConfig {
    fn path() -> Option<PathBuf> {
        dirs::config_dir().map(|dir| dir.join("stockpilot").join("config.toml"))
    }

    /// Load the stored settings, falling back to defaults when the file
    /// is absent or unreadable.
    pub fn load() -> Self {
        let Some(path) = Self::path() else {
            return Self::default();
        };
        let Ok(raw) = std::fs::read_to_string(&path) else {
            return Self::default();
        };
        match toml::from_str(&raw) {
            Ok(config) => config,
            Err(e) => {
                tracing::warn!("ignoring unreadable config at {}: {e}", path.display());
                Self::default()
            }
        }
    }

    /// Best-effort persist; the in-memory value stays authoritative for
    /// this session either way.
    pub fn save(&self) -> anyhow::Result<()> {
        let Some(path) = Self::path() else {
            anyhow::bail!("no config directory available");
        };
        if let Some(parent) = path.parent() {
            std::fs::create_dir_all(parent)?;
        }
        std::fs::write(&path, toml::to_string_pretty(self)?)?;
        Ok(())
    }
}
