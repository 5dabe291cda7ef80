use std::path::PathBuf;

use serde::{Deserialize, Serialize};

use crate::error::{Result, WonbookError};

/// Deployment configuration. `profile` selects a per-profile database file
/// under `data_dir`; with no profile everything lives in `wonbook.db`.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Settings {
    pub data_dir: String,
    #[serde(default)]
    pub profile: Option<String>,
}

impl Default for Settings {
    fn default() -> Self {
        Self {
            data_dir: default_data_dir().to_string_lossy().to_string(),
            profile: None,
        }
    }
}

impl Settings {
    /// Database file for the active profile. Store operations always take a
    /// connection opened from this path; there is no process-global path.
    pub fn db_path(&self) -> PathBuf {
        let file = match &self.profile {
            Some(profile) => format!("wonbook-{profile}.db"),
            None => "wonbook.db".to_string(),
        };
        PathBuf::from(&self.data_dir).join(file)
    }
}

fn config_dir() -> PathBuf {
    dirs::home_dir()
        .unwrap_or_else(|| PathBuf::from("."))
        .join(".config")
        .join("wonbook")
}

fn settings_path() -> PathBuf {
    config_dir().join("settings.json")
}

fn default_data_dir() -> PathBuf {
    dirs::home_dir()
        .unwrap_or_else(|| PathBuf::from("."))
        .join("Documents")
        .join("wonbook")
}

pub fn load_settings() -> Settings {
    let path = settings_path();
    if path.exists() {
        let content = std::fs::read_to_string(&path).unwrap_or_default();
        serde_json::from_str(&content).unwrap_or_default()
    } else {
        Settings::default()
    }
}

pub fn save_settings(settings: &Settings) -> Result<()> {
    let dir = config_dir();
    std::fs::create_dir_all(&dir)?;
    let json = serde_json::to_string_pretty(settings)
        .map_err(|e| WonbookError::Settings(e.to_string()))?;
    std::fs::write(settings_path(), format!("{json}\n"))?;
    Ok(())
}

pub fn db_path() -> PathBuf {
    load_settings().db_path()
}
