use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};

use crate::pagination::{DEFAULT_PAGE_SIZE, MAX_PAGE_SIZE};

pub const DEFAULT_BIND: &str = "127.0.0.1:8000";
pub const DEFAULT_DATA_FILE: &str = "sprintboard.json";

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct AppConfig {
    #[serde(default)]
    pub bind: Option<String>,
    /// Base used when building hyperlinks, e.g. `https://board.example.com`.
    #[serde(default)]
    pub public_url: Option<String>,
    #[serde(default)]
    pub data_file: Option<PathBuf>,
    #[serde(default)]
    pub default_page_size: Option<usize>,
    #[serde(default)]
    pub max_page_size: Option<usize>,
}

impl AppConfig {
    pub fn config_path() -> Option<PathBuf> {
        #[cfg(target_os = "macos")]
        {
            dirs::home_dir().map(|home| home.join(".config/sprintboard/config.toml"))
        }
        #[cfg(target_os = "linux")]
        {
            dirs::config_dir().map(|config| config.join("sprintboard/config.toml"))
        }
        #[cfg(target_os = "windows")]
        {
            dirs::config_dir().map(|config| config.join("sprintboard\\config.toml"))
        }
        #[cfg(not(any(target_os = "macos", target_os = "linux", target_os = "windows")))]
        {
            None
        }
    }

    /// Load from the platform config path, falling back to defaults when the
    /// file is missing or unreadable.
    pub fn load() -> Self {
        Self::config_path()
            .and_then(|path| Self::load_from(&path))
            .unwrap_or_default()
    }

    pub fn load_from(path: &Path) -> Option<Self> {
        if !path.exists() {
            return None;
        }
        let content = std::fs::read_to_string(path).ok()?;
        toml::from_str(&content).ok()
    }

    pub fn effective_bind(&self) -> &str {
        self.bind.as_deref().unwrap_or(DEFAULT_BIND)
    }

    pub fn effective_data_file(&self) -> PathBuf {
        self.data_file
            .clone()
            .unwrap_or_else(|| PathBuf::from(DEFAULT_DATA_FILE))
    }

    pub fn effective_max_page_size(&self) -> usize {
        self.max_page_size.unwrap_or(MAX_PAGE_SIZE).max(1)
    }

    pub fn effective_default_page_size(&self) -> usize {
        self.default_page_size
            .unwrap_or(DEFAULT_PAGE_SIZE)
            .clamp(1, self.effective_max_page_size())
    }
}
