// Application settings
// Loaded from ~/.config/symdex/settings.json

use serde::{Deserialize, Serialize};
use std::fs;
use std::path::PathBuf;

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct Settings {
    // Store
    /// Default knowledge store used when a command gives no path
    #[serde(rename = "store.path")]
    pub store_path: Option<PathBuf>,

    // Matcher
    #[serde(rename = "matcher.topCandidates")]
    pub top_candidates: usize,

    #[serde(rename = "matcher.groupBoost")]
    pub group_boost: f64,

    #[serde(rename = "matcher.suggestionLimit")]
    pub suggestion_limit: usize,

    // Diagnosis rendering
    /// Candidates at or above this confidence are shown as "likely"
    #[serde(rename = "diagnosis.likelyThreshold")]
    pub likely_threshold: f64,
}

impl Default for Settings {
    fn default() -> Self {
        Self {
            store_path: None,
            top_candidates: 5,
            group_boost: 0.25,
            suggestion_limit: 10,
            likely_threshold: 0.5,
        }
    }
}

impl Settings {
    /// Load settings, falling back to defaults if the file is missing
    /// or unreadable. A broken settings file never blocks a query.
    pub fn load() -> Self {
        Self::load_from(settings_path())
    }

    fn load_from(path: Option<PathBuf>) -> Self {
        let Some(path) = path else { return Self::default() };
        match fs::read_to_string(&path) {
            Ok(content) => serde_json::from_str(&content).unwrap_or_default(),
            Err(_) => Self::default(),
        }
    }

    /// Persist settings as pretty JSON, creating the config directory.
    pub fn save(&self) -> Result<(), String> {
        let path = settings_path().ok_or("no config directory on this platform")?;
        if let Some(parent) = path.parent() {
            fs::create_dir_all(parent).map_err(|e| e.to_string())?;
        }
        let content = serde_json::to_string_pretty(self).map_err(|e| e.to_string())?;
        fs::write(&path, content).map_err(|e| e.to_string())
    }
}

/// ~/.config/symdex/settings.json (platform equivalent)
pub fn settings_path() -> Option<PathBuf> {
    dirs::config_dir().map(|dir| dir.join("symdex").join("settings.json"))
}
