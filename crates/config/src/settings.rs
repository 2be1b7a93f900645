// Per-user settings
// Loaded from ~/.config/vaxtrack/settings.json

use serde::{Deserialize, Serialize};
use std::fs;
use std::path::{Path, PathBuf};

/// Default output for commands that support both.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum OutputFormat {
    #[default]
    Text,
    Json,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct Settings {
    /// Calendar TOML used when `--calendar` is not given. None = built-in.
    #[serde(rename = "calendar.path")]
    pub calendar_path: Option<String>,

    // Mark done
    #[serde(rename = "markDone.defaultClinic")]
    pub default_clinic: Option<String>,

    #[serde(rename = "markDone.defaultProfessional")]
    pub default_professional: Option<String>,

    // Schedule
    #[serde(rename = "schedule.failOnOverdue")]
    pub fail_on_overdue: bool,

    // Output
    #[serde(rename = "output.format")]
    pub output_format: OutputFormat,
}

impl Default for Settings {
    fn default() -> Self {
        Self {
            calendar_path: None,
            default_clinic: None,
            default_professional: None,
            fail_on_overdue: false,
            output_format: OutputFormat::Text,
        }
    }
}

const DEFAULT_FILE: &str = r#"{
    // Calendar TOML file; null = built-in Moroccan PNI calendar
    "calendar.path": null,

    // Pre-filled values for `vaxtrack mark-done`
    "markDone.defaultClinic": null,
    "markDone.defaultProfessional": null,

    // Exit with code 3 from `vaxtrack schedule` when doses are overdue
    "schedule.failOnOverdue": false,

    // "text" or "json"
    "output.format": "text"
}
"#;

impl Settings {
    /// Get the settings file path
    pub fn config_path() -> PathBuf {
        let config_dir = dirs::config_dir()
            .unwrap_or_else(|| PathBuf::from("."))
            .join("vaxtrack");
        config_dir.join("settings.json")
    }

    /// Parse settings text. Lines starting with `//` are comments.
    pub fn parse(contents: &str) -> Result<Self, String> {
        let cleaned: String = contents
            .lines()
            .filter(|line| !line.trim().starts_with("//"))
            .collect::<Vec<_>>()
            .join("\n");
        serde_json::from_str(&cleaned).map_err(|e| e.to_string())
    }

    /// Load settings from disk, falling back to defaults
    pub fn load() -> Self {
        let path = Self::config_path();

        if !path.exists() {
            let settings = Self::default();
            settings.create_default_file(&path);
            return settings;
        }

        Self::load_from(&path)
    }

    /// Load from an explicit path. Never fails: unreadable or malformed
    /// files log a warning and yield defaults.
    pub fn load_from(path: &Path) -> Self {
        match fs::read_to_string(path) {
            Ok(contents) => match Self::parse(&contents) {
                Ok(settings) => settings,
                Err(e) => {
                    log::warn!("error parsing {}: {e}; using default settings", path.display());
                    Self::default()
                }
            },
            Err(e) => {
                log::warn!("error reading {}: {e}; using default settings", path.display());
                Self::default()
            }
        }
    }

    /// Save current settings to disk
    pub fn save(&self) -> Result<(), String> {
        self.save_to(&Self::config_path())
    }

    pub fn save_to(&self, path: &Path) -> Result<(), String> {
        // Ensure directory exists
        if let Some(parent) = path.parent() {
            fs::create_dir_all(parent).map_err(|e| e.to_string())?;
        }

        let json = serde_json::to_string_pretty(self).map_err(|e| e.to_string())?;

        fs::write(path, json).map_err(|e| e.to_string())
    }

    /// Create default settings file with comments
    fn create_default_file(&self, path: &Path) {
        if let Some(parent) = path.parent() {
            if let Err(e) = fs::create_dir_all(parent) {
                log::warn!("error creating config directory: {e}");
                return;
            }
        }

        if let Err(e) = fs::write(path, DEFAULT_FILE) {
            log::warn!("error writing default settings.json: {e}");
        }
    }

    /// Calendar path with a leading `~/` expanded.
    pub fn resolved_calendar_path(&self) -> Option<PathBuf> {
        let raw = self.calendar_path.as_deref()?.trim();
        if raw.is_empty() {
            return None;
        }
        match raw.strip_prefix("~/") {
            Some(rest) => dirs::home_dir().map(|home| home.join(rest)),
            None => Some(PathBuf::from(raw)),
        }
    }

    /// Get the config file path for display/opening
    pub fn config_path_display() -> String {
        Self::config_path().to_string_lossy().to_string()
    }
}
