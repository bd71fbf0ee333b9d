use std::fs;
use std::path::PathBuf;

use serde::{Deserialize, Serialize};

/// Gym-wide preferences from the settings screen
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Settings {
    pub gym_name: String,
    pub currency: String,
}

impl Default for Settings {
    fn default() -> Self {
        Self {
            gym_name: "Gym Management".to_string(),
            currency: "Rs.".to_string(),
        }
    }
}

impl Settings {
    /// Money amount as displayed in lists, e.g. "Rs. 120"
    pub fn format_amount(&self, amount: &str) -> String {
        if self.currency.is_empty() {
            amount.to_string()
        } else {
            format!("{} {}", self.currency, amount)
        }
    }
}

pub fn get_config_dir() -> anyhow::Result<PathBuf> {
    let config_dir = if let Ok(custom_dir) = std::env::var("GYMDESK_CONFIG_DIR") {
        PathBuf::from(custom_dir)
    } else {
        let home = std::env::var("HOME").map_err(|_| anyhow::anyhow!("HOME environment variable not set"))?;
        PathBuf::from(home).join(".config").join("gymdesk")
    };

    if !config_dir.exists() {
        fs::create_dir_all(&config_dir)?;
    }

    Ok(config_dir)
}

pub fn session_file() -> anyhow::Result<PathBuf> {
    Ok(get_config_dir()?.join("session.json"))
}

pub fn attendance_dir() -> anyhow::Result<PathBuf> {
    Ok(get_config_dir()?.join("attendance"))
}

pub fn load_settings() -> anyhow::Result<Settings> {
    let settings_file = get_config_dir()?.join("settings.json");

    if !settings_file.exists() {
        return Ok(Settings::default());
    }

    let content = fs::read_to_string(settings_file)?;
    let settings: Settings = serde_json::from_str(&content)?;
    Ok(settings)
}

pub fn save_settings(settings: &Settings) -> anyhow::Result<()> {
    let settings_file = get_config_dir()?.join("settings.json");

    let content = serde_json::to_string_pretty(settings)?;
    fs::write(settings_file, content)?;
    Ok(())
}
