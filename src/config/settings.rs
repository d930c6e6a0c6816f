use serde::{Deserialize, Serialize};
use std::fs;
use std::path::PathBuf;
use lazy_static::lazy_static;

const APP_ID: &str = "dev.synaptiq.app";

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct AppConfig {
    /// Generative model used for sleep tips and career guidance
    pub model: String,
    pub api_base: String,
    pub timeout_secs: u64,
    pub max_retries: u32,
    pub default_hours_per_day: f64,
    /// Where the key-value store keeps its JSON files
    pub data_dir: PathBuf,
}

impl Default for AppConfig {
    fn default() -> Self {
        AppConfig {
            model: "gemini-2.5-flash".to_string(),
            api_base: "https://generativelanguage.googleapis.com/v1beta".to_string(),
            timeout_secs: 60,
            max_retries: 2,
            default_hours_per_day: 4.0,
            data_dir: app_dir().join("data"),
        }
    }
}

/// Platform-specific app data directory
pub fn app_dir() -> PathBuf {
    #[cfg(target_os = "macos")]
    {
        if let Some(home) = std::env::var_os("HOME") {
            let mut dir = PathBuf::from(home);
            dir.push("Library/Application Support");
            dir.push(APP_ID);
            return dir;
        }
    }

    #[cfg(target_os = "windows")]
    {
        if let Some(appdata) = std::env::var_os("APPDATA") {
            let mut dir = PathBuf::from(appdata);
            dir.push(APP_ID);
            return dir;
        }
    }

    #[cfg(target_os = "linux")]
    {
        if let Some(home) = std::env::var_os("HOME") {
            let mut dir = PathBuf::from(home);
            dir.push(".local/share");
            dir.push(APP_ID);
            return dir;
        }
    }

    // Fallback
    PathBuf::from(".synaptiq")
}

fn config_path() -> PathBuf {
    app_dir().join("synaptiq.toml")
}

/// Parse a config document; missing keys take their defaults.
pub fn parse_config(content: &str) -> Result<AppConfig, crate::error::SynaptiqError> {
    Ok(toml::from_str::<AppConfig>(content)?)
}

fn load_config_internal() -> AppConfig {
    let path = config_path();

    let mut config = match fs::read_to_string(&path) {
        Ok(content) => match parse_config(&content) {
            Ok(config) => {
                tracing::info!(path = ?path, "Loaded config");
                config
            }
            Err(e) => {
                tracing::warn!(path = ?path, error = %e, "Failed to parse config, using defaults");
                AppConfig::default()
            }
        },
        Err(_) => {
            tracing::debug!(path = ?path, "No config file, using defaults");
            AppConfig::default()
        }
    };

    if let Some(dir) = std::env::var_os("SYNAPTIQ_DATA_DIR") {
        config.data_dir = PathBuf::from(dir);
    }

    config
}

lazy_static! {
    static ref APP_CONFIG: AppConfig = load_config_internal();
}

/// Get the cached configuration (loaded once, on first use)
pub fn get_config() -> &'static AppConfig {
    &APP_CONFIG
}
