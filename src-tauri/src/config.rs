use log::{info, warn};
use serde::{Deserialize, Serialize};
use std::time::Duration;
use tauri::AppHandle;
use tauri_plugin_store::StoreExt;

use crate::monitor::feed::FEED_CAPACITY;

pub const STORE_FILE: &str = "config.json";
pub const CONFIG_KEY: &str = "app_config";
pub const POLL_INTERVAL_ENV: &str = "SELECTION_MONITOR_POLL_MS";

/// Polling faster than this just burns accessibility calls
const MIN_POLL_INTERVAL_MS: u64 = 50;

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct AppConfig {
    #[serde(default = "default_poll_interval_ms")]
    pub poll_interval_ms: u64,
    /// Global shortcut; None means the platform default
    #[serde(default)]
    pub hotkey: Option<String>,
    #[serde(default = "default_feed_capacity")]
    pub feed_capacity: usize,
    /// Run as a menu bar app with the main window hidden
    #[serde(default = "default_start_hidden")]
    pub start_hidden: bool,
}

fn default_poll_interval_ms() -> u64 {
    500
}

fn default_feed_capacity() -> usize {
    FEED_CAPACITY
}

fn default_start_hidden() -> bool {
    true
}

impl Default for AppConfig {
    fn default() -> Self {
        Self {
            poll_interval_ms: default_poll_interval_ms(),
            hotkey: None,
            feed_capacity: default_feed_capacity(),
            start_hidden: default_start_hidden(),
        }
    }
}

impl AppConfig {
    pub fn poll_interval(&self) -> Duration {
        Duration::from_millis(self.poll_interval_ms.max(MIN_POLL_INTERVAL_MS))
    }

    pub fn hotkey_or_default(&self) -> &str {
        self.hotkey.as_deref().unwrap_or(default_hotkey())
    }

    pub fn with_env_overrides(self) -> Self {
        self.with_poll_override(std::env::var(POLL_INTERVAL_ENV).ok())
    }

    fn with_poll_override(mut self, value: Option<String>) -> Self {
        if let Some(raw) = value {
            match raw.trim().parse::<u64>() {
                Ok(ms) => self.poll_interval_ms = ms,
                Err(e) => warn!("⚠️  Ignoring {}={:?}: {}", POLL_INTERVAL_ENV, raw, e),
            }
        }
        self
    }
}

/// Platform-conventional chord for the capture hotkey
pub fn default_hotkey() -> &'static str {
    if cfg!(target_os = "macos") {
        "Command+Shift+L"
    } else {
        "Ctrl+Shift+L"
    }
}

/// Load the config from the store, writing defaults on first run
pub fn load(app: &AppHandle) -> Result<AppConfig, Box<dyn std::error::Error>> {
    let store = app.store(STORE_FILE)?;

    match store.get(CONFIG_KEY) {
        Some(value) => Ok(serde_json::from_value(value)?),
        None => {
            let config = AppConfig::default();
            store.set(CONFIG_KEY.to_string(), serde_json::to_value(&config)?);
            store.save()?;
            info!("📝 Wrote default config to {}", STORE_FILE);
            Ok(config)
        }
    }
}
