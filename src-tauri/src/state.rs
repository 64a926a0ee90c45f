use std::sync::Mutex;
use tauri::EventId;

use crate::config::AppConfig;
use crate::detector::TextDetector;
use crate::monitor::MonitorView;
use crate::tray::TrayHandles;

/// Application state shared between commands, the tray and event listeners
pub struct AppState {
    /// Running detector, None while idle
    pub detector: Mutex<Option<TextDetector>>,
    pub monitor: Mutex<MonitorView>,
    pub config: Mutex<AppConfig>,
    /// Listener ids for the ingestion subscriptions, removed on exit
    pub listeners: Mutex<Vec<EventId>>,
    pub tray: Mutex<Option<TrayHandles>>,
}

impl AppState {
    pub fn new() -> Self {
        Self {
            detector: Mutex::new(None),
            monitor: Mutex::new(MonitorView::default()),
            config: Mutex::new(AppConfig::default()),
            listeners: Mutex::new(Vec::new()),
            tray: Mutex::new(None),
        }
    }

    /// Install the loaded configuration
    pub fn configure(&self, config: AppConfig) -> Result<(), String> {
        self.monitor
            .lock()
            .map_err(|e| format!("Failed to lock monitor: {}", e))?
            .resize_feed(config.feed_capacity);

        let mut current = self.config.lock()
            .map_err(|e| format!("Failed to lock config: {}", e))?;
        *current = config;
        Ok(())
    }

    pub fn config(&self) -> Result<AppConfig, String> {
        self.config
            .lock()
            .map(|c| c.clone())
            .map_err(|e| format!("Failed to lock config: {}", e))
    }

    pub fn is_detecting(&self) -> Result<bool, String> {
        let detector = self.detector.lock()
            .map_err(|e| format!("Failed to lock detector: {}", e))?;
        Ok(detector.as_ref().is_some_and(|d| d.is_running()))
    }
}

impl Default for AppState {
    fn default() -> Self {
        Self::new()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_configure_resizes_feed() {
        let state = AppState::new();
        let config = AppConfig {
            feed_capacity: 4,
            ..AppConfig::default()
        };
        state.configure(config).unwrap();

        let mut view = state.monitor.lock().unwrap();
        for i in 0..6 {
            view.receive_hotkey_text(format!("text {}", i), i as f64);
        }
        assert_eq!(view.snapshot().recent.len(), 4);
        drop(view);

        assert_eq!(state.config().unwrap().feed_capacity, 4);
        assert!(!state.is_detecting().unwrap());
    }
}
