use tauri::AppHandle;

use super::DetectionBackend;
use crate::commands;

/// Backend that runs the command implementations in-process (used by the tray)
pub struct AppBackend {
    app: AppHandle,
}

impl AppBackend {
    pub fn new(app: AppHandle) -> Self {
        Self { app }
    }
}

impl DetectionBackend for AppBackend {
    async fn check_permissions(&self) -> Result<bool, String> {
        commands::check_permissions_internal(&self.app)
    }

    async fn start_detection(&self) -> Result<String, String> {
        commands::start_detection_internal(&self.app)
    }

    async fn stop_detection(&self) -> Result<String, String> {
        commands::stop_detection_internal(&self.app)
    }
}
