use serde::{Deserialize, Serialize};
use tauri::{AppHandle, Emitter};
use text_selection::SelectionEvent;

use crate::monitor::MonitorSnapshot;

pub const TEXT_SELECTION_CHANGED: &str = "text-selection-changed";
pub const HOTKEY_SELECTION_DETECTED: &str = "hotkey-selection-detected";
pub const HOTKEY_TRIGGERED: &str = "hotkey-triggered";
pub const DETECTION_STATE_CHANGED: &str = "detection-state-changed";
pub const MONITOR_UPDATED: &str = "monitor-updated";

/// Authoritative detection state, published after every start/stop/permission call
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct DetectionState {
    pub detecting: bool,
    pub permissions_granted: bool,
}

/// Emit a selection picked up by the detector
pub fn emit_selection(app: &AppHandle, event: &SelectionEvent) -> Result<(), String> {
    app.emit(TEXT_SELECTION_CHANGED, event)
        .map_err(|e| format!("Failed to emit {}: {}", TEXT_SELECTION_CHANGED, e))
}

/// Emit the raw text grabbed by the global hotkey
pub fn emit_hotkey_selection(app: &AppHandle, text: &str) -> Result<(), String> {
    app.emit(HOTKEY_SELECTION_DETECTED, text)
        .map_err(|e| format!("Failed to emit {}: {}", HOTKEY_SELECTION_DETECTED, e))
}

/// Emit when the hotkey fired but nothing was selected
pub fn emit_hotkey_triggered(app: &AppHandle) -> Result<(), String> {
    app.emit(HOTKEY_TRIGGERED, "Hotkey pressed")
        .map_err(|e| format!("Failed to emit {}: {}", HOTKEY_TRIGGERED, e))
}

pub fn emit_detection_state(app: &AppHandle, state: DetectionState) -> Result<(), String> {
    app.emit(DETECTION_STATE_CHANGED, state)
        .map_err(|e| format!("Failed to emit {}: {}", DETECTION_STATE_CHANGED, e))
}

/// Push the current monitor render to the webview
pub fn emit_monitor_updated(app: &AppHandle, snapshot: &MonitorSnapshot) -> Result<(), String> {
    app.emit(MONITOR_UPDATED, snapshot)
        .map_err(|e| format!("Failed to emit {}: {}", MONITOR_UPDATED, e))
}
