use log::{info, warn};
use tauri::{AppHandle, Manager, State};
use text_selection::{SelectionEvent, SelectionKind};

use crate::config::AppConfig;
use crate::detector::TextDetector;
use crate::events::{self, DetectionState};
use crate::monitor::{Intent, MonitorSnapshot};
use crate::state::AppState;
use crate::tray;

/// App label for one-shot probes requested from the UI
const MANUAL_APP_LABEL: &str = "Manual";

/// Check whether the process is trusted for accessibility
#[tauri::command]
pub async fn check_permissions(app: AppHandle) -> Result<bool, String> {
    check_permissions_internal(&app)
}

/// Start the background selection detector
#[tauri::command]
pub async fn start_text_detection(app: AppHandle) -> Result<String, String> {
    start_detection_internal(&app)
}

/// Stop the background selection detector
#[tauri::command]
pub async fn stop_text_detection(app: AppHandle) -> Result<String, String> {
    stop_detection_internal(&app)
}

/// Read the current selection once, outside the detector
#[tauri::command]
pub async fn get_current_selection() -> Result<Option<SelectionEvent>, String> {
    Ok(text_selection::selected_text()
        .map(|text| SelectionEvent::now(text, MANUAL_APP_LABEL, SelectionKind::Selected)))
}

#[tauri::command]
pub async fn show_main_window(app: AppHandle) -> Result<(), String> {
    show_main_window_internal(&app)
}

#[tauri::command]
pub async fn hide_main_window(app: AppHandle) -> Result<(), String> {
    if let Some(window) = app.get_webview_window("main") {
        window.hide().map_err(|e| e.to_string())?;
    }
    Ok(())
}

/// Current monitor render (status, controls, recent selections)
#[tauri::command]
pub fn get_monitor_snapshot(state: State<AppState>) -> Result<MonitorSnapshot, String> {
    let view = state.monitor.lock()
        .map_err(|e| format!("Failed to lock monitor: {}", e))?;
    Ok(view.snapshot())
}

/// Run a monitor control from the webview (refresh, start, stop) the way the tray does
#[tauri::command]
pub async fn run_monitor_intent(app: AppHandle, intent: Intent) -> Result<MonitorSnapshot, String> {
    tray::perform_intent(&app, intent).await
}

#[tauri::command]
pub fn get_config(state: State<AppState>) -> Result<AppConfig, String> {
    state.config()
}

pub fn show_main_window_internal(app: &AppHandle) -> Result<(), String> {
    if let Some(window) = app.get_webview_window("main") {
        window.show().map_err(|e| e.to_string())?;
        window.set_focus().map_err(|e| e.to_string())?;
    }
    Ok(())
}

pub fn check_permissions_internal(app: &AppHandle) -> Result<bool, String> {
    let granted = text_selection::accessibility_trusted();
    info!("🔐 Accessibility permissions granted: {}", granted);
    publish_detection_state(app, Some(granted));
    Ok(granted)
}

pub fn start_detection_internal(app: &AppHandle) -> Result<String, String> {
    let state = app.state::<AppState>();

    let result = {
        let mut detector = state.detector.lock()
            .map_err(|e| format!("Failed to lock detector: {}", e))?;

        if detector.as_ref().is_some_and(|d| d.is_running()) {
            Ok("Text detection is already running".to_string())
        } else {
            match spawn_detector(app, &state) {
                Ok(text_detector) => {
                    *detector = Some(text_detector);
                    Ok("Text detection started successfully".to_string())
                }
                Err(e) => {
                    warn!("❌ {}", e);
                    Err(format!("Failed to start text detection: {}", e))
                }
            }
        }
    };

    publish_detection_state(app, None);
    result
}

pub fn stop_detection_internal(app: &AppHandle) -> Result<String, String> {
    let state = app.state::<AppState>();

    let result = {
        let mut detector = state.detector.lock()
            .map_err(|e| format!("Failed to lock detector: {}", e))?;

        match detector.take() {
            Some(text_detector) => {
                text_detector.stop();
                Ok("Text detection stopped".to_string())
            }
            None => Ok("Text detection was not running".to_string()),
        }
    };

    publish_detection_state(app, None);
    result
}

fn spawn_detector(app: &AppHandle, state: &AppState) -> Result<TextDetector, String> {
    let trusted = text_selection::request_accessibility()
        .map_err(|e| format!("Failed to request permissions: {}", e))?;
    if !trusted {
        return Err("Accessibility permissions not granted".to_string());
    }

    let interval = state.config()?.poll_interval();
    let app_handle = app.clone();
    Ok(TextDetector::start(
        interval,
        text_selection::current_selection,
        move |selection: &SelectionEvent| {
            if let Err(e) = events::emit_selection(&app_handle, selection) {
                warn!("⚠️  {}", e);
            }
        },
    ))
}

/// Tell listeners what the backend actually believes, so local flags can reconcile
fn publish_detection_state(app: &AppHandle, permissions_granted: Option<bool>) {
    let state = app.state::<AppState>();
    let detecting = match state.is_detecting() {
        Ok(detecting) => detecting,
        Err(e) => {
            warn!("⚠️  {}", e);
            return;
        }
    };
    let permissions_granted =
        permissions_granted.unwrap_or_else(text_selection::accessibility_trusted);

    let detection_state = DetectionState {
        detecting,
        permissions_granted,
    };
    if let Err(e) = events::emit_detection_state(app, detection_state) {
        warn!("⚠️  {}", e);
    }
}
