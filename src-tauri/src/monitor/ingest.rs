// Event ingestion - folds the backend's push channels into the monitor view

use std::sync::Mutex;

use log::{debug, warn};
use tauri::{AppHandle, Event, EventId, Listener, Manager};
use text_selection::SelectionEvent;

use super::{MonitorSnapshot, MonitorView};
use crate::events::{self, DetectionState};
use crate::state::AppState;
use crate::tray;

/// Subscribe to the selection, hotkey and reconciliation channels.
/// Returns the listener ids so they can be removed on shutdown.
pub fn subscribe(app: &AppHandle) -> Vec<EventId> {
    let selection_app = app.clone();
    let selection_id = app.listen(events::TEXT_SELECTION_CHANGED, move |event: Event| {
        match parse_selection(event.payload()) {
            Ok(selection) => {
                debug!("📥 Selection from {}: {} chars", selection.app_name, selection.text.len());
                update(&selection_app, |view| view.receive_selection(selection));
            }
            Err(e) => warn!("⚠️  Malformed {} payload: {}", events::TEXT_SELECTION_CHANGED, e),
        }
    });

    let hotkey_app = app.clone();
    let hotkey_id = app.listen(events::HOTKEY_SELECTION_DETECTED, move |event: Event| {
        match parse_hotkey_text(event.payload()) {
            Ok(text) => {
                let received_at = text_selection::now_timestamp();
                debug!("📥 Hotkey selection: {} chars", text.len());
                update(&hotkey_app, |view| view.receive_hotkey_text(text, received_at));
            }
            Err(e) => warn!("⚠️  Malformed {} payload: {}", events::HOTKEY_SELECTION_DETECTED, e),
        }
    });

    let state_app = app.clone();
    let state_id = app.listen(events::DETECTION_STATE_CHANGED, move |event: Event| {
        match parse_detection_state(event.payload()) {
            Ok(state) => update(&state_app, |view| view.reconcile(state)),
            Err(e) => warn!("⚠️  Malformed {} payload: {}", events::DETECTION_STATE_CHANGED, e),
        }
    });

    vec![selection_id, hotkey_id, state_id]
}

pub fn unsubscribe(app: &AppHandle, ids: Vec<EventId>) {
    for id in ids {
        app.unlisten(id);
    }
    debug!("Event subscriptions removed");
}

/// `text-selection-changed` carries a full SelectionEvent
pub fn parse_selection(payload: &str) -> Result<SelectionEvent, serde_json::Error> {
    serde_json::from_str(payload)
}

/// `hotkey-selection-detected` carries the raw text as a JSON string
pub fn parse_hotkey_text(payload: &str) -> Result<String, serde_json::Error> {
    serde_json::from_str(payload)
}

pub fn parse_detection_state(payload: &str) -> Result<DetectionState, serde_json::Error> {
    serde_json::from_str(payload)
}

/// Mutate the view, then re-render everywhere it is shown
fn update(app: &AppHandle, f: impl FnOnce(&mut MonitorView)) {
    let state = app.state::<AppState>();
    match state.monitor.lock() {
        Ok(mut view) => f(&mut view),
        Err(e) => {
            warn!("⚠️  Failed to lock monitor view: {}", e);
            return;
        }
    }
    publish(app);
}

/// Schedule a render on the main thread. The snapshot is taken there, so
/// renders are serialized and each one shows the view as it is at render time.
pub fn publish(app: &AppHandle) {
    let handle = app.clone();
    if let Err(e) = app.run_on_main_thread(move || render_latest(&handle)) {
        warn!("⚠️  Failed to schedule monitor render: {}", e);
    }
}

fn render_latest(app: &AppHandle) {
    let state = app.state::<AppState>();
    let snapshot = match latest_snapshot(&state.monitor) {
        Ok(snapshot) => snapshot,
        Err(e) => {
            warn!("⚠️  {}", e);
            return;
        }
    };

    if let Err(e) = tray::render(app, &snapshot) {
        warn!("⚠️  Failed to update tray: {}", e);
    }
    if let Err(e) = events::emit_monitor_updated(app, &snapshot) {
        warn!("⚠️  {}", e);
    }
}

/// Snapshot of the view as it is right now
pub fn latest_snapshot(view: &Mutex<MonitorView>) -> Result<MonitorSnapshot, String> {
    view.lock()
        .map(|v| v.snapshot())
        .map_err(|e| format!("Failed to lock monitor view: {}", e))
}
