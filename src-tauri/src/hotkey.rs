// Global hotkey - grabs the current selection on demand
// Default: Cmd+Shift+L (macOS) / Ctrl+Shift+L (elsewhere)

use log::{debug, info, warn};
use tauri::AppHandle;
use tauri_plugin_global_shortcut::{GlobalShortcutExt, Shortcut, ShortcutState};

use crate::events;

/// Register the capture hotkey during app initialization
pub fn setup_global_shortcut(app: &AppHandle, chord: &str) -> Result<(), Box<dyn std::error::Error>> {
    let shortcut: Shortcut = chord
        .parse()
        .map_err(|e| format!("Failed to parse hotkey {}: {}", chord, e))?;

    if app.global_shortcut().is_registered(shortcut) {
        warn!("⚠️  Hotkey {} already registered, replacing it", chord);
        app.global_shortcut().unregister(shortcut)?;
    }

    app.global_shortcut().on_shortcut(shortcut, move |app, _shortcut, event| {
        if event.state != ShortcutState::Pressed {
            return;
        }
        debug!("⌨️  Hotkey pressed");

        match text_selection::selected_text() {
            Some(text) => {
                debug!("Selected text via hotkey: {} chars", text.len());
                if let Err(e) = events::emit_hotkey_selection(app, &text) {
                    warn!("⚠️  {}", e);
                }
            }
            None => {
                if let Err(e) = events::emit_hotkey_triggered(app) {
                    warn!("⚠️  {}", e);
                }
            }
        }
    })?;

    info!("✅ Global shortcut registered: {}", chord);
    Ok(())
}
