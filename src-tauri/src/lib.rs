mod commands;
mod config;
mod detector;
mod events;
mod hotkey;
mod monitor;
mod state;
mod tray;

pub mod logging;

use config::AppConfig;
use log::{info, warn};
use state::AppState;
use tauri::{AppHandle, Manager, RunEvent, WindowEvent};

#[cfg_attr(mobile, tauri::mobile_entry_point)]
pub fn run() {
    let app = tauri::Builder::default()
        .plugin(tauri_plugin_opener::init())
        .plugin(tauri_plugin_dialog::init())
        .plugin(tauri_plugin_global_shortcut::Builder::new().build())
        .plugin(tauri_plugin_store::Builder::default().build())
        .manage(AppState::new())
        .invoke_handler(tauri::generate_handler![
            commands::check_permissions,
            commands::start_text_detection,
            commands::stop_text_detection,
            commands::get_current_selection,
            commands::show_main_window,
            commands::hide_main_window,
            commands::get_monitor_snapshot,
            commands::run_monitor_intent,
            commands::get_config,
        ])
        .setup(|app| {
            let app_handle = app.handle().clone();

            let config = config::load(&app_handle)
                .unwrap_or_else(|e| {
                    warn!("⚠️  Failed to load config, using defaults: {}", e);
                    AppConfig::default()
                })
                .with_env_overrides();
            let hotkey = config.hotkey_or_default().to_string();
            let start_hidden = config.start_hidden;

            {
                let state = app.state::<AppState>();
                state.configure(config)?;

                // Subscribe before anything can emit
                let listener_ids = monitor::ingest::subscribe(&app_handle);
                state.listeners.lock()
                    .map_err(|e| format!("Failed to lock listeners: {}", e))?
                    .extend(listener_ids);
            }

            // A missing hotkey is not fatal, detection still works from the tray
            if let Err(e) = hotkey::setup_global_shortcut(&app_handle, &hotkey) {
                warn!("⚠️  Failed to register hotkey {}: {}", hotkey, e);
            }

            tray::create_system_tray(&app_handle)?;

            // Closing the window keeps the app alive in the tray
            if let Some(window) = app.get_webview_window("main") {
                let window_clone = window.clone();
                window.on_window_event(move |event| {
                    if let WindowEvent::CloseRequested { api, .. } = event {
                        api.prevent_close();
                        let _ = window_clone.hide();
                    }
                });
                if !start_hidden {
                    window.show()?;
                }
            }

            #[cfg(target_os = "macos")]
            if start_hidden {
                app.set_activation_policy(tauri::ActivationPolicy::Accessory);
            }

            tray::spawn_intent(&app_handle, monitor::Intent::InitialCheck);
            info!("✅ Selection monitor ready");
            Ok(())
        })
        .build(tauri::generate_context!())
        .expect("error while building tauri application");

    app.run(|app_handle, event| {
        if let RunEvent::Exit = event {
            shutdown(app_handle);
        }
    });
}

/// Drop the event subscriptions and stop the detector
fn shutdown(app: &AppHandle) {
    let state = app.state::<AppState>();

    match state.listeners.lock() {
        Ok(mut listeners) => monitor::ingest::unsubscribe(app, std::mem::take(&mut *listeners)),
        Err(e) => warn!("⚠️  Failed to lock listeners: {}", e),
    }

    match state.detector.lock() {
        Ok(mut detector) => {
            if let Some(text_detector) = detector.take() {
                text_detector.stop();
            }
        }
        Err(e) => warn!("⚠️  Failed to lock detector: {}", e),
    }

    info!("👋 Selection monitor shut down");
}
