// System tray - the menu bar rendering of the monitor view

use log::{debug, error, info, warn};
use tauri::menu::{Menu, MenuEvent, MenuItem, PredefinedMenuItem, Submenu};
use tauri::tray::{MouseButton, MouseButtonState, TrayIcon, TrayIconBuilder, TrayIconEvent};
use tauri::{AppHandle, Manager};
use tauri_plugin_dialog::{DialogExt, MessageDialogButtons, MessageDialogKind};
use tauri_plugin_opener::OpenerExt;
use text_selection::SelectionEvent;

use crate::commands;
use crate::monitor::backend::AppBackend;
use crate::monitor::{self, ingest, Intent, MonitorSnapshot, PermissionIndicator};
use crate::state::AppState;

const TOOLTIP: &str = "Selection Monitor";
const RECENT_LABEL_CHARS: usize = 48;
const ACCESSIBILITY_SETTINGS_URL: &str =
    "x-apple.systempreferences:com.apple.preference.security?Privacy_Accessibility";

/// Menu items updated on every render
#[derive(Clone)]
pub struct TrayHandles {
    icon: TrayIcon,
    status: MenuItem<tauri::Wry>,
    permission: MenuItem<tauri::Wry>,
    start: MenuItem<tauri::Wry>,
    stop: MenuItem<tauri::Wry>,
    recent: Submenu<tauri::Wry>,
}

pub fn create_system_tray(app: &AppHandle) -> tauri::Result<()> {
    let status = MenuItem::with_id(app, "status", monitor::STATUS_INITIAL, false, None::<&str>)?;
    let permission = MenuItem::with_id(app, "permission", permission_label(PermissionIndicator::Unknown), false, None::<&str>)?;
    let show = MenuItem::with_id(app, "show", "Show Window", true, None::<&str>)?;
    let start = MenuItem::with_id(app, "start_detection", "Start Detection", false, None::<&str>)?;
    let stop = MenuItem::with_id(app, "stop_detection", "Stop Detection", false, None::<&str>)?;
    let permissions = MenuItem::with_id(app, "permissions", "Check Permissions", true, None::<&str>)?;
    let empty = MenuItem::with_id(app, "recent-empty", "No selections yet", false, None::<&str>)?;
    let recent = Submenu::with_items(app, "Recent Selections", true, &[&empty])?;
    let quit = MenuItem::with_id(app, "quit", "Quit", true, None::<&str>)?;

    let menu = Menu::with_items(app, &[
        &status,
        &permission,
        &PredefinedMenuItem::separator(app)?,
        &show,
        &PredefinedMenuItem::separator(app)?,
        &start,
        &stop,
        &permissions,
        &PredefinedMenuItem::separator(app)?,
        &recent,
        &PredefinedMenuItem::separator(app)?,
        &quit,
    ])?;

    let mut builder = TrayIconBuilder::new()
        .menu(&menu)
        .tooltip(TOOLTIP)
        .on_menu_event(handle_menu_event)
        .on_tray_icon_event(|tray, event| handle_tray_click_event(tray.app_handle(), event));
    if let Some(icon) = app.default_window_icon() {
        builder = builder.icon(icon.clone());
    }
    let icon = builder.build(app)?;

    let state = app.state::<AppState>();
    match state.tray.lock() {
        Ok(mut tray) => {
            *tray = Some(TrayHandles { icon, status, permission, start, stop, recent });
        }
        Err(e) => warn!("⚠️  Failed to store tray handles: {}", e),
    }

    info!("✅ System tray created");
    Ok(())
}

/// Apply a snapshot to the tray menu. Hidden controls are rendered disabled.
/// Must run on the main thread; the handles are cloned out so no lock is held
/// while the menu is being changed.
pub fn render(app: &AppHandle, snapshot: &MonitorSnapshot) -> tauri::Result<()> {
    let state = app.state::<AppState>();
    let handles = match state.tray.lock() {
        Ok(tray) => tray.clone(),
        Err(e) => {
            warn!("⚠️  Failed to lock tray handles: {}", e);
            return Ok(());
        }
    };
    let Some(handles) = handles else {
        return Ok(());
    };

    handles.status.set_text(&snapshot.status)?;
    handles.permission.set_text(permission_label(snapshot.permission))?;
    handles.start.set_enabled(snapshot.show_start && snapshot.start_enabled)?;
    handles.stop.set_enabled(snapshot.show_stop)?;
    handles.icon.set_tooltip(Some(format!("{} - {}", TOOLTIP, snapshot.status)))?;

    for item in handles.recent.items()? {
        handles.recent.remove(&item)?;
    }
    if snapshot.recent.is_empty() {
        let empty = MenuItem::with_id(app, "recent-empty", "No selections yet", false, None::<&str>)?;
        handles.recent.append(&empty)?;
    }
    for (index, event) in snapshot.recent.iter().enumerate() {
        let item = MenuItem::with_id(app, format!("recent-{}", index), recent_label(event), true, None::<&str>)?;
        handles.recent.append(&item)?;
    }
    Ok(())
}

pub fn handle_tray_click_event(app: &AppHandle, event: TrayIconEvent) {
    if let TrayIconEvent::Click {
        button: MouseButton::Left,
        button_state: MouseButtonState::Up,
        ..
    } = event
    {
        debug!("System tray received a left click");
        if let Err(e) = commands::show_main_window_internal(app) {
            warn!("⚠️  Failed to show main window: {}", e);
        }
    }
}

pub fn handle_menu_event(app: &AppHandle, event: MenuEvent) {
    let id = event.id().as_ref();
    match id {
        "quit" => app.exit(0),
        "start_detection" => spawn_intent(app, Intent::Start),
        "stop_detection" => spawn_intent(app, Intent::Stop),
        "permissions" => spawn_intent(app, Intent::CheckPermissions),
        _ if id == "show" || id.starts_with("recent-") => {
            if let Err(e) = commands::show_main_window_internal(app) {
                warn!("⚠️  Failed to show main window: {}", e);
            }
        }
        _ => {}
    }
}

/// Run a user intent against the in-process backend and re-render
pub fn spawn_intent(app: &AppHandle, intent: Intent) {
    let app = app.clone();
    tauri::async_runtime::spawn(async move {
        if let Err(e) = perform_intent(&app, intent).await {
            error!("❌ {:?} failed: {}", intent, e);
        }
    });
}

/// Shared by the tray menu and the webview commands
pub async fn perform_intent(app: &AppHandle, intent: Intent) -> Result<MonitorSnapshot, String> {
    let backend = AppBackend::new(app.clone());
    let state = app.state::<AppState>();
    let snapshot = monitor::run_intent(&backend, &state.monitor, intent).await?;

    ingest::publish(app);
    if intent == Intent::CheckPermissions && snapshot.permission == PermissionIndicator::NotGranted {
        prompt_for_permissions(app);
    }
    Ok(snapshot)
}

/// Ask the OS for access and offer to open the settings pane
fn prompt_for_permissions(app: &AppHandle) {
    if let Err(e) = text_selection::request_accessibility() {
        warn!("⚠️  Failed to request accessibility: {}", e);
    }

    let opener_app = app.clone();
    app.dialog()
        .message(monitor::STATUS_NEEDS_PERMISSION)
        .title(TOOLTIP)
        .kind(MessageDialogKind::Warning)
        .buttons(MessageDialogButtons::OkCancel)
        .show(move |open_settings| {
            if open_settings && cfg!(target_os = "macos") {
                if let Err(e) = opener_app.opener().open_url(ACCESSIBILITY_SETTINGS_URL, None::<&str>) {
                    warn!("⚠️  Failed to open System Settings: {}", e);
                }
            }
        });
}

pub fn permission_label(permission: PermissionIndicator) -> &'static str {
    match permission {
        PermissionIndicator::Unknown => "Permissions: unknown",
        PermissionIndicator::Granted => "Permissions: ✅ granted",
        PermissionIndicator::NotGranted => "Permissions: ❌ not granted",
    }
}

/// One menu line per selection: `[App] text...`, whitespace collapsed
pub fn recent_label(event: &SelectionEvent) -> String {
    let text = event.text.split_whitespace().collect::<Vec<_>>().join(" ");
    let mut label: String = text.chars().take(RECENT_LABEL_CHARS).collect();
    if text.chars().count() > RECENT_LABEL_CHARS {
        label.push('…');
    }
    format!("[{}] {}", event.app_name, label)
}
