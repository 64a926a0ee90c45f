// Monitor module - the presentation state shown in the tray and the main window
//
// The view keeps a status line, a permission indicator, the detecting flag and
// the recent selection feed. User intents go through a DetectionBackend; the
// lock on the view is never held across a backend call.

pub mod backend;
pub mod feed;
pub mod ingest;

use std::future::Future;
use std::sync::Mutex;

use serde::{Deserialize, Serialize};
use text_selection::SelectionEvent;

use crate::events::DetectionState;
use feed::SelectionFeed;

pub const STATUS_INITIAL: &str = "Initializing...";
pub const STATUS_CHECKING: &str = "Checking permissions...";
pub const STATUS_STARTING: &str = "Starting detection...";
pub const STATUS_STOPPING: &str = "Stopping detection...";
pub const STATUS_PERMISSIONS_GRANTED: &str =
    "Accessibility permissions granted. Ready to start detection.";
pub const STATUS_NEEDS_PERMISSION: &str =
    "Accessibility permissions required. Grant access in System Settings > Privacy & Security > Accessibility.";

/// Calls the presentation surface makes into the native side
pub trait DetectionBackend {
    fn check_permissions(&self) -> impl Future<Output = Result<bool, String>> + Send;
    fn start_detection(&self) -> impl Future<Output = Result<String, String>> + Send;
    fn stop_detection(&self) -> impl Future<Output = Result<String, String>> + Send;
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum PermissionIndicator {
    Unknown,
    Granted,
    NotGranted,
}

/// Serializable render of the monitor, pushed to the tray and the webview
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct MonitorSnapshot {
    pub status: String,
    pub permission: PermissionIndicator,
    pub detecting: bool,
    pub show_start: bool,
    pub start_enabled: bool,
    pub show_stop: bool,
    pub recent: Vec<SelectionEvent>,
}

#[derive(Debug)]
pub struct MonitorView {
    status: String,
    permissions_granted: Option<bool>,
    detecting: bool,
    feed: SelectionFeed,
}

impl Default for MonitorView {
    fn default() -> Self {
        Self::new(feed::FEED_CAPACITY)
    }
}

impl MonitorView {
    pub fn new(feed_capacity: usize) -> Self {
        Self {
            status: STATUS_INITIAL.to_string(),
            permissions_granted: None,
            detecting: false,
            feed: SelectionFeed::with_capacity(feed_capacity),
        }
    }

    #[cfg(test)]
    fn status(&self) -> &str {
        &self.status
    }

    #[cfg(test)]
    fn is_detecting(&self) -> bool {
        self.detecting
    }

    #[cfg(test)]
    fn permissions_granted(&self) -> Option<bool> {
        self.permissions_granted
    }

    pub fn resize_feed(&mut self, capacity: usize) {
        self.feed.resize(capacity);
    }

    /// Start is offered only with granted permissions and while idle
    pub fn can_start(&self) -> bool {
        self.permissions_granted == Some(true) && !self.detecting
    }

    pub fn can_stop(&self) -> bool {
        self.detecting
    }

    pub fn begin_permission_check(&mut self) {
        self.status = STATUS_CHECKING.to_string();
    }

    pub fn apply_permissions(&mut self, result: Result<bool, String>) {
        match result {
            Ok(granted) => {
                self.permissions_granted = Some(granted);
                self.status = if granted {
                    STATUS_PERMISSIONS_GRANTED
                } else {
                    STATUS_NEEDS_PERMISSION
                }
                .to_string();
            }
            Err(e) => {
                self.status = format!("Error checking permissions: {}", e);
            }
        }
    }

    /// Returns false (and changes nothing) when start is not offered
    pub fn begin_start(&mut self) -> bool {
        if !self.can_start() {
            return false;
        }
        self.status = STATUS_STARTING.to_string();
        true
    }

    pub fn apply_start(&mut self, result: Result<String, String>) {
        match result {
            Ok(message) => {
                self.detecting = true;
                self.status = message;
            }
            Err(e) => {
                self.status = format!("Error starting detection: {}", e);
            }
        }
    }

    /// Returns false (and changes nothing) when stop is not offered
    pub fn begin_stop(&mut self) -> bool {
        if !self.can_stop() {
            return false;
        }
        self.status = STATUS_STOPPING.to_string();
        true
    }

    pub fn apply_stop(&mut self, result: Result<String, String>) {
        match result {
            Ok(message) => {
                self.detecting = false;
                self.status = message;
            }
            Err(e) => {
                self.status = format!("Error stopping detection: {}", e);
            }
        }
    }

    pub fn receive_selection(&mut self, event: SelectionEvent) {
        self.feed.push(event);
    }

    pub fn receive_hotkey_text(&mut self, text: String, received_at: f64) {
        self.feed.push_hotkey_text(text, received_at);
    }

    /// Adopt the backend's authoritative state over the local flags
    pub fn reconcile(&mut self, state: DetectionState) {
        self.detecting = state.detecting;
        self.permissions_granted = Some(state.permissions_granted);
    }

    pub fn snapshot(&self) -> MonitorSnapshot {
        let permission = match self.permissions_granted {
            None => PermissionIndicator::Unknown,
            Some(true) => PermissionIndicator::Granted,
            Some(false) => PermissionIndicator::NotGranted,
        };
        MonitorSnapshot {
            status: self.status.clone(),
            permission,
            detecting: self.detecting,
            show_start: !self.detecting,
            start_enabled: self.can_start(),
            show_stop: self.detecting,
            recent: self.feed.to_vec(),
        }
    }
}

fn with_view<T>(view: &Mutex<MonitorView>, f: impl FnOnce(&mut MonitorView) -> T) -> Result<T, String> {
    let mut guard = view
        .lock()
        .map_err(|e| format!("Failed to lock monitor view: {}", e))?;
    Ok(f(&mut guard))
}

/// Refresh the permission indicator
pub async fn check_permissions<B: DetectionBackend>(
    backend: &B,
    view: &Mutex<MonitorView>,
) -> Result<MonitorSnapshot, String> {
    with_view(view, |v| v.begin_permission_check())?;
    let result = backend.check_permissions().await;
    with_view(view, |v| {
        v.apply_permissions(result);
        v.snapshot()
    })
}

/// Start detection if the control is enabled; otherwise the click is ignored
pub async fn start_detection<B: DetectionBackend>(
    backend: &B,
    view: &Mutex<MonitorView>,
) -> Result<MonitorSnapshot, String> {
    if !with_view(view, |v| v.begin_start())? {
        return with_view(view, |v| v.snapshot());
    }
    let result = backend.start_detection().await;
    with_view(view, |v| {
        v.apply_start(result);
        v.snapshot()
    })
}

pub async fn stop_detection<B: DetectionBackend>(
    backend: &B,
    view: &Mutex<MonitorView>,
) -> Result<MonitorSnapshot, String> {
    if !with_view(view, |v| v.begin_stop())? {
        return with_view(view, |v| v.snapshot());
    }
    let result = backend.stop_detection().await;
    with_view(view, |v| {
        v.apply_stop(result);
        v.snapshot()
    })
}

/// What a control on any surface (tray menu or webview) asks for
#[derive(Debug, Clone, Copy, PartialEq, Eq, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Intent {
    /// Permission refresh at launch, without the settings prompt
    InitialCheck,
    CheckPermissions,
    Start,
    Stop,
}

pub async fn run_intent<B: DetectionBackend>(
    backend: &B,
    view: &Mutex<MonitorView>,
    intent: Intent,
) -> Result<MonitorSnapshot, String> {
    match intent {
        Intent::InitialCheck | Intent::CheckPermissions => check_permissions(backend, view).await,
        Intent::Start => start_detection(backend, view).await,
        Intent::Stop => stop_detection(backend, view).await,
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::sync::atomic::{AtomicUsize, Ordering};
    use text_selection::SelectionKind;

    /// Backend that replays canned answers and counts calls
    struct ScriptedBackend {
        permissions: Result<bool, String>,
        start: Result<String, String>,
        stop: Result<String, String>,
        start_calls: AtomicUsize,
    }

    impl ScriptedBackend {
        fn granted() -> Self {
            Self {
                permissions: Ok(true),
                start: Ok("Text detection started successfully".to_string()),
                stop: Ok("Text detection stopped".to_string()),
                start_calls: AtomicUsize::new(0),
            }
        }
    }

    impl DetectionBackend for ScriptedBackend {
        async fn check_permissions(&self) -> Result<bool, String> {
            self.permissions.clone()
        }

        async fn start_detection(&self) -> Result<String, String> {
            self.start_calls.fetch_add(1, Ordering::SeqCst);
            self.start.clone()
        }

        async fn stop_detection(&self) -> Result<String, String> {
            self.stop.clone()
        }
    }

    fn detecting_view() -> Mutex<MonitorView> {
        let mut view = MonitorView::default();
        view.apply_permissions(Ok(true));
        view.apply_start(Ok("started".to_string()));
        Mutex::new(view)
    }

    #[test]
    fn test_initial_snapshot() {
        let snapshot = MonitorView::default().snapshot();
        assert_eq!(snapshot.status, STATUS_INITIAL);
        assert_eq!(snapshot.permission, PermissionIndicator::Unknown);
        assert!(snapshot.show_start);
        assert!(!snapshot.start_enabled);
        assert!(!snapshot.show_stop);
        assert!(snapshot.recent.is_empty());
    }

    #[tokio::test]
    async fn test_granted_permissions_enable_start() {
        let backend = ScriptedBackend::granted();
        let view = Mutex::new(MonitorView::default());

        let snapshot = check_permissions(&backend, &view).await.unwrap();
        assert_eq!(snapshot.permission, PermissionIndicator::Granted);
        assert_eq!(snapshot.status, STATUS_PERMISSIONS_GRANTED);
        assert!(snapshot.start_enabled);
    }

    #[tokio::test]
    async fn test_denied_permissions_keep_start_disabled_even_when_clicked() {
        let backend = ScriptedBackend {
            permissions: Ok(false),
            ..ScriptedBackend::granted()
        };
        let view = Mutex::new(MonitorView::default());

        let snapshot = check_permissions(&backend, &view).await.unwrap();
        assert_eq!(snapshot.status, STATUS_NEEDS_PERMISSION);
        assert_eq!(snapshot.permission, PermissionIndicator::NotGranted);
        assert!(!snapshot.start_enabled);

        let snapshot = start_detection(&backend, &view).await.unwrap();
        assert_eq!(backend.start_calls.load(Ordering::SeqCst), 0);
        assert!(!snapshot.detecting);
        assert_eq!(snapshot.status, STATUS_NEEDS_PERMISSION);
    }

    #[tokio::test]
    async fn test_permission_check_failure_keeps_last_indicator() {
        let view = Mutex::new(MonitorView::default());
        check_permissions(&ScriptedBackend::granted(), &view).await.unwrap();

        let failing = ScriptedBackend {
            permissions: Err("backend unavailable".to_string()),
            ..ScriptedBackend::granted()
        };
        let snapshot = check_permissions(&failing, &view).await.unwrap();
        assert_eq!(snapshot.permission, PermissionIndicator::Granted);
        assert!(snapshot.status.contains("backend unavailable"));
    }

    #[tokio::test]
    async fn test_permission_check_allowed_while_detecting() {
        let view = detecting_view();
        let snapshot = check_permissions(&ScriptedBackend::granted(), &view).await.unwrap();
        assert!(snapshot.detecting);
        assert!(snapshot.show_stop);
    }

    #[tokio::test]
    async fn test_successful_start_swaps_controls() {
        let backend = ScriptedBackend::granted();
        let view = Mutex::new(MonitorView::default());
        check_permissions(&backend, &view).await.unwrap();

        let snapshot = start_detection(&backend, &view).await.unwrap();
        assert!(snapshot.detecting);
        assert!(snapshot.show_stop);
        assert!(!snapshot.show_start);
        assert_eq!(snapshot.status, "Text detection started successfully");
    }

    #[tokio::test]
    async fn test_failed_start_leaves_flag_inactive() {
        let backend = ScriptedBackend {
            start: Err("Accessibility permissions not granted".to_string()),
            ..ScriptedBackend::granted()
        };
        let view = Mutex::new(MonitorView::default());
        check_permissions(&backend, &view).await.unwrap();

        let snapshot = start_detection(&backend, &view).await.unwrap();
        assert!(!snapshot.detecting);
        assert!(snapshot.show_start);
        assert!(snapshot.status.contains("Accessibility permissions not granted"));
    }

    #[tokio::test]
    async fn test_successful_stop_swaps_controls_back() {
        let view = detecting_view();
        let snapshot = stop_detection(&ScriptedBackend::granted(), &view).await.unwrap();
        assert!(!snapshot.detecting);
        assert!(snapshot.show_start);
        assert!(!snapshot.show_stop);
        assert_eq!(snapshot.status, "Text detection stopped");
    }

    #[tokio::test]
    async fn test_failed_stop_leaves_flag_active() {
        let backend = ScriptedBackend {
            stop: Err("detector busy".to_string()),
            ..ScriptedBackend::granted()
        };
        let view = detecting_view();
        let snapshot = stop_detection(&backend, &view).await.unwrap();
        assert!(snapshot.detecting);
        assert!(snapshot.status.contains("detector busy"));
    }

    #[tokio::test]
    async fn test_stop_while_idle_is_ignored() {
        let view = Mutex::new(MonitorView::default());
        let snapshot = stop_detection(&ScriptedBackend::granted(), &view).await.unwrap();
        assert_eq!(snapshot.status, STATUS_INITIAL);
        assert!(!snapshot.detecting);
    }

    #[tokio::test]
    async fn test_refresh_intent_updates_status_not_just_flags() {
        let backend = ScriptedBackend {
            permissions: Ok(false),
            ..ScriptedBackend::granted()
        };
        let view = Mutex::new(MonitorView::default());

        // Reconciliation alone flips the indicator but leaves the status line stale
        view.lock().unwrap().reconcile(DetectionState {
            detecting: false,
            permissions_granted: false,
        });
        assert_eq!(view.lock().unwrap().snapshot().status, STATUS_INITIAL);

        let snapshot = run_intent(&backend, &view, Intent::CheckPermissions).await.unwrap();
        assert_eq!(snapshot.status, STATUS_NEEDS_PERMISSION);
        assert_eq!(snapshot.permission, PermissionIndicator::NotGranted);
    }

    #[tokio::test]
    async fn test_start_and_stop_intents_drive_the_controls() {
        let backend = ScriptedBackend::granted();
        let view = Mutex::new(MonitorView::default());

        let snapshot = run_intent(&backend, &view, Intent::Start).await.unwrap();
        assert_eq!(backend.start_calls.load(Ordering::SeqCst), 0);
        assert!(!snapshot.start_enabled);

        run_intent(&backend, &view, Intent::InitialCheck).await.unwrap();
        let snapshot = run_intent(&backend, &view, Intent::Start).await.unwrap();
        assert!(snapshot.show_stop);
        assert!(!snapshot.show_start);

        let snapshot = run_intent(&backend, &view, Intent::Stop).await.unwrap();
        assert!(snapshot.show_start);
        assert!(snapshot.start_enabled);
    }

    #[test]
    fn test_intent_names_from_webview() {
        let intent: Intent = serde_json::from_str(r#""check_permissions""#).unwrap();
        assert_eq!(intent, Intent::CheckPermissions);
        let intent: Intent = serde_json::from_str(r#""stop""#).unwrap();
        assert_eq!(intent, Intent::Stop);
    }

    #[test]
    fn test_in_flight_status() {
        let mut view = MonitorView::default();
        view.apply_permissions(Ok(true));
        assert!(view.begin_start());
        assert_eq!(view.status(), STATUS_STARTING);
        assert!(!view.is_detecting());
    }

    #[test]
    fn test_reconcile_overrides_local_flags() {
        let mut view = MonitorView::default();
        view.apply_permissions(Ok(true));
        view.apply_start(Ok("started".to_string()));

        view.reconcile(DetectionState {
            detecting: false,
            permissions_granted: false,
        });
        assert!(!view.is_detecting());
        assert_eq!(view.permissions_granted(), Some(false));
        assert!(!view.can_start());
    }

    #[test]
    fn test_both_channels_fill_the_same_feed() {
        let mut view = MonitorView::default();
        view.receive_selection(SelectionEvent {
            text: "structured".to_string(),
            app_name: "Notes".to_string(),
            timestamp: 10.0,
            selection_type: SelectionKind::Hovered,
        });
        view.receive_hotkey_text("raw".to_string(), 5.0);

        let recent = view.snapshot().recent;
        assert_eq!(recent.len(), 2);
        assert_eq!(recent[0].text, "raw");
        assert_eq!(recent[0].app_name, feed::HOTKEY_APP_LABEL);
        assert_eq!(recent[1].selection_type, SelectionKind::Hovered);
    }

    #[test]
    fn test_snapshot_serializes_camel_case() {
        let json = serde_json::to_value(MonitorView::default().snapshot()).unwrap();
        assert_eq!(json["permission"], "unknown");
        assert_eq!(json["showStart"], true);
        assert_eq!(json["startEnabled"], false);
    }
}
