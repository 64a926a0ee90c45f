// Background selection detector - polls the focused element and reports changes

use log::{debug, info, warn};
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::Arc;
use std::time::Duration;
use tauri::async_runtime::{self, JoinHandle};
use text_selection::{ChangeFilter, SelectionEvent};

/// Handle to a running polling task
pub struct TextDetector {
    running: Arc<AtomicBool>,
    task: JoinHandle<()>,
}

impl TextDetector {
    /// Spawn the poller. `read` fetches the current selection, `emit` receives changes.
    pub fn start<R, E>(interval: Duration, read: R, emit: E) -> Self
    where
        R: Fn() -> Option<SelectionEvent> + Send + Sync + 'static,
        E: Fn(&SelectionEvent) + Send + 'static,
    {
        let running = Arc::new(AtomicBool::new(true));
        let task = async_runtime::spawn(poll_selections(running.clone(), interval, read, emit));
        info!("▶️  Text detector started (every {} ms)", interval.as_millis());
        Self { running, task }
    }

    /// Stop polling. Nothing is emitted after this returns.
    pub fn stop(&self) {
        if self.running.swap(false, Ordering::SeqCst) {
            self.task.abort();
            info!("⏹️  Text detector stopped");
        }
    }

    pub fn is_running(&self) -> bool {
        self.running.load(Ordering::SeqCst)
    }
}

impl Drop for TextDetector {
    fn drop(&mut self) {
        self.stop();
    }
}

/// Polling loop; exits once `running` is cleared.
/// Accessibility queries block, so each read runs on the blocking pool.
pub(crate) async fn poll_selections<R, E>(
    running: Arc<AtomicBool>,
    interval: Duration,
    read: R,
    emit: E,
) where
    R: Fn() -> Option<SelectionEvent> + Send + Sync + 'static,
    E: Fn(&SelectionEvent),
{
    let read = Arc::new(read);
    let mut ticker = tokio::time::interval(interval);
    ticker.set_missed_tick_behavior(tokio::time::MissedTickBehavior::Skip);
    let mut filter = ChangeFilter::new();

    loop {
        ticker.tick().await;

        if !running.load(Ordering::SeqCst) {
            break;
        }

        let reader = read.clone();
        let selection = match tokio::task::spawn_blocking(move || reader()).await {
            Ok(selection) => selection,
            Err(e) => {
                warn!("⚠️  Selection read failed: {}", e);
                None
            }
        };
        let Some(selection) = selection else {
            continue;
        };

        // stop() may have landed while the read was running
        if !running.load(Ordering::SeqCst) {
            break;
        }

        if filter.accept(&selection.text) {
            debug!("🔎 Selection changed ({:?}, {} chars)", selection.selection_type, selection.text.len());
            emit(&selection);
        }
    }
    debug!("Selection polling loop exited");
}
