// Cross-platform access to the user's current text selection
//!
//! # text-selection
//!
//! Reads the text the user has selected (or the focused element's text) in
//! whatever application currently has focus, using platform APIs:
//! - macOS: Accessibility API (`AXUIElement`)
//! - other platforms: no probe available, every query reports nothing
//!
//! ## Example
//! ```no_run
//! use text_selection::{accessibility_trusted, current_selection};
//!
//! if accessibility_trusted() {
//!     if let Some(event) = current_selection() {
//!         println!("{} selected {:?}", event.app_name, event.text);
//!     }
//! }
//! ```

use serde::{Deserialize, Serialize};

pub mod automation;

#[cfg(target_os = "macos")]
mod macos;
#[cfg(not(target_os = "macos"))]
mod fallback;

#[cfg(target_os = "macos")]
use macos as native;
#[cfg(not(target_os = "macos"))]
use fallback as native;

/// Label used when the source application cannot be determined
pub const UNKNOWN_APP: &str = "Unknown";

/// Minimum length for text read from non-selection attributes (value, title, ...)
pub const MIN_FOCUSED_TEXT_LEN: usize = 3;

/// How the text came to be captured
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum SelectionKind {
    Selected,
    Hovered,
    Focused,
}

/// A single captured selection
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SelectionEvent {
    pub text: String,
    pub app_name: String,
    /// Seconds since the Unix epoch
    pub timestamp: f64,
    pub selection_type: SelectionKind,
}

impl SelectionEvent {
    /// Build an event stamped with the current time
    pub fn now(text: impl Into<String>, app_name: impl Into<String>, kind: SelectionKind) -> Self {
        Self {
            text: text.into(),
            app_name: app_name.into(),
            timestamp: now_timestamp(),
            selection_type: kind,
        }
    }
}

/// Current wall-clock time as fractional seconds since the Unix epoch
pub fn now_timestamp() -> f64 {
    chrono::Utc::now().timestamp_micros() as f64 / 1_000_000.0
}

/// Accept selected text only if it has visible content
pub fn meaningful_selection(text: String) -> Option<String> {
    if text.trim().is_empty() {
        None
    } else {
        Some(text)
    }
}

/// Accept text from a focused element's attributes. These are noisier than
/// a real selection (labels, single glyph buttons), so very short values are dropped.
pub fn meaningful_focused_text(text: String) -> Option<String> {
    if text.trim().is_empty() || text.len() < MIN_FOCUSED_TEXT_LEN {
        None
    } else {
        Some(text)
    }
}

/// Probe the focused element: selected text first, then its value/title/description/help
pub fn current_selection() -> Option<SelectionEvent> {
    native::current_selection()
}

/// Only the actively selected text in the focused element, if any
pub fn selected_text() -> Option<String> {
    native::selected_text()
}

/// Whether this process may observe other applications' UI
pub fn accessibility_trusted() -> bool {
    native::accessibility_trusted()
}

/// Ask the OS to show its accessibility prompt. Returns the trust state after asking.
pub fn request_accessibility() -> Result<bool, String> {
    native::request_accessibility()
}

/// Suppresses repeats so a poller only reports selections that changed
#[derive(Debug, Default)]
pub struct ChangeFilter {
    last: Option<String>,
}

impl ChangeFilter {
    pub fn new() -> Self {
        Self::default()
    }

    /// Returns true (and remembers the text) when it differs from the last accepted one
    pub fn accept(&mut self, text: &str) -> bool {
        if self.last.as_deref() == Some(text) {
            return false;
        }
        self.last = Some(text.to_string());
        true
    }
}
