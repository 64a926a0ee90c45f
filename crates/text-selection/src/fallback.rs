// Fallback for platforms without an accessibility selection probe
//
// Nothing can be observed, so queries report no selection and the process
// is treated as trusted (there is no permission to grant).

use crate::SelectionEvent;

pub fn selected_text() -> Option<String> {
    None
}

pub fn current_selection() -> Option<SelectionEvent> {
    None
}

pub fn accessibility_trusted() -> bool {
    true
}

pub fn request_accessibility() -> Result<bool, String> {
    Ok(true)
}
