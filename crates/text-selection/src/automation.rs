// AppleScript automation probe
//
// Asking System Events for the process list is the cheapest call that makes
// macOS check (and if needed prompt for) automation/accessibility access.

use std::process::Command;
use log::{debug, info};

pub const PROBE_SCRIPT: &str = r#"tell application "System Events" to get name of every process"#;

/// Outcome of a successful probe
#[derive(Debug, Clone)]
pub struct ProbeReport {
    pub process_count: usize,
}

/// Run the probe. `Err` carries the script's stderr (or the spawn error).
pub fn probe_system_events() -> Result<ProbeReport, String> {
    probe_with("osascript")
}

pub(crate) fn probe_with(program: &str) -> Result<ProbeReport, String> {
    debug!("Running automation probe via {}", program);
    let output = Command::new(program)
        .arg("-e")
        .arg(PROBE_SCRIPT)
        .output()
        .map_err(|e| format!("Failed to run {}: {}", program, e))?;

    if output.status.success() {
        let stdout = String::from_utf8_lossy(&output.stdout);
        let report = ProbeReport {
            process_count: count_processes(&stdout),
        };
        info!("✅ Automation probe succeeded ({} processes)", report.process_count);
        Ok(report)
    } else {
        let error = String::from_utf8_lossy(&output.stderr);
        Err(format!("Automation probe failed: {}", error.trim()))
    }
}

/// osascript prints lists as `a, b, c`
fn count_processes(stdout: &str) -> usize {
    stdout
        .trim()
        .split(", ")
        .filter(|name| !name.trim().is_empty())
        .count()
}

/// Operator guidance printed when the probe fails
pub fn permission_guidance() -> &'static str {
    "Accessibility access is required.\n\
     1. Open System Settings > Privacy & Security > Accessibility\n\
     2. Enable the terminal (or the app) you are running from\n\
     3. Check System Settings > Privacy & Security > Automation allows control of \"System Events\"\n\
     4. Run this probe again"
}
