// Accessibility permission probe
//
// Triggers the macOS automation check by listing running processes through
// System Events. Exits 0 when access is available, 1 otherwise.

use text_selection::automation::{permission_guidance, probe_system_events};
use text_selection::accessibility_trusted;

fn main() {
    println!("🔍 Checking accessibility permissions...\n");

    println!(
        "   AXIsProcessTrusted: {}",
        if accessibility_trusted() { "yes" } else { "no" }
    );

    match probe_system_events() {
        Ok(report) => {
            println!("✅ System Events reachable ({} processes)", report.process_count);
            std::process::exit(0);
        }
        Err(e) => {
            eprintln!("❌ {}\n", e);
            eprintln!("{}", permission_guidance());
            std::process::exit(1);
        }
    }
}
