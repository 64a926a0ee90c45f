// Prevents additional console window on Windows in release, DO NOT REMOVE!!
#![cfg_attr(not(debug_assertions), windows_subsystem = "windows")]

fn main() {
    selection_monitor_lib::logging::init();
    selection_monitor_lib::run()
}
