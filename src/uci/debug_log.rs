//! Append-only logging of UCI input/output lines to the file named by the
//! `Debug Log File` option.

use std::fs::OpenOptions;
use std::io::Write;

use once_cell::sync::Lazy;
use parking_lot::Mutex;

static LOG_FILE: Lazy<Mutex<Option<std::fs::File>>> = Lazy::new(|| Mutex::new(None));

/// Point the debug log at `path`, or disable it if `path` is empty.
pub fn set_path(path: &str) {
    let mut guard = LOG_FILE.lock();
    if path.is_empty() {
        *guard = None;
        return;
    }
    *guard = OpenOptions::new()
        .create(true)
        .append(true)
        .open(path)
        .ok();
}

fn write_line(prefix: &str, line: &str) {
    let mut guard = LOG_FILE.lock();
    if let Some(file) = guard.as_mut() {
        let _ = writeln!(file, "{prefix} {line}");
    }
}

/// Log a line received from the GUI.
pub fn log_input(line: &str) {
    write_line("<", line);
}

/// Log a line sent to the GUI.
pub fn log_output(line: &str) {
    write_line(">", line);
}
