// ffkit-cli/src/output.rs
//
// Small helpers for human-readable terminal output.

use std::fmt::Display;

use console::style;

/// Print a heading with colored styling and clear separation
pub fn print_heading(text: &str) {
    println!("\n{}", style(text).bold().bright());
    println!("{}", style("=".repeat(text.chars().count().max(20))).blue());
}

/// Print an info line with label and value, with the label colored
pub fn print_info<T: Display>(label: &str, value: T) {
    println!("  {:<18} {}", style(format!("{label}:")).cyan(), value);
}

/// Print an error line in red to stderr
pub fn print_error(message: &str) {
    eprintln!("{}", style(message).red().bold());
}

pub fn print_success(message: &str) {
    println!("{}", style(message).green());
}

/// Formats a duration in seconds as "HH:MM:SS".
pub fn format_duration_seconds(seconds: f64) -> String {
    let total = seconds.max(0.0) as u64;
    format!("{:02}:{:02}:{:02}", total / 3600, (total % 3600) / 60, total % 60)
}

/// Formats a byte count using binary units.
pub fn format_bytes(bytes: u64) -> String {
    const UNITS: [&str; 5] = ["B", "KiB", "MiB", "GiB", "TiB"];
    let mut value = bytes as f64;
    let mut unit = 0;
    while value >= 1024.0 && unit < UNITS.len() - 1 {
        value /= 1024.0;
        unit += 1;
    }
    if unit == 0 {
        format!("{bytes} B")
    } else {
        format!("{value:.2} {}", UNITS[unit])
    }
}
