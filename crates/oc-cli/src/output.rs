//! Terminal output helpers

use serde_json::Value;

/// Print a success message in green with a checkmark prefix
pub fn print_success(msg: &str) {
    println!("\x1b[32m✓\x1b[0m {}", msg);
}

/// Pretty-print a result document
pub fn print_data(data: &Value) {
    match serde_json::to_string_pretty(data) {
        Ok(text) => println!("{}", text),
        Err(_) => println!("{}", data),
    }
}
