use serde_json::Value;

use super::format::OutputMode;

/// Render an API response: indented for humans, one line for scripts.
pub fn format_response(value: &Value, mode: OutputMode) -> String {
    let rendered = match mode {
        OutputMode::Tty => serde_json::to_string_pretty(value),
        OutputMode::Json => serde_json::to_string(value),
    };
    rendered.unwrap_or_else(|_| "{}".to_string())
}

pub fn print_response(value: &Value, mode: OutputMode) {
    println!("{}", format_response(value, mode));
}
