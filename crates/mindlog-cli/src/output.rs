//! Human and JSON renderings of command results
//!
//! Commands describe what happened through [`OutputFormatter`]; the JSON
//! formatter drops decorative lines and prints structured values only.

use chrono::{DateTime, Local, Utc};
use serde_json::{json, Value};

/// Output format selected with `--json`
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum OutputFormat {
    Human,
    Json,
}

impl OutputFormat {
    pub fn formatter(self) -> Box<dyn OutputFormatter> {
        match self {
            OutputFormat::Human => Box::new(HumanFormatter),
            OutputFormat::Json => Box::new(JsonFormatter),
        }
    }
}

/// Sink for everything a command reports
pub trait OutputFormatter {
    fn success(&self, message: &str);
    fn error(&self, message: &str);
    fn warn(&self, message: &str);
    fn info(&self, message: &str);
    /// An aligned `label: value` line
    fn field(&self, label: &str, value: &str);
    fn print_json(&self, value: &Value);
}

/// Width of the label column in human output
const LABEL_WIDTH: usize = 14;

fn field_line(label: &str, value: &str) -> String {
    format!("  {:<width$} {value}", format!("{label}:"), width = LABEL_WIDTH)
}

/// Plain text for terminals; errors and warnings go to stderr
pub struct HumanFormatter;

impl OutputFormatter for HumanFormatter {
    fn success(&self, message: &str) {
        println!("\u{2713} {message}");
    }
    fn error(&self, message: &str) {
        eprintln!("\u{2717} {message}");
    }
    fn warn(&self, message: &str) {
        eprintln!("! {message}");
    }
    fn info(&self, message: &str) {
        println!("  {message}");
    }
    fn field(&self, label: &str, value: &str) {
        println!("{}", field_line(label, value));
    }
    fn print_json(&self, _value: &Value) {}
}

/// One JSON document per line, for scripts
pub struct JsonFormatter;

impl JsonFormatter {
    fn status_line(success: bool, key: &str, message: &str) -> Value {
        let mut line = json!({ "success": success });
        line[key] = Value::String(message.to_string());
        line
    }
}

impl OutputFormatter for JsonFormatter {
    fn success(&self, message: &str) {
        println!("{}", Self::status_line(true, "message", message));
    }
    fn error(&self, message: &str) {
        eprintln!("{}", Self::status_line(false, "error", message));
    }
    fn warn(&self, message: &str) {
        eprintln!("{}", json!({ "warning": message }));
    }
    fn info(&self, _message: &str) {}
    fn field(&self, _label: &str, _value: &str) {}
    fn print_json(&self, value: &Value) {
        match serde_json::to_string_pretty(value) {
            Ok(text) => println!("{text}"),
            Err(e) => eprintln!("{}", Self::status_line(false, "error", &e.to_string())),
        }
    }
}

/// Renders an optional timestamp in local time, "never" when absent
pub fn display_time(time: Option<DateTime<Utc>>) -> String {
    match time {
        Some(t) => t.with_timezone(&Local).format("%Y-%m-%d %H:%M:%S").to_string(),
        None => "never".to_string(),
    }
}
