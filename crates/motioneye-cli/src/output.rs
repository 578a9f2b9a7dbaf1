//! Output formatting for motioneye-cli (table, json, csv)

use clap::ValueEnum;
use colored::Colorize;
use serde::Serialize;
use serde_json::Value;
use tabled::{Table, Tabled};

/// Output format options
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, ValueEnum)]
pub enum OutputFormat {
    /// ASCII table format (default)
    #[default]
    Table,
    /// JSON format
    Json,
    /// CSV format
    Csv,
}

/// Context for output rendering
pub struct OutputContext {
    pub format: OutputFormat,
    pub quiet: bool,
}

impl OutputContext {
    pub fn new(format: OutputFormat, no_color: bool, quiet: bool) -> Self {
        if no_color {
            colored::control::set_override(false);
        }
        Self { format, quiet }
    }

    /// Print a success message (unless in quiet mode)
    pub fn success(&self, msg: &str) {
        if !self.quiet {
            println!("{}", msg.green());
        }
    }

    /// Print rows in the configured format
    pub fn print<T: Tabled + Serialize>(&self, data: &[T]) {
        match self.format {
            OutputFormat::Table => {
                if data.is_empty() {
                    if !self.quiet {
                        println!("No data");
                    }
                } else {
                    println!("{}", Table::new(data));
                }
            }
            OutputFormat::Json => {
                println!(
                    "{}",
                    serde_json::to_string_pretty(data).unwrap_or_else(|_| "[]".to_string())
                );
            }
            OutputFormat::Csv => print_csv(data),
        }
    }

    /// Print an arbitrary JSON document.
    ///
    /// Tables show one line per top-level field.
    pub fn print_value(&self, value: &Value) {
        match (self.format, value) {
            (OutputFormat::Table, Value::Object(map)) => {
                for (key, value) in map {
                    println!("{}: {}", key.bold(), display_scalar(value));
                }
            }
            (OutputFormat::Csv, Value::Object(map)) => {
                let keys: Vec<&str> = map.keys().map(String::as_str).collect();
                println!("{}", keys.join(","));
                let values: Vec<String> =
                    map.values().map(|v| escape_csv(&display_scalar(v))).collect();
                println!("{}", values.join(","));
            }
            _ => {
                println!(
                    "{}",
                    serde_json::to_string_pretty(value).unwrap_or_else(|_| value.to_string())
                );
            }
        }
    }
}

/// Render a JSON value without quotes around plain strings
pub fn display_scalar(value: &Value) -> String {
    match value {
        Value::String(s) => s.clone(),
        Value::Null => "-".to_string(),
        other => other.to_string(),
    }
}

/// Print data as CSV
fn print_csv<T: Serialize>(data: &[T]) {
    if data.is_empty() {
        return;
    }

    // Get field names from the first item
    let first = serde_json::to_value(&data[0]).unwrap_or_default();
    if let Value::Object(map) = &first {
        let headers: Vec<&str> = map.keys().map(|s| s.as_str()).collect();
        println!("{}", headers.join(","));

        for item in data {
            if let Ok(Value::Object(row)) = serde_json::to_value(item) {
                let values: Vec<String> = headers
                    .iter()
                    .map(|h| {
                        row.get(*h)
                            .map(|v| escape_csv(&display_scalar(v)))
                            .unwrap_or_default()
                    })
                    .collect();
                println!("{}", values.join(","));
            }
        }
    }
}

/// Escape a value for CSV output
fn escape_csv(value: &str) -> String {
    if value.contains(',') || value.contains('"') || value.contains('\n') {
        format!("\"{}\"", value.replace('"', "\"\""))
    } else {
        value.to_string()
    }
}

// =============================================================================
// Display types for various commands
// =============================================================================

/// Camera display for cameras command
#[derive(Debug, Tabled, Serialize)]
pub struct CameraRow {
    #[tabled(rename = "ID")]
    pub id: String,
    #[tabled(rename = "Name")]
    pub name: String,
    #[tabled(rename = "Streaming")]
    pub streaming: String,
    #[tabled(rename = "Stream URL")]
    pub stream_url: String,
}

/// Movie or picture display for media commands
#[derive(Debug, Tabled, Serialize)]
pub struct MediaRow {
    #[tabled(rename = "Path")]
    pub path: String,
    #[tabled(rename = "Time")]
    pub moment: String,
    #[tabled(rename = "Size")]
    pub size: String,
    #[tabled(rename = "Type")]
    pub mime_type: String,
}

/// Derived URL display for urls command
#[derive(Debug, Tabled, Serialize)]
pub struct UrlRow {
    #[tabled(rename = "Kind")]
    pub kind: String,
    #[tabled(rename = "URL")]
    pub url: String,
}
