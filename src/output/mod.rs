//! Output formatting for CLI results

use colored::Colorize;
use serde::Serialize;
use serde_json::Value;

use crate::cli::OutputFormat;
use crate::error::Result;

pub mod formatters;
pub mod json;

/// Print an API response in the requested format
pub fn print_value(value: &Value, format: OutputFormat) -> Result<()> {
    match format {
        OutputFormat::Json => println!("{}", json::format_json(value)?),
        OutputFormat::Pretty => println!("{}", pretty_value(value)),
    }
    Ok(())
}

/// Print any serializable record in the requested format
pub fn print<T: Serialize>(data: &T, format: OutputFormat) -> Result<()> {
    print_value(&serde_json::to_value(data)?, format)
}

/// Render a JSON value as indented `key: value` lines.
pub fn pretty_value(value: &Value) -> String {
    let mut out = String::new();
    write_value(&mut out, value, 0);
    out.trim_end().to_string()
}

fn write_value(out: &mut String, value: &Value, depth: usize) {
    let indent = "  ".repeat(depth);
    match value {
        Value::Object(map) if !map.is_empty() => {
            for (key, child) in map {
                if is_scalar(child) {
                    out.push_str(&format!("{}{}: {}\n", indent, key.bold(), scalar(child)));
                } else {
                    out.push_str(&format!("{}{}:\n", indent, key.bold()));
                    write_value(out, child, depth + 1);
                }
            }
        }
        Value::Array(items) if !items.is_empty() => {
            for item in items {
                if is_scalar(item) {
                    out.push_str(&format!("{}- {}\n", indent, scalar(item)));
                } else {
                    out.push_str(&format!("{}-\n", indent));
                    write_value(out, item, depth + 1);
                }
            }
        }
        other => out.push_str(&format!("{}{}\n", indent, scalar(other))),
    }
}

fn is_scalar(value: &Value) -> bool {
    match value {
        Value::Object(map) => map.is_empty(),
        Value::Array(items) => items.is_empty(),
        _ => true,
    }
}

fn scalar(value: &Value) -> String {
    match value {
        Value::Null => "null".dimmed().to_string(),
        Value::String(s) => s.clone(),
        Value::Object(_) => "{}".dimmed().to_string(),
        Value::Array(_) => "[]".dimmed().to_string(),
        other => other.to_string(),
    }
}
