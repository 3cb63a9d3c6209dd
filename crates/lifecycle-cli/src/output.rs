//! Table and JSON rendering for CLI commands.

use serde::Serialize;
use tabled::settings::Style;
use tabled::{Table, Tabled};

use lifecycle_core::error::AppError;

/// Output format selection
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, clap::ValueEnum)]
pub enum OutputFormat {
    /// Human-readable table
    #[default]
    Table,
    /// JSON output
    Json,
}

/// Print rows in the selected format.
pub fn print_rows<T: Serialize + Tabled>(rows: &[T], format: OutputFormat) -> Result<(), AppError> {
    match format {
        OutputFormat::Table if rows.is_empty() => println!("(nothing to show)"),
        OutputFormat::Table => {
            let mut table = Table::new(rows);
            table.with(Style::rounded());
            println!("{table}");
        }
        OutputFormat::Json => print_json(rows)?,
    }
    Ok(())
}

/// Print any serializable value as pretty JSON.
pub fn print_json<T: Serialize + ?Sized>(value: &T) -> Result<(), AppError> {
    let json = serde_json::to_string_pretty(value)?;
    println!("{json}");
    Ok(())
}

pub fn print_success(msg: &str) {
    println!("✓ {msg}");
}

pub fn print_warning(msg: &str) {
    println!("⚠ {msg}");
}

pub fn print_error(msg: &str) {
    eprintln!("✗ {msg}");
}

/// Print an aligned key/value line.
pub fn print_kv(key: &str, value: impl std::fmt::Display) {
    println!("  {:<20} {value}", format!("{key}:"));
}
