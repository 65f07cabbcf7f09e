//! Output helpers

use std::fmt;

use clap::ValueEnum;
use colored::Colorize;
use comfy_table::{Cell, Color, Table};
use serde_json::Value;

#[derive(Debug, Clone, Copy, PartialEq, Eq, ValueEnum)]
pub enum OutputFormat {
    Table,
    Json,
}

impl fmt::Display for OutputFormat {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Table => f.write_str("table"),
            Self::Json => f.write_str("json"),
        }
    }
}

pub fn print_section(title: &str) {
    println!("\n{}", title.bold().cyan());
    println!("{}", "=".repeat(50));
}

pub fn print_field(name: &str, value: &str) {
    println!("  {:<16} {}", format!("{name}:").bold(), value);
}

/// Render flat records as a table with one column per key of the first record.
pub fn records_table(records: &[serde_json::Map<String, Value>]) -> Table {
    let mut table = Table::new();

    let Some(first) = records.first() else {
        return table;
    };

    table.set_header(
        first
            .keys()
            .map(|key| Cell::new(key).fg(Color::Cyan))
            .collect::<Vec<_>>(),
    );

    for record in records {
        table.add_row(
            record
                .values()
                .map(|value| match value {
                    Value::Null => Cell::new("-").fg(Color::DarkGrey),
                    Value::String(s) => Cell::new(s),
                    other => Cell::new(other.to_string()),
                })
                .collect::<Vec<_>>(),
        );
    }

    table
}
