// crates/synthex-cli/src/output.rs
//
// Rendering of `synthex` results: tabled tables by default, pretty JSON
// with `--json`.

use serde::Serialize;
use tabled::{Table, Tabled};

/// How a command prints its result.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum OutputFormat {
    Table,
    /// Selected by the global `--json` flag.
    Json,
}

impl OutputFormat {
    pub fn from_flag(json: bool) -> Self {
        if json {
            OutputFormat::Json
        } else {
            OutputFormat::Table
        }
    }
}

/// Render rows as a table, or `(none)` when there are no rows.
pub fn format_table<T: Tabled>(rows: &[T]) -> String {
    if rows.is_empty() {
        return "(none)".to_string();
    }
    Table::new(rows).to_string()
}

/// Print a titled table followed by a blank line.
pub fn print_section<T: Tabled>(title: &str, rows: &[T]) {
    println!("{}", title);
    println!("{}", format_table(rows));
    println!();
}

/// Pretty JSON for `value`. Serialization failures are reported inline as a
/// JSON object so `--json` output stays parseable.
pub fn format_json<T: Serialize>(value: &T) -> String {
    serde_json::to_string_pretty(value)
        .unwrap_or_else(|e| serde_json::json!({ "error": e.to_string() }).to_string())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[derive(Serialize, Tabled)]
    struct Row {
        #[tabled(rename = "Currency")]
        currency: &'static str,
        #[tabled(rename = "Rate")]
        rate: &'static str,
    }

    #[test]
    fn test_from_flag() {
        assert_eq!(OutputFormat::from_flag(true), OutputFormat::Json);
        assert_eq!(OutputFormat::from_flag(false), OutputFormat::Table);
    }

    #[test]
    fn test_empty_table_placeholder() {
        let rows: Vec<Row> = Vec::new();
        assert_eq!(format_table(&rows), "(none)");
    }

    #[test]
    fn test_table_uses_renamed_headers() {
        let table = format_table(&[Row {
            currency: "sAUD",
            rate: "0.5",
        }]);
        assert!(table.contains("Currency"));
        assert!(table.contains("Rate"));
        assert!(table.contains("sAUD"));
    }

    #[test]
    fn test_json_is_pretty() {
        let json = format_json(&[Row {
            currency: "sEUR",
            rate: "1.25",
        }]);
        let value: serde_json::Value = serde_json::from_str(&json).unwrap();
        assert_eq!(value[0]["currency"], "sEUR");
        assert!(json.contains('\n'));
    }
}
