//! Best-effort SQL introspection.
//!
//! Extracts an operation verb and a table name from raw SQL for span
//! naming and `db.*` attributes. Pattern matching only: joins, subqueries
//! and quoted identifiers with escapes are not handled correctly, and that
//! is accepted. These functions never fail on malformed SQL.

use regex::Regex;
use std::sync::OnceLock;

const OPERATIONS: [&str; 12] = [
    "select", "insert", "update", "delete", "create", "drop", "alter", "truncate", "replace",
    "show", "describe", "explain",
];

/// Extract the operation verb from a statement.
///
/// The first keyword of the trimmed statement is matched
/// case-insensitively against a fixed verb set; anything unrecognized
/// yields `"query"`.
pub fn extract_operation(sql: &str) -> &'static str {
    let keyword: String = sql
        .trim_start()
        .chars()
        .take_while(|c| c.is_ascii_alphabetic())
        .collect();

    OPERATIONS
        .into_iter()
        .find(|op| keyword.eq_ignore_ascii_case(op))
        .unwrap_or("query")
}

/// Extract the primary table name for a statement, best effort.
///
/// Uses an operation-specific clause pattern (FROM, INTO, UPDATE, TABLE,
/// TRUNCATE). Returns `None` when the operation has no table clause or
/// nothing matches. Backtick quoting is unwrapped.
pub fn extract_table_name(sql: &str, operation: &str) -> Option<String> {
    let pattern = match operation {
        "select" | "delete" => from_clause(),
        "insert" | "replace" => into_clause(),
        "update" => update_clause(),
        "create" | "drop" | "alter" => table_clause(),
        "truncate" => truncate_clause(),
        _ => return None,
    };

    pattern
        .captures(sql.trim())
        .and_then(|caps| caps.get(1))
        .map(|m| m.as_str().to_owned())
}

fn from_clause() -> &'static Regex {
    static RE: OnceLock<Regex> = OnceLock::new();
    RE.get_or_init(|| {
        Regex::new(r"(?i)\bFROM\s+`?([A-Za-z_][A-Za-z0-9_]*)`?").expect("valid pattern")
    })
}

fn into_clause() -> &'static Regex {
    static RE: OnceLock<Regex> = OnceLock::new();
    RE.get_or_init(|| {
        Regex::new(r"(?i)\bINTO\s+`?([A-Za-z_][A-Za-z0-9_]*)`?").expect("valid pattern")
    })
}

fn update_clause() -> &'static Regex {
    static RE: OnceLock<Regex> = OnceLock::new();
    RE.get_or_init(|| {
        Regex::new(r"(?i)\bUPDATE\s+`?([A-Za-z_][A-Za-z0-9_]*)`?").expect("valid pattern")
    })
}

fn table_clause() -> &'static Regex {
    static RE: OnceLock<Regex> = OnceLock::new();
    RE.get_or_init(|| {
        Regex::new(r"(?i)\bTABLE\s+(?:IF\s+(?:NOT\s+)?EXISTS\s+)?`?([A-Za-z_][A-Za-z0-9_]*)`?")
            .expect("valid pattern")
    })
}

fn truncate_clause() -> &'static Regex {
    static RE: OnceLock<Regex> = OnceLock::new();
    RE.get_or_init(|| {
        Regex::new(r"(?i)\bTRUNCATE\s+(?:TABLE\s+)?`?([A-Za-z_][A-Za-z0-9_]*)`?")
            .expect("valid pattern")
    })
}
