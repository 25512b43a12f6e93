//! Quoting for interpolated SQL identifiers and literals
//!
//! Every role, database, and schema name in this workflow is
//! operator-provided configuration, not end-user input, but all of them still
//! pass through these helpers so a malformed name cannot break out of its
//! position in a statement.

/// Quote a SQL identifier. Wraps in double quotes and escapes embedded
/// double quotes.
pub fn quote_ident(name: &str) -> String {
    format!("\"{}\"", name.replace('"', "\"\""))
}

/// Quote a SQL string literal. Wraps in single quotes and escapes embedded
/// single quotes.
pub fn quote_literal(value: &str) -> String {
    format!("'{}'", value.replace('\'', "''"))
}
