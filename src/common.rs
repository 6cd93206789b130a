use std::path::PathBuf;

use crate::{config::ConfigError, schema::SchemaError};

#[derive(Debug, thiserror::Error)]
pub enum LoadError {
    #[error("Invalid configuration: {0}")]
    Config(#[from] ConfigError),

    #[error("Invalid schema: {0}")]
    Schema(#[from] SchemaError),

    #[error("Failed opening database {}: {source}", path.display())]
    Open {
        path: PathBuf,
        source: sqlite::Error,
    },

    #[error("Row index {0} does not fit an SQLite integer")]
    IndexOutOfRange(u64),

    #[error("Table {0} already exists")]
    TableExists(String),

    #[error("Failed inserting row {row} ({committed} rows committed): {source}")]
    Insert {
        row: u64,
        committed: u64,
        source: sqlite::Error,
    },

    #[error("Load interrupted before row {row} ({committed} rows committed)")]
    Interrupted { row: u64, committed: u64 },

    #[error("Database error: {0}")]
    Sqlite(#[from] sqlite::Error),
}

/// Whether a plain SQL identifier can be used unquoted.
#[must_use]
pub fn is_identifier(name: &str) -> bool {
    let mut chars = name.chars();
    match chars.next() {
        Some(c) if c.is_ascii_alphabetic() || c == '_' => {}
        _ => return false,
    }
    chars.all(|c| c.is_ascii_alphanumeric() || c == '_')
}

#[cfg(test)]
mod test {
    use super::*;

    #[test]
    fn test_is_identifier() {
        assert!(is_identifier("items"));
        assert!(is_identifier("items2"));
        assert!(is_identifier("_private"));

        assert!(!is_identifier(""));
        assert!(!is_identifier("2items"));
        assert!(!is_identifier("items; DROP TABLE items"));
        assert!(!is_identifier("first name"));
    }
}
