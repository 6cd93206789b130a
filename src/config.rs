use std::{fs::File, io::BufReader, path::Path, path::PathBuf};

use indexmap::IndexSet;
use serde::Deserialize;

use crate::{
    schema::{default_tables, SchemaError, TableSchema},
    value::IdBinding,
};

pub const DEFAULT_DB_PATH: &str = "test.db";
pub const DEFAULT_ROW_COUNT: u64 = 1_000_000;
pub const DEFAULT_COMMIT_INTERVAL: u64 = 100;
pub const DEFAULT_LOG_INTERVAL: u64 = 10_000;
pub const DEFAULT_TARGET_TABLE: &str = "items";

/// Columns the loader writes into the target table.
pub const ITEM_COLUMNS: [&str; 3] = ["id", "first", "last"];

#[derive(Debug, thiserror::Error)]
pub enum ConfigError {
    #[error("Failed reading config file {}: {source}", path.display())]
    Read {
        path: PathBuf,
        source: std::io::Error,
    },

    #[error("Failed parsing config file {}: {source}", path.display())]
    Parse {
        path: PathBuf,
        source: serde_json::Error,
    },

    #[error("{0} must be greater than zero")]
    ZeroInterval(&'static str),

    #[error("row_count must be at least 1, got {0}")]
    EmptyRange(u64),

    #[error("row_count {0} does not fit an SQLite integer")]
    RowCountTooLarge(u64),

    #[error("Table {0} is configured more than once")]
    DuplicateTable(String),

    #[error("Target table {0} is not among the configured tables")]
    UnknownTargetTable(String),

    #[error("Target table {table} has no {column} column")]
    MissingColumn { table: String, column: &'static str },

    #[error(transparent)]
    Schema(#[from] SchemaError),
}

/// Everything one load run needs. Rows `1..row_count` are written, so `row_count` itself is
/// exclusive.
#[derive(Debug, Clone, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct LoadConfig {
    pub db_path: PathBuf,
    pub row_count: u64,
    pub commit_interval: u64,
    pub log_interval: u64,
    pub id_binding: IdBinding,
    pub target_table: String,
    pub tables: Vec<TableSchema>,
    pub dry_run: bool,
}

impl Default for LoadConfig {
    fn default() -> Self {
        Self {
            db_path: PathBuf::from(DEFAULT_DB_PATH),
            row_count: DEFAULT_ROW_COUNT,
            commit_interval: DEFAULT_COMMIT_INTERVAL,
            log_interval: DEFAULT_LOG_INTERVAL,
            id_binding: IdBinding::default(),
            target_table: DEFAULT_TARGET_TABLE.into(),
            tables: default_tables(),
            dry_run: false,
        }
    }
}

impl LoadConfig {
    /// Defaults, pointed at another database file.
    #[must_use]
    pub fn for_path(db_path: impl Into<PathBuf>) -> Self {
        Self {
            db_path: db_path.into(),
            ..Self::default()
        }
    }

    /// Reads a JSON config. Missing fields fall back to defaults.
    ///
    /// # Errors
    ///
    /// On file operations and malformed JSON.
    pub fn from_json_file(path: impl AsRef<Path>) -> Result<Self, ConfigError> {
        let path = path.as_ref();
        let file = File::open(path).map_err(|source| ConfigError::Read {
            path: path.to_path_buf(),
            source,
        })?;

        serde_json::from_reader(BufReader::new(file)).map_err(|source| ConfigError::Parse {
            path: path.to_path_buf(),
            source,
        })
    }

    /// Number of rows a complete run writes.
    #[must_use]
    pub const fn expected_rows(&self) -> u64 {
        self.row_count.saturating_sub(1)
    }

    /// # Errors
    ///
    /// On zero intervals, an empty or oversized row range, a table configured twice, a missing
    /// target table or column, and any invalid table schema.
    pub fn validate(&self) -> Result<(), ConfigError> {
        if self.commit_interval == 0 {
            return Err(ConfigError::ZeroInterval("commit_interval"));
        }
        if self.log_interval == 0 {
            return Err(ConfigError::ZeroInterval("log_interval"));
        }
        if self.row_count < 1 {
            return Err(ConfigError::EmptyRange(self.row_count));
        }
        if i64::try_from(self.row_count).is_err() {
            return Err(ConfigError::RowCountTooLarge(self.row_count));
        }

        let mut table_names = IndexSet::with_capacity(self.tables.len());
        for table in &self.tables {
            table.validate()?;
            if !table_names.insert(table.name.as_str()) {
                return Err(ConfigError::DuplicateTable(table.name.clone()));
            }
        }

        let target = self.target_schema()?;
        for column in ITEM_COLUMNS {
            if !target.has_column(column) {
                return Err(ConfigError::MissingColumn {
                    table: target.name.clone(),
                    column,
                });
            }
        }

        Ok(())
    }

    /// # Errors
    ///
    /// When no configured table carries the target name.
    pub fn target_schema(&self) -> Result<&TableSchema, ConfigError> {
        self.tables
            .iter()
            .find(|table| table.name == self.target_table)
            .ok_or_else(|| ConfigError::UnknownTargetTable(self.target_table.clone()))
    }
}
