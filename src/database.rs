use std::path::Path;

use log::{debug, info};
use sqlite::{Connection, State};

use crate::{common::LoadError, schema::TableSchema};

/// Opens the database file, creating it when missing.
///
/// # Errors
///
/// When the path is inaccessible or SQLite cannot initialize the file.
pub fn open(db_path: &Path) -> Result<Connection, LoadError> {
    debug!("Opening database: {}", db_path.display());
    sqlite::open(db_path).map_err(|source| LoadError::Open {
        path: db_path.to_path_buf(),
        source,
    })
}

/// # Errors
///
/// On SQLite failures.
pub fn table_exists(connection: &Connection, table_name: &str) -> Result<bool, sqlite::Error> {
    let mut statement =
        connection.prepare("SELECT COUNT(*) FROM sqlite_master WHERE type = 'table' AND name = ?")?;
    statement.bind((1, table_name))?;

    match statement.next()? {
        State::Row => Ok(statement.read::<i64, _>(0)? > 0),
        State::Done => Ok(false),
    }
}

/// Creates the tables one after the other. A table that already exists stops the sequence;
/// tables created before it are kept.
///
/// # Errors
///
/// `TableExists` on a name clash, otherwise schema or SQLite failures.
pub fn create_tables(connection: &Connection, tables: &[TableSchema]) -> Result<(), LoadError> {
    for table in tables {
        let sql = table.create_table_sql()?;

        if table_exists(connection, &table.name)? {
            return Err(LoadError::TableExists(table.name.clone()));
        }

        connection.execute(&sql)?;
        info!("Created table {}", table.name);
    }

    Ok(())
}

/// # Errors
///
/// On SQLite failures, including a missing table.
pub fn count_rows(connection: &Connection, table_name: &str) -> Result<u64, sqlite::Error> {
    let mut statement = connection.prepare(format!("SELECT COUNT(*) FROM {table_name}"))?;

    match statement.next()? {
        State::Row => Ok(u64::try_from(statement.read::<i64, _>(0)?).unwrap_or_default()),
        State::Done => Ok(0),
    }
}
