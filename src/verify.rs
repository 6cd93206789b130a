use log::debug;
use sqlite::{Connection, State};

use crate::value::{first_name, last_name};

pub use crate::database::count_rows;

#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub struct VerifyReport {
    pub rows: u64,
    pub expected_rows: u64,
    /// Rows whose id is out of sequence or whose text fields differ from the derived ones.
    pub mismatched: u64,
    pub first_mismatch: Option<i64>,
}

impl VerifyReport {
    #[must_use]
    pub const fn is_complete(&self) -> bool {
        self.mismatched == 0 && self.rows == self.expected_rows
    }
}

/// Walks `table_name` in id order and checks every row against the `1..row_count` derivation.
///
/// # Errors
///
/// On SQLite failures, including a missing table.
pub fn verify_items(
    connection: &Connection,
    table_name: &str,
    row_count: u64,
) -> Result<VerifyReport, sqlite::Error> {
    let mut report = VerifyReport {
        expected_rows: row_count.saturating_sub(1),
        ..VerifyReport::default()
    };

    let mut statement =
        connection.prepare(format!("SELECT id, first, last FROM {table_name} ORDER BY id"))?;

    let mut expected_index = 1u64;
    while statement.next()? == State::Row {
        let id = statement.read::<i64, _>(0)?;
        let first = statement.read::<Option<String>, _>(1)?;
        let last = statement.read::<Option<String>, _>(2)?;

        let matches = u64::try_from(id).is_ok_and(|id| id == expected_index)
            && first.as_deref() == Some(first_name(expected_index).as_str())
            && last.as_deref() == Some(last_name(expected_index).as_str());

        if !matches {
            debug!("Mismatch at id {id}, expected {expected_index}");
            report.mismatched += 1;
            report.first_mismatch.get_or_insert(id);
        }

        report.rows += 1;
        expected_index += 1;
    }

    Ok(report)
}

#[cfg(test)]
mod test {
    use super::*;
    use crate::{database::create_tables, schema::items_schema};

    fn items_connection() -> Connection {
        let connection = sqlite::open(":memory:").unwrap();
        create_tables(&connection, &[items_schema()]).unwrap();
        connection
    }

    #[test]
    fn test_verify_complete_table() {
        let connection = items_connection();
        connection
            .execute(
                "INSERT INTO items (id, first, last) VALUES
                    (1, 'First 1', 'Last 1'),
                    (2, 'First 2', 'Last 2'),
                    (3, 'First 3', 'Last 3');",
            )
            .unwrap();

        let report = verify_items(&connection, "items", 4).unwrap();

        assert_eq!(3, report.rows);
        assert_eq!(3, report.expected_rows);
        assert_eq!(0, report.mismatched);
        assert!(report.is_complete());
    }

    #[test]
    fn test_verify_detects_mismatch_and_gap() {
        let connection = items_connection();
        connection
            .execute(
                "INSERT INTO items (id, first, last) VALUES
                    (1, 'First 1', 'Last 1'),
                    (2, 'First 2', 'Wrong'),
                    (4, 'First 4', 'Last 4');",
            )
            .unwrap();

        let report = verify_items(&connection, "items", 5).unwrap();

        assert_eq!(3, report.rows);
        assert_eq!(4, report.expected_rows);
        assert_eq!(2, report.mismatched);
        assert_eq!(Some(2), report.first_mismatch);
        assert!(!report.is_complete());
    }

    #[test]
    fn test_verify_missing_table_fails() {
        let connection = sqlite::open(":memory:").unwrap();
        assert!(verify_items(&connection, "items", 10).is_err());
    }
}
