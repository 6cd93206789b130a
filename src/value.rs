use serde::{Deserialize, Serialize};
use sqlite::Statement;

use crate::common::LoadError;

/// How the `id` column value is handed to SQLite.
///
/// `Text` binds the decimal string of the row index and lets the column's INTEGER affinity
/// convert it, `Integer` binds the native integer. Both end up as the same stored rowid.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum IdBinding {
    #[default]
    Text,
    Integer,
}

#[derive(Debug, PartialEq, Eq, Clone)]
pub enum Value {
    Integer(i64),
    Text(String),
}

impl Value {
    /// # Errors
    ///
    /// When SQLite refuses the binding (bad index, finalized statement).
    pub fn bind_to(&self, statement: &mut Statement<'_>, index: usize) -> Result<(), sqlite::Error> {
        match self {
            Self::Integer(v) => statement.bind((index, *v)),
            Self::Text(v) => statement.bind((index, v.as_str())),
        }
    }
}

/// One synthetic `items` row, fully determined by its index.
#[derive(Debug, PartialEq, Eq, Clone)]
pub struct ItemRow {
    pub index: u64,
    pub id: Value,
    pub first: String,
    pub last: String,
}

impl ItemRow {
    /// # Errors
    ///
    /// When the index does not fit a signed 64 bit SQLite integer.
    pub fn new(index: u64, id_binding: IdBinding) -> Result<Self, LoadError> {
        let id = match id_binding {
            IdBinding::Text => Value::Text(index.to_string()),
            IdBinding::Integer => Value::Integer(
                i64::try_from(index).map_err(|_| LoadError::IndexOutOfRange(index))?,
            ),
        };

        Ok(Self {
            index,
            id,
            first: first_name(index),
            last: last_name(index),
        })
    }

    /// Binds `(id, first, last)` to parameters 1..=3.
    ///
    /// # Errors
    ///
    /// When SQLite refuses any of the bindings.
    pub fn bind_to(&self, statement: &mut Statement<'_>) -> Result<(), sqlite::Error> {
        self.id.bind_to(statement, 1)?;
        statement.bind((2, self.first.as_str()))?;
        statement.bind((3, self.last.as_str()))?;
        Ok(())
    }
}

#[must_use]
pub fn first_name(index: u64) -> String {
    format!("First {index}")
}

#[must_use]
pub fn last_name(index: u64) -> String {
    format!("Last {index}")
}

#[cfg(test)]
mod test {
    use super::*;

    #[test]
    fn test_item_row_derivation() {
        let row = ItemRow::new(42, IdBinding::Text).unwrap();

        assert_eq!(42, row.index);
        assert_eq!(Value::Text("42".into()), row.id);
        assert_eq!("First 42", row.first);
        assert_eq!("Last 42", row.last);
    }

    #[test]
    fn test_item_row_integer_binding() {
        let row = ItemRow::new(999_999, IdBinding::Integer).unwrap();

        assert_eq!(Value::Integer(999_999), row.id);
        assert_eq!("First 999999", row.first);
        assert_eq!("Last 999999", row.last);
    }

    #[test]
    fn test_item_row_index_out_of_range() {
        assert!(matches!(
            ItemRow::new(u64::MAX, IdBinding::Integer),
            Err(LoadError::IndexOutOfRange(u64::MAX))
        ));
        assert!(ItemRow::new(u64::MAX, IdBinding::Text).is_ok());
    }

    #[test]
    fn test_id_binding_from_json() {
        assert_eq!(
            IdBinding::Integer,
            serde_json::from_str::<IdBinding>("\"integer\"").unwrap()
        );
        assert_eq!(
            IdBinding::Text,
            serde_json::from_str::<IdBinding>("\"text\"").unwrap()
        );
        assert_eq!(IdBinding::Text, IdBinding::default());
    }
}
