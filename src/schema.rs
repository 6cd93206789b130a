use indexmap::IndexMap;
use serde::{Deserialize, Serialize};

use crate::common::is_identifier;

#[derive(Debug, PartialEq, Eq, thiserror::Error)]
pub enum SchemaError {
    #[error("{0:?} is not a valid identifier")]
    InvalidIdentifier(String),

    #[error("Table {0} has no columns")]
    NoColumns(String),

    #[error("Unknown constraint {token:?} on column {table}.{column}")]
    UnknownConstraint {
        table: String,
        column: String,
        token: String,
    },

    #[error("Table {0} declares more than one primary key")]
    MultiplePrimaryKeys(String),
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "UPPERCASE")]
pub enum ColumnType {
    Integer,
    Text,
    Real,
    Blob,
}

impl ColumnType {
    #[must_use]
    pub const fn sql_name(self) -> &'static str {
        match self {
            Self::Integer => "INTEGER",
            Self::Text => "TEXT",
            Self::Real => "REAL",
            Self::Blob => "BLOB",
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Constraint {
    PrimaryKey,
    NotNull,
    Unique,
}

impl Constraint {
    /// Parses a constraint token, ignoring case and extra whitespace.
    /// `PRIMARY_KEY` and friends are not constraints SQLite knows about, so they yield `None`.
    #[must_use]
    pub fn parse(token: &str) -> Option<Self> {
        let normalized = token
            .split_whitespace()
            .map(str::to_ascii_uppercase)
            .collect::<Vec<_>>()
            .join(" ");

        match normalized.as_str() {
            "PRIMARY KEY" => Some(Self::PrimaryKey),
            "NOT NULL" => Some(Self::NotNull),
            "UNIQUE" => Some(Self::Unique),
            _ => None,
        }
    }

    #[must_use]
    pub const fn sql(self) -> &'static str {
        match self {
            Self::PrimaryKey => "PRIMARY KEY",
            Self::NotNull => "NOT NULL",
            Self::Unique => "UNIQUE",
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ColumnSchema {
    #[serde(rename = "type")]
    pub column_type: ColumnType,
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub constraints: Vec<String>,
}

impl ColumnSchema {
    #[must_use]
    pub const fn new(column_type: ColumnType) -> Self {
        Self {
            column_type,
            constraints: Vec::new(),
        }
    }

    #[must_use]
    pub fn with_constraint(mut self, token: &str) -> Self {
        self.constraints.push(token.to_string());
        self
    }

    fn parse_constraints(&self, table: &str, column: &str) -> Result<Vec<Constraint>, SchemaError> {
        self.constraints
            .iter()
            .map(|token| {
                Constraint::parse(token).ok_or_else(|| SchemaError::UnknownConstraint {
                    table: table.to_string(),
                    column: column.to_string(),
                    token: token.clone(),
                })
            })
            .collect()
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct TableSchema {
    pub name: String,
    pub columns: IndexMap<String, ColumnSchema>,
}

impl TableSchema {
    #[must_use]
    pub fn has_column(&self, column: &str) -> bool {
        self.columns.contains_key(column)
    }

    /// # Errors
    ///
    /// When a name is not a plain identifier, the table has no columns, a constraint token is
    /// unknown or more than one column is a primary key.
    pub fn validate(&self) -> Result<(), SchemaError> {
        self.parsed_columns().map(|_| ())
    }

    /// Renders the `CREATE TABLE` statement. Validates first, nothing malformed reaches SQLite.
    ///
    /// # Errors
    ///
    /// Same as [`TableSchema::validate`].
    pub fn create_table_sql(&self) -> Result<String, SchemaError> {
        let column_defs: Vec<String> = self
            .parsed_columns()?
            .into_iter()
            .map(|(column_name, column_type, constraints)| {
                let mut def = format!("    {column_name} {}", column_type.sql_name());
                for constraint in constraints {
                    def.push(' ');
                    def.push_str(constraint.sql());
                }
                def
            })
            .collect();

        Ok(format!(
            "CREATE TABLE {} (\n{}\n);",
            self.name,
            column_defs.join(",\n")
        ))
    }

    fn parsed_columns(&self) -> Result<Vec<(&str, ColumnType, Vec<Constraint>)>, SchemaError> {
        if !is_identifier(&self.name) {
            return Err(SchemaError::InvalidIdentifier(self.name.clone()));
        }
        if self.columns.is_empty() {
            return Err(SchemaError::NoColumns(self.name.clone()));
        }

        let mut primary_keys = 0usize;
        let mut out = Vec::with_capacity(self.columns.len());
        for (column_name, column_schema) in &self.columns {
            if !is_identifier(column_name) {
                return Err(SchemaError::InvalidIdentifier(column_name.clone()));
            }

            let constraints = column_schema.parse_constraints(&self.name, column_name)?;
            if constraints.contains(&Constraint::PrimaryKey) {
                primary_keys += 1;
            }
            out.push((column_name.as_str(), column_schema.column_type, constraints));
        }

        if primary_keys > 1 {
            return Err(SchemaError::MultiplePrimaryKeys(self.name.clone()));
        }

        Ok(out)
    }
}

/// The populated table: `items(id INTEGER PRIMARY KEY, first TEXT, last TEXT)`.
#[must_use]
pub fn items_schema() -> TableSchema {
    TableSchema {
        name: "items".into(),
        columns: IndexMap::from([
            (
                "id".into(),
                ColumnSchema::new(ColumnType::Integer).with_constraint("PRIMARY KEY"),
            ),
            ("first".into(), ColumnSchema::new(ColumnType::Text)),
            ("last".into(), ColumnSchema::new(ColumnType::Text)),
        ]),
    }
}

/// Declared alongside `items` and never written to.
#[must_use]
pub fn items2_schema() -> TableSchema {
    TableSchema {
        name: "items2".into(),
        columns: IndexMap::from([
            (
                "id".into(),
                ColumnSchema::new(ColumnType::Integer).with_constraint("PRIMARY KEY"),
            ),
            ("name".into(), ColumnSchema::new(ColumnType::Text)),
        ]),
    }
}

#[must_use]
pub fn default_tables() -> Vec<TableSchema> {
    vec![items_schema(), items2_schema()]
}
