use serde::{Deserialize, Serialize};

use crate::constraints::{Constraint, ForeignKey, Index, PrimaryKey, UniqueConstraint};

/// Top-level schema snapshot for a database.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct DatabaseSchema {
    /// Contract version for this schema format.
    pub schema_version: String,
    /// Database engine identifier (e.g. `postgres`).
    pub engine: String,
    /// Database name when available.
    pub database: Option<String>,
    /// Schemas captured from the database.
    pub schemas: Vec<Schema>,
}

impl DatabaseSchema {
    /// Iterate over every table in schema order.
    pub fn tables(&self) -> impl Iterator<Item = (&Schema, &Table)> {
        self.schemas
            .iter()
            .flat_map(|schema| schema.tables.iter().map(move |table| (schema, table)))
    }

    /// Set `has_common_columns` on every table from its column list.
    ///
    /// Column names are compared case-insensitively. An empty list leaves
    /// every table flagged as carrying the common columns.
    pub fn apply_common_columns(&mut self, common_columns: &[String]) {
        for schema in &mut self.schemas {
            for table in &mut schema.tables {
                table.has_common_columns = common_columns
                    .iter()
                    .all(|name| table.column(name).is_some());
            }
        }
    }
}

/// A database namespace containing tables.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Schema {
    pub name: String,
    pub tables: Vec<Table>,
}

/// A table and the keys, indexes and columns declared on it.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Table {
    pub name: String,
    #[serde(default)]
    pub alias: Option<String>,
    #[serde(default)]
    pub comment: Option<String>,
    pub columns: Vec<Column>,
    #[serde(default)]
    pub constraints: Vec<Constraint>,
    #[serde(default)]
    pub indexes: Vec<Index>,
    /// Whether the table carries every common (audit) column of the schema.
    #[serde(default)]
    pub has_common_columns: bool,
}

impl Table {
    /// Display identifier used in reports: `NAME` or `NAME(alias)`.
    pub fn display_name(&self) -> String {
        match self.alias.as_deref() {
            Some(alias) if !alias.is_empty() => format!("{}({})", self.name, alias),
            _ => self.name.clone(),
        }
    }

    /// Look up a column by name, ignoring case.
    pub fn column(&self, name: &str) -> Option<&Column> {
        self.columns
            .iter()
            .find(|column| column.name.eq_ignore_ascii_case(name))
    }

    pub fn primary_key(&self) -> Option<&PrimaryKey> {
        self.constraints.iter().find_map(|constraint| match constraint {
            Constraint::PrimaryKey(pk) => Some(pk),
            _ => None,
        })
    }

    /// Columns of the primary key in key order.
    ///
    /// Key columns missing from the column list are skipped; run
    /// [`crate::validate_schema`] to reject such schemas up front.
    pub fn primary_key_columns(&self) -> Vec<&Column> {
        self.primary_key()
            .map(|pk| pk.columns.iter().filter_map(|name| self.column(name)).collect())
            .unwrap_or_default()
    }

    pub fn foreign_keys(&self) -> impl Iterator<Item = &ForeignKey> {
        self.constraints.iter().filter_map(|constraint| match constraint {
            Constraint::ForeignKey(fk) => Some(fk),
            _ => None,
        })
    }

    pub fn unique_constraints(&self) -> impl Iterator<Item = &UniqueConstraint> {
        self.constraints.iter().filter_map(|constraint| match constraint {
            Constraint::Unique(unique) => Some(unique),
            _ => None,
        })
    }
}

/// Column metadata for a table.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Column {
    pub name: String,
    #[serde(default)]
    pub alias: Option<String>,
    /// Database type name (e.g. `bigint`, `varchar`).
    pub db_type: String,
    /// Declared size such as `255` or `10, 2`.
    #[serde(default)]
    pub size: Option<String>,
    pub is_nullable: bool,
    #[serde(default)]
    pub default: Option<String>,
    #[serde(default)]
    pub comment: Option<String>,
}
