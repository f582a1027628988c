use std::path::Path;

use schemaguard_core::{DatabaseSchema, Table};
use serde::{Deserialize, Serialize};

use crate::column::ColumnPolicy;
use crate::errors::Result;
use crate::hint::Hint;
use crate::report::PolicyReport;
use crate::table::TablePolicy;

/// Statements configured for one entity kind.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct StatementSet {
    pub statements: Vec<String>,
}

/// Schema policy configuration, usually read from a `[policy]` TOML table.
///
/// ```toml
/// table_except = ["prefix:TMP_"]
///
/// [table]
/// statements = ["if tableName is suffix:_ID then bad"]
///
/// [column]
/// statements = ["if columnName is suffix:_FLG then notNull"]
/// ```
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct PolicyConfig {
    /// Hints of table names excluded from every check.
    pub table_except: Vec<String>,
    pub table: StatementSet,
    pub column: StatementSet,
}

impl PolicyConfig {
    pub fn from_toml_str(content: &str) -> Result<Self> {
        Ok(toml::from_str(content)?)
    }

    pub fn load(path: &Path) -> Result<Self> {
        let content = std::fs::read_to_string(path)?;
        Self::from_toml_str(&content)
    }
}

/// Compiled policy for a whole schema.
#[derive(Debug, Clone, Default)]
pub struct SchemaPolicy {
    table_except: Vec<Hint>,
    table: TablePolicy,
    column: ColumnPolicy,
}

impl SchemaPolicy {
    pub fn compile(config: &PolicyConfig) -> Result<Self> {
        Ok(Self {
            table_except: config.table_except.iter().map(|hint| Hint::parse(hint)).collect(),
            table: TablePolicy::compile(config.table.statements.as_slice())?,
            column: ColumnPolicy::compile(config.column.statements.as_slice())?,
        })
    }

    pub fn is_target_table(&self, table: &Table) -> bool {
        !self
            .table_except
            .iter()
            .any(|hint| hint.is_hit(Some(&table.name)))
    }

    /// Check every target table: table statements first, then column
    /// statements for each column in declaration order.
    pub fn check(&self, schema: &DatabaseSchema) -> PolicyReport {
        let mut report = PolicyReport::default();
        for (db_schema, table) in schema.tables() {
            if !self.is_target_table(table) {
                tracing::debug!(
                    event = "policy_table_excepted",
                    schema = %db_schema.name,
                    table = %table.name
                );
                continue;
            }
            report.merge(self.check_table(table));
        }
        report
    }

    /// Violations for one table, safe to run per table on separate workers.
    pub fn check_table(&self, table: &Table) -> PolicyReport {
        let mut report = PolicyReport::default();
        report.extend(self.table.check(table));
        if self.column.is_empty() {
            return report;
        }
        for column in &table.columns {
            report.extend(self.column.check(table, column));
        }
        report
    }
}

/// Compile the configuration and check the whole schema.
pub fn check_schema_policy(schema: &DatabaseSchema, config: &PolicyConfig) -> Result<PolicyReport> {
    let policy = SchemaPolicy::compile(config)?;
    if policy.table.is_empty() && policy.column.is_empty() {
        tracing::warn!(event = "policy_statements_empty");
    }
    tracing::info!(
        event = "policy_check_started",
        table_statements = policy.table.len(),
        column_statements = policy.column.len()
    );

    let report = policy.check(schema);

    tracing::info!(event = "policy_check_finished", violations = report.len());
    Ok(report)
}
