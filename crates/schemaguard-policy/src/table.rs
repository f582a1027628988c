use schemaguard_core::Table;

use crate::clause::{Statement, has_assertion, split_assertion};
use crate::errors::{PolicyError, Result, TokenPosition};
use crate::hint::Hint;
use crate::report::PolicyViolation;

/// Table attribute inspected by an if-clause.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum TableIfItem {
    TableName,
    Alias,
    /// Satisfied when any primary key column has a matching DB type.
    PkDbType,
}

impl TableIfItem {
    pub fn parse(token: &str) -> Option<Self> {
        const ITEMS: [(&str, TableIfItem); 3] = [
            ("tableName", TableIfItem::TableName),
            ("alias", TableIfItem::Alias),
            ("pkDbType", TableIfItem::PkDbType),
        ];
        lookup(&ITEMS, token)
    }
}

/// Table attribute asserted by a `<item> is <value>` then-clause.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum TableThenItem {
    TableName,
    Alias,
    Comment,
    PkDbType,
    PkName,
    FkName,
    UniqueName,
    IndexName,
}

impl TableThenItem {
    pub fn parse(token: &str) -> Option<Self> {
        const ITEMS: [(&str, TableThenItem); 8] = [
            ("tableName", TableThenItem::TableName),
            ("alias", TableThenItem::Alias),
            ("comment", TableThenItem::Comment),
            ("pkDbType", TableThenItem::PkDbType),
            ("pkName", TableThenItem::PkName),
            ("fkName", TableThenItem::FkName),
            ("uniqueName", TableThenItem::UniqueName),
            ("indexName", TableThenItem::IndexName),
        ];
        lookup(&ITEMS, token)
    }

    fn code(self) -> &'static str {
        match self {
            TableThenItem::TableName => "table_name",
            TableThenItem::Alias => "table_alias",
            TableThenItem::Comment => "table_comment",
            TableThenItem::PkDbType => "table_pk_db_type",
            TableThenItem::PkName => "table_pk_name",
            TableThenItem::FkName => "table_fk_name",
            TableThenItem::UniqueName => "table_unique_name",
            TableThenItem::IndexName => "table_index_name",
        }
    }

    fn property(self) -> &'static str {
        match self {
            TableThenItem::TableName => "table name",
            TableThenItem::Alias => "table alias",
            TableThenItem::Comment => "table comment",
            TableThenItem::PkDbType => "PK column DB type",
            TableThenItem::PkName => "PK constraint name",
            TableThenItem::FkName => "FK constraint name",
            TableThenItem::UniqueName => "unique constraint name",
            TableThenItem::IndexName => "index name",
        }
    }
}

/// Consequence of a table statement whose condition holds.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum TableThenClause {
    /// Always a violation.
    Bad,
    /// Violation unless the table carries all common columns.
    HasCommonColumn,
    /// Every value of the item must satisfy the hint.
    Assert { item: TableThenItem, expected: Hint },
}

impl TableThenClause {
    fn parse(statement: &Statement) -> Result<Self> {
        let clause = statement.then_clause();
        if clause.eq_ignore_ascii_case("bad") {
            return Ok(TableThenClause::Bad);
        }
        if clause.contains("hasCommonColumn") {
            return Ok(TableThenClause::HasCommonColumn);
        }
        if has_assertion(clause) {
            let (token, expected) = split_assertion(clause).ok_or_else(|| {
                PolicyError::unknown(statement.raw(), clause, TokenPosition::ThenClause)
            })?;
            let item = TableThenItem::parse(token).ok_or_else(|| {
                PolicyError::unknown(statement.raw(), token, TokenPosition::ThenItem)
            })?;
            return Ok(TableThenClause::Assert { item, expected });
        }
        Err(PolicyError::unknown(
            statement.raw(),
            clause,
            TokenPosition::ThenClause,
        ))
    }
}

/// A compiled table statement.
#[derive(Debug, Clone)]
pub struct TableStatement {
    statement: Statement,
    if_item: TableIfItem,
    then_clause: TableThenClause,
}

impl TableStatement {
    /// Parse and compile a statement, rejecting unknown items up front.
    pub fn parse(raw: &str) -> Result<Self> {
        let statement = Statement::parse(raw)?;
        let if_item = TableIfItem::parse(statement.if_item()).ok_or_else(|| {
            PolicyError::unknown(statement.raw(), statement.if_item(), TokenPosition::IfItem)
        })?;
        let then_clause = TableThenClause::parse(&statement)?;
        Ok(Self {
            statement,
            if_item,
            then_clause,
        })
    }

    pub fn statement(&self) -> &Statement {
        &self.statement
    }

    pub fn if_item(&self) -> TableIfItem {
        self.if_item
    }

    pub fn then_clause(&self) -> &TableThenClause {
        &self.then_clause
    }

    /// Whether the if-clause holds for the table.
    pub fn is_condition_met(&self, table: &Table) -> bool {
        let hint = self.statement.if_value();
        match self.if_item {
            TableIfItem::TableName => hint.is_hit(Some(&table.name)),
            TableIfItem::Alias => hint.is_hit(table.alias.as_deref()),
            TableIfItem::PkDbType => table
                .primary_key_columns()
                .iter()
                .any(|pk| hint.is_hit(Some(&pk.db_type))),
        }
    }

    /// Evaluate the statement against one table.
    pub fn evaluate(&self, table: &Table) -> Vec<PolicyViolation> {
        if !self.is_condition_met(table) {
            return Vec::new();
        }
        match &self.then_clause {
            TableThenClause::Bad => vec![PolicyViolation::new(
                "table_bad",
                table.display_name(),
                format!("The table is no good: {}", table.display_name()),
            )],
            TableThenClause::HasCommonColumn => {
                if table.has_common_columns {
                    Vec::new()
                } else {
                    vec![PolicyViolation::new(
                        "table_common_column",
                        table.display_name(),
                        format!(
                            "The table should have common columns: {}",
                            table.display_name()
                        ),
                    )]
                }
            }
            TableThenClause::Assert { item, expected } => assert_item(table, *item, expected),
        }
    }
}

fn assert_item(table: &Table, item: TableThenItem, expected: &Hint) -> Vec<PolicyViolation> {
    let actuals: Vec<Option<&str>> = match item {
        TableThenItem::TableName => vec![Some(table.name.as_str())],
        TableThenItem::Alias => table.alias.as_deref().map(Some).into_iter().collect(),
        TableThenItem::Comment => table.comment.as_deref().map(Some).into_iter().collect(),
        TableThenItem::PkDbType => table
            .primary_key_columns()
            .into_iter()
            .map(|pk| Some(pk.db_type.as_str()))
            .collect(),
        // compound keys share one constraint name
        TableThenItem::PkName => table
            .primary_key()
            .map(|pk| pk.name.as_deref())
            .into_iter()
            .collect(),
        TableThenItem::FkName => table.foreign_keys().map(|fk| fk.name.as_deref()).collect(),
        TableThenItem::UniqueName => table
            .unique_constraints()
            .map(|unique| unique.name.as_deref())
            .collect(),
        TableThenItem::IndexName => table
            .indexes
            .iter()
            .map(|index| Some(index.name.as_str()))
            .collect(),
    };

    actuals
        .into_iter()
        .filter(|actual| !expected.is_hit(*actual))
        .map(|actual| {
            PolicyViolation::mismatch(
                item.code(),
                item.property(),
                expected,
                actual,
                table.display_name(),
            )
        })
        .collect()
}

/// Compiled table statements, evaluated in configuration order.
#[derive(Debug, Clone, Default)]
pub struct TablePolicy {
    statements: Vec<TableStatement>,
}

impl TablePolicy {
    /// Compile every statement; the first invalid one aborts compilation.
    pub fn compile<S: AsRef<str>>(statements: &[S]) -> Result<Self> {
        let statements = statements
            .iter()
            .map(|statement| TableStatement::parse(statement.as_ref()))
            .collect::<Result<Vec<_>>>()?;
        Ok(Self { statements })
    }

    pub fn is_empty(&self) -> bool {
        self.statements.is_empty()
    }

    pub fn len(&self) -> usize {
        self.statements.len()
    }

    pub fn check(&self, table: &Table) -> Vec<PolicyViolation> {
        self.statements
            .iter()
            .flat_map(|statement| statement.evaluate(table))
            .collect()
    }
}

/// Evaluate raw statements against one table.
///
/// Fails before evaluating anything when a statement is malformed or names
/// an unknown item, so a misconfigured run never reports partial results.
pub fn check_table_statements<S: AsRef<str>>(
    table: &Table,
    statements: &[S],
) -> Result<Vec<PolicyViolation>> {
    Ok(TablePolicy::compile(statements)?.check(table))
}

pub(crate) fn lookup<T: Copy>(items: &[(&str, T)], token: &str) -> Option<T> {
    items
        .iter()
        .find(|(name, _)| name.eq_ignore_ascii_case(token.trim()))
        .map(|(_, item)| *item)
}
