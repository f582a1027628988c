use schemaguard_core::{Column, Table};

use crate::clause::{Statement, has_assertion, split_assertion};
use crate::errors::{PolicyError, Result, TokenPosition};
use crate::hint::Hint;
use crate::report::PolicyViolation;
use crate::table::lookup;

/// Column attribute inspected by an if-clause.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ColumnIfItem {
    TableName,
    ColumnName,
    Alias,
    DbType,
    Size,
}

impl ColumnIfItem {
    pub fn parse(token: &str) -> Option<Self> {
        const ITEMS: [(&str, ColumnIfItem); 5] = [
            ("tableName", ColumnIfItem::TableName),
            ("columnName", ColumnIfItem::ColumnName),
            ("alias", ColumnIfItem::Alias),
            ("dbType", ColumnIfItem::DbType),
            ("size", ColumnIfItem::Size),
        ];
        lookup(&ITEMS, token)
    }
}

/// Column attribute asserted by a `<item> is <value>` then-clause.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ColumnThenItem {
    ColumnName,
    Alias,
    DbType,
    Size,
    Comment,
    Default,
}

impl ColumnThenItem {
    pub fn parse(token: &str) -> Option<Self> {
        const ITEMS: [(&str, ColumnThenItem); 6] = [
            ("columnName", ColumnThenItem::ColumnName),
            ("alias", ColumnThenItem::Alias),
            ("dbType", ColumnThenItem::DbType),
            ("size", ColumnThenItem::Size),
            ("comment", ColumnThenItem::Comment),
            ("default", ColumnThenItem::Default),
        ];
        lookup(&ITEMS, token)
    }

    fn code(self) -> &'static str {
        match self {
            ColumnThenItem::ColumnName => "column_name",
            ColumnThenItem::Alias => "column_alias",
            ColumnThenItem::DbType => "column_db_type",
            ColumnThenItem::Size => "column_size",
            ColumnThenItem::Comment => "column_comment",
            ColumnThenItem::Default => "column_default",
        }
    }

    fn property(self) -> &'static str {
        match self {
            ColumnThenItem::ColumnName => "column name",
            ColumnThenItem::Alias => "column alias",
            ColumnThenItem::DbType => "column DB type",
            ColumnThenItem::Size => "column size",
            ColumnThenItem::Comment => "column comment",
            ColumnThenItem::Default => "column default value",
        }
    }

    /// Value to assert, or `None` when the item does not apply.
    ///
    /// Alias, comment and default are only asserted when declared.
    fn actual(self, column: &Column) -> Option<Option<&str>> {
        match self {
            ColumnThenItem::ColumnName => Some(Some(column.name.as_str())),
            ColumnThenItem::DbType => Some(Some(column.db_type.as_str())),
            ColumnThenItem::Size => Some(column.size.as_deref()),
            ColumnThenItem::Alias => column.alias.as_deref().map(Some),
            ColumnThenItem::Comment => column.comment.as_deref().map(Some),
            ColumnThenItem::Default => column.default.as_deref().map(Some),
        }
    }
}

/// Consequence of a column statement whose condition holds.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ColumnThenClause {
    Bad,
    NotNull,
    Assert { item: ColumnThenItem, expected: Hint },
}

impl ColumnThenClause {
    fn parse(statement: &Statement) -> Result<Self> {
        let clause = statement.then_clause();
        if clause.eq_ignore_ascii_case("bad") {
            return Ok(ColumnThenClause::Bad);
        }
        if clause.eq_ignore_ascii_case("notNull") {
            return Ok(ColumnThenClause::NotNull);
        }
        if has_assertion(clause) {
            let (token, expected) = split_assertion(clause).ok_or_else(|| {
                PolicyError::unknown(statement.raw(), clause, TokenPosition::ThenClause)
            })?;
            let item = ColumnThenItem::parse(token).ok_or_else(|| {
                PolicyError::unknown(statement.raw(), token, TokenPosition::ThenItem)
            })?;
            return Ok(ColumnThenClause::Assert { item, expected });
        }
        Err(PolicyError::unknown(
            statement.raw(),
            clause,
            TokenPosition::ThenClause,
        ))
    }
}

/// A compiled column statement.
#[derive(Debug, Clone)]
pub struct ColumnStatement {
    statement: Statement,
    if_item: ColumnIfItem,
    then_clause: ColumnThenClause,
}

impl ColumnStatement {
    pub fn parse(raw: &str) -> Result<Self> {
        let statement = Statement::parse(raw)?;
        let if_item = ColumnIfItem::parse(statement.if_item()).ok_or_else(|| {
            PolicyError::unknown(statement.raw(), statement.if_item(), TokenPosition::IfItem)
        })?;
        let then_clause = ColumnThenClause::parse(&statement)?;
        Ok(Self {
            statement,
            if_item,
            then_clause,
        })
    }

    pub fn statement(&self) -> &Statement {
        &self.statement
    }

    pub fn if_item(&self) -> ColumnIfItem {
        self.if_item
    }

    pub fn then_clause(&self) -> &ColumnThenClause {
        &self.then_clause
    }

    pub fn is_condition_met(&self, table: &Table, column: &Column) -> bool {
        let hint = self.statement.if_value();
        match self.if_item {
            ColumnIfItem::TableName => hint.is_hit(Some(&table.name)),
            ColumnIfItem::ColumnName => hint.is_hit(Some(&column.name)),
            ColumnIfItem::Alias => hint.is_hit(column.alias.as_deref()),
            ColumnIfItem::DbType => hint.is_hit(Some(&column.db_type)),
            ColumnIfItem::Size => hint.is_hit(column.size.as_deref()),
        }
    }

    pub fn evaluate(&self, table: &Table, column: &Column) -> Option<PolicyViolation> {
        if !self.is_condition_met(table, column) {
            return None;
        }
        let target = column_display(table, column);
        match &self.then_clause {
            ColumnThenClause::Bad => Some(PolicyViolation::new(
                "column_bad",
                target.clone(),
                format!("The column is no good: {target}"),
            )),
            ColumnThenClause::NotNull => column.is_nullable.then(|| {
                PolicyViolation::new(
                    "column_not_null",
                    target.clone(),
                    format!("The column should be not-null: {target}"),
                )
            }),
            ColumnThenClause::Assert { item, expected } => {
                let actual = item.actual(column)?;
                if expected.is_hit(actual) {
                    None
                } else {
                    Some(PolicyViolation::mismatch(
                        item.code(),
                        item.property(),
                        expected,
                        actual,
                        target,
                    ))
                }
            }
        }
    }
}

/// Display identifier: `TABLE.COLUMN` or `TABLE.COLUMN(alias)`.
fn column_display(table: &Table, column: &Column) -> String {
    match column.alias.as_deref() {
        Some(alias) if !alias.is_empty() => format!("{}.{}({})", table.name, column.name, alias),
        _ => format!("{}.{}", table.name, column.name),
    }
}

/// Compiled column statements, evaluated in configuration order.
#[derive(Debug, Clone, Default)]
pub struct ColumnPolicy {
    statements: Vec<ColumnStatement>,
}

impl ColumnPolicy {
    pub fn compile<S: AsRef<str>>(statements: &[S]) -> Result<Self> {
        let statements = statements
            .iter()
            .map(|statement| ColumnStatement::parse(statement.as_ref()))
            .collect::<Result<Vec<_>>>()?;
        Ok(Self { statements })
    }

    pub fn is_empty(&self) -> bool {
        self.statements.is_empty()
    }

    pub fn len(&self) -> usize {
        self.statements.len()
    }

    pub fn check(&self, table: &Table, column: &Column) -> Vec<PolicyViolation> {
        self.statements
            .iter()
            .filter_map(|statement| statement.evaluate(table, column))
            .collect()
    }
}

/// Evaluate raw statements against one column of a table.
pub fn check_column_statements<S: AsRef<str>>(
    table: &Table,
    column: &Column,
    statements: &[S],
) -> Result<Vec<PolicyViolation>> {
    Ok(ColumnPolicy::compile(statements)?.check(table, column))
}
