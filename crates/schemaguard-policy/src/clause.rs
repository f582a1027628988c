use std::fmt;
use std::str::FromStr;

use crate::errors::{PolicyError, Result};
use crate::hint::{Hint, strip_keyword};

const IF_KEYWORD: &str = "if ";
const IS_DELIMITER: &str = " is ";
const THEN_DELIMITER: &str = " then ";

/// A policy statement split into its if-item, if-value and then-clause.
///
/// e.g.
///  if tableName is suffix:_ID then bad
///  if tableName is suffix:_HISTORY then pkDbType is bigint
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Statement {
    raw: String,
    if_item: String,
    if_value: Hint,
    then_clause: String,
}

impl Statement {
    pub fn parse(statement: &str) -> Result<Self> {
        let trimmed = statement.trim();
        let rest = strip_keyword(trimmed, IF_KEYWORD)
            .ok_or_else(|| PolicyError::malformed(statement, "missing leading 'if'"))?;

        let (if_item, rest) = split_first(rest, IS_DELIMITER)
            .ok_or_else(|| PolicyError::malformed(statement, "missing 'is' after the if-item"))?;
        let (if_value, then_clause) = split_first(rest, THEN_DELIMITER)
            .ok_or_else(|| PolicyError::malformed(statement, "missing 'then' clause"))?;

        let (if_item, if_value, then_clause) = (if_item.trim(), if_value.trim(), then_clause.trim());
        if if_item.is_empty() || if_value.is_empty() || then_clause.is_empty() {
            return Err(PolicyError::malformed(statement, "empty if-item, if-value or then-clause"));
        }

        Ok(Self {
            raw: trimmed.to_string(),
            if_item: if_item.to_string(),
            if_value: Hint::parse(if_value),
            then_clause: then_clause.to_string(),
        })
    }

    /// The statement text as configured.
    pub fn raw(&self) -> &str {
        &self.raw
    }

    pub fn if_item(&self) -> &str {
        &self.if_item
    }

    pub fn if_value(&self) -> &Hint {
        &self.if_value
    }

    pub fn then_clause(&self) -> &str {
        &self.then_clause
    }
}

impl FromStr for Statement {
    type Err = PolicyError;

    fn from_str(s: &str) -> Result<Self> {
        Statement::parse(s)
    }
}

impl fmt::Display for Statement {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "if {} is {} then {}",
            self.if_item, self.if_value, self.then_clause
        )
    }
}

/// Split an `<item> is <value>` then-clause into the item and its hint.
pub fn split_assertion(clause: &str) -> Option<(&str, Hint)> {
    let (item, value) = split_first(clause, IS_DELIMITER)?;
    let item = item.trim();
    if item.is_empty() {
        return None;
    }
    Some((item, Hint::parse(value)))
}

/// Whether the clause contains an ` is ` delimiter, ignoring case.
pub(crate) fn has_assertion(clause: &str) -> bool {
    find_ignore_case(clause, IS_DELIMITER).is_some()
}

fn split_first<'a>(value: &'a str, delimiter: &str) -> Option<(&'a str, &'a str)> {
    let index = find_ignore_case(value, delimiter)?;
    Some((&value[..index], &value[index + delimiter.len()..]))
}

// ASCII lowercasing keeps byte offsets stable.
fn find_ignore_case(value: &str, needle: &str) -> Option<usize> {
    value
        .to_ascii_lowercase()
        .find(&needle.to_ascii_lowercase())
}
