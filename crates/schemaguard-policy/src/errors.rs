use std::fmt;

use thiserror::Error;

/// Where an unrecognized keyword appeared inside a statement.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum TokenPosition {
    IfItem,
    ThenItem,
    ThenClause,
}

impl fmt::Display for TokenPosition {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let label = match self {
            TokenPosition::IfItem => "if-item",
            TokenPosition::ThenItem => "then-item",
            TokenPosition::ThenClause => "then-clause",
        };
        f.write_str(label)
    }
}

/// Policy configuration errors.
///
/// Schema violations are not errors; they are collected in a
/// [`crate::PolicyReport`]. These variants abort the check run.
#[derive(Debug, Error)]
pub enum PolicyError {
    #[error("malformed policy statement '{statement}': {reason}")]
    MalformedStatement { statement: String, reason: String },
    #[error("unknown {position} '{token}' in policy statement '{statement}'")]
    UnknownRuleToken {
        statement: String,
        token: String,
        position: TokenPosition,
    },
    #[error("toml decode error: {0}")]
    Config(#[from] toml::de::Error),
    #[error("io error: {0}")]
    Io(#[from] std::io::Error),
}

impl PolicyError {
    pub(crate) fn malformed(statement: &str, reason: impl Into<String>) -> Self {
        PolicyError::MalformedStatement {
            statement: statement.to_string(),
            reason: reason.into(),
        }
    }

    pub(crate) fn unknown(statement: &str, token: &str, position: TokenPosition) -> Self {
        PolicyError::UnknownRuleToken {
            statement: statement.to_string(),
            token: token.to_string(),
            position,
        }
    }
}

/// Result type for policy operations.
pub type Result<T> = std::result::Result<T, PolicyError>;
