//! Core contracts for schemaguard.
//!
//! This crate defines the schema model consumed by the policy evaluator,
//! along with consistency validation and the shared error type.

pub mod constraints;
pub mod error;
pub mod schema;
pub mod validation;

pub use constraints::{CheckConstraint, Constraint, ForeignKey, Index, PrimaryKey, UniqueConstraint};
pub use error::{Error, Result};
pub use schema::{Column, DatabaseSchema, Schema, Table};
pub use validation::validate_schema;

/// Current schema contract version for `schema.json` artifacts.
pub const SCHEMA_VERSION: &str = "0.1";
