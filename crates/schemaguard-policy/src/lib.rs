//! Schema policy evaluation.
//!
//! Policies are written as statements of the form
//! `if <item> is <hint> then <clause>` and evaluated against the schema
//! model from `schemaguard-core`. Matching statements either report a
//! violation outright (`bad`), run a structural check, or assert that an
//! attribute matches another hint.

pub mod clause;
pub mod column;
pub mod errors;
pub mod hint;
pub mod policy;
pub mod report;
pub mod table;

pub use clause::{Statement, split_assertion};
pub use column::{ColumnIfItem, ColumnPolicy, ColumnStatement, ColumnThenClause, ColumnThenItem, check_column_statements};
pub use errors::{PolicyError, Result, TokenPosition};
pub use hint::{Hint, HintKind};
pub use policy::{PolicyConfig, SchemaPolicy, StatementSet, check_schema_policy};
pub use report::{PolicyReport, PolicyViolation};
pub use table::{TableIfItem, TablePolicy, TableStatement, TableThenClause, TableThenItem, check_table_statements};
