//! Previous-schema checkpoints for the alter-check workflow.
//!
//! The agent keeps no state of its own: archives, extracted files and the
//! NG/OK markers on disk are the state, read again on every call.

pub mod agent;
pub mod archive;
pub mod control;
pub mod errors;
pub mod layout;
pub mod player;

pub use agent::{PreviousDbAgent, ROLLBACK_FAILURE_NOTICE};
pub use errors::{AlterCheckError, AlterCheckResult, PlayerError};
pub use layout::{AlterCheckSettings, MigrationLayout};
pub use player::PreviousPlayer;
