use std::io;

use thiserror::Error;

/// Error raised by a [`crate::PreviousPlayer`] implementation.
pub type PlayerError = Box<dyn std::error::Error + Send + Sync>;

/// Alter-check failures.
///
/// A missing previous archive is not an error; the agent reports it as
/// `Ok(false)` or `Ok(None)`.
#[derive(Debug, Error)]
pub enum AlterCheckError {
    #[error("{context}: {source}")]
    Io {
        context: String,
        #[source]
        source: io::Error,
    },
    #[error("failed to read the zip {archive}: {source}")]
    Zip {
        archive: String,
        #[source]
        source: zip::result::ZipError,
    },
    #[error("not found the files in the zip: {archive}")]
    EmptyArchive { archive: String },
    #[error("failed to play the previous schema: {0}")]
    Play(#[source] PlayerError),
    #[error("{notice}\n\n[Advice]\n{advice}")]
    RollbackFailure {
        notice: String,
        advice: String,
        #[source]
        source: Box<AlterCheckError>,
    },
}

impl AlterCheckError {
    pub(crate) fn io(context: impl Into<String>, source: io::Error) -> Self {
        AlterCheckError::Io {
            context: context.into(),
            source,
        }
    }
}

/// Result type for alter-check operations.
pub type AlterCheckResult<T> = Result<T, AlterCheckError>;
