use std::path::Path;

use crate::errors::PlayerError;

/// Replays a schema from the files of a directory.
///
/// Implementations run synchronously and return an error when the replay
/// fails; how the replay happens (DDL scripts, a database tool, ...) is up
/// to the implementation.
pub trait PreviousPlayer {
    fn play_previous(&self, previous_dir: &Path) -> Result<(), PlayerError>;
}

impl<F> PreviousPlayer for F
where
    F: Fn(&Path) -> Result<(), PlayerError>,
{
    fn play_previous(&self, previous_dir: &Path) -> Result<(), PlayerError> {
        self(previous_dir)
    }
}
