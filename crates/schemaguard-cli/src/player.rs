use std::path::Path;
use std::process::Command;

use schemaguard_altercheck::{PlayerError, PreviousPlayer};

/// Replays the previous schema by running an external program.
///
/// The previous directory is appended as the last argument. A non-zero exit
/// status is a replay failure.
#[derive(Debug, Clone)]
pub struct CommandPlayer {
    program: String,
    args: Vec<String>,
}

impl CommandPlayer {
    pub fn new(program: impl Into<String>, args: Vec<String>) -> Self {
        Self {
            program: program.into(),
            args,
        }
    }
}

impl PreviousPlayer for CommandPlayer {
    fn play_previous(&self, previous_dir: &Path) -> Result<(), PlayerError> {
        tracing::info!(
            event = "player_started",
            program = %self.program,
            dir = %previous_dir.display()
        );
        let status = Command::new(&self.program)
            .args(&self.args)
            .arg(previous_dir)
            .status()
            .map_err(|err| format!("failed to run the player '{}': {err}", self.program))?;

        if !status.success() {
            return Err(format!("the player '{}' exited with {status}", self.program).into());
        }
        tracing::info!(event = "player_finished", program = %self.program);
        Ok(())
    }
}
