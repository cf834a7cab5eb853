//! Runtime faults of the program loop itself.

use futures::task::SpawnError;
use thiserror::Error;

use crate::renderer::RenderError;

/// A failure of the loop, as opposed to an application error.
///
/// Application errors travel as [`Message::Error`](crate::Message::Error)
/// and are handled by `update`. A `ProgramError` ends the program and is
/// reported to the caller of [`Program::run`](crate::Program::run).
#[derive(Debug, Error)]
pub enum ProgramError {
    /// The initial view could not be rendered. `update` was never called.
    #[error("program failed to start: {0}")]
    Startup(#[source] RenderError),

    /// Rendering failed after startup.
    #[error("render failed: {0}")]
    Render(#[source] RenderError),

    /// The spawner refused a command or input task.
    #[error("failed to schedule task: {0}")]
    Spawn(#[from] SpawnError),
}

impl ProgramError {
    /// Non-zero status a hosting process should exit with.
    pub fn exit_code(&self) -> i32 {
        match self {
            ProgramError::Startup(_) => 2,
            ProgramError::Render(_) | ProgramError::Spawn(_) => 1,
        }
    }
}
