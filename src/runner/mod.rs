// ABOUTME: External command execution behind a trait.
// ABOUTME: Production runs real processes; tests swap in a scripted runner.

mod command;
mod error;
mod process;
mod scripted;

pub use command::{CommandOutput, CommandSpec};
pub use error::CommandError;
pub use process::ProcessRunner;
pub use scripted::ScriptedRunner;

use async_trait::async_trait;

/// Runs one external command to completion.
///
/// A non-zero exit is not an error at this layer: callers decide how much a
/// failure matters (see `provision::Tolerance`).
#[async_trait]
pub trait CommandRunner: Send + Sync {
    async fn run(&self, cmd: &CommandSpec) -> Result<CommandOutput, CommandError>;
}
