// ABOUTME: Runs one external command under an explicit failure policy.
// ABOUTME: Each call site declares whether a failure is fatal, tolerated, or ignorable.

use crate::runner::{CommandError, CommandOutput, CommandRunner, CommandSpec};

use super::ProvisionError;

/// How much a failing command matters at a given call site.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Tolerance {
    /// Failure aborts provisioning.
    Fatal,
    /// Failure is reported to the user and provisioning continues.
    Tolerated,
    /// Failure is expected in some states; logged at debug level only.
    Ignorable,
}

/// Result of a non-fatal command.
#[derive(Debug)]
pub enum Outcome {
    Success(CommandOutput),
    Failure(CommandError),
}

impl Outcome {
    pub fn succeeded(&self) -> bool {
        matches!(self, Outcome::Success(_))
    }

    pub fn stdout(&self) -> &str {
        match self {
            Outcome::Success(out) => &out.stdout,
            Outcome::Failure(_) => "",
        }
    }
}

pub async fn execute<R>(
    runner: &R,
    cmd: CommandSpec,
    tolerance: Tolerance,
) -> Result<Outcome, ProvisionError>
where
    R: CommandRunner + ?Sized,
{
    let error = match runner.run(&cmd).await {
        Ok(out) if out.success() => return Ok(Outcome::Success(out)),
        Ok(out) => CommandError::Failed {
            command: cmd.to_string(),
            exit_code: out.exit_code,
            stderr: out.stderr_summary().to_string(),
        },
        Err(e) => e,
    };

    match tolerance {
        Tolerance::Fatal => Err(ProvisionError::Command { source: error }),
        Tolerance::Tolerated => Ok(Outcome::Failure(error)),
        Tolerance::Ignorable => {
            tracing::debug!("ignoring failure: {}", error);
            Ok(Outcome::Failure(error))
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::runner::ScriptedRunner;

    fn start() -> CommandSpec {
        CommandSpec::new("systemctl").args(["--user", "start", "documenso.service"])
    }

    #[tokio::test]
    async fn fatal_failure_is_an_error() {
        let runner = ScriptedRunner::new();
        runner.on("systemctl", &[], vec![CommandOutput::failed(4, "denied")]);

        let err = execute(&runner, start(), Tolerance::Fatal).await.unwrap_err();
        assert_eq!(err.exit_code(), 4);
    }

    #[tokio::test]
    async fn tolerated_failure_is_returned() {
        let runner = ScriptedRunner::new();
        runner.missing_program("systemctl");

        let outcome = execute(&runner, start(), Tolerance::Tolerated).await.unwrap();
        assert!(!outcome.succeeded());
        assert_eq!(outcome.stdout(), "");
    }

    #[tokio::test]
    async fn success_carries_output() {
        let runner = ScriptedRunner::new();
        runner.on("systemctl", &[], vec![CommandOutput::ok("done\n")]);

        let outcome = execute(&runner, start(), Tolerance::Fatal).await.unwrap();
        assert_eq!(outcome.stdout(), "done\n");
    }
}
