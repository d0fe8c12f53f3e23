// ABOUTME: Provisioning error types with SNAFU pattern.
// ABOUTME: Fatal failures of the setup procedure, classified for exit codes.

use std::path::PathBuf;

use snafu::Snafu;

use super::pod::PodDefinitionError;
use super::units::TemplateError;
use crate::runner::CommandError;
use crate::types::VersionParseError;

/// A failure that stops provisioning.
#[derive(Debug, Snafu)]
#[snafu(visibility(pub))]
pub enum ProvisionError {
    #[snafu(display(
        "volume directory {} does not exist; create it before running setup",
        path.display()
    ))]
    VolumeDirMissing { path: PathBuf },

    #[snafu(display("{source}"))]
    Command { source: CommandError },

    #[snafu(display("cannot determine container engine version: {source}"))]
    EngineVersion { source: VersionParseError },

    #[snafu(display("failed to read {}: {source}", path.display()))]
    ReadDefinition {
        path: PathBuf,
        source: std::io::Error,
    },

    #[snafu(display("invalid pod definition {}: {source}", path.display()))]
    PodDefinition {
        path: PathBuf,
        source: PodDefinitionError,
    },

    #[snafu(display("pod '{pod}' still exists after teardown; refusing to recreate it"))]
    PodTeardown { pod: String },

    #[snafu(display("invalid container definition {}: {source}", path.display()))]
    Template { path: PathBuf, source: TemplateError },

    #[snafu(display("failed to install {}: {source}", path.display()))]
    Install {
        path: PathBuf,
        source: std::io::Error,
    },
}

/// Error kind for programmatic handling.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ProvisionErrorKind {
    /// The volume directory is missing.
    Precondition,
    /// An external command failed where failure is not tolerated.
    CommandFailed,
    /// The engine reported a version string without major.minor.
    UnrecognizedEngineVersion,
    /// A unit definition file could not be read or is malformed.
    Definition,
    /// An existing pod survived teardown.
    Reconciliation,
    /// Installing unit files failed.
    Install,
}

impl ProvisionError {
    /// Returns the error kind for programmatic handling.
    pub fn kind(&self) -> ProvisionErrorKind {
        match self {
            ProvisionError::VolumeDirMissing { .. } => ProvisionErrorKind::Precondition,
            ProvisionError::Command { .. } => ProvisionErrorKind::CommandFailed,
            ProvisionError::EngineVersion { .. } => ProvisionErrorKind::UnrecognizedEngineVersion,
            ProvisionError::ReadDefinition { .. }
            | ProvisionError::PodDefinition { .. }
            | ProvisionError::Template { .. } => ProvisionErrorKind::Definition,
            ProvisionError::PodTeardown { .. } => ProvisionErrorKind::Reconciliation,
            ProvisionError::Install { .. } => ProvisionErrorKind::Install,
        }
    }

    /// Process exit status: a failed command's own status, otherwise 1.
    pub fn exit_code(&self) -> i32 {
        match self {
            ProvisionError::Command { source } => source
                .exit_code()
                .filter(|code| (1..=255).contains(code))
                .unwrap_or(1),
            _ => 1,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn command_failure_passes_exit_status_through() {
        let err = ProvisionError::Command {
            source: CommandError::Failed {
                command: "systemctl --user start documenso.service".to_string(),
                exit_code: Some(5),
                stderr: "Unit documenso.service not found.".to_string(),
            },
        };
        assert_eq!(err.kind(), ProvisionErrorKind::CommandFailed);
        assert_eq!(err.exit_code(), 5);
    }

    #[test]
    fn killed_command_exits_with_one() {
        let err = ProvisionError::Command {
            source: CommandError::Failed {
                command: "podman pod create".to_string(),
                exit_code: None,
                stderr: String::new(),
            },
        };
        assert_eq!(err.exit_code(), 1);
    }

    #[test]
    fn teardown_failure_exits_with_one() {
        let err = ProvisionError::PodTeardown {
            pod: "documenso".to_string(),
        };
        assert_eq!(err.kind(), ProvisionErrorKind::Reconciliation);
        assert_eq!(err.exit_code(), 1);
        assert!(err.to_string().contains("documenso"));
    }
}
