// ABOUTME: Container engine version gate.
// ABOUTME: Decides between Quadlet-managed pods and manual pod management.

use std::fmt;

use snafu::ResultExt;

use super::ProvisionError;
use super::error::EngineVersionSnafu;
use super::exec::{Tolerance, execute};
use crate::runner::{CommandRunner, CommandSpec};
use crate::types::EngineVersion;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum EngineCapability {
    /// systemd materializes the pod from the `.pod` unit.
    Quadlet,
    /// The engine predates `.pod` units; the pod is created by hand.
    ManualPod,
}

impl EngineCapability {
    pub fn for_version(version: EngineVersion, quadlet_min_major: u32) -> Self {
        if version.major < quadlet_min_major {
            EngineCapability::ManualPod
        } else {
            EngineCapability::Quadlet
        }
    }
}

impl fmt::Display for EngineCapability {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            EngineCapability::Quadlet => write!(f, "quadlet pod unit"),
            EngineCapability::ManualPod => write!(f, "manual pod management"),
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct EngineInfo {
    pub version: EngineVersion,
    pub capability: EngineCapability,
}

/// Run `<engine> --version` and classify the result.
///
/// The command must succeed, and its output must contain a `major.minor`
/// token; either failure stops provisioning.
pub async fn detect_engine_capability<R>(
    runner: &R,
    engine: &str,
    quadlet_min_major: u32,
) -> Result<EngineInfo, ProvisionError>
where
    R: CommandRunner + ?Sized,
{
    let version_cmd = CommandSpec::new(engine).arg("--version");
    let outcome = execute(runner, version_cmd, Tolerance::Fatal).await?;
    let version = EngineVersion::parse(outcome.stdout()).context(EngineVersionSnafu)?;
    let capability = EngineCapability::for_version(version, quadlet_min_major);

    tracing::info!("{} {} detected, using {}", engine, version, capability);
    Ok(EngineInfo {
        version,
        capability,
    })
}
