// ABOUTME: Manual pod management for engines without Quadlet pod units.
// ABOUTME: Reads PublishPort= lines, tears down any existing pod, then recreates it.

use std::io::ErrorKind;
use std::path::Path;

use snafu::{ResultExt, ensure};
use thiserror::Error;

use super::ProvisionError;
use super::error::{PodDefinitionSnafu, PodTeardownSnafu, ReadDefinitionSnafu};
use super::exec::{Tolerance, execute};
use crate::diagnostics::{Diagnostics, Warning};
use crate::runner::{CommandRunner, CommandSpec};
use crate::types::{PortMapping, PortMappingError, UnitName};

const PUBLISH_PORT_KEY: &str = "PublishPort=";

#[derive(Debug, Error, PartialEq, Eq)]
pub enum PodDefinitionError {
    #[error("line {line}: {source}")]
    InvalidPublishPort {
        line: usize,
        source: PortMappingError,
    },
}

/// The parts of a `.pod` unit that matter for manual pod creation.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct PodDefinition {
    pub publish: Vec<PortMapping>,
}

impl PodDefinition {
    /// Collect every `PublishPort=` value in file order.
    pub fn parse(text: &str) -> Result<Self, PodDefinitionError> {
        let mut publish = Vec::new();

        for (idx, line) in text.lines().enumerate() {
            let Some(value) = line.trim().strip_prefix(PUBLISH_PORT_KEY) else {
                continue;
            };
            let mapping = PortMapping::parse(value).map_err(|source| {
                PodDefinitionError::InvalidPublishPort {
                    line: idx + 1,
                    source,
                }
            })?;
            publish.push(mapping);
        }

        Ok(Self { publish })
    }

    /// Read and parse `path`; `None` when the file does not exist.
    pub fn load(path: &Path) -> Result<Option<Self>, ProvisionError> {
        let text = match std::fs::read_to_string(path) {
            Ok(text) => text,
            Err(e) if e.kind() == ErrorKind::NotFound => return Ok(None),
            Err(e) => return Err(e).context(ReadDefinitionSnafu { path }),
        };

        Self::parse(&text)
            .map(Some)
            .context(PodDefinitionSnafu { path })
    }
}

/// `--publish <mapping>` pairs, one per mapping, order preserved.
pub fn publish_args(ports: &[PortMapping]) -> Vec<String> {
    ports
        .iter()
        .flat_map(|p| ["--publish".to_string(), p.to_string()])
        .collect()
}

/// Ports to publish: the definition's, or `fallback` when it has none.
///
/// A definition without any `PublishPort=` lines is treated like a missing
/// file, so the pod is never created without a published port.
pub fn resolve_publish_ports(
    pod_definition: &Path,
    fallback: &PortMapping,
    diag: &mut Diagnostics,
) -> Result<Vec<PortMapping>, ProvisionError> {
    match PodDefinition::load(pod_definition)? {
        Some(def) if !def.publish.is_empty() => Ok(def.publish),
        Some(_) => {
            diag.warn(Warning::pod_definition(format!(
                "{} has no PublishPort= lines, publishing {}",
                pod_definition.display(),
                fallback
            )));
            Ok(vec![fallback.clone()])
        }
        None => {
            diag.warn(Warning::pod_definition(format!(
                "pod definition {} not found, publishing {}",
                pod_definition.display(),
                fallback
            )));
            Ok(vec![fallback.clone()])
        }
    }
}

/// Replace any pod named `pod` with a freshly created one.
///
/// Teardown steps tolerate failure, but the pod must be gone afterwards;
/// otherwise creation is not attempted.
pub async fn reconcile_pod<R>(
    runner: &R,
    engine: &str,
    pod: &UnitName,
    pod_definition: &Path,
    fallback: &PortMapping,
    diag: &mut Diagnostics,
) -> Result<Vec<PortMapping>, ProvisionError>
where
    R: CommandRunner + ?Sized,
{
    let ports = resolve_publish_ports(pod_definition, fallback, diag)?;

    if pod_exists(runner, engine, pod).await? {
        tracing::info!("removing existing pod {}", pod);
        teardown(runner, engine, pod).await?;
        ensure!(
            !pod_exists(runner, engine, pod).await?,
            PodTeardownSnafu {
                pod: pod.to_string()
            }
        );
    }

    let create = CommandSpec::new(engine)
        .args(["pod", "create", "--name", pod.as_str()])
        .args(publish_args(&ports));
    execute(runner, create, Tolerance::Fatal).await?;

    tracing::info!("created pod {}", pod);
    Ok(ports)
}

async fn pod_exists<R>(runner: &R, engine: &str, pod: &UnitName) -> Result<bool, ProvisionError>
where
    R: CommandRunner + ?Sized,
{
    let cmd = CommandSpec::new(engine).args(["pod", "exists", pod.as_str()]);
    Ok(execute(runner, cmd, Tolerance::Ignorable).await?.succeeded())
}

async fn teardown<R>(runner: &R, engine: &str, pod: &UnitName) -> Result<(), ProvisionError>
where
    R: CommandRunner + ?Sized,
{
    // May already be stopped.
    let stop = CommandSpec::new(engine).args(["pod", "stop", pod.as_str()]);
    execute(runner, stop, Tolerance::Ignorable).await?;

    let list = CommandSpec::new(engine)
        .args(["ps", "-a", "-q", "--filter"])
        .arg(format!("pod={pod}"));
    let listed = execute(runner, list, Tolerance::Ignorable).await?;

    for id in listed.stdout().lines().map(str::trim).filter(|l| !l.is_empty()) {
        let rm = CommandSpec::new(engine).args(["rm", "-f", id]);
        execute(runner, rm, Tolerance::Ignorable).await?;
    }

    let rm_pod = CommandSpec::new(engine).args(["pod", "rm", "-f", pod.as_str()]);
    execute(runner, rm_pod, Tolerance::Ignorable).await?;

    Ok(())
}
