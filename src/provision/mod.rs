// ABOUTME: The provisioning procedure: certificate, pod, unit files, service start.
// ABOUTME: Runs each step to completion in order; tolerated failures land in Diagnostics.

mod certificate;
mod engine;
mod error;
mod exec;
mod pod;
mod preflight;
mod service;
mod summary;
mod units;

pub use certificate::{CertificateStatus, ensure_certificate, export_command, request_command};
pub use engine::{EngineCapability, EngineInfo, detect_engine_capability};
pub use error::{ProvisionError, ProvisionErrorKind};
pub use exec::{Outcome, Tolerance, execute};
pub use pod::{
    PodDefinition, PodDefinitionError, publish_args, reconcile_pod, resolve_publish_ports,
};
pub use preflight::preflight;
pub use service::reload_and_start;
pub use summary::Report;
pub use units::{
    InstalledUnits, Placeholder, Substitutions, TemplateError, UnitTemplate, install_units,
};

use snafu::ResultExt;

use crate::config::{Config, Layout};
use crate::diagnostics::Diagnostics;
use crate::output::Output;
use crate::runner::CommandRunner;

/// One provisioning run over a resolved layout.
pub struct Provisioner<'a, R: CommandRunner + ?Sized> {
    runner: &'a R,
    config: &'a Config,
    layout: &'a Layout,
}

impl<'a, R: CommandRunner + ?Sized> Provisioner<'a, R> {
    pub fn new(runner: &'a R, config: &'a Config, layout: &'a Layout) -> Self {
        Self {
            runner,
            config,
            layout,
        }
    }

    pub async fn run(
        &self,
        output: &Output,
        diag: &mut Diagnostics,
    ) -> Result<Report, ProvisionError> {
        let config = self.config;
        let layout = self.layout;

        preflight(layout)?;

        output.progress("  → Checking signing certificate...");
        let certificate = ensure_certificate(
            self.runner,
            &config.tools.openssl,
            &config.certificate,
            layout,
            diag,
        )
        .await?;

        output.progress("  → Detecting container engine...");
        let engine = detect_engine_capability(
            self.runner,
            &config.tools.engine,
            config.quadlet_min_major,
        )
        .await?;
        output.progress(&format!(
            "  → Found {} {} ({})",
            config.tools.engine, engine.version, engine.capability
        ));

        let published = match engine.capability {
            EngineCapability::ManualPod => {
                output.progress(&format!("  → Recreating pod {}...", config.pod));
                reconcile_pod(
                    self.runner,
                    &config.tools.engine,
                    &config.pod,
                    &layout.pod_definition,
                    &config.fallback_port,
                    diag,
                )
                .await?
            }
            EngineCapability::Quadlet => {
                output.progress("  → Pod will be created by systemd from the pod unit");
                declared_ports(layout)
            }
        };

        output.progress(&format!(
            "  → Installing unit files into {}...",
            layout.unit_dir.display()
        ));
        let values = Substitutions::for_layout(layout, &config.certificate).context(
            error::TemplateSnafu {
                path: &layout.container_definition,
            },
        )?;
        let units = install_units(layout, &values)?;

        output.progress(&format!(
            "  → Reloading systemd and starting {}...",
            config.service.service_unit()
        ));
        reload_and_start(self.runner, &config.tools.systemctl, &config.service).await?;

        Ok(Report {
            certificate,
            cert_bundle: layout.cert_bundle.clone(),
            engine,
            published,
            units,
            service: config.service.clone(),
            env_file: layout.env_file.clone(),
        })
    }
}

/// Ports declared in the pod unit, for the summary only. Quadlet validates the file itself.
fn declared_ports(layout: &Layout) -> Vec<crate::types::PortMapping> {
    match PodDefinition::load(&layout.pod_definition) {
        Ok(Some(def)) => def.publish,
        Ok(None) => Vec::new(),
        Err(e) => {
            tracing::debug!("could not read declared ports: {}", e);
            Vec::new()
        }
    }
}
