// ABOUTME: Completion summary and post-setup reminders.
// ABOUTME: Built from what the provisioner actually did during the run.

use std::path::PathBuf;

use super::certificate::CertificateStatus;
use super::engine::{EngineCapability, EngineInfo};
use super::units::InstalledUnits;
use crate::output::Output;
use crate::types::{PortMapping, UnitName};

/// Everything a successful run did.
#[derive(Debug, Clone)]
pub struct Report {
    pub certificate: CertificateStatus,
    pub cert_bundle: PathBuf,
    pub engine: EngineInfo,
    /// Ports published on a manually created pod, or those declared for Quadlet.
    pub published: Vec<PortMapping>,
    pub units: InstalledUnits,
    pub service: UnitName,
    pub env_file: PathBuf,
}

impl Report {
    /// Local URL of the application, from the first port with a fixed host port.
    pub fn app_url(&self) -> Option<String> {
        self.published
            .iter()
            .find_map(PortMapping::host_port)
            .map(|port| format!("http://localhost:{port}"))
    }

    pub fn reminders(&self) -> Vec<String> {
        let service = self.service.service_unit();
        let mut reminders = Vec::new();

        if self.certificate == CertificateStatus::Missing {
            reminders.push(format!(
                "Provide a PKCS#12 signing certificate at {}",
                self.cert_bundle.display()
            ));
        }
        reminders.push(format!(
            "Review application settings in {}",
            self.env_file.display()
        ));
        reminders.push(format!("Check status: systemctl --user status {service}"));
        reminders.push(format!("Follow logs: journalctl --user -u {service} -f"));
        reminders.push(
            "Keep services running after logout: loginctl enable-linger $USER".to_string(),
        );
        reminders
    }

    pub fn print(&self, output: &Output) {
        output.detail("");
        output.detail(&format!(
            "Certificate:  {} ({})",
            self.cert_bundle.display(),
            self.certificate
        ));
        output.detail(&format!(
            "Engine:       {} ({})",
            self.engine.version, self.engine.capability
        ));
        if self.engine.capability == EngineCapability::ManualPod {
            let ports: Vec<&str> = self.published.iter().map(PortMapping::as_str).collect();
            output.detail(&format!("Pod ports:    {}", ports.join(", ")));
        }
        output.detail(&format!("Pod unit:     {}", self.units.pod_unit.display()));
        output.detail(&format!(
            "Container:    {}",
            self.units.container_unit.display()
        ));
        output.detail(&format!("Service:      {}", self.service.service_unit()));
        if let Some(url) = self.app_url() {
            output.detail(&format!("URL:          {url}"));
        }

        output.detail("");
        output.detail("Next steps:");
        for reminder in self.reminders() {
            output.detail(&format!("  - {reminder}"));
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::types::EngineVersion;

    fn report(certificate: CertificateStatus) -> Report {
        Report {
            certificate,
            cert_bundle: PathBuf::from("/srv/v/cert.p12"),
            engine: EngineInfo {
                version: EngineVersion::new(4, 9),
                capability: EngineCapability::ManualPod,
            },
            published: vec![
                PortMapping::parse("127.0.0.1::9000").unwrap(),
                PortMapping::parse("8084:3000").unwrap(),
            ],
            units: InstalledUnits {
                pod_unit: PathBuf::from("/c/documenso.pod"),
                container_unit: PathBuf::from("/c/documenso.container"),
            },
            service: UnitName::new("documenso").unwrap(),
            env_file: PathBuf::from("/srv/documenso.env"),
        }
    }

    #[test]
    fn url_uses_first_fixed_host_port() {
        assert_eq!(
            report(CertificateStatus::Existing).app_url().as_deref(),
            Some("http://localhost:8084")
        );
    }

    #[test]
    fn missing_certificate_comes_first() {
        let reminders = report(CertificateStatus::Missing).reminders();
        assert!(reminders[0].contains("/srv/v/cert.p12"));
    }

    #[test]
    fn existing_certificate_has_no_reminder() {
        let reminders = report(CertificateStatus::Generated).reminders();
        assert!(!reminders.iter().any(|r| r.contains("PKCS#12")));
    }
}
