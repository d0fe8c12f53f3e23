// ABOUTME: Ensures the PKCS#12 signing certificate exists in the volume directory.
// ABOUTME: Generates a self-signed RSA certificate with openssl when absent; failures only warn.

use std::fmt;
use std::fs;
use std::io::ErrorKind;
use std::os::unix::fs::PermissionsExt;
use std::path::Path;

use crate::config::{CertificateConfig, Layout};
use crate::diagnostics::{Diagnostics, Warning};
use crate::runner::{CommandRunner, CommandSpec};

use super::ProvisionError;
use super::exec::{Outcome, Tolerance, execute};

/// Mode applied to the bundle so the container user can read it.
pub const CERT_MODE: u32 = 0o644;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum CertificateStatus {
    /// The bundle was already present and was left alone.
    Existing,
    /// A new self-signed bundle was written.
    Generated,
    /// Generation failed; the operator has to provide the bundle.
    Missing,
}

impl fmt::Display for CertificateStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            CertificateStatus::Existing => write!(f, "existing"),
            CertificateStatus::Generated => write!(f, "generated (self-signed)"),
            CertificateStatus::Missing => write!(f, "missing"),
        }
    }
}

/// Create the certificate bundle if it does not exist yet.
///
/// Only an existing bundle suppresses generation, so repeated runs never
/// replace a certificate.
pub async fn ensure_certificate<R>(
    runner: &R,
    openssl: &str,
    cert: &CertificateConfig,
    layout: &Layout,
    diag: &mut Diagnostics,
) -> Result<CertificateStatus, ProvisionError>
where
    R: CommandRunner + ?Sized,
{
    let bundle = &layout.cert_bundle;

    let status = if bundle.exists() {
        tracing::info!("certificate bundle present: {}", bundle.display());
        CertificateStatus::Existing
    } else {
        tracing::info!("generating self-signed certificate: {}", bundle.display());
        generate(runner, openssl, cert, layout, diag).await?;

        if bundle.exists() {
            CertificateStatus::Generated
        } else {
            diag.warn(Warning::certificate(format!(
                "no certificate at {}; place a PKCS#12 bundle there before using document signing",
                bundle.display()
            )));
            CertificateStatus::Missing
        }
    };

    if status != CertificateStatus::Missing
        && let Err(e) = fs::set_permissions(bundle, fs::Permissions::from_mode(CERT_MODE))
    {
        diag.warn(Warning::permissions(format!(
            "could not set permissions on {}: {}",
            bundle.display(),
            e
        )));
    }

    Ok(status)
}

async fn generate<R>(
    runner: &R,
    openssl: &str,
    cert: &CertificateConfig,
    layout: &Layout,
    diag: &mut Diagnostics,
) -> Result<(), ProvisionError>
where
    R: CommandRunner + ?Sized,
{
    let request = request_command(openssl, cert, layout);
    let outcome = execute(runner, request, Tolerance::Tolerated).await?;
    if let Outcome::Failure(e) = &outcome {
        diag.warn(Warning::certificate(format!("certificate generation failed: {e}")));
    }

    if layout.temp_key.exists() && layout.temp_cert.exists() {
        let export = export_command(openssl, cert, layout);
        let outcome = execute(runner, export, Tolerance::Tolerated).await?;
        if let Outcome::Failure(e) = &outcome {
            diag.warn(Warning::certificate(format!("PKCS#12 export failed: {e}")));
        }
    }

    // The private key must not outlive the export, whatever its outcome.
    remove_temporary(&layout.temp_key, diag);
    remove_temporary(&layout.temp_cert, diag);

    Ok(())
}

/// `openssl req` producing an unencrypted key and a self-signed certificate.
pub fn request_command(openssl: &str, cert: &CertificateConfig, layout: &Layout) -> CommandSpec {
    CommandSpec::new(openssl)
        .args(["req", "-x509", "-newkey"])
        .arg(format!("rsa:{}", cert.key_bits))
        .arg("-keyout")
        .path_arg(&layout.temp_key)
        .arg("-out")
        .path_arg(&layout.temp_cert)
        .arg("-days")
        .arg(cert.days.to_string())
        .arg("-nodes")
        .arg("-subj")
        .arg(cert.subject.as_str())
}

/// `openssl pkcs12 -export` bundling the temporary key and certificate.
pub fn export_command(openssl: &str, cert: &CertificateConfig, layout: &Layout) -> CommandSpec {
    CommandSpec::new(openssl)
        .args(["pkcs12", "-export", "-out"])
        .path_arg(&layout.cert_bundle)
        .arg("-inkey")
        .path_arg(&layout.temp_key)
        .arg("-in")
        .path_arg(&layout.temp_cert)
        .arg("-passout")
        .arg(format!("pass:{}", cert.passphrase))
}

fn remove_temporary(path: &Path, diag: &mut Diagnostics) {
    match fs::remove_file(path) {
        Ok(()) => tracing::debug!("removed {}", path.display()),
        Err(e) if e.kind() == ErrorKind::NotFound => {}
        Err(e) => diag.warn(Warning::cleanup(format!(
            "could not remove {}: {}",
            path.display(),
            e
        ))),
    }
}
