// ABOUTME: Installs the Quadlet pod and container units into the user's systemd directory.
// ABOUTME: Renders the container template by filling a fixed set of placeholder keys.

use std::fs;
use std::os::unix::fs::PermissionsExt;
use std::path::{Path, PathBuf};

use snafu::ResultExt;
use thiserror::Error;

use super::ProvisionError;
use super::error::{InstallSnafu, ReadDefinitionSnafu, TemplateSnafu};
use crate::config::{CertificateConfig, Layout};

pub const UNIT_DIR_MODE: u32 = 0o755;
pub const UNIT_FILE_MODE: u32 = 0o644;

/// Keys the container template is expected to contain.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Placeholder {
    EnvFile,
    CertVolume,
}

impl Placeholder {
    pub const ALL: [Placeholder; 2] = [Placeholder::EnvFile, Placeholder::CertVolume];

    pub fn token(&self) -> &'static str {
        match self {
            Placeholder::EnvFile => "ENV_FILE_PLACEHOLDER",
            Placeholder::CertVolume => "CERT_VOLUME_PLACEHOLDER",
        }
    }
}

#[derive(Debug, Error, PartialEq, Eq)]
pub enum TemplateError {
    #[error("placeholder {} not found", .0.token())]
    MissingPlaceholder(Placeholder),

    #[error("placeholder {} still present after rendering", .0.token())]
    Unresolved(Placeholder),

    #[error("value for {} cannot be used in a unit file: {reason}", .placeholder.token())]
    InvalidValue {
        placeholder: Placeholder,
        reason: String,
    },
}

/// Values substituted into the container template.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Substitutions {
    env_file: String,
    cert_volume: String,
}

impl Substitutions {
    pub fn new(
        env_file: &Path,
        cert_host: &Path,
        cert_container: &str,
    ) -> Result<Self, TemplateError> {
        let env_file = env_file.to_string_lossy().into_owned();
        let host = cert_host.to_string_lossy().into_owned();

        check_value(Placeholder::EnvFile, &env_file)?;
        check_value(Placeholder::CertVolume, &host)?;
        check_value(Placeholder::CertVolume, cert_container)?;
        if host.contains(':') || cert_container.contains(':') {
            return Err(TemplateError::InvalidValue {
                placeholder: Placeholder::CertVolume,
                reason: "volume paths cannot contain ':'".to_string(),
            });
        }

        Ok(Self {
            env_file,
            cert_volume: format!("{host}:{cert_container}:ro"),
        })
    }

    pub fn for_layout(layout: &Layout, cert: &CertificateConfig) -> Result<Self, TemplateError> {
        Self::new(&layout.env_file, &layout.cert_bundle, &cert.container_path)
    }

    pub fn value(&self, placeholder: Placeholder) -> &str {
        match placeholder {
            Placeholder::EnvFile => &self.env_file,
            Placeholder::CertVolume => &self.cert_volume,
        }
    }
}

fn check_value(placeholder: Placeholder, value: &str) -> Result<(), TemplateError> {
    if value.contains(['\n', '\r']) {
        return Err(TemplateError::InvalidValue {
            placeholder,
            reason: "contains a line break".to_string(),
        });
    }
    Ok(())
}

/// A container unit template known to contain every placeholder.
#[derive(Debug, Clone)]
pub struct UnitTemplate {
    text: String,
}

impl UnitTemplate {
    pub fn parse(text: impl Into<String>) -> Result<Self, TemplateError> {
        let text = text.into();
        for placeholder in Placeholder::ALL {
            if !text.contains(placeholder.token()) {
                return Err(TemplateError::MissingPlaceholder(placeholder));
            }
        }
        Ok(Self { text })
    }

    pub fn render(&self, values: &Substitutions) -> Result<String, TemplateError> {
        let mut rendered = self.text.clone();
        for placeholder in Placeholder::ALL {
            rendered = rendered.replace(placeholder.token(), values.value(placeholder));
        }

        for placeholder in Placeholder::ALL {
            if rendered.contains(placeholder.token()) {
                return Err(TemplateError::Unresolved(placeholder));
            }
        }
        Ok(rendered)
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct InstalledUnits {
    pub pod_unit: PathBuf,
    pub container_unit: PathBuf,
}

/// Copy the pod unit and write the rendered container unit into `layout.unit_dir`.
///
/// The template is rendered before anything is written, and existing units
/// are overwritten.
pub fn install_units(
    layout: &Layout,
    values: &Substitutions,
) -> Result<InstalledUnits, ProvisionError> {
    let source = &layout.container_definition;
    let text = fs::read_to_string(source).context(ReadDefinitionSnafu { path: source })?;
    let rendered = UnitTemplate::parse(text)
        .and_then(|t| t.render(values))
        .context(TemplateSnafu { path: source })?;

    let dir = &layout.unit_dir;
    fs::create_dir_all(dir).context(InstallSnafu { path: dir })?;
    set_mode(dir, UNIT_DIR_MODE)?;

    let pod_unit = layout.installed_pod_unit();
    fs::copy(&layout.pod_definition, &pod_unit).context(InstallSnafu { path: &pod_unit })?;

    let container_unit = layout.installed_container_unit();
    fs::write(&container_unit, rendered).context(InstallSnafu {
        path: &container_unit,
    })?;

    set_mode(&pod_unit, UNIT_FILE_MODE)?;
    set_mode(&container_unit, UNIT_FILE_MODE)?;

    tracing::info!("installed units into {}", dir.display());
    Ok(InstalledUnits {
        pod_unit,
        container_unit,
    })
}

fn set_mode(path: &Path, mode: u32) -> Result<(), ProvisionError> {
    fs::set_permissions(path, fs::Permissions::from_mode(mode)).context(InstallSnafu { path })
}

#[cfg(test)]
mod tests {
    use super::*;

    fn values() -> Substitutions {
        Substitutions::new(
            Path::new("/srv/documenso/documenso.env"),
            Path::new("/srv/documenso/volumes/cert.p12"),
            "/opt/documenso/cert.p12",
        )
        .unwrap()
    }

    #[test]
    fn renders_both_placeholders() {
        let template = UnitTemplate::parse(
            "[Container]\nEnvironmentFile=ENV_FILE_PLACEHOLDER\nVolume=CERT_VOLUME_PLACEHOLDER\n",
        )
        .unwrap();

        let rendered = template.render(&values()).unwrap();
        assert_eq!(
            rendered,
            "[Container]\nEnvironmentFile=/srv/documenso/documenso.env\n\
             Volume=/srv/documenso/volumes/cert.p12:/opt/documenso/cert.p12:ro\n"
        );
    }

    #[test]
    fn template_without_placeholder_is_rejected() {
        let err = UnitTemplate::parse("EnvironmentFile=ENV_FILE_PLACEHOLDER\n").unwrap_err();
        assert_eq!(err, TemplateError::MissingPlaceholder(Placeholder::CertVolume));
    }

    #[test]
    fn colon_in_host_path_is_rejected() {
        let err = Substitutions::new(
            Path::new("/env"),
            Path::new("/weird:dir/cert.p12"),
            "/opt/documenso/cert.p12",
        )
        .unwrap_err();
        assert!(matches!(err, TemplateError::InvalidValue { .. }));
    }

    #[test]
    fn newline_in_value_is_rejected() {
        assert!(Substitutions::new(Path::new("/a\nb"), Path::new("/c"), "/d").is_err());
    }
}
