// ABOUTME: Config scaffolding for new deployments.
// ABOUTME: Writes a commented documenso-setup.yml listing every default.

use std::path::Path;

use crate::error::{Error, Result};

use super::{CONFIG_FILENAME, Config};

pub fn init_config(dir: &Path, force: bool) -> Result<()> {
    let config_path = dir.join(CONFIG_FILENAME);

    if config_path.exists() && !force {
        return Err(Error::AlreadyExists(config_path));
    }

    let yaml = generate_template_yaml(&Config::default());
    std::fs::write(&config_path, yaml)?;

    Ok(())
}

fn generate_template_yaml(config: &Config) -> String {
    format!(
        r#"# documenso-setup configuration. Every key is optional.
pod: {}
service: {}
# Must already exist; relative paths are resolved against this directory.
volume_dir: {}
pod_file: {}
container_file: {}
env_file: {}
# unit_dir: ~/.config/containers/systemd
certificate:
  file: {}
  passphrase: {}
  subject: "{}"
  days: {}
  key_bits: {}
  container_path: {}
# Used when the pod file has no PublishPort= lines.
fallback_port: "{}"
quadlet_min_major: {}
tools:
  engine: {}
  openssl: {}
  systemctl: {}
command_timeout: {}s
"#,
        config.pod,
        config.service,
        config.volume_dir.display(),
        config.pod_file.display(),
        config.container_file.display(),
        config.env_file.display(),
        config.certificate.file,
        config.certificate.passphrase,
        config.certificate.subject,
        config.certificate.days,
        config.certificate.key_bits,
        config.certificate.container_path,
        config.fallback_port,
        config.quadlet_min_major,
        config.tools.engine,
        config.tools.openssl,
        config.tools.systemctl,
        config.command_timeout.as_secs(),
    )
}
