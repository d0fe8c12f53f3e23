// ABOUTME: Resolved filesystem paths for one provisioning run.
// ABOUTME: Joins config-relative paths onto the base directory and locates the systemd unit dir.

use std::path::{Path, PathBuf};

use crate::error::{Error, Result};

use super::Config;

/// Quadlet unit directory relative to the user's config directory.
pub const QUADLET_SUBDIR: &str = "containers/systemd";

/// Temporary key written by certificate generation, removed after export.
const TEMP_KEY: &str = "private.key";
/// Temporary certificate written by certificate generation, removed after export.
const TEMP_CERT: &str = "certificate.crt";

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Layout {
    pub base_dir: PathBuf,
    pub volume_dir: PathBuf,
    pub cert_bundle: PathBuf,
    pub temp_key: PathBuf,
    pub temp_cert: PathBuf,
    pub pod_definition: PathBuf,
    pub container_definition: PathBuf,
    pub env_file: PathBuf,
    pub unit_dir: PathBuf,
}

impl Layout {
    /// Resolve every path for `base_dir`.
    ///
    /// The unit directory comes from the config when set, otherwise from
    /// `user_config_dir` (normally `dirs::config_dir()`).
    pub fn resolve(
        config: &Config,
        base_dir: &Path,
        user_config_dir: Option<PathBuf>,
    ) -> Result<Self> {
        let base_dir = std::path::absolute(base_dir)?;
        let volume_dir = base_dir.join(&config.volume_dir);

        let unit_dir = match &config.unit_dir {
            Some(dir) => base_dir.join(dir),
            None => user_config_dir
                .ok_or(Error::NoUserConfigDir)?
                .join(QUADLET_SUBDIR),
        };

        let layout = Self {
            cert_bundle: volume_dir.join(&config.certificate.file),
            temp_key: volume_dir.join(TEMP_KEY),
            temp_cert: volume_dir.join(TEMP_CERT),
            pod_definition: base_dir.join(&config.pod_file),
            container_definition: base_dir.join(&config.container_file),
            env_file: base_dir.join(&config.env_file),
            volume_dir,
            unit_dir,
            base_dir,
        };

        // Every path ends up as a command argument or inside a unit file.
        for path in layout.paths() {
            if path.to_str().is_none() {
                return Err(Error::NonUtf8Path(path.to_path_buf()));
            }
        }
        Ok(layout)
    }

    /// Resolve using the platform's user config directory.
    pub fn for_user(config: &Config, base_dir: &Path) -> Result<Self> {
        Self::resolve(config, base_dir, dirs::config_dir())
    }

    fn paths(&self) -> [&Path; 9] {
        [
            self.base_dir.as_path(),
            self.volume_dir.as_path(),
            self.cert_bundle.as_path(),
            self.temp_key.as_path(),
            self.temp_cert.as_path(),
            self.pod_definition.as_path(),
            self.container_definition.as_path(),
            self.env_file.as_path(),
            self.unit_dir.as_path(),
        ]
    }

    /// Destination of the installed pod unit.
    pub fn installed_pod_unit(&self) -> PathBuf {
        self.unit_dir.join(file_name_or(&self.pod_definition, "documenso.pod"))
    }

    /// Destination of the installed container unit.
    pub fn installed_container_unit(&self) -> PathBuf {
        self.unit_dir
            .join(file_name_or(&self.container_definition, "documenso.container"))
    }
}

fn file_name_or<'a>(path: &'a Path, fallback: &'a str) -> &'a std::ffi::OsStr {
    path.file_name().unwrap_or_else(|| std::ffi::OsStr::new(fallback))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn resolves_paths_under_base_dir() {
        let config = Config::default();
        let layout = Layout::resolve(
            &config,
            Path::new("/srv/documenso"),
            Some(PathBuf::from("/home/u/.config")),
        )
        .unwrap();

        assert_eq!(layout.volume_dir, PathBuf::from("/srv/documenso/volumes"));
        assert_eq!(
            layout.cert_bundle,
            PathBuf::from("/srv/documenso/volumes/cert.p12")
        );
        assert_eq!(
            layout.unit_dir,
            PathBuf::from("/home/u/.config/containers/systemd")
        );
        assert_eq!(
            layout.installed_container_unit(),
            PathBuf::from("/home/u/.config/containers/systemd/documenso.container")
        );
    }

    #[test]
    fn absolute_volume_dir_wins() {
        let config = Config {
            volume_dir: PathBuf::from("/data/documenso"),
            ..Config::default()
        };
        let layout =
            Layout::resolve(&config, Path::new("/srv"), Some(PathBuf::from("/c"))).unwrap();
        assert_eq!(layout.volume_dir, PathBuf::from("/data/documenso"));
    }

    #[test]
    fn non_utf8_path_is_rejected() {
        use std::ffi::OsStr;
        use std::os::unix::ffi::OsStrExt;

        let base = Path::new(OsStr::from_bytes(b"/srv/docu\xffmenso"));
        let err =
            Layout::resolve(&Config::default(), base, Some(PathBuf::from("/c"))).unwrap_err();
        assert!(matches!(err, Error::NonUtf8Path(_)));
    }

    #[test]
    fn missing_user_config_dir_is_an_error() {
        let err = Layout::resolve(&Config::default(), Path::new("/srv"), None).unwrap_err();
        assert!(matches!(err, Error::NoUserConfigDir));
    }
}
