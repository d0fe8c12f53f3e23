// ABOUTME: Temporary deployment directory with unit templates and a volume directory.
// ABOUTME: Also scripts podman and openssl responses on a ScriptedRunner.

use std::fs;
use std::os::unix::fs::PermissionsExt;
use std::path::{Path, PathBuf};

use documenso_setup::config::{Config, Layout};
use documenso_setup::runner::{CommandOutput, ScriptedRunner};
use tempfile::TempDir;

pub const POD_UNIT: &str = "\
[Pod]
PodName=documenso
PublishPort=8084:3000
PublishPort=443:443
";

pub const CONTAINER_UNIT: &str = "\
[Container]
Image=docker.io/documenso/documenso:latest
Pod=documenso.pod
EnvironmentFile=ENV_FILE_PLACEHOLDER
Volume=CERT_VOLUME_PLACEHOLDER

[Install]
WantedBy=default.target
";

pub struct Fixture {
    _temp: TempDir,
    pub base: PathBuf,
    pub config_home: PathBuf,
    pub config: Config,
}

impl Fixture {
    /// Base directory with templates, env file and an empty volume directory.
    pub fn new() -> Self {
        let fixture = Self::without_volume_dir();
        fs::create_dir(fixture.base.join("volumes")).unwrap();
        fixture
    }

    pub fn without_volume_dir() -> Self {
        let temp = TempDir::new().unwrap();
        let base = temp.path().join("deploy");
        let config_home = temp.path().join("config-home");
        fs::create_dir(&base).unwrap();

        fs::write(base.join("documenso.pod"), POD_UNIT).unwrap();
        fs::write(base.join("documenso.container"), CONTAINER_UNIT).unwrap();
        fs::write(base.join("documenso.env"), "NEXTAUTH_SECRET=changeme\n").unwrap();

        Self {
            _temp: temp,
            base,
            config_home,
            config: Config::default(),
        }
    }

    pub fn layout(&self) -> Layout {
        Layout::resolve(&self.config, &self.base, Some(self.config_home.clone())).unwrap()
    }

    pub fn unit_dir(&self) -> PathBuf {
        self.config_home.join("containers/systemd")
    }

    pub fn cert_bundle(&self) -> PathBuf {
        self.base.join("volumes/cert.p12")
    }

    pub fn write_pod(&self, text: &str) {
        fs::write(self.base.join("documenso.pod"), text).unwrap();
    }

    pub fn remove_pod(&self) {
        fs::remove_file(self.base.join("documenso.pod")).unwrap();
    }
}

/// Permission bits of `path`.
pub fn mode(path: &Path) -> u32 {
    fs::metadata(path).unwrap().permissions().mode() & 0o777
}

/// `podman --version` reports `version`.
pub fn engine_version(runner: &ScriptedRunner, version: &str) {
    runner.on(
        "podman",
        &["--version"],
        vec![CommandOutput::ok(format!("podman version {version}\n"))],
    );
}

/// openssl writes the files named in its arguments, like the real tool.
pub fn working_openssl(runner: &ScriptedRunner) {
    runner.on_call("openssl", &["req"], |cmd| {
        for flag in ["-keyout", "-out"] {
            let path = cmd.flag_value(flag).unwrap();
            fs::write(path, format!("{flag} material")).unwrap();
        }
        CommandOutput::ok("")
    });
    runner.on_call("openssl", &["pkcs12"], |cmd| {
        let path = cmd.flag_value("-out").unwrap();
        fs::write(path, b"pkcs12 bundle").unwrap();
        CommandOutput::ok("")
    });
}

/// Commands issued, rendered as strings.
pub fn call_strings(runner: &ScriptedRunner) -> Vec<String> {
    runner.calls().iter().map(ToString::to_string).collect()
}
