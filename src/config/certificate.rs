// ABOUTME: Self-signed certificate settings.
// ABOUTME: Subject, validity, key size, passphrase and in-container mount path.

use serde::Deserialize;

#[derive(Debug, Clone, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct CertificateConfig {
    /// Bundle file name inside the volume directory.
    #[serde(default = "default_file")]
    pub file: String,

    #[serde(default = "default_passphrase")]
    pub passphrase: String,

    #[serde(default = "default_subject")]
    pub subject: String,

    #[serde(default = "default_days")]
    pub days: u32,

    #[serde(default = "default_key_bits")]
    pub key_bits: u32,

    /// Where the application expects the bundle inside its container.
    #[serde(default = "default_container_path")]
    pub container_path: String,
}

impl Default for CertificateConfig {
    fn default() -> Self {
        Self {
            file: default_file(),
            passphrase: default_passphrase(),
            subject: default_subject(),
            days: default_days(),
            key_bits: default_key_bits(),
            container_path: default_container_path(),
        }
    }
}

fn default_file() -> String {
    "cert.p12".to_string()
}

fn default_passphrase() -> String {
    "documenso".to_string()
}

fn default_subject() -> String {
    "/CN=documenso.local/O=Documenso/C=US".to_string()
}

fn default_days() -> u32 {
    365
}

fn default_key_bits() -> u32 {
    2048
}

fn default_container_path() -> String {
    "/opt/documenso/cert.p12".to_string()
}
