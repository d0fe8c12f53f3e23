// ABOUTME: Container engine version parsed from `--version` output.
// ABOUTME: Extracts the first major.minor numeric token, e.g. "podman version 4.9.3".

use std::fmt;
use thiserror::Error;

#[derive(Debug, Error, PartialEq, Eq)]
pub enum VersionParseError {
    #[error("no major.minor version found in '{0}'")]
    NoVersionToken(String),
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord)]
pub struct EngineVersion {
    pub major: u32,
    pub minor: u32,
}

impl EngineVersion {
    pub fn new(major: u32, minor: u32) -> Self {
        Self { major, minor }
    }

    /// Find the first `<digits>.<digits>` run anywhere in `text`.
    pub fn parse(text: &str) -> Result<Self, VersionParseError> {
        let bytes = text.as_bytes();
        let mut i = 0;

        while i < bytes.len() {
            if !bytes[i].is_ascii_digit() {
                i += 1;
                continue;
            }

            let major_start = i;
            while i < bytes.len() && bytes[i].is_ascii_digit() {
                i += 1;
            }
            let major_end = i;

            if i + 1 < bytes.len() && bytes[i] == b'.' && bytes[i + 1].is_ascii_digit() {
                let minor_start = i + 1;
                let mut j = minor_start;
                while j < bytes.len() && bytes[j].is_ascii_digit() {
                    j += 1;
                }

                let major = text[major_start..major_end].parse::<u32>();
                let minor = text[minor_start..j].parse::<u32>();
                if let (Ok(major), Ok(minor)) = (major, minor) {
                    return Ok(Self { major, minor });
                }
                i = j;
            }
        }

        Err(VersionParseError::NoVersionToken(text.trim().to_string()))
    }
}

impl fmt::Display for EngineVersion {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}.{}", self.major, self.minor)
    }
}
