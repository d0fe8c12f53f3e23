// ABOUTME: Validated name for pods and systemd services.
// ABOUTME: Restricts names to lowercase DNS-style labels usable by podman and systemd.

use std::fmt;
use thiserror::Error;

#[derive(Debug, Error, PartialEq, Eq)]
pub enum UnitNameError {
    #[error("unit name cannot be empty")]
    Empty,

    #[error("unit name exceeds maximum length of 63 characters")]
    TooLong,

    #[error("unit name cannot start with a hyphen")]
    StartsWithHyphen,

    #[error("unit name cannot end with a hyphen")]
    EndsWithHyphen,

    #[error("unit name must be lowercase")]
    NotLowercase,

    #[error("invalid character in unit name: '{0}'")]
    InvalidChar(char),
}

/// Name shared by a pod and the systemd unit generated for it.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct UnitName(String);

impl UnitName {
    pub fn new(value: &str) -> Result<Self, UnitNameError> {
        if value.is_empty() {
            return Err(UnitNameError::Empty);
        }

        if value.len() > 63 {
            return Err(UnitNameError::TooLong);
        }

        if value.starts_with('-') {
            return Err(UnitNameError::StartsWithHyphen);
        }

        if value.ends_with('-') {
            return Err(UnitNameError::EndsWithHyphen);
        }

        for c in value.chars() {
            if c.is_ascii_uppercase() {
                return Err(UnitNameError::NotLowercase);
            }
            if !c.is_ascii_lowercase() && !c.is_ascii_digit() && c != '-' {
                return Err(UnitNameError::InvalidChar(c));
            }
        }

        Ok(Self(value.to_string()))
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }

    /// The systemd service name Quadlet generates for this unit.
    pub fn service_unit(&self) -> String {
        format!("{}.service", self.0)
    }
}

impl fmt::Display for UnitName {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn accepts_plain_name() {
        let name = UnitName::new("documenso").unwrap();
        assert_eq!(name.as_str(), "documenso");
        assert_eq!(name.service_unit(), "documenso.service");
    }

    #[test]
    fn rejects_uppercase() {
        assert_eq!(UnitName::new("Documenso"), Err(UnitNameError::NotLowercase));
    }

    #[test]
    fn rejects_shell_metacharacters() {
        assert_eq!(
            UnitName::new("docs;rm"),
            Err(UnitNameError::InvalidChar(';'))
        );
    }
}
