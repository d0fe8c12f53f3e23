// ABOUTME: Published port mapping for pods.
// ABOUTME: Validates "[[ip:][host]:]container[/proto]" values taken from PublishPort= lines.

use std::fmt;
use std::str::FromStr;
use thiserror::Error;

#[derive(Debug, Error, PartialEq, Eq)]
pub enum PortMappingError {
    #[error("port mapping cannot be empty")]
    Empty,

    #[error("port mapping '{0}' must have the form [[ip:][host]:]container[/proto]")]
    Malformed(String),

    #[error("invalid port '{port}' in mapping '{mapping}'")]
    InvalidPort { mapping: String, port: String },

    #[error("unsupported protocol '{0}' (expected tcp, udp or sctp)")]
    UnsupportedProtocol(String),
}

/// A single `--publish` value.
///
/// The original text is kept verbatim so that the argument handed to the
/// engine matches the unit file byte for byte.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PortMapping {
    raw: String,
    host_port: Option<u16>,
    container_port: u16,
}

impl PortMapping {
    pub fn parse(value: &str) -> Result<Self, PortMappingError> {
        let raw = value.trim();
        if raw.is_empty() {
            return Err(PortMappingError::Empty);
        }

        let ports = match raw.split_once('/') {
            Some((ports, proto)) => {
                if !matches!(proto, "tcp" | "udp" | "sctp") {
                    return Err(PortMappingError::UnsupportedProtocol(proto.to_string()));
                }
                ports
            }
            None => raw,
        };

        // IPv6 host addresses are bracketed, so split from the right.
        let (host, container) = match ports.rsplit_once(':') {
            Some((host_part, container)) => match host_part.rsplit_once(':') {
                Some((ip, host)) => {
                    if ip.contains(':') && !(ip.starts_with('[') && ip.ends_with(']')) {
                        return Err(PortMappingError::Malformed(raw.to_string()));
                    }
                    (host, container)
                }
                None => (host_part, container),
            },
            // Container port only; the engine picks the host port.
            None => ("", ports),
        };

        let container_port = parse_port(raw, container)?;
        // An empty host port lets the engine pick one.
        let host_port = if host.is_empty() {
            None
        } else {
            Some(parse_port(raw, host)?)
        };

        Ok(Self {
            raw: raw.to_string(),
            host_port,
            container_port,
        })
    }

    pub fn as_str(&self) -> &str {
        &self.raw
    }

    pub fn host_port(&self) -> Option<u16> {
        self.host_port
    }

    pub fn container_port(&self) -> u16 {
        self.container_port
    }
}

/// Parse a port or a `start-end` range, returning the first port.
fn parse_port(mapping: &str, port: &str) -> Result<u16, PortMappingError> {
    let invalid = || PortMappingError::InvalidPort {
        mapping: mapping.to_string(),
        port: port.to_string(),
    };

    let (start, end) = match port.split_once('-') {
        Some((start, end)) => (start, Some(end)),
        None => (port, None),
    };

    let start = start.parse::<u16>().ok().filter(|p| *p > 0).ok_or_else(invalid)?;
    if let Some(end) = end {
        let end = end.parse::<u16>().map_err(|_| invalid())?;
        if end < start {
            return Err(invalid());
        }
    }

    Ok(start)
}

impl FromStr for PortMapping {
    type Err = PortMappingError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Self::parse(s)
    }
}

impl fmt::Display for PortMapping {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.raw)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn parses_host_and_container() {
        let m = PortMapping::parse("8084:3000").unwrap();
        assert_eq!(m.host_port(), Some(8084));
        assert_eq!(m.container_port(), 3000);
        assert_eq!(m.as_str(), "8084:3000");
    }

    #[test]
    fn parses_bound_address_and_protocol() {
        let m = PortMapping::parse("127.0.0.1:8443:443/tcp").unwrap();
        assert_eq!(m.host_port(), Some(8443));
        assert_eq!(m.container_port(), 443);
    }

    #[test]
    fn empty_host_port_is_engine_assigned() {
        let m = PortMapping::parse("127.0.0.1::3000").unwrap();
        assert_eq!(m.host_port(), None);
    }

    #[test]
    fn accepts_port_ranges() {
        let m = PortMapping::parse("8000-8010:8000-8010").unwrap();
        assert_eq!(m.host_port(), Some(8000));
        assert!(PortMapping::parse("8010-8000:80").is_err());
    }

    #[test]
    fn accepts_container_only() {
        let m = PortMapping::parse("3000").unwrap();
        assert_eq!(m.host_port(), None);
        assert_eq!(m.container_port(), 3000);
        assert_eq!(m.as_str(), "3000");

        let m = PortMapping::parse("53/udp").unwrap();
        assert_eq!(m.container_port(), 53);
    }

    #[test]
    fn bracketed_ipv6_address_is_accepted() {
        let m = PortMapping::parse("[::1]:8084:3000").unwrap();
        assert_eq!(m.host_port(), Some(8084));
        assert!(matches!(
            PortMapping::parse("fe80::1:8084:3000"),
            Err(PortMappingError::Malformed(_))
        ));
    }

    #[test]
    fn rejects_bad_protocol() {
        assert_eq!(
            PortMapping::parse("80:80/http"),
            Err(PortMappingError::UnsupportedProtocol("http".to_string()))
        );
    }
}
