// ABOUTME: Validated domain types for provisioning.
// ABOUTME: Names, port mappings and engine versions parsed once at the boundary.

mod engine_version;
mod port_mapping;
mod unit_name;

pub use engine_version::{EngineVersion, VersionParseError};
pub use port_mapping::{PortMapping, PortMappingError};
pub use unit_name::{UnitName, UnitNameError};
