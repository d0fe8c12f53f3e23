// ABOUTME: Library root for documenso-setup - exposes provisioning steps for testing.
// ABOUTME: The main binary is in main.rs.

pub mod config;
pub mod diagnostics;
pub mod error;
pub mod output;
pub mod provision;
pub mod runner;
pub mod types;
