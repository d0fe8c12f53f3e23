// ABOUTME: Command-line interface definition using clap derive macros.
// ABOUTME: No arguments runs the full setup; `init` writes a config template.

use clap::{Parser, Subcommand};
use std::path::PathBuf;

#[derive(Parser)]
#[command(name = "documenso-setup")]
#[command(about = "Set up Documenso as a rootless Podman pod managed by systemd --user")]
#[command(version)]
pub struct Cli {
    #[command(subcommand)]
    pub command: Option<Commands>,

    /// Directory holding the unit templates and env file (default: current directory)
    #[arg(long, global = true)]
    pub base_dir: Option<PathBuf>,

    /// Configuration file (default: documenso-setup.yml in the base directory, if present)
    #[arg(short, long, global = true)]
    pub config: Option<PathBuf>,

    /// Enable debug logging
    #[arg(short, long, global = true)]
    pub verbose: bool,

    /// Only print warnings and the final result
    #[arg(short, long, global = true, conflicts_with = "json")]
    pub quiet: bool,

    /// Emit JSON lines instead of human-readable output
    #[arg(long, global = true)]
    pub json: bool,
}

#[derive(Subcommand)]
pub enum Commands {
    /// Write a documenso-setup.yml template listing every default
    Init {
        /// Overwrite an existing configuration file
        #[arg(short, long)]
        force: bool,
    },
}
