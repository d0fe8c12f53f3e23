// ABOUTME: Entry point for the documenso-setup CLI application.
// ABOUTME: Parses arguments, loads configuration and runs the provisioning procedure.

mod cli;

use clap::Parser;
use cli::{Cli, Commands};
use documenso_setup::config::{self, Config, Layout};
use documenso_setup::diagnostics::Diagnostics;
use documenso_setup::error::{Error, Result};
use documenso_setup::output::{Output, OutputMode};
use documenso_setup::provision::Provisioner;
use documenso_setup::runner::ProcessRunner;
use std::path::Path;
use tracing_subscriber::EnvFilter;

#[tokio::main(flavor = "current_thread")]
async fn main() {
    let cli = Cli::parse();

    // Initialize tracing subscriber based on verbose flag
    let filter = if cli.verbose {
        EnvFilter::new("debug")
    } else {
        EnvFilter::new("warn")
    };
    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_target(true)
        .with_writer(std::io::stderr)
        .init();

    let mode = if cli.json {
        OutputMode::Json
    } else if cli.quiet {
        OutputMode::Quiet
    } else {
        OutputMode::Normal
    };
    let mut output = Output::new(mode);

    if let Err(e) = run(cli, &mut output).await {
        output.error(&e.to_string());
        std::process::exit(e.exit_code());
    }
}

async fn run(cli: Cli, output: &mut Output) -> Result<()> {
    let base_dir = match cli.base_dir {
        Some(dir) => dir,
        None => std::env::current_dir()?,
    };

    match cli.command {
        Some(Commands::Init { force }) => {
            config::init_config(&base_dir, force)?;
            output.success(&format!(
                "Wrote {}",
                base_dir.join(config::CONFIG_FILENAME).display()
            ));
            Ok(())
        }
        None => {
            let config = load_config(&base_dir, cli.config.as_deref())?;
            setup(&config, &base_dir, output).await
        }
    }
}

fn load_config(base_dir: &Path, explicit: Option<&Path>) -> Result<Config> {
    match explicit {
        Some(path) => Config::load(path),
        None => Config::discover(base_dir),
    }
}

/// Run the full provisioning procedure against the local system.
async fn setup(config: &Config, base_dir: &Path, output: &mut Output) -> Result<()> {
    let layout = Layout::for_user(config, base_dir)?;
    let runner = ProcessRunner::new(config.command_timeout);
    let mut diag = Diagnostics::default();

    output.start_timer();
    output.progress(&format!(
        "Setting up {} from {}",
        config.service,
        layout.base_dir.display()
    ));

    let result = Provisioner::new(&runner, config, &layout)
        .run(output, &mut diag)
        .await;

    // Emit collected warnings
    for warning in diag.warnings() {
        output.warning(&warning.message);
    }

    let report = result.map_err(Error::from)?;
    output.success("Setup complete!");
    report.print(output);
    Ok(())
}
