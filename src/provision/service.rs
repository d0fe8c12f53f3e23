// ABOUTME: Service activation through the user's systemd instance.
// ABOUTME: Reloads unit definitions so Quadlet regenerates services, then starts the service.

use super::ProvisionError;
use super::exec::{Tolerance, execute};
use crate::runner::{CommandRunner, CommandSpec};
use crate::types::UnitName;

pub async fn reload_and_start<R>(
    runner: &R,
    systemctl: &str,
    service: &UnitName,
) -> Result<(), ProvisionError>
where
    R: CommandRunner + ?Sized,
{
    let reload = CommandSpec::new(systemctl).args(["--user", "daemon-reload"]);
    execute(runner, reload, Tolerance::Fatal).await?;

    let start = CommandSpec::new(systemctl)
        .args(["--user", "start"])
        .arg(service.service_unit());
    execute(runner, start, Tolerance::Fatal).await?;

    tracing::info!("started {}", service.service_unit());
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::runner::{CommandOutput, ScriptedRunner};

    #[tokio::test]
    async fn reloads_before_starting() {
        let runner = ScriptedRunner::new();
        let service = UnitName::new("documenso").unwrap();

        reload_and_start(&runner, "systemctl", &service).await.unwrap();

        let calls: Vec<String> = runner.calls().iter().map(ToString::to_string).collect();
        assert_eq!(
            calls,
            vec![
                "systemctl --user daemon-reload",
                "systemctl --user start documenso.service"
            ]
        );
    }

    #[tokio::test]
    async fn failed_reload_skips_start() {
        let runner = ScriptedRunner::new();
        runner.on(
            "systemctl",
            &["--user", "daemon-reload"],
            vec![CommandOutput::failed(1, "Failed to connect to bus")],
        );
        let service = UnitName::new("documenso").unwrap();

        assert!(reload_and_start(&runner, "systemctl", &service).await.is_err());
        assert!(runner.calls_matching("systemctl", &["--user", "start"]).is_empty());
    }
}
