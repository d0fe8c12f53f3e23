// ABOUTME: Scripted command runner that records invocations and replays canned results.
// ABOUTME: Lets the provisioner be driven end to end without podman, openssl or systemd.

use std::collections::VecDeque;
use std::sync::Arc;

use async_trait::async_trait;
use parking_lot::Mutex;

use super::{CommandError, CommandOutput, CommandRunner, CommandSpec};

type Responder = Arc<dyn Fn(&CommandSpec) -> CommandOutput + Send + Sync>;

struct Rule {
    program: String,
    prefix: Vec<String>,
    responses: VecDeque<Responder>,
}

/// Replays responses for commands matching a program and argument prefix.
///
/// Rules are checked most recent first. Each rule hands out its responses in
/// order and keeps repeating the last one. Commands with no matching rule
/// succeed with empty output.
#[derive(Default)]
pub struct ScriptedRunner {
    rules: Mutex<Vec<Rule>>,
    missing: Mutex<Vec<String>>,
    calls: Mutex<Vec<CommandSpec>>,
}

impl ScriptedRunner {
    pub fn new() -> Self {
        Self::default()
    }

    /// Respond to matching commands with `outputs`, in order.
    pub fn on(&self, program: &str, prefix: &[&str], outputs: Vec<CommandOutput>) -> &Self {
        let responses = outputs
            .into_iter()
            .map(|out| Arc::new(move |_: &CommandSpec| out.clone()) as Responder)
            .collect();
        self.push_rule(program, prefix, responses);
        self
    }

    /// Respond to matching commands by calling `f`, e.g. to create files a real tool would.
    pub fn on_call<F>(&self, program: &str, prefix: &[&str], f: F) -> &Self
    where
        F: Fn(&CommandSpec) -> CommandOutput + Send + Sync + 'static,
    {
        self.push_rule(program, prefix, VecDeque::from([Arc::new(f) as Responder]));
        self
    }

    /// Treat `program` as not installed.
    pub fn missing_program(&self, program: &str) -> &Self {
        self.missing.lock().push(program.to_string());
        self
    }

    /// Every command issued so far, in order.
    pub fn calls(&self) -> Vec<CommandSpec> {
        self.calls.lock().clone()
    }

    /// Commands issued so far matching `program` and `prefix`.
    pub fn calls_matching(&self, program: &str, prefix: &[&str]) -> Vec<CommandSpec> {
        self.calls
            .lock()
            .iter()
            .filter(|c| c.starts_with(program, prefix))
            .cloned()
            .collect()
    }

    fn push_rule(&self, program: &str, prefix: &[&str], responses: VecDeque<Responder>) {
        self.rules.lock().push(Rule {
            program: program.to_string(),
            prefix: prefix.iter().map(|s| s.to_string()).collect(),
            responses,
        });
    }

    fn respond(&self, cmd: &CommandSpec) -> CommandOutput {
        let responder = {
            let mut rules = self.rules.lock();
            let Some(rule) = rules
                .iter_mut()
                .rev()
                .find(|r| cmd.starts_with(&r.program, &r.prefix))
            else {
                return CommandOutput::ok("");
            };

            if rule.responses.len() > 1 {
                rule.responses.pop_front()
            } else {
                rule.responses.front().cloned()
            }
        };

        // Called outside the lock so responders may inspect the runner.
        responder.map_or_else(|| CommandOutput::ok(""), |f| f(cmd))
    }
}

#[async_trait]
impl CommandRunner for ScriptedRunner {
    async fn run(&self, cmd: &CommandSpec) -> Result<CommandOutput, CommandError> {
        self.calls.lock().push(cmd.clone());

        if self.missing.lock().iter().any(|p| p == &cmd.program) {
            return Err(CommandError::NotFound {
                program: cmd.program.clone(),
            });
        }

        Ok(self.respond(cmd))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[tokio::test]
    async fn replays_in_order_then_repeats_last() {
        let runner = ScriptedRunner::new();
        runner.on(
            "podman",
            &["pod", "exists"],
            vec![CommandOutput::ok(""), CommandOutput::failed(1, "")],
        );

        let cmd = CommandSpec::new("podman").args(["pod", "exists", "documenso"]);
        assert!(runner.run(&cmd).await.unwrap().success());
        assert!(!runner.run(&cmd).await.unwrap().success());
        assert!(!runner.run(&cmd).await.unwrap().success());
        assert_eq!(runner.calls().len(), 3);
    }

    #[tokio::test]
    async fn unmatched_commands_succeed() {
        let runner = ScriptedRunner::new();
        let out = runner
            .run(&CommandSpec::new("systemctl").args(["--user", "daemon-reload"]))
            .await
            .unwrap();
        assert!(out.success());
    }

    #[tokio::test]
    async fn later_rules_take_precedence() {
        let runner = ScriptedRunner::new();
        runner.on("podman", &[], vec![CommandOutput::failed(2, "")]);
        runner.on("podman", &["--version"], vec![CommandOutput::ok("podman version 5.0.0")]);

        let out = runner
            .run(&CommandSpec::new("podman").arg("--version"))
            .await
            .unwrap();
        assert_eq!(out.stdout, "podman version 5.0.0");
    }

    #[tokio::test]
    async fn missing_program_reports_not_found() {
        let runner = ScriptedRunner::new();
        runner.missing_program("openssl");
        let err = runner
            .run(&CommandSpec::new("openssl").arg("version"))
            .await
            .unwrap_err();
        assert!(matches!(err, CommandError::NotFound { .. }));
    }
}
