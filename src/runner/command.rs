// ABOUTME: Typed external command invocation and its captured result.
// ABOUTME: Commands are argument lists handed straight to exec, never a shell string.

use std::ffi::OsStr;
use std::fmt;
use std::path::Path;

/// A program plus its argument list.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CommandSpec {
    pub program: String,
    pub args: Vec<String>,
}

impl CommandSpec {
    pub fn new(program: impl Into<String>) -> Self {
        Self {
            program: program.into(),
            args: Vec::new(),
        }
    }

    pub fn arg(mut self, arg: impl Into<String>) -> Self {
        self.args.push(arg.into());
        self
    }

    pub fn args<I, S>(mut self, args: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        self.args.extend(args.into_iter().map(Into::into));
        self
    }

    /// Append a filesystem path argument.
    ///
    /// Callers pass `Layout` paths, which are checked to be UTF-8 when the
    /// layout is resolved, so the conversion never replaces characters.
    pub fn path_arg(self, path: &Path) -> Self {
        self.arg(path.as_os_str().to_string_lossy().into_owned())
    }

    /// True when the arguments start with `prefix`.
    pub fn starts_with<S: AsRef<OsStr>>(&self, program: &str, prefix: &[S]) -> bool {
        self.program == program
            && self.args.len() >= prefix.len()
            && self
                .args
                .iter()
                .zip(prefix)
                .all(|(a, p)| OsStr::new(a) == p.as_ref())
    }

    /// Value following `flag`, e.g. the path after `-out`.
    pub fn flag_value(&self, flag: &str) -> Option<&str> {
        self.args
            .iter()
            .position(|a| a == flag)
            .and_then(|i| self.args.get(i + 1))
            .map(String::as_str)
    }
}

impl fmt::Display for CommandSpec {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.program)?;
        for arg in &self.args {
            write!(f, " {arg}")?;
        }
        Ok(())
    }
}

/// Captured result of a finished command.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct CommandOutput {
    /// Exit code, `None` when the process was killed by a signal.
    pub exit_code: Option<i32>,
    pub stdout: String,
    pub stderr: String,
}

impl CommandOutput {
    pub fn ok(stdout: impl Into<String>) -> Self {
        Self {
            exit_code: Some(0),
            stdout: stdout.into(),
            stderr: String::new(),
        }
    }

    pub fn failed(code: i32, stderr: impl Into<String>) -> Self {
        Self {
            exit_code: Some(code),
            stdout: String::new(),
            stderr: stderr.into(),
        }
    }

    pub fn success(&self) -> bool {
        self.exit_code == Some(0)
    }

    /// Last non-empty stderr line, for short error messages.
    pub fn stderr_summary(&self) -> &str {
        self.stderr
            .lines()
            .rev()
            .map(str::trim)
            .find(|l| !l.is_empty())
            .unwrap_or("")
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn display_joins_arguments() {
        let cmd = CommandSpec::new("podman").args(["pod", "exists", "documenso"]);
        assert_eq!(cmd.to_string(), "podman pod exists documenso");
    }

    #[test]
    fn prefix_matching() {
        let cmd = CommandSpec::new("podman").args(["pod", "rm", "-f", "documenso"]);
        assert!(cmd.starts_with("podman", &["pod", "rm"]));
        assert!(!cmd.starts_with("podman", &["pod", "create"]));
        assert!(!cmd.starts_with("systemctl", &["pod"]));
    }

    #[test]
    fn flag_value_lookup() {
        let cmd = CommandSpec::new("openssl").args(["pkcs12", "-out", "/tmp/cert.p12"]);
        assert_eq!(cmd.flag_value("-out"), Some("/tmp/cert.p12"));
        assert_eq!(cmd.flag_value("-in"), None);
    }

    #[test]
    fn stderr_summary_takes_last_line() {
        let out = CommandOutput::failed(125, "warning: foo\nError: no such pod\n\n");
        assert_eq!(out.stderr_summary(), "Error: no such pod");
        assert!(!out.success());
    }
}
