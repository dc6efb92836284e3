//! Subprocess execution utilities.

use std::ffi::OsStr;
use std::path::{Path, PathBuf};
use std::process::{Command, ExitStatus, Output, Stdio};

use anyhow::{Context, Result};

/// Builder for subprocess execution.
///
/// Environment variables are an explicit overlay on the ambient environment,
/// constructed per invocation; the builder never mutates process-global
/// state.
#[derive(Debug, Clone)]
pub struct ProcessBuilder {
    program: PathBuf,
    args: Vec<String>,
    env: Vec<(String, String)>,
    cwd: Option<PathBuf>,
}

impl ProcessBuilder {
    /// Create a new process builder for the given program.
    pub fn new(program: impl AsRef<Path>) -> Self {
        ProcessBuilder {
            program: program.as_ref().to_path_buf(),
            args: Vec::new(),
            env: Vec::new(),
            cwd: None,
        }
    }

    /// Add a single argument.
    pub fn arg(mut self, arg: impl AsRef<OsStr>) -> Self {
        self.args.push(arg.as_ref().to_string_lossy().into_owned());
        self
    }

    /// Add multiple arguments.
    pub fn args<I, S>(mut self, args: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: AsRef<OsStr>,
    {
        self.args.extend(
            args.into_iter()
                .map(|s| s.as_ref().to_string_lossy().into_owned()),
        );
        self
    }

    /// Set an environment variable.
    pub fn env(mut self, key: impl AsRef<str>, value: impl AsRef<str>) -> Self {
        self.env
            .push((key.as_ref().to_string(), value.as_ref().to_string()));
        self
    }

    /// Extend the environment overlay.
    pub fn envs<I, K, V>(mut self, vars: I) -> Self
    where
        I: IntoIterator<Item = (K, V)>,
        K: AsRef<str>,
        V: AsRef<str>,
    {
        self.env.extend(
            vars.into_iter()
                .map(|(k, v)| (k.as_ref().to_string(), v.as_ref().to_string())),
        );
        self
    }

    /// Set the working directory.
    pub fn cwd(mut self, cwd: impl AsRef<Path>) -> Self {
        self.cwd = Some(cwd.as_ref().to_path_buf());
        self
    }

    fn build_command(&self) -> Command {
        let mut cmd = Command::new(&self.program);
        cmd.args(&self.args);

        for (key, value) in &self.env {
            cmd.env(key, value);
        }

        if let Some(ref cwd) = self.cwd {
            cmd.current_dir(cwd);
        }

        cmd
    }

    /// Execute the command, capturing stdout and stderr.
    pub fn output(&self) -> Result<Output> {
        tracing::debug!("running `{}`", self.display_command());

        self.build_command()
            .stdout(Stdio::piped())
            .stderr(Stdio::piped())
            .output()
            .with_context(|| format!("failed to spawn `{}`", self.program.display()))
    }

    /// Execute the command with inherited stdio and wait for completion.
    pub fn status(&self) -> Result<ExitStatus> {
        tracing::debug!("running `{}`", self.display_command());

        self.build_command()
            .status()
            .with_context(|| format!("failed to spawn `{}`", self.program.display()))
    }

    /// Display the command for log and error messages.
    pub fn display_command(&self) -> String {
        let mut parts = vec![self.program.display().to_string()];
        parts.extend(self.args.iter().cloned());
        parts.join(" ")
    }
}

/// Locate the Swift toolchain driver.
///
/// `SWIFT_EXE` overrides PATH lookup, the way `CC` overrides compiler
/// discovery in C build tools.
pub fn find_swift() -> Result<PathBuf> {
    if let Ok(exe) = std::env::var("SWIFT_EXE") {
        return Ok(PathBuf::from(exe));
    }

    which::which("swift")
        .context("`swift` not found in PATH; install a Swift toolchain or set SWIFT_EXE")
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_output_captures_stdout() {
        let output = ProcessBuilder::new("echo").arg("hello").output().unwrap();

        assert!(output.status.success());
        let stdout = String::from_utf8_lossy(&output.stdout);
        assert!(stdout.contains("hello"));
    }

    #[test]
    fn test_display_command() {
        let pb = ProcessBuilder::new("swift").args(["build", "-c", "release"]);

        assert_eq!(pb.display_command(), "swift build -c release");
    }

    #[test]
    #[cfg(unix)]
    fn test_env_overlay() {
        let output = ProcessBuilder::new("sh")
            .args(["-c", "printf %s \"$SWIFT_ADDON_TEST_VAR\""])
            .env("SWIFT_ADDON_TEST_VAR", "overlay")
            .output()
            .unwrap();

        assert_eq!(String::from_utf8_lossy(&output.stdout), "overlay");
    }
}
