use crate::models::{AuthManagerError, AuthResult};
use async_trait::async_trait;
use std::process::Stdio;
use std::time::Duration;
use tokio::process::Command;
use tokio::time::timeout;

/// An external program invocation with discrete arguments.
#[derive(Debug, Clone, PartialEq)]
pub struct CommandSpec {
    pub program: String,
    pub args: Vec<String>,
    pub timeout: Option<Duration>,
    /// Inherit the operator's terminal for stdin/stdout (ssh-keygen passphrase prompts)
    pub interactive: bool,
}

impl CommandSpec {
    pub fn new(program: impl Into<String>) -> Self {
        Self {
            program: program.into(),
            args: Vec::new(),
            timeout: None,
            interactive: false,
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

    pub fn timeout(mut self, duration: Duration) -> Self {
        self.timeout = Some(duration);
        self
    }

    pub fn interactive(mut self) -> Self {
        self.interactive = true;
        self
    }

    /// Human-readable form for logs; never passed to a shell
    pub fn display(&self) -> String {
        let mut parts = vec![self.program.clone()];
        parts.extend(self.args.iter().cloned());
        parts.join(" ")
    }
}

/// Captured result of a finished process.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct CommandOutput {
    /// Exit code, `None` when the process was killed by a signal
    pub status: Option<i32>,
    pub stdout: String,
    pub stderr: String,
}

impl CommandOutput {
    pub fn success(&self) -> bool {
        self.status == Some(0)
    }

    pub fn status_text(&self) -> String {
        match self.status {
            Some(code) => code.to_string(),
            None => "signal".to_string(),
        }
    }

    /// Convert a non-zero exit into `CommandFailed`
    pub fn into_result(self, program: &str) -> AuthResult<Self> {
        if self.success() {
            Ok(self)
        } else {
            Err(AuthManagerError::CommandFailed {
                program: program.to_string(),
                status: self.status_text(),
                stderr: self.stderr.trim().to_string(),
            })
        }
    }
}

/// Seam for every external collaborator the manager drives.
#[async_trait]
pub trait CommandRunner: Send + Sync {
    async fn run(&self, command: &CommandSpec) -> AuthResult<CommandOutput>;
}

/// Runs commands as real child processes.
pub struct SystemCommandRunner;

#[async_trait]
impl CommandRunner for SystemCommandRunner {
    async fn run(&self, spec: &CommandSpec) -> AuthResult<CommandOutput> {
        log::debug!("[command_runner] Running: {}", spec.display());

        let mut command = Command::new(&spec.program);
        command
            .args(&spec.args)
            .stderr(Stdio::piped())
            .kill_on_drop(true);

        if spec.interactive {
            command.stdin(Stdio::inherit()).stdout(Stdio::inherit());
        } else {
            command.stdin(Stdio::null()).stdout(Stdio::piped());
        }

        let child = command
            .spawn()
            .map_err(|e| AuthManagerError::CommandUnavailable {
                program: spec.program.clone(),
                message: e.to_string(),
            })?;

        let output = match spec.timeout {
            Some(limit) => match timeout(limit, child.wait_with_output()).await {
                Ok(result) => result?,
                Err(_) => {
                    // Dropping the future kills the child
                    log::warn!(
                        "[command_runner] {} timed out after {:?}",
                        spec.program,
                        limit
                    );
                    return Err(AuthManagerError::CommandTimeout {
                        program: spec.program.clone(),
                        secs: limit.as_secs(),
                    });
                }
            },
            None => child.wait_with_output().await?,
        };

        let result = CommandOutput {
            status: output.status.code(),
            stdout: String::from_utf8_lossy(&output.stdout).to_string(),
            stderr: String::from_utf8_lossy(&output.stderr).to_string(),
        };

        log::debug!(
            "[command_runner] {} exited with {}",
            spec.program,
            result.status_text()
        );

        Ok(result)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_spec_builder() {
        let spec = CommandSpec::new("ssh")
            .arg("-i")
            .arg("/root/key.pem")
            .args(["-o", "BatchMode=yes"])
            .timeout(Duration::from_secs(15));

        assert_eq!(spec.args, vec!["-i", "/root/key.pem", "-o", "BatchMode=yes"]);
        assert_eq!(spec.timeout, Some(Duration::from_secs(15)));
        assert!(!spec.interactive);
        assert_eq!(spec.display(), "ssh -i /root/key.pem -o BatchMode=yes");
    }

    #[test]
    fn test_into_result() {
        let ok = CommandOutput {
            status: Some(0),
            ..Default::default()
        };
        assert!(ok.into_result("sshd").is_ok());

        let failed = CommandOutput {
            status: Some(255),
            stderr: "Permission denied\n".to_string(),
            ..Default::default()
        };
        let err = failed.into_result("ssh").unwrap_err();
        assert_eq!(err.to_string(), "ssh failed with status 255: Permission denied");
    }

    #[tokio::test]
    async fn test_missing_program_is_unavailable() {
        let spec = CommandSpec::new("definitely-not-a-real-binary-1f3a");
        let err = SystemCommandRunner.run(&spec).await.unwrap_err();
        assert_eq!(err.error_type(), "CommandUnavailable");
    }

    #[tokio::test]
    async fn test_arguments_are_not_shell_interpreted() {
        let spec = CommandSpec::new("echo").arg("$HOME; echo injected");
        let output = SystemCommandRunner.run(&spec).await.unwrap();
        assert!(output.success());
        assert_eq!(output.stdout.trim(), "$HOME; echo injected");
    }
}
