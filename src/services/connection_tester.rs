use crate::models::{AuthManagerError, AuthResult, ConnectionTarget, ManagerConfig};
use crate::services::{CommandRunner, CommandSpec, PermissionCheckResult, PermissionService};
use crate::utils::{validate_hostname, validate_username};

/// OpenSSH reserves 255 for its own errors (connection, auth, host key)
const SSH_CLIENT_ERROR: i32 = 255;

/// SSH connection test result
#[derive(Debug, Clone, PartialEq)]
pub struct ConnectionTestResult {
    pub success: bool,
    /// `None` when the attempt was cut off by the outer timeout
    pub exit_status: Option<i32>,
    pub stdout: String,
    pub stderr: String,
    pub timed_out: bool,
}

impl ConnectionTestResult {
    /// Short classification of a failed attempt for the operator
    pub fn summary(&self) -> String {
        if self.success {
            return "SSH connection successful".to_string();
        }
        if self.timed_out {
            return "SSH connection timed out".to_string();
        }

        let stderr = self.stderr.to_lowercase();
        if stderr.contains("permission denied") {
            "Authentication rejected by the remote host".to_string()
        } else if stderr.contains("connection refused") {
            "Connection refused".to_string()
        } else if stderr.contains("could not resolve hostname") {
            "Hostname could not be resolved".to_string()
        } else if stderr.contains("host key verification failed") {
            "Host key verification failed".to_string()
        } else if stderr.contains("timed out") {
            "SSH connection timed out".to_string()
        } else {
            match self.exit_status {
                Some(SSH_CLIENT_ERROR) => "SSH connection failed".to_string(),
                Some(code) => format!("Remote command exited with status {}", code),
                None => "SSH terminated by a signal".to_string(),
            }
        }
    }
}

/// Validates a key file and attempts a non-interactive login with it.
pub struct ConnectionTester<'a> {
    config: &'a ManagerConfig,
    runner: &'a dyn CommandRunner,
}

impl<'a> ConnectionTester<'a> {
    pub fn new(config: &'a ManagerConfig, runner: &'a dyn CommandRunner) -> Self {
        Self { config, runner }
    }

    /// Check the target's inputs and the key file's permission bits.
    ///
    /// Fails when the host or user is malformed or the key is missing;
    /// loose permissions come back as an invalid `PermissionCheckResult`.
    pub async fn preflight(&self, target: &ConnectionTarget) -> AuthResult<PermissionCheckResult> {
        validate_hostname(&target.host)?;
        validate_username(&target.username)?;
        PermissionService::check_key_permissions(&target.key_path).await
    }

    /// Build the `ssh` invocation for a target
    pub fn ssh_command(&self, target: &ConnectionTarget) -> CommandSpec {
        CommandSpec::new("ssh")
            .arg("-i")
            .arg(target.key_path.to_string_lossy())
            .args(["-o", "BatchMode=yes"])
            .args(["-o", "IdentitiesOnly=yes"])
            .args(["-o", "StrictHostKeyChecking=accept-new"])
            .arg("-o")
            .arg(format!("ConnectTimeout={}", self.config.connect_timeout_secs))
            .arg(target.destination())
            .arg(self.config.probe_command.as_str())
            .timeout(self.config.ssh_timeout())
    }

    /// Perform the login attempt. Remote rejection is a result, not an error.
    pub async fn attempt(&self, target: &ConnectionTarget) -> AuthResult<ConnectionTestResult> {
        let spec = self.ssh_command(target);
        log::info!("[connection] Testing SSH connection to {}", target.destination());

        match self.runner.run(&spec).await {
            Ok(output) => {
                let result = ConnectionTestResult {
                    success: output.success(),
                    exit_status: output.status,
                    stdout: output.stdout,
                    stderr: output.stderr,
                    timed_out: false,
                };
                log::info!(
                    "[connection] Test result: success={}, status={:?}",
                    result.success,
                    result.exit_status
                );
                Ok(result)
            }
            Err(AuthManagerError::CommandTimeout { secs, .. }) => {
                log::warn!("[connection] ssh to {} timed out", target.destination());
                Ok(ConnectionTestResult {
                    success: false,
                    exit_status: None,
                    stdout: String::new(),
                    stderr: format!("No response within {}s", secs),
                    timed_out: true,
                })
            }
            Err(e) => Err(e),
        }
    }
}
