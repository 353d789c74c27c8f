use crate::models::{AuthManagerError, AuthResult};
use serde::Deserialize;
use std::path::{Path, PathBuf};
use std::time::Duration;

/// Environment variable naming an optional JSON override file.
pub const CONFIG_ENV_VAR: &str = "SSHD_AUTH_MANAGER_CONFIG";

/// Settings threaded through every operation.
///
/// Every field has a default matching a stock OpenSSH install, so an
/// override file only needs the keys it wants to change.
#[derive(Debug, Clone, Deserialize, PartialEq)]
#[serde(default, deny_unknown_fields)]
pub struct ManagerConfig {
    pub sshd_config_path: PathBuf,
    /// Binary used for `-t` config validation
    pub sshd_binary: String,
    /// Service names tried in order when restarting the daemon
    pub service_names: Vec<String>,
    pub key_algorithm: String,
    pub default_key_name: String,
    pub connect_timeout_secs: u64,
    /// Remote command executed by the connection test
    pub probe_command: String,
    pub invalid_choice_pause_ms: u64,
    /// Upper bound for local helper commands (getent, sshd -t, systemctl)
    pub command_timeout_secs: u64,
}

impl Default for ManagerConfig {
    fn default() -> Self {
        Self {
            sshd_config_path: PathBuf::from("/etc/ssh/sshd_config"),
            sshd_binary: "sshd".to_string(),
            service_names: vec!["sshd".to_string(), "ssh".to_string()],
            key_algorithm: "ed25519".to_string(),
            default_key_name: "id_ed25519".to_string(),
            connect_timeout_secs: 10,
            probe_command: "echo 'SSH connection successful!'".to_string(),
            invalid_choice_pause_ms: 2000,
            command_timeout_secs: 30,
        }
    }
}

impl ManagerConfig {
    /// Load defaults, then apply the file named by `SSHD_AUTH_MANAGER_CONFIG` if set.
    pub fn load() -> AuthResult<Self> {
        match std::env::var_os(CONFIG_ENV_VAR) {
            Some(path) if !path.is_empty() => Self::from_file(Path::new(&path)),
            _ => Ok(Self::default()),
        }
    }

    pub fn from_file(path: &Path) -> AuthResult<Self> {
        let content = std::fs::read_to_string(path).map_err(|e| AuthManagerError::Config {
            message: format!("Failed to read {}: {}", path.display(), e),
        })?;
        let config = Self::from_json(&content)?;
        log::info!("[config] Loaded overrides from {}", path.display());
        Ok(config)
    }

    pub fn from_json(content: &str) -> AuthResult<Self> {
        let config: Self = serde_json::from_str(content)?;
        config.validate()?;
        Ok(config)
    }

    fn validate(&self) -> AuthResult<()> {
        if self.service_names.is_empty() {
            return Err(AuthManagerError::Config {
                message: "service_names must list at least one service".to_string(),
            });
        }
        if self.default_key_name.is_empty() {
            return Err(AuthManagerError::Config {
                message: "default_key_name cannot be empty".to_string(),
            });
        }
        if self.connect_timeout_secs == 0 {
            return Err(AuthManagerError::Config {
                message: "connect_timeout_secs must be greater than zero".to_string(),
            });
        }
        Ok(())
    }

    pub fn connect_timeout(&self) -> Duration {
        Duration::from_secs(self.connect_timeout_secs)
    }

    /// Outer bound for the whole `ssh` invocation: connect timeout plus a grace period.
    pub fn ssh_timeout(&self) -> Duration {
        Duration::from_secs(self.connect_timeout_secs + 5)
    }

    pub fn command_timeout(&self) -> Duration {
        Duration::from_secs(self.command_timeout_secs)
    }

    pub fn invalid_choice_pause(&self) -> Duration {
        Duration::from_millis(self.invalid_choice_pause_ms)
    }
}
