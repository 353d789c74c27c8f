use crate::models::{AuthManagerError, AuthResult, ManagerConfig};
use crate::services::{CommandRunner, CommandSpec};
use crate::utils::{SetAction, SshdConfig};
use chrono::Local;
use std::path::{Path, PathBuf};
use tokio::fs;

/// Authentication policy written into sshd_config
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum AuthMode {
    /// Public keys only, passwords refused
    KeyOnly,
    /// Password logins accepted again
    PasswordAllowed,
}

impl AuthMode {
    pub fn directives(self) -> &'static [(&'static str, &'static str)] {
        match self {
            AuthMode::KeyOnly => &[
                ("PasswordAuthentication", "no"),
                ("PubkeyAuthentication", "yes"),
            ],
            AuthMode::PasswordAllowed => &[("PasswordAuthentication", "yes")],
        }
    }

    pub fn label(self) -> &'static str {
        match self {
            AuthMode::KeyOnly => "key-only authentication",
            AuthMode::PasswordAllowed => "password authentication",
        }
    }
}

/// One directive touched by a mutation
#[derive(Debug, Clone, PartialEq)]
pub struct DirectiveChange {
    pub keyword: String,
    pub value: String,
    pub action: SetAction,
}

/// Everything an operator needs after a successful mutation
#[derive(Debug, Clone)]
pub struct MutationReport {
    pub config_path: PathBuf,
    pub backup_path: PathBuf,
    pub changes: Vec<DirectiveChange>,
    pub restarted_service: String,
    /// Settings elsewhere in the file that may still win over ours
    pub warnings: Vec<String>,
}

/// Backup, rewrite, validate and reload the SSH daemon configuration.
pub struct ConfigMutator<'a> {
    config: &'a ManagerConfig,
    runner: &'a dyn CommandRunner,
}

impl<'a> ConfigMutator<'a> {
    pub fn new(config: &'a ManagerConfig, runner: &'a dyn CommandRunner) -> Self {
        Self { config, runner }
    }

    pub async fn apply(&self, mode: AuthMode) -> AuthResult<MutationReport> {
        let config_path = self.config.sshd_config_path.as_path();
        if !config_path.is_file() {
            return Err(AuthManagerError::ConfigNotFound {
                path: config_path.to_path_buf(),
            });
        }

        let backup_path = backup_config(config_path).await?;
        log::info!(
            "[config_mutator] Backed up {} to {}",
            config_path.display(),
            backup_path.display()
        );

        let content = fs::read_to_string(config_path).await?;
        let mut sshd_config = SshdConfig::parse(&content);

        let changes: Vec<DirectiveChange> = mode
            .directives()
            .iter()
            .map(|&(keyword, value)| {
                let action = sshd_config.set(keyword, value);
                log::info!("[config_mutator] {} {} -> {:?}", keyword, value, action);
                DirectiveChange {
                    keyword: keyword.to_string(),
                    value: value.to_string(),
                    action,
                }
            })
            .collect();

        fs::write(config_path, sshd_config.to_string()).await?;

        let warnings = shadowing_warnings(&sshd_config, mode);
        for warning in &warnings {
            log::warn!("[config_mutator] {}", warning);
        }

        self.validate(config_path, &backup_path).await?;
        let restarted_service = self.restart().await?;

        Ok(MutationReport {
            config_path: config_path.to_path_buf(),
            backup_path,
            changes,
            restarted_service,
            warnings,
        })
    }

    /// Run `sshd -t`. A validator that cannot run counts as a failed validation.
    async fn validate(&self, config_path: &Path, backup_path: &Path) -> AuthResult<()> {
        let spec = CommandSpec::new(self.config.sshd_binary.as_str())
            .arg("-t")
            .arg("-f")
            .arg(config_path.to_string_lossy())
            .timeout(self.config.command_timeout());

        let diagnostics = match self.runner.run(&spec).await {
            Ok(output) if output.success() => {
                log::info!("[config_mutator] Configuration test passed");
                return Ok(());
            }
            Ok(output) => {
                let stderr = output.stderr.trim();
                if stderr.is_empty() {
                    format!("{} -t exited with status {}", self.config.sshd_binary, output.status_text())
                } else {
                    stderr.to_string()
                }
            }
            Err(e) => e.to_string(),
        };

        log::error!("[config_mutator] Configuration test failed: {}", diagnostics);
        Err(AuthManagerError::ConfigValidationFailed {
            backup: backup_path.to_path_buf(),
            diagnostics,
        })
    }

    /// Try each configured service name until one restarts
    async fn restart(&self) -> AuthResult<String> {
        let mut failures = Vec::new();

        for service in &self.config.service_names {
            let spec = CommandSpec::new("systemctl")
                .args(["restart", service.as_str()])
                .timeout(self.config.command_timeout());

            match self.runner.run(&spec).await {
                Ok(output) if output.success() => {
                    log::info!("[config_mutator] Restarted {}", service);
                    return Ok(service.clone());
                }
                Ok(output) => {
                    log::warn!(
                        "[config_mutator] systemctl restart {} exited with {}",
                        service,
                        output.status_text()
                    );
                    failures.push(format!("{}: {}", service, output.stderr.trim()));
                }
                Err(e) => {
                    log::warn!("[config_mutator] systemctl restart {} failed: {}", service, e);
                    failures.push(format!("{}: {}", service, e));
                }
            }
        }

        Err(AuthManagerError::ServiceRestartFailed {
            services: self.config.service_names.join(", "),
            message: failures.join("; "),
        })
    }
}

/// Copy the config to `<name>.bak.<YYYYMMDD_HHMMSS>`, adding `-N` if that name is taken
pub async fn backup_config(config_path: &Path) -> AuthResult<PathBuf> {
    let stamp = Local::now().format("%Y%m%d_%H%M%S").to_string();
    let file_name = config_path
        .file_name()
        .map(|name| name.to_string_lossy().to_string())
        .unwrap_or_else(|| "sshd_config".to_string());
    let base = format!("{}.bak.{}", file_name, stamp);

    let mut backup_path = config_path.with_file_name(&base);
    let mut counter = 1;
    while backup_path.exists() {
        backup_path = config_path.with_file_name(format!("{}-{}", base, counter));
        counter += 1;
    }

    fs::copy(config_path, &backup_path)
        .await
        .map_err(|e| AuthManagerError::Io {
            message: format!("Failed to back up {}: {}", config_path.display(), e),
        })?;

    Ok(backup_path)
}

fn shadowing_warnings(sshd_config: &SshdConfig, mode: AuthMode) -> Vec<String> {
    let mut warnings = Vec::new();

    for include in sshd_config.includes() {
        warnings.push(format!(
            "Included file(s) {} are read first and may override these settings",
            include
        ));
    }

    for &(keyword, value) in mode.directives() {
        for other in sshd_config.match_overrides(keyword) {
            if !other.eq_ignore_ascii_case(value) {
                warnings.push(format!("A Match block sets {} {}", keyword, other));
            }
        }
    }

    warnings
}
