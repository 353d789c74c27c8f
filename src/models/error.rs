use std::path::PathBuf;
use thiserror::Error;

#[derive(Error, Debug)]
pub enum AuthManagerError {
    // 前置條件錯誤
    #[error("This program must be run as root (effective uid {uid})")]
    NotPrivileged { uid: u32 },

    #[error("SSH daemon configuration not found: {}", .path.display())]
    ConfigNotFound { path: PathBuf },

    #[error("User not found: {username}")]
    UserNotFound { username: String },

    #[error("Key not found: {}", .path.display())]
    KeyNotFound { path: PathBuf },

    #[error("Key already exists: {}", .path.display())]
    KeyAlreadyExists { path: PathBuf },

    #[error("Invalid key name: {message}")]
    InvalidKeyName { message: String },

    #[error("Invalid input: {message}")]
    InvalidInput { message: String },

    // 驗證錯誤
    #[error(
        "sshd rejected the new configuration, service not restarted (backup: {}): {diagnostics}",
        .backup.display()
    )]
    ConfigValidationFailed { backup: PathBuf, diagnostics: String },

    // 外部命令錯誤
    #[error("{program} failed with status {status}: {stderr}")]
    CommandFailed {
        program: String,
        status: String,
        stderr: String,
    },

    #[error("Failed to run {program}: {message}")]
    CommandUnavailable { program: String, message: String },

    #[error("{program} timed out after {secs}s")]
    CommandTimeout { program: String, secs: u64 },

    #[error("Failed to restart SSH service ({services}): {message}")]
    ServiceRestartFailed { services: String, message: String },

    // 使用者拒絕
    #[error("Operation declined: {action}")]
    Declined { action: String },

    // 系統錯誤
    #[error("IO error: {message}")]
    Io { message: String },

    #[error("Configuration error: {message}")]
    Config { message: String },
}

impl From<std::io::Error> for AuthManagerError {
    fn from(e: std::io::Error) -> Self {
        AuthManagerError::Io {
            message: e.to_string(),
        }
    }
}

impl From<serde_json::Error> for AuthManagerError {
    fn from(e: serde_json::Error) -> Self {
        AuthManagerError::Config {
            message: e.to_string(),
        }
    }
}

pub type AuthResult<T> = Result<T, AuthManagerError>;

impl AuthManagerError {
    pub fn error_type(&self) -> &'static str {
        match self {
            AuthManagerError::NotPrivileged { .. } => "NotPrivileged",
            AuthManagerError::ConfigNotFound { .. } => "ConfigNotFound",
            AuthManagerError::UserNotFound { .. } => "UserNotFound",
            AuthManagerError::KeyNotFound { .. } => "KeyNotFound",
            AuthManagerError::KeyAlreadyExists { .. } => "KeyAlreadyExists",
            AuthManagerError::InvalidKeyName { .. } => "InvalidKeyName",
            AuthManagerError::InvalidInput { .. } => "InvalidInput",
            AuthManagerError::ConfigValidationFailed { .. } => "ConfigValidationFailed",
            AuthManagerError::CommandFailed { .. } => "CommandFailed",
            AuthManagerError::CommandUnavailable { .. } => "CommandUnavailable",
            AuthManagerError::CommandTimeout { .. } => "CommandTimeout",
            AuthManagerError::ServiceRestartFailed { .. } => "ServiceRestartFailed",
            AuthManagerError::Declined { .. } => "Declined",
            AuthManagerError::Io { .. } => "Io",
            AuthManagerError::Config { .. } => "Config",
        }
    }
}
