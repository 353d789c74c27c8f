use crate::models::{AuthManagerError, AuthResult};
use std::path::PathBuf;

/// 驗證 SSH 密鑰名稱，防止路徑遍歷攻擊
pub fn validate_key_name(key_name: &str) -> AuthResult<()> {
    // 檢查空值
    if key_name.is_empty() {
        return Err(AuthManagerError::InvalidKeyName {
            message: "Key name cannot be empty".to_string(),
        });
    }

    // 檢查路徑分隔符
    if key_name.contains('/') || key_name.contains('\\') {
        return Err(AuthManagerError::InvalidKeyName {
            message: format!("Key name must not contain path separators: {}", key_name),
        });
    }

    // 檢查特殊路徑名稱
    if key_name == "." || key_name == ".." {
        return Err(AuthManagerError::InvalidKeyName {
            message: format!("Key name is not a file name: {}", key_name),
        });
    }

    // 檢查 null 字節
    if key_name.contains('\0') {
        return Err(AuthManagerError::InvalidKeyName {
            message: "Key name contains null bytes".to_string(),
        });
    }

    // 覆寫時會寫入 .<name>.new.pub
    if key_name.len() > 246 {
        return Err(AuthManagerError::InvalidKeyName {
            message: "Key name too long (max 246 characters)".to_string(),
        });
    }

    Ok(())
}

/// 驗證主機名，防止命令注入
pub fn validate_hostname(hostname: &str) -> AuthResult<()> {
    if hostname.is_empty() {
        return Err(AuthManagerError::InvalidInput {
            message: "Hostname cannot be empty".to_string(),
        });
    }

    if hostname.len() > 255 {
        return Err(AuthManagerError::InvalidInput {
            message: "Hostname too long".to_string(),
        });
    }

    // A leading '-' would be parsed by ssh as an option
    if hostname.starts_with('-') {
        return Err(AuthManagerError::InvalidInput {
            message: format!("Hostname cannot start with '-': {}", hostname),
        });
    }

    // 只允許安全字符：字母、數字、點、連字符、下劃線、冒號（IPv6）、方括號（IPv6）
    let is_valid = hostname.chars().all(|c| {
        c.is_ascii_alphanumeric()
            || c == '.'
            || c == '-'
            || c == '_'
            || c == ':'
            || c == '['
            || c == ']'
    });

    if !is_valid {
        return Err(AuthManagerError::InvalidInput {
            message: format!("Hostname contains invalid characters: {}", hostname),
        });
    }

    Ok(())
}

/// Validate a local or remote account name (POSIX portable user name set)
pub fn validate_username(username: &str) -> AuthResult<()> {
    if username.is_empty() {
        return Err(AuthManagerError::InvalidInput {
            message: "Username cannot be empty".to_string(),
        });
    }

    if username.len() > 32 {
        return Err(AuthManagerError::InvalidInput {
            message: "Username too long (max 32 characters)".to_string(),
        });
    }

    if username.starts_with('-') {
        return Err(AuthManagerError::InvalidInput {
            message: format!("Username cannot start with '-': {}", username),
        });
    }

    let is_valid = username
        .chars()
        .all(|c| c.is_ascii_alphanumeric() || c == '.' || c == '-' || c == '_' || c == '$');

    if !is_valid {
        return Err(AuthManagerError::InvalidInput {
            message: format!("Username contains invalid characters: {}", username),
        });
    }

    Ok(())
}

/// Expand a leading `~/` against the invoking user's home directory
pub fn expand_home(path: &str) -> PathBuf {
    match path.strip_prefix("~/") {
        Some(rest) => match dirs::home_dir() {
            Some(home) => home.join(rest),
            None => PathBuf::from(path),
        },
        None => PathBuf::from(path),
    }
}
