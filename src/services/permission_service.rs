use crate::models::{AuthManagerError, AuthResult};
use std::os::unix::fs::PermissionsExt;
use std::path::Path;

/// Mode for private keys (rw-------)
pub const PRIVATE_KEY_MODE: u32 = 0o600;
/// Mode for public keys (rw-r--r--)
pub const PUBLIC_KEY_MODE: u32 = 0o644;
/// Mode for `.ssh` directories (rwx------)
pub const SSH_DIR_MODE: u32 = 0o700;

/// Permission check result
#[derive(Debug, Clone, PartialEq)]
pub struct PermissionCheckResult {
    pub is_valid: bool,
    pub current_mode: String,
    pub expected_mode: String,
    pub message: String,
}

/// Permission service
pub struct PermissionService;

impl PermissionService {
    /// Read the permission bits of a file
    pub async fn mode(path: &Path) -> AuthResult<u32> {
        let metadata = tokio::fs::metadata(path)
            .await
            .map_err(|e| AuthManagerError::Io {
                message: format!("Failed to read metadata of {}: {}", path.display(), e),
            })?;
        Ok(metadata.permissions().mode() & 0o777)
    }

    /// Check key file permissions.
    ///
    /// Anything beyond owner read/write (group or other bits, or the owner
    /// execute bit) is reported as too open.
    pub async fn check_key_permissions(key_path: &Path) -> AuthResult<PermissionCheckResult> {
        if !key_path.is_file() {
            return Err(AuthManagerError::KeyNotFound {
                path: key_path.to_path_buf(),
            });
        }

        let file_mode = Self::mode(key_path).await?;
        let mode_str = format!("{:03o}", file_mode);
        let is_valid = (file_mode & !PRIVATE_KEY_MODE) == 0;

        Ok(PermissionCheckResult {
            is_valid,
            current_mode: mode_str.clone(),
            expected_mode: format!("{:03o}", PRIVATE_KEY_MODE),
            message: if is_valid {
                "Key permissions are correct".to_string()
            } else {
                format!(
                    "Key permissions are {} but should be 600. File is too accessible.",
                    mode_str
                )
            },
        })
    }

    /// Set exact permission bits on a path
    pub async fn set_mode(path: &Path, mode: u32) -> AuthResult<()> {
        let permissions = std::fs::Permissions::from_mode(mode);
        tokio::fs::set_permissions(path, permissions)
            .await
            .map_err(|e| AuthManagerError::Io {
                message: format!(
                    "Failed to set permissions {:03o} on {}: {}",
                    mode,
                    path.display(),
                    e
                ),
            })
    }

    /// Hand a path over to the given owner and group.
    ///
    /// Symbolic links are changed themselves, never their targets.
    pub fn set_owner(path: &Path, uid: u32, gid: u32) -> AuthResult<()> {
        std::os::unix::fs::lchown(path, Some(uid), Some(gid)).map_err(|e| AuthManagerError::Io {
            message: format!("Failed to chown {} to {}:{}: {}", path.display(), uid, gid, e),
        })
    }

    /// Refuse to operate through a symbolic link. A missing path passes.
    pub async fn reject_symlink(path: &Path) -> AuthResult<()> {
        match tokio::fs::symlink_metadata(path).await {
            Ok(metadata) if metadata.file_type().is_symlink() => {
                Err(AuthManagerError::InvalidInput {
                    message: format!("{} is a symbolic link, refusing to follow it", path.display()),
                })
            }
            Ok(_) => Ok(()),
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => Ok(()),
            Err(e) => Err(AuthManagerError::Io {
                message: format!("Failed to inspect {}: {}", path.display(), e),
            }),
        }
    }

    /// Create `.ssh` if needed and force it to 700.
    ///
    /// An existing `.ssh` must be a real directory, not a symbolic link.
    /// Returns whether the directory was created.
    pub async fn ensure_ssh_dir(ssh_dir: &Path) -> AuthResult<bool> {
        let created = match tokio::fs::symlink_metadata(ssh_dir).await {
            Ok(metadata) if metadata.file_type().is_symlink() => {
                log::warn!("[permissions] {} is a symbolic link", ssh_dir.display());
                return Err(AuthManagerError::InvalidInput {
                    message: format!(
                        "{} is a symbolic link, refusing to follow it",
                        ssh_dir.display()
                    ),
                });
            }
            Ok(metadata) if !metadata.is_dir() => {
                return Err(AuthManagerError::InvalidInput {
                    message: format!("{} exists but is not a directory", ssh_dir.display()),
                });
            }
            Ok(_) => false,
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => {
                tokio::fs::create_dir_all(ssh_dir)
                    .await
                    .map_err(|e| AuthManagerError::Io {
                        message: format!("Failed to create {}: {}", ssh_dir.display(), e),
                    })?;
                log::info!("[permissions] Created {}", ssh_dir.display());
                true
            }
            Err(e) => {
                return Err(AuthManagerError::Io {
                    message: format!("Failed to inspect {}: {}", ssh_dir.display(), e),
                })
            }
        };

        Self::set_mode(ssh_dir, SSH_DIR_MODE).await?;
        Ok(created)
    }
}
