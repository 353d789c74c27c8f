use crate::models::{AuthManagerError, AuthResult, KeyPairInfo, KeyType, ManagerConfig, UserAccount};
use crate::services::permission_service::{PRIVATE_KEY_MODE, PUBLIC_KEY_MODE};
use crate::services::{CommandRunner, CommandSpec, PermissionService};
use crate::utils::validate_key_name;
use ssh_key::PublicKey;
use std::path::{Path, PathBuf};
use tokio::fs;

/// 密鑰生成請求
#[derive(Debug, Clone)]
pub struct KeyRequest {
    pub key_name: String,
    /// 由 ssh-keygen 在終端機上詢問密碼
    pub passphrase: bool,
    /// 允許覆寫既有的密鑰對
    pub overwrite: bool,
}

/// Generates key pairs for a local account through `ssh-keygen`.
pub struct KeyGenerator<'a> {
    config: &'a ManagerConfig,
    runner: &'a dyn CommandRunner,
}

impl<'a> KeyGenerator<'a> {
    pub fn new(config: &'a ManagerConfig, runner: &'a dyn CommandRunner) -> Self {
        Self { config, runner }
    }

    /// 私鑰路徑
    pub fn private_key_path(account: &UserAccount, key_name: &str) -> PathBuf {
        account.ssh_dir().join(key_name)
    }

    /// 公鑰路徑
    pub fn public_key_path(account: &UserAccount, key_name: &str) -> PathBuf {
        account.ssh_dir().join(format!("{}.pub", key_name))
    }

    /// Whether either half of the pair is already on disk (links included)
    pub fn key_exists(account: &UserAccount, key_name: &str) -> bool {
        is_present(&Self::private_key_path(account, key_name))
            || is_present(&Self::public_key_path(account, key_name))
    }

    /// 覆寫時先寫入的暫存路徑
    fn staging_key_path(account: &UserAccount, key_name: &str) -> PathBuf {
        account.ssh_dir().join(format!(".{}.new", key_name))
    }

    /// 生成新的 SSH 密鑰對
    ///
    /// When replacing an existing pair the new key is written under a
    /// staging name and only renamed over the old files once `ssh-keygen`
    /// has succeeded.
    pub async fn generate(
        &self,
        account: &UserAccount,
        request: &KeyRequest,
    ) -> AuthResult<KeyPairInfo> {
        validate_key_name(&request.key_name)?;

        let ssh_dir = account.ssh_dir();
        let private_key_path = Self::private_key_path(account, &request.key_name);
        let public_key_path = Self::public_key_path(account, &request.key_name);

        // 檢查是否已存在
        let replacing = Self::key_exists(account, &request.key_name);
        if replacing && !request.overwrite {
            return Err(AuthManagerError::KeyAlreadyExists {
                path: private_key_path,
            });
        }

        // 確保 SSH 目錄存在
        PermissionService::ensure_ssh_dir(&ssh_dir).await?;
        PermissionService::set_owner(&ssh_dir, account.uid, account.gid)?;
        PermissionService::reject_symlink(&private_key_path).await?;
        PermissionService::reject_symlink(&public_key_path).await?;

        let output_path = if replacing {
            let staging = Self::staging_key_path(account, &request.key_name);
            remove_pair(&staging).await?;
            staging
        } else {
            private_key_path.clone()
        };
        let output_public_path = public_path_for(&output_path);

        let comment = format!("{}@{}", account.username, local_hostname());
        let mut spec = CommandSpec::new("ssh-keygen")
            .args(["-t", self.config.key_algorithm.as_str()])
            .arg("-f")
            .arg(output_path.to_string_lossy())
            .args(["-C", comment.as_str()]);

        spec = if request.passphrase {
            spec.interactive()
        } else {
            spec.args(["-N", "", "-q"])
        };

        log::info!(
            "[key_generator] Generating {} key for {}: {}",
            self.config.key_algorithm,
            account.username,
            private_key_path.display()
        );
        if let Err(e) = self.install(&spec, account, &output_path, &output_public_path).await {
            if replacing {
                // 舊密鑰對保持原樣
                if let Err(cleanup) = remove_pair(&output_path).await {
                    log::warn!("[key_generator] Failed to clean up staging key: {}", cleanup);
                }
            }
            return Err(e);
        }

        if replacing {
            fs::rename(&output_path, &private_key_path).await?;
            fs::rename(&output_public_path, &public_key_path).await?;
            log::info!(
                "[key_generator] Replaced existing key pair {}",
                private_key_path.display()
            );
        }

        let (key_type, fingerprint) = match read_public_key(&public_key_path).await {
            Some(public_key) => (
                KeyType::from(public_key.algorithm().as_str()),
                Some(public_key.fingerprint(ssh_key::HashAlg::Sha256).to_string()),
            ),
            None => (KeyType::from(self.config.key_algorithm.as_str()), None),
        };

        log::info!(
            "[key_generator] Generated {} key: {}",
            key_type,
            request.key_name
        );

        Ok(KeyPairInfo {
            name: request.key_name.clone(),
            owner: account.username.clone(),
            key_type,
            private_key_path,
            public_key_path,
            fingerprint,
        })
    }

    /// Run `ssh-keygen`, then fix modes and ownership of what it wrote
    async fn install(
        &self,
        spec: &CommandSpec,
        account: &UserAccount,
        private_path: &Path,
        public_path: &Path,
    ) -> AuthResult<()> {
        self.runner.run(spec).await?.into_result("ssh-keygen")?;

        if !private_path.is_file() || !public_path.is_file() {
            return Err(AuthManagerError::KeyNotFound {
                path: public_path.to_path_buf(),
            });
        }
        PermissionService::reject_symlink(private_path).await?;
        PermissionService::reject_symlink(public_path).await?;

        // 設定私鑰權限為 600，公鑰權限為 644
        PermissionService::set_mode(private_path, PRIVATE_KEY_MODE).await?;
        PermissionService::set_mode(public_path, PUBLIC_KEY_MODE).await?;
        PermissionService::set_owner(private_path, account.uid, account.gid)?;
        PermissionService::set_owner(public_path, account.uid, account.gid)?;
        Ok(())
    }
}

fn public_path_for(private_path: &Path) -> PathBuf {
    let mut name = private_path.as_os_str().to_os_string();
    name.push(".pub");
    PathBuf::from(name)
}

fn is_present(path: &Path) -> bool {
    std::fs::symlink_metadata(path).is_ok()
}

async fn remove_pair(private_path: &Path) -> AuthResult<()> {
    remove_if_exists(private_path).await?;
    remove_if_exists(&public_path_for(private_path)).await
}

async fn remove_if_exists(path: &Path) -> AuthResult<()> {
    match fs::remove_file(path).await {
        Ok(()) => Ok(()),
        Err(e) if e.kind() == std::io::ErrorKind::NotFound => Ok(()),
        Err(e) => Err(e.into()),
    }
}

/// 解析公鑰，失敗時僅記錄
async fn read_public_key(path: &Path) -> Option<PublicKey> {
    let content = fs::read_to_string(path).await.ok()?;
    match PublicKey::from_openssh(content.trim()) {
        Ok(key) => Some(key),
        Err(e) => {
            log::warn!(
                "[key_generator] Could not parse {}: {}",
                path.display(),
                e
            );
            None
        }
    }
}

fn local_hostname() -> String {
    whoami::fallible::hostname().unwrap_or_else(|_| "localhost".to_string())
}

#[cfg(test)]
mod tests {
    use super::*;

    fn account() -> UserAccount {
        UserAccount {
            username: "deploy".to_string(),
            uid: 1001,
            gid: 1001,
            home: PathBuf::from("/home/deploy"),
        }
    }

    #[test]
    fn test_key_paths() {
        let account = account();
        assert_eq!(
            KeyGenerator::private_key_path(&account, "id_ed25519"),
            PathBuf::from("/home/deploy/.ssh/id_ed25519")
        );
        assert_eq!(
            KeyGenerator::public_key_path(&account, "id_ed25519"),
            PathBuf::from("/home/deploy/.ssh/id_ed25519.pub")
        );
        assert_eq!(
            KeyGenerator::staging_key_path(&account, "id_ed25519"),
            PathBuf::from("/home/deploy/.ssh/.id_ed25519.new")
        );
        assert_eq!(
            public_path_for(&KeyGenerator::staging_key_path(&account, "id_ed25519")),
            PathBuf::from("/home/deploy/.ssh/.id_ed25519.new.pub")
        );
    }
}
