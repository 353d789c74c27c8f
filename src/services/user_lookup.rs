use crate::models::{AuthManagerError, AuthResult, UserAccount};
use crate::services::{CommandRunner, CommandSpec};
use crate::utils::validate_username;
use std::path::PathBuf;
use std::time::Duration;

/// getent exit status for "key not found in database"
const GETENT_NOT_FOUND: i32 = 2;

/// Resolves accounts through the NSS passwd database via `getent`.
pub struct UserLookup<'a> {
    runner: &'a dyn CommandRunner,
    timeout: Duration,
}

impl<'a> UserLookup<'a> {
    pub fn new(runner: &'a dyn CommandRunner, timeout: Duration) -> Self {
        Self { runner, timeout }
    }

    pub async fn find(&self, username: &str) -> AuthResult<UserAccount> {
        validate_username(username)?;

        let spec = CommandSpec::new("getent")
            .args(["passwd", username])
            .timeout(self.timeout);
        let output = self.runner.run(&spec).await?;

        if output.status == Some(GETENT_NOT_FOUND) {
            log::info!("[user_lookup] No passwd entry for {}", username);
            return Err(AuthManagerError::UserNotFound {
                username: username.to_string(),
            });
        }
        let output = output.into_result("getent")?;

        output
            .stdout
            .lines()
            .filter_map(parse_passwd_entry)
            .find(|account| account.username == username)
            .ok_or_else(|| AuthManagerError::UserNotFound {
                username: username.to_string(),
            })
    }
}

/// Parse `name:passwd:uid:gid:gecos:home:shell`
pub fn parse_passwd_entry(line: &str) -> Option<UserAccount> {
    let fields: Vec<&str> = line.trim_end().split(':').collect();
    if fields.len() != 7 {
        return None;
    }

    let home = fields[5];
    if home.is_empty() {
        return None;
    }

    Some(UserAccount {
        username: fields[0].to_string(),
        uid: fields[2].parse().ok()?,
        gid: fields[3].parse().ok()?,
        home: PathBuf::from(home),
    })
}
