use crate::models::{AuthManagerError, AuthResult};

/// Root check performed once at startup
pub struct PrivilegeGate;

impl PrivilegeGate {
    pub fn effective_uid() -> u32 {
        rustix::process::geteuid().as_raw()
    }

    /// Fail unless the process runs with effective uid 0
    pub fn check() -> AuthResult<()> {
        Self::check_uid(Self::effective_uid())
    }

    pub fn check_uid(uid: u32) -> AuthResult<()> {
        if uid == 0 {
            log::debug!("[privilege] Running as root");
            Ok(())
        } else {
            log::error!("[privilege] Refusing to run as uid {}", uid);
            Err(AuthManagerError::NotPrivileged { uid })
        }
    }
}
