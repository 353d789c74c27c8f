pub mod auth_mode;
pub mod connection;
pub mod keys;

pub use auth_mode::{allow_password_auth, force_key_auth};
pub use connection::test_ssh_connection;
pub use keys::create_ssh_key;

use crate::models::{AuthManagerError, ManagerConfig, Outcome};
use crate::prompt::Prompter;
use crate::services::CommandRunner;

/// Shared state handed to every menu operation
#[derive(Clone, Copy)]
pub struct CommandContext<'a> {
    pub config: &'a ManagerConfig,
    pub runner: &'a dyn CommandRunner,
}

impl<'a> CommandContext<'a> {
    pub fn new(config: &'a ManagerConfig, runner: &'a dyn CommandRunner) -> Self {
        Self { config, runner }
    }
}

/// Report an error to the operator and map it to a failed outcome
pub(crate) fn fail(prompter: &mut dyn Prompter, scope: &str, error: AuthManagerError) -> Outcome {
    log::warn!("[{}] {} ({})", scope, error, error.error_type());
    prompter.say(&format!("Error: {}", error));
    Outcome::Failure
}
