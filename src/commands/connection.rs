use super::{fail, CommandContext};
use crate::models::{AuthManagerError, ConnectionTarget, Outcome};
use crate::prompt::{ask, Prompter};
use crate::services::ConnectionTester;
use crate::utils::expand_home;

/// Test SSH connection.
///
/// Returns success whenever an attempt was made, even if the remote
/// side rejected it; failure means a precondition stopped the attempt.
pub async fn test_ssh_connection(ctx: CommandContext<'_>, prompter: &mut dyn Prompter) -> Outcome {
    let target = match read_target(prompter) {
        Ok(target) => target,
        Err(e) => return fail(prompter, "connection", e),
    };
    log::info!("[connection] Testing SSH connection to: {}", target.destination());

    let tester = ConnectionTester::new(ctx.config, ctx.runner);
    let permissions = match tester.preflight(&target).await {
        Ok(permissions) => permissions,
        Err(e) => return fail(prompter, "connection", e),
    };

    if !permissions.is_valid {
        prompter.say(&format!("Warning: {}", permissions.message));
        prompter.say(&format!(
            "Fix with: chmod {} {}",
            permissions.expected_mode,
            target.key_path.display()
        ));
        match prompter.confirm("Continue anyway?") {
            Ok(true) => log::warn!(
                "[connection] Proceeding with key mode {}",
                permissions.current_mode
            ),
            Ok(false) => {
                return fail(
                    prompter,
                    "connection",
                    AuthManagerError::Declined {
                        action: format!(
                            "use {} with mode {}",
                            target.key_path.display(),
                            permissions.current_mode
                        ),
                    },
                )
            }
            Err(e) => return fail(prompter, "connection", e),
        }
    }

    prompter.say(&format!("Connecting to {}...", target.destination()));
    let result = match tester.attempt(&target).await {
        Ok(result) => result,
        Err(e) => return fail(prompter, "connection", e),
    };

    if !result.stdout.trim().is_empty() {
        prompter.say(&format!("Output: {}", result.stdout.trim()));
    }
    if !result.stderr.trim().is_empty() {
        prompter.say(&format!("Diagnostics: {}", result.stderr.trim()));
    }
    let status = result
        .exit_status
        .map_or_else(|| "none".to_string(), |code| code.to_string());
    prompter.say(&format!("{} (exit status {})", result.summary(), status));

    Outcome::Success
}

fn read_target(prompter: &mut dyn Prompter) -> Result<ConnectionTarget, AuthManagerError> {
    let host = ask(prompter, "Enter the remote host (IP or hostname): ")?;
    let username = ask(prompter, "Enter the remote username: ")?;
    let key_path = ask(prompter, "Enter the path to the private key file: ")?;

    Ok(ConnectionTarget {
        host,
        username,
        key_path: expand_home(&key_path),
    })
}
