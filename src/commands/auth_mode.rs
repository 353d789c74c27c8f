use super::{fail, CommandContext};
use crate::models::{AuthManagerError, Outcome};
use crate::prompt::Prompter;
use crate::services::{AuthMode, ConfigMutator};
use crate::utils::SetAction;

/// Force public-key-only authentication
pub async fn force_key_auth(ctx: CommandContext<'_>, prompter: &mut dyn Prompter) -> Outcome {
    apply_auth_mode(ctx, prompter, AuthMode::KeyOnly).await
}

/// Allow password authentication again
pub async fn allow_password_auth(ctx: CommandContext<'_>, prompter: &mut dyn Prompter) -> Outcome {
    apply_auth_mode(ctx, prompter, AuthMode::PasswordAllowed).await
}

async fn apply_auth_mode(
    ctx: CommandContext<'_>,
    prompter: &mut dyn Prompter,
    mode: AuthMode,
) -> Outcome {
    log::info!("[auth_mode] Switching sshd to {}", mode.label());
    prompter.say(&format!(
        "Configuring {} for {}...",
        ctx.config.sshd_config_path.display(),
        mode.label()
    ));

    let mutator = ConfigMutator::new(ctx.config, ctx.runner);
    match mutator.apply(mode).await {
        Ok(report) => {
            prompter.say(&format!("Backup saved to {}", report.backup_path.display()));
            for change in &report.changes {
                let note = match change.action {
                    SetAction::Unchanged => " (already set)",
                    SetAction::Replaced => "",
                    SetAction::Appended => " (added)",
                };
                prompter.say(&format!("  {} {}{}", change.keyword, change.value, note));
            }
            for warning in &report.warnings {
                prompter.say(&format!("Warning: {}", warning));
            }
            prompter.say(&format!(
                "Service {} restarted; {} is now active.",
                report.restarted_service,
                mode.label()
            ));
            Outcome::Success
        }
        Err(e) => {
            if let AuthManagerError::ConfigValidationFailed { backup, .. } = &e {
                prompter.say(&format!(
                    "The modified file was left in place. To roll back: cp {} {}",
                    backup.display(),
                    ctx.config.sshd_config_path.display()
                ));
            }
            fail(prompter, "auth_mode", e)
        }
    }
}
