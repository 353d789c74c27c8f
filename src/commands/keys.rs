use super::{fail, CommandContext};
use crate::models::{AuthManagerError, Outcome};
use crate::prompt::{ask, Prompter};
use crate::services::{KeyGenerator, KeyRequest, UserLookup};
use crate::utils::validate_key_name;

/// 為本機使用者建立 SSH 密鑰對
pub async fn create_ssh_key(ctx: CommandContext<'_>, prompter: &mut dyn Prompter) -> Outcome {
    log::info!("[keys] Creating SSH key");

    let username = match ask(prompter, "Enter the username for the SSH key: ") {
        Ok(name) => name,
        Err(e) => return fail(prompter, "keys", e),
    };

    let lookup = UserLookup::new(ctx.runner, ctx.config.command_timeout());
    let account = match lookup.find(&username).await {
        Ok(account) => account,
        Err(AuthManagerError::UserNotFound { username }) => {
            log::warn!("[keys] User not found: {}", username);
            prompter.say(&format!("Error: user '{}' not found", username));
            return Outcome::Failure;
        }
        Err(e) => return fail(prompter, "keys", e),
    };

    let default_name = ctx.config.default_key_name.as_str();
    let key_name = match ask(
        prompter,
        &format!("Enter key filename [{}]: ", default_name),
    ) {
        Ok(name) if name.is_empty() => default_name.to_string(),
        Ok(name) => name,
        Err(e) => return fail(prompter, "keys", e),
    };
    if let Err(e) = validate_key_name(&key_name) {
        return fail(prompter, "keys", e);
    }

    let passphrase = match prompter.confirm("Protect the key with a passphrase?") {
        Ok(answer) => answer,
        Err(e) => return fail(prompter, "keys", e),
    };

    let mut overwrite = false;
    if KeyGenerator::key_exists(&account, &key_name) {
        let path = KeyGenerator::private_key_path(&account, &key_name);
        prompter.say(&format!("Key {} already exists.", path.display()));
        match prompter.confirm("Overwrite it?") {
            Ok(true) => overwrite = true,
            Ok(false) => {
                return fail(
                    prompter,
                    "keys",
                    AuthManagerError::Declined {
                        action: format!("overwrite {}", path.display()),
                    },
                )
            }
            Err(e) => return fail(prompter, "keys", e),
        }
    }

    let request = KeyRequest {
        key_name,
        passphrase,
        overwrite,
    };

    let generator = KeyGenerator::new(ctx.config, ctx.runner);
    match generator.generate(&account, &request).await {
        Ok(info) => {
            log::info!("[keys] Key generated successfully");
            prompter.say(&format!(
                "SSH key created for {}:\n  private: {}\n  public:  {}",
                info.owner,
                info.private_key_path.display(),
                info.public_key_path.display()
            ));
            if let Some(fingerprint) = &info.fingerprint {
                prompter.say(&format!("  fingerprint: {}", fingerprint));
            }
            Outcome::Success
        }
        Err(e) => fail(prompter, "keys", e),
    }
}
