//! Numbered-option loop that dispatches to the command layer.

use crate::commands::{self, CommandContext};
use crate::models::Outcome;
use crate::prompt::Prompter;

const MENU: &str = "\
=============================
   SSH Authentication Manager
=============================
1. Create SSH key
2. Force key-only authentication
3. Allow password authentication
4. Test SSH connection
5. Exit";

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum MenuChoice {
    CreateKey,
    ForceKeyAuth,
    AllowPasswordAuth,
    TestConnection,
    Exit,
}

impl MenuChoice {
    /// Parse one line of operator input
    pub fn parse(input: &str) -> Option<Self> {
        match input.trim().to_lowercase().as_str() {
            "1" => Some(MenuChoice::CreateKey),
            "2" => Some(MenuChoice::ForceKeyAuth),
            "3" => Some(MenuChoice::AllowPasswordAuth),
            "4" => Some(MenuChoice::TestConnection),
            "5" | "exit" | "quit" | "q" => Some(MenuChoice::Exit),
            _ => None,
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum MenuState {
    Displaying,
    Dispatching(MenuChoice),
    Exiting,
}

pub struct Menu<'a> {
    ctx: CommandContext<'a>,
    prompter: &'a mut dyn Prompter,
}

impl<'a> Menu<'a> {
    pub fn new(ctx: CommandContext<'a>, prompter: &'a mut dyn Prompter) -> Self {
        Self { ctx, prompter }
    }

    /// Run until the operator exits; returns the process exit status
    pub async fn run(&mut self) -> i32 {
        let mut state = MenuState::Displaying;

        loop {
            state = match state {
                MenuState::Displaying => self.display().await,
                MenuState::Dispatching(choice) => {
                    let outcome = self.dispatch(choice).await;
                    log::info!("[menu] {:?} finished with status {}", choice, outcome.code());
                    MenuState::Displaying
                }
                MenuState::Exiting => {
                    self.prompter.say("Goodbye.");
                    return 0;
                }
            };
        }
    }

    async fn display(&mut self) -> MenuState {
        self.prompter.say(MENU);

        let line = match self.prompter.read_line("Select an option [1-5]: ") {
            Ok(Some(line)) => line,
            Ok(None) => {
                log::info!("[menu] Input closed, exiting");
                return MenuState::Exiting;
            }
            Err(e) => {
                log::error!("[menu] Failed to read input: {}", e);
                return MenuState::Exiting;
            }
        };

        match MenuChoice::parse(&line) {
            Some(MenuChoice::Exit) => MenuState::Exiting,
            Some(choice) => MenuState::Dispatching(choice),
            None => {
                log::debug!("[menu] Invalid choice: {:?}", line);
                self.prompter
                    .say(&format!("Invalid option '{}'. Please choose 1-5.", line.trim()));
                tokio::time::sleep(self.ctx.config.invalid_choice_pause()).await;
                MenuState::Displaying
            }
        }
    }

    async fn dispatch(&mut self, choice: MenuChoice) -> Outcome {
        let prompter = &mut *self.prompter;
        match choice {
            MenuChoice::CreateKey => commands::create_ssh_key(self.ctx, prompter).await,
            MenuChoice::ForceKeyAuth => commands::force_key_auth(self.ctx, prompter).await,
            MenuChoice::AllowPasswordAuth => {
                commands::allow_password_auth(self.ctx, prompter).await
            }
            MenuChoice::TestConnection => commands::test_ssh_connection(self.ctx, prompter).await,
            MenuChoice::Exit => Outcome::Success,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_parse_choices() {
        assert_eq!(MenuChoice::parse("1"), Some(MenuChoice::CreateKey));
        assert_eq!(MenuChoice::parse(" 4\n"), Some(MenuChoice::TestConnection));
        assert_eq!(MenuChoice::parse("5"), Some(MenuChoice::Exit));
        assert_eq!(MenuChoice::parse("EXIT"), Some(MenuChoice::Exit));
    }

    #[test]
    fn test_parse_rejects_garbage() {
        for input in ["", "0", "6", "99", "abc", "1.0", "-1"] {
            assert_eq!(MenuChoice::parse(input), None, "{:?}", input);
        }
    }
}
