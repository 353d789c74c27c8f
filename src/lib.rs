pub mod commands;
pub mod menu;
pub mod models;
pub mod prompt;
pub mod services;
pub mod utils;

pub use commands::CommandContext;
pub use menu::{Menu, MenuChoice, MenuState};
pub use models::{AuthManagerError, AuthResult, ManagerConfig, Outcome};
pub use prompt::{Prompter, StdioPrompter};
pub use services::{CommandRunner, PrivilegeGate, SystemCommandRunner};
