//! Operator interaction: prompts, confirmations and status output.

use crate::models::{AuthManagerError, AuthResult};
use std::io::{self, BufRead, Write};

pub trait Prompter {
    /// Print `prompt` and read one line. `Ok(None)` means input is closed.
    fn read_line(&mut self, prompt: &str) -> AuthResult<Option<String>>;

    /// Show a message to the operator
    fn say(&mut self, message: &str);

    /// Yes/no question, defaulting to no
    fn confirm(&mut self, question: &str) -> AuthResult<bool> {
        let answer = self.read_line(&format!("{} [y/N]: ", question))?;
        Ok(matches!(
            answer.as_deref().map(|a| a.trim().to_lowercase()).as_deref(),
            Some("y") | Some("yes")
        ))
    }
}

/// Read a trimmed answer, treating closed input as an error
pub fn ask(prompter: &mut dyn Prompter, prompt: &str) -> AuthResult<String> {
    match prompter.read_line(prompt)? {
        Some(line) => Ok(line.trim().to_string()),
        None => Err(AuthManagerError::InvalidInput {
            message: "input closed".to_string(),
        }),
    }
}

/// Prompter on the process's stdin/stdout
pub struct StdioPrompter {
    stdin: io::StdinLock<'static>,
}

impl StdioPrompter {
    pub fn new() -> Self {
        Self {
            stdin: io::stdin().lock(),
        }
    }
}

impl Default for StdioPrompter {
    fn default() -> Self {
        Self::new()
    }
}

impl Prompter for StdioPrompter {
    fn read_line(&mut self, prompt: &str) -> AuthResult<Option<String>> {
        let mut stdout = io::stdout();
        write!(stdout, "{}", prompt)?;
        stdout.flush()?;

        let mut line = String::new();
        if self.stdin.read_line(&mut line)? == 0 {
            return Ok(None);
        }
        Ok(Some(line.trim_end_matches(&['\r', '\n'][..]).to_string()))
    }

    fn say(&mut self, message: &str) {
        println!("{}", message);
    }
}
