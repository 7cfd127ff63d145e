//! Plain stdin/stdout prompts for the login and signup flows.

use std::fmt;
use std::io::{self, Write};

#[derive(Debug, Clone)]
pub struct UiError {
    message: String,
}

impl UiError {
    pub fn new(message: impl Into<String>) -> Self {
        Self {
            message: message.into(),
        }
    }
}

impl fmt::Display for UiError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.message)
    }
}

impl std::error::Error for UiError {}

/// Prompt for one line of input; the trimmed answer may be empty.
pub fn prompt_line(label: &str) -> Result<String, UiError> {
    print!("{label}");
    io::stdout()
        .flush()
        .map_err(|err| UiError::new(err.to_string()))?;

    let mut input = String::new();
    io::stdin()
        .read_line(&mut input)
        .map_err(|err| UiError::new(err.to_string()))?;
    Ok(input.trim().to_string())
}

pub fn prompt_yes_no(label: &str) -> Result<bool, UiError> {
    let answer = prompt_line(&format!("{label} [y/N]: "))?;
    Ok(matches!(answer.as_str(), "y" | "Y" | "yes" | "Yes"))
}
