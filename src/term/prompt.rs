//! Interactive prompts with per-field validation.

use console::{style, Term};
use std::cell::RefCell;
use std::io::{self, BufRead};
use thiserror::Error;

use crate::names::NameError;

/// Invalid answers tolerated before a prompt gives up.
const MAX_ATTEMPTS: usize = 5;

/// Validation applied to free-text answers.
pub type Validator = fn(&str) -> Result<(), NameError>;

#[derive(Debug, Error)]
pub enum PromptError {
    #[error("input closed before an answer was given")]
    Eof,
    #[error("no options to choose from")]
    NoOptions,
    #[error("gave up after {0} invalid answers")]
    TooManyAttempts(usize),
    #[error("failed to read from the terminal")]
    Io(#[from] io::Error),
}

/// Interactive input collection.
pub trait Prompter {
    /// Free text that passes `validate`.
    fn get(&self, prompt: &str, help: &str, validate: Validator) -> Result<String, PromptError>;

    /// One of `options`.
    fn select_one(&self, prompt: &str, help: &str, options: &[String])
        -> Result<String, PromptError>;

    /// Yes or no. No is the default.
    fn confirm(&self, prompt: &str, help: &str) -> Result<bool, PromptError>;
}

/// Prompter that writes to stderr and reads answers line by line.
///
/// Typing `?` at any prompt prints its help text.
pub struct TermPrompter {
    term: Term,
    input: RefCell<Box<dyn BufRead>>,
}

impl TermPrompter {
    /// Prompter reading from stdin.
    pub fn new() -> Self {
        Self::with_input(Box::new(io::BufReader::new(io::stdin())))
    }

    pub fn with_input(input: Box<dyn BufRead>) -> Self {
        Self {
            term: Term::stderr(),
            input: RefCell::new(input),
        }
    }

    fn ask(&self, prompt: &str, hint: &str) -> Result<String, PromptError> {
        self.term.write_str(&format!(
            "{} {} {} ",
            style("?").green().bold(),
            style(prompt).bold(),
            style(hint).dim()
        ))?;
        self.term.flush()?;

        let mut line = String::new();
        if self.input.borrow_mut().read_line(&mut line)? == 0 {
            self.term.write_line("")?;
            return Err(PromptError::Eof);
        }
        Ok(line.trim().to_string())
    }

    fn help(&self, help: &str) -> Result<(), PromptError> {
        self.term
            .write_line(&format!("  {}", style(help).cyan()))?;
        Ok(())
    }

    fn reject(&self, reason: &str) -> Result<(), PromptError> {
        self.term
            .write_line(&format!("  {} {}", style("✗").red().bold(), reason))?;
        Ok(())
    }
}

impl Default for TermPrompter {
    fn default() -> Self {
        Self::new()
    }
}

impl Prompter for TermPrompter {
    fn get(&self, prompt: &str, help: &str, validate: Validator) -> Result<String, PromptError> {
        let mut attempts = 0;
        while attempts < MAX_ATTEMPTS {
            let answer = self.ask(prompt, "[? for help]")?;
            if answer == "?" {
                self.help(help)?;
                continue;
            }
            match validate(&answer) {
                Ok(()) => return Ok(answer),
                Err(e) => {
                    attempts += 1;
                    self.reject(&e.to_string())?;
                }
            }
        }
        Err(PromptError::TooManyAttempts(MAX_ATTEMPTS))
    }

    fn select_one(
        &self,
        prompt: &str,
        help: &str,
        options: &[String],
    ) -> Result<String, PromptError> {
        if options.is_empty() {
            return Err(PromptError::NoOptions);
        }

        for (i, option) in options.iter().enumerate() {
            self.term
                .write_line(&format!("  {} {}", style(format!("{}.", i + 1)).dim(), option))?;
        }

        let mut attempts = 0;
        while attempts < MAX_ATTEMPTS {
            let answer = self.ask(prompt, &format!("[1-{}, Enter for 1]", options.len()))?;
            if answer == "?" {
                self.help(help)?;
                continue;
            }
            if answer.is_empty() {
                return Ok(options[0].clone());
            }
            if let Some(option) = options.iter().find(|o| **o == answer) {
                return Ok(option.clone());
            }
            match answer.parse::<usize>() {
                Ok(n) if (1..=options.len()).contains(&n) => return Ok(options[n - 1].clone()),
                _ => {
                    attempts += 1;
                    self.reject(&format!("'{answer}' is not one of the options"))?;
                }
            }
        }
        Err(PromptError::TooManyAttempts(MAX_ATTEMPTS))
    }

    fn confirm(&self, prompt: &str, help: &str) -> Result<bool, PromptError> {
        let mut attempts = 0;
        while attempts < MAX_ATTEMPTS {
            let answer = self.ask(prompt, "[y/N]")?.to_lowercase();
            match answer.as_str() {
                "?" => self.help(help)?,
                "y" | "yes" => return Ok(true),
                "" | "n" | "no" => return Ok(false),
                _ => {
                    attempts += 1;
                    self.reject("please answer y or n")?;
                }
            }
        }
        Err(PromptError::TooManyAttempts(MAX_ATTEMPTS))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::names::validate_project_name;
    use std::io::Cursor;

    fn prompter(input: &str) -> TermPrompter {
        TermPrompter::with_input(Box::new(Cursor::new(input.as_bytes().to_vec())))
    }

    fn options() -> Vec<String> {
        vec!["acme".to_string(), "beta".to_string()]
    }

    #[test]
    fn test_get_returns_valid_answer() {
        let answer = prompter("acme\n").get("Name?", "help", validate_project_name);
        assert_eq!(answer.unwrap(), "acme");
    }

    #[test]
    fn test_get_reasks_until_valid() {
        let answer = prompter("?\nBad Name\n\nacme\n").get("Name?", "help", validate_project_name);
        assert_eq!(answer.unwrap(), "acme");
    }

    #[test]
    fn test_get_gives_up() {
        let input = "X\n".repeat(MAX_ATTEMPTS);
        let err = prompter(&input)
            .get("Name?", "help", validate_project_name)
            .unwrap_err();
        assert!(matches!(err, PromptError::TooManyAttempts(_)));
    }

    #[test]
    fn test_get_eof() {
        let err = prompter("").get("Name?", "help", validate_project_name).unwrap_err();
        assert!(matches!(err, PromptError::Eof));
    }

    #[test]
    fn test_select_by_index_name_and_default() {
        assert_eq!(prompter("2\n").select_one("Pick", "h", &options()).unwrap(), "beta");
        assert_eq!(prompter("beta\n").select_one("Pick", "h", &options()).unwrap(), "beta");
        assert_eq!(prompter("\n").select_one("Pick", "h", &options()).unwrap(), "acme");
        assert_eq!(prompter("7\n1\n").select_one("Pick", "h", &options()).unwrap(), "acme");
    }

    #[test]
    fn test_select_without_options() {
        let err = prompter("1\n").select_one("Pick", "h", &[]).unwrap_err();
        assert!(matches!(err, PromptError::NoOptions));
    }

    #[test]
    fn test_confirm() {
        assert!(prompter("y\n").confirm("Deploy?", "h").unwrap());
        assert!(prompter("YES\n").confirm("Deploy?", "h").unwrap());
        assert!(!prompter("\n").confirm("Deploy?", "h").unwrap());
        assert!(!prompter("maybe\nn\n").confirm("Deploy?", "h").unwrap());
        assert!(matches!(
            prompter("").confirm("Deploy?", "h").unwrap_err(),
            PromptError::Eof
        ));
    }
}
