//! Terminal interaction: prompts and progress indicators
//!
//! The orchestrator talks to the [`Prompter`] and [`Progress`] traits;
//! [`TermPrompter`] and [`Spinner`] are the terminal implementations.

mod progress;
mod prompt;

pub use progress::{Progress, Spinner};
pub use prompt::{PromptError, Prompter, TermPrompter, Validator};
