//! Progress indicators bracketing long-running operations.

use indicatif::{ProgressBar, ProgressStyle};
use std::time::Duration;

/// Starts and stops a visible status around a long operation.
pub trait Progress {
    fn start(&mut self, label: &str);

    /// Stop the current indicator, leaving `label` as its final status.
    fn stop(&mut self, label: &str);
}

/// Terminal spinner.
#[derive(Default)]
pub struct Spinner {
    bar: Option<ProgressBar>,
}

impl Spinner {
    pub fn new() -> Self {
        Self::default()
    }
}

impl Progress for Spinner {
    fn start(&mut self, label: &str) {
        if let Some(bar) = self.bar.take() {
            bar.finish_and_clear();
        }

        let bar = ProgressBar::new_spinner();
        bar.set_style(
            ProgressStyle::with_template("{spinner:.green} {msg}")
                .unwrap_or_else(|_| ProgressStyle::default_spinner()),
        );
        bar.set_message(label.to_string());
        bar.enable_steady_tick(Duration::from_millis(100));
        self.bar = Some(bar);
    }

    fn stop(&mut self, label: &str) {
        match self.bar.take() {
            Some(bar) => {
                let message = bar.message();
                bar.finish_and_clear();
                println!("{message} {label}");
            }
            None => println!("{label}"),
        }
    }
}
