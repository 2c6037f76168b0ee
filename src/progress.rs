//! # Progress Module
//!
//! Feedback visivo con `indicatif` durante la stylization, che blocca per
//! secondi o minuti a seconda del modello e dell'hardware.
//!
//! ```text
//! ⠋ Stylizing image...
//! ```

use indicatif::{ProgressBar, ProgressStyle};
use std::time::Duration;

/// Spinner shown while a blocking step runs
pub struct ProgressManager {
    spinner: ProgressBar,
}

impl ProgressManager {
    /// Create a spinner for indeterminate progress
    pub fn spinner(message: &str) -> Self {
        let spinner = ProgressBar::new_spinner();

        spinner.set_style(
            ProgressStyle::default_spinner()
                .template("{spinner:.green} [{elapsed_precise}] {msg}")
                .unwrap_or_else(|_| ProgressStyle::default_spinner()),
        );

        spinner.set_message(message.to_string());
        spinner.enable_steady_tick(Duration::from_millis(100));

        Self { spinner }
    }

    /// Remove the spinner from the terminal
    pub fn clear(&self) {
        self.spinner.finish_and_clear();
    }
}
