use std::io::{self, IsTerminal};
use std::time::Duration;

use indicatif::{ProgressBar, ProgressStyle};

/// Create a spinner for an upload or other request with no known length.
pub fn create_spinner(message: &str) -> ProgressBar {
    let pb = ProgressBar::new_spinner();
    pb.set_style(
        ProgressStyle::default_spinner()
            .template("[instamojo] {spinner} {msg}")
            .unwrap_or_else(|_| ProgressStyle::default_spinner()),
    );
    pb.set_message(message.to_string());
    pb.enable_steady_tick(Duration::from_millis(100));
    pb
}

/// A spinner shown only when stderr is a TTY.
pub struct Activity {
    bar: Option<ProgressBar>,
}

impl Activity {
    pub fn start(message: &str) -> Self {
        let bar = io::stderr()
            .is_terminal()
            .then(|| create_spinner(message));
        Self { bar }
    }

    /// Finish and clear the spinner.
    pub fn finish(self) {
        if let Some(pb) = self.bar {
            pb.finish_and_clear();
        }
    }
}
