use colored::{ColoredString, Colorize};

/// How API responses are written to stdout.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum OutputMode {
    /// Indented JSON plus status notices on stderr.
    Tty,
    /// Compact single-line JSON for scripts.
    Json,
}

impl OutputMode {
    pub fn from_json_flag(json: bool) -> Self {
        if json { OutputMode::Json } else { OutputMode::Tty }
    }
}

fn status_line(message: ColoredString) -> String {
    format!("{} {}", "[instamojo]".dimmed(), message)
}

/// Print a status line to stderr, keeping stdout for API responses.
pub fn notice(message: &str) {
    eprintln!("{}", status_line(message.normal()));
}

/// Like [`notice`], highlighted as a success.
pub fn success(message: &str) {
    eprintln!("{}", status_line(message.green()));
}
