//! User-facing output and y/n confirmation.
//!
//! Everything the pipeline says to the operator, and every question it asks,
//! goes through [`Console`] so runs can be scripted in tests.

use std::io::{self, BufRead, IsTerminal, Write};

/// Severity of a console message
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Level {
    /// Stage banners
    Heading,
    Info,
    Success,
    Warning,
    Error,
}

impl Level {
    fn ansi(self) -> &'static str {
        match self {
            Level::Heading => "\x1b[1;36m",
            Level::Info => "\x1b[36m",
            Level::Success => "\x1b[32m",
            Level::Warning => "\x1b[33m",
            Level::Error => "\x1b[31m",
        }
    }
}

/// Output and confirmation channel used by the pipeline
pub trait Console {
    /// Ask a yes/no question; anything but "y" is a no
    fn confirm(&mut self, question: &str) -> bool;

    /// Print a status line
    fn report(&mut self, message: &str, level: Level);
}

/// Interpret a typed answer
pub fn is_yes(answer: &str) -> bool {
    answer.trim().eq_ignore_ascii_case("y")
}

/// Console over the process's stdin/stdout
pub struct TerminalConsole<R, W> {
    input: R,
    output: W,
    color: bool,
}

impl TerminalConsole<io::StdinLock<'static>, io::Stdout> {
    /// Console on the real terminal, colored when stdout is a tty
    pub fn stdio() -> Self {
        let output = io::stdout();
        let color = output.is_terminal();
        Self {
            input: io::stdin().lock(),
            output,
            color,
        }
    }
}

impl<R: BufRead, W: Write> TerminalConsole<R, W> {
    /// Console over arbitrary streams, uncolored
    pub fn new(input: R, output: W) -> Self {
        Self {
            input,
            output,
            color: false,
        }
    }

    pub fn into_output(self) -> W {
        self.output
    }

    fn write_line(&mut self, message: &str, level: Level) -> io::Result<()> {
        if self.color {
            writeln!(self.output, "{}{}\x1b[0m", level.ansi(), message)
        } else {
            writeln!(self.output, "{}", message)
        }
    }
}

impl<R: BufRead, W: Write> Console for TerminalConsole<R, W> {
    fn confirm(&mut self, question: &str) -> bool {
        if let Err(e) = write!(self.output, "{} (y/n): ", question).and_then(|_| self.output.flush()) {
            tracing::warn!(error = %e, "failed to write prompt");
        }

        let mut answer = String::new();
        match self.input.read_line(&mut answer) {
            Ok(0) => {
                tracing::debug!(question, "input closed, answering no");
                false
            }
            Ok(_) => is_yes(&answer),
            Err(e) => {
                tracing::warn!(error = %e, "failed to read answer, answering no");
                false
            }
        }
    }

    fn report(&mut self, message: &str, level: Level) {
        tracing::trace!(?level, message);
        if let Err(e) = self.write_line(message, level) {
            tracing::warn!(error = %e, "failed to write console message");
        }
    }
}
