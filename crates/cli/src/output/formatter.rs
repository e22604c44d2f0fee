//! Output formatter for human-readable and JSON output
//!
//! Results go to stdout, diagnostics to stderr. In JSON mode stdout carries
//! exactly one JSON document per command and errors are JSON objects too.

use console::{Style, Term};
use serde::Serialize;

use super::OutputConfig;

/// Status markers printed in front of one-line messages
#[derive(Debug, Clone, Copy)]
enum Mark {
    Done,
    Warn,
    Fail,
}

impl Mark {
    fn symbol(self) -> &'static str {
        match self {
            Mark::Done => "✓",
            Mark::Warn => "⚠",
            Mark::Fail => "✗",
        }
    }

    fn style(self) -> Style {
        match self {
            Mark::Done => Style::new().green(),
            Mark::Warn => Style::new().yellow(),
            Mark::Fail => Style::new().red().bold(),
        }
    }
}

/// Formatter for CLI output
#[derive(Debug, Clone)]
pub struct Formatter {
    config: OutputConfig,
    out: Term,
    err: Term,
}

impl Formatter {
    pub fn new(config: OutputConfig) -> Self {
        Self {
            config,
            out: Term::stdout(),
            err: Term::stderr(),
        }
    }

    pub fn is_json(&self) -> bool {
        self.config.json
    }

    pub fn colors_enabled(&self) -> bool {
        !self.config.no_color && !self.config.json
    }

    fn marked(&self, mark: Mark, message: &str) -> String {
        if self.colors_enabled() {
            format!("{} {message}", mark.style().apply_to(mark.symbol()))
        } else {
            format!("{} {message}", mark.symbol())
        }
    }

    /// One-line success notice; silent in quiet and JSON mode
    pub fn success(&self, message: &str) {
        if self.config.quiet || self.config.json {
            return;
        }
        let _ = self.out.write_line(&self.marked(Mark::Done, message));
    }

    /// Report an error on stderr
    ///
    /// Errors are always printed, even in quiet mode.
    pub fn error(&self, message: &str) {
        let line = if self.config.json {
            serde_json::to_string_pretty(&serde_json::json!({ "error": message }))
                .unwrap_or_else(|_| message.to_string())
        } else {
            self.marked(Mark::Fail, message)
        };
        let _ = self.err.write_line(&line);
    }

    pub fn warning(&self, message: &str) {
        if self.config.quiet || self.config.json {
            return;
        }
        let _ = self.err.write_line(&self.marked(Mark::Warn, message));
    }

    /// Print a JSON document on stdout
    pub fn json<T: Serialize>(&self, value: &T) {
        match serde_json::to_string_pretty(value) {
            Ok(json) => {
                let _ = self.out.write_line(&json);
            }
            Err(e) => self.error(&format!("Error serializing output: {e}")),
        }
    }

    /// Print a line of text (respects quiet mode)
    pub fn println(&self, message: &str) {
        if !self.config.quiet {
            let _ = self.out.write_line(message);
        }
    }

    /// Print a `Label     : value` line
    pub fn field(&self, label: &str, value: impl std::fmt::Display) {
        self.println(&format!("{label:<10}: {value}"));
    }
}

impl Default for Formatter {
    fn default() -> Self {
        Self::new(OutputConfig::default())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_colors_follow_flags() {
        assert!(Formatter::default().colors_enabled());

        let json = Formatter::new(OutputConfig {
            json: true,
            ..Default::default()
        });
        assert!(json.is_json());
        assert!(!json.colors_enabled());

        let plain = Formatter::new(OutputConfig {
            no_color: true,
            ..Default::default()
        });
        assert!(!plain.colors_enabled());
    }

    #[test]
    fn test_marked_without_color() {
        let formatter = Formatter::new(OutputConfig {
            no_color: true,
            ..Default::default()
        });
        assert_eq!(formatter.marked(Mark::Done, "saved"), "✓ saved");
        assert_eq!(formatter.marked(Mark::Fail, "broken"), "✗ broken");
        assert_eq!(formatter.marked(Mark::Warn, "careful"), "⚠ careful");
    }
}
