//! Terminal Emitter
//!
//! Human-readable diagnostic output with optional ANSI color support.
//!
//! ```text
//! warning: ZeroDivisionError: division by zero
//!  --> pkg/mod.py:3:5
//!   |
//! 3 | x = 1 / 0
//!   |     ^^^^^
//!   = note: the expression was left unchanged
//! ```

use std::io::{self, Write};

use crate::{Diagnostic, Label, LineIndex, Severity};

use super::DiagnosticEmitter;

/// ANSI color codes for terminal output.
mod colors {
    pub const ERROR: &str = "\x1b[1;31m"; // Bold red
    pub const WARNING: &str = "\x1b[1;33m"; // Bold yellow
    pub const NOTE: &str = "\x1b[1;36m"; // Bold cyan
    pub const HELP: &str = "\x1b[1;32m"; // Bold green
    pub const BOLD: &str = "\x1b[1m";
    pub const GUTTER: &str = "\x1b[1;34m"; // Bold blue
    pub const RESET: &str = "\x1b[0m";
}

#[inline]
fn plural_s(count: usize) -> &'static str {
    if count == 1 {
        ""
    } else {
        "s"
    }
}

/// Color output mode for terminal emitter.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
pub enum ColorMode {
    /// Automatically detect based on terminal capabilities.
    #[default]
    Auto,
    Always,
    Never,
}

impl ColorMode {
    /// For `Auto`, `is_tty` decides.
    pub fn should_use_colors(self, is_tty: bool) -> bool {
        match self {
            ColorMode::Auto => is_tty,
            ColorMode::Always => true,
            ColorMode::Never => false,
        }
    }
}

/// Terminal emitter with optional color support.
pub struct TerminalEmitter<W: Write> {
    writer: W,
    colors: bool,
}

impl<W: Write> TerminalEmitter<W> {
    /// * `is_tty` - Whether output is a TTY (used for `ColorMode::Auto`)
    pub fn with_color_mode(writer: W, mode: ColorMode, is_tty: bool) -> Self {
        TerminalEmitter {
            writer,
            colors: mode.should_use_colors(is_tty),
        }
    }

    pub fn stderr(mode: ColorMode, is_tty: bool) -> TerminalEmitter<io::Stderr> {
        TerminalEmitter {
            writer: io::stderr(),
            colors: mode.should_use_colors(is_tty),
        }
    }

    fn write_colored(&mut self, text: &str, color: &str) {
        if self.colors {
            let _ = write!(self.writer, "{color}{text}{}", colors::RESET);
        } else {
            let _ = write!(self.writer, "{text}");
        }
    }

    fn severity_color(severity: Severity) -> &'static str {
        match severity {
            Severity::Error => colors::ERROR,
            Severity::Warning => colors::WARNING,
            Severity::Note => colors::NOTE,
            Severity::Help => colors::HELP,
        }
    }

    fn write_header(&mut self, diagnostic: &Diagnostic) {
        self.write_colored(&diagnostic.severity.to_string(), Self::severity_color(diagnostic.severity));
        if self.colors {
            let _ = writeln!(self.writer, "{}: {}{}", colors::BOLD, diagnostic.message, colors::RESET);
        } else {
            let _ = writeln!(self.writer, ": {}", diagnostic.message);
        }
    }

    /// ` --> file:line:col`, the source line and a caret underline.
    fn write_snippet(&mut self, diagnostic: &Diagnostic, label: &Label, source: &str) {
        let index = LineIndex::new(source);
        let (line, column) = index.line_col(source, label.span.start);
        let range = index.line_range(source, line);
        let text = &source[range.clone()];

        let gutter = line.to_string();
        let pad = " ".repeat(gutter.len());
        let file = diagnostic.file.as_deref().unwrap_or("<unit>");

        let _ = write!(self.writer, "{pad}");
        self.write_colored("-->", colors::GUTTER);
        let _ = writeln!(self.writer, " {file}:{line}:{column}");
        self.write_colored(&format!("{pad} |"), colors::GUTTER);
        let _ = writeln!(self.writer);
        self.write_colored(&format!("{gutter} |"), colors::GUTTER);
        let _ = writeln!(self.writer, " {text}");

        // A span running past this line is underlined to the line's end.
        let start = (label.span.start as usize).clamp(range.start, range.end);
        let end = (label.span.end as usize).clamp(start, range.end);
        let lead = source[range.start..start].chars().count();
        let width = source[start..end].chars().count().max(1);
        self.write_colored(&format!("{pad} |"), colors::GUTTER);
        let _ = write!(self.writer, " {}", " ".repeat(lead));
        let marker = if label.primary { "^" } else { "-" };
        let mut underline = marker.repeat(width);
        if !label.message.is_empty() {
            underline.push(' ');
            underline.push_str(&label.message);
        }
        let color = if label.primary {
            Self::severity_color(diagnostic.severity)
        } else {
            colors::GUTTER
        };
        self.write_colored(&underline, color);
        let _ = writeln!(self.writer);
    }
}

impl<W: Write> DiagnosticEmitter for TerminalEmitter<W> {
    fn emit(&mut self, diagnostic: &Diagnostic, source: Option<&str>) {
        self.write_header(diagnostic);

        match (source, diagnostic.labels.first()) {
            (Some(source), Some(_)) => {
                for label in diagnostic.labels.iter().filter(|l| (l.span.start as usize) <= source.len()) {
                    self.write_snippet(diagnostic, label, source);
                }
            }
            _ => {
                if let Some(file) = &diagnostic.file {
                    self.write_colored(" -->", colors::GUTTER);
                    let _ = writeln!(self.writer, " {file}");
                }
            }
        }

        for note in &diagnostic.notes {
            let _ = write!(self.writer, "  = ");
            self.write_colored("note", colors::BOLD);
            let _ = writeln!(self.writer, ": {note}");
        }

        let _ = writeln!(self.writer);
    }

    fn flush(&mut self) {
        let _ = self.writer.flush();
    }

    fn emit_summary(&mut self, error_count: usize, warning_count: usize) {
        if error_count > 0 {
            self.write_colored("error", colors::ERROR);
            let _ = writeln!(
                self.writer,
                ": {error_count} error{}; {warning_count} warning{} emitted",
                plural_s(error_count),
                plural_s(warning_count)
            );
        } else if warning_count > 0 {
            self.write_colored("warning", colors::WARNING);
            let _ = writeln!(self.writer, ": {warning_count} warning{} emitted", plural_s(warning_count));
        }
    }
}
