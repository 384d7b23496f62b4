//! Various utilities to ease outputting human or machine readable text.

use std::io::{self, IsTerminal, Write};
use std::fmt::{Display, Write as _};
use std::env;


/// An abstraction for outputting to any format on stdout, the goal is to provide an
/// interface for outputting at the same time both human readable and machine outputs.
#[derive(Debug)]
pub struct Output {
    /// Mode-specific data.
    mode: OutputMode,
    /// Are color and line clearing escape codes supported on stdout.
    escape_cap: bool,
    /// True when the last human-readable line is a pending one, without line return,
    /// that should be rewritten by the next line.
    pending: bool,
}

#[derive(Debug)]
enum OutputMode {
    Human {
        log_level: LogLevel,
    },
    TabSeparated {  },
}

impl Output {

    pub fn human(log_level: LogLevel) -> Self {
        Self::new(OutputMode::Human { log_level })
    }

    pub fn tab_separated() -> Self {
        Self::new(OutputMode::TabSeparated {  })
    }

    fn new(mode: OutputMode) -> Self {

        let term_dumb = !io::stdout().is_terminal() || (cfg!(unix) && env::var_os("TERM").map(|term| term == "dumb").unwrap_or_default());
        let no_color = env::var_os("NO_COLOR").map(|s| !s.is_empty()).unwrap_or_default();

        Self {
            mode,
            escape_cap: !term_dumb && !no_color,
            pending: false,
        }

    }

    /// Log an information with a simple code referencing it, the code is only used in
    /// machine-readable output.
    pub fn log(&mut self, code: &str) -> Log<'_> {

        let mut line = String::new();
        if let OutputMode::TabSeparated {  } = self.mode {
            line.push_str(code);
        }

        Log {
            output: self,
            line,
            visible: false,
        }

    }

    /// Internal function to write a full human-readable line, rewriting the current
    /// pending line if any.
    fn write_human(&mut self, text: &str, newline: bool) {

        let mut lock = io::stdout().lock();

        if self.pending {
            if self.escape_cap {
                let _ = lock.write_all(b"\r\x1b[K");
            } else {
                let _ = lock.write_all(b"\r");
            }
        }

        let _ = lock.write_all(text.as_bytes());
        if newline {
            let _ = lock.write_all(b"\n");
        }
        let _ = lock.flush();

        self.pending = !newline;

    }

}

/// A handle to a log line, allows adding more context to the log.
#[derive(Debug)]
pub struct Log<'a> {
    /// Exclusive access to output.
    output: &'a mut Output,
    /// Line buffer that will be printed when the log is dropped, machine-readable only.
    line: String,
    /// Human-readable only, true if the main message has been printed, additional
    /// lines are only printed in this case.
    visible: bool,
}

impl Log<'_> {

    /// Append an argument for machine-readable output.
    pub fn arg<D: Display>(&mut self, arg: D) -> &mut Self {
        if let OutputMode::TabSeparated {  } = self.output.mode {
            self.line.push('\t');
            push_escaped(&mut self.line, &arg.to_string());
        }
        self
    }

    /// Append many arguments for machine-readable output.
    pub fn args<D, I>(&mut self, args: I) -> &mut Self
    where
        I: Iterator<Item = D>,
        D: Display,
    {
        for arg in args {
            self.arg(arg);
        }
        self
    }

    /// Associate a human-readable message to this with an associated level, level is
    /// only relevant here because machine-readable outputs are always verbose.
    pub fn line<D: Display>(&mut self, level: LogLevel, message: D) -> &mut Self {
        if let OutputMode::Human { log_level } = self.output.mode {
            if level >= log_level {

                let (name, color) = match level {
                    LogLevel::Info => ("INFO", "\x1b[34m"),
                    LogLevel::Pending => ("..", ""),
                    LogLevel::Success => ("OK", "\x1b[92m"),
                    LogLevel::Warning => ("WARN", "\x1b[33m"),
                    LogLevel::Error => ("FAILED", "\x1b[31m"),
                };

                let mut buf = String::new();
                if !self.output.escape_cap || color.is_empty() {
                    let _ = write!(buf, "[{name:^6}] {message}");
                } else {
                    let _ = write!(buf, "[{color}{name:^6}\x1b[0m] {message}");
                }

                self.output.write_human(&buf, level != LogLevel::Pending);
                self.visible = true;

            }
        }
        self
    }

    #[inline]
    pub fn info<D: Display>(&mut self, message: D) -> &mut Self {
        self.line(LogLevel::Info, message)
    }

    #[inline]
    pub fn pending<D: Display>(&mut self, message: D) -> &mut Self {
        self.line(LogLevel::Pending, message)
    }

    #[inline]
    pub fn success<D: Display>(&mut self, message: D) -> &mut Self {
        self.line(LogLevel::Success, message)
    }

    #[inline]
    pub fn warning<D: Display>(&mut self, message: D) -> &mut Self {
        self.line(LogLevel::Warning, message)
    }

    #[inline]
    pub fn error<D: Display>(&mut self, message: D) -> &mut Self {
        self.line(LogLevel::Error, message)
    }

    /// Print an additional human-readable line below the main message, only if the
    /// main message has been printed.
    pub fn additional<D: Display>(&mut self, message: D) -> &mut Self {
        if let OutputMode::Human { .. } = self.output.mode {
            if self.visible {
                self.output.write_human(&format!("         {message}"), true);
            }
        }
        self
    }

    /// Print a raw human-readable line, without level, whatever the log level.
    pub fn raw<D: Display>(&mut self, message: D) -> &mut Self {
        if let OutputMode::Human { .. } = self.output.mode {
            self.output.write_human(&message.to_string(), true);
            self.visible = true;
        }
        self
    }

}

impl Drop for Log<'_> {
    fn drop(&mut self) {
        // Human-readable lines are flushed immediately.
        if let OutputMode::TabSeparated {  } = self.output.mode {
            let mut lock = io::stdout().lock();
            let _ = lock.write_all(self.line.as_bytes());
            let _ = lock.write_all(b"\n");
            let _ = lock.flush();
        }
    }
}

/// Level for a human-readable log line.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord)]
pub enum LogLevel {
    /// This log is something indicative, discarded when not in verbose mode.
    Info,
    /// This log indicate something is in progress and the definitive state is unknown,
    /// the next line will overwrite it.
    Pending,
    /// This log indicate a success.
    Success,
    /// This log is a warning.
    Warning,
    /// This log is an error.
    Error,
}

/// Escape line returns and tabs of a machine-readable value.
fn push_escaped(buf: &mut String, value: &str) {
    for ch in value.chars() {
        match ch {
            '\n' => buf.push_str("\\n"),
            '\t' => buf.push_str("\\t"),
            _ => buf.push(ch),
        }
    }
}


#[cfg(test)]
mod tests {

    #[test]
    fn push_escaped() {

        use super::push_escaped;

        let mut buf = String::new();
        push_escaped(&mut buf, "a\tb\nc");
        assert_eq!(buf, "a\\tb\\nc");

    }

}
