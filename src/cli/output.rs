//! Colored terminal output for the command line.
//!
//! Respects `NO_COLOR` and falls back to plain text when the stream is not a
//! terminal.

use std::io::{self, Write};
use termcolor::{Color, ColorChoice, ColorSpec, StandardStream, WriteColor};

/// Terminal output with verbosity control.
#[derive(Debug, Clone)]
pub struct OutputManager {
    verbose: bool,
    quiet: bool,
    color_choice: ColorChoice,
}

impl OutputManager {
    /// Creates an output manager.
    ///
    /// `quiet` suppresses everything except errors; `verbose` enables
    /// [`verbose`](Self::verbose) messages.
    pub fn new(verbose: bool, quiet: bool) -> Self {
        Self {
            verbose: verbose && !quiet,
            quiet,
            color_choice: color_choice(),
        }
    }

    /// Whether verbose output is enabled.
    pub fn is_verbose(&self) -> bool {
        self.verbose
    }

    /// Whether non-error output is suppressed.
    pub fn is_quiet(&self) -> bool {
        self.quiet
    }

    /// Prints a dimmed detail line in verbose mode.
    pub fn verbose(&self, message: &str) -> io::Result<()> {
        if !self.verbose {
            return Ok(());
        }
        let mut stdout = self.stdout();
        write_styled(&mut stdout, ColorSpec::new().set_dimmed(true), message)
    }

    /// Prints a progress line.
    pub fn progress(&self, message: &str) -> io::Result<()> {
        if self.quiet {
            return Ok(());
        }
        let mut stdout = self.stdout();
        write_tagged(&mut stdout, Color::Cyan, "→", message)
    }

    /// Prints a success line.
    pub fn success(&self, message: &str) -> io::Result<()> {
        if self.quiet {
            return Ok(());
        }
        let mut stdout = self.stdout();
        write_tagged(&mut stdout, Color::Green, "✓", message)
    }

    /// Prints a warning to stderr.
    pub fn warn(&self, message: &str) -> io::Result<()> {
        if self.quiet {
            return Ok(());
        }
        let mut stderr = self.stderr();
        write_tagged(&mut stderr, Color::Yellow, "warning:", message)
    }

    /// Prints an error to stderr, even in quiet mode.
    pub fn error(&self, message: &str) -> io::Result<()> {
        let mut stderr = self.stderr();
        write_tagged(&mut stderr, Color::Red, "error:", message)
    }

    /// Prints a bold section header.
    pub fn section(&self, title: &str) -> io::Result<()> {
        if self.quiet {
            return Ok(());
        }
        let mut stdout = self.stdout();
        writeln!(stdout)?;
        write_styled(&mut stdout, ColorSpec::new().set_bold(true), title)
    }

    /// Prints an indented detail line.
    pub fn indent(&self, message: &str) -> io::Result<()> {
        if self.quiet {
            return Ok(());
        }
        let mut stdout = self.stdout();
        writeln!(stdout, "    {message}")
    }

    /// Prints an indented detail line to stderr, even in quiet mode.
    pub fn error_detail(&self, message: &str) -> io::Result<()> {
        let mut stderr = self.stderr();
        writeln!(stderr, "    {message}")
    }

    fn stdout(&self) -> StandardStream {
        StandardStream::stdout(self.color_choice)
    }

    fn stderr(&self) -> StandardStream {
        StandardStream::stderr(self.color_choice)
    }
}

impl Default for OutputManager {
    fn default() -> Self {
        Self::new(false, false)
    }
}

fn color_choice() -> ColorChoice {
    if std::env::var_os("NO_COLOR").is_some() {
        ColorChoice::Never
    } else {
        ColorChoice::Auto
    }
}

fn write_tagged(w: &mut impl WriteColor, color: Color, tag: &str, message: &str) -> io::Result<()> {
    w.set_color(ColorSpec::new().set_fg(Some(color)).set_bold(true))?;
    write!(w, "{tag}")?;
    w.reset()?;
    writeln!(w, " {message}")
}

fn write_styled(w: &mut impl WriteColor, spec: &ColorSpec, message: &str) -> io::Result<()> {
    w.set_color(spec)?;
    write!(w, "{message}")?;
    w.reset()?;
    writeln!(w)
}

#[cfg(test)]
mod tests {
    use super::*;
    use termcolor::Buffer;

    #[test]
    fn quiet_overrides_verbose() {
        let output = OutputManager::new(true, true);
        assert!(output.is_quiet());
        assert!(!output.is_verbose());
    }

    #[test]
    fn plain_buffer_has_no_escape_codes() {
        let mut buffer = Buffer::no_color();
        write_tagged(&mut buffer, Color::Green, "✓", "dist/world.zip").unwrap();
        assert_eq!(
            String::from_utf8(buffer.into_inner()).unwrap(),
            "✓ dist/world.zip\n"
        );
    }

    #[test]
    fn ansi_buffer_colors_the_tag_only() {
        let mut buffer = Buffer::ansi();
        write_tagged(&mut buffer, Color::Red, "error:", "boom").unwrap();
        let text = String::from_utf8(buffer.into_inner()).unwrap();
        assert!(text.contains("\x1b["));
        assert!(text.ends_with(" boom\n"));
    }
}
