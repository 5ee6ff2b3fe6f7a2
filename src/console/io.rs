//! Operator-facing input and output.
use std::collections::VecDeque;
use std::io::{self, BufRead, IsTerminal, Write};

use nu_ansi_term::{Color, Style};

/// Line-oriented console the command loop and query pipeline talk through.
///
/// Reads block the calling thread until the operator answers.
pub trait ConsoleIo {
    /// Reads one line without its terminator; `None` at end of input.
    fn read_line(&mut self) -> io::Result<Option<String>>;

    /// Sink console result writers render into.
    fn output(&mut self) -> &mut dyn Write;

    /// Reports a failed command.
    fn write_error(&mut self, message: &str);

    /// Reports a recoverable problem.
    fn write_warning(&mut self, message: &str);

    /// Shows `prompt` before the next read.
    fn prompt(&mut self, prompt: &str) -> io::Result<()> {
        let out = self.output();
        out.write_all(prompt.as_bytes())?;
        out.flush()
    }

    /// Writes a line to the output.
    fn writeln(&mut self, text: &str) -> io::Result<()> {
        let out = self.output();
        out.write_all(text.as_bytes())?;
        out.write_all(b"\n")?;
        out.flush()
    }

    /// Asks a yes/no question, returning `default` on an empty answer or end of input.
    fn confirm(&mut self, question: &str, default: bool) -> bool {
        let hint = if default { "(Y/n)" } else { "(y/N)" };
        if self.prompt(&format!("{question} {hint} ")).is_err() {
            return default;
        }
        match self.read_line() {
            Ok(Some(answer)) => match answer.trim().to_ascii_lowercase().as_str() {
                "y" | "yes" => true,
                "n" | "no" => false,
                _ => default,
            },
            _ => default,
        }
    }

    /// Reads lines until one containing only `.`, joined with newlines.
    fn read_multiline(&mut self) -> io::Result<String> {
        let mut lines = Vec::new();
        while let Some(line) = self.read_line()? {
            if line.trim() == "." {
                break;
            }
            lines.push(line);
        }
        Ok(lines.join("\n"))
    }
}

/// Console bound to the process stdin and stdout.
pub struct TerminalIo {
    input: Box<dyn BufRead>,
    output: Box<dyn Write>,
    palette: Palette,
    paint: bool,
}

impl TerminalIo {
    /// Creates a terminal console; colours are used only on a tty unless `plain`.
    pub fn new(plain: bool) -> Self {
        let paint = !plain && io::stderr().is_terminal();

        #[cfg(windows)]
        if paint {
            let _ = nu_ansi_term::enable_ansi_support();
        }

        Self {
            input: Box::new(io::BufReader::new(io::stdin())),
            output: Box::new(io::stdout()),
            palette: if paint { Palette::dark() } else { Palette::plain() },
            paint,
        }
    }

    fn report(&self, style: Style, icon: &str, message: &str) {
        if self.paint {
            eprintln!("{} {message}", style.paint(icon));
        } else {
            eprintln!("{icon} {message}");
        }
    }
}

impl ConsoleIo for TerminalIo {
    fn read_line(&mut self) -> io::Result<Option<String>> {
        let mut line = String::new();
        if self.input.read_line(&mut line)? == 0 {
            return Ok(None);
        }
        while line.ends_with('\n') || line.ends_with('\r') {
            line.pop();
        }
        Ok(Some(line))
    }

    fn output(&mut self) -> &mut dyn Write {
        &mut self.output
    }

    fn write_error(&mut self, message: &str) {
        let _ = self.output.flush();
        self.report(self.palette.error, ERROR_ICON, message);
    }

    fn write_warning(&mut self, message: &str) {
        let _ = self.output.flush();
        self.report(self.palette.warn, WARNING_ICON, message);
    }
}

/// In-memory console fed from a script of input lines.
///
/// Used for non-interactive sessions and in tests; everything written is kept
/// for inspection.
#[derive(Debug, Default)]
pub struct ScriptedIo {
    input: VecDeque<String>,
    /// Bytes written to the output sink, prompts included.
    pub output: Vec<u8>,
    /// Messages passed to [`ConsoleIo::write_error`].
    pub errors: Vec<String>,
    /// Messages passed to [`ConsoleIo::write_warning`].
    pub warnings: Vec<String>,
}

impl ScriptedIo {
    /// Console that answers reads with `lines` in order.
    pub fn new<I, S>(lines: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        Self {
            input: lines.into_iter().map(Into::into).collect(),
            ..Self::default()
        }
    }

    /// Output decoded as UTF-8.
    pub fn output_text(&self) -> String {
        String::from_utf8_lossy(&self.output).into_owned()
    }
}

impl ConsoleIo for ScriptedIo {
    fn read_line(&mut self) -> io::Result<Option<String>> {
        Ok(self.input.pop_front())
    }

    fn output(&mut self) -> &mut dyn Write {
        &mut self.output
    }

    fn write_error(&mut self, message: &str) {
        self.errors.push(message.to_string());
    }

    fn write_warning(&mut self, message: &str) {
        self.warnings.push(message.to_string());
    }
}

struct Palette {
    error: Style,
    warn: Style,
}

impl Palette {
    fn dark() -> Self {
        Self {
            error: Style::new().fg(Color::LightRed).bold(),
            warn: Style::new().fg(Color::Yellow).bold(),
        }
    }

    fn plain() -> Self {
        Self {
            error: Style::new(),
            warn: Style::new(),
        }
    }
}

const ERROR_ICON: &str = "✘";
const WARNING_ICON: &str = "⚠";
