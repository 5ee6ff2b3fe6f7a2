#![forbid(unsafe_code)]

//! Interactive command loop.
//!
//! Each line is routed on its first keyword. Query commands go through the
//! assembler and dispatcher; any failure is reported to the operator and the
//! loop continues with the next command.

/// Operator input and output.
pub mod io;

pub use io::{ConsoleIo, ScriptedIo, TerminalIo};

use tracing::debug;

use crate::error::{ConsoleError, ConsoleErrorWithCode, Result};
use crate::query::{DispatchOutcome, QueryDispatcher, QueryLanguage, QueryTextAssembler, Repository};
use crate::settings::Settings;
use crate::writer::ResultWriterSelector;

/// Prompt shown before each command.
pub const PROMPT: &str = "rdfsh> ";

const HELP: &str = "\
Commands:
  sparql [<query>]      evaluate a SPARQL query, prompting for it when omitted
  serql [<query>]       evaluate a SeRQL query, prompting for it when omitted
  select|construct|describe|ask|prefix|base ...
                        evaluate the whole line as SPARQL
  set [<name>[=<value>]]
                        list, show, or change settings (width, queryprefix, showprefix, workdir)
  help                  show this text
  quit|exit             leave the console

Queries may start with INFILE=\"<file>\"[,<charset>] and/or OUTFILE=\"<file>\".";

/// Result of one command.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum CommandStatus {
    /// Command completed.
    Done,
    /// Command failed and was reported.
    Failed,
    /// The operator asked to leave.
    Exit,
}

/// Console session: settings, an optional repository, and the operator console.
pub struct Console<I: ConsoleIo> {
    io: I,
    settings: Settings,
    repository: Option<Box<dyn Repository>>,
}

impl<I: ConsoleIo> Console<I> {
    /// Console without a repository.
    pub fn new(io: I, settings: Settings) -> Self {
        Self {
            io,
            settings,
            repository: None,
        }
    }

    /// Attaches the repository queries run against.
    pub fn with_repository(mut self, repository: Box<dyn Repository>) -> Self {
        self.repository = Some(repository);
        self
    }

    /// Current settings.
    pub fn settings(&self) -> &Settings {
        &self.settings
    }

    /// Operator console.
    pub fn io(&self) -> &I {
        &self.io
    }

    /// Mutable operator console.
    pub fn io_mut(&mut self) -> &mut I {
        &mut self.io
    }

    /// Consumes the session, returning the operator console.
    pub fn into_io(self) -> I {
        self.io
    }

    /// Reads and executes commands until `quit` or end of input.
    pub fn run(&mut self) -> std::io::Result<()> {
        loop {
            self.io.prompt(PROMPT)?;
            let Some(line) = self.io.read_line()? else {
                return Ok(());
            };
            if self.execute(&line) == CommandStatus::Exit {
                return Ok(());
            }
        }
    }

    /// Executes one command line, reporting failures to the operator.
    pub fn execute(&mut self, line: &str) -> CommandStatus {
        match self.dispatch_command(line) {
            Ok(status) => status,
            Err(err) => {
                debug!(error = %ConsoleErrorWithCode(&err), "command failed");
                self.io.write_error(&err.to_string());
                CommandStatus::Failed
            }
        }
    }

    fn dispatch_command(&mut self, line: &str) -> Result<CommandStatus> {
        let line = line.trim();
        let (keyword, rest) = match line.split_once(char::is_whitespace) {
            Some((keyword, rest)) => (keyword, rest),
            None => (line, ""),
        };
        match keyword.to_ascii_lowercase().as_str() {
            "" => Ok(CommandStatus::Done),
            "sparql" => self.evaluate(QueryLanguage::Sparql, rest).map(|_| CommandStatus::Done),
            "serql" => self.evaluate(QueryLanguage::Serql, rest).map(|_| CommandStatus::Done),
            "select" | "construct" | "describe" | "ask" | "prefix" | "base" => self
                .evaluate(QueryLanguage::Sparql, line)
                .map(|_| CommandStatus::Done),
            "set" => self.set(rest.trim()).map(|_| CommandStatus::Done),
            "help" => {
                self.print(HELP)?;
                Ok(CommandStatus::Done)
            }
            "quit" | "exit" => Ok(CommandStatus::Exit),
            other => Err(ConsoleError::UnknownCommand(other.to_string())),
        }
    }

    /// Prepares and runs one query against the attached repository.
    pub fn evaluate(&mut self, language: QueryLanguage, text: &str) -> Result<DispatchOutcome> {
        let repository = self
            .repository
            .as_deref_mut()
            .ok_or(ConsoleError::NoRepository)?;
        let query = QueryTextAssembler::new(&self.settings).assemble(
            language,
            text,
            Some(&*repository),
            &mut self.io,
        )?;
        QueryDispatcher::new(ResultWriterSelector::from_settings(&self.settings)).dispatch(
            repository,
            language,
            &query,
            &mut self.io,
        )
    }

    fn set(&mut self, args: &str) -> Result<()> {
        if args.is_empty() {
            let lines: Vec<String> = self
                .settings
                .entries()
                .into_iter()
                .map(|(name, value)| format!("{name}: {value}"))
                .collect();
            return self.print(&lines.join("\n"));
        }
        if args.contains('=') {
            self.settings.apply(args)?;
            debug!(assignment = args, "setting changed");
            return Ok(());
        }
        let value = self
            .settings
            .get(args)
            .ok_or_else(|| ConsoleError::InvalidArgument(format!("unknown setting '{args}'")))?;
        self.print(&format!("{}: {value}", args.to_ascii_lowercase()))
    }

    fn print(&mut self, text: &str) -> Result<()> {
        self.io
            .writeln(text)
            .map_err(|e| ConsoleError::io("<console>", e))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::model::Namespace;
    use crate::query::PreviewRepository;
    use crate::settings::DEFAULT_WIDTH;

    fn console(lines: &[&str]) -> Console<ScriptedIo> {
        let repo = PreviewRepository::new(vec![Namespace::new("ex", "http://example.org/")]);
        Console::new(ScriptedIo::new(lines.iter().copied()), Settings::new())
            .with_repository(Box::new(repo))
    }

    #[test]
    fn query_without_repository_fails() {
        let mut console = Console::new(ScriptedIo::default(), Settings::new());
        assert_eq!(console.execute("select * { ?s ?p ?o }"), CommandStatus::Failed);
        assert_eq!(console.io().errors, vec!["please open a repository first"]);
    }

    #[test]
    fn unknown_command_is_reported() {
        let mut console = console(&[]);
        assert_eq!(console.execute("frobnicate now"), CommandStatus::Failed);
        assert_eq!(console.io().errors, vec!["unknown command 'frobnicate'"]);
    }

    #[test]
    fn sparql_keyword_is_stripped() {
        let mut console = console(&[]);
        assert_eq!(console.execute("sparql ask { ?s ?p ?o }"), CommandStatus::Done);
        assert_eq!(console.io().output_text(), "Answer: false\n");
    }

    #[test]
    fn bare_keyword_reads_multiline_query() {
        let mut console = console(&["select ?s", "where { ?s ?p ?o }", "."]);
        assert_eq!(console.execute("sparql"), CommandStatus::Done);
        let text = console.io().output_text();
        assert!(text.starts_with("enter multi-line SPARQL query"));
        assert!(text.contains("| s "));
        assert!(text.contains("0 result(s)"));
    }

    #[test]
    fn failures_do_not_end_the_session() {
        let mut console = console(&["construct {} where {}", "quit", "ask {}"]);
        console.execute("sparql frobnicate");
        console.run().unwrap();
        let io = console.into_io();
        assert_eq!(io.errors.len(), 1);
        assert!(!io.output_text().contains("Answer"));
    }

    #[test]
    fn set_lists_shows_and_changes() {
        let mut console = console(&[]);
        console.execute("set width=120");
        assert_eq!(console.settings().console_width(), 120);
        console.execute("set WIDTH");
        assert!(console.io().output_text().ends_with("width: 120\n"));
        assert_eq!(console.execute("set width=wide"), CommandStatus::Failed);
        assert_ne!(console.settings().console_width(), DEFAULT_WIDTH);
        console.execute("set");
        assert!(console.io().output_text().contains("queryprefix: true"));
    }

    #[test]
    fn quit_exits() {
        let mut console = console(&[]);
        assert_eq!(console.execute("  QUIT "), CommandStatus::Exit);
    }
}
