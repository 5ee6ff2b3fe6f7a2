//! Errors raised by the console core.
use std::fmt;
use std::io;
use std::path::PathBuf;

use thiserror::Error;

use crate::query::{EngineError, QueryLanguage};

/// Result alias used throughout the console core.
pub type Result<T> = std::result::Result<T, ConsoleError>;

/// Errors raised while preparing, evaluating, or writing a single query.
///
/// None of these are fatal to the process: the command loop reports them and
/// waits for the next command.
#[derive(Debug, Error)]
pub enum ConsoleError {
    /// No query text was typed or read.
    #[error("empty query string")]
    EmptyQuery,
    /// The query engine rejected the query text.
    #[error("malformed query: {0}")]
    MalformedQuery(String),
    /// The query engine does not support the requested language.
    #[error("unsupported query language: {0}")]
    UnsupportedQueryLanguage(QueryLanguage),
    /// No result writer is registered for the output file extension.
    #[error("no suitable result writer found for {path}")]
    UnsupportedFormat {
        /// Requested output file.
        path: PathBuf,
    },
    /// An input file is larger than the console accepts.
    #[error("file {path} is {size} bytes; files must be smaller than {limit} bytes")]
    SizeLimitExceeded {
        /// Input file.
        path: PathBuf,
        /// Size reported by the filesystem.
        size: u64,
        /// Exclusive upper bound.
        limit: u64,
    },
    /// The input charset name was not recognized.
    #[error("unsupported character set '{0}'")]
    InvalidCharset(String),
    /// The operator declined to overwrite an existing output file.
    #[error("could not open file {path} for output")]
    OutputRefused {
        /// Output file that was kept untouched.
        path: PathBuf,
    },
    /// An update was combined with an output file.
    #[error("update query does not produce output")]
    OutputNotSupported,
    /// Query evaluation failed inside the engine.
    #[error("query evaluation error: {0}")]
    Evaluation(String),
    /// Query evaluation was interrupted.
    #[error("query interrupted: {0}")]
    Interrupted(String),
    /// An update could not be executed.
    #[error("failed to execute update: {0}")]
    Update(String),
    /// The repository connection failed.
    #[error("repository error: {0}")]
    Repository(String),
    /// No repository is attached to the console.
    #[error("please open a repository first")]
    NoRepository,
    /// The command keyword is not known.
    #[error("unknown command '{0}'")]
    UnknownCommand(String),
    /// Bad argument such as an empty file name or setting value.
    #[error("invalid argument: {0}")]
    InvalidArgument(String),
    /// Filesystem or console I/O failure.
    #[error("I/O error on {path}: {source}")]
    Io {
        /// File the operation touched.
        path: PathBuf,
        /// Underlying error.
        source: io::Error,
    },
}

impl ConsoleError {
    pub(crate) fn io(path: impl Into<PathBuf>, source: io::Error) -> Self {
        ConsoleError::Io {
            path: path.into(),
            source,
        }
    }

    /// Returns a machine-readable code for the error variant.
    pub fn code(&self) -> &'static str {
        match self {
            ConsoleError::EmptyQuery => "EmptyQuery",
            ConsoleError::MalformedQuery(_) => "MalformedQuery",
            ConsoleError::UnsupportedQueryLanguage(_) => "UnsupportedQueryLanguage",
            ConsoleError::UnsupportedFormat { .. } => "UnsupportedFormat",
            ConsoleError::SizeLimitExceeded { .. } => "SizeLimitExceeded",
            ConsoleError::InvalidCharset(_) => "InvalidCharset",
            ConsoleError::OutputRefused { .. } => "OutputRefused",
            ConsoleError::OutputNotSupported => "OutputNotSupported",
            ConsoleError::Evaluation(_) => "EvaluationError",
            ConsoleError::Interrupted(_) => "InterruptedEvaluation",
            ConsoleError::Update(_) => "EvaluationError",
            ConsoleError::Repository(_) => "EvaluationError",
            ConsoleError::NoRepository => "NoRepository",
            ConsoleError::UnknownCommand(_) => "UnknownCommand",
            ConsoleError::InvalidArgument(_) => "InvalidArgument",
            ConsoleError::Io { .. } => "Io",
        }
    }
}

impl From<EngineError> for ConsoleError {
    fn from(err: EngineError) -> Self {
        match err {
            EngineError::Malformed(msg) => ConsoleError::MalformedQuery(msg),
            EngineError::UnsupportedLanguage(lang) => ConsoleError::UnsupportedQueryLanguage(lang),
            EngineError::Evaluation(msg) => ConsoleError::Evaluation(msg),
            EngineError::Interrupted(msg) => ConsoleError::Interrupted(msg),
            EngineError::Update(msg) => ConsoleError::Update(msg),
            EngineError::Repository(msg) => ConsoleError::Repository(msg),
        }
    }
}

/// Formats a console error together with its code.
pub struct ConsoleErrorWithCode<'a>(pub &'a ConsoleError);

impl fmt::Display for ConsoleErrorWithCode<'_> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "[{}] {}", self.0.code(), self.0)
    }
}
