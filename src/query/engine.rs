//! Contracts for the query engine and repository connection the console drives.
use std::fmt;

use thiserror::Error;

use super::QueryLanguage;
use crate::model::{GraphResult, Namespace, TupleResult};

/// Result shape of a parsed operation.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub enum OperationKind {
    /// Query returning variable bindings.
    TupleQuery,
    /// Query returning a single boolean.
    BooleanQuery,
    /// Query returning RDF statements.
    GraphQuery,
    /// Update request without a result.
    Update,
}

impl fmt::Display for OperationKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            OperationKind::TupleQuery => "tuple query",
            OperationKind::BooleanQuery => "boolean query",
            OperationKind::GraphQuery => "graph query",
            OperationKind::Update => "update",
        };
        f.write_str(name)
    }
}

/// Query text accepted by the engine, tagged with its result shape.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct ParsedOperation {
    /// Language the text was parsed as.
    pub language: QueryLanguage,
    /// Result shape.
    pub kind: OperationKind,
    /// Exact text handed to the parser.
    pub source: String,
}

impl ParsedOperation {
    /// Creates a parsed operation.
    pub fn new(language: QueryLanguage, kind: OperationKind, source: impl Into<String>) -> Self {
        Self {
            language,
            kind,
            source: source.into(),
        }
    }
}

/// Failures reported by engine and repository implementations.
#[derive(Debug, Error, Clone, PartialEq, Eq)]
pub enum EngineError {
    /// Query text does not parse.
    #[error("{0}")]
    Malformed(String),
    /// Engine has no parser for the language.
    #[error("unsupported query language: {0}")]
    UnsupportedLanguage(QueryLanguage),
    /// Evaluation failed.
    #[error("{0}")]
    Evaluation(String),
    /// Evaluation was interrupted, for instance by a timeout.
    #[error("{0}")]
    Interrupted(String),
    /// Update execution failed.
    #[error("{0}")]
    Update(String),
    /// Connection to the repository failed.
    #[error("{0}")]
    Repository(String),
}

/// Parser and evaluator for query text.
pub trait QueryEngine {
    /// Parses `text` and classifies its result shape.
    fn parse(&self, language: QueryLanguage, text: &str) -> Result<ParsedOperation, EngineError>;

    /// Evaluates a [`OperationKind::TupleQuery`].
    fn evaluate_tuple(&mut self, query: &ParsedOperation) -> Result<TupleResult, EngineError>;

    /// Evaluates a [`OperationKind::BooleanQuery`].
    fn evaluate_boolean(&mut self, query: &ParsedOperation) -> Result<bool, EngineError>;

    /// Evaluates a [`OperationKind::GraphQuery`].
    fn evaluate_graph(&mut self, query: &ParsedOperation) -> Result<GraphResult, EngineError>;

    /// Executes an [`OperationKind::Update`].
    fn execute_update(&mut self, update: &ParsedOperation) -> Result<(), EngineError>;
}

/// Connection to the repository queries run against.
pub trait RepositoryConnection {
    /// Namespaces currently declared in the repository.
    fn namespaces(&self) -> Result<Vec<Namespace>, EngineError>;
}

/// An engine bound to a repository connection.
pub trait Repository: QueryEngine + RepositoryConnection {}

impl<T: QueryEngine + RepositoryConnection> Repository for T {}
