#![forbid(unsafe_code)]

//! Query preparation and execution front end.
//!
//! A typed command flows through directive parsing, file resolution, prefix
//! injection, and finally the dispatcher, which evaluates it against a
//! [`QueryEngine`] and writes the result to the console or a file.

/// Query text assembly.
///
/// Combines the command text, directive files, and repository namespaces into
/// the text handed to the engine.
pub mod assemble;

/// Inline `INFILE=`/`OUTFILE=` directive parsing.
pub mod directive;

/// Dispatch of parsed operations by result kind.
pub mod dispatch;

/// Engine and repository contracts.
pub mod engine;

/// Directive file resolution and charset decoding.
pub mod files;

/// Query languages and namespace declaration syntax.
pub mod language;

/// Storage-free repository used when no engine is attached.
pub mod preview;

pub use assemble::{inject_prefixes, AssembledQuery, QueryTextAssembler};
pub use directive::{parse_directive, Directive};
pub use dispatch::{DispatchOutcome, QueryDispatcher};
pub use engine::{
    EngineError, OperationKind, ParsedOperation, QueryEngine, Repository, RepositoryConnection,
};
pub use files::{Charset, FileResolver, OutputTarget, MAX_INPUT_BYTES};
pub use language::{PrefixHandler, QueryLanguage};
pub use preview::PreviewRepository;
