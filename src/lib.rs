//! Query execution front end of an RDF repository console.
//!
//! The console turns a typed command into a query: it strips inline
//! `INFILE=`/`OUTFILE=` directives, reads query files, injects repository
//! namespaces, and writes each result to the console or to a file whose
//! extension selects the format.

#![warn(missing_docs)]

pub mod config;
pub mod console;
pub mod error;
pub mod logging;
pub mod model;
pub mod query;
pub mod settings;
pub mod writer;

pub use error::{ConsoleError, ConsoleErrorWithCode, Result};
