#![forbid(unsafe_code)]

//! Result writers and destination-based writer selection.
//!
//! Console output goes through the console writers sized to the configured
//! width. File output picks a serialization strictly from the file extension.

/// Console table and statement writers.
pub mod console;

/// N-Triples, N-Quads and Turtle writers.
pub mod rdf;

/// SPARQL results XML and JSON writers.
pub mod sparql;

/// SPARQL results CSV and TSV writers.
pub mod text;

use std::fmt;
use std::io::{self, Write};
use std::path::Path;

use tracing::debug;

use crate::error::{ConsoleError, Result};
use crate::model::{BindingSet, Statement};
use crate::settings::Settings;

/// Receives tuple and boolean query results.
///
/// Tuple results arrive as `start`, any number of `handle_solution`, then
/// `end`. Boolean results arrive as a single `handle_boolean`.
pub trait TupleResultWriter {
    /// Namespace that may be used to abbreviate IRIs.
    fn handle_namespace(&mut self, _prefix: &str, _iri: &str) -> io::Result<()> {
        Ok(())
    }

    /// Begins a result with the projected binding names.
    fn start(&mut self, binding_names: &[String]) -> io::Result<()>;

    /// Writes one solution.
    fn handle_solution(&mut self, solution: &BindingSet) -> io::Result<()>;

    /// Completes the result.
    fn end(&mut self) -> io::Result<()>;

    /// Writes a complete boolean result.
    fn handle_boolean(&mut self, value: bool) -> io::Result<()>;
}

/// Receives graph query results.
pub trait RdfResultWriter {
    /// Namespace that may be used to abbreviate IRIs.
    fn handle_namespace(&mut self, _prefix: &str, _iri: &str) -> io::Result<()> {
        Ok(())
    }

    /// Begins the document.
    fn start(&mut self) -> io::Result<()>;

    /// Writes one statement.
    fn handle_statement(&mut self, statement: &Statement) -> io::Result<()>;

    /// Completes the document.
    fn end(&mut self) -> io::Result<()>;
}

/// File serializations for tuple and boolean results.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum TupleFormat {
    /// SPARQL Query Results XML.
    SparqlXml,
    /// SPARQL Query Results JSON.
    SparqlJson,
    /// SPARQL Query Results CSV.
    Csv,
    /// SPARQL Query Results TSV.
    Tsv,
}

/// File serializations for graph results.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum RdfFormat {
    /// N-Triples.
    NTriples,
    /// N-Quads.
    NQuads,
    /// Turtle.
    Turtle,
}

impl TupleFormat {
    /// Every tuple format.
    pub const ALL: [TupleFormat; 4] = [
        TupleFormat::SparqlXml,
        TupleFormat::SparqlJson,
        TupleFormat::Csv,
        TupleFormat::Tsv,
    ];

    /// Human readable format name.
    pub fn name(&self) -> &'static str {
        match self {
            TupleFormat::SparqlXml => "SPARQL/XML",
            TupleFormat::SparqlJson => "SPARQL/JSON",
            TupleFormat::Csv => "SPARQL/CSV",
            TupleFormat::Tsv => "SPARQL/TSV",
        }
    }

    /// File extensions mapped to the format, default first.
    pub fn extensions(&self) -> &'static [&'static str] {
        match self {
            TupleFormat::SparqlXml => &["srx", "xml"],
            TupleFormat::SparqlJson => &["srj", "json"],
            TupleFormat::Csv => &["csv"],
            TupleFormat::Tsv => &["tsv"],
        }
    }

    /// Format for a file name, by extension only.
    pub fn for_file_name(path: &Path) -> Option<Self> {
        let ext = extension(path)?;
        Self::ALL
            .into_iter()
            .find(|f| f.extensions().iter().any(|e| *e == ext))
    }

    /// Whether the format defines a boolean result. CSV and TSV do not.
    pub fn supports_boolean(&self) -> bool {
        matches!(self, TupleFormat::SparqlXml | TupleFormat::SparqlJson)
    }
}

impl RdfFormat {
    /// Every RDF format.
    pub const ALL: [RdfFormat; 3] = [RdfFormat::NTriples, RdfFormat::NQuads, RdfFormat::Turtle];

    /// Human readable format name.
    pub fn name(&self) -> &'static str {
        match self {
            RdfFormat::NTriples => "N-Triples",
            RdfFormat::NQuads => "N-Quads",
            RdfFormat::Turtle => "Turtle",
        }
    }

    /// File extensions mapped to the format, default first.
    pub fn extensions(&self) -> &'static [&'static str] {
        match self {
            RdfFormat::NTriples => &["nt"],
            RdfFormat::NQuads => &["nq"],
            RdfFormat::Turtle => &["ttl"],
        }
    }

    /// Format for a file name, by extension only.
    pub fn for_file_name(path: &Path) -> Option<Self> {
        let ext = extension(path)?;
        Self::ALL
            .into_iter()
            .find(|f| f.extensions().iter().any(|e| *e == ext))
    }
}

impl fmt::Display for TupleFormat {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name())
    }
}

impl fmt::Display for RdfFormat {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name())
    }
}

fn extension(path: &Path) -> Option<String> {
    path.extension()
        .and_then(|ext| ext.to_str())
        .map(|ext| ext.to_ascii_lowercase())
}

/// Chooses console or file writers for a result.
///
/// Format lookups return `None` for console output. They fail with
/// [`ConsoleError::UnsupportedFormat`] before anything touches the file.
#[derive(Clone, Copy, Debug)]
pub struct ResultWriterSelector {
    width: usize,
    show_prefix: bool,
}

impl ResultWriterSelector {
    /// Selector for console writers of `width` columns.
    pub fn new(width: usize, show_prefix: bool) -> Self {
        Self { width, show_prefix }
    }

    /// Selector configured from console settings.
    pub fn from_settings(settings: &Settings) -> Self {
        Self::new(settings.console_width(), settings.show_prefix())
    }

    /// Tuple format for `path`.
    pub fn tuple_format(&self, path: Option<&Path>) -> Result<Option<TupleFormat>> {
        let Some(path) = path else {
            return Ok(None);
        };
        let format = TupleFormat::for_file_name(path).ok_or_else(|| ConsoleError::UnsupportedFormat {
            path: path.to_path_buf(),
        })?;
        debug!(path = %path.display(), %format, "selected tuple result format");
        Ok(Some(format))
    }

    /// Boolean result format for `path`.
    pub fn boolean_format(&self, path: Option<&Path>) -> Result<Option<TupleFormat>> {
        match (path, self.tuple_format(path)?) {
            (Some(path), Some(format)) if !format.supports_boolean() => {
                Err(ConsoleError::UnsupportedFormat {
                    path: path.to_path_buf(),
                })
            }
            (_, format) => Ok(format),
        }
    }

    /// RDF format for `path`.
    pub fn rdf_format(&self, path: Option<&Path>) -> Result<Option<RdfFormat>> {
        let Some(path) = path else {
            return Ok(None);
        };
        let format = RdfFormat::for_file_name(path).ok_or_else(|| ConsoleError::UnsupportedFormat {
            path: path.to_path_buf(),
        })?;
        debug!(path = %path.display(), %format, "selected RDF format");
        Ok(Some(format))
    }

    /// Tuple writer for `format`, or the console table writer.
    pub fn tuple_writer<'w>(
        &self,
        format: Option<TupleFormat>,
        out: &'w mut dyn Write,
    ) -> Box<dyn TupleResultWriter + 'w> {
        match format {
            None => Box::new(console::ConsoleTupleWriter::new(out, self.width, self.show_prefix)),
            Some(TupleFormat::SparqlXml) => Box::new(sparql::SparqlXmlWriter::new(out)),
            Some(TupleFormat::SparqlJson) => Box::new(sparql::SparqlJsonWriter::new(out)),
            Some(TupleFormat::Csv) => Box::new(text::CsvResultWriter::new(out)),
            Some(TupleFormat::Tsv) => Box::new(text::TsvResultWriter::new(out)),
        }
    }

    /// RDF writer for `format`, or the console statement writer.
    pub fn rdf_writer<'w>(
        &self,
        format: Option<RdfFormat>,
        out: &'w mut dyn Write,
    ) -> Box<dyn RdfResultWriter + 'w> {
        match format {
            None => Box::new(console::ConsoleRdfWriter::new(out, self.width, self.show_prefix)),
            Some(RdfFormat::NTriples) => Box::new(rdf::NTriplesWriter::new(out, false)),
            Some(RdfFormat::NQuads) => Box::new(rdf::NTriplesWriter::new(out, true)),
            Some(RdfFormat::Turtle) => Box::new(rdf::TurtleWriter::new(out)),
        }
    }
}
