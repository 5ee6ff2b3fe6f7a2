//! SPARQL 1.1 Query Results CSV and TSV formats.
use std::io::{self, Write};

use csv::{QuoteStyle, Writer, WriterBuilder};

use crate::model::{BindingSet, Term};

use super::TupleResultWriter;

/// `text/csv` writer: plain values, no datatypes or language tags.
pub struct CsvResultWriter<'w> {
    writer: Writer<&'w mut dyn Write>,
    names: Vec<String>,
}

impl<'w> CsvResultWriter<'w> {
    /// Writer over `out`.
    pub fn new(out: &'w mut dyn Write) -> Self {
        Self {
            writer: WriterBuilder::new().terminator(csv::Terminator::CRLF).from_writer(out),
            names: Vec::new(),
        }
    }
}

impl TupleResultWriter for CsvResultWriter<'_> {
    fn start(&mut self, binding_names: &[String]) -> io::Result<()> {
        self.names = binding_names.to_vec();
        self.writer.write_record(&self.names)?;
        Ok(())
    }

    fn handle_solution(&mut self, solution: &BindingSet) -> io::Result<()> {
        let record = self.names.iter().map(|name| match solution.get(name) {
            Some(Term::Bnode(label)) => format!("_:{label}"),
            Some(term) => term.value().to_string(),
            None => String::new(),
        });
        self.writer.write_record(record)?;
        Ok(())
    }

    fn end(&mut self) -> io::Result<()> {
        self.writer.flush()
    }

    fn handle_boolean(&mut self, _: bool) -> io::Result<()> {
        Err(no_boolean_result())
    }
}

/// `text/tab-separated-values` writer: terms in N-Triples syntax.
pub struct TsvResultWriter<'w> {
    writer: Writer<&'w mut dyn Write>,
    names: Vec<String>,
}

impl<'w> TsvResultWriter<'w> {
    /// Writer over `out`.
    pub fn new(out: &'w mut dyn Write) -> Self {
        Self {
            writer: WriterBuilder::new()
                .delimiter(b'\t')
                .quote_style(QuoteStyle::Never)
                .from_writer(out),
            names: Vec::new(),
        }
    }
}

impl TupleResultWriter for TsvResultWriter<'_> {
    fn start(&mut self, binding_names: &[String]) -> io::Result<()> {
        self.names = binding_names.to_vec();
        self.writer
            .write_record(self.names.iter().map(|name| format!("?{name}")))?;
        Ok(())
    }

    fn handle_solution(&mut self, solution: &BindingSet) -> io::Result<()> {
        let record = self
            .names
            .iter()
            .map(|name| solution.get(name).map(Term::to_string).unwrap_or_default());
        self.writer.write_record(record)?;
        Ok(())
    }

    fn end(&mut self) -> io::Result<()> {
        self.writer.flush()
    }

    fn handle_boolean(&mut self, _: bool) -> io::Result<()> {
        Err(no_boolean_result())
    }
}

fn no_boolean_result() -> io::Error {
    io::Error::new(io::ErrorKind::Unsupported, "format has no boolean result")
}
