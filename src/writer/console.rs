//! Fixed-width console renderings of query results.
use std::io::{self, Write};

use crate::model::{escape_literal, BindingSet, Namespace, Statement, Term, XSD_STRING};

use super::{RdfResultWriter, TupleResultWriter};

const MIN_COLUMN: usize = 5;
const ELLIPSIS: &str = "...";

/// Bordered table with one equally sized column per binding name.
pub struct ConsoleTupleWriter<'w> {
    out: &'w mut dyn Write,
    width: usize,
    show_prefix: bool,
    namespaces: Vec<Namespace>,
    names: Vec<String>,
    column: usize,
    started: bool,
}

impl<'w> ConsoleTupleWriter<'w> {
    /// Writer for a console `width` characters wide.
    pub fn new(out: &'w mut dyn Write, width: usize, show_prefix: bool) -> Self {
        Self {
            out,
            width,
            show_prefix,
            namespaces: Vec::new(),
            names: Vec::new(),
            column: MIN_COLUMN,
            started: false,
        }
    }

    fn separator(&mut self) -> io::Result<()> {
        let mut line = String::from("+");
        for _ in 0..self.names.len().max(1) {
            line.push_str(&"-".repeat(self.column + 2));
            line.push('+');
        }
        writeln!(self.out, "{line}")
    }

    fn row<I: IntoIterator<Item = String>>(&mut self, cells: I) -> io::Result<()> {
        let mut line = String::from("|");
        let width = self.column;
        for cell in cells {
            line.push_str(&format!(" {:<width$} |", fit(&cell, width)));
        }
        writeln!(self.out, "{line}")
    }
}

impl TupleResultWriter for ConsoleTupleWriter<'_> {
    fn handle_namespace(&mut self, prefix: &str, iri: &str) -> io::Result<()> {
        self.namespaces.push(Namespace::new(prefix, iri));
        Ok(())
    }

    fn start(&mut self, binding_names: &[String]) -> io::Result<()> {
        self.names = binding_names.to_vec();
        let columns = self.names.len().max(1);
        self.column = (self.width.saturating_sub(1) / columns)
            .saturating_sub(3)
            .max(MIN_COLUMN);
        self.started = true;
        self.separator()?;
        let header = self.names.clone();
        self.row(header)?;
        self.separator()
    }

    fn handle_solution(&mut self, solution: &BindingSet) -> io::Result<()> {
        let cells: Vec<String> = self
            .names
            .iter()
            .map(|name| {
                solution
                    .get(name)
                    .map(|term| render_term(term, &self.namespaces, self.show_prefix))
                    .unwrap_or_default()
            })
            .collect();
        self.row(cells)
    }

    fn end(&mut self) -> io::Result<()> {
        if self.started {
            self.separator()?;
        }
        self.out.flush()
    }

    fn handle_boolean(&mut self, value: bool) -> io::Result<()> {
        writeln!(self.out, "Answer: {value}")?;
        self.out.flush()
    }
}

/// One statement per line in three equally sized columns.
pub struct ConsoleRdfWriter<'w> {
    out: &'w mut dyn Write,
    column: usize,
    show_prefix: bool,
    namespaces: Vec<Namespace>,
}

impl<'w> ConsoleRdfWriter<'w> {
    /// Writer for a console `width` characters wide.
    pub fn new(out: &'w mut dyn Write, width: usize, show_prefix: bool) -> Self {
        Self {
            out,
            column: (width.saturating_sub(4) / 3).max(MIN_COLUMN),
            show_prefix,
            namespaces: Vec::new(),
        }
    }
}

impl RdfResultWriter for ConsoleRdfWriter<'_> {
    fn handle_namespace(&mut self, prefix: &str, iri: &str) -> io::Result<()> {
        self.namespaces.push(Namespace::new(prefix, iri));
        Ok(())
    }

    fn start(&mut self) -> io::Result<()> {
        Ok(())
    }

    fn handle_statement(&mut self, statement: &Statement) -> io::Result<()> {
        let width = self.column;
        let [s, p, o] = [&statement.subject, &statement.predicate, &statement.object]
            .map(|term| fit(&render_term(term, &self.namespaces, self.show_prefix), width));
        writeln!(self.out, "{s:<width$}  {p:<width$}  {o}")
    }

    fn end(&mut self) -> io::Result<()> {
        self.out.flush()
    }
}

/// Console form of a term, abbreviating IRIs under a known namespace.
pub fn render_term(term: &Term, namespaces: &[Namespace], show_prefix: bool) -> String {
    let iri = |value: &str| match show_prefix.then(|| abbreviate(value, namespaces)).flatten() {
        Some(short) => short,
        None => format!("<{value}>"),
    };
    match term {
        Term::Iri(value) => iri(value.as_str()),
        Term::Bnode(label) => format!("_:{label}"),
        Term::Literal {
            value,
            datatype,
            language,
        } => {
            let lexical = format!("\"{}\"", escape_literal(value));
            match (language, datatype.as_deref()) {
                (Some(lang), _) => format!("{lexical}@{lang}"),
                (None, Some(dt)) if dt != XSD_STRING => format!("{lexical}^^{}", iri(dt)),
                _ => lexical,
            }
        }
    }
}

/// `prefix:local` for `iri` when a namespace covers it.
pub fn abbreviate(iri: &str, namespaces: &[Namespace]) -> Option<String> {
    namespaces
        .iter()
        .filter(|ns| !ns.name.is_empty() && iri.starts_with(ns.name.as_str()))
        .max_by_key(|ns| ns.name.len())
        .map(|ns| format!("{}:{}", ns.prefix, &iri[ns.name.len()..]))
}

fn fit(text: &str, width: usize) -> String {
    if text.chars().count() <= width {
        return text.to_string();
    }
    let keep = width.saturating_sub(ELLIPSIS.len());
    let mut out: String = text.chars().take(keep).collect();
    out.push_str(ELLIPSIS);
    out
}
