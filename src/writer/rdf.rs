//! Line-based and Turtle serializations of graph results.
use std::io::{self, Write};

use crate::model::{escape_literal, Namespace, Statement, Term, XSD_STRING};

use super::RdfResultWriter;

const RDF_TYPE: &str = "http://www.w3.org/1999/02/22-rdf-syntax-ns#type";

/// N-Triples writer, or N-Quads when statements carry a graph name.
pub struct NTriplesWriter<'w> {
    out: &'w mut dyn Write,
    quads: bool,
}

impl<'w> NTriplesWriter<'w> {
    /// Writer over `out`; `quads` keeps the graph name of each statement.
    pub fn new(out: &'w mut dyn Write, quads: bool) -> Self {
        Self { out, quads }
    }
}

impl RdfResultWriter for NTriplesWriter<'_> {
    fn start(&mut self) -> io::Result<()> {
        Ok(())
    }

    fn handle_statement(&mut self, st: &Statement) -> io::Result<()> {
        match st.graph.as_ref().filter(|_| self.quads) {
            Some(graph) => writeln!(
                self.out,
                "{} {} {} {} .",
                st.subject, st.predicate, st.object, graph
            ),
            None => writeln!(self.out, "{} {} {} .", st.subject, st.predicate, st.object),
        }
    }

    fn end(&mut self) -> io::Result<()> {
        self.out.flush()
    }
}

/// Turtle writer grouping consecutive statements about the same subject.
///
/// Graph names are dropped.
pub struct TurtleWriter<'w> {
    out: &'w mut dyn Write,
    namespaces: Vec<Namespace>,
    subject: Option<Term>,
}

impl<'w> TurtleWriter<'w> {
    /// Writer over `out`.
    pub fn new(out: &'w mut dyn Write) -> Self {
        Self {
            out,
            namespaces: Vec::new(),
            subject: None,
        }
    }

    fn iri(&self, iri: &str) -> String {
        self.namespaces
            .iter()
            .filter(|ns| iri.starts_with(ns.name.as_str()))
            .filter(|ns| is_local_name(&iri[ns.name.len()..]))
            .max_by_key(|ns| ns.name.len())
            .map(|ns| format!("{}:{}", ns.prefix, &iri[ns.name.len()..]))
            .unwrap_or_else(|| Term::iri(iri).to_string())
    }

    fn term(&self, term: &Term) -> String {
        match term {
            Term::Iri(iri) => self.iri(iri),
            Term::Bnode(label) => format!("_:{label}"),
            Term::Literal {
                value,
                datatype,
                language,
            } => {
                let lexical = format!("\"{}\"", escape_literal(value));
                match (language, datatype.as_deref()) {
                    (Some(lang), _) => format!("{lexical}@{lang}"),
                    (None, Some(dt)) if dt != XSD_STRING => format!("{lexical}^^{}", self.iri(dt)),
                    _ => lexical,
                }
            }
        }
    }
}

impl RdfResultWriter for TurtleWriter<'_> {
    fn handle_namespace(&mut self, prefix: &str, iri: &str) -> io::Result<()> {
        if !self.namespaces.iter().any(|ns| ns.prefix == prefix) {
            self.namespaces.push(Namespace::new(prefix, iri));
        }
        Ok(())
    }

    fn start(&mut self) -> io::Result<()> {
        for ns in &self.namespaces {
            writeln!(self.out, "@prefix {}: {} .", ns.prefix, Term::iri(ns.name.as_str()))?;
        }
        if !self.namespaces.is_empty() {
            writeln!(self.out)?;
        }
        Ok(())
    }

    fn handle_statement(&mut self, st: &Statement) -> io::Result<()> {
        let predicate = match &st.predicate {
            Term::Iri(iri) if iri == RDF_TYPE => "a".to_string(),
            other => self.term(other),
        };
        let object = self.term(&st.object);
        if self.subject.as_ref() == Some(&st.subject) {
            write!(self.out, " ;\n    {predicate} {object}")
        } else {
            if self.subject.is_some() {
                writeln!(self.out, " .")?;
            }
            let subject = self.term(&st.subject);
            self.subject = Some(st.subject.clone());
            write!(self.out, "{subject} {predicate} {object}")
        }
    }

    fn end(&mut self) -> io::Result<()> {
        if self.subject.take().is_some() {
            writeln!(self.out, " .")?;
        }
        self.out.flush()
    }
}

fn is_local_name(local: &str) -> bool {
    !local.starts_with(['-', '.'])
        && !local.ends_with('.')
        && local
            .chars()
            .all(|c| c.is_alphanumeric() || matches!(c, '_' | '-' | '.'))
}
