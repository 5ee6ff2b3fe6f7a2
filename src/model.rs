//! RDF values exchanged between the query engine and the result writers.
use std::collections::BTreeMap;
use std::fmt;

/// XML Schema string datatype, implied for plain literals.
pub const XSD_STRING: &str = "http://www.w3.org/2001/XMLSchema#string";

/// RDF term bound to a variable or used in a statement position.
#[derive(Clone, Debug, PartialEq, Eq, Hash)]
pub enum Term {
    /// Absolute IRI.
    Iri(String),
    /// Blank node label without the `_:` prefix.
    Bnode(String),
    /// Literal with optional datatype or language tag.
    Literal {
        /// Lexical form.
        value: String,
        /// Datatype IRI, `None` for plain and language-tagged literals.
        datatype: Option<String>,
        /// Language tag.
        language: Option<String>,
    },
}

impl Term {
    /// Builds an IRI term.
    pub fn iri(value: impl Into<String>) -> Self {
        Term::Iri(value.into())
    }

    /// Builds a blank node term.
    pub fn bnode(label: impl Into<String>) -> Self {
        Term::Bnode(label.into())
    }

    /// Builds a plain literal.
    pub fn literal(value: impl Into<String>) -> Self {
        Term::Literal {
            value: value.into(),
            datatype: None,
            language: None,
        }
    }

    /// Builds a typed literal.
    pub fn typed(value: impl Into<String>, datatype: impl Into<String>) -> Self {
        Term::Literal {
            value: value.into(),
            datatype: Some(datatype.into()),
            language: None,
        }
    }

    /// Builds a language-tagged literal.
    pub fn lang(value: impl Into<String>, language: impl Into<String>) -> Self {
        Term::Literal {
            value: value.into(),
            datatype: None,
            language: Some(language.into()),
        }
    }

    /// Lexical value without any syntax decoration.
    pub fn value(&self) -> &str {
        match self {
            Term::Iri(v) | Term::Bnode(v) => v,
            Term::Literal { value, .. } => value,
        }
    }
}

/// N-Triples rendering.
impl fmt::Display for Term {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Term::Iri(iri) => write!(f, "<{}>", escape_iri(iri)),
            Term::Bnode(label) => write!(f, "_:{label}"),
            Term::Literal {
                value,
                datatype,
                language,
            } => {
                write!(f, "\"{}\"", escape_literal(value))?;
                if let Some(lang) = language {
                    write!(f, "@{lang}")
                } else if let Some(dt) = datatype.as_deref().filter(|dt| *dt != XSD_STRING) {
                    write!(f, "^^<{}>", escape_iri(dt))
                } else {
                    Ok(())
                }
            }
        }
    }
}

/// Escapes a literal lexical form for N-Triples and Turtle.
pub fn escape_literal(value: &str) -> String {
    let mut out = String::with_capacity(value.len());
    for ch in value.chars() {
        match ch {
            '\\' => out.push_str("\\\\"),
            '"' => out.push_str("\\\""),
            '\n' => out.push_str("\\n"),
            '\r' => out.push_str("\\r"),
            '\t' => out.push_str("\\t"),
            other => out.push(other),
        }
    }
    out
}

/// Escapes characters that may not appear between `<` and `>`.
pub fn escape_iri(iri: &str) -> String {
    let mut out = String::with_capacity(iri.len());
    for ch in iri.chars() {
        match ch {
            '<' | '>' | '"' | '{' | '}' | '|' | '^' | '`' | '\\' | ' ' => {
                out.push_str(&format!("\\u{:04X}", ch as u32));
            }
            other => out.push(other),
        }
    }
    out
}

/// Namespace declaration known to the repository.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct Namespace {
    /// Prefix without the trailing colon.
    pub prefix: String,
    /// Namespace IRI.
    pub name: String,
}

impl Namespace {
    /// Creates a namespace declaration.
    pub fn new(prefix: impl Into<String>, name: impl Into<String>) -> Self {
        Self {
            prefix: prefix.into(),
            name: name.into(),
        }
    }
}

/// One solution of a tuple query, keyed by binding name. Unbound names are absent.
pub type BindingSet = BTreeMap<String, Term>;

/// Materialised tuple query result.
#[derive(Clone, Debug, Default, PartialEq)]
pub struct TupleResult {
    /// Projected binding names in select order.
    pub binding_names: Vec<String>,
    /// Solutions in engine order.
    pub solutions: Vec<BindingSet>,
}

/// RDF statement, with a graph name for quads.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct Statement {
    /// Subject term.
    pub subject: Term,
    /// Predicate IRI.
    pub predicate: Term,
    /// Object term.
    pub object: Term,
    /// Named graph, `None` for the default graph.
    pub graph: Option<Term>,
}

impl Statement {
    /// Creates a default-graph statement.
    pub fn new(subject: Term, predicate: Term, object: Term) -> Self {
        Self {
            subject,
            predicate,
            object,
            graph: None,
        }
    }
}

/// Materialised graph query result.
#[derive(Clone, Debug, Default, PartialEq)]
pub struct GraphResult {
    /// Namespaces the engine reports alongside the statements.
    pub namespaces: Vec<Namespace>,
    /// Constructed or described statements.
    pub statements: Vec<Statement>,
}
