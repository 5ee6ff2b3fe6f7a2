//! SPARQL 1.1 Query Results XML and JSON formats.
use std::io::{self, Write};

use serde_json::{json, Map, Value};

use crate::model::{BindingSet, Term};

use super::TupleResultWriter;

const XML_HEADER: &str = "<?xml version='1.0' encoding='UTF-8'?>\n<sparql xmlns='http://www.w3.org/2005/sparql-results#'>\n";

/// `application/sparql-results+xml` writer.
pub struct SparqlXmlWriter<'w> {
    out: &'w mut dyn Write,
    names: Vec<String>,
}

impl<'w> SparqlXmlWriter<'w> {
    /// Writer over `out`.
    pub fn new(out: &'w mut dyn Write) -> Self {
        Self {
            out,
            names: Vec::new(),
        }
    }
}

impl TupleResultWriter for SparqlXmlWriter<'_> {
    fn start(&mut self, binding_names: &[String]) -> io::Result<()> {
        self.names = binding_names.to_vec();
        self.out.write_all(XML_HEADER.as_bytes())?;
        writeln!(self.out, "\t<head>")?;
        for name in &self.names {
            writeln!(self.out, "\t\t<variable name='{}'/>", xml_escape(name))?;
        }
        writeln!(self.out, "\t</head>")?;
        writeln!(self.out, "\t<results>")
    }

    fn handle_solution(&mut self, solution: &BindingSet) -> io::Result<()> {
        writeln!(self.out, "\t\t<result>")?;
        for name in &self.names {
            let Some(term) = solution.get(name) else {
                continue;
            };
            writeln!(self.out, "\t\t\t<binding name='{}'>", xml_escape(name))?;
            writeln!(self.out, "\t\t\t\t{}", xml_term(term))?;
            writeln!(self.out, "\t\t\t</binding>")?;
        }
        writeln!(self.out, "\t\t</result>")
    }

    fn end(&mut self) -> io::Result<()> {
        writeln!(self.out, "\t</results>")?;
        writeln!(self.out, "</sparql>")?;
        self.out.flush()
    }

    fn handle_boolean(&mut self, value: bool) -> io::Result<()> {
        self.out.write_all(XML_HEADER.as_bytes())?;
        writeln!(self.out, "\t<head>\n\t</head>")?;
        writeln!(self.out, "\t<boolean>{value}</boolean>")?;
        writeln!(self.out, "</sparql>")?;
        self.out.flush()
    }
}

fn xml_term(term: &Term) -> String {
    match term {
        Term::Iri(iri) => format!("<uri>{}</uri>", xml_escape(iri)),
        Term::Bnode(label) => format!("<bnode>{}</bnode>", xml_escape(label)),
        Term::Literal {
            value,
            datatype,
            language,
        } => {
            let attr = match (language, datatype) {
                (Some(lang), _) => format!(" xml:lang='{}'", xml_escape(lang)),
                (None, Some(dt)) => format!(" datatype='{}'", xml_escape(dt)),
                (None, None) => String::new(),
            };
            format!("<literal{attr}>{}</literal>", xml_escape(value))
        }
    }
}

fn xml_escape(text: &str) -> String {
    let mut out = String::with_capacity(text.len());
    for ch in text.chars() {
        match ch {
            '&' => out.push_str("&amp;"),
            '<' => out.push_str("&lt;"),
            '>' => out.push_str("&gt;"),
            '"' => out.push_str("&quot;"),
            '\'' => out.push_str("&apos;"),
            other => out.push(other),
        }
    }
    out
}

/// `application/sparql-results+json` writer.
///
/// Solutions are buffered and serialized as one document on `end`.
pub struct SparqlJsonWriter<'w> {
    out: &'w mut dyn Write,
    names: Vec<String>,
    bindings: Vec<Value>,
}

impl<'w> SparqlJsonWriter<'w> {
    /// Writer over `out`.
    pub fn new(out: &'w mut dyn Write) -> Self {
        Self {
            out,
            names: Vec::new(),
            bindings: Vec::new(),
        }
    }

    fn emit(&mut self, document: &Value) -> io::Result<()> {
        serde_json::to_writer_pretty(&mut *self.out, document)?;
        writeln!(self.out)?;
        self.out.flush()
    }
}

impl TupleResultWriter for SparqlJsonWriter<'_> {
    fn start(&mut self, binding_names: &[String]) -> io::Result<()> {
        self.names = binding_names.to_vec();
        Ok(())
    }

    fn handle_solution(&mut self, solution: &BindingSet) -> io::Result<()> {
        let row: Map<String, Value> = solution
            .iter()
            .map(|(name, term)| (name.clone(), json_term(term)))
            .collect();
        self.bindings.push(Value::Object(row));
        Ok(())
    }

    fn end(&mut self) -> io::Result<()> {
        let document = json!({
            "head": { "vars": self.names },
            "results": { "bindings": std::mem::take(&mut self.bindings) },
        });
        self.emit(&document)
    }

    fn handle_boolean(&mut self, value: bool) -> io::Result<()> {
        self.emit(&json!({ "head": {}, "boolean": value }))
    }
}

fn json_term(term: &Term) -> Value {
    match term {
        Term::Iri(iri) => json!({ "type": "uri", "value": iri }),
        Term::Bnode(label) => json!({ "type": "bnode", "value": label }),
        Term::Literal {
            value,
            datatype,
            language,
        } => {
            let mut obj = Map::new();
            obj.insert("type".into(), json!("literal"));
            obj.insert("value".into(), json!(value));
            if let Some(lang) = language {
                obj.insert("xml:lang".into(), json!(lang));
            } else if let Some(dt) = datatype {
                obj.insert("datatype".into(), json!(dt));
            }
            Value::Object(obj)
        }
    }
}
