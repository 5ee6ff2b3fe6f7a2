//! Query languages and their namespace declaration syntax.
use std::fmt;
use std::str::FromStr;
use std::sync::OnceLock;

use regex::Regex;

use crate::model::{escape_iri, Namespace};

/// Query language selected by the command keyword.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub enum QueryLanguage {
    /// W3C SPARQL 1.1.
    Sparql,
    /// Sesame RDF Query Language.
    Serql,
}

impl QueryLanguage {
    /// Display name used in prompts and messages.
    pub fn name(&self) -> &'static str {
        match self {
            QueryLanguage::Sparql => "SPARQL",
            QueryLanguage::Serql => "SeRQL",
        }
    }

    /// Namespace handling for this language.
    pub fn prefixes(&self) -> &'static dyn PrefixHandler {
        match self {
            QueryLanguage::Sparql => &SparqlPrefixes,
            QueryLanguage::Serql => &SerqlPrefixes,
        }
    }
}

impl fmt::Display for QueryLanguage {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name())
    }
}

impl FromStr for QueryLanguage {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_ascii_lowercase().as_str() {
            "sparql" => Ok(QueryLanguage::Sparql),
            "serql" => Ok(QueryLanguage::Serql),
            other => Err(format!("unknown query language '{other}'")),
        }
    }
}

/// Language-specific namespace declaration handling.
pub trait PrefixHandler: Sync {
    /// Whether the query already declares namespaces (case-insensitive).
    fn has_prefixes(&self, query: &str) -> bool;

    /// Returns `query` with declarations for `namespaces` in native syntax.
    fn add_prefixes(&self, query: &str, namespaces: &[Namespace]) -> String;

    /// Namespaces declared in `query`, in declaration order.
    fn declared(&self, query: &str) -> Vec<Namespace>;
}

/// `PREFIX p: <iri>` declarations, placed before the query.
pub struct SparqlPrefixes;

/// `USING NAMESPACE p = <iri>, ...` clause, placed after the query.
pub struct SerqlPrefixes;

fn sparql_prefix_decl() -> &'static Regex {
    static RE: OnceLock<Regex> = OnceLock::new();
    RE.get_or_init(|| {
        Regex::new(r"(?i)(?:^|[\s}.])PREFIX\s+([\w.-]*):\s*<([^>]*)>")
            .expect("sparql prefix pattern is valid")
    })
}

fn serql_using_namespace() -> &'static Regex {
    static RE: OnceLock<Regex> = OnceLock::new();
    RE.get_or_init(|| {
        Regex::new(r"(?i)\bUSING\s+NAMESPACE\b").expect("serql namespace pattern is valid")
    })
}

fn serql_namespace_entry() -> &'static Regex {
    static RE: OnceLock<Regex> = OnceLock::new();
    RE.get_or_init(|| {
        Regex::new(r"([\w.-]+)\s*=\s*<([^>]*)>").expect("serql namespace entry is valid")
    })
}

impl PrefixHandler for SparqlPrefixes {
    fn has_prefixes(&self, query: &str) -> bool {
        sparql_prefix_decl().is_match(query)
    }

    fn add_prefixes(&self, query: &str, namespaces: &[Namespace]) -> String {
        let mut out = String::with_capacity(query.len() + 64 * namespaces.len());
        for ns in namespaces {
            out.push_str("PREFIX ");
            out.push_str(&ns.prefix);
            out.push_str(": <");
            out.push_str(&escape_iri(&ns.name));
            out.push_str(">\n");
        }
        out.push_str(query);
        out
    }

    fn declared(&self, query: &str) -> Vec<Namespace> {
        sparql_prefix_decl()
            .captures_iter(query)
            .map(|caps| Namespace::new(&caps[1], &caps[2]))
            .collect()
    }
}

impl PrefixHandler for SerqlPrefixes {
    fn has_prefixes(&self, query: &str) -> bool {
        serql_using_namespace().is_match(query)
    }

    fn add_prefixes(&self, query: &str, namespaces: &[Namespace]) -> String {
        if namespaces.is_empty() {
            return query.to_string();
        }
        let entries: Vec<String> = namespaces
            .iter()
            .map(|ns| format!("\n   {} = <{}>", ns.prefix, escape_iri(&ns.name)))
            .collect();
        format!("{query} USING NAMESPACE{}", entries.join(","))
    }

    fn declared(&self, query: &str) -> Vec<Namespace> {
        let Some(clause) = serql_using_namespace().find(query) else {
            return Vec::new();
        };
        serql_namespace_entry()
            .captures_iter(&query[clause.end()..])
            .map(|caps| Namespace::new(&caps[1], &caps[2]))
            .collect()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn namespaces() -> Vec<Namespace> {
        vec![
            Namespace::new("ex", "http://example.org/"),
            Namespace::new("foaf", "http://xmlns.com/foaf/0.1/"),
        ]
    }

    #[test]
    fn sparql_detects_declarations_case_insensitively() {
        let handler = QueryLanguage::Sparql.prefixes();
        assert!(handler.has_prefixes("prefix ex: <http://example.org/> select * {}"));
        assert!(handler.has_prefixes("BASE <http://b/>\nPREFIX : <http://example.org/> ASK {}"));
        assert!(!handler.has_prefixes("select ?prefix where { ?s ex:prefix ?prefix }"));
        assert!(!handler.has_prefixes("select * where { ?s ?p ?o }"));
    }

    #[test]
    fn sparql_prepends_one_declaration_per_namespace() {
        let query = "select * where { ?s ?p ?o }";
        let prefixed = SparqlPrefixes.add_prefixes(query, &namespaces());
        assert_eq!(
            prefixed,
            "PREFIX ex: <http://example.org/>\nPREFIX foaf: <http://xmlns.com/foaf/0.1/>\nselect * where { ?s ?p ?o }"
        );
        assert_eq!(SparqlPrefixes.declared(&prefixed), namespaces());
    }

    #[test]
    fn serql_appends_using_namespace_clause() {
        let query = "select x from {x} foaf:name {y}";
        let prefixed = SerqlPrefixes.add_prefixes(query, &namespaces());
        assert_eq!(
            prefixed,
            "select x from {x} foaf:name {y} USING NAMESPACE\n   ex = <http://example.org/>,\n   foaf = <http://xmlns.com/foaf/0.1/>"
        );
        assert!(SerqlPrefixes.has_prefixes(&prefixed));
        assert_eq!(SerqlPrefixes.declared(&prefixed), namespaces());
    }

    #[test]
    fn serql_without_namespaces_is_unchanged() {
        assert_eq!(SerqlPrefixes.add_prefixes("select x from {x} p {y}", &[]), "select x from {x} p {y}");
    }

    #[test]
    fn language_names_parse() {
        assert_eq!("SPARQL".parse::<QueryLanguage>(), Ok(QueryLanguage::Sparql));
        assert_eq!("serql".parse::<QueryLanguage>(), Ok(QueryLanguage::Serql));
        assert!("sql".parse::<QueryLanguage>().is_err());
    }
}
