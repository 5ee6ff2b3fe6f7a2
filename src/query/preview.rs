//! Repository that classifies queries without storing any data.
//!
//! Every query evaluates to an empty result of the right shape, which keeps
//! the directive, prefix, and writer pipeline usable without a storage engine.
use std::sync::OnceLock;

use regex::Regex;
use tracing::debug;

use super::engine::{EngineError, OperationKind, ParsedOperation, QueryEngine, RepositoryConnection};
use super::QueryLanguage;
use crate::model::{GraphResult, Namespace, TupleResult};

const UPDATE_KEYWORDS: [&str; 10] = [
    "insert", "delete", "load", "clear", "create", "drop", "copy", "move", "add", "with",
];

/// Empty in-memory repository with a fixed namespace table.
#[derive(Clone, Debug, Default)]
pub struct PreviewRepository {
    namespaces: Vec<Namespace>,
}

impl PreviewRepository {
    /// Repository advertising `namespaces`.
    pub fn new(namespaces: Vec<Namespace>) -> Self {
        Self { namespaces }
    }
}

impl QueryEngine for PreviewRepository {
    fn parse(&self, language: QueryLanguage, text: &str) -> Result<ParsedOperation, EngineError> {
        let kind = match language {
            QueryLanguage::Sparql => sparql_kind(text)?,
            QueryLanguage::Serql => serql_kind(text)?,
        };
        debug!(%language, %kind, "classified operation");
        Ok(ParsedOperation::new(language, kind, text))
    }

    fn evaluate_tuple(&mut self, query: &ParsedOperation) -> Result<TupleResult, EngineError> {
        let binding_names = match query.language {
            QueryLanguage::Sparql => sparql_projection(&query.source),
            QueryLanguage::Serql => serql_projection(&query.source),
        };
        Ok(TupleResult {
            binding_names,
            solutions: Vec::new(),
        })
    }

    fn evaluate_boolean(&mut self, _query: &ParsedOperation) -> Result<bool, EngineError> {
        Ok(false)
    }

    fn evaluate_graph(&mut self, _query: &ParsedOperation) -> Result<GraphResult, EngineError> {
        Ok(GraphResult {
            namespaces: self.namespaces.clone(),
            statements: Vec::new(),
        })
    }

    fn execute_update(&mut self, update: &ParsedOperation) -> Result<(), EngineError> {
        debug!(bytes = update.source.len(), "update accepted, nothing stored");
        Ok(())
    }
}

impl RepositoryConnection for PreviewRepository {
    fn namespaces(&self) -> Result<Vec<Namespace>, EngineError> {
        Ok(self.namespaces.clone())
    }
}

/// Text after the SPARQL prologue (comments, `PREFIX` and `BASE` declarations).
fn skip_prologue(mut text: &str) -> &str {
    loop {
        text = text.trim_start();
        if text.starts_with('#') {
            text = text.find('\n').map_or("", |i| &text[i + 1..]);
            continue;
        }
        let word = leading_word(text).to_ascii_lowercase();
        if word != "prefix" && word != "base" {
            return text;
        }
        match text.find('>') {
            Some(i) => text = &text[i + 1..],
            None => return "",
        }
    }
}

fn leading_word(text: &str) -> &str {
    let end = text
        .find(|c: char| !c.is_ascii_alphabetic())
        .unwrap_or(text.len());
    &text[..end]
}

fn sparql_kind(text: &str) -> Result<OperationKind, EngineError> {
    let body = skip_prologue(text);
    let keyword = leading_word(body).to_ascii_lowercase();
    match keyword.as_str() {
        "select" => Ok(OperationKind::TupleQuery),
        "ask" => Ok(OperationKind::BooleanQuery),
        "construct" | "describe" => Ok(OperationKind::GraphQuery),
        k if UPDATE_KEYWORDS.iter().any(|u| *u == k) => Ok(OperationKind::Update),
        "" => Err(EngineError::Malformed("expected a query form".into())),
        other => Err(EngineError::Malformed(format!("unexpected keyword '{other}'"))),
    }
}

fn serql_kind(text: &str) -> Result<OperationKind, EngineError> {
    let keyword = leading_word(text.trim_start()).to_ascii_lowercase();
    match keyword.as_str() {
        "select" => Ok(OperationKind::TupleQuery),
        "construct" => Ok(OperationKind::GraphQuery),
        "" => Err(EngineError::Malformed("expected a query form".into())),
        other => Err(EngineError::Malformed(format!("unexpected keyword '{other}'"))),
    }
}

fn clause_end() -> &'static Regex {
    static RE: OnceLock<Regex> = OnceLock::new();
    RE.get_or_init(|| Regex::new(r"(?i)\b(?:where|from)\b|\{").expect("clause pattern is valid"))
}

/// Variables projected by a SPARQL `SELECT`, in order.
///
/// `SELECT *` projects every variable of the query body.
fn sparql_projection(text: &str) -> Vec<String> {
    let body = skip_prologue(text);
    let body = &body[leading_word(body).len()..];
    let end = clause_end().find(body).map_or(body.len(), |m| m.start());
    let (clause, rest) = body.split_at(end);
    if clause.trim_start().trim_start_matches(|c: char| c.is_ascii_alphabetic()).trim() == "*" {
        return variables(rest, true);
    }
    variables(clause, false)
}

/// Collects `?name`/`$name` occurrences. Inside parentheses only `AS` aliases
/// count unless `nested` is set.
fn variables(text: &str, nested: bool) -> Vec<String> {
    let mut names: Vec<String> = Vec::new();
    let mut depth = 0usize;
    let mut chars = text.char_indices().peekable();
    while let Some((i, c)) = chars.next() {
        match c {
            '(' => depth += 1,
            ')' => depth = depth.saturating_sub(1),
            '?' | '$' => {
                let mut name = String::new();
                while let Some(&(_, n)) = chars.peek() {
                    if !(n.is_alphanumeric() || n == '_') {
                        break;
                    }
                    name.push(n);
                    chars.next();
                }
                let projected = nested || depth == 0 || follows_as(&text[..i]);
                if projected && !name.is_empty() && !names.contains(&name) {
                    names.push(name);
                }
            }
            _ => {}
        }
    }
    names
}

fn follows_as(before: &str) -> bool {
    let before = before.trim_end();
    let Some(split) = before.len().checked_sub(2) else {
        return false;
    };
    match (before.get(..split), before.get(split..)) {
        (Some(head), Some(tail)) => {
            tail.eq_ignore_ascii_case("as")
                && !head.ends_with(|c: char| c.is_alphanumeric() || matches!(c, '_' | '?' | '$'))
        }
        _ => false,
    }
}

/// Names in a SeRQL `SELECT` list.
fn serql_projection(text: &str) -> Vec<String> {
    let body = text.trim_start();
    let body = &body[leading_word(body).len()..];
    let end = clause_end().find(body).map_or(body.len(), |m| m.start());
    body[..end]
        .split(',')
        .map(str::trim)
        .map(|item| {
            item.strip_prefix("distinct ")
                .or_else(|| item.strip_prefix("DISTINCT "))
                .unwrap_or(item)
                .trim()
        })
        .filter(|item| !item.is_empty() && *item != "*")
        .map(str::to_string)
        .collect()
}
