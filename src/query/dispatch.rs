//! Routes a parsed operation to the evaluation call and writer for its kind.
use std::io::{self, BufWriter, Write};
use std::time::Instant;

use tracing::{debug, error};

use super::assemble::AssembledQuery;
use super::engine::{OperationKind, QueryEngine};
use super::files::OutputTarget;
use super::QueryLanguage;
use crate::console::ConsoleIo;
use crate::error::{ConsoleError, Result};
use crate::model::Namespace;
use crate::writer::ResultWriterSelector;

/// What a dispatched operation produced.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum DispatchOutcome {
    /// Tuple query with this many solutions.
    Tuple {
        /// Number of solutions written.
        solutions: usize,
    },
    /// Boolean query answer.
    Boolean(bool),
    /// Graph query with this many statements.
    Graph {
        /// Number of statements written.
        statements: usize,
    },
    /// Executed update.
    Update,
}

/// Parses, evaluates, and writes one query.
///
/// Output files are created only once evaluation succeeded and are closed
/// before `dispatch` returns, on success and failure alike.
#[derive(Clone, Copy, Debug)]
pub struct QueryDispatcher {
    selector: ResultWriterSelector,
}

impl QueryDispatcher {
    /// Dispatcher writing through `selector`.
    pub fn new(selector: ResultWriterSelector) -> Self {
        Self { selector }
    }

    /// Runs `query` against `engine`.
    pub fn dispatch<E>(
        &self,
        engine: &mut E,
        language: QueryLanguage,
        query: &AssembledQuery,
        io: &mut dyn ConsoleIo,
    ) -> Result<DispatchOutcome>
    where
        E: QueryEngine + ?Sized,
    {
        let op = engine.parse(language, &query.text)?;
        let target = query.output.as_ref();
        let output = target.map(|t| t.path.as_path());
        debug!(kind = %op.kind, output = ?output, "dispatching operation");
        let namespaces = language.prefixes().declared(&query.text);
        let started = Instant::now();

        match op.kind {
            OperationKind::TupleQuery => {
                let format = self.selector.tuple_format(output)?;
                let result = engine.evaluate_tuple(&op).map_err(|err| {
                    error!(error = %err, "query evaluation failed");
                    ConsoleError::from(err)
                })?;
                write_to(target, io, |out| {
                    let mut writer = self.selector.tuple_writer(format, out);
                    for ns in &namespaces {
                        writer.handle_namespace(&ns.prefix, &ns.name)?;
                    }
                    writer.start(&result.binding_names)?;
                    for solution in &result.solutions {
                        writer.handle_solution(solution)?;
                    }
                    writer.end()
                })?;
                let solutions = result.solutions.len();
                report(io, &format!("{solutions} result(s) ({} ms)", elapsed(started)))?;
                Ok(DispatchOutcome::Tuple { solutions })
            }
            OperationKind::BooleanQuery => {
                let format = self.selector.boolean_format(output)?;
                let answer = engine.evaluate_boolean(&op).map_err(|err| {
                    error!(error = %err, "query evaluation failed");
                    ConsoleError::from(err)
                })?;
                write_to(target, io, |out| {
                    self.selector.tuple_writer(format, out).handle_boolean(answer)
                })?;
                Ok(DispatchOutcome::Boolean(answer))
            }
            OperationKind::GraphQuery => {
                let format = self.selector.rdf_format(output)?;
                let result = engine.evaluate_graph(&op).map_err(|err| {
                    error!(error = %err, "query evaluation failed");
                    ConsoleError::from(err)
                })?;
                let namespaces = merge_namespaces(namespaces, &result.namespaces);
                write_to(target, io, |out| {
                    let mut writer = self.selector.rdf_writer(format, out);
                    for ns in &namespaces {
                        writer.handle_namespace(&ns.prefix, &ns.name)?;
                    }
                    writer.start()?;
                    for statement in &result.statements {
                        writer.handle_statement(statement)?;
                    }
                    writer.end()
                })?;
                let statements = result.statements.len();
                report(io, &format!("{statements} result(s) ({} ms)", elapsed(started)))?;
                Ok(DispatchOutcome::Graph { statements })
            }
            OperationKind::Update => {
                if output.is_some() {
                    return Err(ConsoleError::OutputNotSupported);
                }
                engine.execute_update(&op).map_err(|err| {
                    error!(error = %err, "failed to execute update");
                    ConsoleError::from(err)
                })?;
                report(io, &format!("Update executed in {} ms", elapsed(started)))?;
                Ok(DispatchOutcome::Update)
            }
        }
    }
}

fn write_to<F>(target: Option<&OutputTarget>, io: &mut dyn ConsoleIo, write: F) -> Result<()>
where
    F: FnOnce(&mut dyn Write) -> io::Result<()>,
{
    let Some(target) = target else {
        return write(io.output()).map_err(|e| ConsoleError::io("<console>", e));
    };
    let path = target.path.as_path();
    let file = target.open()?;
    let mut out = BufWriter::new(file);
    write(&mut out).map_err(|e| ConsoleError::io(path, e))?;
    out.flush().map_err(|e| ConsoleError::io(path, e))?;
    debug!(path = %path.display(), "results written");
    Ok(())
}

fn report(io: &mut dyn ConsoleIo, line: &str) -> Result<()> {
    io.writeln(line).map_err(|e| ConsoleError::io("<console>", e))
}

fn merge_namespaces(mut declared: Vec<Namespace>, reported: &[Namespace]) -> Vec<Namespace> {
    for ns in reported {
        if !declared.iter().any(|d| d.prefix == ns.prefix) {
            declared.push(ns.clone());
        }
    }
    declared
}

fn elapsed(started: Instant) -> u128 {
    started.elapsed().as_millis()
}
