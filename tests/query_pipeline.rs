#![allow(missing_docs)]

use std::cell::RefCell;
use std::fs;
use std::path::Path;
use std::rc::Rc;

use rdfsh::console::{CommandStatus, Console, ScriptedIo};
use rdfsh::model::{BindingSet, GraphResult, Namespace, Statement, Term, TupleResult};
use rdfsh::query::{
    AssembledQuery, DispatchOutcome, EngineError, OperationKind, OutputTarget, ParsedOperation,
    QueryDispatcher, QueryEngine, QueryLanguage, RepositoryConnection,
};
use rdfsh::settings::{SettingValue, Settings, WORK_DIR};
use rdfsh::writer::ResultWriterSelector;
use rdfsh::ConsoleError;
use tempfile::TempDir;

#[derive(Default)]
struct Log {
    parsed: Vec<String>,
    branches: Vec<&'static str>,
    namespace_calls: usize,
}

/// Engine that classifies every query as one fixed kind and records calls.
struct Recording {
    kind: OperationKind,
    namespaces: Result<Vec<Namespace>, EngineError>,
    evaluation: Option<EngineError>,
    log: Rc<RefCell<Log>>,
}

impl Recording {
    fn new(kind: OperationKind) -> (Self, Rc<RefCell<Log>>) {
        let log = Rc::new(RefCell::new(Log::default()));
        let engine = Self {
            kind,
            namespaces: Ok(Vec::new()),
            evaluation: None,
            log: Rc::clone(&log),
        };
        (engine, log)
    }

    fn branch(&self, name: &'static str) -> Result<(), EngineError> {
        self.log.borrow_mut().branches.push(name);
        match &self.evaluation {
            Some(err) => Err(err.clone()),
            None => Ok(()),
        }
    }
}

impl QueryEngine for Recording {
    fn parse(&self, language: QueryLanguage, text: &str) -> Result<ParsedOperation, EngineError> {
        self.log.borrow_mut().parsed.push(text.to_string());
        Ok(ParsedOperation::new(language, self.kind, text))
    }

    fn evaluate_tuple(&mut self, _: &ParsedOperation) -> Result<TupleResult, EngineError> {
        self.branch("tuple")?;
        let mut row = BindingSet::new();
        row.insert("s".into(), Term::iri("http://example.org/alice"));
        Ok(TupleResult {
            binding_names: vec!["s".into()],
            solutions: vec![row],
        })
    }

    fn evaluate_boolean(&mut self, _: &ParsedOperation) -> Result<bool, EngineError> {
        self.branch("boolean")?;
        Ok(true)
    }

    fn evaluate_graph(&mut self, _: &ParsedOperation) -> Result<GraphResult, EngineError> {
        self.branch("graph")?;
        Ok(GraphResult {
            namespaces: Vec::new(),
            statements: vec![Statement::new(
                Term::iri("http://example.org/alice"),
                Term::iri("http://example.org/knows"),
                Term::iri("http://example.org/bob"),
            )],
        })
    }

    fn execute_update(&mut self, _: &ParsedOperation) -> Result<(), EngineError> {
        self.branch("update")
    }
}

impl RepositoryConnection for Recording {
    fn namespaces(&self) -> Result<Vec<Namespace>, EngineError> {
        self.log.borrow_mut().namespace_calls += 1;
        self.namespaces.clone()
    }
}

fn settings_in(dir: &Path) -> Settings {
    Settings::new()
        .with(WORK_DIR, SettingValue::Path(dir.to_path_buf()))
        .expect("absolute workdir")
}

fn console_with(engine: Recording, dir: &Path, input: &[&str]) -> Console<ScriptedIo> {
    Console::new(ScriptedIo::new(input.iter().copied()), settings_in(dir))
        .with_repository(Box::new(engine))
}

const ALL_KINDS: [OperationKind; 4] = [
    OperationKind::TupleQuery,
    OperationKind::BooleanQuery,
    OperationKind::GraphQuery,
    OperationKind::Update,
];

#[test]
fn query_without_namespaces_reaches_engine_unchanged() {
    let dir = TempDir::new().expect("tempdir");
    let (engine, log) = Recording::new(OperationKind::TupleQuery);
    let mut console = console_with(engine, dir.path(), &[]);

    assert_eq!(console.execute("select * where { ?s ?a ?o }"), CommandStatus::Done);

    let log = log.borrow();
    assert_eq!(log.parsed, vec!["select * where { ?s ?a ?o }"]);
    assert_eq!(log.branches, vec!["tuple"]);
    assert_eq!(log.namespace_calls, 1);
    let output = console.io().output_text();
    assert!(output.starts_with("+--"), "{output}");
    assert!(output.contains("1 result(s)"));
}

#[test]
fn infile_and_outfile_write_sparql_xml() {
    let dir = TempDir::new().expect("tempdir");
    fs::write(dir.path().join("q.rq"), "select ?s where { ?s ?p ?o }\n").expect("query file");
    let (engine, log) = Recording::new(OperationKind::TupleQuery);
    let mut console = console_with(engine, dir.path(), &[]);

    let status = console.execute(r#"sparql INFILE="q.rq" OUTFILE="out.srx" this text is ignored"#);
    assert_eq!(status, CommandStatus::Done, "{:?}", console.io().errors);

    assert_eq!(log.borrow().parsed, vec!["select ?s where { ?s ?p ?o }"]);
    let written = fs::read_to_string(dir.path().join("out.srx")).expect("result file");
    assert!(written.starts_with("<?xml"));
    assert!(written.contains("<variable name='s'/>"));
    assert!(written.contains("<uri>http://example.org/alice</uri>"));
    assert!(!console.io().output_text().contains("| "));
}

#[test]
fn update_with_outfile_fails_before_file_exists() {
    let dir = TempDir::new().expect("tempdir");
    let (engine, log) = Recording::new(OperationKind::Update);
    let mut console = console_with(engine, dir.path(), &[]);

    let status = console.execute(r#"sparql OUTFILE="x.ttl" INSERT DATA { <urn:a> <urn:b> <urn:c> }"#);

    assert_eq!(status, CommandStatus::Failed);
    assert_eq!(console.io().errors, vec!["update query does not produce output"]);
    assert!(log.borrow().branches.is_empty());
    assert!(!dir.path().join("x.ttl").exists());
}

#[test]
fn dispatch_runs_exactly_one_branch_per_kind() {
    let dir = TempDir::new().expect("tempdir");
    let dispatcher = QueryDispatcher::new(ResultWriterSelector::new(80, true));
    let expected = ["tuple", "boolean", "graph", "update"];

    for (kind, branch) in ALL_KINDS.into_iter().zip(expected) {
        let (mut engine, log) = Recording::new(kind);
        let query = AssembledQuery {
            text: "q".into(),
            output: None,
        };
        let mut io = ScriptedIo::default();
        let outcome = dispatcher
            .dispatch(&mut engine, QueryLanguage::Sparql, &query, &mut io)
            .expect("dispatch");
        assert_eq!(log.borrow().branches, vec![branch], "{kind}");
        let matches_kind = match (kind, outcome) {
            (OperationKind::TupleQuery, DispatchOutcome::Tuple { solutions }) => solutions == 1,
            (OperationKind::BooleanQuery, DispatchOutcome::Boolean(answer)) => answer,
            (OperationKind::GraphQuery, DispatchOutcome::Graph { statements }) => statements == 1,
            (OperationKind::Update, DispatchOutcome::Update) => true,
            _ => false,
        };
        assert!(matches_kind, "{kind} produced {outcome:?}");
    }
    assert_eq!(fs::read_dir(dir.path()).expect("read dir").count(), 0);
}

#[test]
fn update_rejects_every_output_file() {
    let dir = TempDir::new().expect("tempdir");
    let dispatcher = QueryDispatcher::new(ResultWriterSelector::new(80, true));
    for name in ["u.srx", "u.ttl", "u.docx", "noextension"] {
        let (mut engine, log) = Recording::new(OperationKind::Update);
        let query = AssembledQuery {
            text: "clear all".into(),
            output: Some(OutputTarget::new(dir.path().join(name))),
        };
        let err = dispatcher
            .dispatch(&mut engine, QueryLanguage::Sparql, &query, &mut ScriptedIo::default())
            .unwrap_err();
        assert!(matches!(err, ConsoleError::OutputNotSupported), "{name}: {err}");
        assert!(log.borrow().branches.is_empty());
        assert!(!dir.path().join(name).exists());
    }
}

#[test]
fn repository_namespaces_are_injected_once() {
    let dir = TempDir::new().expect("tempdir");
    let (mut engine, log) = Recording::new(OperationKind::BooleanQuery);
    engine.namespaces = Ok(vec![Namespace::new("ex", "http://example.org/")]);
    let mut console = console_with(engine, dir.path(), &[]);

    console.execute("ask { ?s ex:knows ?o }");
    console.execute("PREFIX ex: <http://example.org/> ask { ?s ex:knows ?o }");

    let log = log.borrow();
    assert_eq!(
        log.parsed,
        vec![
            "PREFIX ex: <http://example.org/>\nask { ?s ex:knows ?o }",
            "PREFIX ex: <http://example.org/> ask { ?s ex:knows ?o }",
        ]
    );
    assert_eq!(log.namespace_calls, 1);
}

#[test]
fn serql_namespaces_are_appended() {
    let dir = TempDir::new().expect("tempdir");
    let (mut engine, log) = Recording::new(OperationKind::TupleQuery);
    engine.namespaces = Ok(vec![Namespace::new("ex", "http://example.org/")]);
    let mut console = console_with(engine, dir.path(), &[]);

    console.execute("serql select x from {x} ex:p {y}");

    assert_eq!(
        log.borrow().parsed,
        vec!["select x from {x} ex:p {y} USING NAMESPACE\n   ex = <http://example.org/>"]
    );
}

#[test]
fn namespace_failure_warns_and_runs_unprefixed() {
    let dir = TempDir::new().expect("tempdir");
    let (mut engine, log) = Recording::new(OperationKind::BooleanQuery);
    engine.namespaces = Err(EngineError::Repository("connection refused".into()));
    let mut console = console_with(engine, dir.path(), &[]);

    assert_eq!(console.execute("ask {}"), CommandStatus::Done);

    assert_eq!(log.borrow().parsed, vec!["ask {}"]);
    assert_eq!(
        console.io().warnings,
        vec!["Error connecting to repository: connection refused"]
    );
    assert!(console.io().errors.is_empty());
    assert_eq!(console.io().output_text(), "Answer: true\n");
}

#[test]
fn declined_overwrite_keeps_file_and_skips_engine() {
    let dir = TempDir::new().expect("tempdir");
    let target = dir.path().join("out.csv");
    fs::write(&target, "keep").expect("existing file");
    let (engine, log) = Recording::new(OperationKind::TupleQuery);
    let mut console = console_with(engine, dir.path(), &["n"]);

    let status = console.execute(r#"sparql OUTFILE="out.csv" select ?s {}"#);

    assert_eq!(status, CommandStatus::Failed);
    assert_eq!(fs::read_to_string(&target).expect("read"), "keep");
    assert!(log.borrow().parsed.is_empty());
    assert!(console.io().output_text().contains("exists, overwrite? (y/N)"));
}

#[test]
fn confirmed_overwrite_replaces_file() {
    let dir = TempDir::new().expect("tempdir");
    let target = dir.path().join("out.csv");
    fs::write(&target, "old contents that are longer than the result").expect("existing file");
    let (engine, _log) = Recording::new(OperationKind::TupleQuery);
    let mut console = console_with(engine, dir.path(), &["yes"]);

    assert_eq!(
        console.execute(r#"sparql OUTFILE="out.csv" select ?s {}"#),
        CommandStatus::Done
    );
    assert_eq!(
        fs::read_to_string(&target).expect("read"),
        "s\r\nhttp://example.org/alice\r\n"
    );
}

#[test]
fn interrupted_evaluation_is_reported_and_session_continues() {
    let dir = TempDir::new().expect("tempdir");
    let (mut engine, log) = Recording::new(OperationKind::GraphQuery);
    engine.evaluation = Some(EngineError::Interrupted("timeout after 30s".into()));
    let mut console = console_with(engine, dir.path(), &["construct {} where {}", "quit"]);

    console.execute(r#"sparql OUTFILE="g.nt" construct {} where {}"#);
    console.run().expect("session");

    assert_eq!(log.borrow().branches, vec!["graph", "graph"]);
    assert_eq!(
        console.io().errors,
        vec!["query interrupted: timeout after 30s"; 2]
    );
    assert!(!dir.path().join("g.nt").exists());
}

#[test]
fn oversized_input_file_is_rejected() {
    let dir = TempDir::new().expect("tempdir");
    fs::write(dir.path().join("big.rq"), vec![b' '; 1_000_000]).expect("big file");
    let (engine, log) = Recording::new(OperationKind::TupleQuery);
    let mut console = console_with(engine, dir.path(), &[]);

    assert_eq!(console.execute(r#"sparql INFILE="big.rq""#), CommandStatus::Failed);
    assert!(log.borrow().parsed.is_empty());
    assert!(console.io().errors[0].contains("files must be smaller than 1000000 bytes"));
}
