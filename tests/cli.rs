#![allow(missing_docs)]

use std::fs;
use std::path::PathBuf;

use assert_cmd::cargo::cargo_bin_cmd;
use assert_cmd::Command;
use serde_json::Value;
use tempfile::TempDir;

fn setup() -> (TempDir, PathBuf) {
    let dir = TempDir::new().expect("tempdir");
    let config = dir.path().join("console.toml");
    fs::write(
        &config,
        "[settings]\nwidth = 60\n\n[namespaces]\nex = \"http://example.org/\"\n",
    )
    .expect("write config");
    (dir, config)
}

fn rdfsh(dir: &TempDir, config: &PathBuf) -> Command {
    let mut cmd = cargo_bin_cmd!("rdfsh");
    cmd.env_remove("RUST_LOG")
        .env_remove("RDFSH_CONFIG")
        .arg("--plain")
        .arg("--config")
        .arg(config)
        .arg("--workdir")
        .arg(dir.path());
    cmd
}

#[test]
fn executes_boolean_query() {
    let (dir, config) = setup();
    let output = rdfsh(&dir, &config)
        .args(["-e", "sparql ask { ?s ?p ?o }"])
        .assert()
        .success()
        .get_output()
        .stdout
        .clone();
    assert_eq!(String::from_utf8_lossy(&output), "Answer: false\n");
}

#[test]
fn outfile_extension_selects_json() {
    let (dir, config) = setup();
    rdfsh(&dir, &config)
        .args(["-e", r#"sparql OUTFILE="people.srj" select ?s ?name { ?s ?p ?name }"#])
        .assert()
        .success();
    let written = fs::read(dir.path().join("people.srj")).expect("result file");
    let json: Value = serde_json::from_slice(&written).expect("valid json");
    assert_eq!(json["head"]["vars"], serde_json::json!(["s", "name"]));
    assert_eq!(json["results"]["bindings"], serde_json::json!([]));
}

#[test]
fn graph_file_declares_configured_namespaces() {
    let (dir, config) = setup();
    rdfsh(&dir, &config)
        .args(["-e", r#"sparql OUTFILE="g.ttl" construct { ?s ?p ?o } where { ?s ?p ?o }"#])
        .assert()
        .success();
    let written = fs::read_to_string(dir.path().join("g.ttl")).expect("turtle file");
    assert_eq!(written, "@prefix ex: <http://example.org/> .\n\n");
}

#[test]
fn update_with_outfile_fails_without_creating_file() {
    let (dir, config) = setup();
    let assert = rdfsh(&dir, &config)
        .args(["-e", r#"sparql OUTFILE="u.srx" INSERT DATA { <urn:a> <urn:b> <urn:c> }"#])
        .assert()
        .failure()
        .code(1);
    let stderr = String::from_utf8_lossy(&assert.get_output().stderr).into_owned();
    assert!(stderr.contains("update query does not produce output"), "{stderr}");
    assert!(!dir.path().join("u.srx").exists());
}

#[test]
fn infile_replaces_inline_text() {
    let (dir, config) = setup();
    fs::write(dir.path().join("q.rq"), "ask { ?s ?p ?o }\n").expect("query file");
    let output = rdfsh(&dir, &config)
        .args(["-e", r#"sparql INFILE="q.rq" select ?ignored {}"#])
        .assert()
        .success()
        .get_output()
        .stdout
        .clone();
    assert_eq!(String::from_utf8_lossy(&output), "Answer: false\n");
}

#[test]
fn unknown_command_fails() {
    let (dir, config) = setup();
    let assert = rdfsh(&dir, &config)
        .args(["-e", "frobnicate"])
        .assert()
        .failure();
    let stderr = String::from_utf8_lossy(&assert.get_output().stderr).into_owned();
    assert!(stderr.contains("unknown command 'frobnicate'"), "{stderr}");
}

#[test]
fn interactive_session_reads_stdin() {
    let (dir, config) = setup();
    let output = rdfsh(&dir, &config)
        .write_stdin("set width\nsparql\nask {}\n.\nquit\nsparql ask {}\n")
        .assert()
        .success()
        .get_output()
        .stdout
        .clone();
    let stdout = String::from_utf8_lossy(&output);
    assert!(stdout.starts_with("rdfsh> width: 60\n"), "{stdout}");
    assert!(stdout.contains("enter multi-line SPARQL query"));
    assert_eq!(stdout.matches("Answer: false").count(), 1);
}

#[test]
fn invalid_log_filter_is_rejected() {
    let (dir, config) = setup();
    rdfsh(&dir, &config)
        .args(["--log-level", "rdfsh=notalevel", "-e", "help"])
        .assert()
        .failure();
}
