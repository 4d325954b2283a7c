//! End-to-end study pipeline tests: CLI in mock mode, and the library API
//! sharing one log with a running reminder loop.

use std::io::Write;
use std::process::{Command, Stdio};
use std::sync::Arc;
use std::time::Duration;

use mom_agent::core::schedule::default_reminders;
use mom_agent::core::types::StepKind;
use mom_agent::exit_codes;
use mom_agent::io::init::{InitOptions, init_agent};
use mom_agent::io::interaction_log::read_recent;
use mom_agent::io::model::Backend;
use mom_agent::reminders::{ReminderDispatcher, ReminderLoop};
use mom_agent::study::StudySession;
use mom_agent::test_support::{RecordingNotifier, ScriptedModel, TestProject};
use serde_json::Value;

#[test]
fn study_cli_prints_notes_and_quiz_in_mock_mode() {
    let temp = tempfile::tempdir().expect("tempdir");
    let paths = init_agent(temp.path(), &InitOptions { force: false }).expect("init");

    let output = Command::new(env!("CARGO_BIN_EXE_mom-agent"))
        .arg("--project-dir")
        .arg(temp.path())
        .args(["study", "First law of thermodynamics"])
        .output()
        .expect("run study");
    assert_eq!(output.status.code(), Some(exit_codes::OK));

    let stdout = String::from_utf8_lossy(&output.stdout);
    assert!(stdout.contains("1. Summarize: Create short notes (mocked)."));
    assert!(stdout.contains("== Summarize (notes) =="));
    assert!(stdout.contains("== Create Quiz (quiz) =="));
    assert!(stdout.contains("Q5:"));

    let entries = read_recent(&paths.log_path, 10).expect("read");
    let roles: Vec<&str> = entries.iter().filter_map(|e| e["role"].as_str()).collect();
    assert_eq!(roles, vec!["planner", "executor", "executor"]);

    let logs = Command::new(env!("CARGO_BIN_EXE_mom-agent"))
        .arg("--project-dir")
        .arg(temp.path())
        .args(["logs", "--limit", "2"])
        .output()
        .expect("run logs");
    let lines: Vec<Value> = String::from_utf8_lossy(&logs.stdout)
        .lines()
        .map(|line| serde_json::from_str(line).expect("json line"))
        .collect();
    assert_eq!(lines.len(), 2);
    assert!(lines.iter().all(|e| e["role"] == "executor"));
}

#[test]
fn study_cli_reads_stdin_and_rejects_blank_text() {
    let temp = tempfile::tempdir().expect("tempdir");
    let paths = init_agent(temp.path(), &InitOptions { force: false }).expect("init");

    let mut child = Command::new(env!("CARGO_BIN_EXE_mom-agent"))
        .arg("--project-dir")
        .arg(temp.path())
        .args(["study", "-"])
        .stdin(Stdio::piped())
        .stdout(Stdio::piped())
        .stderr(Stdio::piped())
        .spawn()
        .expect("spawn study");
    child
        .stdin
        .take()
        .expect("stdin")
        .write_all(b"  \n\t")
        .expect("write stdin");
    let output = child.wait_with_output().expect("wait");

    assert_eq!(output.status.code(), Some(exit_codes::FAILURE));
    assert!(String::from_utf8_lossy(&output.stderr).contains("paste some text"));
    assert!(!paths.log_path.exists());
}

#[tokio::test]
async fn pipeline_and_reminder_loop_share_the_log() {
    let project = TestProject::new().expect("project");
    let dispatcher = Arc::new(ReminderDispatcher::new(
        &project.config,
        RecordingNotifier::new(),
        project.log(),
    ));
    let reminder_loop = ReminderLoop::spawn_with_clock(
        dispatcher,
        default_reminders().into(),
        Duration::from_millis(5),
        Arc::new(|| "13:00".to_string()),
    );

    let model = ScriptedModel::new([
        r#"```json
[{"id":1,"name":"Take notes","desc":"bullets"},{"id":2,"name":"Practice questions","desc":"five"}]
```"#,
        "- U = Q - W",
        "Q1: What is conserved?",
    ]);
    let session =
        StudySession::new(&project.config, Backend::Live(model), project.log()).expect("session");
    let result = session.run("First law").await.expect("run");
    let stats = reminder_loop.stop().await.expect("stop");

    assert_eq!(result.outputs[0].result.kind, StepKind::Notes);
    assert_eq!(result.outputs[1].result.kind, StepKind::Quiz);

    let lines = project.log_lines().expect("lines");
    let entries: Vec<Value> = lines
        .iter()
        .map(|line| serde_json::from_str(line).expect("every line is whole json"))
        .collect();
    let reminder_entries = entries
        .iter()
        .filter(|e| e["role"] == "reminder_system")
        .count() as u64;
    assert_eq!(reminder_entries, stats.ticks);
    assert_eq!(entries.len() as u64, stats.ticks + 3);
    assert!(
        entries
            .iter()
            .filter(|e| e["role"] == "reminder_system")
            .all(|e| e["fired"][0]["name"] == "Lunch")
    );
}
