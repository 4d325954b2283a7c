//! CLI tests for `mom-agent remind` and the credential exit code.
//!
//! Spawns the binary against a temp project configured with the log notifier
//! so no desktop notification daemon is needed.

use std::process::{Command, Output};

use mom_agent::exit_codes;
use mom_agent::io::config::{Mode, NotifierKind, load_config, write_config};
use mom_agent::io::init::{AgentPaths, InitOptions, init_agent};
use mom_agent::io::interaction_log::read_recent;

fn headless_project() -> (tempfile::TempDir, AgentPaths) {
    let temp = tempfile::tempdir().expect("tempdir");
    let paths = init_agent(temp.path(), &InitOptions { force: false }).expect("init");
    let mut config = load_config(&paths.config_path).expect("load");
    config.reminders.notifier = NotifierKind::Log;
    write_config(&paths.config_path, &config).expect("write");
    (temp, paths)
}

fn mom(paths: &AgentPaths, args: &[&str]) -> Output {
    Command::new(env!("CARGO_BIN_EXE_mom-agent"))
        .arg("--project-dir")
        .arg(&paths.root)
        .args(args)
        .output()
        .expect("run mom-agent")
}

#[test]
fn remind_check_at_breakfast_fires_meal_and_water() {
    let (_temp, paths) = headless_project();

    let output = mom(&paths, &["remind", "check", "--at", "09:00"]);
    assert_eq!(output.status.code(), Some(exit_codes::OK));
    let stdout = String::from_utf8_lossy(&output.stdout);
    assert!(stdout.contains("Breakfast: Breakfast time! Fuel up, baby."));
    assert!(stdout.contains("Drink Water"));

    let entries = read_recent(&paths.log_path, 10).expect("read");
    assert_eq!(entries.len(), 1);
    assert_eq!(entries[0]["role"], "reminder_system");
    let names: Vec<&str> = entries[0]["fired"]
        .as_array()
        .expect("fired array")
        .iter()
        .filter_map(|r| r["name"].as_str())
        .collect();
    assert_eq!(names, vec!["Breakfast", "Drink Water"]);
}

#[test]
fn remind_check_between_meals_fires_only_recurring() {
    let (_temp, paths) = headless_project();

    let output = mom(&paths, &["remind", "check", "--at", "10:30"]);
    assert_eq!(output.status.code(), Some(exit_codes::OK));

    let entries = read_recent(&paths.log_path, 10).expect("read");
    assert_eq!(entries[0]["fired"].as_array().map(Vec::len), Some(1));
    assert_eq!(entries[0]["fired"][0]["time"], "every_2h");
}

#[test]
fn remind_list_prints_table_without_logging() {
    let (_temp, paths) = headless_project();

    let output = mom(&paths, &["remind", "list"]);
    assert_eq!(output.status.code(), Some(exit_codes::OK));
    let stdout = String::from_utf8_lossy(&output.stdout);
    assert_eq!(stdout.lines().count(), 4);
    assert!(stdout.contains("20:00"));
    assert!(!paths.log_path.exists());
}

#[test]
fn live_mode_without_key_exits_with_credential_code() {
    let (_temp, paths) = headless_project();
    let mut config = load_config(&paths.config_path).expect("load");
    config.mode = Mode::Live;
    config.model.api_key_env = "MOM_AGENT_TEST_UNSET_KEY".to_string();
    write_config(&paths.config_path, &config).expect("write");

    let output = Command::new(env!("CARGO_BIN_EXE_mom-agent"))
        .env_remove("MOM_AGENT_TEST_UNSET_KEY")
        .arg("--project-dir")
        .arg(&paths.root)
        .args(["plan", "learn entropy"])
        .output()
        .expect("run mom-agent");

    assert_eq!(output.status.code(), Some(exit_codes::MISSING_CREDENTIAL));
    assert!(String::from_utf8_lossy(&output.stderr).contains("MOM_AGENT_TEST_UNSET_KEY"));
    assert!(!paths.log_path.exists());
}

#[test]
fn second_init_without_force_fails() {
    let (_temp, paths) = headless_project();

    let output = mom(&paths, &["init"]);
    assert_eq!(output.status.code(), Some(exit_codes::FAILURE));
    assert!(String::from_utf8_lossy(&output.stderr).contains("already exists"));

    let output = mom(&paths, &["init", "--force"]);
    assert_eq!(output.status.code(), Some(exit_codes::OK));
}
