//! Mom Agent command line.
//!
//! Project state lives under `<project>/.mom/`: `config.toml` and the
//! `logs.jsonl` interaction log shared with the web UI.

use std::path::{Path, PathBuf};
use std::sync::Arc;
use std::time::Duration;

use anyhow::{Context, Result, bail};
use clap::{Parser, Subcommand};
use tracing::info;

use mom_agent::core::schedule::default_reminders;
use mom_agent::core::types::Reminder;
use mom_agent::exit_codes;
use mom_agent::io::config::{AgentConfig, load_config};
use mom_agent::io::init::{AgentPaths, InitOptions, init_agent};
use mom_agent::io::input::{read_stdin, read_text_file};
use mom_agent::io::interaction_log::InteractionLog;
use mom_agent::io::model::{Backend, MissingCredentialError, OpenAiChat};
use mom_agent::io::notifier::{Notifier, notifier_from_config};
use mom_agent::logging;
use mom_agent::reminders::{ReminderDispatcher, ReminderLoop, local_clock};
use mom_agent::study::{StudyResult, StudySession};

#[derive(Parser)]
#[command(
    name = "mom-agent",
    version,
    about = "Study notes, quizzes and gentle meal reminders"
)]
struct Cli {
    /// Project directory holding `.mom/`.
    #[arg(long, global = true, default_value = ".")]
    project_dir: PathBuf,
    #[command(subcommand)]
    command: Command,
}

#[derive(Subcommand)]
enum Command {
    /// Create `.mom/config.toml` and `.mom/.gitignore`.
    Init {
        /// Overwrite an existing config.
        #[arg(short, long)]
        force: bool,
    },
    /// Plan notes and a quiz for the given text, then run every step.
    Study {
        /// Source text, or `-` to read stdin.
        #[arg(required_unless_present = "file", conflicts_with = "file")]
        text: Option<String>,
        /// Read the source text from a file.
        #[arg(long)]
        file: Option<PathBuf>,
    },
    /// Print the plan for a task without executing it.
    Plan { task: String },
    /// Reminder table commands.
    Remind {
        #[command(subcommand)]
        command: RemindCommand,
    },
    /// Print the most recent interaction log entries, oldest first.
    Logs {
        #[arg(long, default_value_t = 30)]
        limit: usize,
    },
}

#[derive(Subcommand)]
enum RemindCommand {
    /// Print the reminder table.
    List,
    /// Evaluate reminders once and deliver the due ones.
    Check {
        /// Time to evaluate instead of the local clock (`HH:MM`).
        #[arg(long)]
        at: Option<String>,
    },
    /// Poll reminders until Ctrl-C.
    Watch,
}

#[tokio::main]
async fn main() {
    logging::init("warn");
    let code = match run(Cli::parse()).await {
        Ok(()) => exit_codes::OK,
        Err(err) => {
            eprintln!("{err:#}");
            exit_code_for(&err)
        }
    };
    std::process::exit(code);
}

fn exit_code_for(err: &anyhow::Error) -> i32 {
    if err.downcast_ref::<MissingCredentialError>().is_some() {
        exit_codes::MISSING_CREDENTIAL
    } else {
        exit_codes::FAILURE
    }
}

async fn run(cli: Cli) -> Result<()> {
    let paths = AgentPaths::new(&cli.project_dir);
    match cli.command {
        Command::Init { force } => cmd_init(&cli.project_dir, force),
        Command::Study { text, file } => cmd_study(&paths, text, file).await,
        Command::Plan { task } => cmd_plan(&paths, &task).await,
        Command::Remind { command } => match command {
            RemindCommand::List => cmd_remind_list(),
            RemindCommand::Check { at } => cmd_remind_check(&paths, at).await,
            RemindCommand::Watch => cmd_remind_watch(&paths).await,
        },
        Command::Logs { limit } => cmd_logs(&paths, limit),
    }
}

fn cmd_init(root: &Path, force: bool) -> Result<()> {
    let paths = init_agent(root, &InitOptions { force })?;
    println!("initialized {}", paths.state_dir.display());
    Ok(())
}

fn session(paths: &AgentPaths, config: &AgentConfig) -> Result<StudySession<OpenAiChat>> {
    let backend = Backend::from_config(config)?;
    StudySession::new(config, backend, InteractionLog::new(&paths.log_path))
}

async fn cmd_study(paths: &AgentPaths, text: Option<String>, file: Option<PathBuf>) -> Result<()> {
    let source = match (text, file) {
        (_, Some(path)) => read_text_file(&path)?,
        (Some(text), None) if text == "-" => read_stdin()?,
        (Some(text), None) => text,
        (None, None) => bail!("provide text, `-`, or --file"),
    };
    let config = load_config(&paths.config_path)?;
    let result = session(paths, &config)?.run(&source).await?;
    print_study(&result);
    Ok(())
}

fn print_study(result: &StudyResult) {
    println!("Plan:");
    for step in &result.plan {
        println!("  {}. {}: {}", step.id, step.name, step.desc);
    }
    for output in &result.outputs {
        println!();
        println!(
            "== {} ({}) ==",
            output.step.name,
            output.result.kind.as_str()
        );
        println!("{}", output.result.content);
    }
}

async fn cmd_plan(paths: &AgentPaths, task: &str) -> Result<()> {
    let config = load_config(&paths.config_path)?;
    let plan = session(paths, &config)?.plan(task).await?;
    let payload = serde_json::to_string_pretty(&plan).context("serialize plan")?;
    println!("{payload}");
    Ok(())
}

fn cmd_remind_list() -> Result<()> {
    for reminder in default_reminders() {
        println!(
            "{:<9} {:<12} {}",
            reminder.time, reminder.name, reminder.message
        );
    }
    Ok(())
}

fn dispatcher(
    paths: &AgentPaths,
    config: &AgentConfig,
) -> ReminderDispatcher<Box<dyn Notifier>> {
    ReminderDispatcher::new(
        config,
        notifier_from_config(config),
        InteractionLog::new(&paths.log_path),
    )
}

async fn cmd_remind_check(paths: &AgentPaths, at: Option<String>) -> Result<()> {
    let config = load_config(&paths.config_path)?;
    let now = at.unwrap_or_else(local_clock);
    let dispatcher = dispatcher(paths, &config);
    let reminders = default_reminders();
    let fired =
        tokio::task::spawn_blocking(move || dispatcher.check_now(&reminders, &now)).await??;
    print_fired(&fired);
    Ok(())
}

fn print_fired(fired: &[Reminder]) {
    if fired.is_empty() {
        println!("no reminders due");
    }
    for reminder in fired {
        println!("{}: {}", reminder.name, reminder.message);
    }
}

async fn cmd_remind_watch(paths: &AgentPaths) -> Result<()> {
    let config = load_config(&paths.config_path)?;
    let reminder_loop = ReminderLoop::spawn(
        Arc::new(dispatcher(paths, &config)),
        default_reminders().into(),
        Duration::from_secs(config.reminders.interval_secs),
    );
    println!(
        "watching reminders every {}s, Ctrl-C to stop",
        config.reminders.interval_secs
    );

    tokio::signal::ctrl_c()
        .await
        .context("install Ctrl-C handler")?;
    let stats = reminder_loop.stop().await?;
    info!(ticks = stats.ticks, failures = stats.failures, "watch stopped");
    println!("stopped after {} ticks ({} failed)", stats.ticks, stats.failures);
    Ok(())
}

fn cmd_logs(paths: &AgentPaths, limit: usize) -> Result<()> {
    let entries = InteractionLog::new(&paths.log_path).read_recent(limit)?;
    for entry in entries {
        println!("{entry}");
    }
    Ok(())
}
