//! Mom Agent UI server: study form, reminder list and live log view.

mod routes;
mod sse;
mod state;

use std::net::SocketAddr;
use std::path::PathBuf;
use std::time::Duration;

use anyhow::Context;
use axum::Router;
use axum::routing::get;
use clap::Parser;
use tower_http::cors::{Any, CorsLayer};
use tracing::{info, warn};

use mom_agent::io::config::load_config;
use mom_agent::io::init::AgentPaths;
use mom_agent::io::model::Backend;
use mom_agent::reminders::ReminderLoop;

use crate::state::AppState;

#[derive(Parser)]
#[command(name = "mom-agent-ui")]
#[command(about = "Web UI for studying with Mom Agent and watching reminders")]
struct Args {
    /// Address to bind the server to
    #[arg(long, default_value = "127.0.0.1")]
    bind: String,

    /// Port to listen on
    #[arg(long, default_value = "3001")]
    port: u16,

    /// Project directory (contains .mom/)
    #[arg(long, default_value = ".")]
    project_dir: PathBuf,
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    tracing_subscriber::fmt()
        .with_env_filter(
            tracing_subscriber::EnvFilter::from_default_env()
                .add_directive("mom_agent_ui=info".parse()?),
        )
        .init();

    let args = Args::parse();

    let project_dir = args.project_dir.canonicalize().unwrap_or(args.project_dir);
    info!(project_dir = %project_dir.display(), "starting mom-agent-ui");

    let paths = AgentPaths::new(&project_dir);
    let config = load_config(&paths.config_path)?;
    let backend = Backend::from_config(&config)?;
    let state = AppState::new(paths, &config, backend)?;

    let shutdown = state.shutdown.clone();
    sse::start_log_watcher(state.clone());
    let reminder_loop = ReminderLoop::spawn(
        state.dispatcher.clone(),
        state.reminders.clone(),
        Duration::from_secs(config.reminders.interval_secs),
    );

    let cors = CorsLayer::new()
        .allow_origin(Any)
        .allow_methods(Any)
        .allow_headers(Any);

    let app = Router::new()
        .route("/", get(routes::index))
        .nest("/api", routes::api_router())
        .route("/events", get(sse::events_handler))
        .layer(cors)
        .with_state(state);

    let addr: SocketAddr = format!("{}:{}", args.bind, args.port)
        .parse()
        .with_context(|| format!("invalid bind address {}:{}", args.bind, args.port))?;
    info!(addr = %addr, "listening");

    let listener = tokio::net::TcpListener::bind(addr).await?;
    axum::serve(listener, app)
        .with_graceful_shutdown(async move {
            if let Err(e) = tokio::signal::ctrl_c().await {
                warn!(error = %e, "failed to listen for Ctrl-C");
            }
            info!("shutting down");
            shutdown.cancel();
        })
        .await?;

    let stats = reminder_loop.stop().await?;
    info!(
        ticks = stats.ticks,
        failures = stats.failures,
        "reminder loop finished"
    );
    Ok(())
}
