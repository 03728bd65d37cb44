//! Task Tracker
//!
//! Web server exposing a JSON task API and server-rendered task pages.

use anyhow::{Context, Result};
use clap::Parser;
use std::sync::Arc;
use task_tracker::cli::{Cli, Command};
use task_tracker::config::Config;
use task_tracker::db::Database;
use task_tracker::logging::{self, LogTarget};
use task_tracker::server;
use task_tracker::service::TaskService;
use tracing::info;

#[tokio::main]
async fn main() -> Result<()> {
    let cli = Cli::parse();

    logging::init(&LogTarget::parse(&cli.log), cli.verbose)?;

    // Variables already set in the environment win over .env
    dotenvy::dotenv().ok();

    let mut config = Config::load_with_env(cli.config.as_deref())?;

    // CLI flags win over file and environment
    if let Some(db_path) = &cli.database {
        config.server.db_path = db_path.clone();
    }
    if let Some(host) = cli.host {
        config.server.host = host;
    }
    if let Some(port) = cli.port {
        config.server.port = port;
    }

    match cli.command.unwrap_or(Command::Serve) {
        Command::Serve => serve(config).await,
    }
}

async fn serve(config: Config) -> Result<()> {
    config.ensure_db_dir()?;
    let db = Database::open(&config.server.db_path).with_context(|| {
        format!(
            "failed to open database {}",
            config.server.db_path.display()
        )
    })?;
    info!(path = %config.server.db_path.display(), "Database ready");

    let service = TaskService::new(Arc::new(db));
    let (shutdown_tx, _addr, handle) =
        server::start_server(service, config.server.socket_addr()).await?;

    tokio::signal::ctrl_c().await?;
    info!("Received Ctrl-C");
    let _ = shutdown_tx.send(());
    handle.await?;

    Ok(())
}
