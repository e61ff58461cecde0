use std::path::PathBuf;
use std::sync::Arc;

use anyhow::{anyhow, Context};
use log::info;
use skillassign_core::db::open_db;
use skillassign_core::{init_logging_from_config, load_config};
use skillassign_server::{build_router, AppState};

const CONFIG_ENV: &str = "SKILLASSIGN_CONFIG";

fn config_path() -> Option<PathBuf> {
    std::env::args_os()
        .nth(1)
        .map(PathBuf::from)
        .or_else(|| std::env::var_os(CONFIG_ENV).map(PathBuf::from))
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    let config = load_config(config_path().as_deref()).context("loading config")?;
    init_logging_from_config(&config.logging).map_err(|err| anyhow!(err))?;

    // Apply migrations once up front so a bad database fails startup.
    open_db(&config.server.db_path)
        .with_context(|| format!("opening database {}", config.server.db_path.display()))?;

    let bind = config.server.bind.clone();
    let app = build_router(Arc::new(AppState::new(config)));
    let listener = tokio::net::TcpListener::bind(&bind)
        .await
        .with_context(|| format!("binding {bind}"))?;
    info!("event=server_start module=server status=ok bind={bind}");

    axum::serve(listener, app)
        .with_graceful_shutdown(async {
            let _ = tokio::signal::ctrl_c().await;
        })
        .await
        .context("serving http")?;
    info!("event=server_stop module=server status=ok");
    Ok(())
}
