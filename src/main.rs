//! PixBank - Banking Backend
//!
//! Startup sequence: load config, init logging, connect PostgreSQL,
//! apply the schema, build shared state, serve the gateway.

use std::sync::Arc;

use anyhow::Context;

use pixbank::config::AppConfig;
use pixbank::gateway::{self, state::AppState};
use pixbank::logging::init_logging;
use pixbank::store::{postgres, schema};

fn get_env() -> String {
    let args: Vec<String> = std::env::args().collect();
    for i in 0..args.len() {
        if (args[i] == "--env" || args[i] == "-e") && i + 1 < args.len() {
            return args[i + 1].clone();
        }
    }
    "dev".to_string()
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    let env = get_env();
    let config = AppConfig::load(&env);

    let _guard = init_logging(&config);
    tracing::info!(env = %env, "PixBank starting");

    let pool = postgres::connect(&config.database_url)
        .await
        .context("Failed to connect to PostgreSQL")?;
    schema::init_schema(&pool).await?;

    let state = Arc::new(AppState::new(pool, &config));

    gateway::run_server(state, &config.gateway.host, config.gateway.port).await
}
