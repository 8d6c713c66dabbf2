use std::time::Instant;

use anyhow::Context;
use serde_json::json;

use crate::cli::utils::output_success;
use crate::cli::OutputFormat;
use crate::config;
use crate::database::DatabaseManager;

pub async fn handle(output_format: OutputFormat) -> anyhow::Result<()> {
    let config = config::config();
    let started = Instant::now();

    let pool = DatabaseManager::connect(&config.database)
        .await
        .context("connecting to database")?;
    DatabaseManager::health_check(&pool)
        .await
        .context("database health check")?;

    let elapsed_ms = started.elapsed().as_millis() as u64;
    output_success(
        output_format,
        &format!("Database reachable in {} ms", elapsed_ms),
        Some(json!({ "database": "ok", "elapsed_ms": elapsed_ms })),
    )
}
