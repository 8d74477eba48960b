use anyhow::Context;

use codebank_api::bootstrap::{self, PostgresKafka};
use codebank_api::server::shutdown_signal;

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    codebank_observability::init();

    let env_file = bootstrap::default_env_file();

    let report = bootstrap::run(&env_file, &PostgresKafka, shutdown_signal())
        .await
        .inspect_err(|e| tracing::error!(stage = ?e.stage(), error = %e, "fatal startup error"))
        .with_context(|| format!("codebank stopped (config: {})", env_file.display()))?;

    tracing::info!(stages = ?report.stages, "codebank exited cleanly");
    Ok(())
}
