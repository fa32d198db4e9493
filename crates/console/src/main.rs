use std::io;

use anyhow::Context;

use pharmastock_console::{Console, run};
use pharmastock_infra::{AppConfig, Database};

#[tokio::main(flavor = "current_thread")]
async fn main() -> anyhow::Result<()> {
    pharmastock_observability::init();

    let config = AppConfig::from_env().context("invalid configuration")?;

    let db = Database::connect(&config.database_url)
        .await
        .with_context(|| format!("failed to open store at {}", config.database_url))?;

    if config.bootstrap_schema {
        db.ensure_schema()
            .await
            .context("failed to create store schema")?;
    }

    tracing::info!("store ready; starting console");

    let mut console = Console::new(io::stdin().lock(), io::stdout().lock());
    let outcome = run(&db, &mut console).await;

    db.close().await;
    outcome.context("console I/O failed")
}
