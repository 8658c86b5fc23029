use std::time::Duration;

use tracing::info;

use crate::database::{PostgresConnection, MIGRATOR};

pub struct MigrationOpts {
    pub database_url: String,
}

pub async fn run_migrations(opts: MigrationOpts) -> anyhow::Result<()> {
    let db = PostgresConnection::connect(&opts.database_url, 1, Duration::from_secs(30)).await?;

    info!("Running database migrations.");
    MIGRATOR.run(&*db).await?;
    info!("Database migrations complete.");

    db.close().await;

    Ok(())
}
