use std::{ops::Deref, time::Duration};

use sqlx::{migrate::Migrator, postgres::PgPoolOptions, PgPool};

/// Migrations embedded from the `migrations` directory at build time.
pub static MIGRATOR: Migrator = sqlx::migrate!("./migrations");

const FOREIGN_KEY_VIOLATION: &str = "23503";
const UNIQUE_VIOLATION: &str = "23505";

#[derive(Clone)]
pub struct PostgresConnection(PgPool);

impl PostgresConnection {
    pub fn new(pool: PgPool) -> Self {
        Self(pool)
    }

    /// Open a bounded connection pool.
    ///
    /// # Arguments
    /// * `database_url` - Connection string for the database.
    /// * `pool_size` - The maximum number of open connections.
    /// * `timeout` - How long to wait for a free connection before failing.
    pub async fn connect(
        database_url: &str,
        pool_size: u32,
        timeout: Duration,
    ) -> Result<Self, sqlx::Error> {
        let pool = PgPoolOptions::new()
            .max_connections(pool_size)
            .acquire_timeout(timeout)
            .connect(database_url)
            .await?;

        Ok(Self(pool))
    }
}

impl Deref for PostgresConnection {
    type Target = PgPool;

    fn deref(&self) -> &Self::Target {
        &self.0
    }
}

fn has_code(error: &sqlx::Error, code: &str) -> bool {
    match error {
        sqlx::Error::Database(db_error) => db_error.code().as_deref() == Some(code),
        _ => false,
    }
}

pub fn is_foreign_key_violation(error: &sqlx::Error) -> bool {
    has_code(error, FOREIGN_KEY_VIOLATION)
}

pub fn is_unique_violation(error: &sqlx::Error) -> bool {
    has_code(error, UNIQUE_VIOLATION)
}
