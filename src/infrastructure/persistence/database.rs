use anyhow::{Context, Result};
use sqlx::postgres::{PgPool, PgPoolOptions};
use tracing::info;

/// Singleton database wrapper around the Postgres pool.
#[derive(Clone)]
pub struct Database {
    pub pool: PgPool,
    test_mode: bool,
}

impl Database {
    pub async fn new(db_url: &str, test_mode: bool) -> Result<Self> {
        let pool = PgPoolOptions::new()
            .max_connections(5)
            .connect(db_url)
            .await
            .context("Failed to connect to the Postgres database")?;

        info!("Connected to database (test_mode: {test_mode})");

        let db = Self { pool, test_mode };
        db.init().await?;

        Ok(db)
    }

    /// Table name resolver. Test mode prefixes every table with `test_` so
    /// test runs never touch production rows.
    pub fn table(&self, name: &str) -> String {
        if self.test_mode { format!("test_{name}") } else { name.to_string() }
    }

    /// Initialize the database schema.
    async fn init(&self) -> Result<()> {
        let epochs = self.table("epochs");
        sqlx::query(&format!(
            r#"
            CREATE TABLE IF NOT EXISTS {epochs} (
                id TEXT PRIMARY KEY,
                config JSONB NOT NULL,
                model JSONB NOT NULL,
                uninstalled BIGINT
            );
            "#
        ))
        .execute(&self.pool)
        .await
        .context("Failed to create epochs table")?;

        let api_errors = self.table("api_errors");
        sqlx::query(&format!(
            r#"
            CREATE TABLE IF NOT EXISTS {api_errors} (
                id BIGSERIAL PRIMARY KEY,
                o TEXT NOT NULL,
                e TEXT NOT NULL,
                c BIGINT NOT NULL,
                uid TEXT,
                ip TEXT,
                p JSONB
            );
            "#
        ))
        .execute(&self.pool)
        .await
        .context("Failed to create api_errors table")?;

        Ok(())
    }
}
