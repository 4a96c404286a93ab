use crate::domain::numeric::now_ms;
use crate::domain::ports::{EpochRepository, ErrorLog};
use crate::domain::types::{EpochConfig, EpochRecord, PredictionModelConfig};
use crate::infrastructure::persistence::database::Database;
use anyhow::{Context, Result};
use async_trait::async_trait;
use tracing::warn;

/// Postgres-backed epoch source. The epoch's windowing and model
/// configuration live in JSONB columns, written by the epoch install tool.
pub struct PgEpochRepository {
    database: Database,
}

impl PgEpochRepository {
    pub fn new(database: Database) -> Self {
        Self { database }
    }
}

#[async_trait]
impl EpochRepository for PgEpochRepository {
    async fn get_active_epoch(&self) -> Result<Option<EpochRecord>> {
        let table = self.database.table("epochs");
        let rows = sqlx::query_as::<_, (String, serde_json::Value, serde_json::Value, Option<i64>)>(
            &format!("SELECT id, config, model, uninstalled FROM {table} WHERE uninstalled IS NULL"),
        )
        .fetch_all(&self.database.pool)
        .await
        .context("Failed to query the active epoch")?;

        // Anything other than exactly one active row means no usable epoch.
        if rows.len() != 1 {
            return Ok(None);
        }
        let Some((id, config, model, uninstalled)) = rows.into_iter().next() else {
            return Ok(None);
        };

        Ok(Some(EpochRecord {
            id,
            config: serde_json::from_value::<EpochConfig>(config)
                .context("Malformed epoch config column")?,
            model: serde_json::from_value::<PredictionModelConfig>(model)
                .context("Malformed epoch model column")?,
            uninstalled,
        }))
    }
}

/// Postgres-backed API error sink. Logging is best-effort: a failed insert
/// is printed as a diagnostic and otherwise ignored.
pub struct PgErrorLog {
    database: Database,
}

impl PgErrorLog {
    pub fn new(database: Database) -> Self {
        Self { database }
    }
}

#[async_trait]
impl ErrorLog for PgErrorLog {
    async fn log(&self, origin: &str, error: &str, params: Option<serde_json::Value>) {
        let table = self.database.table("api_errors");
        let result = sqlx::query(&format!(
            "INSERT INTO {table}(o, e, c, uid, ip, p) VALUES ($1, $2, $3, $4, $5, $6)"
        ))
        .bind(origin)
        .bind(error)
        .bind(now_ms())
        .bind(Option::<String>::None)
        .bind(Option::<String>::None)
        .bind(params)
        .execute(&self.database.pool)
        .await;

        if let Err(e) = result {
            warn!("API Error was not logged: {e}");
        }
    }
}
