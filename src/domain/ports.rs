use crate::domain::errors::PredictionError;
use crate::domain::types::EpochRecord;
use anyhow::Result;
use async_trait::async_trait;

/// Source of epoch records.
#[async_trait]
pub trait EpochRepository: Send + Sync {
    /// Returns the active epoch record. Anything other than exactly one
    /// active row resolves to `None`.
    async fn get_active_epoch(&self) -> Result<Option<EpochRecord>>;
}

/// Best-effort error sink. Implementations must never fail the caller; a
/// logging failure is only printed as a diagnostic.
#[async_trait]
pub trait ErrorLog: Send + Sync {
    async fn log(&self, origin: &str, error: &str, params: Option<serde_json::Value>);
}

/// One loaded forecasting artifact. Handles are owned by the prediction
/// model that loaded them and are never shared across epochs.
pub trait RegressionHandle: Send + Sync {
    fn id(&self) -> &str;
    fn description(&self) -> &str;
    fn lookback(&self) -> usize;
    fn predictions(&self) -> usize;

    /// Runs the trained model over a normalized input window and returns the
    /// ordered multi-step forecast.
    fn forecast(&self, window: &[f64]) -> Result<Vec<f64>, PredictionError>;
}

impl std::fmt::Debug for dyn RegressionHandle {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("RegressionHandle").field("id", &self.id()).finish()
    }
}

/// Loads regression artifacts by id. The epoch seed is handed to the
/// implementation so any internal randomness is re-seeded deterministically.
pub trait RegressionLoader: Send + Sync {
    fn load(&self, id: &str, seed: u64) -> Result<Box<dyn RegressionHandle>, PredictionError>;
}
