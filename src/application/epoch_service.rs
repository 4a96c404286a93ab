use crate::application::prediction_model::PredictionModel;
use crate::domain::errors::PredictionError;
use crate::domain::numeric::add_minutes;
use crate::domain::ports::{EpochRepository, RegressionLoader};
use crate::domain::types::Prediction;
use std::sync::Arc;
use tokio::sync::Mutex;
use tracing::{debug, info};

/// Minutes between advisory memory-reclamation passes.
const RECLAMATION_INTERVAL_MINUTES: i64 = 120;

#[derive(Default)]
struct CacheState {
    model: Option<Arc<PredictionModel>>,
    /// Prediction timestamp (ms) at which the next reclamation pass runs.
    reclaim_at: Option<i64>,
    reclamation_passes: u64,
}

impl CacheState {
    /// Advances the reclamation schedule off the prediction's own timestamp
    /// (not wall-clock, so repeated runs stay deterministic) and reports
    /// whether a pass is due.
    fn note_prediction(&mut self, prediction_time: i64) -> bool {
        match self.reclaim_at {
            None => {
                self.reclaim_at =
                    Some(add_minutes(prediction_time, RECLAMATION_INTERVAL_MINUTES));
                false
            }
            Some(scheduled) if scheduled <= prediction_time => {
                self.reclamation_passes += 1;
                self.reclaim_at =
                    Some(add_minutes(prediction_time, RECLAMATION_INTERVAL_MINUTES));
                true
            }
            Some(_) => false,
        }
    }
}

/// Owns the single live [`PredictionModel`] and its epoch binding.
///
/// The service mostly serves one epoch for long stretches; reloading is the
/// rare, expensive path (it loads every regression artifact), so the cached
/// model is reused until the requested epoch id stops matching it.
pub struct EpochService {
    epochs: Arc<dyn EpochRepository>,
    loader: Arc<dyn RegressionLoader>,
    state: Mutex<CacheState>,
}

impl EpochService {
    pub fn new(epochs: Arc<dyn EpochRepository>, loader: Arc<dyn RegressionLoader>) -> Self {
        Self { epochs, loader, state: Mutex::new(CacheState::default()) }
    }

    /// Ensures the cached model matches the requested epoch and generates a
    /// prediction from the provided close prices.
    pub async fn generate_prediction(
        &self,
        epoch_id: &str,
        close_prices: &[f64],
    ) -> Result<Prediction, PredictionError> {
        let model = self.resolve_model(epoch_id).await?;

        // Inference runs outside the cache lock; concurrent requests share
        // the same model reference.
        let prediction = model.predict(close_prices)?;

        let mut state = self.state.lock().await;
        if state.note_prediction(prediction.t) {
            let passes = state.reclamation_passes;
            drop(state);
            self.reclaim(passes);
        }

        Ok(prediction)
    }

    /// Returns the cached model when its epoch matches the request,
    /// otherwise loads the active epoch record and installs a freshly built
    /// model. The whole check-then-load sequence holds the lock so
    /// concurrent callers install exactly one canonical model per epoch and
    /// never observe a half-constructed one.
    async fn resolve_model(
        &self,
        epoch_id: &str,
    ) -> Result<Arc<PredictionModel>, PredictionError> {
        let mut state = self.state.lock().await;

        if let Some(model) = &state.model
            && model.epoch_id == epoch_id
        {
            return Ok(Arc::clone(model));
        }

        let record = self
            .epochs
            .get_active_epoch()
            .await
            .map_err(|e| PredictionError::EpochLookupFailed { reason: e.to_string() })?
            .ok_or(PredictionError::NoActiveEpoch)?;

        if record.id != epoch_id {
            return Err(PredictionError::EpochMismatch {
                requested: epoch_id.to_string(),
                active: record.id,
            });
        }

        // A construction failure leaves the previously cached model intact.
        let model = Arc::new(PredictionModel::new(&record, self.loader.as_ref())?);
        info!("Epoch cache now serving epoch {}", model.epoch_id);
        state.model = Some(Arc::clone(&model));

        Ok(model)
    }

    /// Advisory housekeeping. Superseded models are freed when their last
    /// reference drops, so the pass itself only reports that the interval
    /// elapsed; it never sits on the critical path of a prediction.
    fn reclaim(&self, passes: u64) {
        debug!("Memory reclamation pass #{passes} completed");
    }
}
