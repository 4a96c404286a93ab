use crate::domain::errors::PredictionError;
use crate::domain::ports::{EpochRepository, ErrorLog, RegressionHandle, RegressionLoader};
use crate::domain::types::EpochRecord;
use anyhow::Result;
use async_trait::async_trait;
use rand::rngs::StdRng;
use rand::{Rng, SeedableRng};
use std::sync::Mutex;
use std::sync::atomic::{AtomicBool, AtomicUsize, Ordering};

/// In-memory epoch source with a lookup counter, used to observe cache
/// behavior in tests.
#[derive(Default)]
pub struct MockEpochRepository {
    record: Mutex<Option<EpochRecord>>,
    lookups: AtomicUsize,
}

impl MockEpochRepository {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_record(record: EpochRecord) -> Self {
        let repository = Self::new();
        repository.set_record(Some(record));
        repository
    }

    pub fn set_record(&self, record: Option<EpochRecord>) {
        *self.record.lock().unwrap() = record;
    }

    /// Number of times the active epoch was looked up.
    pub fn lookups(&self) -> usize {
        self.lookups.load(Ordering::SeqCst)
    }
}

#[async_trait]
impl EpochRepository for MockEpochRepository {
    async fn get_active_epoch(&self) -> Result<Option<EpochRecord>> {
        self.lookups.fetch_add(1, Ordering::SeqCst);
        Ok(self.record.lock().unwrap().clone())
    }
}

/// Captures logged errors in memory.
#[derive(Default)]
pub struct MockErrorLog {
    entries: Mutex<Vec<(String, String)>>,
}

impl MockErrorLog {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn entries(&self) -> Vec<(String, String)> {
        self.entries.lock().unwrap().clone()
    }
}

#[async_trait]
impl ErrorLog for MockErrorLog {
    async fn log(&self, origin: &str, error: &str, _params: Option<serde_json::Value>) {
        self.entries.lock().unwrap().push((origin.to_string(), error.to_string()));
    }
}

/// Produces deterministic in-memory regression handles.
///
/// With a fixed forecast configured every handle returns it verbatim;
/// otherwise the forecast is drawn from an RNG seeded with the epoch seed,
/// so identical seeds yield identical forecasts.
pub struct MockRegressionLoader {
    lookback: usize,
    predictions: usize,
    forecast: Option<Vec<f64>>,
    reported_id: Option<String>,
    description: String,
    failing: AtomicBool,
    loads: AtomicUsize,
}

impl MockRegressionLoader {
    pub fn new(lookback: usize, predictions: usize) -> Self {
        Self {
            lookback,
            predictions,
            forecast: None,
            reported_id: None,
            description: "mock regression".to_string(),
            failing: AtomicBool::new(false),
            loads: AtomicUsize::new(0),
        }
    }

    /// Fixes the forecast every loaded handle returns.
    pub fn with_forecast(mut self, forecast: Vec<f64>) -> Self {
        self.forecast = Some(forecast);
        self
    }

    /// Makes loaded handles report this id instead of the requested one, to
    /// provoke identity mismatches.
    pub fn reporting_id(mut self, id: &str) -> Self {
        self.reported_id = Some(id.to_string());
        self
    }

    pub fn with_description(mut self, description: &str) -> Self {
        self.description = description.to_string();
        self
    }

    /// Toggles artifact-unavailable failures for subsequent loads.
    pub fn set_failing(&self, failing: bool) {
        self.failing.store(failing, Ordering::SeqCst);
    }

    /// Number of handles loaded so far.
    pub fn loads(&self) -> usize {
        self.loads.load(Ordering::SeqCst)
    }
}

impl RegressionLoader for MockRegressionLoader {
    fn load(&self, id: &str, seed: u64) -> Result<Box<dyn RegressionHandle>, PredictionError> {
        if self.failing.load(Ordering::SeqCst) {
            return Err(PredictionError::ArtifactUnavailable {
                id: id.to_string(),
                reason: "mock loader is set to fail".to_string(),
            });
        }

        self.loads.fetch_add(1, Ordering::SeqCst);

        let forecast = self.forecast.clone().unwrap_or_else(|| {
            let mut rng = StdRng::seed_from_u64(seed);
            (0..self.predictions).map(|_| rng.random_range(0.0..1.0)).collect()
        });

        Ok(Box::new(MockRegression {
            id: self.reported_id.clone().unwrap_or_else(|| id.to_string()),
            description: self.description.clone(),
            lookback: self.lookback,
            predictions: self.predictions,
            forecast,
        }))
    }
}

pub struct MockRegression {
    id: String,
    description: String,
    lookback: usize,
    predictions: usize,
    forecast: Vec<f64>,
}

impl RegressionHandle for MockRegression {
    fn id(&self) -> &str {
        &self.id
    }

    fn description(&self) -> &str {
        &self.description
    }

    fn lookback(&self) -> usize {
        self.lookback
    }

    fn predictions(&self) -> usize {
        self.predictions
    }

    fn forecast(&self, _window: &[f64]) -> Result<Vec<f64>, PredictionError> {
        Ok(self.forecast.clone())
    }
}
