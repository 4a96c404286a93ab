use crate::domain::errors::PredictionError;
use crate::domain::ports::{RegressionHandle, RegressionLoader};
use ort::session::Session;
use std::path::PathBuf;
use std::sync::Mutex;
use tracing::info;

/// Loads trained regression artifacts (`{id}.onnx`) from the epoch volume.
///
/// Artifact metadata is read from the model's custom metadata keys: `id`,
/// `description`, `lookback` and `predictions`, all written at export time.
pub struct OnnxRegressionLoader {
    model_dir: PathBuf,
}

impl OnnxRegressionLoader {
    pub fn new(model_dir: PathBuf) -> Self {
        Self { model_dir }
    }
}

impl RegressionLoader for OnnxRegressionLoader {
    fn load(&self, id: &str, seed: u64) -> Result<Box<dyn RegressionHandle>, PredictionError> {
        let path = self.model_dir.join(format!("{id}.onnx"));
        if !path.exists() {
            return Err(PredictionError::ArtifactUnavailable {
                id: id.to_string(),
                reason: format!("no artifact at {}", path.display()),
            });
        }

        let session = Session::builder()
            .and_then(|builder| builder.commit_from_file(&path))
            .map_err(|e| PredictionError::ArtifactUnavailable {
                id: id.to_string(),
                reason: e.to_string(),
            })?;

        let metadata =
            session.metadata().map_err(|e| PredictionError::MetadataInvalid {
                id: id.to_string(),
                reason: e.to_string(),
            })?;

        let read_key = |key: &str| -> Result<String, PredictionError> {
            match metadata.custom(key) {
                Ok(Some(value)) => Ok(value),
                Ok(None) => Err(PredictionError::MetadataInvalid {
                    id: id.to_string(),
                    reason: format!("missing `{key}` attribute"),
                }),
                Err(e) => Err(PredictionError::MetadataInvalid {
                    id: id.to_string(),
                    reason: e.to_string(),
                }),
            }
        };
        let read_count = |key: &str| -> Result<usize, PredictionError> {
            read_key(key)?.parse::<usize>().map_err(|_| {
                PredictionError::MetadataInvalid {
                    id: id.to_string(),
                    reason: format!("`{key}` attribute is not an integer"),
                }
            })
        };

        let artifact_id = read_key("id")?;
        let description = read_key("description")?;
        let lookback = read_count("lookback")?;
        let predictions = read_count("predictions")?;
        drop(metadata);

        // Inference through the runtime is deterministic; the epoch seed is
        // recorded so repeated loads of one epoch are traceable.
        info!(
            "Loaded regression artifact {artifact_id} (lookback {lookback}, \
             predictions {predictions}, seed {seed}) from {}",
            path.display()
        );

        Ok(Box::new(OnnxRegression {
            id: artifact_id,
            description,
            lookback,
            predictions,
            session: Mutex::new(session),
        }))
    }
}

/// One loaded ONNX regression. `run` needs exclusive access to the session,
/// so concurrent forecasts against the same handle are serialized.
pub struct OnnxRegression {
    id: String,
    description: String,
    lookback: usize,
    predictions: usize,
    session: Mutex<Session>,
}

impl RegressionHandle for OnnxRegression {
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

    fn forecast(&self, window: &[f64]) -> Result<Vec<f64>, PredictionError> {
        let failed = |reason: String| PredictionError::ForecastFailed {
            id: self.id.clone(),
            reason,
        };

        let data: Vec<f32> = window.iter().map(|v| *v as f32).collect();
        let shape = vec![1usize, window.len()];
        let input = ort::value::Value::from_array((shape.as_slice(), data))
            .map_err(|e| failed(e.to_string()))?;

        let mut session = self.session.lock().map_err(|e| failed(e.to_string()))?;
        let outputs = session
            .run(ort::inputs![input])
            .map_err(|e| failed(e.to_string()))?;

        let output = outputs
            .iter()
            .next()
            .map(|(_, value)| value)
            .ok_or_else(|| failed("no output tensor".to_string()))?;
        let (_, values) = output
            .try_extract_tensor::<f32>()
            .map_err(|e| failed(e.to_string()))?;

        Ok(values.iter().take(self.predictions).map(|v| *v as f64).collect())
    }
}
