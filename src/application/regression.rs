use crate::domain::errors::PredictionError;
use crate::domain::numeric::{percentage_change, round_dp};
use crate::domain::ports::{RegressionHandle, RegressionLoader};

/// Edge of the neutral dead-zone: adjusted changes strictly inside
/// (-MIN_FEATURE_VALUE, MIN_FEATURE_VALUE) collapse to exactly 0.
const MIN_FEATURE_VALUE: f64 = 0.01;
/// Saturation point of the adjusted change.
const MAX_FEATURE_VALUE: f64 = 1.0;

/// One member of the prediction model's ensemble. Wraps a loaded forecasting
/// artifact and converts its raw multi-step forecast into a single bounded
/// feature in [-1, 1].
#[derive(Debug)]
pub struct Regression {
    handle: Box<dyn RegressionHandle>,
}

impl Regression {
    /// Loads the artifact for `id` and validates its metadata. The returned
    /// handle must report the requested id back; the description, lookback
    /// and predictions count must all be usable.
    pub fn load(
        loader: &dyn RegressionLoader,
        id: &str,
        seed: u64,
    ) -> Result<Self, PredictionError> {
        let handle = loader.load(id, seed)?;

        if handle.id() != id {
            return Err(PredictionError::IdentityMismatch {
                expected: id.to_string(),
                actual: handle.id().to_string(),
            });
        }
        if handle.description().is_empty() {
            return Err(PredictionError::MetadataInvalid {
                id: id.to_string(),
                reason: "the description is empty".to_string(),
            });
        }
        if handle.lookback() == 0 {
            return Err(PredictionError::MetadataInvalid {
                id: id.to_string(),
                reason: "the lookback must be a positive integer".to_string(),
            });
        }
        if handle.predictions() == 0 {
            return Err(PredictionError::MetadataInvalid {
                id: id.to_string(),
                reason: "the predictions count must be a positive integer".to_string(),
            });
        }

        Ok(Self { handle })
    }

    pub fn id(&self) -> &str {
        self.handle.id()
    }

    /// Forecasts off the normalized input window and derives the feature
    /// from the percentage change between the last input point and the last
    /// forecasted point.
    pub fn predict_feature(&self, window: &[f64]) -> Result<f64, PredictionError> {
        let forecast = self.handle.forecast(window)?;

        let last_forecast = forecast.last().copied().ok_or_else(|| {
            PredictionError::ForecastFailed {
                id: self.handle.id().to_string(),
                reason: "the forecast sequence is empty".to_string(),
            }
        })?;
        let last_input = window.last().copied().unwrap_or(0.0);

        Ok(normalize_feature(percentage_change(last_input, last_forecast)))
    }
}

/// Scales a predicted percentage change into [-1, 1]. Changes inside the
/// dead-zone are reported as exactly 0 so tiny, noisy deltas stay neutral.
fn normalize_feature(predicted_change: f64) -> f64 {
    let adjusted = adjusted_change(predicted_change);
    if adjusted > 0.0 {
        scale_feature(adjusted)
    } else if adjusted < 0.0 {
        // decrease changes are negative, scale the magnitude and flip back
        -scale_feature(-adjusted)
    } else {
        0.0
    }
}

/// Clamps a change into [-MAX, -MIN] | 0 | [MIN, MAX].
fn adjusted_change(change: f64) -> f64 {
    if (MIN_FEATURE_VALUE..=MAX_FEATURE_VALUE).contains(&change) {
        change
    } else if change > MAX_FEATURE_VALUE {
        MAX_FEATURE_VALUE
    } else if (-MAX_FEATURE_VALUE..=-MIN_FEATURE_VALUE).contains(&change) {
        change
    } else if change < -MAX_FEATURE_VALUE {
        -MAX_FEATURE_VALUE
    } else {
        0.0
    }
}

fn scale_feature(value: f64) -> f64 {
    round_dp(
        (value - MIN_FEATURE_VALUE) / (MAX_FEATURE_VALUE - MIN_FEATURE_VALUE),
        6,
    )
}
