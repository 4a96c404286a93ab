use serde::{Deserialize, Serialize};
use std::fmt;

/// Function used during the model's discovery to derive the minimum sums
/// required for non-neutral predictions.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum MinSumFunction {
    Mean,
    Median,
}

impl fmt::Display for MinSumFunction {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            MinSumFunction::Mean => write!(f, "mean"),
            MinSumFunction::Median => write!(f, "median"),
        }
    }
}

/// Identity of one regression within the prediction model.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct RegressionConfig {
    pub id: String,
}

/// Windowing and normalization parameters shared by every regression in the
/// epoch.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct EpochConfig {
    pub id: String,
    pub seed: u64,
    pub sma_window_size: usize,
    pub highest_price_sma: f64,
    pub lowest_price_sma: f64,
    pub regression_lookback: usize,
    pub regression_predictions: usize,
}

/// Exported configuration of the prediction model selected for the epoch.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct PredictionModelConfig {
    pub id: String,
    pub price_change_requirement: f64,
    pub min_sum_function: MinSumFunction,
    pub min_sum_adjustment_factor: f64,
    pub min_increase_sum: f64,
    pub min_decrease_sum: f64,
    pub regressions: Vec<RegressionConfig>,
}

/// One row of the epochs table. The row whose `uninstalled` column is NULL
/// is the active epoch.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct EpochRecord {
    pub id: String,
    pub config: EpochConfig,
    pub model: PredictionModelConfig,
    pub uninstalled: Option<i64>,
}

/// Final prediction payload returned to the Core API. Field names match the
/// wire format: `r` result, `t` time (ms), `f` features, `s` sum.
///
/// The serving path always emits `r = 0`; the decision thresholds live in
/// the Core API, not here.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Prediction {
    pub r: i8,
    pub t: i64,
    pub f: Vec<f64>,
    pub s: f64,
}

/// Response envelope shared with the Core API.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ApiResponse<T> {
    pub success: bool,
    pub data: Option<T>,
    pub error: Option<String>,
}

impl<T> ApiResponse<T> {
    pub fn ok(data: T) -> Self {
        Self { success: true, data: Some(data), error: None }
    }

    pub fn failure(error: impl Into<String>) -> Self {
        Self { success: false, data: None, error: Some(error.into()) }
    }
}
