use crate::application::regression::Regression;
use crate::domain::errors::PredictionError;
use crate::domain::numeric::{now_ms, round_dp};
use crate::domain::ports::RegressionLoader;
use crate::domain::types::{EpochRecord, MinSumFunction, Prediction};
use tracing::info;

/// In-memory model for the active epoch. Owns the windowing parameters and
/// the ordered ensemble of loaded regressions; replaced wholesale whenever
/// the active epoch changes.
///
/// The min-sum fields are part of the exported model configuration but the
/// serving path never applies them: predictions are always neutral (`r = 0`)
/// and the decision thresholds live in the Core API.
#[allow(dead_code)]
#[derive(Debug)]
pub struct PredictionModel {
    pub epoch_id: String,
    sma_window_size: usize,
    highest_price_sma: f64,
    lowest_price_sma: f64,
    regression_lookback: usize,
    regression_predictions: usize,

    pub id: String,
    price_change_requirement: f64,
    min_sum_function: MinSumFunction,
    min_sum_adjustment_factor: f64,
    min_increase_sum: f64,
    min_decrease_sum: f64,
    regressions: Vec<Regression>,
}

impl PredictionModel {
    /// Builds the model for an epoch record, loading one regression per
    /// configured id with the epoch's seed. Any load failure aborts the
    /// whole construction.
    pub fn new(
        record: &EpochRecord,
        loader: &dyn RegressionLoader,
    ) -> Result<Self, PredictionError> {
        let regressions = record
            .model
            .regressions
            .iter()
            .map(|config| Regression::load(loader, &config.id, record.config.seed))
            .collect::<Result<Vec<_>, _>>()?;

        info!(
            "Initialized prediction model {} for epoch {} ({} regressions)",
            record.model.id,
            record.config.id,
            regressions.len()
        );

        Ok(Self {
            epoch_id: record.config.id.clone(),
            sma_window_size: record.config.sma_window_size,
            highest_price_sma: record.config.highest_price_sma,
            lowest_price_sma: record.config.lowest_price_sma,
            regression_lookback: record.config.regression_lookback,
            regression_predictions: record.config.regression_predictions,
            id: record.model.id.clone(),
            price_change_requirement: record.model.price_change_requirement,
            min_sum_function: record.model.min_sum_function,
            min_sum_adjustment_factor: record.model.min_sum_adjustment_factor,
            min_increase_sum: record.model.min_increase_sum,
            min_decrease_sum: record.model.min_decrease_sum,
            regressions,
        })
    }

    /// Generates a prediction from the latest close prices.
    pub fn predict(&self, close_prices: &[f64]) -> Result<Prediction, PredictionError> {
        let (features_sum, features) = self.build_features(close_prices)?;

        Ok(Prediction { r: 0, t: now_ms(), f: features, s: features_sum })
    }

    /// Runs every regression of the ensemble, in configured order, over the
    /// normalized input window. Returns the rounded feature sum and the
    /// per-regression features.
    fn build_features(
        &self,
        close_prices: &[f64],
    ) -> Result<(f64, Vec<f64>), PredictionError> {
        let input = self.make_regression_input(close_prices)?;

        let mut features = Vec::with_capacity(self.regressions.len());
        for regression in &self.regressions {
            features.push(regression.predict_feature(&input)?);
        }

        Ok((round_dp(features.iter().sum(), 6), features))
    }

    /// Smooths the raw close prices with a trailing simple moving average,
    /// checks the windowed series against the epoch's shape and price
    /// bounds, and normalizes it into [0, 1].
    fn make_regression_input(
        &self,
        close_prices: &[f64],
    ) -> Result<Vec<f64>, PredictionError> {
        let smoothed: Vec<f64> =
            if self.sma_window_size > 0 && close_prices.len() >= self.sma_window_size {
                close_prices
                    .windows(self.sma_window_size)
                    .map(|window| window.iter().sum::<f64>() / window.len() as f64)
                    .collect()
            } else {
                Vec::new()
            };

        if smoothed.len() != self.regression_lookback {
            return Err(PredictionError::InputShapeMismatch {
                expected: self.regression_lookback,
                actual: smoothed.len(),
            });
        }

        let max = smoothed.iter().copied().fold(f64::NEG_INFINITY, f64::max);
        let min = smoothed.iter().copied().fold(f64::INFINITY, f64::min);
        if max >= self.highest_price_sma {
            return Err(PredictionError::PriceTooHigh {
                value: max,
                bound: self.highest_price_sma,
            });
        }
        if min <= self.lowest_price_sma {
            return Err(PredictionError::PriceTooLow {
                value: min,
                bound: self.lowest_price_sma,
            });
        }

        let range = self.highest_price_sma - self.lowest_price_sma;
        Ok(smoothed
            .iter()
            .map(|value| (value - self.lowest_price_sma) / range)
            .collect())
    }
}
