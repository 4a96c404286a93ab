use thiserror::Error;

/// Errors raised along the prediction path. Every variant carries a numeric
/// code the Core API expects appended to the message (see
/// [`PredictionError::api_message`]).
#[derive(Debug, Error)]
pub enum PredictionError {
    #[error("Cannot predict because there isn't an active Epoch.")]
    NoActiveEpoch,

    #[error("The provided epoch id {requested} is different to the current epoch {active}.")]
    EpochMismatch { requested: String, active: String },

    #[error("The active Epoch could not be retrieved: {reason}")]
    EpochLookupFailed { reason: String },

    #[error(
        "The number of rows in the sma series does not match the regressions' lookback. Needs: {expected}, Has: {actual}."
    )]
    InputShapeMismatch { expected: usize, actual: usize },

    #[error("The max price in the regression input {value} violates the highest value permitted in the Epoch {bound}.")]
    PriceTooHigh { value: f64, bound: f64 },

    #[error("The min price in the regression input {value} violates the lowest value permitted in the Epoch {bound}.")]
    PriceTooLow { value: f64, bound: f64 },

    #[error("The regression artifact {id} could not be loaded: {reason}")]
    ArtifactUnavailable { id: String, reason: String },

    #[error("Regression ID mismatch: {actual} != {expected}")]
    IdentityMismatch { expected: String, actual: String },

    #[error("Regression {id} metadata is invalid: {reason}")]
    MetadataInvalid { id: String, reason: String },

    #[error("Regression {id} failed to forecast: {reason}")]
    ForecastFailed { id: String, reason: String },
}

impl PredictionError {
    /// Numeric error code wired to the Core API.
    pub fn code(&self) -> u32 {
        match self {
            PredictionError::NoActiveEpoch => 502000,
            PredictionError::EpochMismatch { .. } => 502001,
            PredictionError::EpochLookupFailed { .. } => 502002,
            PredictionError::InputShapeMismatch { .. } => 503000,
            PredictionError::PriceTooHigh { .. } => 503001,
            PredictionError::PriceTooLow { .. } => 503002,
            PredictionError::ArtifactUnavailable { .. } => 504000,
            PredictionError::IdentityMismatch { .. } => 504001,
            PredictionError::MetadataInvalid { .. } => 504002,
            PredictionError::ForecastFailed { .. } => 504003,
        }
    }

    /// Message format surfaced in API responses: the display text with the
    /// code appended as ` {(code)}`.
    pub fn api_message(&self) -> String {
        format!("{self} {{({})}}", self.code())
    }
}
