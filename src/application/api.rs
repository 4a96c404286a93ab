use crate::application::epoch_service::EpochService;
use crate::application::guard::check_request;
use crate::domain::ports::ErrorLog;
use crate::domain::types::{ApiResponse, Prediction};
use std::sync::Arc;

/// Facade wired into the boundary HTTP layer: validates the request, runs
/// the epoch-scoped pipeline and shapes the response envelope. Failures are
/// logged through the collaborator error log before being returned.
pub struct PredictionApi {
    secret_key: String,
    epochs: Arc<EpochService>,
    error_log: Arc<dyn ErrorLog>,
}

impl PredictionApi {
    pub fn new(
        secret_key: impl Into<String>,
        epochs: Arc<EpochService>,
        error_log: Arc<dyn ErrorLog>,
    ) -> Self {
        Self { secret_key: secret_key.into(), epochs, error_log }
    }

    /// The single operation exposed to the boundary layer.
    pub async fn predict(
        &self,
        secret: Option<&str>,
        epoch_id: Option<&str>,
        close_prices: Option<&[f64]>,
    ) -> ApiResponse<Prediction> {
        let request = check_request(secret, epoch_id, close_prices, &self.secret_key);
        if let Some(error) = request.error {
            return ApiResponse::failure(error);
        }

        match self
            .epochs
            .generate_prediction(&request.epoch_id, &request.close_prices)
            .await
        {
            Ok(prediction) => ApiResponse::ok(prediction),
            Err(err) => {
                let message = err.api_message();
                self.error_log
                    .log(
                        "PredictionApi.predict",
                        &message,
                        Some(serde_json::json!({ "epoch_id": request.epoch_id })),
                    )
                    .await;
                ApiResponse::failure(message)
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::infrastructure::mock::{
        MockEpochRepository, MockErrorLog, MockRegressionLoader,
    };

    fn api(repository: MockEpochRepository, error_log: Arc<MockErrorLog>) -> PredictionApi {
        let loader = Arc::new(MockRegressionLoader::new(3, 1).with_forecast(vec![160.0]));
        let service = Arc::new(EpochService::new(Arc::new(repository), loader));
        PredictionApi::new("core-api-secret", service, error_log)
    }

    #[test]
    fn test_guard_failures_are_not_logged() {
        let error_log = Arc::new(MockErrorLog::new());
        let api = api(MockEpochRepository::new(), error_log.clone());

        let response = tokio_test::block_on(api.predict(
            Some("wrong"),
            Some("_alpha1"),
            Some(&[50.0, 100.0, 150.0]),
        ));

        assert!(!response.success);
        assert_eq!(
            response.error.as_deref(),
            Some("The secret provided in the request is invalid.")
        );
        assert!(error_log.entries().is_empty());
    }

    #[test]
    fn test_pipeline_failures_are_logged_with_origin() {
        let error_log = Arc::new(MockErrorLog::new());
        let api = api(MockEpochRepository::new(), error_log.clone());

        let response = tokio_test::block_on(api.predict(
            Some("core-api-secret"),
            Some("_alpha1"),
            Some(&[50.0, 100.0, 150.0]),
        ));

        assert!(!response.success);
        let error = response.error.unwrap();
        assert!(error.contains("active Epoch"));
        assert!(error.contains("{(502000)}"));

        let entries = error_log.entries();
        assert_eq!(entries.len(), 1);
        assert_eq!(entries[0].0, "PredictionApi.predict");
        assert_eq!(entries[0].1, error);
    }
}
