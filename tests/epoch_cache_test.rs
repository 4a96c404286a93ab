use prediction_api::application::epoch_service::EpochService;
use prediction_api::domain::errors::PredictionError;
use prediction_api::domain::types::{
    EpochConfig, EpochRecord, MinSumFunction, PredictionModelConfig, RegressionConfig,
};
use prediction_api::infrastructure::mock::{MockEpochRepository, MockRegressionLoader};
use std::sync::Arc;

const PRICES: &[f64] = &[50.0, 100.0, 150.0];

fn record(epoch_id: &str, regression_count: usize) -> EpochRecord {
    EpochRecord {
        id: epoch_id.to_string(),
        config: EpochConfig {
            id: epoch_id.to_string(),
            seed: 42,
            sma_window_size: 1,
            highest_price_sma: 200.0,
            lowest_price_sma: 0.0,
            regression_lookback: 3,
            regression_predictions: 1,
        },
        model: PredictionModelConfig {
            id: format!("{epoch_id}_model"),
            price_change_requirement: 3.0,
            min_sum_function: MinSumFunction::Mean,
            min_sum_adjustment_factor: 1.0,
            min_increase_sum: 1.5,
            min_decrease_sum: -1.5,
            regressions: (0..regression_count)
                .map(|i| RegressionConfig { id: format!("{epoch_id}_reg{i}") })
                .collect(),
        },
        uninstalled: None,
    }
}

fn service(
    repository: Arc<MockEpochRepository>,
    loader: Arc<MockRegressionLoader>,
) -> EpochService {
    EpochService::new(repository, loader)
}

#[tokio::test]
async fn test_same_epoch_does_not_reconstruct_the_model() {
    let repository = Arc::new(MockEpochRepository::with_record(record("_alpha1", 2)));
    let loader = Arc::new(MockRegressionLoader::new(3, 1).with_forecast(vec![160.0]));
    let service = service(repository.clone(), loader.clone());

    for _ in 0..5 {
        let prediction = service.generate_prediction("_alpha1", PRICES).await.unwrap();
        assert_eq!(prediction.r, 0);
    }

    // one lookup, one construction (two regressions loaded once)
    assert_eq!(repository.lookups(), 1);
    assert_eq!(loader.loads(), 2);
}

#[tokio::test]
async fn test_epoch_change_reconstructs_exactly_once() {
    let repository = Arc::new(MockEpochRepository::with_record(record("_alpha1", 1)));
    let loader = Arc::new(MockRegressionLoader::new(3, 1).with_forecast(vec![160.0]));
    let service = service(repository.clone(), loader.clone());

    service.generate_prediction("_alpha1", PRICES).await.unwrap();
    assert_eq!(loader.loads(), 1);

    repository.set_record(Some(record("_beta22", 1)));
    service.generate_prediction("_beta22", PRICES).await.unwrap();
    assert_eq!(loader.loads(), 2);

    // the new epoch is now cached
    service.generate_prediction("_beta22", PRICES).await.unwrap();
    assert_eq!(loader.loads(), 2);
    assert_eq!(repository.lookups(), 2);
}

#[tokio::test]
async fn test_no_active_epoch() {
    let repository = Arc::new(MockEpochRepository::new());
    let loader = Arc::new(MockRegressionLoader::new(3, 1));
    let service = service(repository, loader);

    let err = service.generate_prediction("_alpha1", PRICES).await.unwrap_err();
    assert!(matches!(err, PredictionError::NoActiveEpoch));
    assert_eq!(err.code(), 502000);
}

#[tokio::test]
async fn test_requested_epoch_differs_from_active_one() {
    let repository = Arc::new(MockEpochRepository::with_record(record("_beta22", 1)));
    let loader = Arc::new(MockRegressionLoader::new(3, 1));
    let service = service(repository, loader.clone());

    let err = service.generate_prediction("_alpha1", PRICES).await.unwrap_err();
    match &err {
        PredictionError::EpochMismatch { requested, active } => {
            assert_eq!(requested, "_alpha1");
            assert_eq!(active, "_beta22");
        }
        other => panic!("unexpected error: {other}"),
    }

    // nothing was constructed
    assert_eq!(loader.loads(), 0);
}

#[tokio::test]
async fn test_failed_reload_keeps_the_cached_model() {
    let repository = Arc::new(MockEpochRepository::with_record(record("_alpha1", 1)));
    let loader = Arc::new(MockRegressionLoader::new(3, 1).with_forecast(vec![160.0]));
    let service = service(repository.clone(), loader.clone());

    service.generate_prediction("_alpha1", PRICES).await.unwrap();
    assert_eq!(loader.loads(), 1);

    // a new epoch becomes active but its artifacts cannot be loaded
    repository.set_record(Some(record("_beta22", 1)));
    loader.set_failing(true);
    let err = service.generate_prediction("_beta22", PRICES).await.unwrap_err();
    assert!(matches!(err, PredictionError::ArtifactUnavailable { .. }));

    // the previously cached model still serves its epoch untouched
    let prediction = service.generate_prediction("_alpha1", PRICES).await.unwrap();
    assert_eq!(prediction.f, vec![1.0]);
    assert_eq!(loader.loads(), 1);
}

#[tokio::test]
async fn test_concurrent_first_load_constructs_one_canonical_model() {
    let repository = Arc::new(MockEpochRepository::with_record(record("_alpha1", 4)));
    let loader = Arc::new(MockRegressionLoader::new(3, 1).with_forecast(vec![160.0]));
    let service = Arc::new(service(repository.clone(), loader.clone()));

    let mut handles = Vec::new();
    for _ in 0..8 {
        let service = service.clone();
        handles.push(tokio::spawn(async move {
            service.generate_prediction("_alpha1", PRICES).await
        }));
    }

    for handle in handles {
        let prediction = handle.await.unwrap().unwrap();
        assert_eq!(prediction.s, 4.0);
    }

    // exactly one construction despite eight concurrent requests
    assert_eq!(repository.lookups(), 1);
    assert_eq!(loader.loads(), 4);
}
