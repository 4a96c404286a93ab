use tracing::warn;

/// Outcome of validating one inbound predict request. Callers must check
/// `error` before trusting `epoch_id` or `close_prices`.
#[derive(Debug, Clone)]
pub struct GuardResult {
    pub error: Option<String>,
    pub epoch_id: String,
    pub close_prices: Vec<f64>,
}

/// Validates the arguments of a predict request.
///
/// All three rules are evaluated unconditionally; a later failing rule
/// overwrites the message of an earlier one, so the reported error is the
/// last rule that failed.
pub fn check_request(
    secret: Option<&str>,
    epoch_id: Option<&str>,
    close_prices: Option<&[f64]>,
    expected_secret: &str,
) -> GuardResult {
    let mut error: Option<String> = None;

    if secret != Some(expected_secret) {
        error = Some("The secret provided in the request is invalid.".to_string());
    }

    let epoch_id_valid = matches!(
        epoch_id,
        Some(id) if id.starts_with('_') && id.len() >= 4 && id.len() <= 100
    );
    if !epoch_id_valid {
        error = Some(format!(
            "The provided Epoch ID {} is invalid.",
            epoch_id.unwrap_or("None")
        ));
    }

    let close_prices_valid = matches!(close_prices, Some(prices) if !prices.is_empty());
    if !close_prices_valid {
        warn!("Rejected close price list: {:?}", close_prices);
        error = Some("The provided list of close prices is invalid.".to_string());
    }

    GuardResult {
        error,
        epoch_id: epoch_id.unwrap_or_default().to_string(),
        close_prices: close_prices.unwrap_or_default().to_vec(),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    const SECRET: &str = "core-api-secret";

    fn check(
        secret: Option<&str>,
        epoch_id: Option<&str>,
        close_prices: Option<&[f64]>,
    ) -> GuardResult {
        check_request(secret, epoch_id, close_prices, SECRET)
    }

    #[test]
    fn test_valid_request_passes() {
        let res = check(Some(SECRET), Some("_alpha1"), Some(&[1.0, 2.0, 3.0]));
        assert!(res.error.is_none());
        assert_eq!(res.epoch_id, "_alpha1");
        assert_eq!(res.close_prices, vec![1.0, 2.0, 3.0]);
    }

    #[test]
    fn test_invalid_secret() {
        let res = check(Some("wrong"), Some("_alpha1"), Some(&[1.0]));
        assert_eq!(res.error.as_deref(), Some("The secret provided in the request is invalid."));

        let res = check(None, Some("_alpha1"), Some(&[1.0]));
        assert_eq!(res.error.as_deref(), Some("The secret provided in the request is invalid."));
    }

    #[test]
    fn test_invalid_epoch_id() {
        for id in [Some("alpha1"), Some("_a"), None, Some("")] {
            let res = check(Some(SECRET), id, Some(&[1.0]));
            let error = res.error.expect("epoch id should be rejected");
            assert!(error.contains("Epoch ID"), "unexpected message: {error}");
        }

        let too_long = format!("_{}", "x".repeat(100));
        let res = check(Some(SECRET), Some(&too_long), Some(&[1.0]));
        assert!(res.error.unwrap().contains("Epoch ID"));

        // 100 characters exactly is still acceptable
        let at_limit = format!("_{}", "x".repeat(99));
        let res = check(Some(SECRET), Some(&at_limit), Some(&[1.0]));
        assert!(res.error.is_none());
    }

    #[test]
    fn test_invalid_close_prices() {
        let res = check(Some(SECRET), Some("_alpha1"), Some(&[]));
        assert_eq!(res.error.as_deref(), Some("The provided list of close prices is invalid."));

        let res = check(Some(SECRET), Some("_alpha1"), None);
        assert_eq!(res.error.as_deref(), Some("The provided list of close prices is invalid."));
    }

    // The guard intentionally does not short-circuit: when several rules
    // fail, the last one evaluated decides the message.
    #[test]
    fn test_last_failing_rule_wins() {
        let res = check(Some("wrong"), Some("bad-id"), Some(&[1.0]));
        assert!(res.error.unwrap().contains("Epoch ID"));

        let res = check(Some("wrong"), Some("_alpha1"), Some(&[]));
        assert_eq!(res.error.as_deref(), Some("The provided list of close prices is invalid."));

        let res = check(Some("wrong"), Some("bad-id"), Some(&[]));
        assert_eq!(res.error.as_deref(), Some("The provided list of close prices is invalid."));
    }
}
