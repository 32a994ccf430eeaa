//! End-to-end tests against the public scoring surface.

use serde_json::json;

use secureflow_core::{
    ensure_initialized, score, score_batch, status, BatchOutcome, RiskLevel, FEATURE_LAYOUT,
};

fn init_logging() {
    let _ = env_logger::builder().is_test(true).try_init();
}

#[test]
fn scores_center_of_training_distribution_as_normal() {
    init_logging();
    let result = score(&json!({
        "amount": 50, "hour": 14, "day_of_week": 2,
        "merchant_category": 5, "transaction_type": 1,
    }))
    .unwrap();

    assert!(!result.is_anomaly);
    assert_eq!(result.risk_level, RiskLevel::Low);
    assert!(result.score > 0.0 && result.score < 1.0);
}

#[test]
fn scores_high_amount_night_transaction_as_anomalous() {
    init_logging();
    let result = score(&json!({
        "amount": 5000, "hour": 3, "day_of_week": 3,
        "merchant_category": 5, "transaction_type": 1,
    }))
    .unwrap();

    assert!(result.is_anomaly);
    assert_ne!(result.risk_level, RiskLevel::Low);
    assert!(result.confidence > 0.5);
}

#[test]
fn explanation_carries_exactly_the_schema_features() {
    init_logging();
    let result = score(&json!({
        "amount": 300, "hour": 22, "day_of_week": 5,
        "merchant_category": 8, "transaction_type": 2,
    }))
    .unwrap();

    assert_eq!(result.explanation.len(), FEATURE_LAYOUT.len());
    for name in FEATURE_LAYOUT {
        assert!(result.explanation.contains_key(*name), "missing {name}");
    }
}

#[test]
fn legacy_payload_scores_end_to_end() {
    init_logging();
    let result = score(&json!({
        "amount": 75.25,
        "timestamp": "2024-03-04T15:30:00Z",
        "category": "groceries",
        "type": "purchase",
    }))
    .unwrap();

    assert!(result.score.is_finite());
    assert_eq!(result.explanation.len(), FEATURE_LAYOUT.len());
}

#[test]
fn missing_amount_is_a_named_validation_error() {
    init_logging();
    let err = score(&json!({"hour": 3, "day_of_week": 1})).unwrap_err();
    assert!(err.to_string().contains("amount"));
}

#[test]
fn batch_mixes_successes_and_per_item_errors() {
    init_logging();
    let payloads = vec![
        json!({"amount": 40, "hour": 12, "day_of_week": 1, "merchant_category": 3, "transaction_type": 0}),
        json!({"note": "no usable fields"}),
        json!({"amount": "not-a-number", "hour": 1, "day_of_week": 1, "merchant_category": 1}),
        json!({"amount": 4500, "hour": 2, "day_of_week": 6, "merchant_category": 9, "transaction_type": 2}),
    ];

    let results = score_batch(&payloads).unwrap();
    assert_eq!(results.len(), payloads.len());

    for (i, item) in results.iter().enumerate() {
        assert_eq!(item.index, i, "batch must preserve input order");
    }
    assert!(matches!(results[0].outcome, BatchOutcome::Scored(_)));
    assert!(matches!(results[1].outcome, BatchOutcome::Failed { .. }));
    match &results[2].outcome {
        BatchOutcome::Failed { error } => assert!(error.contains("amount")),
        other => panic!("expected coercion failure, got {other:?}"),
    }
    assert!(matches!(results[3].outcome, BatchOutcome::Scored(_)));
}

#[test]
fn initialization_is_idempotent_and_scores_stay_stable() {
    init_logging();
    let payload = json!({
        "amount": 66.0, "hour": 10, "day_of_week": 4,
        "merchant_category": 1, "transaction_type": 0,
    });

    ensure_initialized().unwrap();
    let first = score(&payload).unwrap();
    ensure_initialized().unwrap();
    let second = score(&payload).unwrap();

    assert_eq!(first.score, second.score);
    assert_eq!(first.is_anomaly, second.is_anomaly);
    assert_eq!(first.explanation, second.explanation);
}

#[test]
fn status_reports_trained_model() {
    init_logging();
    ensure_initialized().unwrap();
    let snapshot = status();
    assert!(snapshot.model_loaded);
    assert_eq!(snapshot.tree_count, 100);
    assert!(snapshot.threshold > 0.0 && snapshot.threshold < 1.0);
}
