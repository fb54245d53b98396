use procurement_bridge::*;
use procurement_engine::{AnomalyConfig, OutlierDetector, PriceAnomalyEngine, VendorReliabilityScorer};
use procurement_stats::{StatsError, StatsResult};
use serde_json::{json, Value};

// ---------------------------------------------------------------------------
// Fixtures
// ---------------------------------------------------------------------------

struct BrokenDetector;

impl OutlierDetector for BrokenDetector {
    fn is_outlier(&self, _training: &[f64], _point: f64) -> StatsResult<bool> {
        Err(StatsError::InvalidParameter("detector offline".into()))
    }
}

fn laptop_observation(current: f64) -> Value {
    json!({
        "current_price": current,
        "historical_prices": [45000, 46000, 44000, 47000, 43000, 48000,
                              45000, 46000, 44500, 47500, 45500, 46500],
        "item_category": "Electronics",
        "specifications": {"ram": "16GB"}
    })
}

fn to_json(doc: &ResponseDocument) -> Value {
    serde_json::to_value(doc).unwrap()
}

// ---------------------------------------------------------------------------
// Anomaly requests
// ---------------------------------------------------------------------------

#[test]
fn wire_document_has_expected_keys() {
    let bridge = Bridge::default();
    let doc = bridge.handle(OperationKind::Anomaly, &laptop_observation(75000.0).to_string());
    let json = to_json(&doc);
    for key in [
        "is_anomaly",
        "confidence",
        "reason",
        "benchmark_price",
        "median_price",
        "price_deviation",
        "z_score",
        "risk_level",
        "detection_methods",
        "price_bounds",
        "analysis_timestamp",
    ] {
        assert!(json.get(key).is_some(), "missing key {}", key);
    }
    assert_eq!(json["price_bounds"]["lower_bound"], 42250.0);
    assert_eq!(json["price_bounds"]["upper_bound"], 49250.0);
    assert_eq!(json["detection_methods"]["z_score_flagged"], true);
}

#[test]
fn short_history_renders_unknown_risk() {
    let bridge = Bridge::default();
    let doc = bridge.handle(
        OperationKind::Anomaly,
        r#"{"current_price": 500, "historical_prices": [100, 110]}"#,
    );
    let json = to_json(&doc);
    assert_eq!(json["is_anomaly"], false);
    assert_eq!(json["confidence"], 0.3);
    assert_eq!(json["benchmark_price"], 500.0);
    assert_eq!(json["price_deviation"], 0.0);
    assert_eq!(json["risk_level"], "Unknown");
}

#[test]
fn broken_detector_still_answers() {
    let engine = PriceAnomalyEngine::with_detector(AnomalyConfig::default(), Box::new(BrokenDetector));
    let bridge = Bridge::with_engine(engine, VendorReliabilityScorer::default());

    let doc = bridge.handle(OperationKind::Anomaly, &laptop_observation(75000.0).to_string());
    let json = to_json(&doc);
    assert_eq!(json["is_anomaly"], true);
    assert_eq!(json["detection_methods"]["ml_flagged"], false);
    assert!(json.get("error").is_none());

    let status = bridge.status();
    assert_eq!(status.outlier_method, "BrokenDetector");
}

// ---------------------------------------------------------------------------
// Envelopes
// ---------------------------------------------------------------------------

#[test]
fn envelope_batch_request() {
    let bridge = Bridge::default();
    let raw = json!({
        "operation": {
            "op": "DetectBatch",
            "params": {
                "products": [laptop_observation(75000.0), laptop_observation(46000.0)],
                "top_k": 5
            }
        },
        "request_id": "batch-42"
    })
    .to_string();

    let resp = bridge.handle_envelope(&raw);
    assert_eq!(resp.request_id, "batch-42");
    let json = serde_json::to_value(&resp).unwrap();
    assert_eq!(json["result"]["total_products_analyzed"], 2);
    assert_eq!(json["result"]["anomalies_detected"], 1);
    assert_eq!(json["result"]["anomaly_rate"], 50.0);
    assert_eq!(
        json["result"]["anomalous_products"][0]["product"]["specifications"]["ram"],
        "16GB"
    );
}

#[test]
fn envelope_status_request() {
    let bridge = Bridge::default();
    let resp = bridge.handle_envelope(r#"{"operation": {"op": "Status"}, "request_id": "s-1"}"#);
    let json = serde_json::to_value(&resp).unwrap();
    assert_eq!(json["result"]["models"]["anomaly_detector"], true);
    assert_eq!(json["result"]["models"]["vendor_scorer"], true);
    assert_eq!(json["result"]["all_models_ready"], true);
}

#[test]
fn garbage_envelope_is_error_document() {
    let bridge = Bridge::default();
    let resp = bridge.handle_envelope("definitely not json");
    assert_eq!(resp.request_id, "");
    assert!(matches!(resp.result, ResponseDocument::Error(_)));
}

// ---------------------------------------------------------------------------
// Vendors
// ---------------------------------------------------------------------------

#[test]
fn vendor_wire_document() {
    let bridge = Bridge::default();
    let raw = json!({
        "delivery_history": [{"on_time": true}, {"on_time": true}, {"on_time": true}, {"on_time": false}],
        "avg_price": 980,
        "market_avg_price": 1000,
        "rating": 4.2,
        "review_count": 35,
        "certifications": ["BIS Certified"],
        "government_approved": true,
        "completed_orders": 45,
        "total_orders": 50,
        "avg_response_hours": 6
    })
    .to_string();
    let json = to_json(&bridge.handle(OperationKind::Vendor, &raw));
    assert_eq!(json["breakdown"]["government_reviews"], 58.8);
    assert_eq!(json["breakdown"]["compliance"], 95.0);
    // 75*.25 + 90*.2 + 58.8*.2 + 95*.15 + 90*.1 + 90*.1
    assert_eq!(json["overall_score"], 80.8);
    assert_eq!(json["risk_level"], "Medium Risk");
    assert_eq!(
        json["recommendation"],
        "Recommended - Suitable for government contracts with standard oversight"
    );
}

#[test]
fn negative_response_hours_fall_back() {
    let bridge = Bridge::default();
    let json = to_json(&bridge.handle(OperationKind::Vendor, r#"{"avg_response_hours": -1}"#));
    assert_eq!(json["overall_score"], 70.0);
    assert_eq!(json["recommendation"], "Default scoring due to processing error");
    assert!(json["error"].as_str().unwrap().contains("avg_response_hours"));
}
