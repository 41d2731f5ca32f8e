use std::sync::Arc;
use std::sync::atomic::{AtomicUsize, Ordering};

use async_trait::async_trait;
use fondo_core::FondoError;
use fondo_yfinance::Holdings;
use fondo_yfinance::adapter::QuoteSummaryApi;
use serde_json::{Value, json};

struct DriftingApi {
    calls: AtomicUsize,
}

#[async_trait]
impl QuoteSummaryApi for DriftingApi {
    async fn quote_summary(&self, _symbol: &str, _modules: &[&str]) -> Result<Value, FondoError> {
        self.calls.fetch_add(1, Ordering::SeqCst);
        // transport-level success, but the expected module is gone
        Ok(json!({"quoteSummary": {"result": [{}]}}))
    }
}

#[tokio::test]
async fn missing_domain_subtree_surfaces_as_payload_shape() {
    let api = Arc::new(DriftingApi {
        calls: AtomicUsize::new(0),
    });
    let holdings = Holdings::new(api.clone(), "VTSAX");

    let err = holdings.top().await.unwrap_err();
    match err {
        FondoError::PayloadShape { what } => {
            assert!(what.contains("topHoldings"), "unexpected path: {what}");
        }
        other => panic!("expected payload-shape error, got {other:?}"),
    }
}

#[tokio::test]
async fn payload_shape_failures_are_not_cached() {
    let api = Arc::new(DriftingApi {
        calls: AtomicUsize::new(0),
    });
    let holdings = Holdings::new(api.clone(), "VTSAX");

    assert!(holdings.top().await.is_err());
    assert!(holdings.composition().await.is_err());
    // unlike the transport degrade, a shape failure leaves the slot unset
    assert_eq!(api.calls.load(Ordering::SeqCst), 2);
}

#[tokio::test]
async fn empty_result_list_is_also_schema_drift() {
    let api = <dyn QuoteSummaryApi>::from_fn(|_, _| Ok(json!({"quoteSummary": {"result": []}})));
    let holdings = Holdings::new(api, "VTSAX");
    assert!(matches!(
        holdings.top().await.unwrap_err(),
        FondoError::PayloadShape { .. }
    ));
}
