use std::sync::Arc;
use std::sync::atomic::{AtomicUsize, Ordering};

use async_trait::async_trait;
use fondo_core::FondoError;
use fondo_yfinance::adapter::QuoteSummaryApi;
use fondo_yfinance::{Holdings, Performance};
use serde_json::Value;

struct FailingApi {
    calls: AtomicUsize,
}

#[async_trait]
impl QuoteSummaryApi for FailingApi {
    async fn quote_summary(&self, _symbol: &str, _modules: &[&str]) -> Result<Value, FondoError> {
        self.calls.fetch_add(1, Ordering::SeqCst);
        Err(FondoError::transport(Some(500), "HTTP 500 Server Error"))
    }
}

#[tokio::test]
async fn holdings_degrade_to_empty_tables_on_transport_failure() {
    let api = Arc::new(FailingApi {
        calls: AtomicUsize::new(0),
    });
    let holdings = Holdings::new(api.clone(), "VTSAX");

    assert!(holdings.top().await.unwrap().is_empty());
    assert!(holdings.composition().await.unwrap().is_empty());
    assert!(holdings.sector_weightings().await.unwrap().is_empty());
    assert!(holdings.bond_ratings().await.unwrap().is_empty());
    assert!(holdings.equity_holdings().await.unwrap().is_empty());
    assert!(holdings.bond_holdings().await.unwrap().is_empty());

    // the degraded state is terminal: no accessor retried the fetch
    assert_eq!(api.calls.load(Ordering::SeqCst), 1);
}

#[tokio::test]
async fn performance_degrades_to_empty_tables_on_transport_failure() {
    let api = Arc::new(FailingApi {
        calls: AtomicUsize::new(0),
    });
    let performance = Performance::new(api.clone(), "VFIAX");

    assert!(performance.trailing_returns().await.unwrap().is_empty());
    assert!(performance.annual_returns().await.unwrap().is_empty());
    assert!(performance.fund_overview().await.unwrap().is_empty());
    assert_eq!(api.calls.load(Ordering::SeqCst), 1);
}
