use std::sync::Arc;

use fondo_core::{Column, ColumnFormat, FondoError, Table, TableSource, extract};
use serde_json::{Map, Value};
use tokio::sync::OnceCell;
use tracing::error;

use crate::adapter::QuoteSummaryApi;
use crate::stylebox::StyleBox;

const MODULES: &[&str] = &["fundPerformance", "fundProfile"];

/// Overview fields lifted from the fund profile, in display order.
const OVERVIEW_KEYS: &[&str] = &["family", "categoryName", "legalType"];

#[derive(Debug, Clone)]
struct PerformanceTables {
    trailing: Table,
    annual: Table,
    overview: Table,
}

impl PerformanceTables {
    fn empty() -> Self {
        Self {
            trailing: Table::empty(),
            annual: Table::empty(),
            overview: Table::empty(),
        }
    }
}

/// Lazy performance accessor for one fund symbol, backed by the
/// `fundPerformance` and `fundProfile` quoteSummary modules.
///
/// Failure policy matches [`crate::Holdings`]: transport failures degrade
/// every table to empty, a successful payload missing either module
/// surfaces as [`FondoError::PayloadShape`].
pub struct Performance {
    api: Arc<dyn QuoteSummaryApi>,
    symbol: String,
    tables: OnceCell<PerformanceTables>,
}

impl Performance {
    /// Create an accessor for `symbol`. Nothing is fetched until first use.
    pub fn new(api: Arc<dyn QuoteSummaryApi>, symbol: impl Into<String>) -> Self {
        Self {
            api,
            symbol: symbol.into(),
            tables: OnceCell::new(),
        }
    }

    /// Trailing NAV returns (ytd, one/three/five year, …).
    pub async fn trailing_returns(&self) -> Result<Table, FondoError> {
        Ok(self.load().await?.trailing.clone())
    }

    /// Annual total returns keyed by fiscal year, in payload order.
    pub async fn annual_returns(&self) -> Result<Table, FondoError> {
        Ok(self.load().await?.annual.clone())
    }

    /// Fund family, category, legal type, and the decoded Morningstar
    /// style-box rating (the rating row is absent when the payload carries
    /// no decodable style-box image).
    pub async fn fund_overview(&self) -> Result<Table, FondoError> {
        Ok(self.load().await?.overview.clone())
    }

    async fn load(&self) -> Result<&PerformanceTables, FondoError> {
        self.tables
            .get_or_try_init(|| async {
                let payload = match self.api.quote_summary(&self.symbol, MODULES).await {
                    Ok(v) => v,
                    Err(e) if e.is_transport() => {
                        error!(symbol = %self.symbol, error = %e, "performance fetch failed, degrading to empty tables");
                        return Ok(PerformanceTables::empty());
                    }
                    Err(e) => return Err(e),
                };
                parse(&payload)
            })
            .await
    }
}

fn parse(payload: &Value) -> Result<PerformanceTables, FondoError> {
    let result = extract::get_path(payload, &["quoteSummary", "result"])
        .and_then(|r| r.get(0))
        .and_then(Value::as_object)
        .ok_or_else(|| FondoError::payload_shape("quoteSummary.result[0]"))?;
    let performance = result
        .get("fundPerformance")
        .and_then(Value::as_object)
        .ok_or_else(|| FondoError::payload_shape("quoteSummary.result[0].fundPerformance"))?;
    let profile = result
        .get("fundProfile")
        .and_then(Value::as_object)
        .ok_or_else(|| FondoError::payload_shape("quoteSummary.result[0].fundProfile"))?;
    Ok(PerformanceTables {
        trailing: trailing_table(performance),
        annual: annual_table(performance),
        overview: overview_table(profile),
    })
}

fn trailing_table(performance: &Map<String, Value>) -> Table {
    let pairs = performance
        .get("trailingReturnsNav")
        .and_then(Value::as_object)
        .map(|obj| obj.iter().map(|(k, v)| (k.clone(), v.clone())).collect())
        .unwrap_or_default();
    Table::build(TableSource::ScalarMap {
        pairs,
        column: Column::new("pct", ColumnFormat::Percent),
    })
}

fn annual_table(performance: &Map<String, Value>) -> Table {
    let rows = performance
        .get("annualTotalReturns")
        .and_then(|v| v.get("returns"))
        .and_then(Value::as_array)
        .map(|items| {
            items
                .iter()
                .filter_map(Value::as_object)
                .cloned()
                .collect()
        })
        .unwrap_or_default();
    Table::build(TableSource::Records {
        index_field: "year".into(),
        rows,
        formats: vec![("annualValue".into(), ColumnFormat::Percent)],
    })
}

fn overview_table(profile: &Map<String, Value>) -> Table {
    let mut pairs = extract::subdict(profile, OVERVIEW_KEYS);
    if let Some(rating) = profile
        .get("styleBoxUrl")
        .and_then(Value::as_str)
        .and_then(StyleBox::from_image_url)
    {
        pairs.push((
            "morningStarRating".to_string(),
            Value::String(rating.to_string()),
        ));
    }
    Table::build(TableSource::ScalarMap {
        pairs,
        column: Column::new("value", ColumnFormat::Text),
    })
}
