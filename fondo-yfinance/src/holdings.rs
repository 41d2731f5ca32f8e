use std::sync::Arc;

use fondo_core::{Column, ColumnFormat, FondoError, Table, TableSource, extract};
use serde_json::{Map, Value};
use tokio::sync::OnceCell;
use tracing::error;

use crate::adapter::QuoteSummaryApi;

const MODULES: &[&str] = &["topHoldings"];

/// Asset-class composition keys reported by the module, in display order.
const COMPOSITION_KEYS: &[&str] = &[
    "cashPosition",
    "stockPosition",
    "bondPosition",
    "preferredPosition",
    "convertiblePosition",
    "otherPosition",
];

#[derive(Debug, Clone)]
struct HoldingsTables {
    top: Table,
    composition: Table,
    sector: Table,
    bond_ratings: Table,
    equity: Table,
    bond: Table,
}

impl HoldingsTables {
    fn empty() -> Self {
        Self {
            top: Table::empty(),
            composition: Table::empty(),
            sector: Table::empty(),
            bond_ratings: Table::empty(),
            equity: Table::empty(),
            bond: Table::empty(),
        }
    }
}

/// Lazy holdings accessor for one fund symbol, backed by the `topHoldings`
/// quoteSummary module.
///
/// The first accessor call fetches and parses the module once; every later
/// call on any accessor reads the cached tables. A transport failure
/// degrades the whole set to empty tables (logged, not propagated); a
/// successful payload that lacks the `topHoldings` subtree surfaces as
/// [`FondoError::PayloadShape`], since that signals upstream schema drift
/// rather than a transient fault.
pub struct Holdings {
    api: Arc<dyn QuoteSummaryApi>,
    symbol: String,
    tables: OnceCell<HoldingsTables>,
}

impl Holdings {
    /// Create an accessor for `symbol`. Nothing is fetched until first use.
    pub fn new(api: Arc<dyn QuoteSummaryApi>, symbol: impl Into<String>) -> Self {
        Self {
            api,
            symbol: symbol.into(),
            tables: OnceCell::new(),
        }
    }

    /// Top holdings keyed by ticker symbol.
    pub async fn top(&self) -> Result<Table, FondoError> {
        Ok(self.load().await?.top.clone())
    }

    /// Asset-class composition weightings.
    pub async fn composition(&self) -> Result<Table, FondoError> {
        Ok(self.load().await?.composition.clone())
    }

    /// Sector weightings.
    pub async fn sector_weightings(&self) -> Result<Table, FondoError> {
        Ok(self.load().await?.sector.clone())
    }

    /// Bond credit-rating weightings.
    pub async fn bond_ratings(&self) -> Result<Table, FondoError> {
        Ok(self.load().await?.bond_ratings.clone())
    }

    /// Equity valuation statistics (fund and category).
    pub async fn equity_holdings(&self) -> Result<Table, FondoError> {
        Ok(self.load().await?.equity.clone())
    }

    /// Bond portfolio statistics (fund and category).
    pub async fn bond_holdings(&self) -> Result<Table, FondoError> {
        Ok(self.load().await?.bond.clone())
    }

    async fn load(&self) -> Result<&HoldingsTables, FondoError> {
        self.tables
            .get_or_try_init(|| async {
                let payload = match self.api.quote_summary(&self.symbol, MODULES).await {
                    Ok(v) => v,
                    Err(e) if e.is_transport() => {
                        error!(symbol = %self.symbol, error = %e, "holdings fetch failed, degrading to empty tables");
                        return Ok(HoldingsTables::empty());
                    }
                    Err(e) => return Err(e),
                };
                parse(&payload)
            })
            .await
    }
}

fn parse(payload: &Value) -> Result<HoldingsTables, FondoError> {
    let data = extract::get_path(payload, &["quoteSummary", "result"])
        .and_then(|r| r.get(0))
        .and_then(|r| r.get("topHoldings"))
        .and_then(Value::as_object)
        .ok_or_else(|| FondoError::payload_shape("quoteSummary.result[0].topHoldings"))?;
    Ok(HoldingsTables {
        top: top_table(data),
        composition: Table::build(TableSource::ScalarMap {
            pairs: extract::subdict(data, COMPOSITION_KEYS),
            column: pct_column(),
        }),
        sector: weighting_table(data, "sectorWeightings"),
        bond_ratings: weighting_table(data, "bondRatings"),
        equity: nested_scalar_table(data, "equityHoldings"),
        bond: nested_scalar_table(data, "bondHoldings"),
    })
}

fn pct_column() -> Column {
    Column::new("pct", ColumnFormat::Percent)
}

fn top_table(data: &Map<String, Value>) -> Table {
    let rows = data
        .get("holdings")
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
        index_field: "symbol".into(),
        rows,
        formats: vec![("holdingPercent".into(), ColumnFormat::Percent)],
    })
}

/// Flatten a list of single-entry weighting objects
/// (`[{"technology": 0.31}, {"healthcare": 0.12}, …]`) into ordered pairs.
fn weighting_table(data: &Map<String, Value>, key: &str) -> Table {
    let mut pairs = Vec::new();
    if let Some(items) = data.get(key).and_then(Value::as_array) {
        for item in items {
            if let Some(obj) = item.as_object() {
                for (k, v) in obj {
                    pairs.push((k.clone(), v.clone()));
                }
            }
        }
    }
    Table::build(TableSource::ScalarMap {
        pairs,
        column: pct_column(),
    })
}

fn nested_scalar_table(data: &Map<String, Value>, key: &str) -> Table {
    let pairs = data
        .get(key)
        .and_then(Value::as_object)
        .map(|obj| obj.iter().map(|(k, v)| (k.clone(), v.clone())).collect())
        .unwrap_or_default();
    Table::build(TableSource::ScalarMap {
        pairs,
        column: Column::new("value", ColumnFormat::Decimal),
    })
}
