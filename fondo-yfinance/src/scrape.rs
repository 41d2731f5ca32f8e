use std::sync::Arc;

use fondo_core::{Column, ColumnFormat, FondoError, GridHeader, Table, TableSource, reshape};
use scraper::{ElementRef, Html, Selector};
use tokio::sync::OnceCell;
use tracing::debug;

use crate::adapter::{PageApi, quote_page_url};

/// Section classifier for one quote page.
///
/// The page offers no stable structural markers, so matching is a
/// best-effort signature: a container class plus a known title text.
/// Relevant sections are rendered as a container holding exactly two
/// element children, a title block and a value block; the title text is
/// compared against the allow-list because many unrelated two-child blocks
/// exist on the same page. When Yahoo reshuffles its markup only this
/// configuration needs to change, not the harvesting below it.
#[derive(Debug, Clone, Copy)]
pub struct SectionMatcher {
    /// CSS selector for candidate section containers.
    pub container: &'static str,
    /// Titles that identify relevant sections.
    pub titles: &'static [&'static str],
}

/// Matcher for the `/holdings` page sections.
pub const HOLDINGS_SECTIONS: SectionMatcher = SectionMatcher {
    container: r#"div[class="Mstart(a) Mend(a)"]"#,
    titles: &[
        "Overall Portfolio Composition (%)",
        "Sector Weightings (%)",
        "Bond Ratings",
        "Equity Holdings",
        "Bond Holdings",
    ],
};

/// Matcher for the `/performance` page sections.
pub const PERFORMANCE_SECTIONS: SectionMatcher = SectionMatcher {
    container: r#"div[class="Mb(25px)"]"#,
    titles: &["Annual Total Return (%) History"],
};

impl SectionMatcher {
    /// Collect `(title, value-block text tokens)` for every matching
    /// section. Containers without exactly two element children, or whose
    /// title is not in the allow-list, are ignored; a selector or document
    /// that matches nothing yields an empty vec, never an error.
    #[must_use]
    pub fn sections(&self, doc: &Html) -> Vec<(&'static str, Vec<String>)> {
        let Ok(selector) = Selector::parse(self.container) else {
            let e = FondoError::page_shape(format!("invalid section selector: {}", self.container));
            debug!(error = %e, "section matching skipped");
            return Vec::new();
        };
        let mut out = Vec::new();
        for el in doc.select(&selector) {
            let children: Vec<ElementRef> = el.children().filter_map(ElementRef::wrap).collect();
            let &[title_el, body_el] = children.as_slice() else {
                continue;
            };
            let title = collapsed_text(title_el);
            let Some(&canonical) = self.titles.iter().find(|t| **t == title) else {
                continue;
            };
            out.push((canonical, text_tokens(body_el)));
        }
        out
    }
}

fn collapsed_text(el: ElementRef) -> String {
    el.text().collect::<String>().trim().to_string()
}

/// Every non-empty, trimmed text node under `el`, in document order.
fn text_tokens(el: ElementRef) -> Vec<String> {
    el.text()
        .map(str::trim)
        .filter(|t| !t.is_empty())
        .map(str::to_string)
        .collect()
}

fn pair_table(tokens: Vec<String>, column: Column) -> Table {
    Table::build(TableSource::TokenGrid {
        rows: reshape::rows(tokens, 2),
        header: GridHeader::None,
        column,
    })
}

#[derive(Debug, Clone)]
struct HoldingsPageTables {
    composition: Table,
    sector: Table,
    bond_ratings: Table,
    equity: Table,
    bond: Table,
}

impl HoldingsPageTables {
    fn empty() -> Self {
        Self {
            composition: Table::empty(),
            sector: Table::empty(),
            bond_ratings: Table::empty(),
            equity: Table::empty(),
            bond: Table::empty(),
        }
    }
}

/// Fallback holdings extraction scraped from the `/holdings` quote page.
///
/// [`crate::Holdings`] over the JSON API is the canonical source; use this
/// only where the API is unavailable. Accessors return plain tables: the
/// scraping path cannot tell "feature absent for this symbol" from "page
/// shape changed", so every mismatch silently yields empty tables.
pub struct HoldingsPage {
    pages: Arc<dyn PageApi>,
    symbol: String,
    tables: OnceCell<HoldingsPageTables>,
}

impl HoldingsPage {
    /// Create an accessor for `symbol`. Nothing is fetched until first use.
    pub fn new(pages: Arc<dyn PageApi>, symbol: impl Into<String>) -> Self {
        Self {
            pages,
            symbol: symbol.into(),
            tables: OnceCell::new(),
        }
    }

    /// Asset-class composition weightings.
    pub async fn composition(&self) -> Table {
        self.load().await.composition.clone()
    }

    /// Sector weightings.
    pub async fn sector_weightings(&self) -> Table {
        self.load().await.sector.clone()
    }

    /// Bond credit-rating weightings.
    pub async fn bond_ratings(&self) -> Table {
        self.load().await.bond_ratings.clone()
    }

    /// Equity valuation statistics.
    pub async fn equity_holdings(&self) -> Table {
        self.load().await.equity.clone()
    }

    /// Bond portfolio statistics.
    pub async fn bond_holdings(&self) -> Table {
        self.load().await.bond.clone()
    }

    async fn load(&self) -> &HoldingsPageTables {
        self.tables.get_or_init(|| self.scrape()).await
    }

    async fn scrape(&self) -> HoldingsPageTables {
        let url = quote_page_url(&self.symbol, "holdings");
        let Some(doc) = fetch_section_page(self.pages.as_ref(), &url, "/holdings").await else {
            return HoldingsPageTables::empty();
        };
        let mut tables = HoldingsPageTables::empty();
        for (title, tokens) in HOLDINGS_SECTIONS.sections(&doc) {
            match title {
                "Overall Portfolio Composition (%)" => {
                    tables.composition = pair_table(tokens, Column::new("pct", ColumnFormat::Percent));
                }
                "Sector Weightings (%)" => {
                    tables.sector = pair_table(tokens, Column::new("pct", ColumnFormat::Percent));
                }
                "Bond Ratings" => {
                    tables.bond_ratings = pair_table(tokens, Column::new("pct", ColumnFormat::Percent));
                }
                "Equity Holdings" => {
                    tables.equity = pair_table(tokens, Column::new("value", ColumnFormat::Decimal));
                }
                "Bond Holdings" => {
                    tables.bond = pair_table(tokens, Column::new("value", ColumnFormat::Decimal));
                }
                _ => {}
            }
        }
        tables
    }
}

/// Fallback performance extraction scraped from the `/performance` page.
///
/// Same caveats as [`HoldingsPage`]; the JSON-backed
/// [`crate::Performance`] is the canonical source.
pub struct PerformancePage {
    pages: Arc<dyn PageApi>,
    symbol: String,
    table: OnceCell<Table>,
}

impl PerformancePage {
    /// Create an accessor for `symbol`. Nothing is fetched until first use.
    pub fn new(pages: Arc<dyn PageApi>, symbol: impl Into<String>) -> Self {
        Self {
            pages,
            symbol: symbol.into(),
            table: OnceCell::new(),
        }
    }

    /// Annual total return history as rendered on the page: the first grid
    /// row is the header, the first column the year index.
    pub async fn annual_returns(&self) -> Table {
        self.table.get_or_init(|| self.scrape()).await.clone()
    }

    async fn scrape(&self) -> Table {
        let url = quote_page_url(&self.symbol, "performance");
        let Some(doc) = fetch_section_page(self.pages.as_ref(), &url, "/performance").await else {
            return Table::empty();
        };
        PERFORMANCE_SECTIONS
            .sections(&doc)
            .into_iter()
            .find(|(title, _)| *title == "Annual Total Return (%) History")
            .map(|(_, tokens)| {
                Table::build(TableSource::TokenGrid {
                    rows: reshape::rows(tokens, 2),
                    header: GridHeader::FirstRow,
                    column: Column::new("pct", ColumnFormat::Percent),
                })
            })
            .unwrap_or_else(Table::empty)
    }
}

/// Fetch a quote-page section and parse it, degrading to `None` on any
/// transport failure or when the response redirected away from the section
/// (Yahoo's signal that the section does not exist for this symbol).
async fn fetch_section_page(pages: &dyn PageApi, url: &str, section_path: &str) -> Option<Html> {
    let page = match pages.page(url).await {
        Ok(page) => page,
        Err(e) => {
            debug!(url, error = %e, "section page fetch failed");
            return None;
        }
    };
    if !page.final_url.contains(section_path) {
        let e = FondoError::page_shape(format!(
            "redirected away from {section_path}: {}",
            page.final_url
        ));
        debug!(url, error = %e, "section page unavailable");
        return None;
    }
    Some(Html::parse_document(&page.body))
}
