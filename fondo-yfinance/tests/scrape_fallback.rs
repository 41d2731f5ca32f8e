use fondo_core::{Cell, FondoError};
use fondo_yfinance::adapter::{FetchedPage, PageApi};
use fondo_yfinance::scrape::{HoldingsPage, PerformancePage};

const HOLDINGS_BODY: &str = r#"<html><body>
<div class="Mstart(a) Mend(a)">
  <div><span>Overall Portfolio Composition (%)</span></div>
  <div>
    <div><span>Stocks</span><span>96.50%</span></div>
    <div><span>Bonds</span><span>3.50%</span></div>
  </div>
</div>
<div class="Mstart(a) Mend(a)">
  <div><span>Equity Holdings</span></div>
  <div>
    <div><span>Price/Earnings</span><span>19.99</span></div>
    <div><span>Price/Book</span><span>3.49</span></div>
  </div>
</div>
<div class="Mstart(a) Mend(a)">
  <div><span>Fees &amp; Expenses</span></div>
  <div><span>Annual Report Expense Ratio</span><span>0.04%</span></div>
</div>
<div class="Mstart(a) Mend(a)">
  <div>one</div><div>two</div><div>three</div>
</div>
</body></html>"#;

const PERFORMANCE_BODY: &str = r#"<html><body>
<div class="Mb(25px)">
  <div><h3>Annual Total Return (%) History</h3></div>
  <div>
    <div><span>Year</span><span>Total Return</span></div>
    <div><span>2023</span><span>26.11%</span></div>
    <div><span>2022</span><span>-19.44%</span></div>
  </div>
</div>
</body></html>"#;

fn serve(body: &'static str) -> std::sync::Arc<dyn PageApi> {
    <dyn PageApi>::from_fn(move |url| {
        Ok(FetchedPage {
            body: body.into(),
            final_url: url,
        })
    })
}

#[tokio::test]
async fn matched_sections_become_tables_and_unlisted_titles_are_ignored() {
    let page = HoldingsPage::new(serve(HOLDINGS_BODY), "VTSAX");

    let composition = page.composition().await;
    assert_eq!(composition.len(), 2);
    assert_eq!(composition.get("Stocks", "pct"), Some(&Cell::Num(0.965)));
    assert_eq!(composition.render("Bonds", "pct").as_deref(), Some("3.50%"));

    let equity = page.equity_holdings().await;
    assert_eq!(equity.render("Price/Earnings", "value").as_deref(), Some("19.99"));

    // "Fees & Expenses" is a two-child block but not in the allow-list,
    // and nothing on this page mentioned sectors
    assert!(page.sector_weightings().await.is_empty());
    assert!(page.bond_ratings().await.is_empty());
    assert!(page.bond_holdings().await.is_empty());
}

#[tokio::test]
async fn redirect_away_yields_empty_tables() {
    let pages = <dyn PageApi>::from_fn(|_| {
        Ok(FetchedPage {
            body: HOLDINGS_BODY.into(),
            final_url: "https://finance.yahoo.com/quote/AAPL".into(),
        })
    });
    let page = HoldingsPage::new(pages, "AAPL");

    assert!(page.composition().await.is_empty());
    assert!(page.equity_holdings().await.is_empty());
}

#[tokio::test]
async fn transport_failure_yields_empty_tables_without_error() {
    let pages = <dyn PageApi>::from_fn(|_| Err(FondoError::transport(None, "connection refused")));
    let page = HoldingsPage::new(pages, "VTSAX");

    assert!(page.composition().await.is_empty());
}

#[tokio::test]
async fn junk_markup_yields_empty_tables() {
    let page = HoldingsPage::new(serve("<html><body><table></table></body></html>"), "VTSAX");
    assert!(page.composition().await.is_empty());
    assert!(page.sector_weightings().await.is_empty());
}

#[tokio::test]
async fn annual_return_history_uses_the_first_row_as_header() {
    let page = PerformancePage::new(serve(PERFORMANCE_BODY), "VFIAX");

    let annual = page.annual_returns().await;
    assert_eq!(annual.index_label(), "Year");
    let years: Vec<&str> = annual.row_labels().collect();
    assert_eq!(years, ["2023", "2022"]);
    assert_eq!(annual.render("2023", "Total Return").as_deref(), Some("26.11%"));
    let stored = annual
        .get("2022", "Total Return")
        .and_then(Cell::as_f64)
        .unwrap();
    assert!((stored + 0.1944).abs() < 1e-12);
}

#[tokio::test]
async fn performance_page_without_the_section_is_empty() {
    let page = PerformancePage::new(serve("<html><body></body></html>"), "VFIAX");
    assert!(page.annual_returns().await.is_empty());
}
