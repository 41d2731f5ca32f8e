//! fondo-yfinance
//!
//! Yahoo Finance acquisition layer for the fondo ecosystem. Extracts fund
//! holdings, performance, and profile/rating data and normalizes it into
//! [`fondo_core::Table`]s.
//!
//! The `quoteSummary` JSON API is the canonical acquisition path
//! ([`Holdings`], [`Performance`]); the quote-page scrapers ([`Profile`],
//! [`scrape::HoldingsPage`], [`scrape::PerformancePage`]) are a best-effort
//! fallback for data the API does not expose or environments where it is
//! unavailable.
//!
//! Controllers are lazy: nothing is fetched until the first accessor call,
//! and one fetch feeds every accessor of the instance.
//!
//! ```no_run
//! use std::sync::Arc;
//! use fondo_yfinance::{FondoError, Holdings, adapter::{QuoteSummaryApi, YfAdapter}};
//!
//! # async fn demo() -> Result<(), FondoError> {
//! let api: Arc<dyn QuoteSummaryApi> = Arc::new(YfAdapter::new_default());
//! let holdings = Holdings::new(api, "VTSAX");
//! println!("{}", holdings.top().await?);
//! # Ok(())
//! # }
//! ```
#![warn(missing_docs)]

/// Adapter traits and the production adapter backed by `reqwest`.
pub mod adapter;
/// Holdings section controller (JSON API).
pub mod holdings;
/// Performance section controller (JSON API).
pub mod performance;
/// Profile section controller (quote-page scrape).
pub mod profile;
/// HTML section matching and the page-scrape fallback controllers.
pub mod scrape;
/// Morningstar style-box rating decoding.
pub mod stylebox;

pub use adapter::{FetchedPage, PageApi, QuoteSummaryApi, YfAdapter, YfAdapterBuilder};
pub use fondo_core::{Cell, Column, ColumnFormat, FondoError, Table};
pub use holdings::Holdings;
pub use performance::Performance;
pub use profile::Profile;
pub use stylebox::StyleBox;
