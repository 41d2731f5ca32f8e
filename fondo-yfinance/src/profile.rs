use std::sync::Arc;

use fondo_core::FondoError;
use scraper::{Html, Selector};
use tokio::sync::OnceCell;
use tracing::debug;

use crate::adapter::{PageApi, quote_page_url};
use crate::stylebox::StyleBox;

/// Morningstar style-box lookup scraped from the quote profile page.
///
/// The page was never designed for machine consumption, so there is no way
/// to distinguish "this fund has no style box" from "the markup changed";
/// every failure on this path, transport included, degrades to `None` with
/// debug-level logging and nothing is ever propagated.
pub struct Profile {
    pages: Arc<dyn PageApi>,
    symbol: String,
    slot: OnceCell<Option<StyleBox>>,
}

impl Profile {
    /// Create an accessor for `symbol`. Nothing is fetched until first use.
    pub fn new(pages: Arc<dyn PageApi>, symbol: impl Into<String>) -> Self {
        Self {
            pages,
            symbol: symbol.into(),
            slot: OnceCell::new(),
        }
    }

    /// The fund's Morningstar style box, if the profile page exposes one.
    pub async fn style_box(&self) -> Option<StyleBox> {
        *self.slot.get_or_init(|| self.scrape()).await
    }

    async fn scrape(&self) -> Option<StyleBox> {
        let url = quote_page_url(&self.symbol, "profile");
        let page = match self.pages.page(&url).await {
            Ok(page) => page,
            Err(e) => {
                debug!(symbol = %self.symbol, error = %e, "profile page fetch failed");
                return None;
            }
        };
        if !page.final_url.contains("/profile") {
            let e = FondoError::page_shape(format!(
                "redirected away from /profile: {}",
                page.final_url
            ));
            debug!(symbol = %self.symbol, error = %e, "profile page unavailable");
            return None;
        }
        let doc = Html::parse_document(&page.body);
        let selector = Selector::parse(r#"img[alt="Morningstar Style Box"]"#)
            .expect("valid style-box image selector");
        doc.select(&selector)
            .filter_map(|img| img.value().attr("src"))
            .find_map(StyleBox::from_image_url)
    }
}
