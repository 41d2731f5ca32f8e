use std::sync::Arc;
use std::sync::atomic::{AtomicUsize, Ordering};

use async_trait::async_trait;
use fondo_core::FondoError;
use fondo_yfinance::adapter::{FetchedPage, PageApi};
use fondo_yfinance::{Profile, StyleBox};

const PROFILE_BODY: &str = r#"<html><body>
<section><h1>Vanguard 500 Index Fund</h1></section>
<img alt="Fund logo" src="https://s.yimg.com/logo.png">
<img alt="Morningstar Style Box" src="https://s.yimg.com/lq/i/fi/3_0stylelargeeq2.gif">
</body></html>"#;

#[tokio::test]
async fn style_box_is_decoded_from_the_profile_page() {
    let pages = <dyn PageApi>::from_fn(|url| {
        assert_eq!(url, "https://finance.yahoo.com/quote/VFIAX/profile");
        Ok(FetchedPage {
            body: PROFILE_BODY.into(),
            final_url: url,
        })
    });
    let profile = Profile::new(pages, "VFIAX");

    assert_eq!(profile.style_box().await, Some(StyleBox::LargeBlend));
}

#[tokio::test]
async fn redirect_away_from_profile_yields_none() {
    let pages = <dyn PageApi>::from_fn(|_| {
        Ok(FetchedPage {
            body: PROFILE_BODY.into(),
            final_url: "https://finance.yahoo.com/quote/VFIAX".into(),
        })
    });
    let profile = Profile::new(pages, "VFIAX");

    assert_eq!(profile.style_box().await, None);
}

#[tokio::test]
async fn transport_failure_on_the_scrape_path_yields_none() {
    let pages =
        <dyn PageApi>::from_fn(|_| Err(FondoError::transport(Some(503), "HTTP 503 Unavailable")));
    let profile = Profile::new(pages, "VFIAX");

    assert_eq!(profile.style_box().await, None);
}

#[tokio::test]
async fn page_without_a_style_box_yields_none() {
    let pages = <dyn PageApi>::from_fn(|url| {
        Ok(FetchedPage {
            body: "<html><body><p>no images here</p></body></html>".into(),
            final_url: url,
        })
    });
    let profile = Profile::new(pages, "VFIAX");

    assert_eq!(profile.style_box().await, None);
}

struct CountingPages {
    calls: AtomicUsize,
}

#[async_trait]
impl PageApi for CountingPages {
    async fn page(&self, url: &str) -> Result<FetchedPage, FondoError> {
        self.calls.fetch_add(1, Ordering::SeqCst);
        Ok(FetchedPage {
            body: PROFILE_BODY.into(),
            final_url: url.to_string(),
        })
    }
}

#[tokio::test]
async fn style_box_is_fetched_once_per_instance() {
    let pages = Arc::new(CountingPages {
        calls: AtomicUsize::new(0),
    });
    let profile = Profile::new(pages.clone(), "VFIAX");

    let first = profile.style_box().await;
    let second = profile.style_box().await;
    assert_eq!(first, second);
    assert_eq!(pages.calls.load(Ordering::SeqCst), 1);
}
