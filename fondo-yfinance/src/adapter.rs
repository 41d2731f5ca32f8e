use std::sync::Arc;

use async_trait::async_trait;
use fondo_core::FondoError;
use serde_json::Value;
use url::Url;

/// Yahoo's v10 quoteSummary API host.
const API_BASE: &str = "https://query1.finance.yahoo.com";
/// Quote-page host used by the scraping path.
const WEB_BASE: &str = "https://finance.yahoo.com";

const USER_AGENT: &str = "Mozilla/5.0 (X11; Linux x86_64) AppleWebKit/537.36 (KHTML, like Gecko) Chrome/122.0.0.0 Safari/537.36";

/// URL of a quote-page section, e.g. `/quote/VTSAX/holdings`.
#[must_use]
pub fn quote_page_url(symbol: &str, section: &str) -> String {
    format!("{WEB_BASE}/quote/{symbol}/{section}")
}

/// quoteSummary abstraction (so we can inject mocks in tests).
#[async_trait]
pub trait QuoteSummaryApi: Send + Sync {
    /// Fetch the requested modules for `symbol`, returning the raw JSON tree.
    ///
    /// A non-2xx response surfaces as [`FondoError::Transport`]; the payload
    /// is not inspected here beyond JSON decoding.
    async fn quote_summary(&self, symbol: &str, modules: &[&str]) -> Result<Value, FondoError>;
}

/// Page-fetch abstraction for the scraping path.
#[async_trait]
pub trait PageApi: Send + Sync {
    /// Fetch `url`, following redirects, and report the final URL reached.
    async fn page(&self, url: &str) -> Result<FetchedPage, FondoError>;
}

/// A fetched page body plus the URL the client actually landed on.
///
/// Yahoo answers requests for unknown sections with a redirect to the bare
/// quote page, so the final URL is the only redirect-away signal available.
#[derive(Debug, Clone)]
pub struct FetchedPage {
    /// Response body.
    pub body: String,
    /// Final URL after redirects.
    pub final_url: String,
}

/// Production adapter backed by a single `reqwest::Client`.
///
/// The client keeps a cookie store (Yahoo sets consent cookies) and a
/// browser user agent. Everything beyond issuing one request (retries,
/// caching, rate limiting, timeouts) is the caller's concern.
#[derive(Clone)]
pub struct YfAdapter {
    http: reqwest::Client,
    api_base: Url,
}

impl YfAdapter {
    /// Start building an adapter with the default Yahoo endpoints.
    #[must_use]
    pub fn builder() -> YfAdapterBuilder {
        YfAdapterBuilder::default()
    }

    /// Build with the default endpoints and a fresh HTTP client.
    ///
    /// # Panics
    /// Panics if the underlying `reqwest::Client` cannot be constructed,
    /// which is unexpected in normal environments.
    #[must_use]
    pub fn new_default() -> Self {
        Self::builder()
            .build()
            .expect("failed to build default Yahoo adapter")
    }
}

fn transport_err(e: &reqwest::Error) -> FondoError {
    FondoError::transport(e.status().map(|s| s.as_u16()), e.to_string())
}

#[async_trait]
impl QuoteSummaryApi for YfAdapter {
    async fn quote_summary(&self, symbol: &str, modules: &[&str]) -> Result<Value, FondoError> {
        let url = self
            .api_base
            .join(&format!("v10/finance/quoteSummary/{symbol}"))
            .map_err(|e| FondoError::Other(e.to_string()))?;
        let modules = modules.join(",");
        let resp = self
            .http
            .get(url)
            .query(&[
                ("modules", modules.as_str()),
                ("corsDomain", "finance.yahoo.com"),
                ("formatted", "false"),
            ])
            .send()
            .await
            .map_err(|e| transport_err(&e))?;
        let status = resp.status();
        if !status.is_success() {
            return Err(FondoError::transport(
                Some(status.as_u16()),
                format!("quoteSummary {symbol}: HTTP {status}"),
            ));
        }
        resp.json::<Value>().await.map_err(|e| transport_err(&e))
    }
}

#[async_trait]
impl PageApi for YfAdapter {
    async fn page(&self, url: &str) -> Result<FetchedPage, FondoError> {
        let resp = self
            .http
            .get(url)
            .send()
            .await
            .map_err(|e| transport_err(&e))?;
        let status = resp.status();
        if !status.is_success() {
            return Err(FondoError::transport(
                Some(status.as_u16()),
                format!("{url}: HTTP {status}"),
            ));
        }
        let final_url = resp.url().to_string();
        let body = resp.text().await.map_err(|e| transport_err(&e))?;
        Ok(FetchedPage { body, final_url })
    }
}

/// Builder for [`YfAdapter`].
///
/// The API base override exists so tests can point the adapter at a local
/// server; production callers normally only touch the user agent.
#[derive(Debug, Default)]
pub struct YfAdapterBuilder {
    api_base: Option<String>,
    user_agent: Option<String>,
}

impl YfAdapterBuilder {
    /// Override the quoteSummary API base URL.
    #[must_use]
    pub fn api_base(mut self, base: impl Into<String>) -> Self {
        self.api_base = Some(base.into());
        self
    }

    /// Override the user agent sent with every request.
    #[must_use]
    pub fn user_agent(mut self, agent: impl Into<String>) -> Self {
        self.user_agent = Some(agent.into());
        self
    }

    /// Build the adapter.
    ///
    /// # Errors
    /// Returns an error if the HTTP client cannot be constructed or the API
    /// base does not parse as a URL.
    pub fn build(self) -> Result<YfAdapter, FondoError> {
        let http = reqwest::Client::builder()
            .cookie_store(true)
            .gzip(true)
            .user_agent(self.user_agent.as_deref().unwrap_or(USER_AGENT))
            .build()
            .map_err(|e| FondoError::Other(e.to_string()))?;
        let mut base = self.api_base.unwrap_or_else(|| API_BASE.to_string());
        if !base.ends_with('/') {
            base.push('/');
        }
        let api_base = Url::parse(&base).map_err(|e| FondoError::Other(e.to_string()))?;
        Ok(YfAdapter { http, api_base })
    }
}

/* -------- Lightweight fn-backed adapters for tests and fixtures ------- */

impl dyn QuoteSummaryApi {
    /// Build a `QuoteSummaryApi` from a closure.
    pub fn from_fn<F>(f: F) -> Arc<dyn QuoteSummaryApi>
    where
        F: Send + Sync + 'static + Fn(String, Vec<String>) -> Result<Value, FondoError>,
    {
        struct FnApi<F>(F);
        #[async_trait]
        impl<F> QuoteSummaryApi for FnApi<F>
        where
            F: Send + Sync + 'static + Fn(String, Vec<String>) -> Result<Value, FondoError>,
        {
            async fn quote_summary(
                &self,
                symbol: &str,
                modules: &[&str],
            ) -> Result<Value, FondoError> {
                (self.0)(
                    symbol.to_string(),
                    modules.iter().map(ToString::to_string).collect(),
                )
            }
        }
        Arc::new(FnApi(f))
    }
}

impl dyn PageApi {
    /// Build a `PageApi` from a closure.
    pub fn from_fn<F>(f: F) -> Arc<dyn PageApi>
    where
        F: Send + Sync + 'static + Fn(String) -> Result<FetchedPage, FondoError>,
    {
        struct FnPages<F>(F);
        #[async_trait]
        impl<F> PageApi for FnPages<F>
        where
            F: Send + Sync + 'static + Fn(String) -> Result<FetchedPage, FondoError>,
        {
            async fn page(&self, url: &str) -> Result<FetchedPage, FondoError> {
                (self.0)(url.to_string())
            }
        }
        Arc::new(FnPages(f))
    }
}
