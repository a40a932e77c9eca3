//! HTTP fetching and HTML querying.
//!
//! [`DocumentFetcher`] performs exactly one GET per call (no retries) and
//! parses the body into a [`ParsedDocument`]. The [`Query`] trait gives the
//! document and any element inside it the same `find` / `find_all` surface,
//! driven by CSS selectors.

use std::time::Duration;

use itertools::Itertools;
use reqwest::Client;
use scraper::{ElementRef, Html, Selector};
use tracing::{debug, instrument};
use url::Url;

use crate::error::{FetchError, StructureError};

/// User-Agent string for every request.
const USER_AGENT: &str = concat!("canopy_scraper/", env!("CARGO_PKG_VERSION"));

/// Parse a CSS selector, mapping the borrowed parser error to an owned one.
pub fn selector(css: &str) -> Result<Selector, StructureError> {
    Selector::parse(css).map_err(|e| StructureError::Selector {
        selector: css.to_string(),
        message: e.to_string(),
    })
}

/// Selector-driven lookups over a document or a subtree.
pub trait Query {
    /// First matching descendant, if any.
    fn find(&self, css: &str) -> Result<Option<ElementRef<'_>>, StructureError>;

    /// Every matching descendant in document order.
    fn find_all(&self, css: &str) -> Result<Vec<ElementRef<'_>>, StructureError>;
}

impl Query for Html {
    fn find(&self, css: &str) -> Result<Option<ElementRef<'_>>, StructureError> {
        let sel = selector(css)?;
        Ok(self.select(&sel).next())
    }

    fn find_all(&self, css: &str) -> Result<Vec<ElementRef<'_>>, StructureError> {
        let sel = selector(css)?;
        Ok(self.select(&sel).collect())
    }
}

impl Query for ElementRef<'_> {
    fn find(&self, css: &str) -> Result<Option<ElementRef<'_>>, StructureError> {
        let sel = selector(css)?;
        Ok(self.select(&sel).next())
    }

    fn find_all(&self, css: &str) -> Result<Vec<ElementRef<'_>>, StructureError> {
        let sel = selector(css)?;
        Ok(self.select(&sel).collect())
    }
}

/// Concatenated, trimmed text content of an element.
pub fn text_of(element: &ElementRef<'_>) -> String {
    element.text().join("").trim().to_string()
}

/// A fetched page: its final URL plus the parsed tree.
#[derive(Debug, Clone)]
pub struct ParsedDocument {
    url: Url,
    html: Html,
}

impl ParsedDocument {
    /// Parse `body` as a full HTML document served from `url`.
    ///
    /// html5ever recovers from any malformed markup, so parsing itself never fails.
    pub fn parse(url: Url, body: &str) -> Self {
        Self {
            url,
            html: Html::parse_document(body),
        }
    }

    pub fn url(&self) -> &Url {
        &self.url
    }

    pub fn html(&self) -> &Html {
        &self.html
    }

    /// Resolve an `href` found on this page to an absolute URL.
    pub fn resolve(&self, href: &str) -> Result<Url, FetchError> {
        resolve(&self.url, href)
    }
}

impl Query for ParsedDocument {
    fn find(&self, css: &str) -> Result<Option<ElementRef<'_>>, StructureError> {
        self.html.find(css)
    }

    fn find_all(&self, css: &str) -> Result<Vec<ElementRef<'_>>, StructureError> {
        self.html.find_all(css)
    }
}

/// Join `href` onto `base`. Absolute hrefs replace the base entirely.
pub fn resolve(base: &Url, href: &str) -> Result<Url, FetchError> {
    base.join(href.trim()).map_err(|source| FetchError::InvalidUrl {
        href: href.to_string(),
        source,
    })
}

/// Single-attempt HTTP fetcher shared by every scraper stage.
#[derive(Debug, Clone)]
pub struct DocumentFetcher {
    client: Client,
}

impl DocumentFetcher {
    /// Build a fetcher whose requests give up after `timeout`.
    pub fn new(timeout: Duration) -> Result<Self, FetchError> {
        let client = Client::builder()
            .user_agent(USER_AGENT)
            .redirect(reqwest::redirect::Policy::limited(5))
            .timeout(timeout)
            .build()
            .map_err(FetchError::Client)?;
        Ok(Self { client })
    }

    /// GET `url` and parse the response body.
    ///
    /// # Errors
    ///
    /// [`FetchError::Transport`] when the request or body read fails, and
    /// [`FetchError::Status`] for any non-2xx response.
    #[instrument(level = "debug", skip_all, fields(%url))]
    pub async fn fetch(&self, url: &Url) -> Result<ParsedDocument, FetchError> {
        let transport = |source| FetchError::Transport {
            url: url.to_string(),
            source,
        };

        let response = self.client.get(url.clone()).send().await.map_err(transport)?;
        let status = response.status();
        if !status.is_success() {
            return Err(FetchError::Status {
                url: url.to_string(),
                status: status.as_u16(),
            });
        }

        let final_url = response.url().clone();
        let body = response.text().await.map_err(transport)?;
        debug!(bytes = body.len(), %final_url, "Fetched document");
        Ok(ParsedDocument::parse(final_url, &body))
    }
}
