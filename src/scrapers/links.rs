//! Author listing crawler.
//!
//! An author's articles are spread over a chain of listing pages linked by a
//! "next page" anchor. The chain is walked as a loop with a per-author
//! visited set holding both requested and final (post-redirect) URLs, so a
//! page pointing back at an earlier one ends the walk instead of looping
//! forever.

use std::collections::HashSet;

use tracing::{debug, error, info, instrument, warn};
use url::Url;

use crate::config::SiteConfig;
use crate::error::ScrapeError;
use crate::fetch::{DocumentFetcher, ParsedDocument, Query};
use crate::models::ArticleLink;

/// What one listing page contributed.
#[derive(Debug, Default, PartialEq, Eq)]
pub struct ListingPage {
    /// Article hrefs in document order.
    pub links: Vec<ArticleLink>,
    /// Resolved "next page" URL, if the page has one.
    pub next: Option<Url>,
    /// Entry blocks that had no usable link.
    pub skipped: usize,
}

/// Collect every article link for `author`, starting at `page_url`.
///
/// Links from earlier pages precede links from later pages. Structural
/// problems are logged and never fail the call. A fetch failure on the first
/// page is returned; on any later page it is logged and the links gathered so
/// far are kept.
#[instrument(level = "info", skip_all, fields(%author, %page_url))]
pub async fn list_article_links(
    fetcher: &DocumentFetcher,
    site: &SiteConfig,
    author: &str,
    page_url: &Url,
) -> Result<Vec<ArticleLink>, ScrapeError> {
    let mut links = Vec::new();
    let mut visited = HashSet::new();
    let mut next = Some(page_url.clone());

    while let Some(url) = next.take() {
        if !visited.insert(url.to_string()) {
            warn!(%author, %url, "Pagination loops back to a visited page; stopping");
            break;
        }

        info!(%author, %url, "Scraping author page");
        let document = match fetcher.fetch(&url).await {
            Ok(document) => document,
            Err(e) if &url == page_url => return Err(e.into()),
            Err(e) => {
                error!(
                    %author,
                    %url,
                    error = %e,
                    "Failed to fetch listing page; keeping earlier pages"
                );
                break;
            }
        };
        if document.url() != &url && !visited.insert(document.url().to_string()) {
            warn!(
                %author,
                %url,
                final_url = %document.url(),
                "Listing page redirects to a visited page; stopping"
            );
            break;
        }
        let Some(page) = parse_listing_page(&document, site)? else {
            warn!(
                %author,
                %url,
                selector = %site.main_container,
                "Listing page has no main container; stopping"
            );
            break;
        };

        if page.skipped > 0 {
            warn!(%author, %url, skipped = page.skipped, "Page returned an invalid article link");
        }
        debug!(%url, count = page.links.len(), "Collected page links");
        links.extend(page.links);
        next = page.next;
    }

    if links.is_empty() {
        warn!(%author, %page_url, "Author returned an empty list of articles");
    }
    Ok(links)
}

/// Read one listing page. `Ok(None)` means the main container is missing.
pub fn parse_listing_page(
    document: &ParsedDocument,
    site: &SiteConfig,
) -> Result<Option<ListingPage>, ScrapeError> {
    let Some(container) = document.find(&site.main_container)? else {
        return Ok(None);
    };

    let mut page = ListingPage::default();
    for block in container.find_all(&site.entry_block)? {
        let href = block
            .find("a")?
            .and_then(|a| a.value().attr("href"))
            .map(str::trim)
            .filter(|href| !href.is_empty());
        match href {
            Some(href) => page.links.push(href.to_string()),
            None => page.skipped += 1,
        }
    }

    if let Some(href) = container
        .find(&site.next_page)?
        .and_then(|a| a.value().attr("href"))
    {
        match document.resolve(href) {
            Ok(url) => page.next = Some(url),
            Err(e) => warn!(error = %e, "Unusable next-page link; treating page as last"),
        }
    }
    Ok(Some(page))
}
