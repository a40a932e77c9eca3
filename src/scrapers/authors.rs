//! Author directory scraper.
//!
//! The directory page lists every author alphabetically inside a single
//! container. Each anchor in it links to the author's article listing and
//! wraps the display name in a `span`.

use tracing::{info, instrument, warn};
use url::Url;

use crate::config::SiteConfig;
use crate::error::{ScrapeError, StructureError};
use crate::fetch::{DocumentFetcher, ParsedDocument, Query, text_of};
use crate::models::AuthorEntry;
use crate::utils::truncate_for_log;

/// Fetch the directory page and list every author on it.
///
/// # Errors
///
/// A [`FetchError`](crate::error::FetchError) if the page cannot be fetched, or
/// [`StructureError::MissingContainer`] if the index container is gone. Both
/// end the run.
#[instrument(level = "info", skip_all, fields(%directory_url))]
pub async fn list_authors(
    fetcher: &DocumentFetcher,
    site: &SiteConfig,
    directory_url: &Url,
) -> Result<Vec<AuthorEntry>, ScrapeError> {
    info!("Collecting authors");
    let document = fetcher.fetch(directory_url).await?;
    let authors = authors_from_document(&document, site)?;
    info!(count = authors.len(), "Indexed authors");
    Ok(authors)
}

/// Extract `(name, profile URL)` pairs from an already fetched directory page.
pub fn authors_from_document(
    document: &ParsedDocument,
    site: &SiteConfig,
) -> Result<Vec<AuthorEntry>, StructureError> {
    let index = document
        .find(&site.author_index)?
        .ok_or_else(|| StructureError::MissingContainer {
            selector: site.author_index.clone(),
            url: document.url().to_string(),
        })?;

    let mut authors = Vec::new();
    for anchor in index.find_all("a")? {
        let Some(href) = anchor.value().attr("href") else {
            warn!(
                anchor = %truncate_for_log(&anchor.html(), 120),
                "Author anchor without href; skipping"
            );
            continue;
        };
        let profile_url = match document.resolve(href) {
            Ok(url) => url,
            Err(e) => {
                warn!(error = %e, "Unusable author link; skipping");
                continue;
            }
        };
        let name = match anchor.find(&site.author_name)? {
            Some(label) => text_of(&label),
            None => text_of(&anchor),
        };
        authors.push(AuthorEntry {
            name,
            profile_url: profile_url.to_string(),
        });
    }
    Ok(authors)
}
