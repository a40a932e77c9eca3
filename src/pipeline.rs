//! Drives a full crawl: authors, then each author's articles, in order.
//!
//! Everything runs sequentially with one request in flight. After every
//! article fetch the pipeline sleeps for the configured politeness delay.
//! A failing author or article is logged and skipped, and a failing later
//! listing page keeps the articles found before it. Only a failure to read
//! the author directory aborts the run.

use indicatif::{ProgressBar, ProgressStyle};
use tokio::time::sleep;
use tracing::{debug, error, info, instrument, warn};
use url::Url;

use crate::config::ScrapeConfig;
use crate::error::ScrapeError;
use crate::fetch::{DocumentFetcher, resolve};
use crate::models::{AuthorEntry, ResultSet};
use crate::outputs::print::write_print_document;
use crate::scrapers::{article, authors, links};

/// Crawl everything reachable from `directory_url` and collect one record per article.
#[instrument(level = "info", skip_all, fields(%directory_url))]
pub async fn run(
    fetcher: &DocumentFetcher,
    config: &ScrapeConfig,
    directory_url: &Url,
) -> Result<ResultSet, ScrapeError> {
    let authors = authors::list_authors(fetcher, &config.site, directory_url).await?;
    let progress = progress_bar(config, authors.len() as u64);
    let mut results = ResultSet::new();

    for author in &authors {
        progress.set_message(author.name.clone());
        let done = crawl_author(fetcher, config, author, &mut results).await;
        progress.inc(1);
        if done {
            info!("Single-record debug mode; stopping after first record");
            break;
        }
    }
    progress.finish_and_clear();

    let incomplete = results.iter().filter(|r| r.unparsed_fields() > 0).count();
    info!(
        authors = authors.len(),
        records = results.len(),
        incomplete,
        "Crawl complete"
    );
    Ok(results)
}

/// Append every record for `author`. Returns `true` when the run should stop.
#[instrument(level = "info", skip_all, fields(author = %author.name))]
async fn crawl_author(
    fetcher: &DocumentFetcher,
    config: &ScrapeConfig,
    author: &AuthorEntry,
    results: &mut ResultSet,
) -> bool {
    let profile_url = match Url::parse(&author.profile_url) {
        Ok(url) => url,
        Err(e) => {
            warn!(url = %author.profile_url, error = %e, "Invalid author profile URL; skipping author");
            return false;
        }
    };

    let article_links =
        match links::list_article_links(fetcher, &config.site, &author.name, &profile_url).await {
            Ok(article_links) => article_links,
            Err(e) => {
                error!(error = %e, "Failed to list articles; skipping author");
                return false;
            }
        };

    for link in article_links {
        let article_url = match resolve(&profile_url, &link) {
            Ok(url) => url,
            Err(e) => {
                warn!(%link, error = %e, "Unusable article link; skipping");
                continue;
            }
        };

        match article::extract(fetcher, &config.site, &article_url, &link).await {
            Ok(extracted) => {
                if let Some(dir) = &config.print_dir {
                    if let Err(e) = write_print_document(
                        &extracted.document,
                        &extracted.metadata,
                        &config.site,
                        dir,
                    ) {
                        error!(%article_url, error = %e, "Tried saving print document but failed");
                    }
                }
                results.push(extracted.metadata.with_author(&author.name));
            }
            Err(e) => error!(%article_url, error = %e, "Failed to fetch article; skipping"),
        }

        if !config.throttle.is_zero() {
            debug!(delay = ?config.throttle, "Politeness delay");
            sleep(config.throttle).await;
        }

        if config.debug_single && !results.is_empty() {
            return true;
        }
    }
    false
}

fn progress_bar(config: &ScrapeConfig, len: u64) -> ProgressBar {
    if !config.progress {
        return ProgressBar::hidden();
    }
    let bar = ProgressBar::new(len);
    if let Ok(style) = ProgressStyle::with_template("{bar:40.cyan/blue} {pos}/{len} {msg}") {
        bar.set_style(style);
    }
    bar
}
