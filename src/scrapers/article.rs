//! Article metadata extraction.
//!
//! Four fields are read from every article page, each with its own fallback:
//!
//! | Field | Location |
//! |-------|----------|
//! | title | first `a` in `.entry-meta .date`, its `title` attribute |
//! | published date | `.entry-meta .date time[datetime]`, the `datetime` attribute |
//! | tags | text of every anchor in `.entry-meta .tags` |
//! | cover image | `meta[property="og:image"]`, the `content` attribute |
//!
//! A field that cannot be read is logged and replaced by [`SENTINEL`]; it
//! never stops the other fields from being read. When the metadata block
//! itself is missing, title, date and tags each fall back individually.

use scraper::ElementRef;
use tracing::{debug, info, instrument, warn};
use url::Url;

use crate::config::SiteConfig;
use crate::error::FetchError;
use crate::fetch::{DocumentFetcher, ParsedDocument, Query, selector, text_of};
use crate::models::{ArticleMetadata, SENTINEL};

/// Why a field fell back to the sentinel.
type Field<T> = Result<T, String>;

/// The fetched article page together with what was extracted from it.
#[derive(Debug)]
pub struct ExtractedArticle {
    pub document: ParsedDocument,
    pub metadata: ArticleMetadata,
}

/// Fetch `article_url` and extract its metadata.
///
/// `article_link` is recorded verbatim in the result. Only the fetch itself
/// can fail; extraction problems become sentinel values.
#[instrument(level = "info", skip_all, fields(%article_url))]
pub async fn extract(
    fetcher: &DocumentFetcher,
    site: &SiteConfig,
    article_url: &Url,
    article_link: &str,
) -> Result<ExtractedArticle, FetchError> {
    info!("Scraping article link");
    let document = fetcher.fetch(article_url).await?;
    let metadata = extract_from_document(&document, site, article_link);
    Ok(ExtractedArticle { document, metadata })
}

/// Extract metadata from an already parsed article page.
pub fn extract_from_document(
    document: &ParsedDocument,
    site: &SiteConfig,
    article_link: &str,
) -> ArticleMetadata {
    let url = document.url().as_str();

    let meta: Field<ElementRef<'_>> = document
        .find(&site.entry_meta)
        .map_err(|e| e.to_string())
        .and_then(|found| found.ok_or_else(|| format!("no {} block", site.entry_meta)));
    if let Err(reason) = &meta {
        warn!(%url, %reason, "Could not get entry meta data");
    }

    let title = or_sentinel(url, "title", meta.clone().and_then(|m| title(&m, site)));
    let published_date = or_sentinel(
        url,
        "published date",
        meta.clone().and_then(|m| published_date(&m, site)),
    );
    let tags = match meta.and_then(|m| tags(&m, site)) {
        Ok(tags) => tags,
        Err(reason) => {
            warn!(%url, field = "tags", %reason, "Could not parse field");
            vec![SENTINEL.to_string()]
        }
    };
    let cover_image = or_sentinel(url, "cover image", cover_image(document, site));

    debug!(%url, %title, %published_date, tags = tags.len(), "Extracted article metadata");
    ArticleMetadata {
        title,
        published_date,
        cover_image,
        article_link: article_link.to_string(),
        tags,
    }
}

fn or_sentinel(url: &str, field: &str, value: Field<String>) -> String {
    value.unwrap_or_else(|reason| {
        warn!(%url, field, %reason, "Could not parse field");
        SENTINEL.to_string()
    })
}

/// Attribute `attr` of the first `css` match under `scope`.
fn attr_of<Q: Query + ?Sized>(scope: &Q, css: &str, attr: &str) -> Field<String> {
    let element = scope
        .find(css)
        .map_err(|e| e.to_string())?
        .ok_or_else(|| format!("no element matching {css:?}"))?;
    element
        .value()
        .attr(attr)
        .map(|v| v.trim().to_string())
        .ok_or_else(|| format!("{css:?} has no {attr} attribute"))
}

fn date_node<'a>(meta: &ElementRef<'a>, site: &SiteConfig) -> Field<ElementRef<'a>> {
    let sel = selector(&site.date).map_err(|e| e.to_string())?;
    meta.select(&sel)
        .next()
        .ok_or_else(|| format!("no {} node in entry meta", site.date))
}

fn title(meta: &ElementRef<'_>, site: &SiteConfig) -> Field<String> {
    attr_of(&date_node(meta, site)?, &site.title_anchor, "title")
}

fn published_date(meta: &ElementRef<'_>, site: &SiteConfig) -> Field<String> {
    attr_of(&date_node(meta, site)?, &site.time, "datetime")
}

fn tags(meta: &ElementRef<'_>, site: &SiteConfig) -> Field<Vec<String>> {
    let container = meta
        .find(&site.tags)
        .map_err(|e| e.to_string())?
        .ok_or_else(|| format!("no {} node in entry meta", site.tags))?;
    Ok(container
        .find_all("a")
        .map_err(|e| e.to_string())?
        .iter()
        .map(text_of)
        .collect())
}

fn cover_image(document: &ParsedDocument, site: &SiteConfig) -> Field<String> {
    attr_of(document, &site.cover_image, "content")
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::time::Duration;
    use wiremock::matchers::{method, path};
    use wiremock::{Mock, MockServer, ResponseTemplate};

    const OG_IMAGE: &str = r#"<meta property="og:image" content="https://canopyforum.org/img/cover.jpg">"#;

    const META: &str = r#"<div class="entry-meta">
        <span class="date"><a href="/2021/05/01/example/" title="Example Title">
          <time class="entry-date" datetime="2021-05-01T00:00:00">May 1, 2021</time></a></span>
        <span class="tags"><a href="/tag/law/">Law</a>, <a href="/tag/religion/"> Religion </a></span>
      </div>"#;

    fn article(head: &str, body: &str) -> ParsedDocument {
        ParsedDocument::parse(
            Url::parse("https://canopyforum.org/2021/05/01/example/").unwrap(),
            &format!("<html><head>{head}</head><body>{body}</body></html>"),
        )
    }

    fn is_real_or_sentinel(value: &str) -> bool {
        value == SENTINEL || !value.is_empty()
    }

    #[test]
    fn test_extracts_all_fields() {
        let doc = article(OG_IMAGE, META);
        let meta = extract_from_document(&doc, &SiteConfig::default(), "/a1");
        assert_eq!(
            meta,
            ArticleMetadata {
                title: "Example Title".to_string(),
                published_date: "2021-05-01T00:00:00".to_string(),
                cover_image: "https://canopyforum.org/img/cover.jpg".to_string(),
                article_link: "/a1".to_string(),
                tags: vec!["Law".to_string(), "Religion".to_string()],
            }
        );
    }

    #[test]
    fn test_missing_cover_image_leaves_other_fields() {
        let doc = article("", META);
        let meta = extract_from_document(&doc, &SiteConfig::default(), "/a1");
        assert_eq!(meta.cover_image, SENTINEL);
        assert_eq!(meta.title, "Example Title");
        assert_eq!(meta.published_date, "2021-05-01T00:00:00");
        assert_eq!(meta.tags, vec!["Law", "Religion"]);
    }

    #[test]
    fn test_missing_meta_block_sentinels_each_field() {
        let doc = article(OG_IMAGE, "<article><p>No metadata here</p></article>");
        let meta = extract_from_document(&doc, &SiteConfig::default(), "/a1");
        assert_eq!(meta.title, SENTINEL);
        assert_eq!(meta.published_date, SENTINEL);
        assert_eq!(meta.tags, vec![SENTINEL]);
        assert_eq!(meta.cover_image, "https://canopyforum.org/img/cover.jpg");
    }

    #[test]
    fn test_missing_title_attribute_keeps_date() {
        let doc = article(
            OG_IMAGE,
            r#"<div class="entry-meta"><span class="date"><a href="/x">
                 <time datetime="2020-10-23T08:00:00">Oct</time></a></span>
                 <span class="tags"></span></div>"#,
        );
        let meta = extract_from_document(&doc, &SiteConfig::default(), "/x");
        assert_eq!(meta.title, SENTINEL);
        assert_eq!(meta.published_date, "2020-10-23T08:00:00");
        assert!(meta.tags.is_empty());
    }

    #[test]
    fn test_title_comes_from_first_anchor_only() {
        let doc = article(
            OG_IMAGE,
            r#"<div class="entry-meta"><span class="date">
                 <a href="/author/jane/">Jane</a>
                 <a href="/x" title="Later Title"><time datetime="2020-10-23">Oct</time></a>
               </span><span class="tags"></span></div>"#,
        );
        let meta = extract_from_document(&doc, &SiteConfig::default(), "/x");
        assert_eq!(meta.title, SENTINEL);
        assert_eq!(meta.published_date, "2020-10-23");
    }

    #[test]
    fn test_missing_tags_container_sentinels_tags_only() {
        let doc = article(
            OG_IMAGE,
            r#"<div class="entry-meta"><span class="date">
                 <a title="T"><time datetime="2020-01-01">x</time></a></span></div>"#,
        );
        let meta = extract_from_document(&doc, &SiteConfig::default(), "/x");
        assert_eq!(meta.title, "T");
        assert_eq!(meta.tags, vec![SENTINEL]);
    }

    #[test]
    fn test_every_scalar_is_value_or_sentinel() {
        for (head, body) in [(OG_IMAGE, META), ("", ""), (OG_IMAGE, "<div class='entry-meta'></div>")] {
            let meta = extract_from_document(&article(head, body), &SiteConfig::default(), "/l");
            for value in [&meta.title, &meta.published_date, &meta.cover_image, &meta.article_link] {
                assert!(is_real_or_sentinel(value), "unexpected value {value:?}");
            }
        }
    }

    #[tokio::test]
    async fn test_extract_fetches_page() {
        let server = MockServer::start().await;
        Mock::given(method("GET"))
            .and(path("/a1"))
            .respond_with(ResponseTemplate::new(200).set_body_string(format!(
                "<html><head>{OG_IMAGE}</head><body>{META}</body></html>"
            )))
            .mount(&server)
            .await;

        let fetcher = DocumentFetcher::new(Duration::from_secs(5)).unwrap();
        let url = Url::parse(&format!("{}/a1", server.uri())).unwrap();
        let extracted = extract(&fetcher, &SiteConfig::default(), &url, "/a1")
            .await
            .unwrap();
        assert_eq!(extracted.metadata.title, "Example Title");
        assert_eq!(extracted.metadata.article_link, "/a1");
        assert_eq!(extracted.document.url(), &url);
    }
}
