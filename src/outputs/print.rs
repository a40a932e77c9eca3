//! Print-ready article documents.
//!
//! Experimental and off by default (`--print`). The article page is cloned,
//! stripped of site chrome, and its body is written out as a standalone HTML
//! file with a title block and a print stylesheet, ready to be printed or fed
//! to an HTML-to-PDF tool. Callers treat every error here as a log line.

use std::path::{Path, PathBuf};

use chrono::NaiveDate;
use once_cell::sync::Lazy;
use regex::Regex;
use tracing::{debug, info, instrument};

use crate::config::SiteConfig;
use crate::error::StructureError;
use crate::fetch::{ParsedDocument, Query, selector};
use crate::models::{ArticleMetadata, SENTINEL};
use crate::utils::slugify_title;

/// Titles on the site read `“Article Title” by Author Name`.
static BYLINE: Lazy<Regex> =
    Lazy::new(|| Regex::new(r#"^[“"](?P<title>.+?)[”"]\s+by\s+(?P<author>.+)$"#).unwrap());

const STYLESHEET: &str = r#"
@page { size: Letter; margin: 0.75in; }
body { margin: 0; padding: 0; }
h1, h3, blockquote, pre { font-family: Garamond, Baskerville, "Hoefler Text", "Times New Roman", serif; }
h1 { font-size: 18px; font-weight: 700; line-height: 18px; }
h3 { font-size: 14px; font-weight: 700; line-height: 18px; }
p { font-family: Garamond, serif; font-size: 11px; line-height: 18px; }
blockquote { font-size: 14px; line-height: 18px; }
pre { font-size: 9px; line-height: 18px; }
div.entry-content { columns: 200px 2; }
.pdftitle { color: red !important; text-align: center !important; }
p:not(.pdftitle) { color: black !important; text-align: justify !important; text-indent: 50px; }
"#;

/// Title block contents derived from the extracted metadata.
#[derive(Debug, PartialEq, Eq)]
struct Heading {
    title: String,
    author: Option<String>,
    date: Option<String>,
}

impl Heading {
    fn new(metadata: &ArticleMetadata) -> Self {
        let (title, author) = match BYLINE.captures(&metadata.title) {
            Some(caps) => (caps["title"].to_string(), Some(caps["author"].to_string())),
            None => (metadata.title.clone(), None),
        };
        let date = metadata
            .published_date
            .get(..10)
            .and_then(|day| NaiveDate::parse_from_str(day, "%Y-%m-%d").ok())
            .map(|day| day.format("%b. %d %Y").to_string());
        Self { title, author, date }
    }

    fn to_html(&self) -> String {
        let mut lines = vec![format!("<b>{}</b>", html_escape::encode_text(&self.title))];
        if let Some(author) = &self.author {
            lines.push(format!("By {}", html_escape::encode_text(author)));
        }
        if let Some(date) = &self.date {
            lines.push(date.clone());
        }
        format!(r#"<div class="pdftitle"><p>{}</p></div>"#, lines.join("<br>"))
    }
}

/// Render the print document for one article and write it under `output_dir`.
#[instrument(level = "info", skip_all, fields(url = %document.url()))]
pub fn write_print_document(
    document: &ParsedDocument,
    metadata: &ArticleMetadata,
    site: &SiteConfig,
    output_dir: &Path,
) -> Result<PathBuf, PrintError> {
    if metadata.title == SENTINEL {
        return Err(PrintError::Untitled);
    }
    let html = render(document, metadata, site)?;
    let path = output_dir.join(file_name(metadata));
    std::fs::write(&path, html).map_err(|source| PrintError::Io {
        path: path.clone(),
        source,
    })?;
    info!(path = %path.display(), "Wrote print document");
    Ok(path)
}

/// `<title-slug>--<link-slug>.html`, so articles sharing a title do not
/// overwrite each other. Falls back to whichever part is non-empty.
fn file_name(metadata: &ArticleMetadata) -> String {
    let title = slugify_title(&metadata.title).trim_matches('-').to_string();
    let link = metadata
        .article_link
        .split(['?', '#'])
        .next()
        .unwrap_or_default()
        .rsplit('/')
        .find(|segment| !segment.is_empty())
        .map(|segment| slugify_title(segment).trim_matches('-').to_string())
        .unwrap_or_default();
    let stem = match (title.is_empty(), link.is_empty()) {
        (false, false) => format!("{title}--{link}"),
        (false, true) => title,
        (true, false) => link,
        (true, true) => "article".to_string(),
    };
    format!("{stem}.html")
}

/// Build the standalone print HTML.
fn render(
    document: &ParsedDocument,
    metadata: &ArticleMetadata,
    site: &SiteConfig,
) -> Result<String, PrintError> {
    let mut html = document.html().clone();
    let mut removed = 0usize;
    for css in &site.decorative {
        let sel = selector(css)?;
        let ids: Vec<_> = html
            .root_element()
            .select(&sel)
            .map(|element| element.id())
            .collect();
        for id in ids {
            if let Some(mut node) = html.tree.get_mut(id) {
                node.detach();
                removed += 1;
            }
        }
    }
    debug!(removed, "Stripped decorative nodes");

    // `Html::select` still visits detached nodes; only search the live tree.
    let root = html.root_element();
    let body = root
        .find(&site.entry_content)?
        .ok_or_else(|| StructureError::MissingContainer {
            selector: site.entry_content.clone(),
            url: document.url().to_string(),
        })?
        .inner_html();

    let heading = Heading::new(metadata);
    Ok(format!(
        "<!DOCTYPE html>\n<html><head><meta charset=\"utf-8\"><title>{title}</title><style>{STYLESHEET}</style></head>\n<body>{heading}<div class=\"entry-content\">{body}</div></body></html>\n",
        title = html_escape::encode_text(&heading.title),
        heading = heading.to_html(),
    ))
}

/// Failure while producing a print document.
#[derive(Debug, thiserror::Error)]
pub enum PrintError {
    #[error("article has no usable title")]
    Untitled,

    #[error(transparent)]
    Structure(#[from] StructureError),

    #[error("failed to write {path:?}: {source}")]
    Io {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },
}
