//! Run configuration.
//!
//! [`ScrapeConfig`] carries every feature flag the pipeline looks at and is
//! passed explicitly into [`crate::pipeline::run`]. [`SiteConfig`] holds the
//! CSS selectors describing the target site's layout; the defaults match
//! Canopy Forum and can be overridden with a YAML file:
//!
//! ```yaml
//! author_index: ".tag-groups-alphabetical-index"
//! next_page: "a.next"
//! ```
//!
//! Keys left out of the file keep their defaults.

use std::path::{Path, PathBuf};
use std::time::Duration;

use serde::{Deserialize, Serialize};
use tracing::{info, instrument};

use crate::cli::Cli;
use crate::error::ConfigError;
use crate::fetch::selector;

/// Selectors locating each piece of data on the target site.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct SiteConfig {
    /// Container of the alphabetical author index on the directory page.
    pub author_index: String,
    /// Element holding an author's display name inside an index anchor.
    pub author_name: String,
    /// Main content container of an author listing page.
    pub main_container: String,
    /// One article teaser inside the main container.
    pub entry_block: String,
    /// "Next page" anchor inside the main container.
    pub next_page: String,
    /// Metadata block of an article page.
    pub entry_meta: String,
    /// Date sub-node of the metadata block.
    pub date: String,
    /// First anchor inside the date node; its `title` attribute is the article title.
    pub title_anchor: String,
    /// Time element inside the date node carrying a `datetime` attribute.
    pub time: String,
    /// Tags container inside the metadata block.
    pub tags: String,
    /// Open-Graph image meta element.
    pub cover_image: String,
    /// Article body, used by the print document.
    pub entry_content: String,
    /// Nodes stripped from the print document.
    pub decorative: Vec<String>,
}

impl Default for SiteConfig {
    fn default() -> Self {
        Self {
            author_index: ".tag-groups-alphabetical-index".to_string(),
            author_name: "span".to_string(),
            main_container: "#main-core".to_string(),
            entry_block: "div.entry-content".to_string(),
            next_page: "a.next".to_string(),
            entry_meta: ".entry-meta".to_string(),
            date: ".date".to_string(),
            title_anchor: "a".to_string(),
            time: "time[datetime]".to_string(),
            tags: ".tags".to_string(),
            cover_image: r#"meta[property="og:image"]"#.to_string(),
            entry_content: ".entry-content".to_string(),
            decorative: [
                "div#pre-header",
                "div#header",
                "div#sub-footer",
                "header",
                "nav",
                "div.sfsi_responsive_icons",
                "div.wp-block-cover",
                "div.wp-block-spacer",
                "div.wp-block-image",
                "figure.wp-block-pullquote",
            ]
            .into_iter()
            .map(String::from)
            .collect(),
        }
    }
}

impl SiteConfig {
    /// Load a YAML selector file and validate every selector in it.
    #[instrument(level = "info", skip_all, fields(path = %path.display()))]
    pub fn load(path: &Path) -> Result<Self, ConfigError> {
        let raw = std::fs::read_to_string(path).map_err(|source| ConfigError::Io {
            path: path.to_path_buf(),
            source,
        })?;
        let site = Self::from_yaml(&raw).map_err(|source| ConfigError::Yaml {
            path: path.to_path_buf(),
            source,
        })?;
        site.validate()?;
        info!("Loaded site config");
        Ok(site)
    }

    fn from_yaml(raw: &str) -> Result<Self, serde_yaml::Error> {
        // An empty file deserializes to unit, not to an empty map.
        if raw.trim().is_empty() {
            return Ok(Self::default());
        }
        serde_yaml::from_str(raw)
    }

    /// Check that every selector parses.
    pub fn validate(&self) -> Result<(), ConfigError> {
        let fixed = [
            &self.author_index,
            &self.author_name,
            &self.main_container,
            &self.entry_block,
            &self.next_page,
            &self.entry_meta,
            &self.date,
            &self.title_anchor,
            &self.time,
            &self.tags,
            &self.cover_image,
            &self.entry_content,
        ];
        for css in fixed.into_iter().chain(self.decorative.iter()) {
            selector(css)?;
        }
        Ok(())
    }
}

/// Feature flags and tunables for one run.
#[derive(Debug, Clone)]
pub struct ScrapeConfig {
    /// Emit info-level progress logging and a progress bar.
    pub progress: bool,
    /// Directory for print documents; `None` disables them.
    pub print_dir: Option<PathBuf>,
    /// Stop after the first extracted record.
    pub debug_single: bool,
    /// Politeness delay after every article fetch.
    pub throttle: Duration,
    /// Per-request timeout for the fetcher.
    pub timeout: Duration,
    pub site: SiteConfig,
}

impl Default for ScrapeConfig {
    fn default() -> Self {
        Self {
            progress: false,
            print_dir: None,
            debug_single: false,
            throttle: Duration::from_secs(2),
            timeout: Duration::from_secs(30),
            site: SiteConfig::default(),
        }
    }
}

impl ScrapeConfig {
    /// Build the run configuration from parsed command-line arguments.
    pub fn from_cli(cli: &Cli) -> Result<Self, ConfigError> {
        let site = match &cli.config {
            Some(path) => SiteConfig::load(Path::new(path))?,
            None => SiteConfig::default(),
        };
        Ok(Self {
            progress: cli.log,
            print_dir: cli.print.then(|| PathBuf::from(&cli.print_dir)),
            debug_single: cli.debug_single,
            throttle: Duration::from_millis(cli.throttle_ms),
            timeout: Duration::from_secs(cli.timeout_secs),
            site,
        })
    }
}
