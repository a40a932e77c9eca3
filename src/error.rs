//! Error types for the scraper.
//!
//! The taxonomy follows the unit of work each error aborts:
//!
//! - [`FetchError`]: a single HTTP request failed; aborts the call it came from.
//! - [`StructureError`]: the expected HTML structure is missing. Terminal when it
//!   concerns the author directory, a logged warning everywhere else.
//! - [`DeliveryError`]: the email collaborator failed. Terminal before the crawl,
//!   logged only after export.
//! - [`ExportError`] / [`ConfigError`]: local I/O around the pipeline.
//!
//! [`ScrapeError`] is what the pipeline entry points return.

use std::path::PathBuf;

/// Network, transport or HTTP status failure for one request.
#[derive(Debug, thiserror::Error)]
pub enum FetchError {
    #[error("failed to build HTTP client: {0}")]
    Client(#[source] reqwest::Error),

    #[error("request to {url} failed: {source}")]
    Transport {
        url: String,
        #[source]
        source: reqwest::Error,
    },

    #[error("{url} returned HTTP {status}")]
    Status { url: String, status: u16 },

    #[error("invalid URL {href:?}: {source}")]
    InvalidUrl {
        href: String,
        #[source]
        source: url::ParseError,
    },
}

/// The page does not look the way the scraper expects.
#[derive(Debug, thiserror::Error)]
pub enum StructureError {
    #[error("no element matching {selector:?} on {url}")]
    MissingContainer { selector: String, url: String },

    #[error("invalid selector {selector:?}: {message}")]
    Selector { selector: String, message: String },
}

/// Failure in the optional email delivery collaborator.
#[derive(Debug, thiserror::Error)]
#[cfg_attr(not(feature = "email"), allow(dead_code))]
pub enum DeliveryError {
    #[error("email options were given but this binary was built without the `email` feature")]
    Disabled,

    #[error("email delivery needs --email, --password and --to together (missing {0})")]
    Incomplete(&'static str),

    #[error("invalid mailbox {address:?}: {message}")]
    Address { address: String, message: String },

    #[error("SMTP authentication as {user} failed: {message}")]
    Auth { user: String, message: String },

    #[error("failed to build message: {0}")]
    Build(String),

    #[error("failed to send message to {to}: {message}")]
    Send { to: String, message: String },

    #[error("failed to read attachment {path:?}: {source}")]
    Io {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },
}

/// Writing the CSV table failed.
#[derive(Debug, thiserror::Error)]
pub enum ExportError {
    #[error("CSV error: {0}")]
    Csv(#[from] csv::Error),

    #[error("I/O error at {path:?}: {source}")]
    Io {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },
}

/// Loading or validating configuration failed.
#[derive(Debug, thiserror::Error)]
pub enum ConfigError {
    #[error("failed to read config {path:?}: {source}")]
    Io {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("failed to parse config {path:?}: {source}")]
    Yaml {
        path: PathBuf,
        #[source]
        source: serde_yaml::Error,
    },

    #[error("invalid site config: {0}")]
    Invalid(#[from] StructureError),
}

/// Errors surfaced by the crawl pipeline.
#[derive(Debug, thiserror::Error)]
pub enum ScrapeError {
    #[error(transparent)]
    Fetch(#[from] FetchError),

    #[error(transparent)]
    Structure(#[from] StructureError),
}
