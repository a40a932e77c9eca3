//! Command-line interface definitions for the scraper.
//!
//! Mail credentials can come from flags or environment variables so the
//! password never has to appear in shell history.

use clap::Parser;

use crate::delivery::MailSettings;
use crate::error::DeliveryError;

/// Canopy Forum's alphabetical author index.
pub const DEFAULT_DIRECTORY_URL: &str = "https://canopyforum.org/articles-by-author/";

/// Command-line arguments for the scraper.
///
/// # Examples
///
/// ```sh
/// # Crawl everything, quietly, into cf_data.csv
/// canopy_scraper
///
/// # Progress output, one record only, custom file name
/// canopy_scraper --log --debug-single -f sample
///
/// # Email the CSV when done (needs the `email` feature)
/// canopy_scraper -e scraper@gmail.com -p app-password -t editor@example.org
/// ```
#[derive(Parser, Debug)]
#[command(author, version, about)]
pub struct Cli {
    /// Author directory page to start from
    #[arg(long, env = "SCRAPER_DIRECTORY_URL", default_value = DEFAULT_DIRECTORY_URL)]
    pub directory_url: String,

    /// Base name of the exported CSV file (without .csv)
    #[arg(short, long, default_value = "cf_data")]
    pub filename: String,

    /// Print progress to the console
    #[arg(long)]
    pub log: bool,

    /// Write a print-ready HTML document for every article
    #[arg(long)]
    pub print: bool,

    /// Output directory for print documents
    #[arg(long, default_value = "print")]
    pub print_dir: String,

    /// Stop after the first extracted article
    #[arg(long)]
    pub debug_single: bool,

    /// Delay between article fetches, in milliseconds
    #[arg(long, default_value_t = 2000)]
    pub throttle_ms: u64,

    /// Per-request timeout, in seconds
    #[arg(long, default_value_t = 30)]
    pub timeout_secs: u64,

    /// Optional path to a YAML file overriding the site selectors
    #[arg(short, long)]
    pub config: Option<String>,

    /// Sender address used to email the CSV
    #[arg(short, long, env = "SCRAPER_EMAIL")]
    pub email: Option<String>,

    /// Password for the sender address
    #[arg(short, long, env = "SCRAPER_EMAIL_PASSWORD", hide_env_values = true)]
    pub password: Option<String>,

    /// Recipient of the emailed CSV
    #[arg(short, long, env = "SCRAPER_EMAIL_TO")]
    pub to: Option<String>,
}

impl Cli {
    /// Mail settings, if email delivery was requested.
    ///
    /// Returns `Ok(None)` when no mail option is set and an error when only
    /// some of them are.
    pub fn mail_settings(&self) -> Result<Option<MailSettings>, DeliveryError> {
        match (&self.email, &self.password, &self.to) {
            (None, None, None) => Ok(None),
            (Some(from), Some(password), Some(to)) => Ok(Some(MailSettings {
                from: from.clone(),
                password: password.clone(),
                to: to.clone(),
            })),
            (None, _, _) => Err(DeliveryError::Incomplete("--email")),
            (_, None, _) => Err(DeliveryError::Incomplete("--password")),
            (_, _, None) => Err(DeliveryError::Incomplete("--to")),
        }
    }
}
