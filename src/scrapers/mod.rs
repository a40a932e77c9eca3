//! Page scrapers for the three kinds of page the crawl visits.
//!
//! | Page | Module | Produces |
//! |------|--------|----------|
//! | Author directory | [`authors`] | `Vec<AuthorEntry>` |
//! | Author listing (paginated) | [`links`] | `Vec<ArticleLink>` |
//! | Article | [`article`] | `ArticleMetadata` |
//!
//! Each module exposes an async entry point that fetches through
//! [`DocumentFetcher`](crate::fetch::DocumentFetcher) and a pure function that
//! works on an already parsed page, which is what the unit tests exercise.
//! Selectors come from [`SiteConfig`](crate::config::SiteConfig).

pub mod article;
pub mod authors;
pub mod links;
