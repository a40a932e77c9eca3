//! Output generation for the crawl results.
//!
//! - [`csv`]: the exported table, one row per article
//! - [`print`]: optional print-ready HTML per article (`--print`)
//!
//! # Output Structure
//!
//! ```text
//! ./
//! ├── cf_data.csv
//! └── print/
//!     ├── reconciling-retribution-and-rehabilitation-by-jane-doe.html
//!     └── ...
//! ```

pub mod csv;
pub mod print;
