//! CSV export of the result set.
//!
//! One header row, then one row per record. Tags are flattened into trailing
//! columns, so rows have different widths and the writer runs in flexible mode.

use std::path::PathBuf;

use csv::WriterBuilder;
use tracing::{info, instrument};

use crate::error::ExportError;
use crate::models::ArticleRecord;

/// Header row of the exported table.
pub const HEADER: [&str; 6] = [
    "AUTHOR NAME",
    "ARTICLE TITLE",
    "DATE PUBLISHED",
    "COVER IMAGE",
    "ARTICLE LINK",
    "TAGS",
];

/// Write `records` to `<base_name>.csv` and return the path written.
#[instrument(level = "info", skip_all, fields(%base_name, count = records.len()))]
pub fn write_results(records: &[ArticleRecord], base_name: &str) -> Result<PathBuf, ExportError> {
    let path = PathBuf::from(format!("{base_name}.csv"));
    info!(path = %path.display(), "Exporting results");

    let mut writer = WriterBuilder::new().flexible(true).from_path(&path)?;
    writer.write_record(HEADER)?;
    for record in records {
        writer.write_record(record.to_row())?;
    }
    writer.flush().map_err(|source| ExportError::Io {
        path: path.clone(),
        source,
    })?;

    info!(path = %path.display(), "Wrote CSV export");
    Ok(path)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::SENTINEL;

    fn record(author: &str, tags: &[&str]) -> ArticleRecord {
        ArticleRecord {
            author: author.to_string(),
            title: "“Reconciling Retribution” by Jane Doe".to_string(),
            published_date: "2020-10-23T08:00:00".to_string(),
            cover_image: SENTINEL.to_string(),
            article_link: "https://canopyforum.org/2020/10/23/x/".to_string(),
            tags: tags.iter().map(|t| t.to_string()).collect(),
        }
    }

    #[test]
    fn test_write_results_layout() {
        let dir = tempfile::tempdir().unwrap();
        let base = dir.path().join("cf_data");
        let records = vec![record("Jane Doe", &["Law", "Religion"]), record("John, Roe", &[])];

        let path = write_results(&records, base.to_str().unwrap()).unwrap();
        assert_eq!(path.extension().unwrap(), "csv");

        let written = std::fs::read_to_string(&path).unwrap();
        let lines: Vec<&str> = written.lines().collect();
        assert_eq!(
            lines[0],
            "AUTHOR NAME,ARTICLE TITLE,DATE PUBLISHED,COVER IMAGE,ARTICLE LINK,TAGS"
        );
        assert_eq!(
            lines[1],
            "Jane Doe,“Reconciling Retribution” by Jane Doe,2020-10-23T08:00:00,COULD NOT PARSE,https://canopyforum.org/2020/10/23/x/,Law,Religion"
        );
        assert!(lines[2].starts_with("\"John, Roe\","));
        assert_eq!(lines.len(), 3);
    }

    #[test]
    fn test_write_results_empty_has_header_only() {
        let dir = tempfile::tempdir().unwrap();
        let base = dir.path().join("empty");
        let path = write_results(&[], base.to_str().unwrap()).unwrap();
        assert_eq!(std::fs::read_to_string(path).unwrap().lines().count(), 1);
    }
}
