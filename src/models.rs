//! Data models flowing through the crawl pipeline.
//!
//! - [`AuthorEntry`]: one author from the directory page
//! - [`ArticleLink`]: one article href from an author's listing
//! - [`ArticleMetadata`]: everything extracted from an article page
//! - [`ArticleRecord`]: metadata plus the author, one per CSV row
//!
//! Scalar fields that could not be extracted hold [`SENTINEL`] instead of
//! failing the record.

/// Placeholder for a field that could not be extracted.
pub const SENTINEL: &str = "COULD NOT PARSE";

/// An author listed on the directory page.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct AuthorEntry {
    /// Display name as shown in the index.
    pub name: String,
    /// Absolute URL of the author's article listing.
    pub profile_url: String,
}

/// An article href exactly as it appears on the listing page.
pub type ArticleLink = String;

/// Metadata extracted from a single article page.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ArticleMetadata {
    pub title: String,
    pub published_date: String,
    pub cover_image: String,
    pub article_link: String,
    pub tags: Vec<String>,
}

impl ArticleMetadata {
    /// Attach the author to form the final record.
    pub fn with_author(self, author: &str) -> ArticleRecord {
        ArticleRecord {
            author: author.to_string(),
            title: self.title,
            published_date: self.published_date,
            cover_image: self.cover_image,
            article_link: self.article_link,
            tags: self.tags,
        }
    }
}

/// One exported row: five scalar fields plus a variable-length tag tail.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ArticleRecord {
    pub author: String,
    pub title: String,
    pub published_date: String,
    pub cover_image: String,
    pub article_link: String,
    pub tags: Vec<String>,
}

impl ArticleRecord {
    /// Flatten into a table row: the scalar fields in header order, then each tag.
    pub fn to_row(&self) -> Vec<&str> {
        let mut row = vec![
            self.author.as_str(),
            self.title.as_str(),
            self.published_date.as_str(),
            self.cover_image.as_str(),
            self.article_link.as_str(),
        ];
        row.extend(self.tags.iter().map(String::as_str));
        row
    }

    /// Number of scalar fields holding the sentinel.
    pub fn unparsed_fields(&self) -> usize {
        [
            &self.author,
            &self.title,
            &self.published_date,
            &self.cover_image,
            &self.article_link,
        ]
        .iter()
        .filter(|f| f.as_str() == SENTINEL)
        .count()
    }
}

/// Every record of a run, author-then-article order.
pub type ResultSet = Vec<ArticleRecord>;

#[cfg(test)]
mod tests {
    use super::*;

    fn metadata() -> ArticleMetadata {
        ArticleMetadata {
            title: "Example Title".to_string(),
            published_date: "2021-05-01T00:00:00".to_string(),
            cover_image: SENTINEL.to_string(),
            article_link: "/a1".to_string(),
            tags: vec!["Law".to_string(), "Religion".to_string()],
        }
    }

    #[test]
    fn test_with_author_keeps_fields() {
        let record = metadata().with_author("Jane Doe");
        assert_eq!(record.author, "Jane Doe");
        assert_eq!(record.title, "Example Title");
        assert_eq!(record.article_link, "/a1");
        assert_eq!(record.tags, vec!["Law", "Religion"]);
    }

    #[test]
    fn test_to_row_puts_tags_last() {
        let record = metadata().with_author("Jane Doe");
        assert_eq!(
            record.to_row(),
            vec![
                "Jane Doe",
                "Example Title",
                "2021-05-01T00:00:00",
                SENTINEL,
                "/a1",
                "Law",
                "Religion"
            ]
        );
    }

    #[test]
    fn test_to_row_without_tags_has_five_columns() {
        let mut record = metadata().with_author("Jane Doe");
        record.tags.clear();
        assert_eq!(record.to_row().len(), 5);
    }

    #[test]
    fn test_unparsed_fields_counts_sentinels() {
        let record = metadata().with_author("Jane Doe");
        assert_eq!(record.unparsed_fields(), 1);
    }
}
