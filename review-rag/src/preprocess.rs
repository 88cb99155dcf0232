//! Review cleaning and document construction.

use std::sync::{Arc, LazyLock};

use regex::Regex;
use tracing::info;

use crate::chunking::{Chunker, RecursiveChunker};
use crate::config::ReviewRagConfig;
use crate::document::{ChunkMetadata, Document, ReviewRecord};

/// Cleaned reviews this short or shorter carry too little signal to index.
pub const MIN_CLEAN_TEXT_CHARS: usize = 20;

static TAG_RE: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"<[^>]+>").expect("unreachable error: invalid tag pattern"));
static URL_RE: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"http\S+").expect("unreachable error: invalid URL pattern"));
static WS_RE: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"\s+").expect("unreachable error: invalid whitespace pattern"));

/// Normalize review text: markup tags become spaces, URLs are removed,
/// whitespace runs collapse to one space and the ends are trimmed.
pub fn clean_text(text: &str) -> String {
    let text = TAG_RE.replace_all(text, " ");
    let text = URL_RE.replace_all(&text, "");
    let text = WS_RE.replace_all(&text, " ");
    text.trim().to_string()
}

/// Render a rating the way it reads to a person: `5`, `4.5`.
fn format_rating(rating: f64) -> String {
    format!("{rating}")
}

/// Cleans review records and turns them into chunked [`Document`]s.
///
/// # Example
///
/// ```rust,ignore
/// use review_rag::ReviewPreprocessor;
///
/// let preprocessor = ReviewPreprocessor::new(512, 50, None);
/// let cleaned = preprocessor.clean(records);
/// let documents = preprocessor.to_documents(&cleaned);
/// ```
#[derive(Clone)]
pub struct ReviewPreprocessor {
    min_rating: Option<f64>,
    chunker: Arc<dyn Chunker>,
}

impl ReviewPreprocessor {
    /// Create a preprocessor with a [`RecursiveChunker`].
    pub fn new(chunk_size: usize, chunk_overlap: usize, min_rating: Option<f64>) -> Self {
        Self { min_rating, chunker: Arc::new(RecursiveChunker::new(chunk_size, chunk_overlap)) }
    }

    /// Create a preprocessor from the pipeline configuration.
    pub fn from_config(config: &ReviewRagConfig) -> Self {
        Self::new(config.chunk_size, config.chunk_overlap, config.min_rating)
    }

    /// Replace the text splitter.
    pub fn with_chunker(mut self, chunker: Arc<dyn Chunker>) -> Self {
        self.chunker = chunker;
        self
    }

    /// The minimum rating applied by [`clean`](Self::clean), if any.
    pub fn min_rating(&self) -> Option<f64> {
        self.min_rating
    }

    /// Clean review text and drop unusable rows.
    ///
    /// Drops rows without text, rows whose cleaned text is at most
    /// [`MIN_CLEAN_TEXT_CHARS`] characters and, when a minimum rating is
    /// configured, rows rated below it (including unrated rows). Surviving
    /// rows keep their relative order.
    pub fn clean(&self, records: Vec<ReviewRecord>) -> Vec<ReviewRecord> {
        let input = records.len();
        let cleaned: Vec<ReviewRecord> = records
            .into_iter()
            .filter_map(|mut record| {
                let text = clean_text(record.text.as_deref()?);
                if text.chars().count() <= MIN_CLEAN_TEXT_CHARS {
                    return None;
                }
                if let Some(min) = self.min_rating {
                    if record.rating.is_none_or(|rating| rating < min) {
                        return None;
                    }
                }
                record.text = Some(text);
                Some(record)
            })
            .collect();

        info!(input, kept = cleaned.len(), min_rating = ?self.min_rating, "cleaned reviews");
        cleaned
    }

    /// Compose each review's text block, split it, and attach the parent's metadata.
    ///
    /// Deterministic: identical input yields identical chunk texts.
    pub fn to_documents(&self, records: &[ReviewRecord]) -> Vec<Document> {
        let mut documents = Vec::new();
        for record in records {
            let metadata = ChunkMetadata {
                product_id: record.product_id.clone(),
                rating: record.rating,
                summary: record.summary.clone().unwrap_or_default(),
            };
            for chunk in self.chunker.split_text(&compose_text(record)) {
                documents.push(Document::new(chunk, metadata.clone()));
            }
        }
        info!(reviews = records.len(), chunk_count = documents.len(), "built documents");
        documents
    }
}

/// Join the summary, rating and body lines of a review, omitting empty parts.
pub fn compose_text(record: &ReviewRecord) -> String {
    let mut parts = Vec::with_capacity(3);
    if let Some(summary) = record.summary.as_deref().filter(|s| !s.is_empty()) {
        parts.push(format!("Summary: {summary}"));
    }
    if let Some(rating) = record.rating.filter(|r| *r != 0.0) {
        parts.push(format!("Rating: {}/5", format_rating(rating)));
    }
    if let Some(body) = record.text.as_deref().filter(|s| !s.is_empty()) {
        parts.push(format!("Review: {body}"));
    }
    parts.join("\n")
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn strips_markup_urls_and_whitespace() {
        let raw = "  Works <b>great</b>!<br/>See   https://example.com/x?y=1 for\n\tdetails ";
        assert_eq!(clean_text(raw), "Works great ! See for details");
    }

    #[test]
    fn drops_short_and_missing_text() {
        let pre = ReviewPreprocessor::new(512, 50, None);
        let records = vec![
            ReviewRecord::new("<p>Too short</p>", 5.0, "B001"),
            ReviewRecord { text: None, rating: Some(5.0), product_id: "B001".into(), summary: None },
            ReviewRecord::new("This one is comfortably long enough.", 3.0, "B002"),
            ReviewRecord::new("exactly twenty chars", 4.0, "B003"),
        ];
        let cleaned = pre.clean(records);
        assert_eq!(cleaned.len(), 1);
        assert_eq!(cleaned[0].product_id, "B002");
    }

    #[test]
    fn min_rating_drops_low_and_unrated_rows() {
        let pre = ReviewPreprocessor::new(512, 50, Some(4.0));
        let mut unrated = ReviewRecord::new("An unrated but otherwise fine review.", 0.0, "B9");
        unrated.rating = None;
        let records = vec![
            ReviewRecord::new("Great for beginners, very intuitive.", 5.0, "B001"),
            ReviewRecord::new("Too complicated, confusing manual.", 2.0, "B001"),
            ReviewRecord::new("Exactly at the threshold and long.", 4.0, "B002"),
            unrated,
        ];
        let ratings: Vec<_> = pre.clean(records).iter().map(|r| r.rating).collect();
        assert_eq!(ratings, vec![Some(5.0), Some(4.0)]);
    }

    #[test]
    fn composes_summary_rating_and_body() {
        let record = ReviewRecord::new("Solid build.", 4.5, "B001").with_summary("Sturdy");
        assert_eq!(compose_text(&record), "Summary: Sturdy\nRating: 4.5/5\nReview: Solid build.");

        let record = ReviewRecord::new("Solid build.", 5.0, "B001");
        assert_eq!(compose_text(&record), "Rating: 5/5\nReview: Solid build.");

        let record = ReviewRecord::new("No stars given.", 0.0, "B001");
        assert_eq!(compose_text(&record), "Review: No stars given.");
    }

    #[test]
    fn every_chunk_carries_parent_metadata() {
        let pre = ReviewPreprocessor::new(60, 10, None);
        let body = "The motor is strong. ".repeat(10);
        let record = ReviewRecord::new(body, 4.0, "B777").with_summary("Powerful");
        let docs = pre.to_documents(&[record]);
        assert!(docs.len() > 1);
        for doc in &docs {
            assert_eq!(doc.metadata.product_id, "B777");
            assert_eq!(doc.metadata.rating, Some(4.0));
            assert_eq!(doc.metadata.summary, "Powerful");
            assert!(doc.distance.is_none());
            assert!(doc.text.chars().count() <= 60);
        }
    }
}
