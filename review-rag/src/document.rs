//! Data types for review records, chunks, indexed entries and retrieval results.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

/// One input row as read from a CSV or JSON review file.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Default)]
pub struct ReviewRecord {
    /// The review body. `None` when the cell was empty or null.
    pub text: Option<String>,
    /// Numeric rating on a 0–5 scale.
    pub rating: Option<f64>,
    /// Identifier of the reviewed product.
    pub product_id: String,
    /// Optional one-line summary written by the reviewer.
    pub summary: Option<String>,
}

impl ReviewRecord {
    /// Convenience constructor for a record with body, rating and product id.
    pub fn new(text: impl Into<String>, rating: f64, product_id: impl Into<String>) -> Self {
        Self {
            text: Some(text.into()),
            rating: Some(rating),
            product_id: product_id.into(),
            summary: None,
        }
    }

    /// Attach a summary.
    pub fn with_summary(mut self, summary: impl Into<String>) -> Self {
        self.summary = Some(summary.into());
        self
    }
}

/// Metadata carried by every chunk, copied from its parent review at creation time.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Default)]
#[serde(rename_all = "camelCase")]
pub struct ChunkMetadata {
    /// Identifier of the reviewed product.
    pub product_id: String,
    /// The parent review's rating.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub rating: Option<f64>,
    /// The parent review's summary, empty when it had none.
    #[serde(default)]
    pub summary: String,
}

/// A chunk of review text with its metadata.
///
/// On the write path `distance` is `None`; results of a similarity query carry
/// the index's distance to the query (lower is more similar).
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct Document {
    /// The chunk text.
    pub text: String,
    /// Metadata inherited from the parent review.
    pub metadata: ChunkMetadata,
    /// Distance to the query, present only on retrieval results.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub distance: Option<f32>,
}

impl Document {
    /// Create a write-path document (no distance).
    pub fn new(text: impl Into<String>, metadata: ChunkMetadata) -> Self {
        Self { text: text.into(), metadata, distance: None }
    }

    /// Return a copy of this document annotated with a query distance.
    pub fn with_distance(mut self, distance: f32) -> Self {
        self.distance = Some(distance);
        self
    }
}

/// A [`Document`] persisted in a vector store together with its embedding.
///
/// Entries are never mutated; they disappear only when the whole collection is reset.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct IndexedEntry {
    /// Unique identifier generated at indexing time.
    pub id: String,
    /// The embedding vector for `document.text`.
    pub embedding: Vec<f32>,
    /// The stored chunk.
    pub document: Document,
    /// When the entry was written.
    pub indexed_at: DateTime<Utc>,
}

impl IndexedEntry {
    /// Create an entry with a fresh v4 UUID.
    pub fn new(document: Document, embedding: Vec<f32>) -> Self {
        Self {
            id: uuid::Uuid::new_v4().to_string(),
            embedding,
            document,
            indexed_at: Utc::now(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn metadata_serializes_camel_case() {
        let meta = ChunkMetadata {
            product_id: "B001".into(),
            rating: Some(5.0),
            summary: "Great".into(),
        };
        let json = serde_json::to_value(&meta).unwrap();
        assert_eq!(json["productId"], "B001");
        assert_eq!(json["rating"], 5.0);
    }

    #[test]
    fn write_path_document_has_no_distance() {
        let doc = Document::new("text", ChunkMetadata::default());
        assert!(doc.distance.is_none());
        let json = serde_json::to_value(&doc).unwrap();
        assert!(json.get("distance").is_none());
        assert_eq!(doc.with_distance(0.25).distance, Some(0.25));
    }

    #[test]
    fn entries_get_distinct_ids() {
        let doc = Document::new("text", ChunkMetadata::default());
        let a = IndexedEntry::new(doc.clone(), vec![1.0]);
        let b = IndexedEntry::new(doc, vec![1.0]);
        assert_ne!(a.id, b.id);
    }
}
