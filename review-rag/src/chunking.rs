//! Recursive-boundary text splitting.
//!
//! [`RecursiveChunker`] prefers the coarsest boundary that still yields pieces
//! within the chunk size: paragraph breaks, then line breaks, then sentence
//! ends, then spaces, then single characters. Small pieces are merged back
//! together greedily and consecutive chunks share up to `chunk_overlap`
//! characters of context.
//!
//! All lengths are counted in characters (Unicode scalar values), never bytes.

use std::collections::VecDeque;

/// A strategy for splitting text into bounded chunks.
pub trait Chunker: Send + Sync {
    /// Split `text` into chunks. Returns an empty `Vec` for blank text.
    fn split_text(&self, text: &str) -> Vec<String>;
}

/// Separators tried in order, coarsest first. The empty separator splits into characters.
pub const DEFAULT_SEPARATORS: [&str; 5] = ["\n\n", "\n", ". ", " ", ""];

/// Splits text hierarchically: paragraphs → lines → sentences → words → characters.
///
/// # Example
///
/// ```rust,ignore
/// use review_rag::{Chunker, RecursiveChunker};
///
/// let chunker = RecursiveChunker::new(512, 50);
/// let chunks = chunker.split_text(&composed_review);
/// ```
#[derive(Debug, Clone)]
pub struct RecursiveChunker {
    chunk_size: usize,
    chunk_overlap: usize,
    separators: Vec<String>,
}

impl RecursiveChunker {
    /// Create a new `RecursiveChunker` with [`DEFAULT_SEPARATORS`].
    ///
    /// # Arguments
    ///
    /// * `chunk_size`: maximum number of characters per chunk
    /// * `chunk_overlap`: maximum number of characters carried over between consecutive chunks
    pub fn new(chunk_size: usize, chunk_overlap: usize) -> Self {
        Self {
            chunk_size: chunk_size.max(1),
            chunk_overlap,
            separators: DEFAULT_SEPARATORS.iter().map(|s| s.to_string()).collect(),
        }
    }

    /// Replace the separator hierarchy.
    pub fn with_separators<I, S>(mut self, separators: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        self.separators = separators.into_iter().map(Into::into).collect();
        self
    }

    /// Maximum characters per chunk.
    pub fn chunk_size(&self) -> usize {
        self.chunk_size
    }

    /// Characters shared between consecutive chunks.
    pub fn chunk_overlap(&self) -> usize {
        self.chunk_overlap
    }

    fn split_recursive(&self, text: &str, separators: &[String]) -> Vec<String> {
        // Pick the first separator present in the text; the empty one always matches.
        let mut separator = separators.last().map(String::as_str).unwrap_or("");
        let mut remaining: &[String] = &[];
        for (i, candidate) in separators.iter().enumerate() {
            if candidate.is_empty() {
                separator = "";
                break;
            }
            if text.contains(candidate.as_str()) {
                separator = candidate;
                remaining = &separators[i + 1..];
                break;
            }
        }

        let mut chunks = Vec::new();
        let mut small: Vec<&str> = Vec::new();

        for piece in split_keeping_separator(text, separator) {
            if char_len(piece) < self.chunk_size {
                small.push(piece);
                continue;
            }
            if !small.is_empty() {
                chunks.extend(self.merge_splits(&small));
                small.clear();
            }
            if remaining.is_empty() {
                chunks.push(piece.to_string());
            } else {
                chunks.extend(self.split_recursive(piece, remaining));
            }
        }

        if !small.is_empty() {
            chunks.extend(self.merge_splits(&small));
        }

        chunks
    }

    /// Greedily merge pieces into chunks of at most `chunk_size` characters,
    /// keeping a tail of at most `chunk_overlap` characters as the start of the next chunk.
    fn merge_splits(&self, pieces: &[&str]) -> Vec<String> {
        let mut chunks = Vec::new();
        let mut window: VecDeque<(&str, usize)> = VecDeque::new();
        let mut total = 0;

        for piece in pieces {
            let len = char_len(piece);
            if total + len > self.chunk_size && !window.is_empty() {
                if let Some(chunk) = join_trimmed(&window) {
                    chunks.push(chunk);
                }
                while total > self.chunk_overlap || (total > 0 && total + len > self.chunk_size) {
                    match window.pop_front() {
                        Some((_, dropped)) => total -= dropped,
                        None => break,
                    }
                }
            }
            window.push_back((piece, len));
            total += len;
        }

        if let Some(chunk) = join_trimmed(&window) {
            chunks.push(chunk);
        }

        chunks
    }
}

impl Chunker for RecursiveChunker {
    fn split_text(&self, text: &str) -> Vec<String> {
        if text.trim().is_empty() {
            return Vec::new();
        }
        self.split_recursive(text, &self.separators)
    }
}

fn char_len(s: &str) -> usize {
    s.chars().count()
}

fn join_trimmed(window: &VecDeque<(&str, usize)>) -> Option<String> {
    let joined: String = window.iter().map(|(piece, _)| *piece).collect();
    let trimmed = joined.trim();
    (!trimmed.is_empty()).then(|| trimmed.to_string())
}

/// Split at `separator`, attaching each separator to the start of the piece that follows it.
/// An empty separator splits into single characters. Empty pieces are dropped.
fn split_keeping_separator<'a>(text: &'a str, separator: &str) -> Vec<&'a str> {
    if separator.is_empty() {
        return text.char_indices().map(|(i, c)| &text[i..i + c.len_utf8()]).collect();
    }

    let mut pieces = Vec::new();
    let mut start = 0;
    for (pos, _) in text.match_indices(separator) {
        if pos > start {
            pieces.push(&text[start..pos]);
        }
        start = pos;
    }
    if start < text.len() {
        pieces.push(&text[start..]);
    }
    pieces
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn short_text_yields_single_chunk() {
        let chunker = RecursiveChunker::new(512, 50);
        let text = "Summary: Nice\nRating: 5/5\nReview: Great for beginners, very intuitive.";
        assert_eq!(chunker.split_text(text), vec![text.to_string()]);
    }

    #[test]
    fn blank_text_yields_nothing() {
        let chunker = RecursiveChunker::new(512, 50);
        assert!(chunker.split_text("  \n ").is_empty());
    }

    #[test]
    fn separator_attaches_to_following_piece() {
        assert_eq!(split_keeping_separator("a. b. c", ". "), vec!["a", ". b", ". c"]);
        assert_eq!(split_keeping_separator("\n\nx", "\n\n"), vec!["\n\nx"]);
        assert_eq!(split_keeping_separator("hé", ""), vec!["h", "é"]);
    }

    #[test]
    fn prefers_paragraph_boundaries() {
        let para_a = "a".repeat(30);
        let para_b = "b".repeat(30);
        let text = format!("{para_a}\n\n{para_b}");
        let chunks = RecursiveChunker::new(40, 0).split_text(&text);
        assert_eq!(chunks, vec![para_a, para_b]);
    }

    #[test]
    fn consecutive_chunks_overlap() {
        let text: String = (0..60).map(|i| format!("word{i:02} ")).collect();
        let chunks = RecursiveChunker::new(50, 10).split_text(&text);
        assert!(chunks.len() > 1);
        for pair in chunks.windows(2) {
            let first_word = pair[1].split(' ').next().unwrap();
            assert!(pair[0].contains(first_word), "{:?} does not overlap {:?}", pair[0], pair[1]);
        }
    }

    #[test]
    fn unbreakable_text_falls_back_to_characters() {
        let text = "x".repeat(25);
        let chunks = RecursiveChunker::new(10, 2).split_text(&text);
        assert!(chunks.iter().all(|c| c.chars().count() <= 10));
        assert_eq!(chunks[0], "x".repeat(10));
    }

    #[test]
    fn multibyte_text_is_measured_in_characters() {
        let text = "é".repeat(12);
        let chunks = RecursiveChunker::new(5, 0).split_text(&text);
        assert_eq!(chunks.len(), 3);
        assert!(chunks.iter().all(|c| c.chars().count() <= 5));
    }
}
