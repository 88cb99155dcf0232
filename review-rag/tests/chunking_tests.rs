//! Property tests for the recursive text splitter.

use proptest::prelude::*;
use review_rag::chunking::{Chunker, RecursiveChunker};

/// Review-like text: words, sentence ends, line and paragraph breaks.
fn arb_review_text() -> impl Strategy<Value = String> {
    proptest::collection::vec(
        prop_oneof![
            4 => "[a-zA-Z]{1,12}".prop_map(|w| format!("{w} ")),
            1 => Just(". ".to_string()),
            1 => Just("\n".to_string()),
            1 => Just("\n\n".to_string()),
            1 => "[a-z]{20,60}",
        ],
        0..120,
    )
    .prop_map(|parts| parts.concat())
}

/// Chunk size and an overlap strictly smaller than it.
fn arb_sizes() -> impl Strategy<Value = (usize, usize)> {
    (10usize..200).prop_flat_map(|size| (Just(size), 0..size))
}

mod prop_chunk_bounds {
    use super::*;

    proptest! {
        #![proptest_config(ProptestConfig::with_cases(200))]

        #[test]
        fn chunks_fit_and_are_never_empty(text in arb_review_text(), (size, overlap) in arb_sizes()) {
            let chunker = RecursiveChunker::new(size, overlap);
            for chunk in chunker.split_text(&text) {
                prop_assert!(!chunk.trim().is_empty());
                prop_assert!(
                    chunk.chars().count() <= size,
                    "chunk of {} chars exceeds {size}",
                    chunk.chars().count()
                );
            }
        }

        #[test]
        fn splitting_is_deterministic(text in arb_review_text(), (size, overlap) in arb_sizes()) {
            let chunker = RecursiveChunker::new(size, overlap);
            prop_assert_eq!(chunker.split_text(&text), chunker.split_text(&text));
        }

        #[test]
        fn short_text_is_one_trimmed_chunk(text in "[a-zA-Z][a-zA-Z .]{0,80}[a-zA-Z]") {
            let chunker = RecursiveChunker::new(512, 50);
            prop_assert_eq!(chunker.split_text(&text), vec![text.trim().to_string()]);
        }
    }
}

#[test]
fn every_word_survives_splitting() {
    let text = "The grinder is quiet. It cleans up in seconds.\n\nAfter two years it still works. \
                The lid is a bit flimsy though.";
    let chunker = RecursiveChunker::new(40, 10);
    let chunks = chunker.split_text(text);
    assert!(chunks.len() > 1);
    let joined = chunks.join(" ");
    for word in text.split_whitespace() {
        assert!(joined.contains(word.trim_end_matches('.')), "lost {word}");
    }
}
