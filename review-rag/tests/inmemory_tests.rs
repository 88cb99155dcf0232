//! Property tests for in-memory vector store search ordering.

use proptest::prelude::*;
use review_rag::document::{ChunkMetadata, Document, IndexedEntry};
use review_rag::inmemory::InMemoryVectorStore;
use review_rag::vectorstore::VectorStore;

/// Generate a non-zero L2-normalized embedding of the given dimension.
fn arb_normalized_embedding(dim: usize) -> impl Strategy<Value = Vec<f32>> {
    proptest::collection::vec(-1.0f32..1.0f32, dim).prop_filter_map("non-zero embedding", |mut v| {
        let norm: f32 = v.iter().map(|x| x * x).sum::<f32>().sqrt();
        if norm < 1e-8 {
            return None;
        }
        for val in &mut v {
            *val /= norm;
        }
        Some(v)
    })
}

/// Generate an indexed entry with a normalized embedding.
fn arb_entry(dim: usize) -> impl Strategy<Value = IndexedEntry> {
    ("[a-z ]{5,30}", proptest::option::of(1u8..=5), arb_normalized_embedding(dim)).prop_map(
        |(text, rating, embedding)| {
            let metadata = ChunkMetadata {
                product_id: "B001".to_string(),
                rating: rating.map(f64::from),
                summary: String::new(),
            };
            IndexedEntry::new(Document::new(text, metadata), embedding)
        },
    )
}

mod prop_inmemory_search_ordering {
    use super::*;

    const DIM: usize = 16;

    proptest! {
        #![proptest_config(ProptestConfig::with_cases(100))]

        #[test]
        fn results_ordered_ascending_and_bounded_by_top_k(
            entries in proptest::collection::vec(arb_entry(DIM), 0..20),
            query in arb_normalized_embedding(DIM),
            top_k in 0usize..25,
        ) {
            let rt = tokio::runtime::Runtime::new().unwrap();
            let results = rt.block_on(async {
                let store = InMemoryVectorStore::new();
                store.insert(&entries).await.unwrap();
                store.search(&query, top_k).await.unwrap()
            });

            prop_assert!(results.len() <= top_k);
            prop_assert_eq!(results.len(), top_k.min(entries.len()));

            for result in &results {
                prop_assert!(result.distance.is_some());
            }
            for window in results.windows(2) {
                let (a, b) = (window[0].distance.unwrap(), window[1].distance.unwrap());
                prop_assert!(a <= b, "results not in ascending order: {} > {}", a, b);
            }
        }

        #[test]
        fn count_tracks_inserts_and_reset(
            batches in proptest::collection::vec(proptest::collection::vec(arb_entry(DIM), 0..6), 0..5),
        ) {
            let rt = tokio::runtime::Runtime::new().unwrap();
            let (count, after_reset) = rt.block_on(async {
                let store = InMemoryVectorStore::new();
                for batch in &batches {
                    store.insert(batch).await.unwrap();
                }
                let count = store.count().await.unwrap();
                store.reset().await.unwrap();
                (count, store.count().await.unwrap())
            });

            prop_assert_eq!(count, batches.iter().map(Vec::len).sum::<usize>());
            prop_assert_eq!(after_reset, 0);
        }
    }
}

#[tokio::test]
async fn empty_store_search_returns_nothing() {
    let store = InMemoryVectorStore::new();
    let results = store.search(&[1.0, 0.0, 0.0], 5).await.unwrap();
    assert!(results.is_empty());
}
