//! Property tests for in-memory vector store search ordering.

use std::collections::BTreeMap;

use nepisirsem_rag::document::{Metadata, VectorRecord};
use nepisirsem_rag::inmemory::InMemoryVectorStore;
use nepisirsem_rag::vectorstore::VectorStore;
use proptest::prelude::*;

/// Generate a non-zero L2-normalized embedding of the given dimension.
fn arb_normalized_embedding(dim: usize) -> impl Strategy<Value = Vec<f32>> {
    proptest::collection::vec(-1.0f32..1.0f32, dim).prop_filter_map(
        "non-zero embedding",
        |mut v| {
            let norm: f32 = v.iter().map(|x| x * x).sum::<f32>().sqrt();
            if norm < 1e-8 {
                return None;
            }
            for val in &mut v {
                *val /= norm;
            }
            Some(v)
        },
    )
}

fn arb_record(dim: usize) -> impl Strategy<Value = VectorRecord> {
    ("[a-z]{3,8}", "[a-zçğıöşü ]{5,30}", arb_normalized_embedding(dim)).prop_map(
        |(id, text, embedding)| VectorRecord {
            id,
            text,
            embedding,
            metadata: Metadata::new(),
            document_id: "tarifler".to_string(),
        },
    )
}

/// Searching returns at most `top_k` results, in descending score order with
/// ties broken by ascending ID, and never more than the number of distinct IDs.
mod prop_inmemory_search_ordering {
    use super::*;

    const DIM: usize = 16;

    proptest! {
        #![proptest_config(ProptestConfig::with_cases(100))]

        #[test]
        fn results_ordered_descending_and_bounded_by_top_k(
            records in proptest::collection::vec(arb_record(DIM), 1..20),
            query in arb_normalized_embedding(DIM),
            top_k in 1usize..25,
        ) {
            let rt = tokio::runtime::Runtime::new().unwrap();
            let (results, unique_count) = rt.block_on(async {
                let store = InMemoryVectorStore::new();
                store.put(&records).await.unwrap();

                let unique: BTreeMap<&str, ()> =
                    records.iter().map(|r| (r.id.as_str(), ())).collect();
                let results = store.query(&query, top_k).await.unwrap();
                (results, unique.len())
            });

            prop_assert!(results.len() <= top_k);
            prop_assert_eq!(results.len(), top_k.min(unique_count));

            for window in results.windows(2) {
                prop_assert!(
                    window[0].score >= window[1].score,
                    "results not in descending order: {} < {}",
                    window[0].score,
                    window[1].score,
                );
                if window[0].score == window[1].score {
                    prop_assert!(window[0].record.id < window[1].record.id);
                }
            }
        }
    }
}

#[tokio::test]
async fn reset_clears_records_and_manifest() {
    use chrono::Utc;
    use nepisirsem_rag::IndexManifest;

    let store = InMemoryVectorStore::new();
    let record = VectorRecord {
        id: "a".into(),
        text: "ayran".into(),
        embedding: vec![1.0, 0.0],
        metadata: Metadata::new(),
        document_id: "d".into(),
    };
    store.put(&[record]).await.unwrap();
    store
        .write_manifest(&IndexManifest {
            source: "d.txt".into(),
            document_id: "d".into(),
            chunk_size: 10,
            chunk_overlap: 1,
            embedding_model: "mock-hashing".into(),
            dimensions: 2,
            record_count: 1,
            indexed_at: Utc::now(),
        })
        .await
        .unwrap();

    store.reset().await.unwrap();
    assert!(store.is_empty().await.unwrap());
    assert!(store.manifest().await.unwrap().is_none());

    // dimensionality is free again after a reset
    let wider = VectorRecord {
        id: "b".into(),
        text: "cacık".into(),
        embedding: vec![0.0, 0.0, 1.0],
        metadata: Metadata::new(),
        document_id: "d".into(),
    };
    store.put(&[wider]).await.unwrap();
    assert_eq!(store.len().await.unwrap(), 1);
}
