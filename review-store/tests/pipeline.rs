mod common;

use std::sync::atomic::Ordering;

use common::{ScriptedStore, harness, harness_with_sample, last_page};
use review_providers::{ProviderError, StoreKind};
use review_store::{LiveIngestParams, LiveRefreshOutcome, LiveSources, ReviewError};
use serde_json::json;

#[tokio::test]
async fn reingesting_the_same_review_keeps_one_point() {
    let h = harness();
    let payload = json!([{"id": "gp-1", "title": "A", "snippet": "Great app", "rating": 5}]);

    let first = h.rag.pipeline().ingest_from_payload(payload.clone()).await.unwrap();
    let second = h.rag.pipeline().ingest_from_payload(payload).await.unwrap();

    assert_eq!(first.status, "ok");
    assert_eq!(first.inserted_count, 1);
    assert_eq!(first.total_docs, 1);
    assert_eq!(second.total_docs, 1);
}

#[tokio::test]
async fn reviews_without_source_id_are_still_idempotent() {
    let h = harness();
    let payload = json!({"reviews": [{"title": "A", "snippet": "Great app", "date": "2025-11-01"}]});
    h.rag.pipeline().ingest_from_payload(payload.clone()).await.unwrap();
    let again = h.rag.pipeline().ingest_from_payload(payload).await.unwrap();
    assert_eq!(again.total_docs, 1);
}

#[tokio::test]
async fn dimension_is_probed_once() {
    let h = harness();
    for i in 0..3 {
        h.rag
            .pipeline()
            .ingest_from_payload(json!([{"id": format!("r{i}"), "snippet": "ok"}]))
            .await
            .unwrap();
    }
    assert_eq!(h.embedder.probes.load(Ordering::SeqCst), 1);
}

#[tokio::test]
async fn scalar_payload_is_rejected() {
    let h = harness();
    let err = h.rag.pipeline().ingest_from_payload(json!("nope")).await;
    assert!(matches!(err, Err(ReviewError::Validation(_))));
}

#[tokio::test]
async fn empty_payload_indexes_nothing() {
    let h = harness();
    let summary = h.rag.pipeline().ingest_from_payload(json!([])).await.unwrap();
    assert_eq!(summary.inserted_count, 0);
    assert_eq!(summary.total_docs, 0);
}

#[tokio::test]
async fn preview_reports_full_count_and_truncates_lists() {
    let h = harness();
    let payload = json!({
        "google_play": [{"snippet": "one"}, {"snippet": "two"}],
        "apple": [{"snippet": "three", "device": "iOS"}]
    });
    let preview = h.rag.pipeline().preview_payload(payload, 2).unwrap();
    assert_eq!(preview.count, 3);
    assert_eq!(preview.documents, vec!["one", "two"]);
    assert_eq!(preview.metadatas.len(), 2);
    assert_eq!(h.rag.store().total_points().await.unwrap(), 0);
}

#[tokio::test]
async fn listing_shows_payload_and_short_snippet() {
    let h = harness();
    let long = "x".repeat(500);
    h.rag
        .pipeline()
        .ingest_from_payload(json!([{"id": "a", "title": "T", "snippet": long, "rating": 4.6,
                                      "date": "March 3, 2025", "device": "iOS"}]))
        .await
        .unwrap();

    let listing = h.rag.store().list_points(10).await.unwrap();
    assert_eq!(listing.total_docs, 1);
    let item = &listing.items[0];
    assert_eq!(item.id.as_deref(), Some("a"));
    assert_eq!(item.rating, Some(4));
    assert_eq!(item.snippet.chars().count(), 220);
    assert_eq!(item.date.as_deref(), Some("2025-03-03"));
    assert_eq!(item.version.as_deref(), Some("v1"));
    assert_eq!(item.device.as_deref(), Some("ios"));
    assert_eq!(item.country.as_deref(), Some("india"));
}

#[tokio::test]
async fn clear_and_recreate_empties_the_collection() {
    let h = harness();
    h.rag
        .pipeline()
        .ingest_from_payload(json!([{"id": "a"}, {"id": "b"}]))
        .await
        .unwrap();
    h.rag.store().clear_and_recreate().await.unwrap();
    assert_eq!(h.rag.store().total_points().await.unwrap(), 0);
}

#[tokio::test]
async fn mismatched_upsert_lengths_fail() {
    let h = harness();
    let err = h.rag.store().upsert(&["a".into()], &[], &[]).await;
    assert!(matches!(err, Err(ReviewError::Index(_))));
}

fn sources(play: Vec<serde_json::Value>, apple: Vec<serde_json::Value>) -> LiveSources<ScriptedStore> {
    LiveSources {
        google_play: ScriptedStore::new(StoreKind::GooglePlay, vec![last_page(play)]),
        apple: ScriptedStore::new(StoreKind::Apple, vec![last_page(apple)]),
    }
}

#[tokio::test]
async fn live_ingest_tags_devices() {
    let h = harness();
    let src = sources(
        vec![json!({"id": "g1", "snippet": "fast", "device": "web"})],
        vec![json!({"id": "a1", "snippet": "slow"})],
    );
    let summary = h
        .rag
        .pipeline()
        .ingest_live(&src, &LiveIngestParams::default())
        .await
        .unwrap();
    assert_eq!(summary.inserted_count, 2);

    let listing = h.rag.store().list_points(10).await.unwrap();
    let mut devices: Vec<_> = listing.items.iter().filter_map(|i| i.device.clone()).collect();
    devices.sort();
    assert_eq!(devices, vec!["android", "ios"]);
}

#[tokio::test]
async fn live_ingest_without_reviews_is_an_empty_result() {
    let h = harness();
    let src = LiveSources {
        google_play: ScriptedStore::new(
            StoreKind::GooglePlay,
            vec![Err(ProviderError::Upstream("Invalid API key".into()))],
        ),
        apple: ScriptedStore::empty(StoreKind::Apple),
    };
    let err = h.rag.pipeline().ingest_live(&src, &LiveIngestParams::default()).await;
    assert!(matches!(err, Err(ReviewError::EmptyResult(_))));
}

fn sample_file(reviews: serde_json::Value) -> tempfile::NamedTempFile {
    let file = tempfile::NamedTempFile::new().unwrap();
    std::fs::write(file.path(), reviews.to_string()).unwrap();
    file
}

#[tokio::test]
async fn refresh_merges_live_with_sample() {
    let sample = sample_file(json!([{"id": "s1", "snippet": "sample one"}, {"id": "s2", "snippet": "sample two"}]));
    let h = harness_with_sample(sample.path());
    h.rag
        .pipeline()
        .ingest_from_payload(json!([{"id": "stale"}]))
        .await
        .unwrap();

    let src = sources(vec![json!({"id": "g1", "snippet": "live"})], vec![]);
    let outcome = h
        .rag
        .pipeline()
        .refresh_live(&src, &LiveIngestParams::default(), true)
        .await
        .unwrap();

    match outcome {
        LiveRefreshOutcome::Ok {
            live_count,
            sample_count,
            merged_count,
            ingest_result,
        } => {
            assert_eq!((live_count, sample_count, merged_count), (1, 2, 3));
            assert_eq!(ingest_result.total_docs, 3);
        }
        other => panic!("unexpected outcome: {other:?}"),
    }
}

#[tokio::test]
async fn refresh_falls_back_to_sample_when_live_is_empty() {
    let sample = sample_file(json!([{"id": "s1", "snippet": "sample"}]));
    let h = harness_with_sample(sample.path());
    let src = sources(vec![], vec![]);

    let outcome = h
        .rag
        .pipeline()
        .refresh_live(&src, &LiveIngestParams::default(), true)
        .await
        .unwrap();

    match outcome {
        LiveRefreshOutcome::FallbackToSample { reason, ingest_result } => {
            assert!(reason.contains("no live reviews"));
            assert_eq!(ingest_result.total_docs, 1);
        }
        other => panic!("unexpected outcome: {other:?}"),
    }
}

#[tokio::test]
async fn refresh_without_fallback_returns_the_original_error() {
    let sample = sample_file(json!([{"id": "s1"}]));
    let h = harness_with_sample(sample.path());
    let err = h
        .rag
        .pipeline()
        .refresh_live(&sources(vec![], vec![]), &LiveIngestParams::default(), false)
        .await;
    assert!(matches!(err, Err(ReviewError::EmptyResult(_))));
}

#[tokio::test]
async fn refresh_reports_both_failures_when_sample_is_missing() {
    let h = harness();
    let err = h
        .rag
        .pipeline()
        .refresh_live(&sources(vec![], vec![]), &LiveIngestParams::default(), true)
        .await;
    match err {
        Err(ReviewError::Fallback { original, fallback }) => {
            assert!(original.contains("no live reviews"));
            assert!(fallback.contains("io error"));
        }
        other => panic!("unexpected result: {other:?}"),
    }
}
