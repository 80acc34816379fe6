//! Read-through cache behaviour: degradation, invalidation, and expiry.

use std::time::Duration;

use bytes::Bytes;
use docvault_cache::CacheKey;
use docvault_core::{DocumentDraft, DocumentFilter, Login};
use docvault_simulation::prelude::*;

fn harness() -> SimulationHarness {
    init_test_tracing();
    SimulationHarness::start().unwrap()
}

fn names(docs: Vec<docvault_core::Document>) -> Vec<String> {
    docs.into_iter().map(|d| d.name).collect()
}

#[tokio::test]
async fn every_operation_works_with_the_cache_down() {
    let h = harness();
    let alice = h.requester("alice").unwrap();
    let bob = h.requester("bob").unwrap();
    h.take_cache_down();

    let id = h
        .service()
        .upload(
            &alice,
            DocumentDraft::file("a.txt", "text/plain"),
            Bytes::from_static(b"a"),
        )
        .await
        .unwrap();
    h.service().get_document(&id, &alice).await.assert_ok();
    h.service().get_document(&id, &bob).await.assert_forbidden();
    h.service()
        .grant(&id, &alice, &[Login::new("bob")])
        .await
        .assert_ok();
    h.service().get_document(&id, &bob).await.assert_ok();

    let listed = h
        .service()
        .list_documents(&bob, None, &DocumentFilter::default())
        .await
        .unwrap();
    assert_eq!(names(listed), ["a.txt"]);

    h.service().delete(&id, &alice).await.assert_ok();
    h.service().resolve_document(&id).await.assert_not_found();

    let snapshot = h.service().metrics().snapshot();
    assert!(snapshot.cache_errors > 0);
    assert_eq!(snapshot.cache_hits, 0);
}

#[tokio::test]
async fn cache_outage_falls_back_to_the_store_on_every_read() {
    let h = harness();
    let alice = h.requester("alice").unwrap();
    let id = h
        .service()
        .upload(&alice, DocumentDraft::json("doc", b"{}".to_vec()), Bytes::new())
        .await
        .unwrap();
    h.take_cache_down();
    h.reset_counts();

    for _ in 0..3 {
        h.service().resolve_document(&id).await.assert_ok();
    }
    assert_eq!(h.call_count(StoreOp::MetadataById), 3);
}

#[tokio::test]
async fn upload_invalidates_owner_and_grantee_lists() {
    let h = harness();
    let alice = h.requester("alice").unwrap();
    let bob = h.requester("bob").unwrap();
    let all = DocumentFilter::default();

    // Warm both users' list views.
    assert!(h.service().list_documents(&alice, None, &all).await.unwrap().is_empty());
    assert!(h.service().list_documents(&bob, None, &all).await.unwrap().is_empty());
    let alice_key = CacheKey::list(&alice.login, None, &all);
    let bob_key = CacheKey::list(&bob.login, None, &all);
    assert!(h.is_cached(&alice_key));
    assert!(h.is_cached(&bob_key));

    let draft = DocumentDraft::json("shared", b"{}".to_vec()).grants([Login::new("bob")]);
    h.service().upload(&alice, draft, Bytes::new()).await.unwrap();

    assert!(!h.is_cached(&alice_key));
    assert!(!h.is_cached(&bob_key));
    assert!(!h.is_cached(&CacheKey::user_docs(&bob.login)));
    assert_eq!(
        names(h.service().list_documents(&bob, None, &all).await.unwrap()),
        ["shared"]
    );
}

#[tokio::test]
async fn unrelated_users_keep_their_cached_lists() {
    let h = harness();
    let alice = h.requester("alice").unwrap();
    let carol = h.requester("carol").unwrap();
    let all = DocumentFilter::default();

    h.service().list_documents(&carol, None, &all).await.unwrap();
    h.service()
        .upload(&alice, DocumentDraft::json("mine", b"{}".to_vec()), Bytes::new())
        .await
        .unwrap();

    assert!(h.is_cached(&CacheKey::list(&carol.login, None, &all)));
}

#[tokio::test]
async fn revoking_invalidates_previous_grantees() {
    let h = harness();
    let alice = h.requester("alice").unwrap();
    let bob = h.requester("bob").unwrap();
    let all = DocumentFilter::default();

    let draft = DocumentDraft::json("shared", b"{}".to_vec()).grants([Login::new("bob")]);
    let id = h.service().upload(&alice, draft, Bytes::new()).await.unwrap();
    assert_eq!(
        names(h.service().list_documents(&bob, None, &all).await.unwrap()),
        ["shared"]
    );

    h.service().grant(&id, &alice, &[]).await.unwrap();

    assert!(!h.is_cached(&CacheKey::list(&bob.login, None, &all)));
    assert!(!h.is_cached(&CacheKey::document(&id)));
    assert!(h.service().list_documents(&bob, None, &all).await.unwrap().is_empty());
}

#[tokio::test]
async fn newly_granted_users_see_stale_lists_until_expiry() {
    let h = harness();
    let alice = h.requester("alice").unwrap();
    let carol = h.requester("carol").unwrap();
    let all = DocumentFilter::default();

    let id = h
        .service()
        .upload(&alice, DocumentDraft::json("late", b"{}".to_vec()), Bytes::new())
        .await
        .unwrap();
    assert!(h.service().list_documents(&carol, None, &all).await.unwrap().is_empty());

    h.service()
        .grant(&id, &alice, &[Login::new("carol")])
        .await
        .unwrap();

    // Grant only invalidates the grant list it replaced, so carol's cached
    // view still predates the grant. Direct reads see it at once.
    assert!(h.service().list_documents(&carol, None, &all).await.unwrap().is_empty());
    h.service().get_document(&id, &carol).await.assert_ok();
}

#[tokio::test]
async fn delete_invalidates_the_document_entry() {
    let h = harness();
    let alice = h.requester("alice").unwrap();
    let id = h
        .service()
        .upload(&alice, DocumentDraft::json("doc", b"{}".to_vec()), Bytes::new())
        .await
        .unwrap();
    h.service().resolve_document(&id).await.unwrap();
    assert!(h.is_cached(&CacheKey::document(&id)));

    h.service().delete(&id, &alice).await.unwrap();

    assert!(!h.is_cached(&CacheKey::document(&id)));
    h.service().resolve_document(&id).await.assert_not_found();
}

#[tokio::test]
async fn failed_invalidation_is_counted_not_raised() {
    let h = harness();
    let alice = h.requester("alice").unwrap();
    h.fail(StoreOp::CacheDelete, FailureType::Backend("READONLY".into()));

    h.service()
        .upload(&alice, DocumentDraft::json("doc", b"{}".to_vec()), Bytes::new())
        .await
        .assert_ok();

    assert!(h.service().metrics().snapshot().invalidation_failures > 0);
    assert_eq!(
        h.last_subject(StoreOp::CacheDelete).as_deref(),
        Some("docs:alice")
    );
}

#[tokio::test(start_paused = true)]
async fn cached_entries_expire_after_the_ttl() {
    init_test_tracing();
    let h = SimulationHarness::builder()
        .user("u-alice", "alice")
        .cache_ttl(Duration::from_secs(30))
        .build()
        .unwrap();
    let alice = h.requester("alice").unwrap();
    let id = h
        .service()
        .upload(&alice, DocumentDraft::json("doc", b"{}".to_vec()), Bytes::new())
        .await
        .unwrap();
    h.reset_counts();

    h.service().resolve_document(&id).await.unwrap();
    h.service().resolve_document(&id).await.unwrap();
    assert_eq!(h.call_count(StoreOp::MetadataById), 1);

    tokio::time::advance(Duration::from_secs(31)).await;
    assert!(!h.is_cached(&CacheKey::document(&id)));

    h.service().resolve_document(&id).await.unwrap();
    assert_eq!(h.call_count(StoreOp::MetadataById), 2);
}

#[tokio::test]
async fn cache_hit_survives_metadata_removal() {
    let h = harness();
    let alice = h.requester("alice").unwrap();
    let id = h
        .service()
        .upload(&alice, DocumentDraft::json("doc", b"{}".to_vec()), Bytes::new())
        .await
        .unwrap();
    h.service().resolve_document(&id).await.unwrap();

    assert!(h.remove_metadata(&id).await);
    h.service().resolve_document(&id).await.assert_ok();
}

#[tokio::test]
async fn cached_value_is_the_serialized_document() {
    let h = harness();
    let alice = h.requester("alice").unwrap();
    let id = h
        .service()
        .upload(&alice, DocumentDraft::json("doc", b"{}".to_vec()), Bytes::new())
        .await
        .unwrap();
    let doc = h.service().resolve_document(&id).await.unwrap();

    let raw = h.cached_value(&CacheKey::document(&id)).await.unwrap();
    let decoded: docvault_core::Document = serde_json::from_str(&raw).unwrap();
    assert_eq!(decoded, doc);
}

#[tokio::test]
async fn corrupt_cache_entries_are_internal_errors() {
    let h = harness();
    let alice = h.requester("alice").unwrap();
    let id = h
        .service()
        .upload(&alice, DocumentDraft::json("doc", b"{}".to_vec()), Bytes::new())
        .await
        .unwrap();

    h.seed_cache(&CacheKey::document(&id), "{not json").await;
    h.service().resolve_document(&id).await.assert_internal();
    h.service().get_document(&id, &alice).await.assert_internal();

    let all = DocumentFilter::default();
    h.seed_cache(&CacheKey::list(&alice.login, None, &all), "[{").await;
    h.service()
        .list_documents(&alice, None, &all)
        .await
        .assert_internal();
}
