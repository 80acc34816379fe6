//! End-to-end access control scenarios.

use bytes::Bytes;
use docvault_core::{DocumentDraft, DocumentFilter, Login};
use docvault_simulation::prelude::*;

fn harness() -> SimulationHarness {
    init_test_tracing();
    SimulationHarness::start().unwrap()
}

#[tokio::test]
async fn public_private_and_granted_documents() {
    let h = harness();
    let alice = h.requester("alice").unwrap();
    let bob = h.requester("bob").unwrap();

    // A public file is readable by anyone.
    let report = h
        .service()
        .upload(
            &alice,
            DocumentDraft::file("report.pdf", "application/pdf").public(true),
            Bytes::from_static(b"%PDF-1.7"),
        )
        .await
        .unwrap();
    let fetched = h.service().get_document(&report, &bob).await.unwrap();
    assert!(fetched.document.is_file);
    assert_eq!(fetched.content, Some(Bytes::from_static(b"%PDF-1.7")));

    // A private inline document is not.
    let secret = h
        .service()
        .upload(
            &alice,
            DocumentDraft::json("secret", br#"{"pin":1234}"#.to_vec()),
            Bytes::new(),
        )
        .await
        .unwrap();
    h.service().get_document(&secret, &bob).await.assert_forbidden();

    // Granting bob opens it.
    h.service()
        .grant(&secret, &alice, &[Login::new("bob")])
        .await
        .unwrap();
    let fetched = h.service().get_document(&secret, &bob).await.unwrap();
    assert_eq!(fetched.document.json_data, br#"{"pin":1234}"#);

    // Replacing the grants with nothing closes it again.
    h.service().grant(&secret, &alice, &[]).await.unwrap();
    h.service().get_document(&secret, &bob).await.assert_forbidden();
}

#[tokio::test]
async fn only_the_owner_deletes_or_regrants() {
    let h = harness();
    let alice = h.requester("alice").unwrap();
    let bob = h.requester("bob").unwrap();

    let draft = DocumentDraft::json("shared", b"[]".to_vec()).grants([Login::new("bob")]);
    let id = h.service().upload(&alice, draft, Bytes::new()).await.unwrap();

    h.service().get_document(&id, &bob).await.assert_ok();
    h.service().delete(&id, &bob).await.assert_forbidden();
    h.service()
        .grant(&id, &bob, &[Login::new("carol")])
        .await
        .assert_forbidden();

    assert_eq!(h.document_count(), 1);
    assert_eq!(h.service().metrics().snapshot().forbidden, 2);
}

#[tokio::test]
async fn list_only_shows_visible_documents() {
    let h = harness();
    let alice = h.requester("alice").unwrap();
    let bob = h.requester("bob").unwrap();
    let carol = h.requester("carol").unwrap();

    for (name, public, grants) in [
        ("a-public", true, vec![]),
        ("b-private", false, vec![]),
        ("c-for-bob", false, vec![Login::new("bob")]),
    ] {
        let draft = DocumentDraft::json(name, b"{}".to_vec())
            .public(public)
            .grants(grants);
        h.service().upload(&alice, draft, Bytes::new()).await.unwrap();
    }

    let names = |docs: Vec<docvault_core::Document>| -> Vec<String> {
        docs.into_iter().map(|d| d.name).collect()
    };
    let all = DocumentFilter::default();

    let alice_view = h.service().list_documents(&alice, None, &all).await.unwrap();
    assert_eq!(names(alice_view), ["a-public", "b-private", "c-for-bob"]);

    let bob_view = h.service().list_documents(&bob, None, &all).await.unwrap();
    assert_eq!(names(bob_view), ["a-public", "c-for-bob"]);

    let carol_view = h
        .service()
        .list_documents(&carol, Some(&alice.login), &all)
        .await
        .unwrap();
    assert_eq!(names(carol_view), ["a-public"]);
}

#[tokio::test]
async fn filter_validation_on_list() {
    let h = harness();
    let alice = h.requester("alice").unwrap();

    h.service()
        .list_documents(&alice, None, &DocumentFilter::new("", "x", 0))
        .await
        .assert_invalid_params();
    h.service()
        .list_documents(&alice, None, &DocumentFilter::new("unknown", "x", 0))
        .await
        .assert_invalid_params();
    h.service()
        .list_documents(&alice, None, &DocumentFilter::new("mime", "", 5))
        .await
        .assert_ok();
    h.service()
        .list_documents(&alice, None, &DocumentFilter::default())
        .await
        .assert_ok();
}

#[tokio::test]
async fn grants_follow_login_not_user_id() {
    // Grants name logins. A grant naming a user ID does not match anyone.
    let h = harness();
    let alice = h.requester("alice").unwrap();
    let bob = h.requester("bob").unwrap();

    let draft = DocumentDraft::json("by-id", b"{}".to_vec()).grants([Login::new(bob.id.as_str())]);
    let id = h.service().upload(&alice, draft, Bytes::new()).await.unwrap();

    h.service().get_document(&id, &bob).await.assert_forbidden();
}

#[tokio::test]
async fn uploads_never_share_blob_storage() {
    let h = harness();
    let alice = h.requester("alice").unwrap();
    let bob = h.requester("bob").unwrap();

    let alices = h
        .service()
        .upload(
            &alice,
            DocumentDraft::file("notes.txt", "text/plain"),
            Bytes::from_static(b"ALICE"),
        )
        .await
        .unwrap();

    // A draft naming alice's document as its locator gets its own blob.
    let draft: DocumentDraft = serde_json::from_value(serde_json::json!({
        "name": "notes.txt",
        "mime": "text/plain",
        "is_file": true,
        "is_public": false,
        "path": alices.as_str(),
    }))
    .unwrap();
    let bobs = h
        .service()
        .upload(&bob, draft, Bytes::from_static(b"BOB"))
        .await
        .unwrap();

    let alice_doc = h.stored_document(&alices).await.unwrap();
    let bob_doc = h.stored_document(&bobs).await.unwrap();
    assert_ne!(alice_doc.blob_key(), bob_doc.blob_key());
    assert_eq!(h.blob_count(), 2);

    h.service().delete(&bobs, &bob).await.unwrap();
    let fetched = h.service().get_document(&alices, &alice).await.unwrap();
    assert_eq!(fetched.content, Some(Bytes::from_static(b"ALICE")));
}
