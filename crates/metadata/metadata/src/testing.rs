use docvault_core::{Document, DocumentDraft, DocumentFilter, DocumentId, Login, UserId};

use crate::error::MetadataError;
use crate::store::MetadataStore;

/// Users the conformance suite expects the store to resolve, as
/// `(user id, login)` pairs.
pub const FIXTURE_USERS: [(&str, &str); 3] = [
    ("u-alice", "alice"),
    ("u-bob", "bob"),
    ("u-carol", "carol"),
];

fn doc(owner: &str, name: &str, mime: &str, is_public: bool) -> Document {
    let draft = DocumentDraft::file(name, mime).public(is_public);
    Document::from_draft(draft, UserId::new(owner))
}

fn login(s: &str) -> Login {
    Login::new(s)
}

fn names(docs: &[Document]) -> Vec<&str> {
    docs.iter().map(|d| d.name.as_str()).collect()
}

/// Run the metadata store conformance test suite.
///
/// The store must be empty and must resolve every entry of
/// [`FIXTURE_USERS`].
///
/// # Errors
///
/// Returns an error if the backend fails an operation that should succeed.
pub async fn run_metadata_conformance_tests(store: &dyn MetadataStore) -> Result<(), MetadataError> {
    test_create_and_get(store).await?;
    test_duplicate_id(store).await?;
    test_missing(store).await?;
    test_replace_grants(store).await?;
    test_by_owner(store).await?;
    test_delete(store).await?;
    test_filtered_visibility(store).await?;
    test_filtered_constraints(store).await?;
    Ok(())
}

async fn test_create_and_get(store: &dyn MetadataStore) -> Result<(), MetadataError> {
    let mut d = doc("u-alice", "create.txt", "text/plain", false);
    d.grants = vec![login("bob")];
    store.create(&d).await?;

    let fetched = store.by_id(&d.id).await?;
    assert_eq!(fetched.id, d.id);
    assert_eq!(fetched.owner_id, d.owner_id);
    assert_eq!(fetched.name, "create.txt");
    assert!(fetched.grants.is_empty(), "create must not persist grants");

    store.delete(&d.id).await
}

async fn test_duplicate_id(store: &dyn MetadataStore) -> Result<(), MetadataError> {
    let d = doc("u-alice", "dup.txt", "text/plain", false);
    store.create(&d).await?;
    let err = store.create(&d).await.expect_err("duplicate insert should fail");
    assert!(
        matches!(err, MetadataError::UniqueViolation { .. }),
        "expected unique violation, got {err:?}"
    );
    store.delete(&d.id).await
}

async fn test_missing(store: &dyn MetadataStore) -> Result<(), MetadataError> {
    let id = DocumentId::new("missing-doc");
    assert!(store.by_id(&id).await.is_err_and(|e| e.is_not_found()));
    assert!(store.delete(&id).await.is_err_and(|e| e.is_not_found()));
    assert!(
        store
            .replace_grants(&id, &[login("bob")])
            .await
            .is_err_and(|e| e.is_not_found())
    );
    Ok(())
}

async fn test_replace_grants(store: &dyn MetadataStore) -> Result<(), MetadataError> {
    let d = doc("u-alice", "grants.txt", "text/plain", false);
    store.create(&d).await?;

    store.replace_grants(&d.id, &[login("bob"), login("carol")]).await?;
    assert_eq!(store.by_id(&d.id).await?.grants, vec![login("bob"), login("carol")]);
    assert_eq!(names(&store.documents_granted_to(&login("bob")).await?), ["grants.txt"]);

    store.replace_grants(&d.id, &[login("carol")]).await?;
    assert_eq!(
        store.by_id(&d.id).await?.grants,
        vec![login("carol")],
        "grants are replaced, not merged"
    );
    assert!(store.documents_granted_to(&login("bob")).await?.is_empty());

    store.replace_grants(&d.id, &[]).await?;
    assert!(store.by_id(&d.id).await?.grants.is_empty());

    store.delete(&d.id).await
}

async fn test_by_owner(store: &dyn MetadataStore) -> Result<(), MetadataError> {
    let a = doc("u-alice", "owned-a.txt", "text/plain", false);
    let b = doc("u-bob", "owned-b.txt", "text/plain", true);
    store.create(&a).await?;
    store.create(&b).await?;

    let owned = store.by_owner(&UserId::new("u-alice")).await?;
    assert_eq!(names(&owned), ["owned-a.txt"]);
    assert!(store.by_owner(&UserId::new("u-nobody")).await?.is_empty());

    store.delete(&a.id).await?;
    store.delete(&b.id).await
}

async fn test_delete(store: &dyn MetadataStore) -> Result<(), MetadataError> {
    let d = doc("u-alice", "delete.txt", "text/plain", false);
    store.create(&d).await?;
    store.replace_grants(&d.id, &[login("bob")]).await?;

    store.delete(&d.id).await?;
    assert!(store.by_id(&d.id).await.is_err_and(|e| e.is_not_found()));
    assert!(
        store.documents_granted_to(&login("bob")).await?.is_empty(),
        "delete must remove grants"
    );
    Ok(())
}

async fn test_filtered_visibility(store: &dyn MetadataStore) -> Result<(), MetadataError> {
    let public = doc("u-alice", "vis-public", "text/plain", true);
    let private = doc("u-alice", "vis-private", "text/plain", false);
    let shared = doc("u-alice", "vis-shared", "text/plain", false);
    for d in [&public, &private, &shared] {
        store.create(d).await?;
    }
    store.replace_grants(&shared.id, &[login("bob")]).await?;

    let all = DocumentFilter::default();
    let alice = store.filtered(None, &UserId::new("u-alice"), &all).await?;
    assert_eq!(names(&alice), ["vis-private", "vis-public", "vis-shared"]);

    let bob = store.filtered(None, &UserId::new("u-bob"), &all).await?;
    assert_eq!(names(&bob), ["vis-public", "vis-shared"]);

    let carol = store.filtered(None, &UserId::new("u-carol"), &all).await?;
    assert_eq!(names(&carol), ["vis-public"]);

    for d in [&public, &private, &shared] {
        store.delete(&d.id).await?;
    }
    Ok(())
}

async fn test_filtered_constraints(store: &dyn MetadataStore) -> Result<(), MetadataError> {
    let a = doc("u-alice", "b-report", "application/pdf", true);
    let b = doc("u-alice", "a-notes", "text/plain", true);
    let c = doc("u-bob", "c-report", "application/pdf", true);
    for d in [&a, &b, &c] {
        store.create(d).await?;
    }
    let carol = UserId::new("u-carol");

    let by_owner = store
        .filtered(Some(&login("alice")), &carol, &DocumentFilter::default())
        .await?;
    assert_eq!(names(&by_owner), ["a-notes", "b-report"], "ordered by name");

    let pdfs = store
        .filtered(None, &carol, &DocumentFilter::new("mime", "application/pdf", 0))
        .await?;
    assert_eq!(names(&pdfs), ["b-report", "c-report"]);

    let named = store
        .filtered(None, &carol, &DocumentFilter::new("name", "a-notes", 0))
        .await?;
    assert_eq!(names(&named), ["a-notes"]);

    let limited = store.filtered(None, &carol, &DocumentFilter::limited(2)).await?;
    assert_eq!(names(&limited), ["a-notes", "b-report"]);

    let unknown_owner = store
        .filtered(Some(&login("nobody")), &carol, &DocumentFilter::default())
        .await?;
    assert!(unknown_owner.is_empty());

    for d in [&a, &b, &c] {
        store.delete(&d.id).await?;
    }
    Ok(())
}
