use bytes::Bytes;

use docvault_core::{Document, DocumentDraft, UserId};

use crate::error::BlobError;
use crate::store::BlobStore;

fn file_doc(name: &str) -> Document {
    Document::from_draft(
        DocumentDraft::file(name, "application/octet-stream"),
        UserId::new("u-blob"),
    )
}

/// Run the blob store conformance test suite.
///
/// # Errors
///
/// Returns an error if the backend fails an operation that should succeed.
pub async fn run_blob_conformance_tests(store: &dyn BlobStore) -> Result<(), BlobError> {
    test_load_missing(store).await?;
    test_save_and_load(store).await?;
    test_overwrite(store).await?;
    test_delete(store).await?;
    test_documents_are_isolated(store).await?;
    test_empty_content(store).await?;
    Ok(())
}

async fn test_load_missing(store: &dyn BlobStore) -> Result<(), BlobError> {
    let doc = file_doc("missing.bin");
    let err = store.load(&doc).await.expect_err("load of missing blob should fail");
    assert!(err.is_not_found(), "expected NotFound, got {err:?}");
    Ok(())
}

async fn test_save_and_load(store: &dyn BlobStore) -> Result<(), BlobError> {
    let doc = file_doc("hello.txt");
    store.save(&doc, Bytes::from_static(b"hello world")).await?;
    assert_eq!(store.load(&doc).await?, Bytes::from_static(b"hello world"));
    store.delete(&doc).await
}

async fn test_overwrite(store: &dyn BlobStore) -> Result<(), BlobError> {
    let doc = file_doc("overwrite.txt");
    store.save(&doc, Bytes::from_static(b"v1")).await?;
    store.save(&doc, Bytes::from_static(b"v2")).await?;
    assert_eq!(store.load(&doc).await?, Bytes::from_static(b"v2"));
    store.delete(&doc).await
}

async fn test_delete(store: &dyn BlobStore) -> Result<(), BlobError> {
    let doc = file_doc("delete.txt");
    store.save(&doc, Bytes::from_static(b"bye")).await?;
    store.delete(&doc).await?;

    let err = store.load(&doc).await.expect_err("load after delete should fail");
    assert!(err.is_not_found());

    let err = store.delete(&doc).await.expect_err("second delete should fail");
    assert!(err.is_not_found(), "expected NotFound, got {err:?}");
    Ok(())
}

async fn test_documents_are_isolated(store: &dyn BlobStore) -> Result<(), BlobError> {
    let a = file_doc("same.txt");
    let b = file_doc("same.txt");

    store.save(&a, Bytes::from_static(b"first")).await?;
    store.save(&b, Bytes::from_static(b"second")).await?;
    assert_eq!(store.load(&a).await?, Bytes::from_static(b"first"));

    store.delete(&b).await?;
    assert_eq!(
        store.load(&a).await?,
        Bytes::from_static(b"first"),
        "deleting one document keeps another's content"
    );
    store.delete(&a).await
}

async fn test_empty_content(store: &dyn BlobStore) -> Result<(), BlobError> {
    let doc = file_doc("empty.bin");
    store.save(&doc, Bytes::new()).await?;
    assert!(store.load(&doc).await?.is_empty());
    store.delete(&doc).await
}
