use std::time::Duration;

use docvault_core::{DocumentFilter, DocumentId, Login};

use crate::error::CacheError;
use crate::key::CacheKey;
use crate::store::Cache;

fn doc_key(id: &str) -> CacheKey {
    CacheKey::document(&DocumentId::new(id))
}

/// Run the cache conformance test suite.
///
/// Call this from your backend's test module with a fresh cache instance.
///
/// # Errors
///
/// Returns an error if the backend fails an operation.
pub async fn run_cache_conformance_tests(cache: &dyn Cache) -> Result<(), CacheError> {
    test_get_missing(cache).await?;
    test_set_and_get(cache).await?;
    test_overwrite(cache).await?;
    test_delete_many(cache).await?;
    test_delete_missing(cache).await?;
    test_key_kinds_are_distinct(cache).await?;
    test_ttl_set(cache).await?;
    Ok(())
}

async fn test_get_missing(cache: &dyn Cache) -> Result<(), CacheError> {
    let val = cache.get(&doc_key("missing")).await?;
    assert!(val.is_none(), "get on missing key should return None");
    Ok(())
}

async fn test_set_and_get(cache: &dyn Cache) -> Result<(), CacheError> {
    let key = doc_key("set-get");
    cache.set(&key, "hello", None).await?;
    let val = cache.get(&key).await?;
    assert_eq!(val.as_deref(), Some("hello"));
    Ok(())
}

async fn test_overwrite(cache: &dyn Cache) -> Result<(), CacheError> {
    let key = doc_key("overwrite");
    cache.set(&key, "v1", None).await?;
    cache.set(&key, "v2", None).await?;
    let val = cache.get(&key).await?;
    assert_eq!(val.as_deref(), Some("v2"), "set should overwrite");
    Ok(())
}

async fn test_delete_many(cache: &dyn Cache) -> Result<(), CacheError> {
    let a = doc_key("del-a");
    let b = CacheKey::user_docs(&Login::new("del-b"));
    cache.set(&a, "a", None).await?;
    cache.set(&b, "b", None).await?;

    let removed = cache.delete(&[a.clone(), b.clone(), doc_key("del-none")]).await?;
    assert_eq!(removed, 2, "delete should count only existing keys");
    assert!(cache.get(&a).await?.is_none());
    assert!(cache.get(&b).await?.is_none());
    Ok(())
}

async fn test_delete_missing(cache: &dyn Cache) -> Result<(), CacheError> {
    let removed = cache.delete(&[doc_key("never-set")]).await?;
    assert_eq!(removed, 0, "delete on missing key should report zero");
    let removed = cache.delete(&[]).await?;
    assert_eq!(removed, 0, "delete with no keys is a no-op");
    Ok(())
}

async fn test_key_kinds_are_distinct(cache: &dyn Cache) -> Result<(), CacheError> {
    let login = Login::new("kinds");
    let user = CacheKey::user_docs(&login);
    let list = CacheKey::list(&login, None, &DocumentFilter::default());
    cache.set(&user, "index", None).await?;
    cache.set(&list, "list", None).await?;
    assert_eq!(cache.get(&user).await?.as_deref(), Some("index"));
    assert_eq!(cache.get(&list).await?.as_deref(), Some("list"));
    Ok(())
}

async fn test_ttl_set(cache: &dyn Cache) -> Result<(), CacheError> {
    let key = doc_key("ttl");
    cache.set(&key, "short", Some(Duration::from_secs(60))).await?;
    let val = cache.get(&key).await?;
    assert_eq!(
        val.as_deref(),
        Some("short"),
        "value with TTL should be readable before expiry"
    );
    Ok(())
}
