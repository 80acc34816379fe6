use docvault_cache::CacheKey;

/// Render a [`CacheKey`] into a Redis key string, optionally namespaced.
///
/// Without a prefix the key is exactly [`CacheKey::canonical`].
pub fn render_key(prefix: Option<&str>, key: &CacheKey) -> String {
    match prefix {
        Some(prefix) if !prefix.is_empty() => format!("{prefix}:{}", key.canonical()),
        _ => key.canonical(),
    }
}
