use async_trait::async_trait;
use std::time::Duration;

/// A named collection of key-value pairs with optional per-entry TTL.
///
/// Backed by either an in-memory map or an on-disk partition; callers hold
/// it as a trait object and stay agnostic of which one they got.
#[async_trait]
pub trait KeyValueCollection<K, V>: Send + Sync
where
    K: Send + Sync,
    V: Send + Sync,
{
    /// Returns the live value for `key`, or `None` if absent or expired.
    async fn get(&self, key: &K) -> Option<V>;

    /// Stores `value` under `key`. A `ttl` of `None` never expires.
    async fn put(&self, key: K, value: V, ttl: Option<Duration>);

    async fn remove(&self, key: &K);
}
