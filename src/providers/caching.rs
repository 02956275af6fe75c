use crate::core::cache::KeyValueCollection;
use crate::core::config::Feed;
use crate::core::price::{ReferencePriceProvider, ReferencePrices};
use anyhow::Result;
use async_trait::async_trait;
use std::sync::Arc;
use std::time::Duration;
use tracing::debug;

/// Read-through cache over a reference price provider.
///
/// Reference prices change once a day, so one-shot command runs within the
/// refresh window reuse the stored result instead of refetching. The cache
/// key covers the backend scope and the configured symbol list; changing
/// either starts a fresh entry. Failures are never cached, so the next run
/// retries.
pub struct CachedReferencePriceProvider {
    inner: Arc<dyn ReferencePriceProvider>,
    cache: Arc<dyn KeyValueCollection<String, ReferencePrices>>,
    ttl: Duration,
    scope: String,
}

impl CachedReferencePriceProvider {
    pub fn new(
        inner: Arc<dyn ReferencePriceProvider>,
        cache: Arc<dyn KeyValueCollection<String, ReferencePrices>>,
        ttl: Duration,
        scope: &str,
    ) -> Self {
        Self {
            inner,
            cache,
            ttl,
            scope: scope.to_string(),
        }
    }

    fn cache_key(&self, feeds: &[Feed]) -> String {
        let symbols: Vec<&str> = feeds.iter().map(|feed| feed.symbol.as_str()).collect();
        format!("{}|{}", self.scope, symbols.join(","))
    }
}

#[async_trait]
impl ReferencePriceProvider for CachedReferencePriceProvider {
    async fn fetch(&self, feeds: &[Feed]) -> Result<ReferencePrices> {
        let key = self.cache_key(feeds);
        if let Some(cached) = self.cache.get(&key).await {
            debug!("Cache hit for reference prices: {}", key);
            return Ok(cached);
        }

        debug!("Cache miss for reference prices: {}", key);
        let prices = self.inner.fetch(feeds).await?;
        self.cache
            .put(key, prices.clone(), Some(self.ttl))
            .await;
        Ok(prices)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::store::memory::MemoryCollection;
    use anyhow::anyhow;
    use std::collections::HashMap;
    use std::sync::atomic::{AtomicUsize, Ordering};

    struct MockInnerProvider {
        call_count: AtomicUsize,
        fail: bool,
    }

    impl MockInnerProvider {
        fn new(fail: bool) -> Self {
            Self {
                call_count: AtomicUsize::new(0),
                fail,
            }
        }
    }

    #[async_trait]
    impl ReferencePriceProvider for &MockInnerProvider {
        async fn fetch(&self, feeds: &[Feed]) -> Result<ReferencePrices> {
            self.call_count.fetch_add(1, Ordering::SeqCst);
            if self.fail {
                return Err(anyhow!("backend down"));
            }
            let by_symbol: HashMap<String, f64> = feeds
                .iter()
                .map(|feed| (feed.symbol.clone(), 100.0))
                .collect();
            Ok(ReferencePrices::from_symbol_prices(feeds, by_symbol))
        }
    }

    fn feeds() -> Vec<Feed> {
        vec![Feed {
            symbol: "BTCUSD".to_string(),
            price_account: "acct1".to_string(),
        }]
    }

    fn caching_provider(
        inner: &'static MockInnerProvider,
        ttl: Duration,
    ) -> CachedReferencePriceProvider {
        CachedReferencePriceProvider::new(
            Arc::new(inner),
            Arc::new(MemoryCollection::new()),
            ttl,
            "http://backend",
        )
    }

    #[tokio::test]
    async fn test_second_fetch_hits_cache() {
        let inner: &'static MockInnerProvider =
            Box::leak(Box::new(MockInnerProvider::new(false)));
        let provider = caching_provider(inner, Duration::from_secs(3600));

        let first = provider.fetch(&feeds()).await.unwrap();
        assert_eq!(first.get("acct1"), Some(100.0));
        assert_eq!(inner.call_count.load(Ordering::SeqCst), 1);

        let second = provider.fetch(&feeds()).await.unwrap();
        assert_eq!(second, first);
        assert_eq!(inner.call_count.load(Ordering::SeqCst), 1);
    }

    #[tokio::test]
    async fn test_expired_entry_refetches() {
        let inner: &'static MockInnerProvider =
            Box::leak(Box::new(MockInnerProvider::new(false)));
        let provider = caching_provider(inner, Duration::from_millis(10));

        provider.fetch(&feeds()).await.unwrap();
        tokio::time::sleep(Duration::from_millis(20)).await;
        provider.fetch(&feeds()).await.unwrap();

        assert_eq!(inner.call_count.load(Ordering::SeqCst), 2);
    }

    #[tokio::test]
    async fn test_errors_are_not_cached() {
        let inner: &'static MockInnerProvider =
            Box::leak(Box::new(MockInnerProvider::new(true)));
        let provider = caching_provider(inner, Duration::from_secs(3600));

        assert!(provider.fetch(&feeds()).await.is_err());
        assert!(provider.fetch(&feeds()).await.is_err());
        assert_eq!(inner.call_count.load(Ordering::SeqCst), 2);
    }

    #[tokio::test]
    async fn test_different_symbol_sets_use_separate_entries() {
        let inner: &'static MockInnerProvider =
            Box::leak(Box::new(MockInnerProvider::new(false)));
        let provider = caching_provider(inner, Duration::from_secs(3600));

        provider.fetch(&feeds()).await.unwrap();
        let other = vec![Feed {
            symbol: "ETHUSD".to_string(),
            price_account: "acct2".to_string(),
        }];
        provider.fetch(&other).await.unwrap();

        assert_eq!(inner.call_count.load(Ordering::SeqCst), 2);
    }
}
