//! Periodic background refresh of reference prices

use crate::core::config::Feed;
use crate::core::price::{FetchState, ReferencePriceProvider, ReferencePrices};
use std::sync::Arc;
use std::time::Duration;
use tokio::sync::RwLock;
use tokio::task::JoinHandle;
use tokio::time::MissedTickBehavior;
use tracing::{debug, warn};

struct Shared {
    generation: u64,
    state: FetchState<ReferencePrices>,
}

/// Keeps a [`FetchState`] of reference prices current by refetching on a
/// fixed interval. The first fetch starts immediately.
///
/// Every tick starts a new fetch generation and aborts a fetch still
/// running from the previous tick. A completing fetch installs its result
/// only while its generation is newest, so a stale fetch can never
/// overwrite a newer result. Previously loaded prices stay visible while a
/// refresh is in flight; a failed refresh parks the state in `Failed` until
/// the next tick succeeds.
pub struct ReferencePriceRefresher {
    shared: Arc<RwLock<Shared>>,
    driver: JoinHandle<()>,
}

impl ReferencePriceRefresher {
    pub fn spawn(
        provider: Arc<dyn ReferencePriceProvider>,
        feeds: Vec<Feed>,
        interval: Duration,
    ) -> Self {
        let shared = Arc::new(RwLock::new(Shared {
            generation: 0,
            state: FetchState::NotLoaded,
        }));
        let driver = tokio::spawn(refresh_loop(provider, feeds, interval, Arc::clone(&shared)));
        Self { shared, driver }
    }

    /// Snapshot of the current fetch state.
    pub async fn current(&self) -> FetchState<ReferencePrices> {
        self.shared.read().await.state.clone()
    }
}

impl Drop for ReferencePriceRefresher {
    fn drop(&mut self) {
        self.driver.abort();
    }
}

async fn refresh_loop(
    provider: Arc<dyn ReferencePriceProvider>,
    feeds: Vec<Feed>,
    interval: Duration,
    shared: Arc<RwLock<Shared>>,
) {
    let mut ticker = tokio::time::interval(interval);
    ticker.set_missed_tick_behavior(MissedTickBehavior::Skip);
    let mut in_flight: Option<JoinHandle<()>> = None;

    loop {
        ticker.tick().await;

        if let Some(fetch) = in_flight.take() {
            if !fetch.is_finished() {
                warn!("Reference price fetch still running at next refresh tick, superseding it");
                fetch.abort();
            }
        }

        // Bump the generation under the state lock so a fetch completing
        // concurrently either installs before the bump or sees itself
        // superseded after it.
        let generation = {
            let mut guard = shared.write().await;
            guard.generation += 1;
            if matches!(guard.state, FetchState::NotLoaded) {
                guard.state = FetchState::Loading;
            }
            guard.generation
        };

        let provider = Arc::clone(&provider);
        let feeds = feeds.clone();
        let shared = Arc::clone(&shared);
        in_flight = Some(tokio::spawn(async move {
            let fetched = provider.fetch(&feeds).await;

            let mut guard = shared.write().await;
            if guard.generation != generation {
                debug!("Discarding superseded reference price fetch (generation {generation})");
                return;
            }
            guard.state = match fetched {
                Ok(prices) => {
                    debug!("Refreshed {} reference prices", prices.len());
                    FetchState::Loaded(prices)
                }
                Err(e) => {
                    warn!("Reference price refresh failed: {e:#}");
                    FetchState::Failed(format!("{e:#}"))
                }
            };
        }));
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use anyhow::anyhow;
    use async_trait::async_trait;
    use std::collections::HashMap;
    use tokio::sync::Mutex;
    use tokio::time::sleep;

    struct ScriptedFetch {
        delay: Duration,
        result: Result<ReferencePrices, String>,
    }

    /// Provider that replays a fixed list of outcomes, one per call. Calls
    /// past the end of the script hang forever.
    struct ScriptedProvider {
        script: Mutex<Vec<ScriptedFetch>>,
    }

    impl ScriptedProvider {
        fn new(script: Vec<ScriptedFetch>) -> Self {
            Self {
                script: Mutex::new(script),
            }
        }
    }

    #[async_trait]
    impl ReferencePriceProvider for ScriptedProvider {
        async fn fetch(&self, _feeds: &[Feed]) -> anyhow::Result<ReferencePrices> {
            let step = {
                let mut script = self.script.lock().await;
                if script.is_empty() {
                    None
                } else {
                    Some(script.remove(0))
                }
            };
            match step {
                Some(step) => {
                    sleep(step.delay).await;
                    step.result.map_err(|e| anyhow!(e))
                }
                None => {
                    sleep(Duration::from_secs(1_000_000)).await;
                    Ok(ReferencePrices::default())
                }
            }
        }
    }

    fn feed(symbol: &str, account: &str) -> Feed {
        Feed {
            symbol: symbol.to_string(),
            price_account: account.to_string(),
        }
    }

    fn prices(symbol: &str, account: &str, value: f64) -> ReferencePrices {
        ReferencePrices::from_symbol_prices(
            &[feed(symbol, account)],
            HashMap::from([(symbol.to_string(), value)]),
        )
    }

    fn ok(prices: ReferencePrices, delay_secs: u64) -> ScriptedFetch {
        ScriptedFetch {
            delay: Duration::from_secs(delay_secs),
            result: Ok(prices),
        }
    }

    fn err(message: &str, delay_secs: u64) -> ScriptedFetch {
        ScriptedFetch {
            delay: Duration::from_secs(delay_secs),
            result: Err(message.to_string()),
        }
    }

    #[tokio::test(start_paused = true)]
    async fn test_refresher_loads_then_replaces_wholesale() {
        let first = prices("BTCUSD", "acct_old", 100.0);
        let second = prices("ETHUSD", "acct_new", 42.0);
        let provider = Arc::new(ScriptedProvider::new(vec![
            ok(first.clone(), 5),
            ok(second.clone(), 1),
        ]));
        let refresher = ReferencePriceRefresher::spawn(
            provider,
            vec![feed("BTCUSD", "acct_old")],
            Duration::from_secs(3600),
        );

        // First fetch starts immediately and is still in flight
        sleep(Duration::from_secs(1)).await;
        assert_eq!(refresher.current().await, FetchState::Loading);

        sleep(Duration::from_secs(10)).await;
        assert_eq!(refresher.current().await, FetchState::Loaded(first));

        // The next interval replaces the whole map, old keys included
        sleep(Duration::from_secs(3700)).await;
        let state = refresher.current().await;
        match state {
            FetchState::Loaded(loaded) => {
                assert_eq!(loaded.get("acct_new"), Some(42.0));
                assert_eq!(loaded.get("acct_old"), None);
            }
            other => panic!("Expected loaded prices, got {other:?}"),
        }
        assert_eq!(refresher.current().await, FetchState::Loaded(second));
    }

    #[tokio::test(start_paused = true)]
    async fn test_failed_refresh_parks_state_until_next_success() {
        let first = prices("BTCUSD", "acct1", 100.0);
        let recovered = prices("BTCUSD", "acct1", 105.0);
        let provider = Arc::new(ScriptedProvider::new(vec![
            ok(first.clone(), 1),
            err("backend down", 1),
            ok(recovered.clone(), 1),
        ]));
        let refresher = ReferencePriceRefresher::spawn(
            provider,
            vec![feed("BTCUSD", "acct1")],
            Duration::from_secs(100),
        );

        sleep(Duration::from_secs(10)).await;
        assert_eq!(refresher.current().await, FetchState::Loaded(first));

        // The failed cycle replaces loaded data; nothing renders from it
        sleep(Duration::from_secs(100)).await;
        match refresher.current().await {
            FetchState::Failed(message) => assert!(message.contains("backend down")),
            other => panic!("Expected failed state, got {other:?}"),
        }

        // The next successful cycle recovers
        sleep(Duration::from_secs(100)).await;
        assert_eq!(refresher.current().await, FetchState::Loaded(recovered));
    }

    #[tokio::test(start_paused = true)]
    async fn test_slow_stale_fetch_never_overwrites_newer_result() {
        let stale = prices("BTCUSD", "acct1", 1.0);
        let fresh = prices("BTCUSD", "acct1", 2.0);
        // First fetch takes 250s, far past the 100s interval; the second is
        // quick. The first must not land.
        let provider = Arc::new(ScriptedProvider::new(vec![
            ok(stale, 250),
            ok(fresh.clone(), 1),
        ]));
        let refresher = ReferencePriceRefresher::spawn(
            provider,
            vec![feed("BTCUSD", "acct1")],
            Duration::from_secs(100),
        );

        sleep(Duration::from_secs(120)).await;
        assert_eq!(refresher.current().await, FetchState::Loaded(fresh.clone()));

        // Past the stale fetch's completion time the newer result still holds
        sleep(Duration::from_secs(200)).await;
        match refresher.current().await {
            FetchState::Loaded(loaded) => assert_eq!(loaded.get("acct1"), Some(2.0)),
            other => panic!("Expected loaded prices, got {other:?}"),
        }
    }
}
