use super::ui;
use crate::core::change::PriceDifference;
use crate::core::config::{AppConfig, Feed};
use crate::core::price::{FetchState, LivePriceProvider, ReferencePriceProvider, ReferencePrices};
use crate::providers::ReferencePriceRefresher;
use anyhow::Result;
use chrono::Local;
use comfy_table::{Cell, Table};
use futures::future::join_all;
use std::collections::HashMap;
use std::sync::Arc;
use std::time::Duration;
use tracing::warn;

/// How often watch mode redraws with fresh live prices. Reference prices
/// refresh on the configured interval independently.
const LIVE_POLL_INTERVAL: Duration = Duration::from_secs(10);

/// Live price of one feed at render time.
#[derive(Debug, Clone, PartialEq)]
pub enum LiveState {
    Price(f64),
    /// The backend has no current price yet
    Pending,
    Unavailable(String),
}

/// What the change column shows for one feed.
#[derive(Debug, Clone, PartialEq)]
pub enum ChangeCell {
    /// Data is still loading
    Placeholder,
    /// Reference prices failed to load; render nothing, not a placeholder
    Suppressed,
    /// Reference prices loaded but carry no entry for this feed
    Empty,
    /// The prior price was zero, so a percent change is undefined
    NoData,
    Value(PriceDifference),
}

#[derive(Debug, Clone, PartialEq)]
pub struct ChangeRow {
    pub symbol: String,
    pub reference_price: Option<f64>,
    pub live: LiveState,
    pub change: ChangeCell,
}

/// Joins the reference price state with live prices into one row per feed.
///
/// The change column degrades per feed: loading states show a placeholder,
/// a failed reference fetch suppresses the value entirely, and a loaded map
/// without this feed's account renders empty.
pub fn build_change_rows(
    feeds: &[Feed],
    reference: &FetchState<ReferencePrices>,
    live: &HashMap<String, LiveState>,
) -> Vec<ChangeRow> {
    feeds
        .iter()
        .map(|feed| {
            let live_state = live
                .get(&feed.price_account)
                .cloned()
                .unwrap_or(LiveState::Pending);
            let reference_price = match reference {
                FetchState::Loaded(prices) => prices.get(&feed.price_account),
                _ => None,
            };

            let change = match reference {
                FetchState::NotLoaded | FetchState::Loading => ChangeCell::Placeholder,
                FetchState::Failed(_) => ChangeCell::Suppressed,
                FetchState::Loaded(prices) => match prices.get(&feed.price_account) {
                    None => ChangeCell::Empty,
                    Some(prior) => match &live_state {
                        LiveState::Pending => ChangeCell::Placeholder,
                        LiveState::Unavailable(_) => ChangeCell::Empty,
                        LiveState::Price(current) => {
                            match PriceDifference::between(*current, prior) {
                                Some(difference) => ChangeCell::Value(difference),
                                None => ChangeCell::NoData,
                            }
                        }
                    },
                },
            };

            ChangeRow {
                symbol: feed.symbol.clone(),
                reference_price,
                live: live_state,
                change,
            }
        })
        .collect()
}

fn change_table(rows: &[ChangeRow]) -> Table {
    let mut table = ui::new_styled_table();
    table.set_header(vec![
        ui::header_cell("Symbol"),
        ui::header_cell("Yesterday"),
        ui::header_cell("Live"),
        ui::header_cell("Change"),
    ]);

    for row in rows {
        let yesterday_cell = match (row.reference_price, &row.change) {
            (Some(price), _) => ui::number_cell(price),
            (None, ChangeCell::Placeholder) => ui::placeholder_cell(),
            (None, ChangeCell::Suppressed) => ui::empty_cell(),
            (None, _) => ui::na_cell(false),
        };
        let live_cell = match &row.live {
            LiveState::Price(price) => ui::number_cell(*price),
            LiveState::Pending => ui::placeholder_cell(),
            LiveState::Unavailable(_) => ui::na_cell(true),
        };
        let change_cell = match &row.change {
            ChangeCell::Placeholder => ui::placeholder_cell(),
            ChangeCell::Suppressed | ChangeCell::Empty => ui::empty_cell(),
            ChangeCell::NoData => ui::na_cell(false),
            ChangeCell::Value(difference) => ui::change_cell(difference),
        };

        table.add_row(vec![
            Cell::new(&row.symbol),
            yesterday_cell,
            live_cell,
            change_cell,
        ]);
    }
    table
}

async fn fetch_live_prices(
    provider: &dyn LivePriceProvider,
    feeds: &[Feed],
    with_progress: bool,
) -> HashMap<String, LiveState> {
    let pb = with_progress.then(|| ui::new_progress_bar(feeds.len() as u64, false));

    let futures = feeds.iter().map(|feed| {
        let pb = pb.clone();
        async move {
            let result = provider.latest(feed).await;
            if let Some(pb) = &pb {
                pb.inc(1);
            }
            let state = match result {
                Ok(Some(price)) => LiveState::Price(price.aggregate.price),
                Ok(None) => LiveState::Pending,
                Err(e) => {
                    warn!("Live price fetch failed for {}: {e:#}", feed.symbol);
                    LiveState::Unavailable(format!("{e:#}"))
                }
            };
            (feed.price_account.clone(), state)
        }
    });
    let live = join_all(futures).await.into_iter().collect();

    if let Some(pb) = pb {
        pb.finish_and_clear();
    }
    live
}

fn print_view(rows: &[ChangeRow], reference: &FetchState<ReferencePrices>) {
    println!("{}", change_table(rows));
    if let FetchState::Failed(message) = reference {
        println!(
            "{}",
            ui::style_text(
                &format!("Reference prices unavailable: {message}"),
                ui::StyleType::Error
            )
        );
    }
}

async fn run_once(
    config: &AppConfig,
    reference_provider: Arc<dyn ReferencePriceProvider>,
    live_provider: Arc<dyn LivePriceProvider>,
) -> Result<()> {
    let feeds = &config.feeds;

    let spinner = ui::new_spinner("Fetching reference prices...");
    let reference = match reference_provider.fetch(feeds).await {
        Ok(prices) => FetchState::Loaded(prices),
        Err(e) => {
            warn!("Could not fetch reference prices: {e:#}");
            FetchState::Failed(format!("{e:#}"))
        }
    };
    spinner.finish_and_clear();

    let live = fetch_live_prices(live_provider.as_ref(), feeds, true).await;
    let rows = build_change_rows(feeds, &reference, &live);

    println!(
        "\n{}",
        ui::style_text("Price feed changes", ui::StyleType::Title)
    );
    print_view(&rows, &reference);
    Ok(())
}

async fn run_watch(
    config: &AppConfig,
    reference_provider: Arc<dyn ReferencePriceProvider>,
    live_provider: Arc<dyn LivePriceProvider>,
) -> Result<()> {
    let interval = Duration::from_secs(config.refresh_interval_secs);
    let refresher =
        ReferencePriceRefresher::spawn(reference_provider, config.feeds.clone(), interval);
    let term = console::Term::stdout();

    loop {
        let live = fetch_live_prices(live_provider.as_ref(), &config.feeds, false).await;
        let reference = refresher.current().await;
        let rows = build_change_rows(&config.feeds, &reference, &live);

        term.clear_screen()?;
        println!(
            "{}",
            ui::style_text("Price feed changes", ui::StyleType::Title)
        );
        println!(
            "{}",
            ui::style_text(
                &format!(
                    "Updated {}. Live prices refresh every {}s, reference prices every {}s. Ctrl-C to quit.",
                    Local::now().format("%H:%M:%S"),
                    LIVE_POLL_INTERVAL.as_secs(),
                    interval.as_secs()
                ),
                ui::StyleType::Subtle
            )
        );
        print_view(&rows, &reference);

        tokio::select! {
            _ = tokio::time::sleep(LIVE_POLL_INTERVAL) => {}
            _ = tokio::signal::ctrl_c() => break,
        }
    }
    Ok(())
}

pub async fn run(
    config: &AppConfig,
    reference_provider: Arc<dyn ReferencePriceProvider>,
    live_provider: Arc<dyn LivePriceProvider>,
    watch: bool,
) -> Result<()> {
    if config.feeds.is_empty() {
        println!("No feeds configured. Add feeds to the config file and try again.");
        return Ok(());
    }

    if watch {
        run_watch(config, reference_provider, live_provider).await
    } else {
        run_once(config, reference_provider, live_provider).await
    }
}
