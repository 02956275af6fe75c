pub mod cli;
pub mod core;
pub mod providers;
pub mod store;

use crate::core::ReferencePriceProvider;
use crate::core::config::AppConfig;
use crate::providers::{
    CachedReferencePriceProvider, InsightsComponentProvider, InsightsLivePriceProvider,
    InsightsReferenceProvider,
};
use anyhow::Result;
use std::sync::Arc;
use std::time::Duration;
use tracing::debug;

const DEFAULT_INSIGHTS_BASE_URL: &str = "http://localhost:8000";

#[derive(Debug, Clone)]
pub struct ComponentsArgs {
    pub symbol: Option<String>,
    pub search: String,
    pub sort: Option<String>,
    pub descending: Option<bool>,
    pub page: usize,
    pub page_size: Option<usize>,
}

#[derive(Debug, Clone)]
pub enum AppCommand {
    Changes { watch: bool },
    Components(ComponentsArgs),
}

pub async fn run_command(command: AppCommand, config_path: Option<&str>) -> Result<()> {
    let config = match config_path {
        Some(path) => AppConfig::load_from_path(path)?,
        None => AppConfig::load()?,
    };
    debug!("Loaded config: {config:#?}");

    let base_url = config
        .providers
        .insights
        .as_ref()
        .map_or(DEFAULT_INSIGHTS_BASE_URL, |p| &p.base_url);

    match command {
        AppCommand::Changes { watch } => {
            let insights = Arc::new(InsightsReferenceProvider::new(base_url)?);
            let reference_provider: Arc<dyn ReferencePriceProvider> = if watch {
                // The watch loop drives its own refresh schedule; a TTL cache
                // in front would answer every refresh from the stale entry.
                insights
            } else {
                let cache = store::open_collection(&config, "reference-prices");
                Arc::new(CachedReferencePriceProvider::new(
                    insights,
                    cache,
                    Duration::from_secs(config.refresh_interval_secs),
                    base_url,
                ))
            };
            let live_provider = Arc::new(InsightsLivePriceProvider::new(base_url)?);
            cli::changes::run(&config, reference_provider, live_provider, watch).await
        }
        AppCommand::Components(args) => {
            let provider = InsightsComponentProvider::new(base_url)?;
            cli::components::run(&config, &provider, &args).await
        }
    }
}
