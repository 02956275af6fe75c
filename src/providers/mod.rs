pub mod caching;
pub mod http;
pub mod insights;
pub mod refresh;

// Re-export the provider surface commands wire together
pub use caching::CachedReferencePriceProvider;
pub use insights::{InsightsComponentProvider, InsightsLivePriceProvider, InsightsReferenceProvider};
pub use refresh::ReferencePriceRefresher;
