//! Core business logic abstractions

pub mod cache;
pub mod change;
pub mod component;
pub mod config;
pub mod log;
pub mod price;
pub mod search;
pub mod table;

// Re-export main types for cleaner imports
pub use cache::KeyValueCollection;
pub use change::{ChangeDirection, PriceDifference};
pub use component::{PriceComponent, SortColumn, SortDescriptor, SortDirection};
pub use price::{
    ComponentProvider, FetchState, LivePrice, LivePriceProvider, ReferencePriceProvider,
    ReferencePrices,
};
pub use table::{ComponentTable, DEFAULT_PAGE_SIZE, PAGE_SIZE_OPTIONS, clamp_page};
