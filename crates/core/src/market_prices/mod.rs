//! Market prices module - cached vehicle catalog and price aggregates.

mod market_prices_service;
mod market_prices_traits;

// Re-export the public interface
pub use market_prices_service::{MarketPriceCacheConfig, MarketPriceService};
pub use market_prices_traits::MarketPriceServiceTrait;
