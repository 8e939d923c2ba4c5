pub mod client;
pub mod models;

pub use client::{CoinGeckoClient, MarketDataSource};
pub use models::PriceSeries;
