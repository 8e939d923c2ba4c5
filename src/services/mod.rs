pub mod indicators;
pub mod market_data;
