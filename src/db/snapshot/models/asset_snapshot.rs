// File: src/db/snapshot/models/asset_snapshot.rs
use crate::services::indicators::{models::IndicatorSet, signal::Signal};
use crate::utils::round_dp;
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;

/// Latest persisted state of one tracked asset
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct AssetSnapshot {
    pub symbol: String,
    pub price_usd: f64,
    pub price_eur: f64,
    pub rsi: Option<f64>,
    pub ma50: Option<f64>,
    pub ma200: Option<f64>,
    pub macd: f64,
    pub macd_signal: f64,
    pub macd_hist: f64,
    pub bb_upper: Option<f64>,
    pub bb_lower: Option<f64>,
    pub bb_middle: Option<f64>,
    pub signal: Signal,
    /// Local time, `YYYY-MM-DD HH:MM:SS`
    pub last_updated: String,
}

/// Snapshot file contents, keyed by symbol
pub type SnapshotMap = BTreeMap<String, AssetSnapshot>;

impl AssetSnapshot {
    pub fn new(
        symbol: &str,
        indicators: &IndicatorSet,
        signal: Signal,
        eur_rate: f64,
        last_updated: String,
    ) -> Self {
        Self {
            symbol: symbol.to_string(),
            price_usd: indicators.price_usd,
            price_eur: round_dp(indicators.price_usd * eur_rate, 6),
            rsi: indicators.rsi,
            ma50: indicators.ma50,
            ma200: indicators.ma200,
            macd: indicators.macd,
            macd_signal: indicators.macd_signal,
            macd_hist: indicators.macd_hist,
            bb_upper: indicators.bb_upper,
            bb_lower: indicators.bb_lower,
            bb_middle: indicators.bb_middle,
            signal,
            last_updated,
        }
    }
}
