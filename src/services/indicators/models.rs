// File: src/services/indicators/models.rs
use serde::{Deserialize, Serialize};

/// Technical indicators describing the most recent point of a price series.
///
/// Rolling-window values are `None` while the series is shorter than their
/// window, and serialise as `null`.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct IndicatorSet {
    pub rsi: Option<f64>,
    pub ma50: Option<f64>,
    pub ma200: Option<f64>,
    pub macd: f64,
    pub macd_signal: f64,
    pub macd_hist: f64,
    pub bb_upper: Option<f64>,
    pub bb_lower: Option<f64>,
    pub bb_middle: Option<f64>,
    pub price_usd: f64,
}
