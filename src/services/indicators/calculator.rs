// File: src/services/indicators/calculator.rs
use super::models::IndicatorSet;
use crate::error::{AppError, Result};
use crate::services::market_data::PriceSeries;
use crate::utils::{round_dp, round_opt};
use tracing::debug;

/// Decimal places kept for price-denominated indicators
const PRICE_DP: u32 = 2;
/// Decimal places kept for MACD values and the spot price
const FINE_DP: u32 = 6;

pub struct IndicatorCalculator {
    rsi_period: usize,
    ma_short_period: usize,
    ma_long_period: usize,
    macd_fast_span: usize,
    macd_slow_span: usize,
    macd_signal_span: usize,
    bb_period: usize,
    bb_std_devs: f64,
}

impl Default for IndicatorCalculator {
    fn default() -> Self {
        Self {
            rsi_period: 14,
            ma_short_period: 50,
            ma_long_period: 200,
            macd_fast_span: 12,
            macd_slow_span: 26,
            macd_signal_span: 9,
            bb_period: 20,
            bb_std_devs: 2.0,
        }
    }
}

impl IndicatorCalculator {
    /// Computes the indicator set for the last point of `series`.
    pub fn calculate(&self, series: &PriceSeries) -> Result<IndicatorSet> {
        self.calculate_prices(&series.prices())
    }

    pub fn calculate_prices(&self, prices: &[f64]) -> Result<IndicatorSet> {
        let Some(&last_price) = prices.last() else {
            return Err(AppError::InsufficientData(
                "price series is empty".to_string(),
            ));
        };

        if prices.len() < self.ma_long_period {
            debug!(
                "Only {} samples, indicators with longer windows stay undefined",
                prices.len()
            );
        }

        let rsi = calculate_rsi(prices, self.rsi_period);
        let ma50 = calculate_sma(prices, self.ma_short_period);
        let ma200 = calculate_sma(prices, self.ma_long_period);

        let ema_fast = ema_series(prices, self.macd_fast_span);
        let ema_slow = ema_series(prices, self.macd_slow_span);
        let macd_line: Vec<f64> = ema_fast
            .iter()
            .zip(&ema_slow)
            .map(|(fast, slow)| fast - slow)
            .collect();
        let signal_line = ema_series(&macd_line, self.macd_signal_span);

        // Both lines have one value per price, so the last entries exist
        let macd = macd_line[macd_line.len() - 1];
        let macd_signal = signal_line[signal_line.len() - 1];
        let macd_hist = macd - macd_signal;

        let bands = calculate_bollinger(prices, self.bb_period, self.bb_std_devs);

        Ok(IndicatorSet {
            rsi: round_opt(rsi, PRICE_DP),
            ma50: round_opt(ma50, PRICE_DP),
            ma200: round_opt(ma200, PRICE_DP),
            macd: round_dp(macd, FINE_DP),
            macd_signal: round_dp(macd_signal, FINE_DP),
            macd_hist: round_dp(macd_hist, FINE_DP),
            bb_upper: round_opt(bands.map(|b| b.upper), PRICE_DP),
            bb_lower: round_opt(bands.map(|b| b.lower), PRICE_DP),
            bb_middle: round_opt(bands.map(|b| b.middle), PRICE_DP),
            price_usd: round_dp(last_price, FINE_DP),
        })
    }
}

#[derive(Debug, Clone, Copy)]
struct BollingerBands {
    upper: f64,
    middle: f64,
    lower: f64,
}

/// Simple moving average over the trailing `period` samples
fn calculate_sma(prices: &[f64], period: usize) -> Option<f64> {
    if period == 0 || prices.len() < period {
        return None;
    }

    let start_idx = prices.len() - period;
    let sum: f64 = prices[start_idx..].iter().sum();

    Some(sum / period as f64)
}

/// RSI over the trailing `period` price deltas.
///
/// The first sample has no predecessor and counts as a zero delta, so the
/// value is defined once `period` samples exist. A window without losses
/// saturates to 100; a window without any movement has no RSI.
fn calculate_rsi(prices: &[f64], period: usize) -> Option<f64> {
    if period == 0 || prices.len() < period {
        return None;
    }

    let start_idx = prices.len() - period;
    let mut gain_sum = 0.0;
    let mut loss_sum = 0.0;
    for i in start_idx..prices.len() {
        if i == 0 {
            continue;
        }
        let change = prices[i] - prices[i - 1];
        if change > 0.0 {
            gain_sum += change;
        } else if change < 0.0 {
            loss_sum -= change;
        }
    }

    let avg_gain = gain_sum / period as f64;
    let avg_loss = loss_sum / period as f64;

    if avg_loss == 0.0 {
        return if avg_gain > 0.0 { Some(100.0) } else { None };
    }

    let rs = avg_gain / avg_loss;
    Some(100.0 - (100.0 / (1.0 + rs)))
}

/// Recursive EMA with `alpha = 2 / (span + 1)`, seeded with the first value.
fn ema_series(values: &[f64], span: usize) -> Vec<f64> {
    let alpha = 2.0 / (span as f64 + 1.0);
    let mut result = Vec::with_capacity(values.len());

    let mut prev: Option<f64> = None;
    for &value in values {
        let ema = match prev {
            Some(p) => alpha * value + (1.0 - alpha) * p,
            None => value,
        };
        result.push(ema);
        prev = Some(ema);
    }

    result
}

/// Sample (n - 1) standard deviation
fn sample_stddev(values: &[f64]) -> Option<f64> {
    if values.len() < 2 {
        return None;
    }

    let n = values.len() as f64;
    let mean = values.iter().sum::<f64>() / n;
    let variance = values.iter().map(|v| (v - mean).powi(2)).sum::<f64>() / (n - 1.0);

    Some(variance.max(0.0).sqrt())
}

fn calculate_bollinger(prices: &[f64], period: usize, std_devs: f64) -> Option<BollingerBands> {
    let middle = calculate_sma(prices, period)?;
    let sigma = sample_stddev(&prices[prices.len() - period..])?;

    Some(BollingerBands {
        upper: middle + std_devs * sigma,
        middle,
        lower: middle - std_devs * sigma,
    })
}
