// File: src/services/market_data/models.rs
use crate::error::{AppError, Result};
use chrono::{DateTime, Utc};
use serde::Deserialize;
use std::collections::HashMap;

/// One sampled price of an asset
#[derive(Debug, Clone, PartialEq)]
pub struct PricePoint {
    pub timestamp: DateTime<Utc>,
    pub price: f64,
}

/// Chronological price history of one asset over the lookback window
#[derive(Debug, Clone, Default)]
pub struct PriceSeries {
    points: Vec<PricePoint>,
}

impl PriceSeries {
    /// Orders the points by timestamp; the source normally delivers them sorted already.
    /// Repeated timestamps collapse to the quote delivered last.
    pub fn new(mut points: Vec<PricePoint>) -> Self {
        // Stable sort, so equal timestamps keep delivery order
        points.sort_by_key(|p| p.timestamp);
        points.dedup_by(|later, earlier| {
            if later.timestamp == earlier.timestamp {
                earlier.price = later.price;
                true
            } else {
                false
            }
        });
        Self { points }
    }

    #[cfg(test)]
    /// Builds a series from plain prices spaced one hour apart, oldest first.
    pub fn from_prices(prices: &[f64]) -> Self {
        let start = DateTime::<Utc>::UNIX_EPOCH;
        let points = prices
            .iter()
            .enumerate()
            .map(|(i, &price)| PricePoint {
                timestamp: start + chrono::Duration::hours(i as i64),
                price,
            })
            .collect();
        Self { points }
    }

    #[cfg(test)]
    pub fn points(&self) -> &[PricePoint] {
        &self.points
    }

    pub fn prices(&self) -> Vec<f64> {
        self.points.iter().map(|p| p.price).collect()
    }

    pub fn len(&self) -> usize {
        self.points.len()
    }

    pub fn is_empty(&self) -> bool {
        self.points.is_empty()
    }
}

/// Body of `GET /coins/{id}/market_chart`
#[derive(Debug, Deserialize)]
pub struct MarketChartResponse {
    /// `[timestamp_ms, price]` pairs
    pub prices: Vec<(f64, f64)>,
}

impl TryFrom<MarketChartResponse> for PriceSeries {
    type Error = AppError;

    fn try_from(response: MarketChartResponse) -> Result<Self> {
        let points = response
            .prices
            .into_iter()
            .map(|(timestamp_ms, price)| {
                DateTime::<Utc>::from_timestamp_millis(timestamp_ms as i64)
                    .map(|timestamp| PricePoint { timestamp, price })
                    .ok_or_else(|| {
                        AppError::Parse(format!("timestamp out of range: {}", timestamp_ms))
                    })
            })
            .collect::<Result<Vec<_>>>()?;

        Ok(PriceSeries::new(points))
    }
}

/// Body of the latest-rates endpoint
#[derive(Debug, Deserialize)]
pub struct FxRatesResponse {
    #[serde(default)]
    pub rates: HashMap<String, f64>,
}

impl FxRatesResponse {
    pub fn rate(&self, symbol: &str) -> Result<f64> {
        self.rates
            .get(symbol)
            .copied()
            .ok_or_else(|| AppError::Parse(format!("rates.{} missing from FX response", symbol)))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_market_chart_parsing() {
        let body = r#"{
            "prices": [[1700000000000, 36500.12], [1700003600000, 36611.5]],
            "market_caps": [],
            "total_volumes": []
        }"#;
        let response: MarketChartResponse = serde_json::from_str(body).unwrap();
        let series = PriceSeries::try_from(response).unwrap();

        assert_eq!(series.len(), 2);
        assert_eq!(series.prices(), vec![36500.12, 36611.5]);
        assert_eq!(series.points()[0].timestamp.timestamp(), 1_700_000_000);
    }

    #[test]
    fn test_points_are_ordered_by_timestamp() {
        let late = PricePoint {
            timestamp: DateTime::<Utc>::from_timestamp(200, 0).unwrap(),
            price: 2.0,
        };
        let early = PricePoint {
            timestamp: DateTime::<Utc>::from_timestamp(100, 0).unwrap(),
            price: 1.0,
        };
        let series = PriceSeries::new(vec![late, early]);
        assert_eq!(series.prices(), vec![1.0, 2.0]);
    }

    #[test]
    fn test_repeated_timestamps_keep_the_last_quote() {
        let body = r#"{
            "prices": [
                [1700000000000, 100.0],
                [1700003600000, 101.0],
                [1700003600000, 101.5],
                [1700007200000, 102.0],
                [1700000000000, 100.25]
            ]
        }"#;
        let response: MarketChartResponse = serde_json::from_str(body).unwrap();
        let series = PriceSeries::try_from(response).unwrap();

        assert_eq!(series.len(), 3);
        assert_eq!(series.prices(), vec![100.25, 101.5, 102.0]);
        let timestamps: Vec<i64> = series.points().iter().map(|p| p.timestamp.timestamp()).collect();
        assert_eq!(timestamps, vec![1_700_000_000, 1_700_003_600, 1_700_007_200]);
    }

    #[test]
    fn test_missing_prices_field_is_an_error() {
        let result = serde_json::from_str::<MarketChartResponse>(r#"{"error": "rate limited"}"#);
        assert!(result.is_err());
    }

    #[test]
    fn test_fx_rate_lookup() {
        let response: FxRatesResponse =
            serde_json::from_str(r#"{"base": "USD", "rates": {"EUR": 0.9214}}"#).unwrap();
        assert_eq!(response.rate("EUR").unwrap(), 0.9214);
        assert!(matches!(response.rate("GBP"), Err(AppError::Parse(_))));
    }

    #[test]
    fn test_fx_response_without_rates() {
        let response: FxRatesResponse =
            serde_json::from_str(r#"{"success": false, "error": {"code": 101}}"#).unwrap();
        assert!(response.rate("EUR").is_err());
    }
}
