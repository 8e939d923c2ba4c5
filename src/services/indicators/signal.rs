// File: src/services/indicators/signal.rs
use super::models::IndicatorSet;
use serde::{Deserialize, Serialize};
use std::fmt;

const RSI_OVERSOLD: f64 = 30.0;
const RSI_OVERBOUGHT: f64 = 70.0;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "UPPERCASE")]
pub enum Signal {
    Buy,
    Sell,
    Hold,
}

impl fmt::Display for Signal {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Signal::Buy => write!(f, "BUY"),
            Signal::Sell => write!(f, "SELL"),
            Signal::Hold => write!(f, "HOLD"),
        }
    }
}

impl Signal {
    /// Derives the trading signal from an indicator set.
    ///
    /// Rules are checked in order and the first match wins: oversold RSI or
    /// MACD above its signal line buys; only then overbought RSI or MACD below
    /// its signal line sells. An undefined RSI never matches.
    pub fn classify(indicators: &IndicatorSet) -> Signal {
        let rsi = indicators.rsi;
        let macd = indicators.macd;
        let macd_signal = indicators.macd_signal;

        if rsi.is_some_and(|r| r < RSI_OVERSOLD) || macd > macd_signal {
            Signal::Buy
        } else if rsi.is_some_and(|r| r > RSI_OVERBOUGHT) || macd < macd_signal {
            Signal::Sell
        } else {
            Signal::Hold
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn indicators(rsi: Option<f64>, macd: f64, macd_signal: f64) -> IndicatorSet {
        IndicatorSet {
            rsi,
            ma50: None,
            ma200: None,
            macd,
            macd_signal,
            macd_hist: macd - macd_signal,
            bb_upper: None,
            bb_lower: None,
            bb_middle: None,
            price_usd: 1.0,
        }
    }

    #[test]
    fn test_oversold_rsi_beats_bearish_macd() {
        assert_eq!(Signal::classify(&indicators(Some(25.0), 1.0, 2.0)), Signal::Buy);
    }

    #[test]
    fn test_bullish_macd_buys() {
        assert_eq!(Signal::classify(&indicators(Some(50.0), 2.0, 1.0)), Signal::Buy);
    }

    #[test]
    fn test_bullish_macd_beats_overbought_rsi() {
        assert_eq!(Signal::classify(&indicators(Some(85.0), 2.0, 1.0)), Signal::Buy);
    }

    #[test]
    fn test_overbought_rsi_sells() {
        assert_eq!(Signal::classify(&indicators(Some(75.0), 1.0, 2.0)), Signal::Sell);
        assert_eq!(Signal::classify(&indicators(Some(75.0), 1.0, 1.0)), Signal::Sell);
    }

    #[test]
    fn test_bearish_macd_sells() {
        assert_eq!(Signal::classify(&indicators(Some(50.0), 1.0, 2.0)), Signal::Sell);
    }

    #[test]
    fn test_neutral_holds() {
        assert_eq!(Signal::classify(&indicators(Some(50.0), 1.0, 1.0)), Signal::Hold);
        assert_eq!(Signal::classify(&indicators(Some(30.0), 0.0, 0.0)), Signal::Hold);
        assert_eq!(Signal::classify(&indicators(Some(70.0), 0.0, 0.0)), Signal::Hold);
    }

    #[test]
    fn test_undefined_rsi_falls_back_to_macd() {
        assert_eq!(Signal::classify(&indicators(None, 0.0, 0.0)), Signal::Hold);
        assert_eq!(Signal::classify(&indicators(None, 0.5, 0.1)), Signal::Buy);
        assert_eq!(Signal::classify(&indicators(None, 0.1, 0.5)), Signal::Sell);
    }

    #[test]
    fn test_serialized_names() {
        assert_eq!(serde_json::to_string(&Signal::Buy).unwrap(), "\"BUY\"");
        assert_eq!(serde_json::to_string(&Signal::Hold).unwrap(), "\"HOLD\"");
        let sell: Signal = serde_json::from_str("\"SELL\"").unwrap();
        assert_eq!(sell, Signal::Sell);
        assert_eq!(Signal::Sell.to_string(), "SELL");
    }
}
