// File: src/services/market_data/client.rs
use super::models::{FxRatesResponse, MarketChartResponse, PriceSeries};
use crate::env_config::models::app_config::MarketDataConfig;
use crate::error::{AppError, Result};
use async_trait::async_trait;
use serde::de::DeserializeOwned;
use std::time::Duration;
use tracing::{debug, error, info, warn};

#[async_trait]
pub trait MarketDataSource {
    /// Fetches the price history of `coin_id` over the last `days` days
    async fn fetch_price_history(
        &self,
        coin_id: &str,
        vs_currency: &str,
        days: u32,
    ) -> Result<PriceSeries>;

    /// Fetches the conversion rate used for the secondary price currency
    async fn fetch_fx_rate(&self) -> Result<f64>;
}

pub struct CoinGeckoClient {
    market_chart_base_url: String,
    fx_url: String,
    fx_access_key: Option<String>,
    fx_base: String,
    fx_symbol: String,
    client: reqwest::Client,
}

impl CoinGeckoClient {
    pub fn new(config: &MarketDataConfig) -> Result<Self> {
        let client = reqwest::Client::builder()
            .timeout(Duration::from_secs(config.request_timeout_seconds))
            .build()
            .map_err(|e| AppError::Network(format!("Failed to create HTTP client: {}", e)))?;

        let market_chart_base_url = config.market_chart_base_url.trim_end_matches('/').to_string();
        info!(
            "Created market data client: market_chart={}, fx={}",
            market_chart_base_url, config.fx_url
        );

        Ok(Self {
            market_chart_base_url,
            fx_url: config.fx_url.clone(),
            fx_access_key: config.fx_access_key.clone(),
            fx_base: config.fx_base.clone(),
            fx_symbol: config.fx_symbol.clone(),
            client,
        })
    }

    async fn get_json<T: DeserializeOwned>(
        &self,
        url: &str,
        query: &[(&str, String)],
    ) -> Result<T> {
        debug!("GET {} {:?}", url, query);

        let response = self.client.get(url).query(query).send().await.map_err(|e| {
            let msg = format!("request failed: {} (url: {})", e, url);
            error!("{}", msg);
            AppError::Network(msg)
        })?;

        let status = response.status();
        if !status.is_success() {
            let body = response.text().await.unwrap_or_default();
            return Err(AppError::Network(format!(
                "HTTP {} from {}: {}",
                status, url, body
            )));
        }

        let body = response.text().await?;
        Ok(serde_json::from_str(&body)?)
    }
}

#[async_trait]
impl MarketDataSource for CoinGeckoClient {
    async fn fetch_price_history(
        &self,
        coin_id: &str,
        vs_currency: &str,
        days: u32,
    ) -> Result<PriceSeries> {
        let url = format!("{}/coins/{}/market_chart", self.market_chart_base_url, coin_id);
        let query = [
            ("vs_currency", vs_currency.to_string()),
            ("days", days.to_string()),
        ];

        let response: MarketChartResponse = self.get_json(&url, &query).await?;
        let series = PriceSeries::try_from(response)?;

        if series.is_empty() {
            warn!("No price points returned for {}", coin_id);
        } else {
            debug!("Fetched {} price points for {}", series.len(), coin_id);
        }
        Ok(series)
    }

    async fn fetch_fx_rate(&self) -> Result<f64> {
        let mut query = vec![
            ("base", self.fx_base.clone()),
            ("symbols", self.fx_symbol.clone()),
        ];
        if let Some(key) = &self.fx_access_key {
            query.push(("access_key", key.clone()));
        }

        let response: FxRatesResponse = self.get_json(&self.fx_url, &query).await?;
        let rate = response.rate(&self.fx_symbol)?;

        info!("Fetched FX rate {}/{} = {}", self.fx_base, self.fx_symbol, rate);
        Ok(rate)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use axum::{
        Router,
        extract::{Path, RawQuery, State},
        http::StatusCode,
        response::IntoResponse,
        routing::get,
    };
    use std::sync::{Arc, Mutex};
    use tokio::net::TcpListener;

    /// Path id and raw query string of every request the stub server saw
    #[derive(Clone, Default)]
    struct Seen(Arc<Mutex<Vec<(Option<String>, String)>>>);

    impl Seen {
        fn record(&self, id: Option<String>, query: Option<String>) {
            self.0.lock().unwrap().push((id, query.unwrap_or_default()));
        }

        fn requests(&self) -> Vec<(Option<String>, String)> {
            self.0.lock().unwrap().clone()
        }
    }

    /// Serves `router` on an ephemeral local port and returns its base url
    async fn spawn_server(router: Router) -> String {
        let listener = TcpListener::bind("127.0.0.1:0").await.unwrap();
        let addr = listener.local_addr().unwrap();
        tokio::spawn(async move {
            axum::serve(listener, router).await.unwrap();
        });
        format!("http://{}", addr)
    }

    fn client_for(base: &str, fx_access_key: Option<&str>) -> CoinGeckoClient {
        let config = MarketDataConfig {
            market_chart_base_url: base.to_string(),
            fx_url: format!("{}/latest", base),
            fx_access_key: fx_access_key.map(str::to_string),
            ..MarketDataConfig::default()
        };
        CoinGeckoClient::new(&config).unwrap()
    }

    async fn market_chart(
        State(seen): State<Seen>,
        Path(id): Path<String>,
        RawQuery(query): RawQuery,
    ) -> impl IntoResponse {
        seen.record(Some(id), query);
        (
            [("content-type", "application/json")],
            r#"{"prices": [[1700003600000, 36611.5], [1700000000000, 36500.12]], "total_volumes": []}"#,
        )
    }

    async fn latest(State(seen): State<Seen>, RawQuery(query): RawQuery) -> impl IntoResponse {
        seen.record(None, query);
        (
            [("content-type", "application/json")],
            r#"{"success": true, "base": "USD", "rates": {"EUR": 0.92}}"#,
        )
    }

    #[test]
    fn test_trailing_slash_trimmed() {
        let config = MarketDataConfig {
            market_chart_base_url: "https://api.coingecko.com/api/v3/".to_string(),
            ..MarketDataConfig::default()
        };
        let client = CoinGeckoClient::new(&config).unwrap();
        assert_eq!(client.market_chart_base_url, "https://api.coingecko.com/api/v3");
        assert_eq!(client.fx_symbol, "EUR");
    }

    #[tokio::test]
    async fn test_fetch_price_history_request_and_parsing() {
        let seen = Seen::default();
        let router = Router::new()
            .route("/coins/{id}/market_chart", get(market_chart))
            .with_state(seen.clone());
        let base = spawn_server(router).await;

        let series = client_for(&base, None)
            .fetch_price_history("bitcoin", "usd", 30)
            .await
            .unwrap();

        assert_eq!(series.prices(), vec![36500.12, 36611.5]);
        assert_eq!(
            seen.requests(),
            vec![(Some("bitcoin".to_string()), "vs_currency=usd&days=30".to_string())]
        );
    }

    #[tokio::test]
    async fn test_rate_limited_response_is_a_network_error() {
        let router = Router::new().route(
            "/coins/{id}/market_chart",
            get(|| async { (StatusCode::TOO_MANY_REQUESTS, "slow down") }),
        );
        let base = spawn_server(router).await;

        let err = client_for(&base, None)
            .fetch_price_history("bitcoin", "usd", 30)
            .await
            .unwrap_err();

        match err {
            AppError::Network(msg) => {
                assert!(msg.contains("429"), "{}", msg);
                assert!(msg.contains("/coins/bitcoin/market_chart"), "{}", msg);
                assert!(msg.contains("slow down"), "{}", msg);
            }
            other => panic!("expected a network error, got {:?}", other),
        }
    }

    #[tokio::test]
    async fn test_non_json_body_is_a_parse_error() {
        let router = Router::new().route(
            "/coins/{id}/market_chart",
            get(|| async { "<html>maintenance</html>" }),
        );
        let base = spawn_server(router).await;

        let err = client_for(&base, None)
            .fetch_price_history("bitcoin", "usd", 30)
            .await
            .unwrap_err();

        assert!(matches!(err, AppError::Parse(_)), "{:?}", err);
    }

    #[tokio::test]
    async fn test_fetch_fx_rate_sends_access_key() {
        let seen = Seen::default();
        let router = Router::new()
            .route("/latest", get(latest))
            .with_state(seen.clone());
        let base = spawn_server(router).await;

        let rate = client_for(&base, Some("secret"))
            .fetch_fx_rate()
            .await
            .unwrap();

        assert_eq!(rate, 0.92);
        assert_eq!(
            seen.requests(),
            vec![(None, "base=USD&symbols=EUR&access_key=secret".to_string())]
        );
    }

    #[tokio::test]
    async fn test_fetch_fx_rate_without_access_key() {
        let seen = Seen::default();
        let router = Router::new()
            .route("/latest", get(latest))
            .with_state(seen.clone());
        let base = spawn_server(router).await;

        client_for(&base, None).fetch_fx_rate().await.unwrap();

        assert_eq!(seen.requests(), vec![(None, "base=USD&symbols=EUR".to_string())]);
    }

    #[tokio::test]
    async fn test_fx_response_without_rate_is_a_parse_error() {
        let router = Router::new().route(
            "/latest",
            get(|| async {
                (
                    [("content-type", "application/json")],
                    r#"{"success": false, "error": {"code": 101, "type": "invalid_access_key"}}"#,
                )
            }),
        );
        let base = spawn_server(router).await;

        let err = client_for(&base, None).fetch_fx_rate().await.unwrap_err();
        assert!(matches!(err, AppError::Parse(_)), "{:?}", err);
    }
}
