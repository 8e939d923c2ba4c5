use crate::error::{AppError, Result};
use serde::Deserialize;
use std::collections::HashSet;
use std::fmt;

#[derive(Debug, Deserialize)]
pub struct AppConfig {
    pub log: LogConfig,
    #[serde(default)]
    pub server: ServerConfig,
    #[serde(default)]
    pub poller: PollerConfig,
    #[serde(default)]
    pub market_data: MarketDataConfig,
    #[serde(default)]
    pub snapshot: SnapshotConfig,
    #[serde(default = "default_catalog")]
    pub catalog: Vec<CatalogEntry>,
}

#[derive(Debug, Deserialize)]
pub struct LogConfig {
    pub level: String,
    pub format: String,
}

#[derive(Debug, Deserialize)]
#[serde(default)]
pub struct ServerConfig {
    /// Prebuilt front-end served for every non-API path
    pub static_dir: String,
    pub index_file: String,
}

impl Default for ServerConfig {
    fn default() -> Self {
        Self {
            static_dir: "dashboard/build".to_string(),
            index_file: "index.html".to_string(),
        }
    }
}

#[derive(Debug, Deserialize)]
#[serde(default)]
pub struct PollerConfig {
    pub enabled: bool,
    pub interval_seconds: u64,
    pub lookback_days: u32,
    pub vs_currency: String,
    pub restart_delay_seconds: u64,
}

impl Default for PollerConfig {
    fn default() -> Self {
        Self {
            enabled: true,
            interval_seconds: 300,
            lookback_days: 30,
            vs_currency: "usd".to_string(),
            restart_delay_seconds: 30,
        }
    }
}

#[derive(Deserialize)]
#[serde(default)]
pub struct MarketDataConfig {
    pub market_chart_base_url: String,
    pub fx_url: String,
    pub fx_access_key: Option<String>,
    pub fx_base: String,
    pub fx_symbol: String,
    pub request_timeout_seconds: u64,
}

impl Default for MarketDataConfig {
    fn default() -> Self {
        Self {
            market_chart_base_url: "https://api.coingecko.com/api/v3".to_string(),
            fx_url: "https://api.exchangerate.host/latest".to_string(),
            fx_access_key: None,
            fx_base: "USD".to_string(),
            fx_symbol: "EUR".to_string(),
            request_timeout_seconds: 30,
        }
    }
}

// The access key never reaches the logs
impl fmt::Debug for MarketDataConfig {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("MarketDataConfig")
            .field("market_chart_base_url", &self.market_chart_base_url)
            .field("fx_url", &self.fx_url)
            .field("fx_access_key", &self.fx_access_key.as_ref().map(|_| "***"))
            .field("fx_base", &self.fx_base)
            .field("fx_symbol", &self.fx_symbol)
            .field("request_timeout_seconds", &self.request_timeout_seconds)
            .finish()
    }
}

#[derive(Debug, Deserialize)]
#[serde(default)]
pub struct SnapshotConfig {
    pub path: String,
}

impl Default for SnapshotConfig {
    fn default() -> Self {
        Self {
            path: "signals.json".to_string(),
        }
    }
}

/// Maps a market-data asset id to the symbol shown to users.
#[derive(Debug, Clone, Deserialize, PartialEq, Eq)]
pub struct CatalogEntry {
    pub id: String,
    pub symbol: String,
}

fn default_catalog() -> Vec<CatalogEntry> {
    [
        ("bitcoin", "BTC"),
        ("ethereum", "ETH"),
        ("floki", "FLOKI"),
        ("ordinals", "ORDI"),
        ("0x", "ZRX"),
        ("elrond", "EGLD"),
        ("axie-infinity", "AXS"),
        ("smooth-love-potion", "SLP"),
        ("celer-network", "CELR"),
        ("ether-fi", "ETHF"),
        ("pingu", "PENGU"),
        ("manta-network", "MANTA"),
        ("metis-token", "METIS"),
        ("scroll", "SCRL"),
        ("dydx", "DYDX"),
        ("lukso-token", "LUKSO"),
        ("optimism", "OP"),
        ("bonfida", "FIDA"),
        ("dymension", "DYM"),
        ("dodo", "DODO"),
        ("layerzero", "LZ"),
        ("rocket-pool", "RPL"),
    ]
    .into_iter()
    .map(|(id, symbol)| CatalogEntry {
        id: id.to_string(),
        symbol: symbol.to_string(),
    })
    .collect()
}

impl AppConfig {
    pub fn from_toml_str(raw: &str) -> Result<AppConfig> {
        let config: AppConfig = toml::from_str(raw)?;
        config.validate()?;
        Ok(config)
    }

    pub fn validate(&self) -> Result<()> {
        if self.catalog.is_empty() {
            return Err(AppError::Config("catalog must not be empty".to_string()));
        }

        let mut ids = HashSet::new();
        let mut symbols = HashSet::new();
        for entry in &self.catalog {
            if entry.id.trim().is_empty() || entry.symbol.trim().is_empty() {
                return Err(AppError::Config(format!(
                    "catalog entry has an empty id or symbol: {:?}",
                    entry
                )));
            }
            if !ids.insert(entry.id.as_str()) {
                return Err(AppError::Config(format!("duplicate catalog id: {}", entry.id)));
            }
            if !symbols.insert(entry.symbol.as_str()) {
                return Err(AppError::Config(format!(
                    "duplicate catalog symbol: {}",
                    entry.symbol
                )));
            }
        }

        if self.poller.interval_seconds == 0 {
            return Err(AppError::Config(
                "poller.interval_seconds must be greater than zero".to_string(),
            ));
        }
        if self.poller.lookback_days == 0 {
            return Err(AppError::Config(
                "poller.lookback_days must be greater than zero".to_string(),
            ));
        }

        Ok(())
    }
}
