// src/app_state/models.rs
use crate::db::snapshot::repository::snapshot_repository::SnapshotRepository;
use crate::env_config::models::app_setting::AppSettings;
use crate::services::market_data::MarketDataSource;

use std::sync::Arc;

pub struct AppState {
    pub settings: Arc<AppSettings>,
    pub market_data: Arc<dyn MarketDataSource + Send + Sync>,
    pub snapshot_repository: Arc<dyn SnapshotRepository + Send + Sync>,
}

impl AppState {
    pub fn new(
        settings: Arc<AppSettings>,
        market_data: Arc<dyn MarketDataSource + Send + Sync>,
        snapshot_repository: Arc<dyn SnapshotRepository + Send + Sync>,
    ) -> Self {
        Self {
            settings,
            market_data,
            snapshot_repository,
        }
    }
}
