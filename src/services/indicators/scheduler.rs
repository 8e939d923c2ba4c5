// File: src/services/indicators/scheduler.rs
use super::calculator::IndicatorCalculator;
use super::signal::Signal;
use crate::app_state::models::AppState;
use crate::db::snapshot::models::asset_snapshot::{AssetSnapshot, SnapshotMap};
use crate::env_config::models::app_config::CatalogEntry;
use crate::error::Result;
use crate::utils::local_timestamp;
use std::sync::Arc;
use std::time::Duration;
use tokio::sync::watch;
use tokio::task::JoinHandle;
use tokio::time::{self, MissedTickBehavior};
use tracing::{debug, error, info, warn};

pub struct SignalsScheduler {
    app_state: Arc<AppState>,
    calculator: IndicatorCalculator,
}

impl SignalsScheduler {
    pub fn new(app_state: Arc<AppState>) -> Self {
        Self {
            app_state,
            calculator: IndicatorCalculator::default(),
        }
    }

    /// Refreshes every catalog asset in order and persists the whole map.
    ///
    /// A failing asset is logged and keeps its previous snapshot. Returns the
    /// number of assets refreshed in this sweep.
    pub async fn trigger_update(&self, eur_rate: f64, snapshots: &mut SnapshotMap) -> Result<usize> {
        let catalog = &self.app_state.settings.app_config.catalog;
        info!("Starting signals update for {} assets", catalog.len());

        let mut refreshed = 0;
        for (index, entry) in catalog.iter().enumerate() {
            debug!(
                "Processing asset {}/{}: {} ({})",
                index + 1,
                catalog.len(),
                entry.symbol,
                entry.id
            );

            match self.process_asset(entry, eur_rate).await {
                Ok(snapshot) => {
                    info!("{}: {} at {}$", snapshot.symbol, snapshot.signal, snapshot.price_usd);
                    snapshots.insert(entry.symbol.clone(), snapshot);
                    refreshed += 1;
                }
                Err(e) => {
                    error!("Error processing {} ({}): {}", entry.symbol, entry.id, e);
                    // Continue with the next asset
                }
            }
        }

        self.app_state.snapshot_repository.save_all(snapshots).await?;

        info!(
            "Completed signals update: {}/{} assets refreshed",
            refreshed,
            catalog.len()
        );
        Ok(refreshed)
    }

    async fn process_asset(&self, entry: &CatalogEntry, eur_rate: f64) -> Result<AssetSnapshot> {
        let poller = &self.app_state.settings.app_config.poller;

        let series = self
            .app_state
            .market_data
            .fetch_price_history(&entry.id, &poller.vs_currency, poller.lookback_days)
            .await?;

        let indicators = self.calculator.calculate(&series)?;
        let signal = Signal::classify(&indicators);

        Ok(AssetSnapshot::new(
            &entry.symbol,
            &indicators,
            signal,
            eur_rate,
            local_timestamp(),
        ))
    }

    /// Polls until `shutdown` fires. The FX rate is fetched once per run.
    ///
    /// Shutdown also interrupts a fetch or sweep in progress; an interrupted
    /// sweep writes nothing, so the store keeps the previous complete sweep.
    pub async fn run(&self, mut shutdown: watch::Receiver<bool>) -> Result<()> {
        let poller = &self.app_state.settings.app_config.poller;

        let eur_rate = tokio::select! {
            rate = self.app_state.market_data.fetch_fx_rate() => rate?,
            _ = wait_for_shutdown(&mut shutdown) => {
                info!("Scheduler: shutdown requested before the first sweep");
                return Ok(());
            }
        };

        let mut snapshots = match self.app_state.snapshot_repository.load_all().await {
            Ok(existing) => existing,
            Err(e) => {
                warn!("Ignoring unreadable previous snapshots: {}", e);
                SnapshotMap::new()
            }
        };

        let mut interval = time::interval(Duration::from_secs(poller.interval_seconds));
        interval.set_missed_tick_behavior(MissedTickBehavior::Delay);

        loop {
            tokio::select! {
                _ = interval.tick() => {
                    tokio::select! {
                        result = self.trigger_update(eur_rate, &mut snapshots) => {
                            result?;
                        }
                        _ = wait_for_shutdown(&mut shutdown) => {
                            warn!("Scheduler: shutdown requested, abandoning the current sweep");
                            return Ok(());
                        }
                    }
                }
                _ = wait_for_shutdown(&mut shutdown) => {
                    info!("Scheduler: shutdown requested");
                    return Ok(());
                }
            }
        }
    }

    /// Spawns the poller under a supervisor that restarts it after failures.
    /// Returns `None` when the poller is disabled.
    pub fn start(self, mut shutdown: watch::Receiver<bool>) -> Option<JoinHandle<()>> {
        let poller = &self.app_state.settings.app_config.poller;
        if !poller.enabled {
            info!("Signals scheduler is disabled in configuration");
            return None;
        }

        info!(
            "Starting signals scheduler with {} second interval, {} day lookback",
            poller.interval_seconds, poller.lookback_days
        );
        let restart_delay = Duration::from_secs(poller.restart_delay_seconds);

        Some(tokio::spawn(async move {
            loop {
                match self.run(shutdown.clone()).await {
                    Ok(()) => break,
                    Err(e) => {
                        error!(
                            "Scheduler: run failed: {}, restarting in {}s",
                            e,
                            restart_delay.as_secs()
                        );
                    }
                }

                tokio::select! {
                    _ = time::sleep(restart_delay) => {}
                    _ = wait_for_shutdown(&mut shutdown) => break,
                }
            }
            info!("Signals scheduler stopped");
        }))
    }
}

/// Resolves once shutdown is requested or the sender is gone
async fn wait_for_shutdown(shutdown: &mut watch::Receiver<bool>) {
    let _ = shutdown.wait_for(|stopped| *stopped).await;
}
