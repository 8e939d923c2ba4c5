pub mod asset_snapshot;
