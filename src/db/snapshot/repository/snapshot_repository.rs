// File: src/db/snapshot/repository/snapshot_repository.rs
use crate::db::snapshot::models::asset_snapshot::SnapshotMap;
use crate::error::{AppError, Result};
use async_trait::async_trait;
use serde::Serialize;
use serde_json::{Serializer, Value, ser::PrettyFormatter};
use std::io::ErrorKind;
use std::path::{Path, PathBuf};
use tokio::fs;
use tracing::{debug, info};

#[async_trait]
pub trait SnapshotRepository {
    /// Replaces the stored snapshots with `snapshots`
    async fn save_all(&self, snapshots: &SnapshotMap) -> Result<()>;

    /// Reads back all snapshots; an absent store yields an empty map
    async fn load_all(&self) -> Result<SnapshotMap>;

    /// Returns the stored document as-is for the HTTP API
    async fn read_raw(&self) -> Result<Value>;
}

/// Snapshot store backed by a single pretty-printed JSON file.
pub struct JsonFileSnapshotRepository {
    path: PathBuf,
}

impl JsonFileSnapshotRepository {
    pub fn new(path: impl Into<PathBuf>) -> Self {
        Self { path: path.into() }
    }

    pub fn path(&self) -> &Path {
        &self.path
    }

    fn temp_path(&self) -> PathBuf {
        let mut name = self
            .path
            .file_name()
            .map(|n| n.to_os_string())
            .unwrap_or_default();
        name.push(".tmp");
        self.path.with_file_name(name)
    }

    /// File contents, or `None` when nothing has been written yet
    async fn read_file(&self) -> Result<Option<String>> {
        match fs::read_to_string(&self.path).await {
            Ok(raw) => Ok(Some(raw)),
            Err(e) if e.kind() == ErrorKind::NotFound => Ok(None),
            Err(e) => Err(e.into()),
        }
    }

    fn invalid_json(&self, err: serde_json::Error) -> AppError {
        AppError::SnapshotUnavailable(format!(
            "{} is not valid JSON: {}",
            self.path.display(),
            err
        ))
    }
}

/// JSON with 4-space indentation
fn to_pretty_json<T: Serialize>(value: &T) -> Result<Vec<u8>> {
    let mut buf = Vec::new();
    let formatter = PrettyFormatter::with_indent(b"    ");
    let mut serializer = Serializer::with_formatter(&mut buf, formatter);
    value.serialize(&mut serializer)?;
    Ok(buf)
}

#[async_trait]
impl SnapshotRepository for JsonFileSnapshotRepository {
    async fn save_all(&self, snapshots: &SnapshotMap) -> Result<()> {
        let body = to_pretty_json(snapshots)?;

        if let Some(parent) = self.path.parent().filter(|p| !p.as_os_str().is_empty()) {
            fs::create_dir_all(parent).await?;
        }

        // Readers only ever see the old or the new file
        let temp_path = self.temp_path();
        fs::write(&temp_path, &body).await?;
        fs::rename(&temp_path, &self.path).await?;

        info!(
            "Wrote {} snapshots ({} bytes) to {}",
            snapshots.len(),
            body.len(),
            self.path.display()
        );
        Ok(())
    }

    async fn load_all(&self) -> Result<SnapshotMap> {
        match self.read_file().await? {
            Some(raw) => serde_json::from_str(&raw).map_err(|e| self.invalid_json(e)),
            None => {
                debug!(
                    "{} does not exist yet, starting with an empty snapshot set",
                    self.path.display()
                );
                Ok(SnapshotMap::new())
            }
        }
    }

    async fn read_raw(&self) -> Result<Value> {
        let raw = self.read_file().await?.ok_or_else(|| {
            AppError::SnapshotUnavailable(format!("{} does not exist yet", self.path.display()))
        })?;

        serde_json::from_str(&raw).map_err(|e| self.invalid_json(e))
    }
}
