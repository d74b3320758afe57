//! JSON ファイルによる RoomStore 実装
//!
//! 変更のたびにレジストリ全体を書き出す。書き込みは一時ファイル経由の rename で
//! 置き換えるため、途中でクラッシュしても壊れたファイルは残らない。

use std::path::{Path, PathBuf};

use async_trait::async_trait;

use crate::{
    domain::{Registry, RoomStore, StoreError},
    infrastructure::dto::{
        conversion::{registry_from_document, registry_to_document},
        registry::RegistryDocument,
    },
};

pub struct JsonFileRoomStore {
    path: PathBuf,
}

impl JsonFileRoomStore {
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
            .map(|name| name.to_os_string())
            .unwrap_or_default();
        name.push(".tmp");
        self.path.with_file_name(name)
    }
}

#[async_trait]
impl RoomStore for JsonFileRoomStore {
    async fn load(&self) -> Registry {
        let bytes = match tokio::fs::read(&self.path).await {
            Ok(bytes) => bytes,
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => {
                tracing::info!("No room data at {}, starting empty", self.path.display());
                return Registry::new();
            }
            Err(e) => {
                tracing::warn!(
                    "Failed to read room data at {}: {}; starting empty",
                    self.path.display(),
                    e
                );
                return Registry::new();
            }
        };

        match serde_json::from_slice::<RegistryDocument>(&bytes) {
            Ok(document) => {
                let registry = registry_from_document(document);
                tracing::info!(
                    "Loaded {} room(s) from {}",
                    registry.len(),
                    self.path.display()
                );
                registry
            }
            Err(e) => {
                tracing::warn!(
                    "Room data at {} is corrupt ({}); it will be overwritten on next save",
                    self.path.display(),
                    e
                );
                Registry::new()
            }
        }
    }

    async fn save(&self, registry: &Registry) -> Result<(), StoreError> {
        let json = serde_json::to_vec_pretty(&registry_to_document(registry))
            .map_err(|e| StoreError::Encode(e.to_string()))?;

        if let Some(parent) = self.path.parent().filter(|p| !p.as_os_str().is_empty()) {
            tokio::fs::create_dir_all(parent)
                .await
                .map_err(|e| StoreError::Io(e.to_string()))?;
        }

        let temp_path = self.temp_path();
        tokio::fs::write(&temp_path, json)
            .await
            .map_err(|e| StoreError::Io(e.to_string()))?;
        tokio::fs::rename(&temp_path, &self.path)
            .await
            .map_err(|e| StoreError::Io(e.to_string()))?;

        tracing::debug!("Saved {} room(s) to {}", registry.len(), self.path.display());
        Ok(())
    }
}
