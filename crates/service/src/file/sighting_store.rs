use std::path::{Path, PathBuf};
use std::sync::Arc;

use async_trait::async_trait;
use models::Sighting;

use crate::errors::ServiceError;
use crate::sighting::repository::{SightingRepository, SightingUpdate};
use crate::storage::{JsonMapStore, WriteMode};

/// File-backed store for sightings.
/// Keeps a map of `id -> sighting` persisted as a single JSON object.
#[derive(Clone)]
pub struct SightingStore {
    store: Arc<JsonMapStore<String, Sighting>>,
}

impl SightingStore {
    /// Load the store from the given file path. A malformed file is an error.
    pub async fn open<P: Into<PathBuf>>(path: P, mode: WriteMode) -> Result<Arc<Self>, ServiceError> {
        let store = JsonMapStore::<String, Sighting>::open(path, mode).await?;
        Ok(Arc::new(Self { store }))
    }

    pub fn path(&self) -> &Path {
        self.store.path()
    }

    pub async fn len(&self) -> usize {
        self.store.len().await
    }
}

#[async_trait]
impl SightingRepository for SightingStore {
    async fn create(&self, sighting: Sighting) -> Result<(), ServiceError> {
        Ok(self.store.create(sighting.id.clone(), sighting).await?)
    }

    async fn get(&self, id: &str) -> Result<Sighting, ServiceError> {
        Ok(self.store.get(&id.to_string()).await?)
    }

    async fn list(&self) -> Vec<Sighting> {
        self.store.list().await
    }

    async fn update_with(&self, id: &str, apply: SightingUpdate) -> Result<Sighting, ServiceError> {
        Ok(self.store.update_with(&id.to_string(), apply).await?)
    }

    async fn delete(&self, id: &str) -> Result<(), ServiceError> {
        Ok(self.store.delete(&id.to_string()).await?)
    }
}
