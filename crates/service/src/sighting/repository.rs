use async_trait::async_trait;
use models::Sighting;

use crate::errors::ServiceError;

/// Derives the replacement record from the stored one.
pub type SightingUpdate = Box<dyn FnOnce(&Sighting) -> Sighting + Send>;

/// Storage seam for sighting records.
/// Implementations must make each call atomic with respect to the others.
#[async_trait]
pub trait SightingRepository: Send + Sync {
    async fn create(&self, sighting: Sighting) -> Result<(), ServiceError>;
    async fn get(&self, id: &str) -> Result<Sighting, ServiceError>;
    async fn list(&self) -> Vec<Sighting>;
    /// Replace the record under `id` with `apply(current)` and return what was stored.
    /// `current` is read under the same lock as the write.
    async fn update_with(&self, id: &str, apply: SightingUpdate) -> Result<Sighting, ServiceError>;
    async fn delete(&self, id: &str) -> Result<(), ServiceError>;
}
