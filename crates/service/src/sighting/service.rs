use std::sync::Arc;

use chrono::Utc;
use models::{Sighting, SightingInput};
use tracing::{debug, instrument};
use uuid::Uuid;

use crate::errors::ServiceError;
use crate::sighting::repository::SightingRepository;

/// Identifier for a new record: the client's id when non-empty, otherwise a fresh UUID.
pub fn assign_id(input: &SightingInput) -> String {
    input
        .requested_id()
        .map(str::to_string)
        .unwrap_or_else(|| Uuid::new_v4().to_string())
}

/// Application service encapsulating sighting rules.
/// Validates payloads, fills in timestamps, then delegates to the repository.
pub struct SightingService<R: SightingRepository + ?Sized> {
    repo: Arc<R>,
}

impl<R: SightingRepository + ?Sized> SightingService<R> {
    pub fn new(repo: Arc<R>) -> Self { Self { repo } }

    /// Create a sighting under `id`, usually obtained from [`assign_id`].
    #[instrument(skip(self, input), fields(location = %input.location))]
    pub async fn create(&self, id: String, input: SightingInput) -> Result<Sighting, ServiceError> {
        let now = Utc::now();
        let sighting = input.into_sighting(id, now, now)?;
        self.repo.create(sighting.clone()).await?;
        debug!(id = %sighting.id, "sighting created");
        Ok(sighting)
    }

    pub async fn get(&self, id: &str) -> Result<Sighting, ServiceError> { self.repo.get(id).await }

    pub async fn list(&self) -> Vec<Sighting> { self.repo.list().await }

    /// Replace a sighting. The id comes from `id`, whatever the body says, and
    /// `created_at` is carried over from the record being replaced.
    #[instrument(skip(self, input), fields(location = %input.location))]
    pub async fn update(&self, id: &str, input: SightingInput) -> Result<Sighting, ServiceError> {
        let now = Utc::now();
        let replacement = input.into_sighting(id.to_string(), now, now)?;
        self.repo
            .update_with(
                id,
                Box::new(move |current: &Sighting| Sighting {
                    created_at: current.created_at,
                    updated_at: now.max(current.created_at),
                    ..replacement
                }),
            )
            .await
    }

    pub async fn delete(&self, id: &str) -> Result<(), ServiceError> { self.repo.delete(id).await }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::file::sighting_store::SightingStore;
    use crate::storage::WriteMode;
    use chrono::{DateTime, Duration};

    async fn setup_service() -> (SightingService<SightingStore>, std::path::PathBuf) {
        let tmp = std::env::temp_dir().join(format!("svc_sighting_service_{}.json", Uuid::new_v4()));
        let store = SightingStore::open(&tmp, WriteMode::Atomic).await.expect("store init");
        (SightingService::new(store), tmp)
    }

    fn input(location: &str, count: i64, observed_at: Option<DateTime<Utc>>) -> SightingInput {
        SightingInput {
            name: Some("Chanterelle".into()),
            location: location.into(),
            count,
            observed_at,
            ..Default::default()
        }
    }

    async fn create<R: SightingRepository + ?Sized>(
        svc: &SightingService<R>,
        payload: SightingInput,
    ) -> Result<Sighting, ServiceError> {
        svc.create(assign_id(&payload), payload).await
    }

    #[test]
    fn assign_id_prefers_client_id() {
        let mut payload = input("Forest", 1, None);
        payload.id = Some("client-7".into());
        assert_eq!(assign_id(&payload), "client-7");

        payload.id = Some(String::new());
        let generated = assign_id(&payload);
        assert!(Uuid::parse_str(&generated).is_ok());
        assert_ne!(assign_id(&payload), generated);
    }

    #[tokio::test]
    async fn create_generates_id_and_timestamps() -> Result<(), anyhow::Error> {
        let (svc, tmp) = setup_service().await;
        let created = create(&svc, input("Forest", 5, Some(Utc::now()))).await?;
        assert!(!created.id.is_empty());
        assert!(Uuid::parse_str(&created.id).is_ok());
        assert_eq!(created.created_at, created.updated_at);
        assert_eq!(svc.get(&created.id).await?, created);

        let _ = tokio::fs::remove_file(&tmp).await;
        Ok(())
    }

    #[tokio::test]
    async fn create_keeps_client_id_and_rejects_duplicates() -> Result<(), anyhow::Error> {
        let (svc, tmp) = setup_service().await;
        let mut first = input("Forest", 5, Some(Utc::now()));
        first.id = Some("client-1".into());
        let created = create(&svc, first.clone()).await?;
        assert_eq!(created.id, "client-1");

        first.location = "Woods".into();
        assert!(matches!(create(&svc, first).await, Err(ServiceError::AlreadyExists(_))));
        assert_eq!(svc.get("client-1").await?.location, "Forest");

        let _ = tokio::fs::remove_file(&tmp).await;
        Ok(())
    }

    #[tokio::test]
    async fn invalid_payloads_never_reach_the_store() -> Result<(), anyhow::Error> {
        let (svc, tmp) = setup_service().await;
        let now = Some(Utc::now());
        let cases = [
            (input("", 5, now), "location is required"),
            (input("Forest", 0, now), "count must be at least 1"),
            (input("Forest", 5, None), "dateTime is required"),
        ];
        for (payload, expected) in cases {
            match create(&svc, payload).await {
                Err(ServiceError::Validation(msg)) => assert_eq!(msg, expected),
                other => panic!("expected validation error, got {other:?}"),
            }
        }
        assert!(svc.list().await.is_empty());
        assert!(!tmp.exists());
        Ok(())
    }

    #[tokio::test]
    async fn update_preserves_id_and_created_at() -> Result<(), anyhow::Error> {
        let (svc, tmp) = setup_service().await;
        let created = create(&svc, input("Forest", 5, Some(Utc::now()))).await?;

        let mut change = input("Meadow", 9, Some(Utc::now() - Duration::days(1)));
        change.id = Some("some-other-id".into());
        change.name = Some("Morel".into());
        let updated = svc.update(&created.id, change).await?;

        assert_eq!(updated.id, created.id);
        assert_eq!(updated.created_at, created.created_at);
        assert!(updated.updated_at >= created.created_at);
        assert_eq!(updated.location, "Meadow");
        assert_eq!(updated.count, 9);
        assert_eq!(updated.name.as_deref(), Some("Morel"));
        assert_eq!(svc.get(&created.id).await?, updated);
        assert!(matches!(svc.get("some-other-id").await, Err(ServiceError::NotFound(_))));

        let _ = tokio::fs::remove_file(&tmp).await;
        Ok(())
    }

    #[tokio::test]
    async fn update_validates_before_lookup() -> Result<(), anyhow::Error> {
        let (svc, _tmp) = setup_service().await;
        // validation wins over not-found, matching the order clients see
        let res = svc.update("missing", input("", 5, Some(Utc::now()))).await;
        assert!(matches!(res, Err(ServiceError::Validation(_))));
        let res = svc.update("missing", input("Forest", 5, Some(Utc::now()))).await;
        assert!(matches!(res, Err(ServiceError::NotFound(_))));
        Ok(())
    }

    #[tokio::test]
    async fn delete_then_get_is_not_found() -> Result<(), anyhow::Error> {
        let (svc, tmp) = setup_service().await;
        let created = create(&svc, input("Forest", 1, Some(Utc::now()))).await?;
        svc.delete(&created.id).await?;
        assert!(matches!(svc.get(&created.id).await, Err(ServiceError::NotFound(_))));
        assert!(matches!(svc.delete(&created.id).await, Err(ServiceError::NotFound(_))));

        let _ = tokio::fs::remove_file(&tmp).await;
        Ok(())
    }

    /// Deletes and re-creates the record with a later `created_at` just before
    /// handing the update to the store, the way a concurrent client could.
    struct RecreatedBeforeWrite {
        inner: Arc<SightingStore>,
        recreated_at: DateTime<Utc>,
    }

    #[async_trait::async_trait]
    impl SightingRepository for RecreatedBeforeWrite {
        async fn create(&self, sighting: Sighting) -> Result<(), ServiceError> {
            self.inner.create(sighting).await
        }
        async fn get(&self, id: &str) -> Result<Sighting, ServiceError> {
            self.inner.get(id).await
        }
        async fn list(&self) -> Vec<Sighting> {
            self.inner.list().await
        }
        async fn update_with(
            &self,
            id: &str,
            apply: crate::sighting::SightingUpdate,
        ) -> Result<Sighting, ServiceError> {
            let mut live = self.inner.get(id).await?;
            self.inner.delete(id).await?;
            live.created_at = self.recreated_at;
            live.updated_at = self.recreated_at;
            self.inner.create(live).await?;
            self.inner.update_with(id, apply).await
        }
        async fn delete(&self, id: &str) -> Result<(), ServiceError> {
            self.inner.delete(id).await
        }
    }

    #[tokio::test]
    async fn update_keeps_created_at_of_the_record_it_replaces() -> Result<(), anyhow::Error> {
        let tmp = std::env::temp_dir().join(format!("svc_sighting_recreate_{}.json", Uuid::new_v4()));
        let inner = SightingStore::open(&tmp, WriteMode::Atomic).await?;
        let original = {
            let svc = SightingService::new(Arc::clone(&inner));
            let mut payload = input("Forest", 2, Some(Utc::now()));
            payload.id = Some("x".into());
            create(&svc, payload).await?
        };

        let recreated_at = original.created_at + Duration::hours(1);
        let svc = SightingService::new(Arc::new(RecreatedBeforeWrite { inner: Arc::clone(&inner), recreated_at }));
        let updated = svc.update("x", input("Meadow", 4, Some(Utc::now()))).await?;

        assert_eq!(updated.created_at, recreated_at);
        assert_eq!(updated.updated_at, recreated_at);
        let live = inner.get("x").await?;
        assert_eq!(live.created_at, recreated_at);
        assert_eq!(live.location, "Meadow");

        let _ = tokio::fs::remove_file(&tmp).await;
        Ok(())
    }
}
