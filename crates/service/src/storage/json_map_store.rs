use std::{
    collections::BTreeMap,
    ffi::OsString,
    fmt::Display,
    io,
    path::{Path, PathBuf},
    sync::Arc,
};
use tokio::{fs, io::AsyncWriteExt, sync::RwLock};
use tracing::debug;

use super::error::StoreError;

/// How the backing file is rewritten after a mutation.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
pub enum WriteMode {
    /// Write a sibling `.tmp` file and rename it over the target.
    #[default]
    Atomic,
    /// Truncate and rewrite the target directly.
    InPlace,
}

/// Generic JSON file-backed key-value map store.
///
/// Holds a `BTreeMap<K, V>` in memory and rewrites the whole map to a JSON file
/// after every successful mutation. The write lock is held across mutate and
/// persist, so at most one rewrite is in flight and readers never observe a
/// half-applied change.
///
/// A failed rewrite is reported to the caller but the in-memory change is kept,
/// so memory and disk can diverge until the next successful rewrite.
pub struct JsonMapStore<K, V> {
    inner: RwLock<BTreeMap<K, V>>,
    file_path: PathBuf,
    mode: WriteMode,
}

impl<K, V> JsonMapStore<K, V>
where
    K: Ord + Display + Clone + serde::Serialize + serde::de::DeserializeOwned + Send + Sync,
    V: serde::Serialize + serde::de::DeserializeOwned + Clone + Send + Sync,
{
    /// Load the store from `path`.
    ///
    /// A missing or blank file yields an empty map and is not created until the
    /// first mutation. Any other content must parse as a JSON object, otherwise
    /// construction fails with [`StoreError::CorruptState`].
    pub async fn open<P: Into<PathBuf>>(path: P, mode: WriteMode) -> Result<Arc<Self>, StoreError> {
        let file_path = path.into();
        if let Some(parent) = file_path.parent().filter(|p| !p.as_os_str().is_empty()) {
            fs::create_dir_all(parent)
                .await
                .map_err(|source| StoreError::Io { path: parent.to_path_buf(), source })?;
        }

        let map = Self::load(&file_path).await?;
        debug!(path = %file_path.display(), records = map.len(), "json map store loaded");
        Ok(Arc::new(Self { inner: RwLock::new(map), file_path, mode }))
    }

    async fn load(path: &Path) -> Result<BTreeMap<K, V>, StoreError> {
        let bytes = match fs::read(path).await {
            Ok(bytes) => bytes,
            Err(e) if e.kind() == io::ErrorKind::NotFound => return Ok(BTreeMap::new()),
            Err(source) => return Err(StoreError::Io { path: path.to_path_buf(), source }),
        };
        if bytes.iter().all(u8::is_ascii_whitespace) {
            return Ok(BTreeMap::new());
        }
        serde_json::from_slice(&bytes)
            .map_err(|source| StoreError::CorruptState { path: path.to_path_buf(), source })
    }

    /// Rewrite the backing file with `map`. Callers hold the write lock.
    async fn save(&self, map: &BTreeMap<K, V>) -> Result<(), StoreError> {
        let data = serde_json::to_vec_pretty(map).map_err(StoreError::Serialize)?;
        let written = match self.mode {
            WriteMode::InPlace => fs::write(&self.file_path, &data).await,
            WriteMode::Atomic => {
                let tmp = self.tmp_path();
                let published = match write_synced(&tmp, &data).await {
                    Ok(()) => fs::rename(&tmp, &self.file_path).await,
                    Err(e) => Err(e),
                };
                if published.is_err() {
                    let _ = fs::remove_file(&tmp).await;
                }
                published
            }
        };
        written.map_err(|source| StoreError::Persistence { path: self.file_path.clone(), source })
    }

    fn tmp_path(&self) -> PathBuf {
        let mut name = OsString::from(self.file_path.as_os_str());
        name.push(".tmp");
        PathBuf::from(name)
    }

    pub fn path(&self) -> &Path {
        &self.file_path
    }

    /// Insert a new entry and persist. Fails if the key is already present.
    pub async fn create(&self, key: K, value: V) -> Result<(), StoreError> {
        let mut map = self.inner.write().await;
        if map.contains_key(&key) {
            return Err(StoreError::AlreadyExists(key.to_string()));
        }
        map.insert(key, value);
        self.save(&map).await
    }

    /// Get a copy of the value stored under `key`.
    pub async fn get(&self, key: &K) -> Result<V, StoreError> {
        let map = self.inner.read().await;
        map.get(key).cloned().ok_or_else(|| StoreError::NotFound(key.to_string()))
    }

    /// Snapshot of all values. Callers must not rely on the order.
    pub async fn list(&self) -> Vec<V> {
        let map = self.inner.read().await;
        map.values().cloned().collect()
    }

    /// Replace the value stored under `key` entirely and persist.
    pub async fn update(&self, key: &K, value: V) -> Result<(), StoreError> {
        self.update_with(key, |_| value).await.map(|_| ())
    }

    /// Derive a new value from the one stored under `key`, store it and persist.
    ///
    /// `f` sees the value as it is when the write lock is taken, so nothing can
    /// replace the entry between the read and the write. Returns the stored value.
    pub async fn update_with<F>(&self, key: &K, f: F) -> Result<V, StoreError>
    where
        F: FnOnce(&V) -> V,
    {
        let mut map = self.inner.write().await;
        let slot = map.get_mut(key).ok_or_else(|| StoreError::NotFound(key.to_string()))?;
        let next = f(&*slot);
        *slot = next.clone();
        self.save(&map).await?;
        Ok(next)
    }

    /// Remove the entry under `key` and persist.
    pub async fn delete(&self, key: &K) -> Result<(), StoreError> {
        let mut map = self.inner.write().await;
        if map.remove(key).is_none() {
            return Err(StoreError::NotFound(key.to_string()));
        }
        self.save(&map).await
    }

    pub async fn len(&self) -> usize {
        self.inner.read().await.len()
    }

    pub async fn is_empty(&self) -> bool {
        self.inner.read().await.is_empty()
    }
}

/// Create `path`, write `data` and flush it to disk before returning.
async fn write_synced(path: &Path, data: &[u8]) -> io::Result<()> {
    let mut file = fs::File::create(path).await?;
    file.write_all(data).await?;
    file.sync_all().await
}
