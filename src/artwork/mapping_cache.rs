//! Persisted full-corpus artwork mapping.
//!
//! The mapping is expensive to build (it reads every hashed row of every
//! source), so it is kept in memory and on disk as JSON
//! `{ "built_at": ..., "mapping": ... }`. It is rebuilt once it is older than
//! the configured TTL, or when the file is missing or unreadable. A failed
//! rebuild keeps serving the previous mapping.

use std::future::Future;
use std::path::{Path, PathBuf};
use std::sync::Arc;

use chrono::{DateTime, Duration, Utc};
use romlookup_common::{ArtworkMapping, Error};

use crate::config::MAX_CACHE_TTL_HOURS;
use serde::{Deserialize, Serialize};
use tokio::sync::{Mutex, RwLock};
use tracing::{debug, info, warn};

#[derive(Debug, Deserialize)]
struct PersistedMapping {
    built_at: DateTime<Utc>,
    mapping: ArtworkMapping,
}

#[derive(Serialize)]
struct PersistedMappingRef<'a> {
    built_at: DateTime<Utc>,
    mapping: &'a ArtworkMapping,
}

#[derive(Clone)]
struct Snapshot {
    built_at: DateTime<Utc>,
    mapping: Arc<ArtworkMapping>,
}

pub struct MappingCache {
    path: PathBuf,
    ttl: Duration,
    current: RwLock<Option<Snapshot>>,
    /// Serializes disk loads and rebuilds
    rebuild: Mutex<()>,
}

impl MappingCache {
    /// `ttl_hours` is clamped to [`MAX_CACHE_TTL_HOURS`].
    pub fn new(path: impl Into<PathBuf>, ttl_hours: u64) -> Self {
        Self {
            path: path.into(),
            ttl: Duration::hours(ttl_hours.min(MAX_CACHE_TTL_HOURS) as i64),
            current: RwLock::new(None),
            rebuild: Mutex::new(()),
        }
    }

    pub fn path(&self) -> &Path {
        &self.path
    }

    /// When the mapping currently held in memory was built.
    pub async fn built_at(&self) -> Option<DateTime<Utc>> {
        self.current.read().await.as_ref().map(|s| s.built_at)
    }

    fn is_fresh(&self, built_at: DateTime<Utc>) -> bool {
        Utc::now() - built_at <= self.ttl
    }

    /// Return the mapping, loading or rebuilding it as needed.
    ///
    /// # Arguments
    ///
    /// * `build` - Produces a new mapping. Called at most once per call, and
    ///   only when neither memory nor disk holds a fresh mapping.
    ///
    /// # Returns
    ///
    /// The freshest mapping available. Empty only when no mapping was ever
    /// built and the rebuild failed.
    pub async fn get_or_rebuild<F, Fut>(&self, build: F) -> Arc<ArtworkMapping>
    where
        F: FnOnce() -> Fut,
        Fut: Future<Output = anyhow::Result<ArtworkMapping>>,
    {
        if let Some(snapshot) = self.fresh_snapshot().await {
            return snapshot;
        }

        let _guard = self.rebuild.lock().await;

        // Another caller may have finished a rebuild while we waited.
        if let Some(snapshot) = self.fresh_snapshot().await {
            return snapshot;
        }

        if self.current.read().await.is_none() {
            match load(&self.path).await {
                Ok(Some(persisted)) => {
                    let fresh = self.is_fresh(persisted.built_at);
                    debug!(
                        path = %self.path.display(),
                        built_at = %persisted.built_at,
                        fresh,
                        "Loaded artwork mapping from disk"
                    );
                    let mapping = Arc::new(persisted.mapping);
                    *self.current.write().await = Some(Snapshot {
                        built_at: persisted.built_at,
                        mapping: mapping.clone(),
                    });
                    if fresh {
                        return mapping;
                    }
                }
                Ok(None) => {
                    debug!(path = %self.path.display(), "No persisted artwork mapping");
                }
                Err(e) => {
                    warn!(path = %self.path.display(), error = %e, "Discarding persisted artwork mapping");
                }
            }
        }

        match build().await {
            Ok(mapping) => {
                let built_at = Utc::now();
                info!(
                    hashes = mapping.rom_md5.len(),
                    file_names = mapping.rom_file_name_to_md5.len(),
                    "Rebuilt artwork mapping"
                );
                if let Err(e) = store(&self.path, built_at, &mapping).await {
                    warn!(path = %self.path.display(), error = %e, "Failed to persist artwork mapping");
                }
                let mapping = Arc::new(mapping);
                *self.current.write().await = Some(Snapshot {
                    built_at,
                    mapping: mapping.clone(),
                });
                mapping
            }
            Err(e) => {
                let previous = self.current.read().await.clone();
                match previous {
                    Some(snapshot) => {
                        warn!(error = %e, built_at = %snapshot.built_at, "Artwork mapping rebuild failed, keeping previous mapping");
                        snapshot.mapping
                    }
                    None => {
                        warn!(error = %e, "Artwork mapping rebuild failed, no previous mapping");
                        Arc::new(ArtworkMapping::default())
                    }
                }
            }
        }
    }

    async fn fresh_snapshot(&self) -> Option<Arc<ArtworkMapping>> {
        let current = self.current.read().await;
        current
            .as_ref()
            .filter(|s| self.is_fresh(s.built_at))
            .map(|s| s.mapping.clone())
    }
}

/// Read the persisted mapping. A missing file is `Ok(None)`.
async fn load(path: &Path) -> romlookup_common::Result<Option<PersistedMapping>> {
    let bytes = match tokio::fs::read(path).await {
        Ok(bytes) => bytes,
        Err(e) if e.kind() == std::io::ErrorKind::NotFound => return Ok(None),
        Err(e) => return Err(e.into()),
    };
    serde_json::from_slice(&bytes)
        .map(Some)
        .map_err(|e| Error::cache_corrupt(e.to_string()))
}

/// Write through a temporary file so readers never see a partial mapping.
async fn store(
    path: &Path,
    built_at: DateTime<Utc>,
    mapping: &ArtworkMapping,
) -> anyhow::Result<()> {
    if let Some(parent) = path.parent() {
        tokio::fs::create_dir_all(parent).await?;
    }
    let json = serde_json::to_vec(&PersistedMappingRef { built_at, mapping })?;

    let mut tmp = path.as_os_str().to_owned();
    tmp.push(".tmp");
    let tmp = PathBuf::from(tmp);

    tokio::fs::write(&tmp, json).await?;
    tokio::fs::rename(&tmp, path).await?;
    Ok(())
}
