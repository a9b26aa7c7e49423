//! Time-bounded on-disk schema cache.
//!
//! Each entry is the schema blob plus a JSON sidecar recording when and
//! where it was fetched. Writes go through a temp file renamed into
//! place, so readers never observe a partial entry and concurrent misses
//! for the same name cannot corrupt it.

use std::fs;
use std::path::{Path, PathBuf};
use std::process;
use std::sync::atomic::{AtomicU64, Ordering};

use chrono::{DateTime, Duration, Utc};
use serde::{Deserialize, Serialize};
use sha2::{Digest, Sha256};
use tracing::{debug, warn};

use super::fetch::SchemaFetcher;
use crate::error::FelError;

/// Sidecar record stored next to each cached blob.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Sidecar {
    pub cached_at: DateTime<Utc>,
    pub source_url: String,
    pub size: u64,
    pub content_hash: String,
}

/// How a load was satisfied.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum CacheOutcome {
    /// Entry was present and fresh.
    Hit,
    /// Entry was missing or stale and a fetch refreshed it.
    Refreshed,
    /// Entry was stale, the refresh failed, the stale copy was used.
    StaleFallback,
}

#[derive(Debug)]
pub struct SchemaCache {
    dir: PathBuf,
    refresh: Duration,
}

static TMP_COUNTER: AtomicU64 = AtomicU64::new(0);

impl SchemaCache {
    pub fn new(dir: impl Into<PathBuf>, refresh_hours: u32) -> Self {
        Self {
            dir: dir.into(),
            refresh: Duration::hours(i64::from(refresh_hours)),
        }
    }

    /// Load `name`, fetching through `fetcher` on a miss or stale entry.
    ///
    /// A stale entry whose refresh fails is still served
    /// ([`CacheOutcome::StaleFallback`]); a missing entry whose fetch
    /// fails is fatal to the call.
    pub fn load(
        &self,
        name: &str,
        fetcher: &dyn SchemaFetcher,
    ) -> Result<(String, CacheOutcome), FelError> {
        let cached = self.read_entry(name);

        if let Some((content, sidecar)) = &cached {
            if Utc::now() - sidecar.cached_at < self.refresh {
                debug!(schema = name, "caché de esquemas: entrada fresca");
                return Ok((content.clone(), CacheOutcome::Hit));
            }
        }

        match fetcher.fetch(name) {
            Ok((content, source_url)) => {
                self.write_entry(name, &content, &source_url)?;
                debug!(schema = name, source = %source_url, "caché de esquemas: refrescado");
                Ok((content, CacheOutcome::Refreshed))
            }
            Err(fetch_err) => match cached {
                Some((content, sidecar)) => {
                    warn!(
                        schema = name,
                        cached_at = %sidecar.cached_at,
                        error = %fetch_err,
                        "caché de esquemas: usando copia vencida"
                    );
                    Ok((content, CacheOutcome::StaleFallback))
                }
                None => Err(FelError::SchemaLoad {
                    name: name.to_string(),
                    reason: fetch_err.to_string(),
                }),
            },
        }
    }

    fn blob_path(&self, name: &str) -> PathBuf {
        self.dir.join(name)
    }

    fn sidecar_path(&self, name: &str) -> PathBuf {
        self.dir.join(format!("{name}.meta.json"))
    }

    fn read_entry(&self, name: &str) -> Option<(String, Sidecar)> {
        let content = fs::read_to_string(self.blob_path(name)).ok()?;
        let sidecar_raw = fs::read_to_string(self.sidecar_path(name)).ok()?;
        let sidecar: Sidecar = serde_json::from_str(&sidecar_raw).ok()?;
        Some((content, sidecar))
    }

    fn write_entry(&self, name: &str, content: &str, source_url: &str) -> Result<(), FelError> {
        fs::create_dir_all(&self.dir)?;

        let sidecar = Sidecar {
            cached_at: Utc::now(),
            source_url: source_url.to_string(),
            size: content.len() as u64,
            content_hash: content_hash(content),
        };
        let sidecar_json = serde_json::to_string_pretty(&sidecar)
            .map_err(|e| FelError::Cache(e.to_string()))?;

        write_atomic(&self.dir, &self.blob_path(name), content.as_bytes())?;
        write_atomic(&self.dir, &self.sidecar_path(name), sidecar_json.as_bytes())?;
        Ok(())
    }

    /// Sidecar for a cached entry, if present.
    pub fn sidecar(&self, name: &str) -> Option<Sidecar> {
        let raw = fs::read_to_string(self.sidecar_path(name)).ok()?;
        serde_json::from_str(&raw).ok()
    }
}

/// Write via a unique temp file in the same directory, then rename.
/// Rename is atomic within a filesystem; the last concurrent writer wins.
fn write_atomic(dir: &Path, target: &Path, bytes: &[u8]) -> Result<(), FelError> {
    let unique = TMP_COUNTER.fetch_add(1, Ordering::Relaxed);
    let tmp = dir.join(format!(
        ".tmp-{}-{}-{}",
        process::id(),
        unique,
        target
            .file_name()
            .and_then(|n| n.to_str())
            .unwrap_or("entry")
    ));
    fs::write(&tmp, bytes)?;
    fs::rename(&tmp, target)?;
    Ok(())
}

fn content_hash(content: &str) -> String {
    let mut hasher = Sha256::new();
    hasher.update(content.as_bytes());
    format!("{:x}", hasher.finalize())
}
