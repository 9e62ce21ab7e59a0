//! Filesystem persistence for downloaded modules
//!
//! Module bodies live under `<root>/deps/` at the path their
//! [`CacheKey`] derives, with a `.metadata.json` sidecar holding the
//! response headers and the originally requested URL. A missing or
//! unreadable half of the pair counts as a cache miss, never an error.

use crate::cache::key::CacheKey;
use crate::cache::metadata::EntryMetadata;
use crate::error::{RemodError, RemodResult};
use std::io;
use std::path::{Path, PathBuf};
use tokio::fs;
use tracing::{debug, warn};

const DEPS_DIR: &str = "deps";
const METADATA_SUFFIX: &str = ".metadata.json";

/// One cached module as reported by [`CacheStore::list`].
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CacheEntrySummary {
    /// URL the module was requested as
    pub url: String,
    /// Path of the cached body on disk
    pub content_path: PathBuf,
    /// Size of the cached body in bytes
    pub size_bytes: u64,
}

/// On-disk store for downloaded modules and their response metadata.
#[derive(Debug, Clone)]
pub struct CacheStore {
    root: PathBuf,
}

impl CacheStore {
    pub fn new(root: impl Into<PathBuf>) -> Self {
        Self { root: root.into() }
    }

    pub fn root(&self) -> &Path {
        &self.root
    }

    fn deps_dir(&self) -> PathBuf {
        self.root.join(DEPS_DIR)
    }

    /// Where the module body for `key` lives (whether or not it exists).
    pub fn content_path(&self, key: &CacheKey) -> PathBuf {
        self.deps_dir().join(key.relative_path())
    }

    fn metadata_path(content_path: &Path) -> PathBuf {
        let mut path = content_path.to_path_buf().into_os_string();
        path.push(METADATA_SUFFIX);
        PathBuf::from(path)
    }

    /// Look up a cached module. `Ok(None)` covers every shape of miss:
    /// absent files, an orphaned body without its sidecar, or a sidecar
    /// that no longer parses.
    pub async fn read(&self, key: &CacheKey) -> RemodResult<Option<(String, EntryMetadata)>> {
        let content_path = self.content_path(key);

        let contents = match fs::read_to_string(&content_path).await {
            Ok(contents) => contents,
            Err(e) if miss_kind(e.kind()) => {
                debug!("No cached content at {}", content_path.display());
                return Ok(None);
            }
            Err(e) => return Err(RemodError::io("reading cached module", e)),
        };

        let metadata_path = Self::metadata_path(&content_path);
        let raw = match fs::read_to_string(&metadata_path).await {
            Ok(raw) => raw,
            Err(e) if miss_kind(e.kind()) => {
                debug!("No cache metadata at {}", metadata_path.display());
                return Ok(None);
            }
            Err(e) => return Err(RemodError::io("reading cache metadata", e)),
        };

        match serde_json::from_str(&raw) {
            Ok(metadata) => Ok(Some((contents, metadata))),
            Err(e) => {
                warn!("Ignoring corrupt cache metadata {}: {}", metadata_path.display(), e);
                Ok(None)
            }
        }
    }

    /// Persist a module body and its metadata sidecar.
    pub async fn write(
        &self,
        key: &CacheKey,
        contents: &str,
        metadata: &EntryMetadata,
    ) -> RemodResult<()> {
        let content_path = self.content_path(key);

        if let Some(parent) = content_path.parent() {
            fs::create_dir_all(parent)
                .await
                .map_err(|e| RemodError::io("creating cache directory", e))?;
        }

        fs::write(&content_path, contents)
            .await
            .map_err(|e| RemodError::io("writing cached module", e))?;

        let metadata_path = Self::metadata_path(&content_path);
        let raw = serde_json::to_string_pretty(metadata)?;
        fs::write(&metadata_path, raw)
            .await
            .map_err(|e| RemodError::io("writing cache metadata", e))?;

        debug!("Written out cache file {}", content_path.display());
        Ok(())
    }

    /// Remove a cached module. Returns whether a body was present.
    pub async fn evict(&self, key: &CacheKey) -> RemodResult<bool> {
        let content_path = self.content_path(key);

        let removed = match fs::remove_file(&content_path).await {
            Ok(()) => true,
            Err(e) if e.kind() == io::ErrorKind::NotFound => false,
            Err(e) => return Err(RemodError::io("removing cached module", e)),
        };

        match fs::remove_file(Self::metadata_path(&content_path)).await {
            Ok(()) => {}
            Err(e) if e.kind() == io::ErrorKind::NotFound => {}
            Err(e) => return Err(RemodError::io("removing cache metadata", e)),
        }

        if removed {
            debug!("Evicted {}", content_path.display());
        }
        Ok(removed)
    }

    /// Every cached module under the store, sorted by URL. Entries with
    /// unreadable sidecars are skipped with a warning rather than
    /// failing the whole listing.
    pub async fn list(&self) -> RemodResult<Vec<CacheEntrySummary>> {
        let mut entries = Vec::new();
        let mut pending = vec![self.deps_dir()];

        while let Some(dir) = pending.pop() {
            let mut reader = match fs::read_dir(&dir).await {
                Ok(reader) => reader,
                Err(e) if e.kind() == io::ErrorKind::NotFound => continue,
                Err(e) => return Err(RemodError::io("listing cache directory", e)),
            };

            while let Some(entry) = reader
                .next_entry()
                .await
                .map_err(|e| RemodError::io("listing cache directory", e))?
            {
                let file_type = entry
                    .file_type()
                    .await
                    .map_err(|e| RemodError::io("listing cache directory", e))?;
                let path = entry.path();
                if file_type.is_dir() {
                    pending.push(path);
                } else if let Some(summary) = Self::read_summary(&path).await {
                    entries.push(summary);
                }
            }
        }

        entries.sort_by(|a, b| a.url.cmp(&b.url));
        Ok(entries)
    }

    async fn read_summary(metadata_path: &Path) -> Option<CacheEntrySummary> {
        let name = metadata_path.file_name()?.to_str()?;
        let stem = name.strip_suffix(METADATA_SUFFIX)?;
        let content_path = metadata_path.with_file_name(stem);

        let raw = match fs::read_to_string(metadata_path).await {
            Ok(raw) => raw,
            Err(e) => {
                warn!("Skipping unreadable cache metadata {}: {}", metadata_path.display(), e);
                return None;
            }
        };
        let metadata: EntryMetadata = match serde_json::from_str(&raw) {
            Ok(metadata) => metadata,
            Err(e) => {
                warn!("Skipping corrupt cache metadata {}: {}", metadata_path.display(), e);
                return None;
            }
        };

        let size_bytes = match fs::metadata(&content_path).await {
            Ok(stat) => stat.len(),
            Err(_) => {
                warn!("Skipping orphaned cache metadata {}", metadata_path.display());
                return None;
            }
        };

        Some(CacheEntrySummary {
            url: metadata.url,
            content_path,
            size_bytes,
        })
    }

    /// Drop every cached module.
    pub async fn clear(&self) -> RemodResult<()> {
        match fs::remove_dir_all(self.deps_dir()).await {
            Ok(()) => Ok(()),
            Err(e) if e.kind() == io::ErrorKind::NotFound => Ok(()),
            Err(e) => Err(RemodError::io("clearing cache", e)),
        }
    }
}

fn miss_kind(kind: io::ErrorKind) -> bool {
    matches!(kind, io::ErrorKind::NotFound | io::ErrorKind::InvalidData)
}
