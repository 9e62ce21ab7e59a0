//! Cache-first loading of remote modules
//!
//! `RemoteLoader` ties the pieces together: derive the cache key, serve
//! a fresh entry if one exists, otherwise download and persist. Loads
//! of the same URL are serialized behind a per-key lock so concurrent
//! imports of one module cost a single download.

use crate::cache::{is_stale, CacheKey, CacheStore, EntryMetadata, FreshnessOptions};
use crate::error::RemodResult;
use crate::fetch::RemoteFetcher;
use std::collections::HashMap;
use std::sync::{Arc, Weak};
use tokio::sync::{Mutex, OwnedMutexGuard};
use tracing::{debug, info, warn};
use url::Url;

pub struct RemoteLoader {
    store: CacheStore,
    fetcher: RemoteFetcher,
    freshness: FreshnessOptions,
    reload: bool,
    // Slots hold weak references; released locks are swept on the next
    // lookup so the map stays bounded by in-flight loads.
    locks: Mutex<HashMap<String, Weak<Mutex<()>>>>,
}

impl RemoteLoader {
    pub fn new(store: CacheStore, fetcher: RemoteFetcher) -> Self {
        Self {
            store,
            fetcher,
            freshness: FreshnessOptions::default(),
            reload: false,
            locks: Mutex::new(HashMap::new()),
        }
    }

    /// Bypass the cache and refetch every module once.
    pub fn with_reload(mut self, reload: bool) -> Self {
        self.reload = reload;
        self
    }

    pub fn with_freshness(mut self, freshness: FreshnessOptions) -> Self {
        self.freshness = freshness;
        self
    }

    pub fn store(&self) -> &CacheStore {
        &self.store
    }

    /// Module contents for `url`, from cache when fresh, downloading
    /// otherwise. The cache entry is keyed and recorded under the
    /// requested URL even when the download ends elsewhere after
    /// redirects.
    pub async fn load(&self, url: &Url) -> RemodResult<String> {
        let key = CacheKey::derive(url);
        let _guard = self.key_lock(&key).await;

        let cache_path = self.store.content_path(&key);

        if self.reload {
            debug!("Reload requested; bypassing cache for {}", url);
            self.store.evict(&key).await?;
        } else if let Some((contents, metadata)) = self.store.read(&key).await? {
            if is_stale(&metadata.headers, &self.freshness) {
                debug!("Stale cache entry {}", cache_path.display());
                self.store.evict(&key).await?;
            } else {
                info!("Cache hit {}", cache_path.display());
                return Ok(contents);
            }
        }

        info!("Cache miss {}", url);
        let fetched = self.fetcher.fetch(url).await?;
        if fetched.url != *url {
            debug!("Terminal URL for {} is {}", url, fetched.url);
        }

        let metadata = EntryMetadata {
            headers: fetched.headers,
            url: url.to_string(),
        };
        if let Err(e) = self.store.write(&key, &fetched.contents, &metadata).await {
            // A cache that cannot be written still serves this load.
            warn!("Failed to persist {}: {}", url, e);
        }

        Ok(fetched.contents)
    }

    async fn key_lock(&self, key: &CacheKey) -> OwnedMutexGuard<()> {
        let lock = {
            let mut locks = self.locks.lock().await;
            locks.retain(|_, slot| slot.strong_count() > 0);
            let slot = locks.entry(key.to_string()).or_default();
            match slot.upgrade() {
                Some(lock) => lock,
                None => {
                    let lock = Arc::new(Mutex::new(()));
                    *slot = Arc::downgrade(&lock);
                    lock
                }
            }
        };
        lock.lock_owned().await
    }
}
