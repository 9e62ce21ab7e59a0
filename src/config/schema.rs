//! Configuration schema
//!
//! Configuration is stored at `~/.config/remod/config.toml`

use crate::cache::FreshnessOptions;
use crate::fetch::FetchOptions;
use serde::{Deserialize, Serialize};
use std::path::PathBuf;

/// Root configuration structure
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct Config {
    /// Cache location settings
    pub cache: CacheConfig,

    /// Network limits for downloads
    pub fetch: FetchOptions,

    /// Staleness evaluation defaults
    pub freshness: FreshnessOptions,
}

/// Cache location settings
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct CacheConfig {
    /// Cache root directory; falls back to `~/.remod` when unset
    pub dir: Option<PathBuf>,
}
