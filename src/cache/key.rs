//! Cache key derivation
//!
//! Maps a remote module URL onto a stable path below the cache root:
//! `<scheme>/<host>[/_PORT<port>][/?<query>]/<sha256-of-path>`.
//! Only the path component is hashed, so query and path contribute
//! to the key independently.

use sha2::{Digest, Sha256};
use std::fmt;
use std::path::PathBuf;
use tracing::debug;
use url::Url;

/// Characters escaped in the query segment. Separators would split
/// the segment into extra path components (`/..` in a query could
/// then climb out of the cache root); `%` is escaped so the encoding
/// stays injective.
const QUERY_SEGMENT_SET: &percent_encoding::AsciiSet = &percent_encoding::CONTROLS
    .add(b'%')
    .add(b'/')
    .add(b'\\');

/// Derived storage location for a remote module.
///
/// Two URLs differing only in path share every segment but the final
/// digest; an explicit port or a query string inserts its own
/// segment. Every segment is a single path component, so the derived
/// path always stays below the cache root.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CacheKey {
    segments: Vec<String>,
}

impl CacheKey {
    /// Derive the key for a URL. Callers guarantee an http(s) scheme.
    pub fn derive(url: &Url) -> Self {
        let mut segments = Vec::with_capacity(5);

        segments.push(url.scheme().to_string());
        segments.push(url.host_str().unwrap_or_default().to_string());

        if let Some(port) = url.port() {
            debug!("Explicit port on URL found for {}", url);
            segments.push(format!("_PORT{port}"));
        }

        if let Some(query) = url.query() {
            debug!("Query parameters found: {}", query);
            let encoded = percent_encoding::utf8_percent_encode(query, QUERY_SEGMENT_SET);
            segments.push(format!("?{encoded}"));
        }

        segments.push(hash_path(url.path()));

        Self { segments }
    }

    /// Relative path below the cache `deps` directory.
    pub fn relative_path(&self) -> PathBuf {
        self.segments.iter().collect()
    }

    /// Segments in derivation order.
    pub fn segments(&self) -> &[String] {
        &self.segments
    }
}

impl fmt::Display for CacheKey {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.segments.join("/"))
    }
}

/// Lowercase hex SHA-256 of the URL path component only.
fn hash_path(path: &str) -> String {
    let mut hasher = Sha256::new();
    hasher.update(path.as_bytes());
    hex::encode(hasher.finalize())
}
