//! Import specifier classification
//!
//! Sorts the specifiers a bundler hands us into remote modules we own
//! and local paths we leave alone. Anything imported *by* a remote
//! module is itself remote, resolved against the importer's URL.

use crate::error::{RemodError, RemodResult};
use url::Url;

/// Namespace tag marking modules that resolve through the remote
/// loader in a bundler pipeline.
pub const NAMESPACE: &str = "remote-import";

/// What an import specifier turned out to be.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Specifier {
    /// A module to download and cache
    Remote(Url),
    /// Anything else, passed through untouched
    Local(String),
}

/// Whether the specifier spells out a remote module on its own.
pub fn is_remote_specifier(specifier: &str) -> bool {
    specifier.starts_with("http://") || specifier.starts_with("https://")
}

/// Classify a specifier, resolving it against `importer` when the
/// import comes from inside a remote module. Relative paths, absolute
/// paths, and full URLs all join the way a browser would.
pub fn classify(specifier: &str, importer: Option<&Url>) -> RemodResult<Specifier> {
    if let Some(base) = importer {
        let url = base
            .join(specifier)
            .map_err(|e| RemodError::invalid_url(specifier, e))?;
        return Ok(Specifier::Remote(url));
    }

    if is_remote_specifier(specifier) {
        return Ok(Specifier::Remote(parse_remote(specifier)?));
    }

    Ok(Specifier::Local(specifier.to_string()))
}

/// Parse a specifier that must name a remote module.
pub fn parse_remote(specifier: &str) -> RemodResult<Url> {
    if !is_remote_specifier(specifier) {
        return Err(RemodError::NotRemote(specifier.to_string()));
    }
    Url::parse(specifier).map_err(|e| RemodError::invalid_url(specifier, e))
}
