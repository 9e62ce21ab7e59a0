//! Remod - remote modules, cached locally
//!
//! Resolves http(s) import specifiers for bundler pipelines and serves
//! them from a local cache governed by the HTTP freshness headers each
//! module was downloaded with.

pub mod cache;
pub mod cli;
pub mod config;
pub mod error;
pub mod fetch;
pub mod loader;
pub mod plugin;
pub mod resolve;

pub use error::{RemodError, RemodResult};
