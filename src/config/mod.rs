//! Configuration management

pub mod schema;

pub use schema::Config;

use crate::error::{RemodError, RemodResult};
use std::path::{Path, PathBuf};
use tokio::fs;
use tracing::{debug, info};

/// Environment variable naming the cache root directly.
pub const CACHE_DIR_ENV: &str = "REMOD_DIR";

const CACHE_DOT_DIR: &str = ".remod";

/// Configuration manager
pub struct ConfigManager {
    config_path: PathBuf,
}

impl ConfigManager {
    /// Create a new config manager with default path
    pub fn new() -> Self {
        Self {
            config_path: Self::default_config_path(),
        }
    }

    /// Create a config manager with a custom path
    pub fn with_path(path: PathBuf) -> Self {
        Self { config_path: path }
    }

    /// Get the default config file path
    pub fn default_config_path() -> PathBuf {
        dirs::config_dir()
            .unwrap_or_else(|| PathBuf::from("."))
            .join("remod")
            .join("config.toml")
    }

    /// Load configuration, falling back to defaults when the file
    /// does not exist
    pub async fn load(&self) -> RemodResult<Config> {
        if !self.config_path.exists() {
            debug!("Config file not found, using defaults");
            return Ok(Config::default());
        }

        self.load_from_file(&self.config_path).await
    }

    /// Load configuration from a specific file
    pub async fn load_from_file(&self, path: &Path) -> RemodResult<Config> {
        let content = fs::read_to_string(path)
            .await
            .map_err(|e| RemodError::io(format!("reading config from {}", path.display()), e))?;

        toml::from_str(&content).map_err(|e| RemodError::ConfigInvalid {
            path: path.to_path_buf(),
            reason: e.to_string(),
        })
    }

    /// Save configuration to file
    pub async fn save(&self, config: &Config) -> RemodResult<()> {
        self.ensure_config_dir().await?;

        let content = toml::to_string_pretty(config)?;
        fs::write(&self.config_path, content).await.map_err(|e| {
            RemodError::io(
                format!("writing config to {}", self.config_path.display()),
                e,
            )
        })?;

        info!("Configuration saved to {}", self.config_path.display());
        Ok(())
    }

    /// Ensure the config directory exists
    async fn ensure_config_dir(&self) -> RemodResult<()> {
        if let Some(parent) = self.config_path.parent() {
            fs::create_dir_all(parent)
                .await
                .map_err(|e| RemodError::ConfigDirCreate {
                    path: parent.to_path_buf(),
                    source: e,
                })?;
        }
        Ok(())
    }

    /// Get the config file path
    pub fn path(&self) -> &Path {
        &self.config_path
    }
}

impl Default for ConfigManager {
    fn default() -> Self {
        Self::new()
    }
}

/// Environment values that influence where the cache root lands.
#[derive(Debug, Clone, Default)]
pub struct RootOverrides {
    pub cache_dir: Option<PathBuf>,
    pub home: Option<PathBuf>,
    pub profile: Option<PathBuf>,
}

impl RootOverrides {
    pub fn from_env() -> Self {
        Self {
            cache_dir: env_path(CACHE_DIR_ENV),
            home: env_path("HOME"),
            profile: env_path("USERPROFILE"),
        }
    }
}

fn env_path(name: &str) -> Option<PathBuf> {
    std::env::var_os(name)
        .filter(|value| !value.is_empty())
        .map(PathBuf::from)
}

/// Where cached modules live. Precedence: the environment override,
/// the configured directory, a dot directory under the user's home
/// (or profile on Windows), and last a dot directory under the
/// working directory.
pub fn resolve_cache_root(config: &Config, overrides: &RootOverrides) -> PathBuf {
    let root = if let Some(dir) = &overrides.cache_dir {
        dir.clone()
    } else if let Some(dir) = &config.cache.dir {
        dir.clone()
    } else if let Some(home) = &overrides.home {
        home.join(CACHE_DOT_DIR)
    } else if let Some(profile) = &overrides.profile {
        profile.join(CACHE_DOT_DIR)
    } else {
        PathBuf::from(CACHE_DOT_DIR)
    };

    debug!("Cache root resolved to {}", root.display());
    root
}
