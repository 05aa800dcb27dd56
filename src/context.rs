//! Process-wide state shared by the commands: configuration and cache.

use std::path::{Path, PathBuf};

use crate::cache::Cache;
use crate::config::{self, Config};
use crate::error::Result;

/// Built once in `main` and passed down by reference.
#[derive(Debug)]
pub struct AppContext {
    pub config: Config,
    pub cache: Cache,
    app_dir: Option<PathBuf>,
}

impl AppContext {
    pub fn new(config: Config, cache: Cache, app_dir: Option<PathBuf>) -> Self {
        Self {
            config,
            cache,
            app_dir,
        }
    }

    /// Load the config file and open (not yet read) the cache file in the app directory.
    pub fn load() -> Result<Self> {
        let app_dir = config::app_dir()?;
        let config = Config::load(&config::config_path()?)?;
        let cache = Cache::open(config::cache_path()?);
        Ok(Self::new(config, cache, Some(app_dir)))
    }

    pub fn app_dir(&self) -> Option<&Path> {
        self.app_dir.as_deref()
    }

    /// Config string under the active issue provider (`@issue_provider.<key>`).
    pub fn provider_setting(&self, key: &str) -> Option<&str> {
        self.config.get_str(&["@issue_provider", key])
    }

    /// Persist the cache. Safe to call more than once.
    pub fn save(&self) -> Result<()> {
        self.cache.save()
    }
}
