//! Shared setup for commands that drive a [`Session`].
//!
//! # Initialization Steps
//! 1. **Configuration**: Load `config.json`, command line roots win
//! 2. **Provider**: A [`LocalGitProvider`] over the configured roots
//! 3. **Storage**: A [`FileStore`] under the cache directory
//! 4. **Controller**: Cache and controller sharing the system clock
//! 5. **Repositories**: Loaded through the repository list cache

use crate::core::autocomplete::AutocompleteController;
use crate::core::cache::RepositoryIndexCache;
use crate::core::clock::{Clock, SystemClock};
use crate::core::config::Config;
use crate::core::error::{MentionError, Result};
use crate::core::git::LocalGitProvider;
use crate::core::session::Session;
use crate::core::store::FileStore;
use std::path::PathBuf;
use std::rc::Rc;

pub type LocalSession = Session<LocalGitProvider, FileStore>;

pub struct SessionInit;

impl SessionInit {
    /// Cache over the default durable store, without a provider.
    pub fn cache(config: &Config) -> Result<RepositoryIndexCache<FileStore>> {
        let store = FileStore::open_default()?;
        log::debug!("Using durable store at {}", store.dir().display());
        let clock: Rc<dyn Clock> = Rc::new(SystemClock);
        Ok(RepositoryIndexCache::new(store, config.cache.clone(), clock))
    }

    pub fn config(roots: Vec<PathBuf>) -> Result<Config> {
        let config = match Config::load_or_create() {
            Ok(config) => config,
            Err(e) => {
                log::warn!("Falling back to default configuration: {e}");
                Config::default()
            }
        };
        Ok(config.with_roots(roots))
    }

    /// Build a session with its repository list loaded.
    pub fn initialize(roots: Vec<PathBuf>) -> Result<LocalSession> {
        let config = Self::config(roots)?;
        if config.repository_roots.is_empty() {
            return Err(MentionError::NoRepositoriesConfigured);
        }

        let provider = LocalGitProvider::new(config.repository_roots.clone());
        let controller = AutocompleteController::new(Self::cache(&config)?);
        let mut session = Session::new(provider, controller);
        session.load_repositories()?;

        log::debug!(
            "Session ready with {} repositories",
            session.controller().repositories().len()
        );
        Ok(session)
    }
}
