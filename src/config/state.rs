// Application state module
// Shared, read-only state handed to every connection

use std::sync::Arc;

use super::types::Config;
use crate::cache::{CacheStore, Resolver};
use crate::origin::Origin;

/// Application state
pub struct AppState {
    pub config: Config,
    pub resolver: Resolver,
}

impl AppState {
    /// Build the resolver over `config.cache.dir` with the given origin
    pub fn new(config: Config, origin: Arc<dyn Origin>) -> Self {
        let store = CacheStore::new(&config.cache.dir);
        Self {
            resolver: Resolver::new(store, origin),
            config,
        }
    }
}
