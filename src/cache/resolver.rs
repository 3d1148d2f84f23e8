//! Cache-backed resource resolver
//!
//! Implements GET/PUT/DELETE against the cache directory. A GET that finds
//! no entry falls back to the origin once and stores what it got.
//!
//! No per-code locking is done: concurrent misses may each fetch and write
//! (last rename wins), and a fetch racing a DELETE can bring the entry back.

use hyper::body::Bytes;
use std::sync::Arc;
use thiserror::Error;

use super::code::ResourceCode;
use super::store::{CacheStore, StoreError};
use crate::logger;
use crate::origin::{Origin, OriginError};

/// Where a successful GET got its bytes from
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Source {
    Cache,
    Origin,
}

#[derive(Debug)]
pub struct Image {
    pub bytes: Bytes,
    pub source: Source,
}

#[derive(Debug, Error)]
pub enum ResolveError {
    #[error("no cache entry")]
    NotFound,
    #[error(transparent)]
    Origin(#[from] OriginError),
    #[error(transparent)]
    Storage(#[from] StoreError),
}

#[derive(Clone)]
pub struct Resolver {
    store: CacheStore,
    origin: Arc<dyn Origin>,
}

impl Resolver {
    pub fn new(store: CacheStore, origin: Arc<dyn Origin>) -> Self {
        Self { store, origin }
    }

    /// Serve `code` from the cache, populating it from the origin on a miss
    ///
    /// Only a missing entry triggers the origin; any other storage failure
    /// is returned as is.
    pub async fn get(&self, code: ResourceCode) -> Result<Image, ResolveError> {
        match self.store.read(code).await {
            Ok(bytes) => {
                logger::log_cache_hit(code, bytes.len());
                Ok(Image {
                    bytes,
                    source: Source::Cache,
                })
            }
            Err(e) if e.is_not_found() => self.fetch_and_store(code).await,
            Err(e) => {
                logger::log_storage_error(&e);
                Err(e.into())
            }
        }
    }

    async fn fetch_and_store(&self, code: ResourceCode) -> Result<Image, ResolveError> {
        logger::log_cache_miss(code);

        let bytes = match self.origin.fetch(code).await {
            Ok(bytes) => bytes,
            Err(e) => {
                logger::log_origin_failure(code, &e);
                return Err(e.into());
            }
        };

        if let Err(e) = self.store.write(code, bytes.clone()).await {
            logger::log_storage_error(&e);
            return Err(e.into());
        }
        logger::log_cache_populated(code, bytes.len());

        Ok(Image {
            bytes,
            source: Source::Origin,
        })
    }

    /// Create or overwrite the entry for `code`
    pub async fn put(&self, code: ResourceCode, body: Bytes) -> Result<(), ResolveError> {
        self.store.write(code, body).await.map_err(|e| {
            logger::log_storage_error(&e);
            e.into()
        })
    }

    /// Remove the entry for `code`
    pub async fn delete(&self, code: ResourceCode) -> Result<(), ResolveError> {
        match self.store.remove(code).await {
            Ok(()) => Ok(()),
            Err(e) if e.is_not_found() => Err(ResolveError::NotFound),
            Err(e) => {
                logger::log_storage_error(&e);
                Err(e.into())
            }
        }
    }
}
