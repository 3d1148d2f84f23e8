//! Origin service module
//!
//! The origin is the remote image-by-code service consulted on a cache miss.
//! It is a black box: given a code it returns bytes or fails.

mod client;

pub use client::HttpOrigin;

use async_trait::async_trait;
use hyper::body::Bytes;
use thiserror::Error;

use crate::cache::ResourceCode;

#[derive(Debug, Error)]
pub enum OriginError {
    #[error("invalid origin url '{url}': {reason}")]
    InvalidUrl { url: String, reason: String },
    #[error("origin client setup failed: {0}")]
    Client(String),
    #[error("origin request to {url} failed: {source}")]
    Request {
        url: String,
        #[source]
        source: reqwest::Error,
    },
    #[error("origin returned HTTP {status} for {url}")]
    Status { status: u16, url: String },
}

/// Source of images that are not cached yet
#[async_trait]
pub trait Origin: Send + Sync {
    /// Fetch the full body for `code`; any non-success outcome is an error
    async fn fetch(&self, code: ResourceCode) -> Result<Bytes, OriginError>;
}
