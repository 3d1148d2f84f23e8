//! Image cache module
//!
//! Maps resource codes to `<code>.jpg` files in the cache directory and
//! resolves requests against it, falling back to the origin on a miss.

mod code;
mod resolver;
mod store;

pub use code::ResourceCode;
pub use resolver::{ResolveError, Resolver, Source};
pub use store::{CacheStore, StoreError};

#[cfg(test)]
pub(crate) use resolver::tests::StubOrigin;
