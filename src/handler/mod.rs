//! Request handler module
//!
//! Routes each request to the cache resolver by method and resource code.

pub mod router;

// Re-export main entry point
pub use router::handle_request;
