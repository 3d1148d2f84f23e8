//! HTTP protocol layer module
//!
//! Response construction, kept apart from cache logic.

pub mod response;

// Re-export commonly used builders
pub use response::{
    build_201_response, build_400_response, build_404_response, build_405_response,
    build_413_response, build_500_response, build_deleted_response, build_image_response,
    set_server_header,
};
