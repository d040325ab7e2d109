//! HTTP protocol layer module
//!
//! Provides HTTP protocol-related base functionality, decoupled from the
//! filesystem logic in [`crate::handler`].

pub mod cache;
pub mod mime;
pub mod response;

// Re-export commonly used types
pub use response::{
    apply_cors_headers, build_304_response, build_403_response, build_404_response,
    build_405_response, build_500_response, build_file_response, build_html_response,
    build_options_response, build_redirect_response, ResponseBody, CORS_HEADERS,
};
