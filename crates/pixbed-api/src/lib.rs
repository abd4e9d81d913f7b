//! Pixbed API Library
//!
//! HTTP surface of the image-hosting core: handlers, principal extraction,
//! application state, and setup.

pub mod api_doc;
pub mod auth;
pub mod error;
pub mod handlers;
pub mod setup;
pub mod state;

pub use error::ErrorResponse;
pub use state::AppState;
