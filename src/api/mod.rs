//! API Layer
//!
//! HTTP API endpoints and request handling for the user directory.

pub mod handlers;
pub mod routes;

// Re-export commonly used types
pub use handlers::{AppState, SuccessResponse};
pub use routes::{
    create_core_routes, create_minimal_routes, create_readonly_routes, create_routes, RouterBuilder,
};
