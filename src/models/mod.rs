//! Data Models Module
//!
//! This module contains all data structures used throughout the user directory.
//! It includes user entities, their relations, and request/response types.

pub mod requests;
pub mod user;

// Re-export commonly used types
pub use requests::*;
pub use user::*;
