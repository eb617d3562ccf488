//! Service Layer
//!
//! Business logic for the user directory.

pub mod user;

// Re-export services
pub use user::{UserDirectory, UserDirectoryError, UserDirectoryResult};
