//! User Directory Library
//!
//! A user directory service providing secure CRUD operations, role-aware
//! queries and coach/client relationship management. Designed for
//! microservices architecture with a focus on security, performance, and
//! maintainability.
//!
//! # Features
//!
//! - **Secure User Management**: Complete CRUD operations with input validation
//! - **Password Security**: bcrypt hashing with configurable cost factors
//! - **Organization Relations**: Department, company and coach/client links
//!   eager-loaded onto every returned record
//! - **Role-Aware Queries**: Case-insensitive role filtering with sorting and
//!   pagination
//! - **HTTP API**: RESTful endpoints with comprehensive error handling
//! - **Flexible Router**: Configurable endpoints via RouterBuilder pattern
//! - **Swappable Storage**: PostgreSQL with connection pooling in production,
//!   an in-memory backend for tests
//!
//! # Quick Start
//!
//! ## As a Service Library
//!
//! ```rust,no_run
//! use std::sync::Arc;
//!
//! use sqlx::PgPool;
//! use user_directory::{CreateUserRequest, PgUserStore, Role, UserDirectory};
//!
//! #[tokio::main]
//! async fn main() -> Result<(), Box<dyn std::error::Error>> {
//!     let pool = PgPool::connect("postgres://localhost/db").await?;
//!     let directory = UserDirectory::new(Arc::new(PgUserStore::new(pool)));
//!
//!     let request = CreateUserRequest {
//!         email: "alice@example.com".to_string(),
//!         username: "alice_smith".to_string(),
//!         password: "SecurePass123!".to_string(),
//!         role: Role::Client,
//!         coach_id: None,
//!         department_id: None,
//!         bio: None,
//!         avatar_url: None,
//!     };
//!
//!     let record = directory.create_user(request).await?;
//!     println!("Created user: {} ({})", record.user.username, record.user.email);
//!
//!     Ok(())
//! }
//! ```
//!
//! ## As a Web Server Library
//!
//! ```rust,no_run
//! use std::sync::Arc;
//!
//! use user_directory::{
//!     api::{AppState, RouterBuilder},
//!     database::DatabaseConfig,
//!     service::UserDirectory,
//!     store::PgUserStore,
//! };
//!
//! #[tokio::main]
//! async fn main() -> Result<(), Box<dyn std::error::Error>> {
//!     // Setup database and services
//!     let config = DatabaseConfig::from_env()?;
//!     let pool = config.create_pool().await?;
//!     let directory = UserDirectory::new(Arc::new(PgUserStore::new(pool)));
//!
//!     // Create application state
//!     let app_state = AppState {
//!         directory: Arc::new(directory),
//!     };
//!
//!     // Build custom router - only enable needed endpoints
//!     let app = RouterBuilder::with_core_routes()
//!         .build()
//!         .with_state(app_state);
//!
//!     // Start server
//!     let listener = tokio::net::TcpListener::bind("0.0.0.0:3000").await?;
//!     axum::serve(listener, app).await?;
//!
//!     Ok(())
//! }
//! ```
//!
//! # Router Builder Examples
//!
//! Create different service configurations:
//!
//! ```rust,no_run
//! use user_directory::api::RouterBuilder;
//!
//! // Full service with all endpoints
//! let full_router = RouterBuilder::with_all_routes().build();
//!
//! // Reporting service (read-only)
//! let reporting_router = RouterBuilder::with_readonly_routes().build();
//!
//! // Registration service
//! let registration_router = RouterBuilder::new()
//!     .health_check(true)
//!     .create_user(true)
//!     .build();
//! ```
//!
//! # Architecture
//!
//! The library is organized into several layers:
//!
//! - **API Layer**: HTTP handlers and configurable route definitions
//! - **Service Layer**: Business logic, uniqueness checks and validation
//! - **Store Layer**: The `UserStore` trait with PostgreSQL and in-memory
//!   backends
//! - **Models**: Data structures and type definitions
//! - **Database**: Connection management and migrations
//! - **Utils**: Shared utilities for security, validation, and error handling
//!
//! # Security
//!
//! - bcrypt password hashing with configurable cost
//! - SQL injection prevention through prepared statements
//! - Input validation and sanitization
//! - Password hashes excluded from every serialized response
//! - Configurable endpoint exposure for attack surface reduction

/// HTTP API layer with handlers and configurable routing
pub mod api;

/// Configuration management for all service settings
pub mod config;

/// Database connection management and configuration
pub mod database;

/// Data models and request/response structures
pub mod models;

/// Business logic for the user directory
pub mod service;

/// Storage backends behind the `UserStore` trait
pub mod store;

/// Shared utilities for security, validation, and error handling
pub mod utils;

// Re-export commonly used types for convenient access
pub use api::{create_routes, AppState, RouterBuilder};
pub use models::{
    requests::{
        AssignClientsRequest, ClientAssignment, ClientIds, CreateUserRequest, ListUsersParams,
        QueryOptions, UpdateUserRequest, UserQueryFilter,
    },
    user::{
        BulkUpdate, Company, Department, ProfileWithUser, Role, User, UserId, UserProfile,
        UserRecord,
    },
};
pub use service::{UserDirectory, UserDirectoryError, UserDirectoryResult};
pub use store::{MemoryStore, PgUserStore, UserStore};
pub use utils::error::{AppError, AppResult, ErrorResponse};

// Re-export database utilities for configuration
pub use database::{DatabaseConfig, DatabasePool};

// Re-export configuration system
pub use config::{env, AppConfig, ServerConfig};

/// Library version from Cargo.toml
pub const VERSION: &str = env!("CARGO_PKG_VERSION");
