//! User Directory Development Server
//!
//! This is a development server for the user directory library. It provides
//! a complete HTTP server with all API endpoints enabled for local
//! development and testing purposes.
//!
//! For production deployments with custom router configurations, use the
//! RouterBuilder in your own application.

use std::sync::Arc;

use dotenv::dotenv;
use tower::ServiceBuilder;
use tower_http::cors::{Any, CorsLayer};
use tower_http::trace::TraceLayer;

use user_directory::{
    api::{AppState, RouterBuilder},
    config::AppConfig,
    database,
    service::UserDirectory,
    store::PgUserStore,
};

#[tokio::main]
async fn main() -> Result<(), Box<dyn std::error::Error>> {
    // Load environment variables from .env file if present
    dotenv().ok();

    // Initialize structured logging for development
    env_logger::init();

    log::info!(
        "🚀 Starting User Directory v{}",
        user_directory::VERSION
    );

    // Load configuration from environment
    let config = AppConfig::from_env()?;
    config.validate()?;

    log::info!("✅ Configuration loaded and validated");

    // Database connection
    let database_pool = config.database.create_pool().await?;

    // Run database migrations
    log::info!("🔄 Running database migrations...");
    database::run_migrations(&database_pool).await?;

    log::info!("✅ Database migrations completed");

    // Initialize the directory service on the PostgreSQL backend
    let store = Arc::new(PgUserStore::new(database_pool));
    let directory = Arc::new(UserDirectory::new(store));

    log::info!("✅ User directory service initialized");

    // Create application state
    let app_state = AppState { directory };

    // Build the application with all routes enabled
    let app = RouterBuilder::with_all_routes()
        .build()
        .with_state(app_state)
        .layer(
            ServiceBuilder::new()
                .layer(TraceLayer::new_for_http())
                .layer(
                    CorsLayer::new()
                        .allow_origin(Any) // Permissive CORS for development
                        .allow_methods(Any)
                        .allow_headers(Any),
                )
                .into_inner(),
        );

    // Server configuration
    let bind_addr = format!("{}:{}", config.server.host, config.server.port);
    log::info!("🌐 Starting server on {}", bind_addr);

    log::info!("📋 API Endpoints:");
    log::info!("   GET    /health - Health check");
    log::info!("   POST   /users - Create user");
    log::info!("   GET    /users - List users (role, sort_by, limit, page)");
    log::info!("   GET    /users/{{id}} - Get user by id");
    log::info!("   GET    /users/by-email/{{email}} - Get user by email");
    log::info!("   PUT    /users/{{id}} - Update user profile");
    log::info!("   DELETE /users/{{id}} - Delete user");
    log::info!("   POST   /users/assign-clients - Assign clients to a coach");

    // Start the server
    let listener = tokio::net::TcpListener::bind(&bind_addr).await?;
    log::info!("✅ Server listening and ready for requests");
    axum::serve(listener, app).await?;

    Ok(())
}
