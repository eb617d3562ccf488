//! API Route Definitions
//!
//! This module defines all HTTP routes and their corresponding handlers using a flexible
//! builder pattern. The RouterBuilder allows selective enabling/disabling of API endpoints
//! for different deployment scenarios, such as microservices or feature-specific services.

use axum::{
    routing::{delete, get, post, put},
    Router,
};

use super::handlers::*;

/// Builder for creating API routes with configurable endpoints
///
/// The RouterBuilder provides a fluent interface for constructing routers with
/// only the endpoints you need. This is useful for:
/// - Microservice architectures where different services handle different endpoints
/// - Feature flagging and gradual rollouts
/// - Security hardening by disabling unused endpoints
/// - Environment-specific configurations
#[derive(Default)]
pub struct RouterBuilder {
    /// Whether to enable the health check endpoint (GET /health)
    health_check: bool,
    /// Whether to enable user creation endpoint (POST /users)
    create_user: bool,
    /// Whether to enable the user listing endpoint (GET /users)
    list_users: bool,
    /// Whether to enable user retrieval endpoint (GET /users/{id})
    get_user: bool,
    /// Whether to enable email lookup endpoint (GET /users/by-email/{email})
    get_user_by_email: bool,
    /// Whether to enable user update endpoint (PUT /users/{id})
    update_user: bool,
    /// Whether to enable user deletion endpoint (DELETE /users/{id})
    delete_user: bool,
    /// Whether to enable the client assignment endpoint (POST /users/assign-clients)
    assign_clients: bool,
}

impl RouterBuilder {
    /// Creates a new router builder with all routes disabled by default
    ///
    /// Use this when you want to explicitly enable only specific routes.
    /// For common configurations, consider using the preset methods like
    /// `with_all_routes()` or `with_core_routes()`.
    pub fn new() -> Self {
        Self::default()
    }

    /// Creates a router builder with all routes enabled
    ///
    /// This provides the full user directory: CRUD operations, email lookup
    /// and coach/client assignment.
    pub fn with_all_routes() -> Self {
        Self {
            health_check: true,
            create_user: true,
            list_users: true,
            get_user: true,
            get_user_by_email: true,
            update_user: true,
            delete_user: true,
            assign_clients: true,
        }
    }

    /// Creates a router builder with core user management routes
    ///
    /// Includes basic CRUD operations for users but excludes deletion, email
    /// lookup and coaching-specific endpoints. Suitable for basic user
    /// management services.
    pub fn with_core_routes() -> Self {
        Self {
            health_check: true,
            create_user: true,
            list_users: true,
            get_user: true,
            get_user_by_email: false,
            update_user: true,
            delete_user: false,
            assign_clients: false,
        }
    }

    /// Creates a router builder with read-only routes
    ///
    /// Includes health check, user listing and both lookup endpoints.
    /// Excludes everything that writes. Good for reporting services or
    /// read-only user directories.
    pub fn with_readonly_routes() -> Self {
        Self {
            health_check: true,
            create_user: false,
            list_users: true,
            get_user: true,
            get_user_by_email: true,
            update_user: false,
            delete_user: false,
            assign_clients: false,
        }
    }

    /// Creates a router with minimal routes for monitoring
    ///
    /// Useful for monitoring services or as a base configuration when you
    /// want to add only specific routes. Only includes the health check endpoint.
    pub fn with_minimal_routes() -> Self {
        Self {
            health_check: true,
            create_user: false,
            list_users: false,
            get_user: false,
            get_user_by_email: false,
            update_user: false,
            delete_user: false,
            assign_clients: false,
        }
    }

    /// Enables or disables the health check endpoint (GET /health)
    ///
    /// The health check endpoint is recommended for all deployments as it
    /// allows monitoring systems and load balancers to verify service health.
    pub fn health_check(mut self, enabled: bool) -> Self {
        self.health_check = enabled;
        self
    }

    /// Enables or disables the user creation endpoint (POST /users)
    ///
    /// Disable this for read-only services or when user creation is handled
    /// by a separate registration service.
    pub fn create_user(mut self, enabled: bool) -> Self {
        self.create_user = enabled;
        self
    }

    /// Enables or disables the user listing endpoint (GET /users)
    ///
    /// The listing endpoint supports role filtering, sorting and pagination
    /// through query parameters.
    pub fn list_users(mut self, enabled: bool) -> Self {
        self.list_users = enabled;
        self
    }

    /// Enables or disables the user retrieval endpoint (GET /users/{id})
    ///
    /// This endpoint is commonly needed for most user-related services as it
    /// provides basic user information lookup.
    pub fn get_user(mut self, enabled: bool) -> Self {
        self.get_user = enabled;
        self
    }

    /// Enables or disables the email lookup endpoint (GET /users/by-email/{email})
    ///
    /// Useful for services that resolve accounts by address, for example
    /// during invitation or onboarding flows.
    pub fn get_user_by_email(mut self, enabled: bool) -> Self {
        self.get_user_by_email = enabled;
        self
    }

    /// Enables or disables the user update endpoint (PUT /users/{id})
    ///
    /// Disable this for read-only services or when user updates are handled
    /// by a separate profile management service.
    pub fn update_user(mut self, enabled: bool) -> Self {
        self.update_user = enabled;
        self
    }

    /// Enables or disables the user deletion endpoint (DELETE /users/{id})
    pub fn delete_user(mut self, enable: bool) -> Self {
        self.delete_user = enable;
        self
    }

    /// Enables or disables the client assignment endpoint (POST /users/assign-clients)
    pub fn assign_clients(mut self, enable: bool) -> Self {
        self.assign_clients = enable;
        self
    }

    /// Builds the Axum router with the configured routes
    ///
    /// Returns a `Router<AppState>` that can be used with Axum. Only the enabled
    /// routes will be registered, which improves performance and security by
    /// reducing the attack surface.
    pub fn build(self) -> Router<AppState> {
        let mut router = Router::new();

        if self.health_check {
            router = router.route("/health", get(health_check));
        }

        if self.create_user {
            router = router.route("/users", post(create_user));
        }

        if self.list_users {
            router = router.route("/users", get(list_users));
        }

        if self.get_user {
            router = router.route("/users/{id}", get(get_user));
        }

        if self.get_user_by_email {
            router = router.route("/users/by-email/{email}", get(get_user_by_email));
        }

        if self.update_user {
            router = router.route("/users/{id}", put(update_user));
        }

        if self.delete_user {
            router = router.route("/users/{id}", delete(delete_user));
        }

        if self.assign_clients {
            router = router.route("/users/assign-clients", post(assign_clients));
        }

        router
    }
}

/// Creates all API routes (maintains backward compatibility)
///
/// This function provides the complete user directory router. It's equivalent
/// to `RouterBuilder::with_all_routes().build()`.
pub fn create_routes() -> Router<AppState> {
    RouterBuilder::with_all_routes().build()
}

/// Creates router with core user management functionality
///
/// Convenience function for creating a router with essential user CRUD
/// operations. Excludes deletion and coaching-specific endpoints.
pub fn create_core_routes() -> Router<AppState> {
    RouterBuilder::with_core_routes().build()
}

/// Creates router with read-only functionality
///
/// Convenience function for creating a router suitable for reporting
/// services or user directories that don't modify user data.
pub fn create_readonly_routes() -> Router<AppState> {
    RouterBuilder::with_readonly_routes().build()
}

/// Creates router with minimal functionality (health check only)
///
/// Convenience function for creating a router with only the health check
/// endpoint enabled. Useful for monitoring-only services.
pub fn create_minimal_routes() -> Router<AppState> {
    RouterBuilder::with_minimal_routes().build()
}
