//! HTTP Request Handlers
//!
//! Axum handlers for processing HTTP requests and responses.

use std::sync::Arc;

use axum::{
    extract::{Path, Query, State},
    Json,
};
use chrono::Utc;
use validator::Validate;

use crate::{
    models::requests::*,
    models::user::{ProfileWithUser, UserRecord},
    service::UserDirectory,
    utils::error::{AppError, AppResult},
    utils::validation::{messages, parse_user_id},
    VERSION,
};

/// Application state shared across handlers
#[derive(Clone)]
pub struct AppState {
    pub directory: Arc<UserDirectory>,
}

/// Standard success response wrapper
#[derive(serde::Serialize)]
pub struct SuccessResponse<T> {
    pub success: bool,
    pub data: T,
}

impl<T> SuccessResponse<T> {
    pub fn new(data: T) -> Self {
        Self {
            success: true,
            data,
        }
    }
}

/// Create a new user
pub async fn create_user(
    State(state): State<AppState>,
    Json(request): Json<CreateUserRequest>,
) -> AppResult<Json<SuccessResponse<UserRecord>>> {
    // Validate request
    request
        .validate()
        .map_err(|e| AppError::Validation(format!("Invalid user data: {}", e)))?;

    let record = state.directory.create_user(request).await?;

    Ok(Json(SuccessResponse::new(record)))
}

/// List users with optional role filter, sorting and pagination
pub async fn list_users(
    State(state): State<AppState>,
    Query(params): Query<ListUsersParams>,
) -> AppResult<Json<SuccessResponse<Vec<UserRecord>>>> {
    let (filter, options) = params.into_parts();
    let records = state.directory.query_users(filter, options).await?;

    Ok(Json(SuccessResponse::new(records)))
}

/// Get user by ID
pub async fn get_user(
    State(state): State<AppState>,
    Path(user_id): Path<String>,
) -> AppResult<Json<SuccessResponse<UserRecord>>> {
    // Path ids are parsed strictly so junk input maps to 400, not 404
    let user_id = parse_user_id(&user_id)
        .map_err(|_| AppError::Validation(messages::INVALID_USER_ID.to_string()))?;

    let record = state
        .directory
        .get_user_by_id(user_id)
        .await?
        .ok_or_else(|| AppError::NotFound("User not found".to_string()))?;

    Ok(Json(SuccessResponse::new(record)))
}

/// Get user by email address
pub async fn get_user_by_email(
    State(state): State<AppState>,
    Path(email): Path<String>,
) -> AppResult<Json<SuccessResponse<UserRecord>>> {
    let record = state
        .directory
        .get_user_by_email(&email)
        .await?
        .ok_or_else(|| AppError::NotFound("User not found".to_string()))?;

    Ok(Json(SuccessResponse::new(record)))
}

/// Update user profile
pub async fn update_user(
    State(state): State<AppState>,
    Path(user_id): Path<String>,
    Json(request): Json<UpdateUserRequest>,
) -> AppResult<Json<SuccessResponse<ProfileWithUser>>> {
    let user_id = parse_user_id(&user_id)
        .map_err(|_| AppError::Validation(messages::INVALID_USER_ID.to_string()))?;

    // Validate request
    request
        .validate()
        .map_err(|e| AppError::Validation(format!("Invalid update data: {}", e)))?;

    let updated = state.directory.update_user_by_id(user_id, request).await?;

    Ok(Json(SuccessResponse::new(updated)))
}

/// Delete a user by ID
pub async fn delete_user(
    State(state): State<AppState>,
    Path(user_id): Path<String>,
) -> AppResult<Json<SuccessResponse<UserRecord>>> {
    let user_id = parse_user_id(&user_id)
        .map_err(|_| AppError::Validation(messages::INVALID_USER_ID.to_string()))?;

    let removed = state.directory.delete_user_by_id(user_id).await?;

    Ok(Json(SuccessResponse::new(removed)))
}

/// Assign one or more clients to a coach
pub async fn assign_clients(
    State(state): State<AppState>,
    Json(request): Json<AssignClientsRequest>,
) -> AppResult<Json<SuccessResponse<ClientAssignment>>> {
    let assignment = state.directory.assign_clients(request).await?;

    Ok(Json(SuccessResponse::new(assignment)))
}

/// Health check endpoint
pub async fn health_check(
    State(state): State<AppState>,
) -> AppResult<Json<SuccessResponse<HealthCheckResponse>>> {
    // Check storage connectivity
    state.directory.health_check().await?;

    let response = HealthCheckResponse {
        status: "healthy".to_string(),
        timestamp: Utc::now(),
        version: VERSION.to_string(),
    };

    Ok(Json(SuccessResponse::new(response)))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::user::Role;
    use crate::store::MemoryStore;

    fn test_state() -> AppState {
        let store = Arc::new(MemoryStore::new());
        AppState {
            directory: Arc::new(UserDirectory::with_bcrypt_cost(store, 4)),
        }
    }

    fn new_user_request(email: &str, username: &str) -> CreateUserRequest {
        CreateUserRequest {
            email: email.to_string(),
            username: username.to_string(),
            password: "SecurePass123!".to_string(),
            role: Role::Client,
            coach_id: None,
            department_id: None,
            bio: None,
            avatar_url: None,
        }
    }

    #[test]
    fn test_success_response_creation() {
        let response = SuccessResponse::new("test data");
        assert!(response.success);
        assert_eq!(response.data, "test data");
    }

    #[tokio::test]
    async fn test_health_check_handler() {
        let state = test_state();

        let Json(body) = health_check(State(state)).await.unwrap();

        assert!(body.success);
        assert_eq!(body.data.status, "healthy");
        assert_eq!(body.data.version, VERSION);
    }

    #[tokio::test]
    async fn test_create_then_get_user_handler() {
        let state = test_state();

        let Json(created) = create_user(
            State(state.clone()),
            Json(new_user_request("john@example.com", "john_doe")),
        )
        .await
        .unwrap();

        let Json(fetched) = get_user(State(state), Path(created.data.user.id.to_string()))
            .await
            .unwrap();

        assert_eq!(fetched.data.user.email, "john@example.com");
        assert_eq!(fetched.data.user.username, "john_doe");
    }

    #[tokio::test]
    async fn test_get_user_rejects_non_numeric_id() {
        let state = test_state();

        let result = get_user(State(state), Path("not-a-number".to_string())).await;

        assert!(matches!(result, Err(AppError::Validation(_))));
    }

    #[tokio::test]
    async fn test_get_user_absent_is_not_found() {
        let state = test_state();

        let result = get_user(State(state), Path("4242".to_string())).await;

        assert!(matches!(result, Err(AppError::NotFound(_))));
    }

    #[tokio::test]
    async fn test_list_users_handler_filters_by_role() {
        let state = test_state();
        create_user(
            State(state.clone()),
            Json(CreateUserRequest {
                role: Role::Coach,
                ..new_user_request("coach@example.com", "head_coach")
            }),
        )
        .await
        .unwrap();
        create_user(
            State(state.clone()),
            Json(new_user_request("client@example.com", "the_client")),
        )
        .await
        .unwrap();

        let params = ListUsersParams {
            role: Some("coach".to_string()),
            ..Default::default()
        };
        let Json(body) = list_users(State(state), Query(params)).await.unwrap();

        assert_eq!(body.data.len(), 1);
        assert_eq!(body.data[0].user.role, Role::Coach);
    }

    #[tokio::test]
    async fn test_update_user_handler_rejects_invalid_payload() {
        let state = test_state();
        let Json(created) = create_user(
            State(state.clone()),
            Json(new_user_request("john@example.com", "john_doe")),
        )
        .await
        .unwrap();

        let request = UpdateUserRequest {
            email: Some("not-an-email".to_string()),
            username: None,
            role: None,
            bio: None,
            avatar_url: None,
        };
        let result = update_user(
            State(state),
            Path(created.data.user.id.to_string()),
            Json(request),
        )
        .await;

        assert!(matches!(result, Err(AppError::Validation(_))));
    }

    #[tokio::test]
    async fn test_delete_user_handler_removes_the_row() {
        let state = test_state();
        let Json(created) = create_user(
            State(state.clone()),
            Json(new_user_request("john@example.com", "john_doe")),
        )
        .await
        .unwrap();
        let id = created.data.user.id;

        let Json(removed) = delete_user(State(state.clone()), Path(id.to_string()))
            .await
            .unwrap();
        assert_eq!(removed.data.user.id, id);

        let result = get_user(State(state), Path(id.to_string())).await;
        assert!(matches!(result, Err(AppError::NotFound(_))));
    }
}
