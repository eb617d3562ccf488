//! Request and Response Models
//!
//! Data structures for API request and response payloads with validation.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use validator::{Validate, ValidationError};

use crate::models::{BulkUpdate, Role, UserId, UserRecord};
use crate::utils::validation::{email_validator, url_validator, username_validator};

/// Request payload for creating a new user account
#[derive(Debug, Clone, Deserialize, Validate)]
pub struct CreateUserRequest {
    /// User's email address (must be unique and valid format)
    #[validate(custom(function = "email_validator"))]
    pub email: String,

    /// User's login name (must be unique, 3-32 characters)
    #[validate(custom(function = "username_validator"))]
    pub username: String,

    /// User's password (8-128 characters with strength requirements)
    #[validate(length(
        min = 8,
        max = 128,
        message = "Password must be between 8 and 128 characters"
    ))]
    #[validate(custom(function = "validate_password_strength"))]
    pub password: String,

    /// Role for the new account
    pub role: Role,

    /// Coach to link the new user to (clients only)
    pub coach_id: Option<UserId>,

    /// Department the new user belongs to
    pub department_id: Option<UserId>,

    /// Initial biography text for the user's profile
    #[validate(length(max = 1000, message = "Bio must be at most 1000 characters"))]
    pub bio: Option<String>,

    /// Optional URL to the user's avatar image
    #[validate(custom(function = "url_validator"))]
    pub avatar_url: Option<String>,
}

/// Request payload for updating a user's profile
///
/// Email, username and role are accepted and checked for uniqueness, but the
/// update itself only writes the profile fields.
#[derive(Debug, Deserialize, Validate, Clone)]
pub struct UpdateUserRequest {
    /// Updated email address (must be unique if changed)
    #[validate(custom(function = "email_validator"))]
    pub email: Option<String>,

    /// Updated login name (must be unique if changed)
    #[validate(custom(function = "username_validator"))]
    pub username: Option<String>,

    /// Updated role for the account
    pub role: Option<Role>,

    /// Updated biography text (None means preserve current value)
    #[validate(length(max = 1000, message = "Bio must be at most 1000 characters"))]
    pub bio: Option<String>,

    /// Updated avatar URL (None means preserve current value)
    #[validate(custom(function = "url_validator"))]
    pub avatar_url: Option<String>,
}

/// Filter applied when listing users
#[derive(Debug, Clone, Default, Deserialize)]
pub struct UserQueryFilter {
    /// Restrict results to a single role, matched case-insensitively
    pub role: Option<String>,
}

/// Sorting and pagination options for user listings
#[derive(Debug, Clone, Default, Deserialize)]
pub struct QueryOptions {
    /// Sort option in `field:direction` form, e.g. `created_at:desc`
    pub sort_by: Option<String>,

    /// Maximum number of results per page; omit to return everything
    pub limit: Option<u32>,

    /// Page number, starting at 1; only applied together with `limit`
    pub page: Option<u32>,
}

/// Query-string parameters accepted by the user listing endpoint
#[derive(Debug, Clone, Default, Deserialize)]
pub struct ListUsersParams {
    /// Role filter, matched case-insensitively
    pub role: Option<String>,

    /// Sort option in `field:direction` form
    pub sort_by: Option<String>,

    /// Page size; omit to return everything
    pub limit: Option<u32>,

    /// Page number, starting at 1
    pub page: Option<u32>,
}

impl ListUsersParams {
    /// Splits the raw parameters into a filter and query options
    pub fn into_parts(self) -> (UserQueryFilter, QueryOptions) {
        (
            UserQueryFilter { role: self.role },
            QueryOptions {
                sort_by: self.sort_by,
                limit: self.limit,
                page: self.page,
            },
        )
    }
}

/// One or more client ids accepted wherever a client list is expected
#[derive(Debug, Clone, Deserialize)]
#[serde(untagged)]
pub enum ClientIds {
    /// A single client id
    One(UserId),
    /// A list of client ids
    Many(Vec<UserId>),
}

impl ClientIds {
    /// Normalizes the payload into a list of ids
    pub fn into_vec(self) -> Vec<UserId> {
        match self {
            ClientIds::One(id) => vec![id],
            ClientIds::Many(ids) => ids,
        }
    }
}

/// Request payload for assigning clients to a coach
#[derive(Debug, Clone, Deserialize)]
pub struct AssignClientsRequest {
    /// Coach receiving the clients
    pub coach_id: UserId,

    /// Client id or list of client ids to assign
    pub client_id: ClientIds,
}

/// Result of a client assignment
#[derive(Debug, Clone, Serialize)]
pub struct ClientAssignment {
    /// The coach as loaded before the assignment, with their client list
    pub coach: UserRecord,

    /// Number of client rows that were re-linked
    pub clients: BulkUpdate,
}

/// Response for health check
#[derive(Debug, Serialize)]
pub struct HealthCheckResponse {
    pub status: String,
    pub timestamp: DateTime<Utc>,
    pub version: String,
}

/// Validates password strength according to security requirements
fn validate_password_strength(password: &str) -> Result<(), ValidationError> {
    // Check for at least one lowercase letter
    if !password.chars().any(|c| c.is_lowercase()) {
        return Err(ValidationError::new(
            "Password must contain at least one lowercase letter",
        ));
    }

    // Check for at least one uppercase letter
    if !password.chars().any(|c| c.is_uppercase()) {
        return Err(ValidationError::new(
            "Password must contain at least one uppercase letter",
        ));
    }

    // Check for at least one digit
    if !password.chars().any(|c| c.is_numeric()) {
        return Err(ValidationError::new(
            "Password must contain at least one digit",
        ));
    }

    // Check for at least one special character
    if !password.chars().any(|c| !c.is_alphanumeric()) {
        return Err(ValidationError::new(
            "Password must contain at least one special character",
        ));
    }

    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    fn valid_create_request() -> CreateUserRequest {
        CreateUserRequest {
            email: "john@example.com".to_string(),
            username: "john_doe".to_string(),
            password: "SecurePass123!".to_string(),
            role: Role::Client,
            coach_id: None,
            department_id: None,
            bio: None,
            avatar_url: None,
        }
    }

    #[test]
    fn test_password_strength_validation() {
        // Valid password
        assert!(validate_password_strength("SecurePass123!").is_ok());

        // Missing lowercase
        assert!(validate_password_strength("SECUREPASS123!").is_err());

        // Missing uppercase
        assert!(validate_password_strength("securepass123!").is_err());

        // Missing digit
        assert!(validate_password_strength("SecurePass!").is_err());

        // Missing special character
        assert!(validate_password_strength("SecurePass123").is_err());
    }

    #[test]
    fn test_create_user_request_validation() {
        let request = valid_create_request();
        assert!(request.validate().is_ok());

        let mut invalid_email = valid_create_request();
        invalid_email.email = "not-an-email".to_string();
        assert!(invalid_email.validate().is_err());

        let mut short_username = valid_create_request();
        short_username.username = "ab".to_string();
        assert!(short_username.validate().is_err());
    }

    #[test]
    fn test_create_user_request_deserializes_role() {
        let request: CreateUserRequest = serde_json::from_value(serde_json::json!({
            "email": "coach@example.com",
            "username": "head_coach",
            "password": "SecurePass123!",
            "role": "COACH"
        }))
        .unwrap();

        assert_eq!(request.role, Role::Coach);
        assert!(request.coach_id.is_none());
    }

    #[test]
    fn test_update_user_request_allows_partial_payload() {
        let request = UpdateUserRequest {
            email: None,
            username: None,
            role: None,
            bio: Some("Climber and coffee enthusiast".to_string()),
            avatar_url: None,
        };

        assert!(request.validate().is_ok());
    }

    #[test]
    fn test_assign_clients_request_accepts_single_id() {
        let request: AssignClientsRequest = serde_json::from_value(serde_json::json!({
            "coach_id": 1,
            "client_id": 42
        }))
        .unwrap();

        assert_eq!(request.client_id.into_vec(), vec![42]);
    }

    #[test]
    fn test_assign_clients_request_accepts_id_list() {
        let request: AssignClientsRequest = serde_json::from_value(serde_json::json!({
            "coach_id": 1,
            "client_id": [42, 43, 44]
        }))
        .unwrap();

        assert_eq!(request.client_id.into_vec(), vec![42, 43, 44]);
    }

    #[test]
    fn test_list_users_params_split() {
        let params = ListUsersParams {
            role: Some("COACH".to_string()),
            sort_by: Some("email:desc".to_string()),
            limit: Some(10),
            page: Some(2),
        };

        let (filter, options) = params.into_parts();
        assert_eq!(filter.role.as_deref(), Some("COACH"));
        assert_eq!(options.sort_by.as_deref(), Some("email:desc"));
        assert_eq!(options.limit, Some(10));
        assert_eq!(options.page, Some(2));
    }
}
