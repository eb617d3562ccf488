//! User Directory Service
//!
//! Core business logic for user management operations.

use log::debug;
use std::sync::Arc;
use thiserror::Error;
use validator::Validate;

use crate::database::Pagination;
use crate::models::{
    requests::*,
    user::{ProfileWithUser, Role, UserId, UserRecord},
};
use crate::store::{NewUser, ProfileChanges, SortBy, StoreError, UserQuery, UserStore};
use crate::utils::{
    error::AppError,
    security::{hash_password_with_cost, DEFAULT_BCRYPT_COST},
    validation::normalize_email,
};

/// Custom error types for the user directory
#[derive(Error, Debug)]
pub enum UserDirectoryError {
    /// User with the specified identifier was not found
    #[error("User not found")]
    UserNotFound,

    /// The user exists but has no profile row to update
    #[error("User profile not found")]
    ProfileNotFound,

    /// No coach user with the specified identifier
    #[error("Coach user not found")]
    CoachNotFound,

    /// One or more assignment targets are missing or not clients
    #[error("Client(s) with id(s) {ids} not found")]
    ClientsNotFound { ids: String },

    /// Attempted to create a user with an email or username already in use
    #[error("Email or Username already taken")]
    IdentityTaken,

    /// Attempted to move a user onto an email already in use
    #[error("Email already taken")]
    EmailTaken,

    /// Attempted to move a user onto a username already in use
    #[error("Username already taken")]
    UsernameTaken,

    /// Coach or client rows changed while the assignment was in flight
    #[error("Coach or client roles changed during assignment")]
    AssignmentConflict,

    /// Input validation failed with detailed error message
    #[error("Validation error: {0}")]
    ValidationError(String),

    /// Password hashing operation failed
    #[error("Password hashing error: {0}")]
    HashingError(#[from] bcrypt::BcryptError),

    /// Storage backend operation failed
    #[error("Storage error: {0}")]
    StorageError(#[from] StoreError),
}

impl From<UserDirectoryError> for AppError {
    fn from(err: UserDirectoryError) -> Self {
        match err {
            UserDirectoryError::UserNotFound => AppError::NotFound("User not found".to_string()),
            UserDirectoryError::ProfileNotFound => {
                AppError::NotFound("User profile not found".to_string())
            }
            UserDirectoryError::CoachNotFound => {
                AppError::NotFound("Coach user not found".to_string())
            }
            UserDirectoryError::ClientsNotFound { ids } => {
                AppError::NotFound(format!("Client(s) with id(s) {} not found", ids))
            }
            UserDirectoryError::IdentityTaken => {
                AppError::Duplicate("Email or Username already taken".to_string())
            }
            UserDirectoryError::EmailTaken => {
                AppError::Duplicate("Email already taken".to_string())
            }
            UserDirectoryError::UsernameTaken => {
                AppError::Duplicate("Username already taken".to_string())
            }
            UserDirectoryError::AssignmentConflict => {
                AppError::NotFound("Coach or client roles changed during assignment".to_string())
            }
            UserDirectoryError::ValidationError(msg) => AppError::Validation(msg),
            UserDirectoryError::HashingError(e) => AppError::HashingError(e),
            UserDirectoryError::StorageError(StoreError::Database(e)) => AppError::Database(e),
            UserDirectoryError::StorageError(StoreError::AssignmentConflict) => {
                AppError::NotFound("Coach or client roles changed during assignment".to_string())
            }
        }
    }
}

/// Result type for user directory operations
pub type UserDirectoryResult<T> = Result<T, UserDirectoryError>;

/// Core service providing user directory operations
///
/// All storage access goes through the injected `UserStore`, so the same
/// service runs against PostgreSQL in production and the in-memory backend
/// in tests.
#[derive(Clone)]
pub struct UserDirectory {
    /// Storage backend holding user records
    store: Arc<dyn UserStore>,

    /// bcrypt cost factor for password hashing (higher = more secure but slower)
    bcrypt_cost: u32,
}

impl UserDirectory {
    /// Creates a new UserDirectory on top of the given storage backend
    pub fn new(store: Arc<dyn UserStore>) -> Self {
        Self {
            store,
            bcrypt_cost: DEFAULT_BCRYPT_COST,
        }
    }

    /// Creates a UserDirectory with a custom bcrypt cost
    ///
    /// Lower costs make password hashing fast enough for test suites.
    pub fn with_bcrypt_cost(store: Arc<dyn UserStore>, bcrypt_cost: u32) -> Self {
        Self { store, bcrypt_cost }
    }

    /// Creates a new user account together with its profile row
    ///
    /// The returned record has department, company and coach loaded.
    pub async fn create_user(
        &self,
        request: CreateUserRequest,
    ) -> UserDirectoryResult<UserRecord> {
        // Email comparisons are case-insensitive, so normalize before validating
        let mut request = request;
        request.email = normalize_email(&request.email);

        // Validate the request
        request
            .validate()
            .map_err(|e| UserDirectoryError::ValidationError(format!("Invalid user data: {}", e)))?;

        // Duplicate identity checks, email first
        if self.store.email_taken(&request.email, None).await? {
            return Err(UserDirectoryError::IdentityTaken);
        }
        if self.store.username_taken(&request.username, None).await? {
            return Err(UserDirectoryError::IdentityTaken);
        }

        // A coach link is only meaningful on client accounts
        if let Some(coach_id) = request.coach_id {
            if request.role != Role::Client {
                return Err(UserDirectoryError::ValidationError(
                    "Only CLIENT users can be linked to a coach".to_string(),
                ));
            }
            if self.store.find_coach(coach_id).await?.is_none() {
                return Err(UserDirectoryError::CoachNotFound);
            }
        }

        // Hash the password
        let password_hash = hash_password_with_cost(&request.password, self.bcrypt_cost)?;

        let record = self
            .store
            .create_user(NewUser {
                email: request.email,
                username: request.username,
                password_hash,
                role: request.role,
                coach_id: request.coach_id,
                department_id: request.department_id,
                bio: request.bio,
                avatar_url: request.avatar_url,
            })
            .await?;

        Ok(record)
    }

    /// Lists users with optional role filter, ordering and pagination
    ///
    /// Every returned record carries department, company, coach and client
    /// relations.
    pub async fn query_users(
        &self,
        filter: UserQueryFilter,
        options: QueryOptions,
    ) -> UserDirectoryResult<Vec<UserRecord>> {
        debug!("Querying users with filter: {:?}", filter);

        // Role filters arrive as free-form strings, matched case-insensitively
        let role = match &filter.role {
            Some(raw) => Some(Role::parse(raw).ok_or_else(|| {
                UserDirectoryError::ValidationError(format!("Invalid role filter: {}", raw))
            })?),
            None => None,
        };

        let sort = match &options.sort_by {
            Some(raw) => SortBy::parse(raw).ok_or_else(|| {
                UserDirectoryError::ValidationError(format!("Invalid sort option: {}", raw))
            })?,
            None => SortBy::default(),
        };

        // Pagination only applies when a limit is given
        let page = options
            .limit
            .map(|limit| Pagination::new(options.page.unwrap_or(1), limit));

        let records = self.store.find_many(&UserQuery { role, sort, page }).await?;

        Ok(records)
    }

    /// Fetches a user by id with their department and company
    ///
    /// Absence is reported as `Ok(None)` so callers decide how to handle it.
    pub async fn get_user_by_id(
        &self,
        user_id: UserId,
    ) -> UserDirectoryResult<Option<UserRecord>> {
        let record = self.store.find_by_id(user_id).await?;

        Ok(record)
    }

    /// Fetches a user by email with department, company and coach loaded
    ///
    /// The email is normalized before the lookup, so case and surrounding
    /// whitespace are ignored.
    pub async fn get_user_by_email(
        &self,
        email: &str,
    ) -> UserDirectoryResult<Option<UserRecord>> {
        let email = normalize_email(email);
        let record = self.store.find_by_email(&email).await?;

        Ok(record)
    }

    /// Updates a user's profile fields
    ///
    /// Identity fields in the request are validated for uniqueness against
    /// other users, but only bio and avatar URL are written.
    pub async fn update_user_by_id(
        &self,
        user_id: UserId,
        request: UpdateUserRequest,
    ) -> UserDirectoryResult<ProfileWithUser> {
        // Normalize the email, when given, before validating
        let mut request = request;
        if let Some(email) = request.email.take() {
            request.email = Some(normalize_email(&email));
        }

        // Validate the request
        request.validate().map_err(|e| {
            UserDirectoryError::ValidationError(format!("Invalid update data: {}", e))
        })?;

        // The target must exist before any uniqueness probes
        if self.store.find_by_id(user_id).await?.is_none() {
            return Err(UserDirectoryError::UserNotFound);
        }

        // Uniqueness guards exclude the user's own row
        if let Some(email) = &request.email {
            if self.store.email_taken(email, Some(user_id)).await? {
                return Err(UserDirectoryError::EmailTaken);
            }
        }
        if let Some(username) = &request.username {
            if self.store.username_taken(username, Some(user_id)).await? {
                return Err(UserDirectoryError::UsernameTaken);
            }
        }

        let profile = self
            .store
            .update_profile(
                user_id,
                ProfileChanges {
                    bio: request.bio,
                    avatar_url: request.avatar_url,
                },
            )
            .await?
            .ok_or(UserDirectoryError::ProfileNotFound)?;

        Ok(profile)
    }

    /// Deletes a user, returning the record as it was before removal
    pub async fn delete_user_by_id(&self, user_id: UserId) -> UserDirectoryResult<UserRecord> {
        // Load the record first so the response can echo what was removed
        let record = self
            .store
            .find_by_id(user_id)
            .await?
            .ok_or(UserDirectoryError::UserNotFound)?;

        self.store.delete_user(user_id).await?;

        Ok(record)
    }

    /// Assigns one or more clients to a coach
    ///
    /// Every target must exist and hold the client role; otherwise no row is
    /// changed and the missing ids are reported. The returned coach snapshot
    /// reflects the state before the assignment.
    pub async fn assign_clients(
        &self,
        request: AssignClientsRequest,
    ) -> UserDirectoryResult<ClientAssignment> {
        // Accept one id or many, dropping duplicates
        let mut client_ids: Vec<UserId> = Vec::new();
        for id in request.client_id.into_vec() {
            if !client_ids.contains(&id) {
                client_ids.push(id);
            }
        }

        let coach = self
            .store
            .find_coach(request.coach_id)
            .await?
            .ok_or(UserDirectoryError::CoachNotFound)?;

        let clients = self.store.find_clients(&client_ids).await?;
        if clients.len() != client_ids.len() {
            let missing: Vec<String> = client_ids
                .iter()
                .filter(|id| !clients.iter().any(|client| client.id == **id))
                .map(|id| id.to_string())
                .collect();
            return Err(UserDirectoryError::ClientsNotFound {
                ids: missing.join(", "),
            });
        }

        let updated = match self.store.assign_clients(coach.user.id, &client_ids).await {
            Ok(updated) => updated,
            Err(StoreError::AssignmentConflict) => {
                return Err(UserDirectoryError::AssignmentConflict)
            }
            Err(err) => return Err(err.into()),
        };

        Ok(ClientAssignment {
            coach,
            clients: updated,
        })
    }

    /// Verifies the storage backend is reachable
    pub async fn health_check(&self) -> UserDirectoryResult<()> {
        self.store.ping().await?;

        Ok(())
    }
}
