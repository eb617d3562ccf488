//! User Storage Module
//!
//! Defines the storage contract for user records and the available backends.
//! `PgUserStore` is the production PostgreSQL backend, `MemoryStore` is an
//! in-memory backend for tests and local development.

pub mod memory;
pub mod postgres;

pub use memory::MemoryStore;
pub use postgres::PgUserStore;

use async_trait::async_trait;
use thiserror::Error;

use crate::database::Pagination;
use crate::models::{BulkUpdate, ProfileWithUser, Role, User, UserId, UserRecord};

/// Errors produced by storage backends
#[derive(Error, Debug)]
pub enum StoreError {
    /// Database-related errors
    #[error("Database error: {0}")]
    Database(#[from] sqlx::Error),

    /// The coach or client rows changed while an assignment was in flight
    #[error("Assignment targets changed during update")]
    AssignmentConflict,
}

/// Result type alias for storage operations
pub type StoreResult<T> = Result<T, StoreError>;

/// Fields for a new user row and its profile, password already hashed
#[derive(Debug, Clone)]
pub struct NewUser {
    pub email: String,
    pub username: String,
    pub password_hash: String,
    pub role: Role,
    pub coach_id: Option<UserId>,
    pub department_id: Option<UserId>,
    pub bio: Option<String>,
    pub avatar_url: Option<String>,
}

/// Profile fields to change; `None` preserves the stored value
#[derive(Debug, Clone, Default)]
pub struct ProfileChanges {
    pub bio: Option<String>,
    pub avatar_url: Option<String>,
}

/// Columns a user listing can be ordered by
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SortField {
    Id,
    Email,
    Username,
    CreatedAt,
    UpdatedAt,
}

impl SortField {
    /// Returns the column name used in ORDER BY clauses
    pub fn column(&self) -> &'static str {
        match self {
            SortField::Id => "id",
            SortField::Email => "email",
            SortField::Username => "username",
            SortField::CreatedAt => "created_at",
            SortField::UpdatedAt => "updated_at",
        }
    }
}

/// Sort direction for user listings
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SortDir {
    Asc,
    Desc,
}

impl SortDir {
    /// Returns the SQL keyword for this direction
    pub fn keyword(&self) -> &'static str {
        match self {
            SortDir::Asc => "ASC",
            SortDir::Desc => "DESC",
        }
    }
}

/// Parsed sort option for user listings
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct SortBy {
    pub field: SortField,
    pub dir: SortDir,
}

impl Default for SortBy {
    fn default() -> Self {
        Self {
            field: SortField::Id,
            dir: SortDir::Asc,
        }
    }
}

impl SortBy {
    /// Parses a `field:direction` sort option
    ///
    /// The direction is optional and defaults to ascending. Returns `None`
    /// for fields outside the allow list or unknown directions.
    pub fn parse(raw: &str) -> Option<SortBy> {
        let (field, dir) = match raw.split_once(':') {
            Some((field, dir)) => (field, Some(dir)),
            None => (raw, None),
        };

        let field = match field.to_ascii_lowercase().as_str() {
            "id" => SortField::Id,
            "email" => SortField::Email,
            "username" => SortField::Username,
            "created_at" => SortField::CreatedAt,
            "updated_at" => SortField::UpdatedAt,
            _ => return None,
        };

        let dir = match dir {
            None => SortDir::Asc,
            Some(d) if d.eq_ignore_ascii_case("asc") => SortDir::Asc,
            Some(d) if d.eq_ignore_ascii_case("desc") => SortDir::Desc,
            Some(_) => return None,
        };

        Some(SortBy { field, dir })
    }
}

/// Filter, ordering and pagination for a user listing
#[derive(Debug, Clone, Default)]
pub struct UserQuery {
    pub role: Option<Role>,
    pub sort: SortBy,
    pub page: Option<Pagination>,
}

/// Storage contract for user records
///
/// Backends return fully loaded `UserRecord`s with the relations each
/// operation promises. Uniqueness of email and username is guarded by the
/// service layer; PostgreSQL additionally enforces it with unique indexes.
#[async_trait]
pub trait UserStore: Send + Sync {
    /// Looks up a user by id, loading their department and its company
    async fn find_by_id(&self, id: UserId) -> StoreResult<Option<UserRecord>>;

    /// Looks up a user by exact email, loading department, company and coach
    async fn find_by_email(&self, email: &str) -> StoreResult<Option<UserRecord>>;

    /// Looks up a coach by id, loading their client list
    ///
    /// Returns `None` when the user does not exist or does not hold the
    /// coach role.
    async fn find_coach(&self, id: UserId) -> StoreResult<Option<UserRecord>>;

    /// Lists users matching the query, loading all relations
    async fn find_many(&self, query: &UserQuery) -> StoreResult<Vec<UserRecord>>;

    /// Fetches the users among `ids` that hold the client role
    async fn find_clients(&self, ids: &[UserId]) -> StoreResult<Vec<User>>;

    /// Whether a user other than `exclude` already holds this email
    async fn email_taken(&self, email: &str, exclude: Option<UserId>) -> StoreResult<bool>;

    /// Whether a user other than `exclude` already holds this username
    async fn username_taken(&self, username: &str, exclude: Option<UserId>) -> StoreResult<bool>;

    /// Inserts the user row and its profile row atomically
    ///
    /// The returned record has department, company and coach loaded.
    async fn create_user(&self, new_user: NewUser) -> StoreResult<UserRecord>;

    /// Updates profile fields, preserving any that are `None`
    ///
    /// Returns `None` when the user has no profile row.
    async fn update_profile(
        &self,
        user_id: UserId,
        changes: ProfileChanges,
    ) -> StoreResult<Option<ProfileWithUser>>;

    /// Removes the user row, returning whether a row was deleted
    ///
    /// The profile row is removed with it and any clients pointing at the
    /// user have their coach link cleared.
    async fn delete_user(&self, id: UserId) -> StoreResult<bool>;

    /// Points every listed client row at the coach in one atomic update
    ///
    /// Client ids are expected to be distinct. Fails with
    /// `AssignmentConflict` if the coach or any client no longer matches its
    /// expected role, leaving all rows untouched.
    async fn assign_clients(
        &self,
        coach_id: UserId,
        client_ids: &[UserId],
    ) -> StoreResult<BulkUpdate>;

    /// Backend liveness probe
    async fn ping(&self) -> StoreResult<()>;
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_sort_by_parse() {
        let sort = SortBy::parse("created_at:desc").unwrap();
        assert_eq!(sort.field, SortField::CreatedAt);
        assert_eq!(sort.dir, SortDir::Desc);

        let sort = SortBy::parse("email").unwrap();
        assert_eq!(sort.field, SortField::Email);
        assert_eq!(sort.dir, SortDir::Asc);

        let sort = SortBy::parse("ID:ASC").unwrap();
        assert_eq!(sort.field, SortField::Id);
        assert_eq!(sort.dir, SortDir::Asc);
    }

    #[test]
    fn test_sort_by_parse_rejects_unknown_input() {
        assert!(SortBy::parse("password_hash:asc").is_none());
        assert!(SortBy::parse("email:sideways").is_none());
        assert!(SortBy::parse("").is_none());
        assert!(SortBy::parse("id; DROP TABLE users").is_none());
    }

    #[test]
    fn test_sort_by_default_is_id_ascending() {
        let sort = SortBy::default();
        assert_eq!(sort.field, SortField::Id);
        assert_eq!(sort.dir, SortDir::Asc);
    }
}
