//! User Model
//!
//! Core user data structures and type definitions.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use std::fmt;

/// Unique identifier for users, companies and departments
pub type UserId = i64;

/// Role assigned to a user account
///
/// Roles are stored as uppercase strings in the database. `Coach` users can
/// have clients assigned to them, `Client` users can be linked to a coach.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, sqlx::Type)]
#[serde(rename_all = "UPPERCASE")]
#[sqlx(rename_all = "UPPERCASE")]
pub enum Role {
    Admin,
    Coach,
    Client,
}

impl Role {
    /// Returns the canonical uppercase database representation
    pub fn as_str(&self) -> &'static str {
        match self {
            Role::Admin => "ADMIN",
            Role::Coach => "COACH",
            Role::Client => "CLIENT",
        }
    }

    /// Parses a role from external input, ignoring case
    pub fn parse(raw: &str) -> Option<Role> {
        match raw.to_ascii_uppercase().as_str() {
            "ADMIN" => Some(Role::Admin),
            "COACH" => Some(Role::Coach),
            "CLIENT" => Some(Role::Client),
            _ => None,
        }
    }
}

impl fmt::Display for Role {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// User account row
///
/// The password hash is carried internally for storage operations but never
/// serialized into API responses.
#[derive(Debug, Clone, Serialize, Deserialize, sqlx::FromRow)]
pub struct User {
    /// Unique identifier for the user
    pub id: UserId,

    /// User's email address (unique, normalized)
    pub email: String,

    /// User's login name (unique)
    pub username: String,

    /// bcrypt hashed password
    #[serde(skip_serializing)]
    pub password_hash: String,

    /// Role assigned to this account
    pub role: Role,

    /// Coach this user is assigned to, when the user is a client
    pub coach_id: Option<UserId>,

    /// Department the user belongs to
    pub department_id: Option<UserId>,

    /// Timestamp when the user account was created
    pub created_at: DateTime<Utc>,

    /// Timestamp when the user account was last modified
    pub updated_at: DateTime<Utc>,
}

/// Additional profile data attached to a user account
#[derive(Debug, Clone, Serialize, Deserialize, sqlx::FromRow)]
pub struct UserProfile {
    /// User this profile belongs to
    pub user_id: UserId,

    /// Free-form biography text
    pub bio: Option<String>,

    /// Optional URL to the user's avatar image
    pub avatar_url: Option<String>,

    /// Timestamp when the profile was created
    pub created_at: DateTime<Utc>,

    /// Timestamp when the profile was last modified
    pub updated_at: DateTime<Utc>,
}

/// Company a department belongs to
#[derive(Debug, Clone, Serialize, Deserialize, sqlx::FromRow)]
pub struct Company {
    /// Unique identifier for the company
    pub id: UserId,

    /// Company display name
    pub name: String,
}

/// Department grouping users within a company
#[derive(Debug, Clone, Serialize)]
pub struct Department {
    /// Unique identifier for the department
    pub id: UserId,

    /// Department display name
    pub name: String,

    /// Company this department belongs to
    pub company_id: UserId,

    /// Company details, present when the relation was loaded
    #[serde(skip_serializing_if = "Option::is_none")]
    pub company: Option<Company>,
}

/// User account together with its loaded relations
///
/// Relations that were not loaded for a given operation are `None` and
/// omitted from serialized responses.
#[derive(Debug, Clone, Serialize)]
pub struct UserRecord {
    /// The user account itself
    #[serde(flatten)]
    pub user: User,

    /// Department the user belongs to, with its company
    #[serde(skip_serializing_if = "Option::is_none")]
    pub department: Option<Department>,

    /// Coach this user is assigned to
    #[serde(skip_serializing_if = "Option::is_none")]
    pub coach: Option<Box<User>>,

    /// Clients assigned to this user, when the user is a coach
    #[serde(skip_serializing_if = "Option::is_none")]
    pub clients: Option<Vec<User>>,
}

/// Profile returned from an update, together with its parent user
#[derive(Debug, Clone, Serialize)]
pub struct ProfileWithUser {
    /// The updated profile
    #[serde(flatten)]
    pub profile: UserProfile,

    /// The user the profile belongs to
    pub user: User,
}

/// Number of rows touched by a bulk update
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct BulkUpdate {
    /// Count of updated rows
    pub count: u64,
}
