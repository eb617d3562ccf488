//! PostgreSQL Storage Backend
//!
//! Implements the user storage contract on top of a SQLx connection pool.
//! Multi-row writes run inside transactions so they either fully apply or
//! leave the database untouched.

use async_trait::async_trait;
use sqlx::PgPool;
use std::collections::HashMap;

use crate::models::{BulkUpdate, Company, Department, ProfileWithUser, Role, User, UserId,
    UserProfile, UserRecord};
use crate::store::{NewUser, ProfileChanges, StoreError, StoreResult, UserQuery, UserStore};

const USER_COLUMNS: &str =
    "id, email, username, password_hash, role, coach_id, department_id, created_at, updated_at";

/// PostgreSQL-backed user store
#[derive(Debug, Clone)]
pub struct PgUserStore {
    pool: PgPool,
}

/// Which relations to load alongside a user row
#[derive(Clone, Copy)]
struct Eager {
    department: bool,
    coach: bool,
    clients: bool,
}

/// Department row joined with its company name
#[derive(sqlx::FromRow)]
struct DepartmentRow {
    id: UserId,
    name: String,
    company_id: UserId,
    company_name: String,
}

impl DepartmentRow {
    fn into_department(self) -> Department {
        Department {
            id: self.id,
            name: self.name,
            company_id: self.company_id,
            company: Some(Company {
                id: self.company_id,
                name: self.company_name,
            }),
        }
    }
}

impl PgUserStore {
    /// Creates a store on top of an existing connection pool
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }

    async fn fetch_user(&self, id: UserId) -> Result<Option<User>, sqlx::Error> {
        sqlx::query_as::<_, User>(&format!("SELECT {USER_COLUMNS} FROM users WHERE id = $1"))
            .bind(id)
            .fetch_optional(&self.pool)
            .await
    }

    async fn load_department(&self, id: UserId) -> StoreResult<Option<Department>> {
        let row = sqlx::query_as::<_, DepartmentRow>(
            "SELECT d.id, d.name, d.company_id, c.name AS company_name \
             FROM departments d \
             JOIN companies c ON c.id = d.company_id \
             WHERE d.id = $1",
        )
        .bind(id)
        .fetch_optional(&self.pool)
        .await?;

        Ok(row.map(DepartmentRow::into_department))
    }

    async fn load_relations(&self, user: User, eager: Eager) -> StoreResult<UserRecord> {
        let department = match (eager.department, user.department_id) {
            (true, Some(department_id)) => self.load_department(department_id).await?,
            _ => None,
        };

        let coach = match (eager.coach, user.coach_id) {
            (true, Some(coach_id)) => self.fetch_user(coach_id).await?.map(Box::new),
            _ => None,
        };

        let clients = if eager.clients {
            let rows = sqlx::query_as::<_, User>(&format!(
                "SELECT {USER_COLUMNS} FROM users WHERE coach_id = $1 ORDER BY id"
            ))
            .bind(user.id)
            .fetch_all(&self.pool)
            .await?;
            Some(rows)
        } else {
            None
        };

        Ok(UserRecord {
            user,
            department,
            coach,
            clients,
        })
    }
}

#[async_trait]
impl UserStore for PgUserStore {
    async fn find_by_id(&self, id: UserId) -> StoreResult<Option<UserRecord>> {
        match self.fetch_user(id).await? {
            Some(user) => {
                let record = self
                    .load_relations(
                        user,
                        Eager {
                            department: true,
                            coach: false,
                            clients: false,
                        },
                    )
                    .await?;
                Ok(Some(record))
            }
            None => Ok(None),
        }
    }

    async fn find_by_email(&self, email: &str) -> StoreResult<Option<UserRecord>> {
        let user = sqlx::query_as::<_, User>(&format!(
            "SELECT {USER_COLUMNS} FROM users WHERE email = $1"
        ))
        .bind(email)
        .fetch_optional(&self.pool)
        .await?;

        match user {
            Some(user) => {
                let record = self
                    .load_relations(
                        user,
                        Eager {
                            department: true,
                            coach: true,
                            clients: false,
                        },
                    )
                    .await?;
                Ok(Some(record))
            }
            None => Ok(None),
        }
    }

    async fn find_coach(&self, id: UserId) -> StoreResult<Option<UserRecord>> {
        let user = sqlx::query_as::<_, User>(&format!(
            "SELECT {USER_COLUMNS} FROM users WHERE id = $1 AND role = $2"
        ))
        .bind(id)
        .bind(Role::Coach)
        .fetch_optional(&self.pool)
        .await?;

        match user {
            Some(user) => {
                let record = self
                    .load_relations(
                        user,
                        Eager {
                            department: false,
                            coach: false,
                            clients: true,
                        },
                    )
                    .await?;
                Ok(Some(record))
            }
            None => Ok(None),
        }
    }

    async fn find_many(&self, query: &UserQuery) -> StoreResult<Vec<UserRecord>> {
        let mut sql = format!("SELECT {USER_COLUMNS} FROM users");
        if query.role.is_some() {
            sql.push_str(" WHERE role = $1");
        }
        sql.push_str(&format!(
            " ORDER BY {} {}",
            query.sort.field.column(),
            query.sort.dir.keyword()
        ));
        if let Some(page) = query.page {
            sql.push_str(&format!(" LIMIT {} OFFSET {}", page.limit, page.offset));
        }

        let mut q = sqlx::query_as::<_, User>(&sql);
        if let Some(role) = query.role {
            q = q.bind(role);
        }
        let users = q.fetch_all(&self.pool).await?;
        if users.is_empty() {
            return Ok(Vec::new());
        }

        let ids: Vec<UserId> = users.iter().map(|u| u.id).collect();
        let mut department_ids: Vec<UserId> =
            users.iter().filter_map(|u| u.department_id).collect();
        department_ids.sort_unstable();
        department_ids.dedup();
        let mut coach_ids: Vec<UserId> = users.iter().filter_map(|u| u.coach_id).collect();
        coach_ids.sort_unstable();
        coach_ids.dedup();

        let mut departments: HashMap<UserId, Department> = HashMap::new();
        if !department_ids.is_empty() {
            let rows = sqlx::query_as::<_, DepartmentRow>(
                "SELECT d.id, d.name, d.company_id, c.name AS company_name \
                 FROM departments d \
                 JOIN companies c ON c.id = d.company_id \
                 WHERE d.id = ANY($1)",
            )
            .bind(&department_ids)
            .fetch_all(&self.pool)
            .await?;
            for row in rows {
                departments.insert(row.id, row.into_department());
            }
        }

        let mut coaches: HashMap<UserId, User> = HashMap::new();
        if !coach_ids.is_empty() {
            let rows = sqlx::query_as::<_, User>(&format!(
                "SELECT {USER_COLUMNS} FROM users WHERE id = ANY($1)"
            ))
            .bind(&coach_ids)
            .fetch_all(&self.pool)
            .await?;
            for row in rows {
                coaches.insert(row.id, row);
            }
        }

        let mut clients: HashMap<UserId, Vec<User>> = HashMap::new();
        let rows = sqlx::query_as::<_, User>(&format!(
            "SELECT {USER_COLUMNS} FROM users WHERE coach_id = ANY($1) ORDER BY id"
        ))
        .bind(&ids)
        .fetch_all(&self.pool)
        .await?;
        for row in rows {
            if let Some(coach_id) = row.coach_id {
                clients.entry(coach_id).or_default().push(row);
            }
        }

        let records = users
            .into_iter()
            .map(|user| {
                let department = user
                    .department_id
                    .and_then(|id| departments.get(&id).cloned());
                let coach = user
                    .coach_id
                    .and_then(|id| coaches.get(&id).cloned())
                    .map(Box::new);
                let user_clients = clients.remove(&user.id).unwrap_or_default();
                UserRecord {
                    user,
                    department,
                    coach,
                    clients: Some(user_clients),
                }
            })
            .collect();

        Ok(records)
    }

    async fn find_clients(&self, ids: &[UserId]) -> StoreResult<Vec<User>> {
        let rows = sqlx::query_as::<_, User>(&format!(
            "SELECT {USER_COLUMNS} FROM users WHERE id = ANY($1) AND role = $2 ORDER BY id"
        ))
        .bind(ids)
        .bind(Role::Client)
        .fetch_all(&self.pool)
        .await?;

        Ok(rows)
    }

    async fn email_taken(&self, email: &str, exclude: Option<UserId>) -> StoreResult<bool> {
        let taken: bool = sqlx::query_scalar(
            "SELECT EXISTS(SELECT 1 FROM users WHERE email = $1 AND id IS DISTINCT FROM $2)",
        )
        .bind(email)
        .bind(exclude)
        .fetch_one(&self.pool)
        .await?;

        Ok(taken)
    }

    async fn username_taken(&self, username: &str, exclude: Option<UserId>) -> StoreResult<bool> {
        let taken: bool = sqlx::query_scalar(
            "SELECT EXISTS(SELECT 1 FROM users WHERE username = $1 AND id IS DISTINCT FROM $2)",
        )
        .bind(username)
        .bind(exclude)
        .fetch_one(&self.pool)
        .await?;

        Ok(taken)
    }

    async fn create_user(&self, new_user: NewUser) -> StoreResult<UserRecord> {
        let mut tx = self.pool.begin().await?;

        let user = sqlx::query_as::<_, User>(&format!(
            "INSERT INTO users (email, username, password_hash, role, coach_id, department_id) \
             VALUES ($1, $2, $3, $4, $5, $6) \
             RETURNING {USER_COLUMNS}"
        ))
        .bind(&new_user.email)
        .bind(&new_user.username)
        .bind(&new_user.password_hash)
        .bind(new_user.role)
        .bind(new_user.coach_id)
        .bind(new_user.department_id)
        .fetch_one(&mut *tx)
        .await?;

        sqlx::query("INSERT INTO user_profiles (user_id, bio, avatar_url) VALUES ($1, $2, $3)")
            .bind(user.id)
            .bind(&new_user.bio)
            .bind(&new_user.avatar_url)
            .execute(&mut *tx)
            .await?;

        tx.commit().await?;

        self.load_relations(
            user,
            Eager {
                department: true,
                coach: true,
                clients: false,
            },
        )
        .await
    }

    async fn update_profile(
        &self,
        user_id: UserId,
        changes: ProfileChanges,
    ) -> StoreResult<Option<ProfileWithUser>> {
        let profile = sqlx::query_as::<_, UserProfile>(
            "UPDATE user_profiles \
             SET bio = COALESCE($2, bio), \
                 avatar_url = COALESCE($3, avatar_url), \
                 updated_at = NOW() \
             WHERE user_id = $1 \
             RETURNING user_id, bio, avatar_url, created_at, updated_at",
        )
        .bind(user_id)
        .bind(&changes.bio)
        .bind(&changes.avatar_url)
        .fetch_optional(&self.pool)
        .await?;

        match profile {
            Some(profile) => {
                let user = sqlx::query_as::<_, User>(&format!(
                    "SELECT {USER_COLUMNS} FROM users WHERE id = $1"
                ))
                .bind(user_id)
                .fetch_one(&self.pool)
                .await?;

                Ok(Some(ProfileWithUser { profile, user }))
            }
            None => Ok(None),
        }
    }

    async fn delete_user(&self, id: UserId) -> StoreResult<bool> {
        let result = sqlx::query("DELETE FROM users WHERE id = $1")
            .bind(id)
            .execute(&self.pool)
            .await?;

        Ok(result.rows_affected() > 0)
    }

    async fn assign_clients(
        &self,
        coach_id: UserId,
        client_ids: &[UserId],
    ) -> StoreResult<BulkUpdate> {
        let mut tx = self.pool.begin().await?;

        // Re-verify the coach inside the transaction; callers check first,
        // but the row may have changed since.
        let coach: Option<UserId> =
            sqlx::query_scalar("SELECT id FROM users WHERE id = $1 AND role = $2")
                .bind(coach_id)
                .bind(Role::Coach)
                .fetch_optional(&mut *tx)
                .await?;
        if coach.is_none() {
            return Err(StoreError::AssignmentConflict);
        }

        let result = sqlx::query(
            "UPDATE users SET coach_id = $1, updated_at = NOW() \
             WHERE id = ANY($2) AND role = $3",
        )
        .bind(coach_id)
        .bind(client_ids)
        .bind(Role::Client)
        .execute(&mut *tx)
        .await?;

        // Dropping the transaction without commit rolls the update back.
        if result.rows_affected() != client_ids.len() as u64 {
            return Err(StoreError::AssignmentConflict);
        }

        tx.commit().await?;

        Ok(BulkUpdate {
            count: result.rows_affected(),
        })
    }

    async fn ping(&self) -> StoreResult<()> {
        sqlx::query_scalar::<_, i32>("SELECT 1")
            .fetch_one(&self.pool)
            .await?;

        Ok(())
    }
}
