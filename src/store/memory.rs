//! In-Memory Storage Backend
//!
//! A `UserStore` implementation holding all rows in process memory. It backs
//! the test suite and lets the service run without a PostgreSQL instance.
//! Ids come from a single sequence shared by all tables.

use async_trait::async_trait;
use chrono::Utc;
use std::collections::BTreeMap;
use tokio::sync::RwLock;

use crate::models::{BulkUpdate, Company, Department, ProfileWithUser, Role, User, UserId,
    UserProfile, UserRecord};
use crate::store::{NewUser, ProfileChanges, SortDir, SortField, StoreError, StoreResult,
    UserQuery, UserStore};

#[derive(Default)]
struct Tables {
    users: BTreeMap<UserId, User>,
    profiles: BTreeMap<UserId, UserProfile>,
    departments: BTreeMap<UserId, Department>,
    companies: BTreeMap<UserId, Company>,
    next_id: UserId,
}

impl Tables {
    fn alloc_id(&mut self) -> UserId {
        self.next_id += 1;
        self.next_id
    }

    fn department_with_company(&self, id: UserId) -> Option<Department> {
        self.departments.get(&id).map(|stored| {
            let mut department = stored.clone();
            department.company = self.companies.get(&stored.company_id).cloned();
            department
        })
    }

    fn coach_of(&self, user: &User) -> Option<Box<User>> {
        user.coach_id
            .and_then(|coach_id| self.users.get(&coach_id).cloned())
            .map(Box::new)
    }

    /// Clients in id order, matching the PostgreSQL backend
    fn clients_of(&self, coach_id: UserId) -> Vec<User> {
        self.users
            .values()
            .filter(|user| user.coach_id == Some(coach_id))
            .cloned()
            .collect()
    }
}

/// In-memory user store
#[derive(Default)]
pub struct MemoryStore {
    tables: RwLock<Tables>,
}

impl MemoryStore {
    /// Creates an empty store
    pub fn new() -> Self {
        Self::default()
    }

    /// Inserts a company, returning it with its assigned id
    pub async fn seed_company(&self, name: &str) -> Company {
        let mut tables = self.tables.write().await;
        let id = tables.alloc_id();
        let company = Company {
            id,
            name: name.to_string(),
        };
        tables.companies.insert(id, company.clone());
        company
    }

    /// Inserts a department under an existing company
    pub async fn seed_department(&self, name: &str, company_id: UserId) -> Department {
        let mut tables = self.tables.write().await;
        let id = tables.alloc_id();
        let stored = Department {
            id,
            name: name.to_string(),
            company_id,
            company: None,
        };
        tables.departments.insert(id, stored.clone());

        Department {
            company: tables.companies.get(&company_id).cloned(),
            ..stored
        }
    }
}

#[async_trait]
impl UserStore for MemoryStore {
    async fn find_by_id(&self, id: UserId) -> StoreResult<Option<UserRecord>> {
        let tables = self.tables.read().await;

        Ok(tables.users.get(&id).map(|user| UserRecord {
            user: user.clone(),
            department: user
                .department_id
                .and_then(|d| tables.department_with_company(d)),
            coach: None,
            clients: None,
        }))
    }

    async fn find_by_email(&self, email: &str) -> StoreResult<Option<UserRecord>> {
        let tables = self.tables.read().await;

        Ok(tables
            .users
            .values()
            .find(|user| user.email == email)
            .map(|user| UserRecord {
                user: user.clone(),
                department: user
                    .department_id
                    .and_then(|d| tables.department_with_company(d)),
                coach: tables.coach_of(user),
                clients: None,
            }))
    }

    async fn find_coach(&self, id: UserId) -> StoreResult<Option<UserRecord>> {
        let tables = self.tables.read().await;

        Ok(tables
            .users
            .get(&id)
            .filter(|user| user.role == Role::Coach)
            .map(|user| UserRecord {
                user: user.clone(),
                department: None,
                coach: None,
                clients: Some(tables.clients_of(user.id)),
            }))
    }

    async fn find_many(&self, query: &UserQuery) -> StoreResult<Vec<UserRecord>> {
        let tables = self.tables.read().await;

        let mut users: Vec<User> = tables
            .users
            .values()
            .filter(|user| query.role.map_or(true, |role| user.role == role))
            .cloned()
            .collect();

        users.sort_by(|a, b| {
            let ord = match query.sort.field {
                SortField::Id => a.id.cmp(&b.id),
                SortField::Email => a.email.cmp(&b.email),
                SortField::Username => a.username.cmp(&b.username),
                SortField::CreatedAt => a.created_at.cmp(&b.created_at),
                SortField::UpdatedAt => a.updated_at.cmp(&b.updated_at),
            };
            match query.sort.dir {
                SortDir::Asc => ord,
                SortDir::Desc => ord.reverse(),
            }
        });

        let users: Vec<User> = match query.page {
            Some(page) => users
                .into_iter()
                .skip(page.offset as usize)
                .take(page.limit as usize)
                .collect(),
            None => users,
        };

        Ok(users
            .into_iter()
            .map(|user| {
                let department = user
                    .department_id
                    .and_then(|d| tables.department_with_company(d));
                let coach = tables.coach_of(&user);
                let clients = Some(tables.clients_of(user.id));
                UserRecord {
                    user,
                    department,
                    coach,
                    clients,
                }
            })
            .collect())
    }

    async fn find_clients(&self, ids: &[UserId]) -> StoreResult<Vec<User>> {
        let tables = self.tables.read().await;

        Ok(tables
            .users
            .values()
            .filter(|user| ids.contains(&user.id) && user.role == Role::Client)
            .cloned()
            .collect())
    }

    async fn email_taken(&self, email: &str, exclude: Option<UserId>) -> StoreResult<bool> {
        let tables = self.tables.read().await;

        Ok(tables
            .users
            .values()
            .any(|user| user.email == email && exclude != Some(user.id)))
    }

    async fn username_taken(&self, username: &str, exclude: Option<UserId>) -> StoreResult<bool> {
        let tables = self.tables.read().await;

        Ok(tables
            .users
            .values()
            .any(|user| user.username == username && exclude != Some(user.id)))
    }

    async fn create_user(&self, new_user: NewUser) -> StoreResult<UserRecord> {
        let mut tables = self.tables.write().await;
        let now = Utc::now();
        let id = tables.alloc_id();

        let user = User {
            id,
            email: new_user.email,
            username: new_user.username,
            password_hash: new_user.password_hash,
            role: new_user.role,
            coach_id: new_user.coach_id,
            department_id: new_user.department_id,
            created_at: now,
            updated_at: now,
        };
        tables.users.insert(id, user.clone());
        tables.profiles.insert(
            id,
            UserProfile {
                user_id: id,
                bio: new_user.bio,
                avatar_url: new_user.avatar_url,
                created_at: now,
                updated_at: now,
            },
        );

        let department = user
            .department_id
            .and_then(|d| tables.department_with_company(d));
        let coach = tables.coach_of(&user);

        Ok(UserRecord {
            user,
            department,
            coach,
            clients: None,
        })
    }

    async fn update_profile(
        &self,
        user_id: UserId,
        changes: ProfileChanges,
    ) -> StoreResult<Option<ProfileWithUser>> {
        let mut tables = self.tables.write().await;

        let profile = match tables.profiles.get_mut(&user_id) {
            Some(profile) => profile,
            None => return Ok(None),
        };

        if let Some(bio) = changes.bio {
            profile.bio = Some(bio);
        }
        if let Some(avatar_url) = changes.avatar_url {
            profile.avatar_url = Some(avatar_url);
        }
        profile.updated_at = Utc::now();
        let profile = profile.clone();

        let user = match tables.users.get(&user_id) {
            Some(user) => user.clone(),
            None => return Ok(None),
        };

        Ok(Some(ProfileWithUser { profile, user }))
    }

    async fn delete_user(&self, id: UserId) -> StoreResult<bool> {
        let mut tables = self.tables.write().await;

        let existed = tables.users.remove(&id).is_some();
        if existed {
            tables.profiles.remove(&id);
            // Mirror the SET NULL foreign key on coach links
            for user in tables.users.values_mut() {
                if user.coach_id == Some(id) {
                    user.coach_id = None;
                }
            }
        }

        Ok(existed)
    }

    async fn assign_clients(
        &self,
        coach_id: UserId,
        client_ids: &[UserId],
    ) -> StoreResult<BulkUpdate> {
        let mut tables = self.tables.write().await;

        let coach_ok = tables
            .users
            .get(&coach_id)
            .map_or(false, |user| user.role == Role::Coach);
        if !coach_ok {
            return Err(StoreError::AssignmentConflict);
        }

        let all_clients = client_ids.iter().all(|id| {
            tables
                .users
                .get(id)
                .map_or(false, |user| user.role == Role::Client)
        });
        if !all_clients {
            return Err(StoreError::AssignmentConflict);
        }

        let now = Utc::now();
        let mut count = 0;
        for id in client_ids {
            if let Some(user) = tables.users.get_mut(id) {
                user.coach_id = Some(coach_id);
                user.updated_at = now;
                count += 1;
            }
        }

        Ok(BulkUpdate { count })
    }

    async fn ping(&self) -> StoreResult<()> {
        Ok(())
    }
}
