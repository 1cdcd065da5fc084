use async_trait::async_trait;
use chrono::{DateTime, SubsecRound, TimeDelta, Utc};
use mongodb::bson::oid::ObjectId;
use std::collections::HashMap;
use std::sync::Arc;
use tokio::sync::RwLock;

use crate::error::{UserError, UserResult};
use crate::models::User;
use crate::schema::UserFields;

/// Repository trait for User persistence
///
/// Callers pass fields that already passed [`UserFields::ensure_valid`].
/// Implementations enforce email uniqueness.
#[cfg_attr(test, mockall::automock)]
#[async_trait]
pub trait UserRepository: Send + Sync {
    /// Store a new user with a fresh id and equal timestamps
    async fn create(&self, fields: UserFields) -> UserResult<User>;

    /// All users, newest first
    async fn list(&self) -> UserResult<Vec<User>>;

    /// Get a user by ID
    async fn get_by_id(&self, id: ObjectId) -> UserResult<Option<User>>;

    /// Replace the five fields and bump `updated_at`, always past its previous value
    async fn update(&self, id: ObjectId, fields: UserFields) -> UserResult<User>;

    /// Delete a user by ID
    async fn delete(&self, id: ObjectId) -> UserResult<()>;
}

/// Timestamp for an update of a record last stamped at `previous`.
///
/// At least one millisecond after `previous`, so an update landing in the
/// same millisecond as the write before it still moves `updated_at`.
pub(crate) fn next_updated_at(previous: DateTime<Utc>) -> DateTime<Utc> {
    let now = Utc::now().trunc_subsecs(3);
    now.max(previous + TimeDelta::milliseconds(1))
}

/// In-memory implementation of UserRepository (for development/testing)
#[derive(Debug, Default, Clone)]
pub struct InMemoryUserRepository {
    users: Arc<RwLock<HashMap<ObjectId, User>>>,
}

impl InMemoryUserRepository {
    pub fn new() -> Self {
        Self {
            users: Arc::new(RwLock::new(HashMap::new())),
        }
    }
}

#[async_trait]
impl UserRepository for InMemoryUserRepository {
    async fn create(&self, fields: UserFields) -> UserResult<User> {
        let mut users = self.users.write().await;

        if users.values().any(|u| u.email == fields.email) {
            return Err(UserError::DuplicateEmail);
        }

        let id = ObjectId::new();
        // Millisecond precision, as MongoDB stores it
        let now = Utc::now().trunc_subsecs(3);
        let user = User {
            id: id.to_hex(),
            first_name: fields.first_name,
            last_name: fields.last_name,
            phone_number: fields.phone_number,
            email: fields.email,
            address: fields.address,
            created_at: now,
            updated_at: now,
        };
        users.insert(id, user.clone());

        tracing::info!(user_id = %user.id, email = %user.email, "Created user");
        Ok(user)
    }

    async fn list(&self) -> UserResult<Vec<User>> {
        let users = self.users.read().await;

        let mut result: Vec<(&ObjectId, &User)> = users.iter().collect();
        // ObjectIds grow monotonically within a process, so they break ties
        // between users created in the same millisecond.
        result.sort_by(|(a_id, a), (b_id, b)| {
            b.created_at.cmp(&a.created_at).then_with(|| b_id.cmp(a_id))
        });

        Ok(result.into_iter().map(|(_, user)| user.clone()).collect())
    }

    async fn get_by_id(&self, id: ObjectId) -> UserResult<Option<User>> {
        let users = self.users.read().await;
        Ok(users.get(&id).cloned())
    }

    async fn update(&self, id: ObjectId, fields: UserFields) -> UserResult<User> {
        let mut users = self.users.write().await;

        if users
            .iter()
            .any(|(other_id, u)| *other_id != id && u.email == fields.email)
        {
            return Err(UserError::DuplicateEmail);
        }

        let user = users.get_mut(&id).ok_or(UserError::NotFound)?;
        user.first_name = fields.first_name;
        user.last_name = fields.last_name;
        user.phone_number = fields.phone_number;
        user.email = fields.email;
        user.address = fields.address;
        user.updated_at = next_updated_at(user.updated_at);

        tracing::info!(user_id = %user.id, "Updated user");
        Ok(user.clone())
    }

    async fn delete(&self, id: ObjectId) -> UserResult<()> {
        let mut users = self.users.write().await;

        if users.remove(&id).is_none() {
            return Err(UserError::NotFound);
        }

        tracing::info!(user_id = %id, "Deleted user");
        Ok(())
    }
}
