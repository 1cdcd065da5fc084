//! User Service - Business logic layer

use mongodb::bson::oid::ObjectId;
use std::sync::Arc;
use tracing::instrument;

use crate::error::{UserError, UserResult};
use crate::models::{CreateUser, UpdateUser, User};
use crate::repository::UserRepository;
use crate::schema::UserFields;

/// User service providing business logic operations
///
/// Normalizes and validates input before anything reaches the repository,
/// and resolves path ids to ObjectIds.
pub struct UserService<R: UserRepository> {
    repository: Arc<R>,
}

/// Ids that are not valid ObjectIds cannot match any user.
fn parse_id(id: &str) -> UserResult<ObjectId> {
    ObjectId::parse_str(id).map_err(|_| UserError::NotFound)
}

impl<R: UserRepository> UserService<R> {
    /// Create a new UserService with the given repository
    pub fn new(repository: R) -> Self {
        Self {
            repository: Arc::new(repository),
        }
    }

    /// Create a new user
    #[instrument(skip(self, input))]
    pub async fn create_user(&self, input: CreateUser) -> UserResult<User> {
        let fields = UserFields::from(input);
        fields.ensure_valid()?;

        self.repository.create(fields).await
    }

    /// List all users, newest first
    #[instrument(skip(self))]
    pub async fn list_users(&self) -> UserResult<Vec<User>> {
        self.repository.list().await
    }

    /// Get a user by ID
    #[instrument(skip(self))]
    pub async fn get_user(&self, id: &str) -> UserResult<User> {
        let id = parse_id(id)?;
        self.repository
            .get_by_id(id)
            .await?
            .ok_or(UserError::NotFound)
    }

    /// Update an existing user
    ///
    /// Fields absent from `input` keep their stored value; the merged result
    /// is validated as a whole.
    #[instrument(skip(self, input))]
    pub async fn update_user(&self, id: &str, input: UpdateUser) -> UserResult<User> {
        let id = parse_id(id)?;
        let existing = self
            .repository
            .get_by_id(id)
            .await?
            .ok_or(UserError::NotFound)?;

        let fields = input.apply_to(&existing);
        fields.ensure_valid()?;

        self.repository.update(id, fields).await
    }

    /// Delete a user
    #[instrument(skip(self))]
    pub async fn delete_user(&self, id: &str) -> UserResult<()> {
        let id = parse_id(id)?;
        self.repository.delete(id).await
    }
}

impl<R: UserRepository> Clone for UserService<R> {
    fn clone(&self) -> Self {
        Self {
            repository: Arc::clone(&self.repository),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::repository::MockUserRepository;
    use chrono::Utc;
    use mockall::predicate::eq;

    fn stored(id: ObjectId) -> User {
        let now = Utc::now();
        User {
            id: id.to_hex(),
            first_name: "Jane".into(),
            last_name: "Doe".into(),
            phone_number: "5551234567".into(),
            email: "jane.doe@example.com".into(),
            address: "1 Main St".into(),
            created_at: now,
            updated_at: now,
        }
    }

    fn jane() -> CreateUser {
        CreateUser {
            first_name: Some("Jane".into()),
            last_name: Some("Doe".into()),
            phone_number: Some("5551234567".into()),
            email: Some("Jane.Doe@Example.com".into()),
            address: Some("1 Main St".into()),
        }
    }

    #[tokio::test]
    async fn test_create_user_passes_normalized_fields() {
        let mut mock_repo = MockUserRepository::new();
        let id = ObjectId::new();

        mock_repo
            .expect_create()
            .withf(|fields| fields.email == "jane.doe@example.com")
            .times(1)
            .returning(move |_| Ok(stored(id)));

        let service = UserService::new(mock_repo);
        let user = service.create_user(jane()).await.unwrap();
        assert_eq!(user.id, id.to_hex());
    }

    #[tokio::test]
    async fn test_create_user_invalid_never_reaches_repository() {
        let mut mock_repo = MockUserRepository::new();
        mock_repo.expect_create().never();

        let service = UserService::new(mock_repo);
        let input = CreateUser {
            phone_number: Some("12345".into()),
            address: None,
            ..jane()
        };

        match service.create_user(input).await {
            Err(UserError::Validation(messages)) => assert_eq!(
                messages,
                vec!["12345 is not a valid phone number!", "Address is required"]
            ),
            other => panic!("expected validation error, got {other:?}"),
        }
    }

    #[tokio::test]
    async fn test_get_user_invalid_id_is_not_found_without_query() {
        let mut mock_repo = MockUserRepository::new();
        mock_repo.expect_get_by_id().never();

        let service = UserService::new(mock_repo);
        for id in ["not-an-id", "123", "zzzzzzzzzzzzzzzzzzzzzzzz"] {
            assert!(matches!(
                service.get_user(id).await,
                Err(UserError::NotFound)
            ));
        }
    }

    #[tokio::test]
    async fn test_get_user_missing() {
        let mut mock_repo = MockUserRepository::new();
        let id = ObjectId::new();

        mock_repo
            .expect_get_by_id()
            .with(eq(id))
            .times(1)
            .returning(|_| Ok(None));

        let service = UserService::new(mock_repo);
        assert!(matches!(
            service.get_user(&id.to_hex()).await,
            Err(UserError::NotFound)
        ));
    }

    #[tokio::test]
    async fn test_update_user_merges_over_existing() {
        let mut mock_repo = MockUserRepository::new();
        let id = ObjectId::new();

        mock_repo
            .expect_get_by_id()
            .with(eq(id))
            .returning(move |_| Ok(Some(stored(id))));
        mock_repo
            .expect_update()
            .withf(move |target, fields| {
                *target == id
                    && fields.address == "2 Side Ave"
                    && fields.first_name == "Jane"
                    && fields.email == "jane.doe@example.com"
            })
            .times(1)
            .returning(move |_, _| {
                let mut user = stored(id);
                user.address = "2 Side Ave".into();
                Ok(user)
            });

        let service = UserService::new(mock_repo);
        let input = UpdateUser {
            address: Some("2 Side Ave".into()),
            ..Default::default()
        };
        let user = service.update_user(&id.to_hex(), input).await.unwrap();
        assert_eq!(user.address, "2 Side Ave");
    }

    #[tokio::test]
    async fn test_update_user_missing_is_not_found() {
        let mut mock_repo = MockUserRepository::new();
        mock_repo.expect_get_by_id().returning(|_| Ok(None));
        mock_repo.expect_update().never();

        let service = UserService::new(mock_repo);
        let result = service
            .update_user(&ObjectId::new().to_hex(), UpdateUser::default())
            .await;
        assert!(matches!(result, Err(UserError::NotFound)));
    }

    #[tokio::test]
    async fn test_update_user_invalid_merge_is_rejected() {
        let mut mock_repo = MockUserRepository::new();
        let id = ObjectId::new();
        mock_repo
            .expect_get_by_id()
            .returning(move |_| Ok(Some(stored(id))));
        mock_repo.expect_update().never();

        let service = UserService::new(mock_repo);
        let input = UpdateUser {
            email: Some("nope".into()),
            ..Default::default()
        };
        match service.update_user(&id.to_hex(), input).await {
            Err(UserError::Validation(messages)) => {
                assert_eq!(messages, vec!["nope is not a valid email!"])
            }
            other => panic!("expected validation error, got {other:?}"),
        }
    }

    #[tokio::test]
    async fn test_delete_user_propagates_not_found() {
        let mut mock_repo = MockUserRepository::new();
        let id = ObjectId::new();
        mock_repo
            .expect_delete()
            .with(eq(id))
            .times(1)
            .returning(|_| Err(UserError::NotFound));

        let service = UserService::new(mock_repo);
        assert!(matches!(
            service.delete_user(&id.to_hex()).await,
            Err(UserError::NotFound)
        ));
    }

    #[tokio::test]
    async fn test_database_errors_propagate() {
        let mut mock_repo = MockUserRepository::new();
        mock_repo
            .expect_list()
            .returning(|| Err(UserError::Database("connection refused".into())));

        let service = UserService::new(mock_repo);
        assert!(matches!(
            service.list_users().await,
            Err(UserError::Database(_))
        ));
    }
}
