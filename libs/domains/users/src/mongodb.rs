//! MongoDB implementation of UserRepository

use async_trait::async_trait;
use chrono::{DateTime, Utc};
use futures_util::TryStreamExt;
use mongodb::{
    Collection, Database, IndexModel,
    bson::{self, Document, doc, oid::ObjectId},
    options::{IndexOptions, ReturnDocument},
};
use serde::{Deserialize, Serialize};
use tokio::sync::OnceCell;
use tracing::instrument;

use crate::error::{UserError, UserResult};
use crate::models::User;
use crate::repository::UserRepository;
use crate::schema::UserFields;

/// Collection holding user documents
pub const COLLECTION_NAME: &str = "users";

/// Name of the unique index on `email`
pub const EMAIL_INDEX_NAME: &str = "email_unique";

/// Shape of a user as stored in MongoDB
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
struct UserDocument {
    #[serde(rename = "_id")]
    id: ObjectId,
    first_name: String,
    last_name: String,
    phone_number: String,
    email: String,
    address: String,
    created_at: bson::DateTime,
    updated_at: bson::DateTime,
}

impl UserDocument {
    fn new(fields: UserFields, now: bson::DateTime) -> Self {
        Self {
            id: ObjectId::new(),
            first_name: fields.first_name,
            last_name: fields.last_name,
            phone_number: fields.phone_number,
            email: fields.email,
            address: fields.address,
            created_at: now,
            updated_at: now,
        }
    }
}

/// Aggregation-pipeline update replacing the five fields.
///
/// `updatedAt` becomes `now`, or one millisecond past its stored value when
/// that is not earlier. Field values are wrapped in `$literal` so strings
/// starting with `$` are never read as field paths.
fn update_pipeline(fields: UserFields, now: bson::DateTime) -> Vec<Document> {
    vec![doc! {
        "$set": {
            "firstName": { "$literal": fields.first_name },
            "lastName": { "$literal": fields.last_name },
            "phoneNumber": { "$literal": fields.phone_number },
            "email": { "$literal": fields.email },
            "address": { "$literal": fields.address },
            "updatedAt": { "$max": [now, { "$add": ["$updatedAt", 1_i64] }] },
        }
    }]
}

fn to_chrono(value: bson::DateTime) -> DateTime<Utc> {
    DateTime::from_timestamp_millis(value.timestamp_millis()).unwrap_or_default()
}

impl From<UserDocument> for User {
    fn from(doc: UserDocument) -> Self {
        User {
            id: doc.id.to_hex(),
            first_name: doc.first_name,
            last_name: doc.last_name,
            phone_number: doc.phone_number,
            email: doc.email,
            address: doc.address,
            created_at: to_chrono(doc.created_at),
            updated_at: to_chrono(doc.updated_at),
        }
    }
}

/// MongoDB implementation of the UserRepository
pub struct MongoUserRepository {
    collection: Collection<UserDocument>,
    indexes: OnceCell<()>,
}

impl MongoUserRepository {
    /// Create a new MongoUserRepository
    ///
    /// # Example
    /// ```ignore
    /// let client = database::mongodb::create_client(&config).await?;
    /// let repo = MongoUserRepository::new(&database::mongodb::database(&client, &config));
    /// ```
    pub fn new(db: &Database) -> Self {
        Self {
            collection: db.collection::<UserDocument>(COLLECTION_NAME),
            indexes: OnceCell::new(),
        }
    }

    /// Create the unique email index if it does not exist yet.
    ///
    /// Succeeds at most once per repository; after a failure the next write
    /// tries again.
    #[instrument(skip(self))]
    pub async fn ensure_indexes(&self) -> UserResult<()> {
        self.indexes
            .get_or_try_init(|| async {
                let index = IndexModel::builder()
                    .keys(doc! { "email": 1 })
                    .options(
                        IndexOptions::builder()
                            .name(EMAIL_INDEX_NAME.to_string())
                            .unique(true)
                            .build(),
                    )
                    .build();

                self.collection
                    .create_index(index)
                    .await
                    .map_err(|e| UserError::Database(e.to_string()))?;

                tracing::info!(index = EMAIL_INDEX_NAME, "Ensured user indexes");
                Ok::<(), UserError>(())
            })
            .await?;

        Ok(())
    }
}

#[async_trait]
impl UserRepository for MongoUserRepository {
    #[instrument(skip(self, fields), fields(email = %fields.email))]
    async fn create(&self, fields: UserFields) -> UserResult<User> {
        self.ensure_indexes().await?;

        let document = UserDocument::new(fields, bson::DateTime::now());
        self.collection.insert_one(&document).await?;

        tracing::info!(user_id = %document.id, "User created successfully");
        Ok(document.into())
    }

    #[instrument(skip(self))]
    async fn list(&self) -> UserResult<Vec<User>> {
        let cursor = self
            .collection
            .find(doc! {})
            .sort(doc! { "createdAt": -1, "_id": -1 })
            .await?;
        let documents: Vec<UserDocument> = cursor.try_collect().await?;

        Ok(documents.into_iter().map(User::from).collect())
    }

    #[instrument(skip(self))]
    async fn get_by_id(&self, id: ObjectId) -> UserResult<Option<User>> {
        let document = self.collection.find_one(doc! { "_id": id }).await?;
        Ok(document.map(User::from))
    }

    #[instrument(skip(self, fields))]
    async fn update(&self, id: ObjectId, fields: UserFields) -> UserResult<User> {
        self.ensure_indexes().await?;

        let update = update_pipeline(fields, bson::DateTime::now());

        let document = self
            .collection
            .find_one_and_update(doc! { "_id": id }, update)
            .return_document(ReturnDocument::After)
            .await?
            .ok_or(UserError::NotFound)?;

        tracing::info!(user_id = %id, "User updated successfully");
        Ok(document.into())
    }

    #[instrument(skip(self))]
    async fn delete(&self, id: ObjectId) -> UserResult<()> {
        let result = self.collection.delete_one(doc! { "_id": id }).await?;

        if result.deleted_count == 0 {
            return Err(UserError::NotFound);
        }

        tracing::info!(user_id = %id, "User deleted successfully");
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn fields() -> UserFields {
        UserFields {
            first_name: "Jane".into(),
            last_name: "Doe".into(),
            phone_number: "5551234567".into(),
            email: "jane.doe@example.com".into(),
            address: "1 Main St".into(),
        }
    }

    #[test]
    fn test_update_pipeline_sets_literals_and_advances_updated_at() {
        let now = bson::DateTime::from_millis(1_700_000_000_000);
        let mut changed = fields();
        changed.address = "$where".into();

        let pipeline = update_pipeline(changed, now);
        assert_eq!(pipeline.len(), 1);

        let set = pipeline[0].get_document("$set").unwrap();
        assert_eq!(
            set.get_document("address").unwrap(),
            &doc! { "$literal": "$where" }
        );
        assert_eq!(
            set.get_document("email").unwrap(),
            &doc! { "$literal": "jane.doe@example.com" }
        );
        assert_eq!(
            set.get_document("updatedAt").unwrap(),
            &doc! { "$max": [now, { "$add": ["$updatedAt", 1_i64] }] }
        );
        assert!(!set.contains_key("createdAt"));
    }

    #[test]
    fn test_document_field_names() {
        let document = UserDocument::new(fields(), bson::DateTime::now());
        let bson_doc = bson::to_document(&document).unwrap();

        for key in [
            "_id",
            "firstName",
            "lastName",
            "phoneNumber",
            "email",
            "address",
            "createdAt",
            "updatedAt",
        ] {
            assert!(bson_doc.contains_key(key), "missing {key}");
        }
        assert!(bson_doc.get_object_id("_id").is_ok());
        assert!(bson_doc.get_datetime("createdAt").is_ok());
    }

    #[test]
    fn test_document_into_user() {
        let now = bson::DateTime::from_millis(1_700_000_000_123);
        let document = UserDocument::new(fields(), now);
        let id = document.id;

        let user = User::from(document);
        assert_eq!(user.id, id.to_hex());
        assert_eq!(user.email, "jane.doe@example.com");
        assert_eq!(user.created_at.timestamp_millis(), 1_700_000_000_123);
        assert_eq!(user.created_at, user.updated_at);
    }

    async fn live_repository() -> MongoUserRepository {
        let url = std::env::var("MONGO_URI")
            .unwrap_or_else(|_| "mongodb://localhost:27017".to_string());
        let client = mongodb::Client::with_uri_str(&url).await.unwrap();
        let db = client.database(&format!("users_test_{}", ObjectId::new().to_hex()));
        MongoUserRepository::new(&db)
    }

    #[tokio::test]
    #[ignore] // Requires actual MongoDB
    async fn test_live_duplicate_email_is_reported() {
        let repo = live_repository().await;
        repo.create(fields()).await.unwrap();

        let result = repo.create(fields()).await;
        assert!(matches!(result, Err(UserError::DuplicateEmail)));
    }

    #[tokio::test]
    #[ignore] // Requires actual MongoDB
    async fn test_live_crud_roundtrip() {
        let repo = live_repository().await;
        let created = repo.create(fields()).await.unwrap();
        let id = ObjectId::parse_str(&created.id).unwrap();

        let mut changed = fields();
        changed.address = "2 Side Ave".into();
        let updated = repo.update(id, changed).await.unwrap();
        assert_eq!(updated.address, "2 Side Ave");
        assert_eq!(updated.created_at, created.created_at);
        assert!(updated.updated_at > created.updated_at);

        assert_eq!(repo.list().await.unwrap().len(), 1);
        repo.delete(id).await.unwrap();
        assert!(repo.get_by_id(id).await.unwrap().is_none());
        assert!(matches!(repo.delete(id).await, Err(UserError::NotFound)));
    }
}
