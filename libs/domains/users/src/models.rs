use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use utoipa::ToSchema;

use crate::schema::UserFields;

/// Stored user record
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct User {
    /// Unique identifier (24-character hex ObjectId)
    #[schema(example = "65f1c0a2b3d4e5f6a7b8c9d0")]
    pub id: String,
    #[schema(example = "Jane")]
    pub first_name: String,
    #[schema(example = "Doe")]
    pub last_name: String,
    /// Exactly ten digits
    #[schema(example = "5551234567")]
    pub phone_number: String,
    /// Lowercased, unique across all users
    #[schema(example = "jane.doe@example.com")]
    pub email: String,
    #[schema(example = "1 Main St")]
    pub address: String,
    /// Creation timestamp
    pub created_at: DateTime<Utc>,
    /// Last update timestamp
    pub updated_at: DateTime<Utc>,
}

/// DTO for creating a new user
///
/// Every field is required; absent fields are reported by validation
/// rather than rejected during deserialization.
#[derive(Debug, Clone, Default, Serialize, Deserialize, ToSchema)]
#[serde(rename_all = "camelCase", default)]
pub struct CreateUser {
    #[schema(example = "Jane")]
    pub first_name: Option<String>,
    #[schema(example = "Doe")]
    pub last_name: Option<String>,
    #[schema(example = "5551234567")]
    pub phone_number: Option<String>,
    #[schema(example = "Jane.Doe@Example.com")]
    pub email: Option<String>,
    #[schema(example = "1 Main St")]
    pub address: Option<String>,
}

impl From<CreateUser> for UserFields {
    fn from(input: CreateUser) -> Self {
        UserFields {
            first_name: input.first_name.unwrap_or_default(),
            last_name: input.last_name.unwrap_or_default(),
            phone_number: input.phone_number.unwrap_or_default(),
            email: input.email.unwrap_or_default(),
            address: input.address.unwrap_or_default(),
        }
        .normalize()
    }
}

/// DTO for updating an existing user
///
/// Absent, null and empty-string fields keep their stored value.
#[derive(Debug, Clone, Default, Serialize, Deserialize, ToSchema)]
#[serde(rename_all = "camelCase", default)]
pub struct UpdateUser {
    pub first_name: Option<String>,
    pub last_name: Option<String>,
    pub phone_number: Option<String>,
    pub email: Option<String>,
    #[schema(example = "2 Side Ave")]
    pub address: Option<String>,
}

impl UpdateUser {
    /// Merges this update over `existing`, yielding the normalized field set
    /// to validate and store.
    pub fn apply_to(self, existing: &User) -> UserFields {
        fn pick(incoming: Option<String>, current: &str) -> String {
            match incoming {
                Some(value) if !value.is_empty() => value,
                _ => current.to_string(),
            }
        }

        UserFields {
            first_name: pick(self.first_name, &existing.first_name),
            last_name: pick(self.last_name, &existing.last_name),
            phone_number: pick(self.phone_number, &existing.phone_number),
            email: pick(self.email, &existing.email),
            address: pick(self.address, &existing.address),
        }
        .normalize()
    }
}

/// Confirmation returned by a successful delete
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, ToSchema)]
pub struct DeleteResponse {
    #[schema(example = "User removed")]
    pub message: String,
}

impl DeleteResponse {
    pub fn removed() -> Self {
        Self {
            message: "User removed".to_string(),
        }
    }
}
