//! Database models for users.

use crate::types::UserId;
use bon::Builder;
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use serde_with::rust::double_option;

/// Account role, stored as TEXT
#[derive(Debug, Clone, Copy, Serialize, Deserialize, sqlx::Type, PartialEq, Eq, Hash)]
#[sqlx(type_name = "text", rename_all = "UPPERCASE")]
#[serde(rename_all = "UPPERCASE")]
pub enum UserRole {
    Admin,
    Client,
}

impl UserRole {
    pub fn as_str(&self) -> &'static str {
        match self {
            UserRole::Admin => "ADMIN",
            UserRole::Client => "CLIENT",
        }
    }
}

/// Database request for creating a new user
#[derive(Debug, Clone, Builder)]
#[builder(on(String, into))]
pub struct UserCreateDBRequest {
    pub name: String,
    pub first_last_name: String,
    pub second_last_name: Option<String>,
    /// Already-hashed password; hashing happens in the authentication layer
    pub password_hash: String,
    pub email: String,
    pub role: UserRole,
    #[builder(default)]
    pub image_url: String,
}

/// Database request for updating a user
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct UserUpdateDBRequest {
    pub name: Option<String>,
    pub first_last_name: Option<String>,
    /// None = no change, Some(None) = clear, Some(name) = set
    #[serde(default, skip_serializing_if = "Option::is_none", with = "double_option")]
    pub second_last_name: Option<Option<String>>,
    pub password_hash: Option<String>,
    pub email: Option<String>,
    pub role: Option<UserRole>,
    pub image_url: Option<String>,
}

/// Database response for a user
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, sqlx::FromRow)]
pub struct UserDBResponse {
    pub id: UserId,
    pub name: String,
    pub first_last_name: String,
    pub second_last_name: Option<String>,
    #[serde(skip_serializing)]
    pub password_hash: String,
    pub email: String,
    pub role: UserRole,
    pub image_url: String,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
    pub updated_by: String,
}
