//! Database models for services offered by communities.

use crate::types::ServiceId;
use bon::Builder;
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

/// Database request for creating a new service
#[derive(Debug, Clone, Builder)]
#[builder(on(String, into))]
pub struct ServiceCreateDBRequest {
    pub name: String,
    #[builder(default)]
    pub description: String,
    #[builder(default)]
    pub image_url: String,
    #[builder(default)]
    pub is_virtual: bool,
}

/// Database request for updating a service
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct ServiceUpdateDBRequest {
    pub name: Option<String>,
    pub description: Option<String>,
    pub image_url: Option<String>,
    pub is_virtual: Option<bool>,
}

/// Database response for a service
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, sqlx::FromRow)]
pub struct ServiceDBResponse {
    pub id: ServiceId,
    pub name: String,
    pub description: String,
    pub image_url: String,
    pub is_virtual: bool,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
    pub updated_by: String,
}
