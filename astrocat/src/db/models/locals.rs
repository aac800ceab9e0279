//! Database models for locals (physical venues).

use crate::types::LocalId;
use bon::Builder;
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

/// Database request for creating a new local
#[derive(Debug, Clone, Builder)]
#[builder(on(String, into))]
pub struct LocalCreateDBRequest {
    pub local_name: String,
    pub street_name: String,
    pub building_number: String,
    pub district: String,
    pub province: String,
    pub region: String,
    #[builder(default)]
    pub reference: String,
    pub capacity: i32,
    #[builder(default)]
    pub image_url: String,
}

/// Database request for updating a local
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct LocalUpdateDBRequest {
    pub local_name: Option<String>,
    pub street_name: Option<String>,
    pub building_number: Option<String>,
    pub district: Option<String>,
    pub province: Option<String>,
    pub region: Option<String>,
    pub reference: Option<String>,
    pub capacity: Option<i32>,
    pub image_url: Option<String>,
}

/// Database response for a local
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, sqlx::FromRow)]
pub struct LocalDBResponse {
    pub id: LocalId,
    pub local_name: String,
    pub street_name: String,
    pub building_number: String,
    pub district: String,
    pub province: String,
    pub region: String,
    pub reference: String,
    pub capacity: i32,
    pub image_url: String,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
    pub updated_by: String,
}
