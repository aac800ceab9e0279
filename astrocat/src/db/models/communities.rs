//! Database models for communities.

use crate::types::CommunityId;
use bon::Builder;
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

/// Database request for creating a new community
#[derive(Debug, Clone, Builder)]
#[builder(on(String, into))]
pub struct CommunityCreateDBRequest {
    pub name: String,
    #[builder(default)]
    pub purpose: String,
    #[builder(default)]
    pub image_url: String,
}

/// Database request for updating a community
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct CommunityUpdateDBRequest {
    pub name: Option<String>,
    pub purpose: Option<String>,
    pub image_url: Option<String>,
    pub number_subscriptions: Option<i32>,
}

/// Database response for a community
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, sqlx::FromRow)]
pub struct CommunityDBResponse {
    pub id: CommunityId,
    pub name: String,
    pub purpose: String,
    pub image_url: String,
    pub number_subscriptions: i32,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
    pub updated_by: String,
}
