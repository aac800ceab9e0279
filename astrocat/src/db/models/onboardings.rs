//! Database models for user onboarding profiles.

use crate::types::{OnboardingId, UserId};
use bon::Builder;
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

/// Identity document kind, stored as TEXT
#[derive(Debug, Clone, Copy, Serialize, Deserialize, sqlx::Type, PartialEq, Eq, Hash)]
#[sqlx(type_name = "text", rename_all = "SCREAMING_SNAKE_CASE")]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum DocumentType {
    Dni,
    ForeignerCard,
}

/// Database request for creating an onboarding profile
#[derive(Debug, Clone, Builder)]
#[builder(on(String, into))]
pub struct OnboardingCreateDBRequest {
    pub user_id: UserId,
    pub phone_number: String,
    pub document_type: DocumentType,
    pub document_number: String,
    pub street_name: String,
    pub building_number: String,
    pub district: String,
    pub province: String,
    pub region: String,
    #[builder(default)]
    pub reference: String,
}

/// Database request for updating an onboarding profile
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct OnboardingUpdateDBRequest {
    pub phone_number: Option<String>,
    pub document_type: Option<DocumentType>,
    pub document_number: Option<String>,
    pub street_name: Option<String>,
    pub building_number: Option<String>,
    pub district: Option<String>,
    pub province: Option<String>,
    pub region: Option<String>,
    pub reference: Option<String>,
}

/// Database response for an onboarding profile
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, sqlx::FromRow)]
pub struct OnboardingDBResponse {
    pub id: OnboardingId,
    pub user_id: UserId,
    pub phone_number: String,
    pub document_type: DocumentType,
    pub document_number: String,
    pub street_name: String,
    pub building_number: String,
    pub district: String,
    pub province: String,
    pub region: String,
    pub reference: String,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
    pub updated_by: String,
}
