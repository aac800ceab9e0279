//! Database models for professionals (trainers and medics).

use crate::types::ProfessionalId;
use bon::Builder;
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use serde_with::rust::double_option;

/// Professional category, stored as TEXT
#[derive(Debug, Clone, Copy, Serialize, Deserialize, sqlx::Type, PartialEq, Eq, Hash)]
#[sqlx(type_name = "text", rename_all = "SCREAMING_SNAKE_CASE")]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum ProfessionalType {
    Medic,
    GymTrainer,
    YogaTrainer,
}

/// Database request for creating a new professional
#[derive(Debug, Clone, Builder)]
#[builder(on(String, into))]
pub struct ProfessionalCreateDBRequest {
    pub name: String,
    pub first_last_name: String,
    pub second_last_name: Option<String>,
    pub specialty: String,
    pub email: String,
    pub phone_number: String,
    pub professional_type: ProfessionalType,
    #[builder(default)]
    pub image_url: String,
}

/// Database request for updating a professional
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct ProfessionalUpdateDBRequest {
    pub name: Option<String>,
    pub first_last_name: Option<String>,
    /// None = no change, Some(None) = clear, Some(name) = set
    #[serde(default, skip_serializing_if = "Option::is_none", with = "double_option")]
    pub second_last_name: Option<Option<String>>,
    pub specialty: Option<String>,
    pub email: Option<String>,
    pub phone_number: Option<String>,
    pub professional_type: Option<ProfessionalType>,
    pub image_url: Option<String>,
}

/// Database response for a professional
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, sqlx::FromRow)]
pub struct ProfessionalDBResponse {
    pub id: ProfessionalId,
    pub name: String,
    pub first_last_name: String,
    pub second_last_name: Option<String>,
    pub specialty: String,
    pub email: String,
    pub phone_number: String,
    #[sqlx(rename = "type")]
    #[serde(rename = "type")]
    pub professional_type: ProfessionalType,
    pub image_url: String,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
    pub updated_by: String,
}
