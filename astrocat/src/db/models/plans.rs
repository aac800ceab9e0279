//! Database models for subscription plans.

use crate::types::PlanId;
use bon::Builder;
use chrono::{DateTime, Utc};
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};
use serde_with::rust::double_option;

/// Billing period, stored as TEXT
#[derive(Debug, Clone, Copy, Serialize, Deserialize, sqlx::Type, PartialEq, Eq, Hash)]
#[sqlx(type_name = "text", rename_all = "UPPERCASE")]
#[serde(rename_all = "UPPERCASE")]
pub enum PlanType {
    Monthly,
    Anual,
}

/// Database request for creating a new plan
#[derive(Debug, Clone, Builder)]
pub struct PlanCreateDBRequest {
    pub fee: Decimal,
    pub plan_type: PlanType,
    /// Maximum reservations per period; None means unlimited
    pub reservation_limit: Option<i32>,
}

/// Database request for updating a plan
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct PlanUpdateDBRequest {
    pub fee: Option<Decimal>,
    pub plan_type: Option<PlanType>,
    /// None = no change, Some(None) = make unlimited, Some(n) = set
    #[serde(default, skip_serializing_if = "Option::is_none", with = "double_option")]
    pub reservation_limit: Option<Option<i32>>,
}

/// Database response for a plan
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, sqlx::FromRow)]
pub struct PlanDBResponse {
    pub id: PlanId,
    pub fee: Decimal,
    #[sqlx(rename = "type")]
    #[serde(rename = "type")]
    pub plan_type: PlanType,
    pub reservation_limit: Option<i32>,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
    pub updated_by: String,
}
