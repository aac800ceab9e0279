//! Aggregate reports for the admin dashboard.

use crate::types::CommunityId;
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

/// Bucket width for the time series of a report
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ReportGrouping {
    #[default]
    Day,
    /// ISO week, labelled like `2025-W07`
    Week,
    Month,
}

impl ReportGrouping {
    /// PostgreSQL `to_char` pattern producing the bucket label
    pub fn pg_format(&self) -> &'static str {
        match self {
            ReportGrouping::Day => "YYYY-MM-DD",
            ReportGrouping::Week => "IYYY-\"W\"IW",
            ReportGrouping::Month => "YYYY-MM",
        }
    }
}

/// Time window and grouping shared by every report. Unset bounds are open.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct ReportParams {
    pub from: Option<DateTime<Utc>>,
    pub to: Option<DateTime<Utc>>,
    pub group_by: ReportGrouping,
}

/// Count for one time bucket
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ReportBucket {
    pub date: String,
    pub count: i64,
}

/// Membership and engagement figures for one community.
///
/// Memberships count when they overlap the window; reservations when their
/// `reservation_time` falls inside it. A member is active when they booked at least one
/// reservation through a membership of this community.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, sqlx::FromRow)]
pub struct CommunityReportRow {
    pub community_id: CommunityId,
    pub community_name: String,
    pub total: i64,
    pub active_memberships: i64,
    pub expired_memberships: i64,
    pub cancelled_memberships: i64,
    pub active_users: i64,
    pub inactive_users: i64,
    pub total_reservations: i64,
    pub monthly_plans: i64,
    pub annual_plans: i64,
    /// Memberships bucketed by start date
    #[sqlx(skip)]
    pub data: Vec<ReportBucket>,
}

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct CommunityReport {
    /// Memberships across every community
    pub total: i64,
    pub communities: Vec<CommunityReportRow>,
}

/// Reservations booked for one service
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ServiceReportRow {
    /// Service name, or [`UNKNOWN_SERVICE`] when the session has no live service
    pub service_name: String,
    pub total: i64,
    /// Reservations bucketed by reservation time
    pub data: Vec<ReportBucket>,
}

/// Label for reservations whose session is not linked to a live service
pub const UNKNOWN_SERVICE: &str = "Unknown";

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct ServiceReport {
    /// Reservations across every service
    pub total: i64,
    pub services: Vec<ServiceReportRow>,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_grouping_defaults_to_day() {
        assert_eq!(ReportParams::default().group_by, ReportGrouping::Day);
        let params: ReportParams = serde_json::from_str(r#"{"group_by": "week"}"#).unwrap();
        assert_eq!(params.group_by, ReportGrouping::Week);
        assert_eq!(params.from, None);
    }
}
