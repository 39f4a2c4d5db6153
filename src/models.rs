use chrono::NaiveDate;
use serde::Deserialize;

/// One (date, team) observation from the daily activity log. The source file
/// has no header row; fields are in the file's fixed column order.
#[derive(Debug, Clone, Deserialize)]
pub struct ActivityRecord {
    pub ds: NaiveDate,
    pub team_id: i64,
    pub country: String,
    pub industry_id: i64,
    pub active_users: u64,
    pub messages_7d: u64,
}

/// Activity row enriched with the industry name from the reference map.
/// Rows without a matching industry keep `None`.
#[derive(Debug, Clone)]
pub struct JoinedRecord {
    pub ds: NaiveDate,
    pub team_id: i64,
    pub country: String,
    pub industry_id: i64,
    pub industry: Option<String>,
    pub active_users: u64,
    pub messages_7d: u64,
}

/// Industry ranking over the final week of the window.
#[derive(Debug, Clone)]
pub struct IndustryUsers {
    pub industry: String,
    pub active_users: u64,
    pub avg_daily_users: f64,
}

/// Average team size for a top country over the final month of the window.
#[derive(Debug, Clone)]
pub struct CountryTeamSize {
    pub country: String,
    pub countd_teams: usize,
    pub avg_team_sz: f64,
}

/// Per-day trend figures across the whole cleaned window.
#[derive(Debug, Clone)]
pub struct DailySummary {
    pub ds: NaiveDate,
    pub countd_teams: usize,
    pub total_active_users: u64,
    pub avg_team_users: f64,
    pub total_msgs_mm: f64,
    pub msgs_per_user: f64,
}

impl JoinedRecord {
    pub fn from_activity(record: ActivityRecord, industry: Option<String>) -> Self {
        JoinedRecord {
            ds: record.ds,
            team_id: record.team_id,
            country: record.country,
            industry_id: record.industry_id,
            industry,
            active_users: record.active_users,
            messages_7d: record.messages_7d,
        }
    }
}
