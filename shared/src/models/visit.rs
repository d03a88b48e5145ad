//! Visit Model

use serde::{Deserialize, Serialize};

/// One visit per (member, gym, calendar day)
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[cfg_attr(feature = "db", derive(sqlx::FromRow))]
pub struct Visit {
    pub id: i64,
    pub member_id: i64,
    pub gym_id: i64,
    /// Server-local calendar day, `YYYY-MM-DD`
    pub visit_date: String,
    pub check_in_time: i64,
    pub check_out_time: Option<i64>,
    pub tokens_used: i64,
    pub notes: Option<String>,
    pub created_at: i64,
}

/// Visit joined with gym name and location (member views)
#[derive(Debug, Clone, Serialize, Deserialize)]
#[cfg_attr(feature = "db", derive(sqlx::FromRow))]
pub struct VisitWithGym {
    #[serde(flatten)]
    #[cfg_attr(feature = "db", sqlx(flatten))]
    pub visit: Visit,
    pub gym_name: String,
    pub gym_code: String,
    pub gym_address: String,
    pub gym_city: String,
}

/// Visit joined with member name and email (gym views)
#[derive(Debug, Clone, Serialize, Deserialize)]
#[cfg_attr(feature = "db", derive(sqlx::FromRow))]
pub struct VisitWithMember {
    #[serde(flatten)]
    #[cfg_attr(feature = "db", sqlx(flatten))]
    pub visit: Visit,
    pub member_name: String,
    pub member_email: String,
}

/// Visit joined with both parties (admin views)
#[derive(Debug, Clone, Serialize, Deserialize)]
#[cfg_attr(feature = "db", derive(sqlx::FromRow))]
pub struct VisitDetail {
    #[serde(flatten)]
    #[cfg_attr(feature = "db", sqlx(flatten))]
    pub visit: Visit,
    pub member_name: String,
    pub member_email: String,
    pub gym_name: String,
    pub gym_code: String,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum CheckInOutcome {
    /// New visit recorded, one token debited
    Created,
    /// Visit already existed for today, nothing debited
    AlreadyCheckedIn,
}

/// Check-in result
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct CheckIn {
    pub visit: VisitWithGym,
    pub remaining_tokens: i64,
    pub outcome: CheckInOutcome,
}

impl CheckIn {
    pub fn message(&self) -> &'static str {
        match self.outcome {
            CheckInOutcome::Created => "Check-in successful",
            CheckInOutcome::AlreadyCheckedIn => "Already checked in to this gym today",
        }
    }
}
