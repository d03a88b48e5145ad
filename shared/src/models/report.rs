//! Dashboard and report payloads

use serde::{Deserialize, Serialize};

use super::gym::{GymProfile, Location};
use super::member::Subscription;
use super::plan::{PlanId, SubscriptionPlan};
use super::visit::{VisitDetail, VisitWithGym, VisitWithMember};

/// Reporting window, counted back from now
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ReportPeriod {
    /// Since local midnight
    Daily,
    Weekly,
    #[default]
    Monthly,
    Yearly,
}

impl ReportPeriod {
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Daily => "daily",
            Self::Weekly => "weekly",
            Self::Monthly => "monthly",
            Self::Yearly => "yearly",
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
pub struct VisitStats {
    pub today: i64,
    pub this_week: i64,
    pub this_month: i64,
    pub this_year: i64,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct MemberSummary {
    pub name: String,
    pub email: String,
    pub tokens: i64,
    pub subscription: Option<Subscription>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct RecentGym {
    pub id: i64,
    pub name: String,
    pub gym_code: String,
    pub location: Location,
}

#[derive(Debug, Clone, Serialize)]
pub struct MemberDashboard {
    pub member: MemberSummary,
    pub recent_visits: Vec<VisitWithGym>,
    pub recent_gyms: Vec<RecentGym>,
    pub visit_stats: VisitStats,
    pub subscription_plans: &'static [SubscriptionPlan],
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct GymDashboard {
    pub gym: GymProfile,
    pub visit_stats: VisitStats,
    pub recent_visits: Vec<VisitWithMember>,
    pub unique_members: i64,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct GymReport {
    pub period: ReportPeriod,
    pub start_date: i64,
    pub end_date: i64,
    pub total_visits: i64,
    pub visits: Vec<VisitWithMember>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct AdminStats {
    pub total_members: i64,
    pub total_gyms: i64,
    pub total_visits: i64,
    #[serde(with = "super::money")]
    pub total_revenue: i64,
    pub active_subscriptions: i64,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct AdminDashboard {
    pub stats: AdminStats,
    pub recent_visits: Vec<VisitDetail>,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[cfg_attr(feature = "db", derive(sqlx::FromRow))]
pub struct GymVisitSummary {
    pub gym_id: i64,
    pub gym_name: String,
    pub gym_code: String,
    pub total_visits: i64,
    pub total_tokens: i64,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[cfg_attr(feature = "db", derive(sqlx::FromRow))]
pub struct PlanRevenue {
    pub plan: PlanId,
    #[serde(with = "super::money")]
    pub total_revenue: i64,
    pub total_transactions: i64,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct GlobalReport {
    pub period: ReportPeriod,
    pub start_date: i64,
    pub end_date: i64,
    pub visits_by_gym: Vec<GymVisitSummary>,
    pub revenue_by_plan: Vec<PlanRevenue>,
}
