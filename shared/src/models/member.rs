//! Member Model

use serde::{Deserialize, Serialize};

use super::plan::PlanId;

/// Member row (users joined with members)
#[derive(Debug, Clone)]
#[cfg_attr(feature = "db", derive(sqlx::FromRow))]
pub struct Member {
    pub id: i64,
    pub email: String,
    pub name: String,
    pub is_active: bool,
    pub tokens: i64,
    /// Bumped on every balance mutation
    pub balance_version: i64,
    pub subscription_plan: Option<PlanId>,
    pub subscription_start: Option<i64>,
    pub subscription_end: Option<i64>,
    pub subscription_active: bool,
    pub phone: Option<String>,
    pub address: Option<String>,
    pub date_of_birth: Option<String>,
    pub emergency_contact_name: Option<String>,
    pub emergency_contact_phone: Option<String>,
    pub created_at: i64,
    pub updated_at: i64,
}

impl Member {
    pub fn subscription(&self) -> Option<Subscription> {
        match (
            self.subscription_plan,
            self.subscription_start,
            self.subscription_end,
        ) {
            (Some(plan), Some(start_date), Some(end_date)) => Some(Subscription {
                plan,
                start_date,
                end_date,
                is_active: self.subscription_active,
            }),
            _ => None,
        }
    }

    pub fn emergency_contact(&self) -> Option<EmergencyContact> {
        if self.emergency_contact_name.is_none() && self.emergency_contact_phone.is_none() {
            return None;
        }
        Some(EmergencyContact {
            name: self.emergency_contact_name.clone(),
            phone: self.emergency_contact_phone.clone(),
        })
    }
}

/// Subscription window (epoch millis)
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct Subscription {
    pub plan: PlanId,
    pub start_date: i64,
    pub end_date: i64,
    pub is_active: bool,
}

impl Subscription {
    /// Active flag set and window not yet elapsed
    pub fn is_current(&self, now: i64) -> bool {
        self.is_active && self.end_date > now
    }
}

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct EmergencyContact {
    pub name: Option<String>,
    pub phone: Option<String>,
}

/// Member view returned by the API
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct MemberProfile {
    pub id: i64,
    pub name: String,
    pub email: String,
    pub is_active: bool,
    pub tokens: i64,
    pub balance_version: i64,
    pub subscription: Option<Subscription>,
    pub phone: Option<String>,
    pub address: Option<String>,
    pub date_of_birth: Option<String>,
    pub emergency_contact: Option<EmergencyContact>,
    pub created_at: i64,
}

impl From<Member> for MemberProfile {
    fn from(m: Member) -> Self {
        let subscription = m.subscription();
        let emergency_contact = m.emergency_contact();
        Self {
            id: m.id,
            name: m.name,
            email: m.email,
            is_active: m.is_active,
            tokens: m.tokens,
            balance_version: m.balance_version,
            subscription,
            phone: m.phone,
            address: m.address,
            date_of_birth: m.date_of_birth,
            emergency_contact,
            created_at: m.created_at,
        }
    }
}

/// Self-registration payload
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct RegisterMember {
    pub name: String,
    pub email: String,
    pub password: String,
    pub phone: Option<String>,
    pub address: Option<String>,
    pub date_of_birth: Option<String>,
    pub emergency_contact: Option<EmergencyContact>,
}

/// Admin update payload (balance is not editable here)
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct MemberUpdate {
    pub name: Option<String>,
    pub phone: Option<String>,
    pub address: Option<String>,
    pub date_of_birth: Option<String>,
    pub emergency_contact: Option<EmergencyContact>,
    pub is_active: Option<bool>,
}
