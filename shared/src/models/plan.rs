//! Subscription Plan Catalog
//!
//! The catalog is fixed and compiled in. Prices are held in cents and exposed
//! as two-place decimals.

use rust_decimal::Decimal;
use rust_decimal::prelude::ToPrimitive;
use serde::ser::SerializeStruct;
use serde::{Deserialize, Serialize, Serializer};

/// Subscription plan identifier
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
#[cfg_attr(feature = "db", derive(sqlx::Type))]
#[cfg_attr(feature = "db", sqlx(rename_all = "lowercase"))]
pub enum PlanId {
    Weekly,
    Monthly,
    Yearly,
}

impl PlanId {
    /// Parse from database string value (lowercase)
    pub fn from_db(s: &str) -> Option<Self> {
        match s {
            "weekly" => Some(Self::Weekly),
            "monthly" => Some(Self::Monthly),
            "yearly" => Some(Self::Yearly),
            _ => None,
        }
    }

    /// Database string representation (lowercase)
    pub fn as_db(&self) -> &'static str {
        match self {
            Self::Weekly => "weekly",
            Self::Monthly => "monthly",
            Self::Yearly => "yearly",
        }
    }

    /// Catalog entry for this plan
    pub fn plan(&self) -> &'static SubscriptionPlan {
        match self {
            Self::Weekly => &PLANS[0],
            Self::Monthly => &PLANS[1],
            Self::Yearly => &PLANS[2],
        }
    }
}

/// Catalog entry
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SubscriptionPlan {
    pub id: PlanId,
    pub name: &'static str,
    pub tokens: i64,
    pub price_cents: i64,
    pub duration_days: i64,
    pub popular: bool,
}

impl SubscriptionPlan {
    pub fn price(&self) -> Decimal {
        Decimal::new(self.price_cents, 2)
    }

    /// Subscription length in milliseconds
    pub fn duration_millis(&self) -> i64 {
        self.duration_days * crate::util::DAY_MILLIS
    }
}

impl Serialize for SubscriptionPlan {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        let mut s = serializer.serialize_struct("SubscriptionPlan", 6)?;
        s.serialize_field("id", &self.id)?;
        s.serialize_field("name", self.name)?;
        s.serialize_field("tokens", &self.tokens)?;
        s.serialize_field("price", &self.price().to_f64())?;
        s.serialize_field("duration", &self.duration_days)?;
        s.serialize_field("popular", &self.popular)?;
        s.end()
    }
}

pub static PLANS: [SubscriptionPlan; 3] = [
    SubscriptionPlan {
        id: PlanId::Weekly,
        name: "Weekly Pass",
        tokens: 7,
        price_cents: 2999,
        duration_days: 7,
        popular: false,
    },
    SubscriptionPlan {
        id: PlanId::Monthly,
        name: "Monthly Pass",
        tokens: 30,
        price_cents: 9999,
        duration_days: 30,
        popular: true,
    },
    SubscriptionPlan {
        id: PlanId::Yearly,
        name: "Yearly Pass",
        tokens: 365,
        price_cents: 99999,
        duration_days: 365,
        popular: false,
    },
];

/// Look up a plan by its wire id ("weekly", "monthly", "yearly")
pub fn find_plan(id: &str) -> Option<&'static SubscriptionPlan> {
    PlanId::from_db(id).map(|p| p.plan())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn catalog_matches_published_plans() {
        let monthly = find_plan("monthly").unwrap();
        assert_eq!(monthly.name, "Monthly Pass");
        assert_eq!(monthly.tokens, 30);
        assert_eq!(monthly.price(), Decimal::new(9999, 2));
        assert_eq!(monthly.duration_days, 30);
        assert!(monthly.popular);

        assert_eq!(find_plan("weekly").unwrap().price(), Decimal::new(2999, 2));
        assert_eq!(find_plan("yearly").unwrap().tokens, 365);
        assert_eq!(find_plan("yearly").unwrap().price(), Decimal::new(99999, 2));
    }

    #[test]
    fn unknown_plan_is_rejected() {
        assert!(find_plan("daily").is_none());
        assert!(find_plan("Monthly").is_none());
        assert!(find_plan("").is_none());
    }

    #[test]
    fn plan_id_points_at_its_own_entry() {
        for plan in &PLANS {
            assert_eq!(plan.id.plan(), plan);
        }
    }

    #[test]
    fn plan_serializes_price_as_number() {
        let json = serde_json::to_value(PlanId::Weekly.plan()).unwrap();
        assert_eq!(json["id"], "weekly");
        assert_eq!(json["price"], serde_json::json!(29.99));
        assert_eq!(json["duration"], 7);
    }
}
