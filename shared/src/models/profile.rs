//! Role-specific user profile

use serde::{Deserialize, Serialize};

use super::admin::AdminProfile;
use super::gym::GymProfile;
use super::member::MemberProfile;
use super::user::Role;

/// A user together with its role extension, tagged by `role`
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(tag = "role", rename_all = "lowercase")]
pub enum UserProfile {
    Member(MemberProfile),
    Gym(GymProfile),
    Admin(AdminProfile),
}

impl UserProfile {
    pub fn role(&self) -> Role {
        match self {
            Self::Member(_) => Role::Member,
            Self::Gym(_) => Role::Gym,
            Self::Admin(_) => Role::Admin,
        }
    }

    pub fn id(&self) -> i64 {
        match self {
            Self::Member(m) => m.id,
            Self::Gym(g) => g.id,
            Self::Admin(a) => a.id,
        }
    }
}
