//! Admin Model

use serde::{Deserialize, Serialize};

pub const PERM_MANAGE_USERS: &str = "manage_users";
pub const PERM_MANAGE_GYMS: &str = "manage_gyms";
pub const PERM_VIEW_REPORTS: &str = "view_reports";
pub const PERM_MANAGE_TRANSACTIONS: &str = "manage_transactions";
pub const PERM_SYSTEM_SETTINGS: &str = "system_settings";

/// Granted to newly created admins
pub const DEFAULT_PERMISSIONS: [&str; 4] = [
    PERM_MANAGE_USERS,
    PERM_MANAGE_GYMS,
    PERM_VIEW_REPORTS,
    PERM_MANAGE_TRANSACTIONS,
];

/// Admin row (users joined with admins); permissions stored as JSON text
#[derive(Debug, Clone)]
#[cfg_attr(feature = "db", derive(sqlx::FromRow))]
pub struct Admin {
    pub id: i64,
    pub email: String,
    pub name: String,
    pub is_active: bool,
    pub permissions: String,
    pub created_at: i64,
    pub updated_at: i64,
}

impl Admin {
    pub fn permission_list(&self) -> Vec<String> {
        serde_json::from_str(&self.permissions).unwrap_or_default()
    }

    pub fn has_permission(&self, permission: &str) -> bool {
        self.permission_list().iter().any(|p| p == permission)
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct AdminProfile {
    pub id: i64,
    pub name: String,
    pub email: String,
    pub is_active: bool,
    pub permissions: Vec<String>,
    pub created_at: i64,
}

impl From<Admin> for AdminProfile {
    fn from(a: Admin) -> Self {
        let permissions = a.permission_list();
        Self {
            id: a.id,
            name: a.name,
            email: a.email,
            is_active: a.is_active,
            permissions,
            created_at: a.created_at,
        }
    }
}

pub fn default_permissions_json() -> String {
    serde_json::to_string(&DEFAULT_PERMISSIONS).unwrap_or_else(|_| "[]".to_string())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn default_permissions_exclude_system_settings() {
        let admin = Admin {
            id: 1,
            email: "root@fit.io".into(),
            name: "Root".into(),
            is_active: true,
            permissions: default_permissions_json(),
            created_at: 0,
            updated_at: 0,
        };
        assert!(admin.has_permission(PERM_MANAGE_GYMS));
        assert!(admin.has_permission(PERM_MANAGE_TRANSACTIONS));
        assert!(!admin.has_permission(PERM_SYSTEM_SETTINGS));
        assert_eq!(admin.permission_list().len(), 4);
    }
}
