//! Derived roles.

use serde::{Deserialize, Serialize};
use std::collections::BTreeSet;

use crate::router::Route;

/// The single role a signed-in user holds, derived from the backend's flags.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum Role {
    /// Regular club member
    User,
    /// Head coordinator of one or more clubs
    Admin,
    /// Platform administrator
    SuperAdmin,
}

impl Role {
    /// `is_admin` wins over `is_head_coordinator`.
    pub fn from_flags(is_admin: bool, is_head_coordinator: bool) -> Self {
        if is_admin {
            Role::SuperAdmin
        } else if is_head_coordinator {
            Role::Admin
        } else {
            Role::User
        }
    }

    /// Dashboard a user with this role lands on.
    pub fn home(&self) -> Route {
        match self {
            Role::User => Route::Dashboard,
            Role::Admin => Route::AdminDashboard,
            Role::SuperAdmin => Route::SuperAdminDashboard,
        }
    }

    pub fn is_elevated(&self) -> bool {
        matches!(self, Role::Admin | Role::SuperAdmin)
    }
}

impl std::fmt::Display for Role {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Role::User => write!(f, "user"),
            Role::Admin => write!(f, "admin"),
            Role::SuperAdmin => write!(f, "super-admin"),
        }
    }
}

impl std::str::FromStr for Role {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_lowercase().as_str() {
            "user" => Ok(Role::User),
            "admin" => Ok(Role::Admin),
            "super-admin" | "superadmin" | "super_admin" => Ok(Role::SuperAdmin),
            _ => Err(format!("Unknown role: {}", s)),
        }
    }
}

/// Roles a page accepts.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct RequiredRoles(BTreeSet<Role>);

impl RequiredRoles {
    pub fn of(roles: &[Role]) -> Self {
        Self(roles.iter().copied().collect())
    }

    pub fn contains(&self, role: Role) -> bool {
        self.0.contains(&role)
    }

    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }

    pub fn iter(&self) -> impl Iterator<Item = Role> + '_ {
        self.0.iter().copied()
    }
}

impl FromIterator<Role> for RequiredRoles {
    fn from_iter<I: IntoIterator<Item = Role>>(iter: I) -> Self {
        Self(iter.into_iter().collect())
    }
}

impl std::fmt::Display for RequiredRoles {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        let names: Vec<String> = self.iter().map(|r| r.to_string()).collect();
        write!(f, "[{}]", names.join(", "))
    }
}
