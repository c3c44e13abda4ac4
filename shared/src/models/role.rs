//! Role & Scope Model
//!
//! Roles are flat: holding `admin` does not imply `waiter`. The only bypass is
//! [`Role::SuperAdmin`], which is checked explicitly by the role policy.

use serde::{Deserialize, Deserializer, Serialize};
use std::collections::BTreeSet;
use std::fmt;
use std::str::FromStr;

/// Staff role (角色)
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Role {
    Waiter,
    Chef,
    Cashier,
    Admin,
    System,
    /// 超级管理员，绕过所有角色检查
    SuperAdmin,
}

impl Role {
    pub fn as_str(&self) -> &'static str {
        match self {
            Role::Waiter => "waiter",
            Role::Chef => "chef",
            Role::Cashier => "cashier",
            Role::Admin => "admin",
            Role::System => "system",
            Role::SuperAdmin => "super_admin",
        }
    }

    /// Privileged bypass marker
    pub fn is_privileged(&self) -> bool {
        matches!(self, Role::SuperAdmin)
    }

    /// Console scope this role operates under by default
    pub fn default_scope(&self) -> Scope {
        match self {
            Role::Waiter => Scope::Waiter,
            Role::Chef => Scope::Chef,
            Role::Cashier => Scope::Cashier,
            Role::Admin => Scope::Admin,
            Role::System | Role::SuperAdmin => Scope::System,
        }
    }
}

impl fmt::Display for Role {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Unknown role / scope name
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
#[error("unknown role: {0}")]
pub struct UnknownRole(pub String);

impl FromStr for Role {
    type Err = UnknownRole;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_ascii_lowercase().as_str() {
            "waiter" => Ok(Role::Waiter),
            "chef" => Ok(Role::Chef),
            "cashier" => Ok(Role::Cashier),
            "admin" => Ok(Role::Admin),
            "system" => Ok(Role::System),
            "super_admin" | "superadmin" => Ok(Role::SuperAdmin),
            other => Err(UnknownRole(other.to_string())),
        }
    }
}

/// Console namespace a token acts under (`/<scope>/...`)
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Scope {
    Waiter,
    Chef,
    Cashier,
    Admin,
    System,
}

impl Scope {
    pub const ALL: [Scope; 5] = [
        Scope::Waiter,
        Scope::Chef,
        Scope::Cashier,
        Scope::Admin,
        Scope::System,
    ];

    pub fn as_str(&self) -> &'static str {
        match self {
            Scope::Waiter => "waiter",
            Scope::Chef => "chef",
            Scope::Cashier => "cashier",
            Scope::Admin => "admin",
            Scope::System => "system",
        }
    }

    /// The role a request needs to hold to act under this scope
    pub fn role(&self) -> Role {
        match self {
            Scope::Waiter => Role::Waiter,
            Scope::Chef => Role::Chef,
            Scope::Cashier => Role::Cashier,
            Scope::Admin => Role::Admin,
            Scope::System => Role::System,
        }
    }

    /// Admin and system consoles may override workflow rules
    pub fn is_administrative(&self) -> bool {
        matches!(self, Scope::Admin | Scope::System)
    }

    /// Parse the first path segment of a request (`/waiter/api/...` → Waiter)
    pub fn from_path(path: &str) -> Option<Scope> {
        let first = path.trim_start_matches('/').split('/').next()?;
        Scope::ALL.into_iter().find(|s| s.as_str() == first)
    }
}

impl fmt::Display for Scope {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for Scope {
    type Err = UnknownRole;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.parse::<Role>()? {
            Role::SuperAdmin => Err(UnknownRole(s.to_string())),
            role => Ok(role.default_scope()),
        }
    }
}

/// Normalize `additional_roles` at the boundary.
///
/// Accepts `null`, a missing field (with `#[serde(default)]`), a JSON array of
/// role names, or a single comma-separated string. Always yields a set.
pub fn deserialize_roles<'de, D>(deserializer: D) -> Result<BTreeSet<Role>, D::Error>
where
    D: Deserializer<'de>,
{
    #[derive(Deserialize)]
    #[serde(untagged)]
    enum RawRoles {
        List(Vec<String>),
        Csv(String),
    }

    let raw = Option::<RawRoles>::deserialize(deserializer)?;
    let names: Vec<String> = match raw {
        None => Vec::new(),
        Some(RawRoles::List(list)) => list,
        Some(RawRoles::Csv(csv)) => csv.split(',').map(str::to_string).collect(),
    };

    names
        .iter()
        .map(|n| n.trim())
        .filter(|n| !n.is_empty())
        .map(|n| n.parse::<Role>().map_err(serde::de::Error::custom))
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[derive(Deserialize)]
    struct Holder {
        #[serde(default, deserialize_with = "deserialize_roles")]
        additional_roles: BTreeSet<Role>,
    }

    fn roles(json: &str) -> BTreeSet<Role> {
        serde_json::from_str::<Holder>(json).unwrap().additional_roles
    }

    #[test]
    fn test_additional_roles_normalization() {
        assert!(roles("{}").is_empty());
        assert!(roles(r#"{"additional_roles": null}"#).is_empty());
        assert!(roles(r#"{"additional_roles": []}"#).is_empty());
        assert!(roles(r#"{"additional_roles": ""}"#).is_empty());

        let set = roles(r#"{"additional_roles": ["chef", "cashier", "chef"]}"#);
        assert_eq!(set.len(), 2);
        assert!(set.contains(&Role::Chef) && set.contains(&Role::Cashier));

        let set = roles(r#"{"additional_roles": "waiter, admin"}"#);
        assert_eq!(set, BTreeSet::from([Role::Waiter, Role::Admin]));
    }

    #[test]
    fn test_unknown_role_rejected() {
        assert!(serde_json::from_str::<Holder>(r#"{"additional_roles": ["owner"]}"#).is_err());
    }

    #[test]
    fn test_scope_from_path() {
        assert_eq!(Scope::from_path("/waiter/api/orders/1"), Some(Scope::Waiter));
        assert_eq!(Scope::from_path("/admin"), Some(Scope::Admin));
        assert_eq!(Scope::from_path("/api/auth/me"), None);
        assert_eq!(Scope::from_path("/waiters/api"), None);
    }

    #[test]
    fn test_default_scope() {
        assert_eq!(Role::SuperAdmin.default_scope(), Scope::System);
        assert_eq!(Role::Chef.default_scope(), Scope::Chef);
        assert!("super_admin".parse::<Scope>().is_err());
        assert_eq!("cashier".parse::<Scope>().unwrap(), Scope::Cashier);
    }

    #[test]
    fn test_serde_names() {
        assert_eq!(serde_json::to_string(&Role::SuperAdmin).unwrap(), "\"super_admin\"");
        assert_eq!(serde_json::to_string(&Scope::System).unwrap(), "\"system\"");
    }
}
