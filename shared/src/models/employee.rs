//! Employee Model

use super::role::{Role, deserialize_roles};
use serde::{Deserialize, Serialize};
use std::collections::BTreeSet;

/// Employee entity (员工)
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Employee {
    pub id: u64,
    pub email: String,
    pub display_name: String,
    /// Argon2 PHC string
    pub password_hash: String,
    pub primary_role: Role,
    #[serde(default, deserialize_with = "deserialize_roles")]
    pub additional_roles: BTreeSet<Role>,
    pub is_active: bool,
}

impl Employee {
    pub fn to_response(&self) -> EmployeeResponse {
        EmployeeResponse {
            id: self.id,
            email: self.email.clone(),
            display_name: self.display_name.clone(),
            primary_role: self.primary_role,
            additional_roles: self.additional_roles.clone(),
            is_active: self.is_active,
        }
    }
}

/// Employee response (without password)
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct EmployeeResponse {
    pub id: u64,
    pub email: String,
    pub display_name: String,
    pub primary_role: Role,
    #[serde(default, deserialize_with = "deserialize_roles")]
    pub additional_roles: BTreeSet<Role>,
    pub is_active: bool,
}

/// Create employee payload
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct EmployeeCreate {
    pub email: String,
    pub display_name: String,
    pub password: String,
    pub primary_role: Role,
    #[serde(default, deserialize_with = "deserialize_roles")]
    pub additional_roles: BTreeSet<Role>,
}

#[cfg(test)]
mod tests {
    use super::*;

    fn employee(primary: Role, extra: &[Role]) -> Employee {
        Employee {
            id: 1,
            email: "a@b.c".into(),
            display_name: "A".into(),
            password_hash: String::new(),
            primary_role: primary,
            additional_roles: extra.iter().copied().collect(),
            is_active: true,
        }
    }

    #[test]
    fn test_response_omits_password_hash() {
        let mut emp = employee(Role::Waiter, &[Role::Cashier]);
        emp.password_hash = "$argon2id$v=19$secret".into();
        let json = serde_json::to_value(emp.to_response()).unwrap();
        assert!(json.get("password_hash").is_none());
        assert_eq!(json["primary_role"], "waiter");
        assert_eq!(json["additional_roles"], serde_json::json!(["cashier"]));
    }
}
