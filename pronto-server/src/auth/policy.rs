//! 角色策略
//!
//! Roles are flat. The identity satisfies a required role when it is the
//! primary role or one of the additional roles; `super_admin` bypasses the
//! check entirely.

use std::collections::BTreeSet;

use shared::models::{Employee, Role, Scope};

use super::jwt::CurrentUser;

/// Anything carrying a primary role plus additional roles
pub trait RoleHolder {
    fn primary_role(&self) -> Role;
    fn additional_roles(&self) -> &BTreeSet<Role>;
}

impl RoleHolder for CurrentUser {
    fn primary_role(&self) -> Role {
        self.role
    }

    fn additional_roles(&self) -> &BTreeSet<Role> {
        &self.additional_roles
    }
}

impl RoleHolder for Employee {
    fn primary_role(&self) -> Role {
        self.primary_role
    }

    fn additional_roles(&self) -> &BTreeSet<Role> {
        &self.additional_roles
    }
}

/// Does `identity` satisfy `required`?
pub fn role_policy(identity: &impl RoleHolder, required: Role) -> bool {
    let primary = identity.primary_role();
    primary.is_privileged() || primary == required || identity.additional_roles().contains(&required)
}

/// Whether `identity` may put `scope` into a token
pub fn can_assume_scope(identity: &impl RoleHolder, scope: Scope) -> bool {
    role_policy(identity, scope.role())
}
