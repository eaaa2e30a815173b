//! Three-tier authorization.
//!
//! Super admins come from configuration, added admins from the `admins` table and
//! per-title grants from `title_admins`. The gate itself holds no database handle;
//! callers look the facts up and ask.

use std::collections::HashSet;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Role {
    SuperAdmin,
    Admin,
    User,
}

#[derive(Debug, Clone, Default)]
pub struct PermissionGate {
    super_admins: HashSet<i64>,
}

impl PermissionGate {
    pub fn new(super_admins: HashSet<i64>) -> Self {
        Self { super_admins }
    }

    pub fn has_super_admins(&self) -> bool {
        !self.super_admins.is_empty()
    }

    pub fn super_admin_ids(&self) -> Vec<i64> {
        let mut ids: Vec<i64> = self.super_admins.iter().copied().collect();
        ids.sort_unstable();
        ids
    }

    pub fn is_super_admin(&self, user_id: i64) -> bool {
        self.super_admins.contains(&user_id)
    }

    /// Any kind of admin: configured, or present in the added-admin table.
    pub fn is_admin(&self, user_id: i64, is_added_admin: bool) -> bool {
        self.is_super_admin(user_id) || is_added_admin
    }

    pub fn role(&self, user_id: i64, is_added_admin: bool) -> Role {
        if self.is_super_admin(user_id) {
            Role::SuperAdmin
        } else if is_added_admin {
            Role::Admin
        } else {
            Role::User
        }
    }

    /// Whether `user_id` may manage a title created by `owner_id` and granted to `grantees`.
    pub fn can_manage_title(&self, user_id: i64, owner_id: i64, grantees: &[i64]) -> bool {
        self.is_super_admin(user_id) || user_id == owner_id || grantees.contains(&user_id)
    }

    /// Only super admins change who is an admin.
    pub fn can_manage_admins(&self, user_id: i64) -> bool {
        self.is_super_admin(user_id)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    const SUPER: i64 = 1;
    const OWNER: i64 = 2;
    const GRANTED: i64 = 3;
    const STRANGER: i64 = 4;

    fn gate() -> PermissionGate {
        PermissionGate::new([SUPER].into_iter().collect())
    }

    #[test]
    fn test_can_manage_title_matrix() {
        let gate = gate();
        let grantees = [GRANTED];
        assert!(gate.can_manage_title(SUPER, OWNER, &grantees));
        assert!(gate.can_manage_title(OWNER, OWNER, &grantees));
        assert!(gate.can_manage_title(GRANTED, OWNER, &grantees));
        assert!(!gate.can_manage_title(STRANGER, OWNER, &grantees));
        assert!(!gate.can_manage_title(GRANTED, OWNER, &[]));
    }

    #[test]
    fn test_roles() {
        let gate = gate();
        assert_eq!(gate.role(SUPER, false), Role::SuperAdmin);
        assert_eq!(gate.role(SUPER, true), Role::SuperAdmin);
        assert_eq!(gate.role(OWNER, true), Role::Admin);
        assert_eq!(gate.role(STRANGER, false), Role::User);
        assert!(gate.is_admin(OWNER, true));
        assert!(!gate.is_admin(STRANGER, false));
        assert!(gate.can_manage_admins(SUPER));
        assert!(!gate.can_manage_admins(OWNER));
    }
}
