//! Authorization Policy
//!
//! Explicit predicates the boundary layer consults before calling into the
//! flows. The flows themselves never inspect the caller; whoever routes a
//! request is responsible for checking the relevant predicate first.

use crate::models::ROLE_ADMIN;

/// Whether the caller holds the named role
pub fn has_role(caller_roles: &[String], role: &str) -> bool {
    caller_roles.iter().any(|name| name == role)
}

/// Whether the caller is an administrator
pub fn is_admin(caller_roles: &[String]) -> bool {
    has_role(caller_roles, ROLE_ADMIN)
}

/// Whether the caller may read the target account's details
///
/// Administrators may read any account; everyone else only their own.
pub fn can_view_account(
    caller_public_id: &str,
    caller_roles: &[String],
    target_public_id: &str,
) -> bool {
    is_admin(caller_roles) || caller_public_id == target_public_id
}

/// Whether the caller may rename or delete the target account
pub fn can_modify_account(
    caller_public_id: &str,
    caller_roles: &[String],
    target_public_id: &str,
) -> bool {
    is_admin(caller_roles) || caller_public_id == target_public_id
}

/// Whether the caller may page through the account list
pub fn can_list_accounts(caller_roles: &[String]) -> bool {
    is_admin(caller_roles)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::{ROLE_ADMIN, ROLE_USER};

    fn admin_roles() -> Vec<String> {
        vec![ROLE_ADMIN.to_string()]
    }

    fn user_roles() -> Vec<String> {
        vec![ROLE_USER.to_string()]
    }

    #[test]
    fn test_admin_can_touch_any_account() {
        assert!(can_view_account("admin-id", &admin_roles(), "other-id"));
        assert!(can_modify_account("admin-id", &admin_roles(), "other-id"));
        assert!(can_list_accounts(&admin_roles()));
    }

    #[test]
    fn test_user_limited_to_own_account() {
        assert!(can_view_account("user-id", &user_roles(), "user-id"));
        assert!(can_modify_account("user-id", &user_roles(), "user-id"));

        assert!(!can_view_account("user-id", &user_roles(), "other-id"));
        assert!(!can_modify_account("user-id", &user_roles(), "other-id"));
        assert!(!can_list_accounts(&user_roles()));
    }

    #[test]
    fn test_no_roles_denied_everywhere() {
        let none: Vec<String> = vec![];
        assert!(!can_list_accounts(&none));
        assert!(!can_view_account("caller", &none, "other"));
        // Self access still works without roles
        assert!(can_view_account("caller", &none, "caller"));
    }
}
