//! Role and permission checks over the `auth.rbac` policy.
//!
//! Permissions are `resource:action` strings where either half may be `*`.
//! A role is granted a permission if it holds the root wildcard, belongs to a
//! global read/write role list matching the action, lists a matching
//! permission itself, or inherits a role that does. Nothing is cached: every
//! call walks the policy.

use crate::config::RbacConfig;
use crate::entities::types::Role;
use std::collections::HashSet;

const READ_ACTIONS: &[&str] = &["read", "list"];
const WRITE_ACTIONS: &[&str] = &["create", "update", "delete", "write"];

#[derive(Debug, Clone)]
pub struct Rbac {
    policy: RbacConfig,
}

impl Rbac {
    pub fn new(policy: RbacConfig) -> Self {
        Self { policy }
    }

    /// Plain membership test used by role-gated routes
    pub fn has_role(role: Role, allowed: &[Role]) -> bool {
        allowed.contains(&role)
    }

    pub fn has_permission(&self, role: &str, resource: &str, action: &str) -> bool {
        let mut visited = HashSet::new();
        self.check(role, resource, action, &mut visited)
    }

    fn check<'a>(
        &'a self,
        role: &'a str,
        resource: &str,
        action: &str,
        visited: &mut HashSet<&'a str>,
    ) -> bool {
        // Inheritance cycles terminate here
        if !visited.insert(role) {
            return false;
        }

        let Some(definition) = self.policy.roles.get(role) else {
            return false;
        };

        if definition
            .permissions
            .iter()
            .any(|p| *p == self.policy.root_permission)
        {
            return true;
        }

        let role_owned = role.to_string();
        if READ_ACTIONS.contains(&action) && self.policy.global_read_roles.contains(&role_owned) {
            return true;
        }
        if WRITE_ACTIONS.contains(&action) && self.policy.global_write_roles.contains(&role_owned)
        {
            return true;
        }

        if definition
            .permissions
            .iter()
            .any(|p| permission_matches(p, resource, action))
        {
            return true;
        }

        definition
            .inherits
            .iter()
            .any(|parent| self.check(parent, resource, action, visited))
    }
}

fn permission_matches(granted: &str, resource: &str, action: &str) -> bool {
    match granted.split_once(':') {
        Some((r, a)) => (r == "*" || r == resource) && (a == "*" || a == action),
        None => false,
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::{RbacConfig, RoleDefinition};
    use std::collections::HashMap;

    fn role(permissions: &[&str], inherits: &[&str]) -> RoleDefinition {
        RoleDefinition {
            permissions: permissions.iter().map(|s| s.to_string()).collect(),
            inherits: inherits.iter().map(|s| s.to_string()).collect(),
        }
    }

    fn policy(roles: Vec<(&str, RoleDefinition)>) -> RbacConfig {
        RbacConfig {
            root_permission: "*:*".to_string(),
            global_read_roles: Vec::new(),
            global_write_roles: Vec::new(),
            roles: roles
                .into_iter()
                .map(|(name, def)| (name.to_string(), def))
                .collect::<HashMap<_, _>>(),
        }
    }

    #[test]
    fn test_default_policy() {
        let rbac = Rbac::new(RbacConfig::default());
        assert!(rbac.has_permission("user", "submissions", "create"));
        assert!(rbac.has_permission("user", "briefs", "create"));
        assert!(!rbac.has_permission("user", "tags", "create"));
        assert!(rbac.has_permission("admin", "tags", "delete"));
        assert!(rbac.has_permission("admin", "submissions", "update"));
        assert!(!rbac.has_permission("admin", "users", "approve"));
        assert!(rbac.has_permission("super_admin", "users", "approve"));
    }

    #[test]
    fn test_resource_and_action_wildcards() {
        let rbac = Rbac::new(policy(vec![
            ("editor", role(&["briefs:*", "*:read"], &[])),
        ]));
        assert!(rbac.has_permission("editor", "briefs", "delete"));
        assert!(rbac.has_permission("editor", "tags", "read"));
        assert!(!rbac.has_permission("editor", "tags", "delete"));
    }

    #[test]
    fn test_inheritance_chain() {
        let rbac = Rbac::new(policy(vec![
            ("base", role(&["portfolios:create"], &[])),
            ("middle", role(&[], &["base"])),
            ("top", role(&[], &["middle"])),
        ]));
        assert!(rbac.has_permission("top", "portfolios", "create"));
        assert!(!rbac.has_permission("base", "briefs", "create"));
    }

    #[test]
    fn test_inheritance_cycle_terminates() {
        let rbac = Rbac::new(policy(vec![
            ("a", role(&[], &["b"])),
            ("b", role(&[], &["a"])),
        ]));
        assert!(!rbac.has_permission("a", "briefs", "read"));
    }

    #[test]
    fn test_global_read_and_write_roles() {
        let mut config = policy(vec![
            ("auditor", role(&[], &[])),
            ("bot", role(&[], &[])),
        ]);
        config.global_read_roles = vec!["auditor".to_string()];
        config.global_write_roles = vec!["bot".to_string()];
        let rbac = Rbac::new(config);

        assert!(rbac.has_permission("auditor", "users", "read"));
        assert!(!rbac.has_permission("auditor", "users", "delete"));
        assert!(rbac.has_permission("bot", "briefs", "update"));
        assert!(!rbac.has_permission("bot", "briefs", "list"));
    }

    #[test]
    fn test_unknown_role_and_malformed_permission() {
        let rbac = Rbac::new(policy(vec![("odd", role(&["nocolon"], &[]))]));
        assert!(!rbac.has_permission("ghost", "briefs", "read"));
        assert!(!rbac.has_permission("odd", "nocolon", "read"));
    }

    #[test]
    fn test_has_role() {
        assert!(Rbac::has_role(Role::Admin, &[Role::Admin, Role::SuperAdmin]));
        assert!(!Rbac::has_role(Role::User, &[Role::Admin, Role::SuperAdmin]));
    }
}
