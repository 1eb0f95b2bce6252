//! API-side authorization guard for writes.
//!
//! Handlers call [`require`] before touching a store; record types and stores
//! stay auth-agnostic.

use sitebook_auth::{AuthzError, Permission, Principal, Role, TenantMembership, authorize};

use crate::context::{PrincipalContext, TenantContext};

/// Resources whose create/update/delete is guarded by `<resource>.write`.
pub const WRITABLE_RESOURCES: [&str; 8] = [
    "projects",
    "staff",
    "equipment",
    "materials",
    "requirements",
    "procurement",
    "tasks",
    "transactions",
];

/// Check one permission in the current request context.
pub fn require(
    tenant: &TenantContext,
    principal: &PrincipalContext,
    required: Permission,
) -> Result<(), AuthzError> {
    let principal = Principal {
        user_id: principal.user_id(),
        active_tenant_id: tenant.tenant_id(),
        membership: membership(tenant, principal),
    };
    authorize(&principal, &required)
}

pub fn membership(tenant: &TenantContext, principal: &PrincipalContext) -> TenantMembership {
    TenantMembership {
        tenant_id: tenant.tenant_id(),
        roles: principal.roles().to_vec(),
        permissions: permissions_from_roles(principal.roles()),
    }
}

/// Static role to permission mapping.
///
/// Unknown roles grant nothing, which leaves their holders read-only.
pub fn permissions_from_roles(roles: &[Role]) -> Vec<Permission> {
    if roles.iter().any(|r| r.is(Role::ADMIN)) {
        return vec![Permission::wildcard()];
    }

    let mut granted: Vec<Permission> = Vec::new();
    let mut grant = |perm: Permission| {
        if !granted.contains(&perm) {
            granted.push(perm);
        }
    };

    for role in roles {
        if role.is(Role::PROJECT_MANAGER) {
            WRITABLE_RESOURCES
                .iter()
                .for_each(|resource| grant(Permission::write(resource)));
            grant(Permission::procurement_receive());
            grant(Permission::usage_record());
        } else if role.is(Role::SITE_ENGINEER) {
            grant(Permission::usage_record());
            grant(Permission::write("transactions"));
            grant(Permission::write("tasks"));
        }
    }

    granted
}

#[cfg(test)]
mod tests {
    use super::*;
    use sitebook_core::{TenantId, UserId};

    fn ctx(roles: &[&'static str]) -> (TenantContext, PrincipalContext) {
        (
            TenantContext::new(TenantId::new()),
            PrincipalContext::new(UserId::new(), roles.iter().map(|r| Role::new(*r)).collect()),
        )
    }

    #[test]
    fn admin_gets_wildcard() {
        assert_eq!(
            permissions_from_roles(&[Role::new("Admin")]),
            vec![Permission::wildcard()]
        );
    }

    #[test]
    fn site_engineer_records_usage_but_cannot_edit_projects() {
        let (tenant, principal) = ctx(&[Role::SITE_ENGINEER]);
        assert!(require(&tenant, &principal, Permission::usage_record()).is_ok());
        assert!(require(&tenant, &principal, Permission::write("tasks")).is_ok());
        assert_eq!(
            require(&tenant, &principal, Permission::write("projects")),
            Err(AuthzError::Forbidden("projects.write".into()))
        );
    }

    #[test]
    fn combined_roles_do_not_duplicate_grants() {
        let perms = permissions_from_roles(&[
            Role::new(Role::PROJECT_MANAGER),
            Role::new(Role::SITE_ENGINEER),
        ]);
        assert_eq!(perms.len(), WRITABLE_RESOURCES.len() + 2);
    }

    #[test]
    fn unknown_roles_are_read_only() {
        let (tenant, principal) = ctx(&["viewer"]);
        assert!(permissions_from_roles(principal.roles()).is_empty());
        assert!(require(&tenant, &principal, Permission::write("materials")).is_err());
    }
}
