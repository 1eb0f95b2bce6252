use serde::Serialize;
use thiserror::Error;

use sitebook_core::{TenantId, UserId};

use crate::{Permission, Role};

/// A principal's membership in a tenant: the roles held there and the
/// permissions they resolve to.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct TenantMembership {
    pub tenant_id: TenantId,
    pub roles: Vec<Role>,
    pub permissions: Vec<Permission>,
}

/// A fully resolved principal for authorization decisions.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Principal {
    pub user_id: UserId,
    pub active_tenant_id: TenantId,
    pub membership: TenantMembership,
}

#[derive(Debug, Error, Clone, PartialEq, Eq)]
pub enum AuthzError {
    #[error("tenant mismatch")]
    TenantMismatch,

    #[error("forbidden: missing permission '{0}'")]
    Forbidden(String),
}

/// Authorize a principal within its active tenant context.
///
/// Pure policy check: no IO, no panics.
pub fn authorize(principal: &Principal, required: &Permission) -> Result<(), AuthzError> {
    if principal.active_tenant_id != principal.membership.tenant_id {
        return Err(AuthzError::TenantMismatch);
    }

    let granted = principal
        .membership
        .permissions
        .iter()
        .any(|p| p.is_wildcard() || p == required);

    if granted {
        Ok(())
    } else {
        Err(AuthzError::Forbidden(required.as_str().to_string()))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn principal(permissions: &[&'static str]) -> Principal {
        let tenant_id = TenantId::new();
        Principal {
            user_id: UserId::new(),
            active_tenant_id: tenant_id,
            membership: TenantMembership {
                tenant_id,
                roles: Vec::new(),
                permissions: permissions.iter().map(|p| Permission::new(*p)).collect(),
            },
        }
    }

    #[test]
    fn wildcard_grants_everything() {
        let p = principal(&["*"]);
        assert_eq!(authorize(&p, &Permission::procurement_receive()), Ok(()));
        assert_eq!(authorize(&p, &Permission::write("projects")), Ok(()));
    }

    #[test]
    fn exact_permission_is_required() {
        let p = principal(&["tasks.write"]);
        assert_eq!(authorize(&p, &Permission::write("tasks")), Ok(()));
        assert_eq!(
            authorize(&p, &Permission::write("projects")),
            Err(AuthzError::Forbidden("projects.write".into()))
        );
    }

    #[test]
    fn membership_must_match_active_tenant() {
        let mut p = principal(&["*"]);
        p.active_tenant_id = TenantId::new();
        assert_eq!(
            authorize(&p, &Permission::usage_record()),
            Err(AuthzError::TenantMismatch)
        );
    }

}
