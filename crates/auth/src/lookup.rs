//! Role-lookup service contract and an in-memory implementation.

use std::collections::HashMap;
use std::sync::RwLock;

use runas_core::TenantId;

use crate::error::LookupError;

/// External service answering "which roles does `username` hold in `tenant`".
///
/// `tenant` may be `None`; implementations apply their own default.
/// Implementations should return [`LookupError::UnknownUser`] for users they
/// have never heard of, and reserve the other variants for real failures.
pub trait RoleLookup: Send + Sync {
    fn roles_for_user(
        &self,
        tenant: Option<&TenantId>,
        username: &str,
    ) -> Result<Vec<String>, LookupError>;
}

#[derive(Debug, Clone, PartialEq, Eq, Hash)]
struct RoleKey {
    tenant: Option<TenantId>,
    username: String,
}

/// In-memory role directory.
///
/// Intended for tests/dev. Tenant-qualified entries take precedence over
/// tenant-agnostic ones when a lookup names a tenant.
#[derive(Debug, Default)]
pub struct InMemoryRoleLookup {
    roles: RwLock<HashMap<RoleKey, Vec<String>>>,
}

impl InMemoryRoleLookup {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_user<I, S>(self, username: impl Into<String>, roles: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        self.set_roles(None, username, roles);
        self
    }

    pub fn with_tenant_user<I, S>(self, tenant: TenantId, username: impl Into<String>, roles: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        self.set_roles(Some(tenant), username, roles);
        self
    }

    /// Replace the roles of a user (tenant-qualified when `tenant` is set).
    pub fn set_roles<I, S>(&self, tenant: Option<TenantId>, username: impl Into<String>, roles: I)
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        let key = RoleKey {
            tenant,
            username: username.into(),
        };
        let roles = roles.into_iter().map(Into::into).collect();

        let mut guard = self
            .roles
            .write()
            .unwrap_or_else(std::sync::PoisonError::into_inner);
        guard.insert(key, roles);
    }

    /// Forget a user entirely (tenant-qualified when `tenant` is set).
    pub fn remove_user(&self, tenant: Option<TenantId>, username: &str) {
        let key = RoleKey {
            tenant,
            username: username.to_string(),
        };
        let mut guard = self
            .roles
            .write()
            .unwrap_or_else(std::sync::PoisonError::into_inner);
        guard.remove(&key);
    }
}

impl RoleLookup for InMemoryRoleLookup {
    fn roles_for_user(
        &self,
        tenant: Option<&TenantId>,
        username: &str,
    ) -> Result<Vec<String>, LookupError> {
        let roles = self
            .roles
            .read()
            .map_err(|_| LookupError::Unavailable("lock poisoned".to_string()))?;

        let scoped = tenant.and_then(|t| {
            roles.get(&RoleKey {
                tenant: Some(t.clone()),
                username: username.to_string(),
            })
        });
        let global = || {
            roles.get(&RoleKey {
                tenant: None,
                username: username.to_string(),
            })
        };

        scoped
            .or_else(global)
            .cloned()
            .ok_or_else(|| LookupError::UnknownUser(username.to_string()))
    }
}
