use std::sync::Arc;

use tracing::debug;

use runas_core::{CoreResult, SystemSettings, TenantId};

use crate::authority::AuthoritySet;
use crate::config::SecurityConfig;
use crate::error::ResolutionError;
use crate::identity::Identity;
use crate::lookup::RoleLookup;
use crate::registry::NameLookup;
use crate::resolver::AuthorityResolver;

/// Builds [`Identity`] values for principals.
///
/// The anonymous identity is built once, at construction, from configuration.
/// Everything else is resolved fresh on every call.
pub struct AuthenticationFactory {
    resolver: AuthorityResolver,
    names: Arc<dyn NameLookup>,
    config: SecurityConfig,
    anonymous: Identity,
}

impl AuthenticationFactory {
    pub fn new(resolver: AuthorityResolver, names: Arc<dyn NameLookup>, config: SecurityConfig) -> Self {
        let anonymous = Identity::anonymous(
            config.anonymous_user.clone(),
            AuthoritySet::single(config.anonymous_role.clone()),
        );

        Self {
            resolver,
            names,
            config,
            anonymous,
        }
    }

    /// Wire a factory from raw collaborators, reading [`SecurityConfig`] from
    /// `settings`. The config's default tenant becomes the resolver's.
    pub fn from_settings(
        settings: &dyn SystemSettings,
        roles: Arc<dyn RoleLookup>,
        names: Arc<dyn NameLookup>,
    ) -> CoreResult<Self> {
        let config = SecurityConfig::from_settings(settings)?;
        let resolver = AuthorityResolver::new(roles).with_default_tenant(config.default_tenant.clone());
        Ok(Self::new(resolver, names, config))
    }

    pub fn config(&self) -> &SecurityConfig {
        &self.config
    }

    pub fn resolver(&self) -> &AuthorityResolver {
        &self.resolver
    }

    /// Build the identity for `principal` under the default tenant.
    ///
    /// The configured anonymous user name yields the anonymous identity
    /// without consulting the role lookup.
    pub fn create_authentication(&self, principal: &str) -> Result<Identity, ResolutionError> {
        self.create_authentication_for_tenant(None, principal)
    }

    pub fn create_authentication_for_tenant(
        &self,
        tenant: Option<&TenantId>,
        principal: &str,
    ) -> Result<Identity, ResolutionError> {
        if principal == self.config.anonymous_user {
            return Ok(self.anonymous_identity());
        }

        let authorities = self.resolver.resolve(tenant, principal)?;
        Ok(Identity::user(principal, authorities))
    }

    pub fn anonymous_identity(&self) -> Identity {
        self.anonymous.clone()
    }

    /// The concrete principal behind the admin-user-name indirection key.
    pub fn system_principal(&self) -> Result<String, ResolutionError> {
        let key = &self.config.admin_user_name_key;
        let principal = self
            .names
            .lookup_name(key)
            .ok_or_else(|| ResolutionError::SystemPrincipalUndefined { key: key.clone() })?;
        debug!(key = %key, principal = %principal, "resolved system principal");
        Ok(principal)
    }

    pub fn system_identity(&self) -> Result<Identity, ResolutionError> {
        let principal = self.system_principal()?;
        let authorities = self.resolver.resolve(None, &principal)?;
        Ok(Identity::system(principal, authorities))
    }

    pub fn is_administrator(&self, identity: &Identity) -> bool {
        identity.has_authority(&self.config.admin_role)
    }
}

impl core::fmt::Debug for AuthenticationFactory {
    fn fmt(&self, f: &mut core::fmt::Formatter<'_>) -> core::fmt::Result {
        f.debug_struct("AuthenticationFactory")
            .field("resolver", &self.resolver)
            .field("config", &self.config)
            .finish_non_exhaustive()
    }
}
