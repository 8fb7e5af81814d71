use std::sync::Arc;

use tracing::debug;

use runas_core::TenantId;

use crate::authority::AuthoritySet;
use crate::error::{LookupError, ResolutionError};
use crate::lookup::RoleLookup;

/// Resolves a principal's granted authorities through a [`RoleLookup`].
///
/// Stateless apart from its configuration; every call hits the lookup
/// service. Unknown principals resolve to an empty set.
#[derive(Clone)]
pub struct AuthorityResolver {
    lookup: Arc<dyn RoleLookup>,
    default_tenant: Option<TenantId>,
}

impl AuthorityResolver {
    pub fn new(lookup: Arc<dyn RoleLookup>) -> Self {
        Self {
            lookup,
            default_tenant: None,
        }
    }

    pub fn with_default_tenant(mut self, tenant: Option<TenantId>) -> Self {
        self.default_tenant = tenant;
        self
    }

    pub fn default_tenant(&self) -> Option<&TenantId> {
        self.default_tenant.as_ref()
    }

    /// Resolve the authorities of `principal`, qualified by `tenant` (or the
    /// default tenant when `None`).
    pub fn resolve(
        &self,
        tenant: Option<&TenantId>,
        principal: &str,
    ) -> Result<AuthoritySet, ResolutionError> {
        let tenant = tenant.or(self.default_tenant.as_ref());

        let roles = match self.lookup.roles_for_user(tenant, principal) {
            Ok(roles) => roles,
            Err(LookupError::UnknownUser(_)) => {
                debug!(principal, "unknown principal; resolving to no authorities");
                return Ok(AuthoritySet::new());
            }
            Err(LookupError::Unavailable(reason)) => {
                return Err(ResolutionError::LookupUnavailable {
                    principal: principal.to_string(),
                    reason,
                });
            }
            Err(LookupError::Malformed(reason)) => {
                return Err(ResolutionError::MalformedResponse {
                    principal: principal.to_string(),
                    reason,
                });
            }
        };

        if roles.iter().any(|r| r.trim().is_empty()) {
            return Err(ResolutionError::MalformedResponse {
                principal: principal.to_string(),
                reason: "blank role name".to_string(),
            });
        }

        let authorities: AuthoritySet = roles.into_iter().collect();
        debug!(
            principal,
            tenant = tenant.map(TenantId::as_str),
            authorities = ?authorities.names(),
            "resolved authorities"
        );
        Ok(authorities)
    }
}

impl core::fmt::Debug for AuthorityResolver {
    fn fmt(&self, f: &mut core::fmt::Formatter<'_>) -> core::fmt::Result {
        f.debug_struct("AuthorityResolver")
            .field("default_tenant", &self.default_tenant)
            .finish_non_exhaustive()
    }
}

#[cfg(test)]
mod tests {
    use std::sync::Mutex;

    use super::*;
    use crate::lookup::InMemoryRoleLookup;

    /// Records the tenant each lookup was made with.
    #[derive(Default)]
    struct RecordingLookup {
        seen: Mutex<Vec<Option<String>>>,
        answer: Option<Result<Vec<String>, LookupError>>,
    }

    impl RoleLookup for RecordingLookup {
        fn roles_for_user(
            &self,
            tenant: Option<&TenantId>,
            _username: &str,
        ) -> Result<Vec<String>, LookupError> {
            self.seen
                .lock()
                .unwrap()
                .push(tenant.map(|t| t.as_str().to_string()));
            self.answer.clone().unwrap_or_else(|| Ok(Vec::new()))
        }
    }

    #[test]
    fn resolves_roles_into_a_set() {
        let lookup = InMemoryRoleLookup::new().with_user("myuser", ["role1", "role2", "role1"]);
        let resolver = AuthorityResolver::new(Arc::new(lookup));

        let authorities = resolver.resolve(None, "myuser").unwrap();
        assert_eq!(authorities.names(), vec!["role1", "role2"]);
    }

    #[test]
    fn unknown_principal_is_empty_not_error() {
        let resolver = AuthorityResolver::new(Arc::new(InMemoryRoleLookup::new()));
        assert!(resolver.resolve(None, "nobody").unwrap().is_empty());
    }

    #[test]
    fn lookup_failures_become_resolution_failures() {
        let unavailable = RecordingLookup {
            answer: Some(Err(LookupError::Unavailable("connection refused".into()))),
            ..Default::default()
        };
        let err = AuthorityResolver::new(Arc::new(unavailable))
            .resolve(None, "suzy")
            .unwrap_err();
        assert_eq!(
            err,
            ResolutionError::LookupUnavailable {
                principal: "suzy".into(),
                reason: "connection refused".into()
            }
        );

        let malformed = RecordingLookup {
            answer: Some(Err(LookupError::Malformed("not a list".into()))),
            ..Default::default()
        };
        let err = AuthorityResolver::new(Arc::new(malformed))
            .resolve(None, "suzy")
            .unwrap_err();
        assert!(matches!(err, ResolutionError::MalformedResponse { .. }));
    }

    #[test]
    fn blank_role_names_are_malformed() {
        let lookup = InMemoryRoleLookup::new().with_user("suzy", ["authenticated", " "]);
        let err = AuthorityResolver::new(Arc::new(lookup))
            .resolve(None, "suzy")
            .unwrap_err();
        assert!(matches!(err, ResolutionError::MalformedResponse { .. }));
    }

    #[test]
    fn missing_tenant_falls_back_to_default_tenant() {
        let lookup = Arc::new(RecordingLookup::default());
        let acme = TenantId::new("acme").unwrap();
        let other = TenantId::new("other").unwrap();

        let resolver = AuthorityResolver::new(lookup.clone()).with_default_tenant(Some(acme));
        resolver.resolve(None, "suzy").unwrap();
        resolver.resolve(Some(&other), "suzy").unwrap();

        let untenanted = AuthorityResolver::new(lookup.clone());
        untenanted.resolve(None, "suzy").unwrap();

        assert_eq!(
            *lookup.seen.lock().unwrap(),
            vec![Some("acme".to_string()), Some("other".to_string()), None]
        );
    }
}
