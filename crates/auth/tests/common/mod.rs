#![allow(dead_code)]

use std::sync::Arc;

use runas_auth::{
    AuthoritySet, Identity, ImpersonationExecutor, InMemoryRoleLookup, NameRegistry,
};
use runas_core::MapSettings;

pub const ADMIN_KEY: &str = "singleTenantAdminUserName";

/// Executor over a directory where "admin" is the system principal and
/// "suzy" is an ordinary authenticated user.
pub fn executor() -> ImpersonationExecutor {
    executor_with(
        InMemoryRoleLookup::new()
            .with_user("admin", ["Administrator", "authenticated"])
            .with_user("suzy", ["authenticated"]),
        NameRegistry::new().with(ADMIN_KEY, "admin"),
    )
}

pub fn executor_with(roles: InMemoryRoleLookup, names: NameRegistry) -> ImpersonationExecutor {
    runas_observability::init_for_tests();
    ImpersonationExecutor::from_settings(&MapSettings::new(), Arc::new(roles), Arc::new(names))
        .expect("default settings are valid")
}

/// A pre-authenticated caller identity, compared by pointer after the fact.
pub fn token() -> Arc<Identity> {
    Arc::new(Identity::user("suzy", AuthoritySet::single("authenticated")))
}
