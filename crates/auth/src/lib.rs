//! `runas-auth` — identities, security contexts and impersonation.
//!
//! This crate is decoupled from any transport or directory service: role
//! lookups and name lookups are traits supplied by the caller.
//!
//! ```
//! use std::sync::Arc;
//!
//! use runas_auth::{ContextHolder, ImpersonationExecutor, InMemoryRoleLookup, NameRegistry};
//! use runas_core::MapSettings;
//!
//! let roles = InMemoryRoleLookup::new().with_user("admin", ["Administrator"]);
//! let names = NameRegistry::new().with("singleTenantAdminUserName", "admin");
//! let executor =
//!     ImpersonationExecutor::from_settings(&MapSettings::new(), Arc::new(roles), Arc::new(names))
//!         .unwrap();
//!
//! let ctx = ContextHolder::context();
//! let who: anyhow::Result<Option<String>> =
//!     executor.run_as_system(&ctx, || Ok(ctx.principal()));
//!
//! assert_eq!(who.unwrap().as_deref(), Some("admin"));
//! assert!(ctx.get().is_none());
//! ```

pub mod authority;
pub mod config;
pub mod context;
pub mod error;
pub mod executor;
pub mod factory;
pub mod holder;
pub mod identity;
pub mod lookup;
pub mod registry;
pub mod resolver;

pub use authority::{Authority, AuthoritySet};
pub use config::SecurityConfig;
pub use context::{FrameId, SecurityContext};
pub use error::{LookupError, ResolutionError};
pub use executor::ImpersonationExecutor;
pub use factory::AuthenticationFactory;
pub use holder::ContextHolder;
pub use identity::{Identity, IdentityKind};
pub use lookup::{InMemoryRoleLookup, RoleLookup};
pub use registry::{NameLookup, NameRegistry};
pub use resolver::AuthorityResolver;
