//! `runas-core` — shared building blocks for the security-context workspace.
//!
//! This crate holds identifiers, the configuration surface and the error model.
//! It knows nothing about identities or contexts.

pub mod error;
pub mod id;
pub mod settings;

pub use error::{CoreError, CoreResult};
pub use id::TenantId;
pub use settings::{EnvSettings, JsonSettings, LayeredSettings, MapSettings, SystemSettings};
