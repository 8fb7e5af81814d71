//! Strongly-typed identifiers.

use core::str::FromStr;
use std::borrow::Cow;

use serde::{Deserialize, Serialize};

use crate::error::CoreError;

/// Identifier of a tenant (multi-tenant boundary).
///
/// Tenants are opaque to this workspace: the value is only ever forwarded to
/// the role-lookup service to qualify a query.
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(try_from = "String", into = "String")]
pub struct TenantId(Cow<'static, str>);

impl TenantId {
    /// Create a tenant identifier, rejecting blank values.
    pub fn new(id: impl Into<Cow<'static, str>>) -> Result<Self, CoreError> {
        let id = id.into();
        if id.trim().is_empty() {
            return Err(CoreError::invalid_id("TenantId: must not be blank"));
        }
        Ok(Self(id))
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl core::fmt::Display for TenantId {
    fn fmt(&self, f: &mut core::fmt::Formatter<'_>) -> core::fmt::Result {
        f.write_str(&self.0)
    }
}

impl FromStr for TenantId {
    type Err = CoreError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Self::new(s.to_string())
    }
}

impl TryFrom<String> for TenantId {
    type Error = CoreError;

    fn try_from(value: String) -> Result<Self, Self::Error> {
        Self::new(value)
    }
}

impl From<TenantId> for String {
    fn from(value: TenantId) -> Self {
        value.0.into_owned()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn blank_tenant_is_rejected() {
        assert!(matches!(TenantId::new(""), Err(CoreError::InvalidId(_))));
        assert!(matches!("   ".parse::<TenantId>(), Err(CoreError::InvalidId(_))));
    }

    #[test]
    fn tenant_round_trips_through_serde_as_plain_string() {
        let tenant: TenantId = "/tenants/acme".parse().unwrap();
        let json = serde_json::to_string(&tenant).unwrap();
        assert_eq!(json, "\"/tenants/acme\"");

        let back: TenantId = serde_json::from_str(&json).unwrap();
        assert_eq!(back, tenant);
        assert!(serde_json::from_str::<TenantId>("\"\"").is_err());
    }
}
