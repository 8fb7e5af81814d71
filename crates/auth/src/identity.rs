use serde::{Deserialize, Serialize};

use crate::authority::AuthoritySet;

/// Which flavour of principal an identity represents.
#[derive(Debug, Copy, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum IdentityKind {
    /// The configured anonymous principal.
    Anonymous,
    /// The principal the platform acts as for its own background work.
    System,
    /// Any named user.
    User,
}

impl core::fmt::Display for IdentityKind {
    fn fmt(&self, f: &mut core::fmt::Formatter<'_>) -> core::fmt::Result {
        match self {
            IdentityKind::Anonymous => write!(f, "anonymous"),
            IdentityKind::System => write!(f, "system"),
            IdentityKind::User => write!(f, "user"),
        }
    }
}

/// An authenticated identity: a principal plus its granted authorities.
///
/// Immutable once built. Contexts hold identities behind an `Arc`, so the
/// same installed value can be recognised by pointer as well as by equality.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Identity {
    principal: String,
    authorities: AuthoritySet,
    kind: IdentityKind,
}

impl Identity {
    pub fn new(principal: impl Into<String>, authorities: AuthoritySet, kind: IdentityKind) -> Self {
        Self {
            principal: principal.into(),
            authorities,
            kind,
        }
    }

    pub fn user(principal: impl Into<String>, authorities: AuthoritySet) -> Self {
        Self::new(principal, authorities, IdentityKind::User)
    }

    pub fn system(principal: impl Into<String>, authorities: AuthoritySet) -> Self {
        Self::new(principal, authorities, IdentityKind::System)
    }

    pub fn anonymous(principal: impl Into<String>, authorities: AuthoritySet) -> Self {
        Self::new(principal, authorities, IdentityKind::Anonymous)
    }

    pub fn principal(&self) -> &str {
        &self.principal
    }

    pub fn authorities(&self) -> &AuthoritySet {
        &self.authorities
    }

    pub fn kind(&self) -> IdentityKind {
        self.kind
    }

    pub fn has_authority(&self, name: &str) -> bool {
        self.authorities.contains(name)
    }
}

impl core::fmt::Display for Identity {
    fn fmt(&self, f: &mut core::fmt::Formatter<'_>) -> core::fmt::Result {
        write!(f, "{}:{}", self.kind, self.principal)
    }
}
