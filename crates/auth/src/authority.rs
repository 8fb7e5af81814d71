use std::borrow::{Borrow, Cow};
use std::collections::BTreeSet;

use serde::{Deserialize, Serialize};

/// Name of a granted authority (role).
///
/// Authorities are opaque strings at this layer; what an authority allows is
/// decided by whoever checks it.
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(transparent)]
pub struct Authority(Cow<'static, str>);

impl Authority {
    pub fn new(name: impl Into<Cow<'static, str>>) -> Self {
        Self(name.into())
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl core::fmt::Display for Authority {
    fn fmt(&self, f: &mut core::fmt::Formatter<'_>) -> core::fmt::Result {
        f.write_str(&self.0)
    }
}

impl Borrow<str> for Authority {
    fn borrow(&self) -> &str {
        &self.0
    }
}

impl From<&'static str> for Authority {
    fn from(value: &'static str) -> Self {
        Self::new(value)
    }
}

impl From<String> for Authority {
    fn from(value: String) -> Self {
        Self::new(value)
    }
}

/// Set of granted authorities.
///
/// Duplicates collapse. Iteration is sorted by name so log output and test
/// assertions are deterministic; callers must not rely on any other order.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct AuthoritySet(BTreeSet<Authority>);

impl AuthoritySet {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn single(authority: impl Into<Authority>) -> Self {
        let mut set = Self::new();
        set.insert(authority);
        set
    }

    /// Insert an authority. Returns `false` if it was already present.
    pub fn insert(&mut self, authority: impl Into<Authority>) -> bool {
        self.0.insert(authority.into())
    }

    pub fn contains(&self, name: &str) -> bool {
        self.0.contains(name)
    }

    pub fn len(&self) -> usize {
        self.0.len()
    }

    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }

    pub fn iter(&self) -> impl Iterator<Item = &Authority> {
        self.0.iter()
    }

    pub fn names(&self) -> Vec<&str> {
        self.0.iter().map(Authority::as_str).collect()
    }
}

impl<A: Into<Authority>> FromIterator<A> for AuthoritySet {
    fn from_iter<I: IntoIterator<Item = A>>(iter: I) -> Self {
        Self(iter.into_iter().map(Into::into).collect())
    }
}

impl IntoIterator for AuthoritySet {
    type Item = Authority;
    type IntoIter = std::collections::btree_set::IntoIter<Authority>;

    fn into_iter(self) -> Self::IntoIter {
        self.0.into_iter()
    }
}

impl<'a> IntoIterator for &'a AuthoritySet {
    type Item = &'a Authority;
    type IntoIter = std::collections::btree_set::Iter<'a, Authority>;

    fn into_iter(self) -> Self::IntoIter {
        self.0.iter()
    }
}
