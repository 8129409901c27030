//! Session-scoped allow-list of type names.

use std::collections::BTreeSet;
use std::sync::Arc;

/// Immutable set of explicitly whitelisted type names.
///
/// Contexts are shared by value. [`TrustContext::with_additional`] returns a
/// new context and leaves the receiver untouched, so a context held by one
/// caller never changes underneath it.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct TrustContext {
    whitelisted: Arc<BTreeSet<String>>,
    trust_all: bool,
}

impl TrustContext {
    /// Context that whitelists nothing.
    pub fn empty() -> Self {
        Self::default()
    }

    /// Context that whitelists every name; only the blacklist can deny.
    pub fn all_but_blacklisted() -> Self {
        Self {
            whitelisted: Arc::default(),
            trust_all: true,
        }
    }

    /// Context whitelisting exactly `names`.
    pub fn from_names<I, S>(names: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        Self {
            whitelisted: Arc::new(names.into_iter().map(Into::into).collect()),
            trust_all: false,
        }
    }

    /// A copy of this context with `name` whitelisted as well.
    pub fn with_additional(&self, name: impl Into<String>) -> Self {
        if self.trust_all {
            return self.clone();
        }
        let mut names = BTreeSet::clone(&self.whitelisted);
        names.insert(name.into());
        Self {
            whitelisted: Arc::new(names),
            trust_all: false,
        }
    }

    /// Whether `name` is whitelisted in this context.
    pub fn is_whitelisted(&self, name: &str) -> bool {
        self.trust_all || self.whitelisted.contains(name)
    }

    /// Whether this context trusts every non-blacklisted name.
    pub fn trusts_all(&self) -> bool {
        self.trust_all
    }

    /// Explicitly whitelisted names, sorted.
    pub fn names(&self) -> impl Iterator<Item = &str> {
        self.whitelisted.iter().map(String::as_str)
    }
}
