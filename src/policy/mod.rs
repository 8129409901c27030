//! Class-admission policy: the rules deciding which types may cross the
//! serialization boundary.
//!
//! [`AdmissionPolicy`] bundles the process-wide, immutable parts (blacklist,
//! force-allow list, builtin alias table, marker inspector). A [`Resolver`]
//! pairs a shared policy with one session's [`TrustContext`] and owns the
//! only mutable state, its registration cache.

use tracing::info;

use crate::config::PolicyConfig;

pub mod annotation;
pub mod builtin;
pub mod class_list;
pub mod error;
pub mod hierarchy;
pub mod registration;
pub mod resolver;
pub mod whitelist;

pub use annotation::AnnotationInspector;
pub use builtin::{BuiltinAlias, BuiltinTable};
pub use class_list::{AllowOverride, Blacklist};
pub use error::AdmissionError;
pub use hierarchy::{Ancestor, AncestorKind};
pub use registration::{Registration, Resolution, SerializerRef};
pub use resolver::{Resolver, TypeHost};
pub use whitelist::TrustContext;

/// Process-wide admission configuration, immutable once built.
#[derive(Debug, Clone)]
pub struct AdmissionPolicy {
    blacklist: Blacklist,
    allow_override: AllowOverride,
    builtins: BuiltinTable,
    annotations: AnnotationInspector,
}

impl AdmissionPolicy {
    /// Assemble a policy from its parts.
    pub fn new(blacklist: Blacklist, allow_override: AllowOverride, builtins: BuiltinTable) -> Self {
        Self {
            blacklist,
            allow_override,
            builtins,
            annotations: AnnotationInspector::new(),
        }
    }

    /// Validate `config` and build the policy it describes.
    ///
    /// # Errors
    ///
    /// Returns an error if the configuration fails validation.
    pub fn from_config(config: &PolicyConfig) -> anyhow::Result<Self> {
        config.validate()?;
        let policy = Self::new(
            Blacklist::from_names(config.blacklist.types.iter().cloned()),
            AllowOverride::from_names(config.allow_override.types.iter().cloned()),
            BuiltinTable::new(config.builtin_aliases()),
        );
        info!(
            blacklisted = policy.blacklist.len(),
            force_allowed = policy.allow_override.len(),
            builtins = policy.builtins.entries().len(),
            "admission policy assembled"
        );
        Ok(policy)
    }

    /// Types refused regardless of any other signal.
    pub fn blacklist(&self) -> &Blacklist {
        &self.blacklist
    }

    /// Types admitted without marker or whitelist entry.
    pub fn allow_override(&self) -> &AllowOverride {
        &self.allow_override
    }

    /// Canonical empty-container aliases.
    pub fn builtins(&self) -> &BuiltinTable {
        &self.builtins
    }

    /// Marker inspector.
    pub fn annotations(&self) -> &AnnotationInspector {
        &self.annotations
    }
}

impl Default for AdmissionPolicy {
    fn default() -> Self {
        Self::new(
            Blacklist::from_names(class_list::DEFAULT_BLACKLIST.iter().copied()),
            AllowOverride::from_names(class_list::DEFAULT_ALLOW_OVERRIDE.iter().copied()),
            BuiltinTable::new(builtin::default_aliases()),
        )
    }
}
