//! Admission failures.

use super::hierarchy::AncestorKind;

/// Why a type was refused.
///
/// Every variant is final for the object being processed: decisions are a
/// pure function of immutable configuration and a fixed hierarchy, so
/// retrying yields the same outcome.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum AdmissionError {
    /// The type's own name is blacklisted.
    #[error("Class {type_name} is blacklisted, so it cannot be used in serialization.")]
    Blacklisted {
        /// The refused type.
        type_name: String,
    },

    /// A superclass or superinterface of the type is blacklisted.
    #[error("The {kind} {ancestor} of {type_name} is blacklisted, so it cannot be used in serialization.")]
    AncestorBlacklisted {
        /// First blacklisted ancestor in traversal order.
        ancestor: String,
        /// Whether it was reached through the superclass or interface chain.
        kind: AncestorKind,
        /// The refused type.
        type_name: String,
    },

    /// No trust path admits the type.
    #[error("Class {type_name} is not annotated or on the whitelist, so cannot be used in serialization")]
    Untrusted {
        /// The refused type.
        type_name: String,
    },

    /// The host cannot describe the canonical type of a builtin alias.
    #[error("builtin type {0} is not known to the host")]
    UnknownBuiltin(String),
}

impl AdmissionError {
    /// Whether the refusal came from the blacklist.
    pub fn is_blacklisted(&self) -> bool {
        matches!(
            self,
            Self::Blacklisted { .. } | Self::AncestorBlacklisted { .. }
        )
    }
}
