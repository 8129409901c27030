//! Memoized type registrations.

use std::fmt;
use std::sync::Arc;

use crate::types::TypeHandle;

/// Opaque handle naming the serializer bound to a registration.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct SerializerRef(Arc<str>);

impl SerializerRef {
    /// Serializer the host engine picks when nothing else is bound.
    pub const ENGINE_DEFAULT: &'static str = "engine-default";

    /// Handle for the named serializer.
    pub fn named(name: impl AsRef<str>) -> Self {
        Self(Arc::from(name.as_ref()))
    }

    /// The serializer name.
    pub fn name(&self) -> &str {
        &self.0
    }
}

impl Default for SerializerRef {
    fn default() -> Self {
        Self::named(Self::ENGINE_DEFAULT)
    }
}

impl fmt::Display for SerializerRef {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

/// A type bound to its numeric id and serializer.
///
/// Equality compares the type by identity, not by name.
#[derive(Debug, Clone)]
pub struct Registration {
    descriptor: TypeHandle,
    id: i32,
    serializer: SerializerRef,
}

impl Registration {
    pub(crate) fn new(descriptor: TypeHandle, id: i32, serializer: SerializerRef) -> Self {
        Self {
            descriptor,
            id,
            serializer,
        }
    }

    /// The registered type.
    pub fn descriptor(&self) -> &TypeHandle {
        &self.descriptor
    }

    /// Numeric id written to the wire in place of the type name.
    pub fn id(&self) -> i32 {
        self.id
    }

    /// Serializer bound to the type.
    pub fn serializer(&self) -> &SerializerRef {
        &self.serializer
    }
}

impl PartialEq for Registration {
    fn eq(&self, other: &Self) -> bool {
        Arc::ptr_eq(&self.descriptor, &other.descriptor)
            && self.id == other.id
            && self.serializer == other.serializer
    }
}

impl Eq for Registration {}

/// Outcome of an admitted lookup.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Resolution {
    /// The type is admitted and registered.
    Registered(Registration),
    /// The type is a builtin singleton that has no registration of its own
    /// yet. Not a refusal; see `Resolver::resolve_or_register_builtin`.
    Unregistered,
}

impl Resolution {
    /// The registration, if any.
    pub fn registration(&self) -> Option<&Registration> {
        match self {
            Self::Registered(registration) => Some(registration),
            Self::Unregistered => None,
        }
    }

    /// Consume into the registration, if any.
    pub fn into_registration(self) -> Option<Registration> {
        match self {
            Self::Registered(registration) => Some(registration),
            Self::Unregistered => None,
        }
    }
}
