//! Runtime type descriptors handed to the admission policy by the host.
//!
//! A [`TypeDescriptor`] is a plain graph node: a name, a [`TypeKind`], and
//! resolved links to its direct superclass, its declared interfaces and (for
//! arrays) its component type. Descriptors are built once by the host's
//! reflection facility, shared as [`TypeHandle`]s, and never mutated. Because
//! a descriptor can only link to descriptors that already exist, the graph is
//! acyclic by construction.

use std::fmt;
use std::sync::{Arc, OnceLock};

use serde::Deserialize;

/// Name of the hierarchy root type.
pub const ROOT_TYPE_NAME: &str = "java.lang.Object";

/// Name of the host string type, admitted like a primitive.
pub const STRING_TYPE_NAME: &str = "java.lang.String";

/// Shared, immutable reference to a [`TypeDescriptor`].
pub type TypeHandle = Arc<TypeDescriptor>;

/// Structural category of a runtime type.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum TypeKind {
    /// Concrete, instantiable class.
    #[default]
    Class,
    /// Class that cannot be instantiated directly.
    AbstractClass,
    /// Interface; never instantiated directly.
    Interface,
    /// Enumeration type. Never treated as abstract, even when its constants
    /// carry bodies.
    Enum,
    /// Anonymous subclass generated for an enum constant that overrides
    /// behaviour. Its superclass is the declaring enum.
    EnumConstant,
    /// Array type; see [`TypeDescriptor::component`].
    Array,
    /// Primitive value type.
    Primitive,
}

/// Where the host loaded a type from.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum TypeOrigin {
    /// Loaded by the host's own class path.
    #[default]
    Host,
    /// Loaded from an untrusted attachment. Serialization markers on such
    /// types are ignored.
    Attachment,
}

/// Serialization-relevant markers carried by a type declaration.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Markers {
    /// Explicit opt-in to serialization. Inherited by subtypes.
    pub serializable: bool,
    /// Type implements the host engine's custom read/write protocol.
    pub custom_serialization: bool,
    /// Serializer the type names for itself, if any.
    pub default_serializer: Option<String>,
}

/// Facts about a type's whole ancestry, computed on first use.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub(crate) struct Lineage {
    /// The type or some ancestor carries the serialization marker.
    pub(crate) marked: bool,
    /// The type or some ancestor implements custom serialization.
    pub(crate) custom_serialization: bool,
}

/// Description of one runtime type.
pub struct TypeDescriptor {
    name: String,
    kind: TypeKind,
    superclass: Option<TypeHandle>,
    interfaces: Vec<TypeHandle>,
    component: Option<TypeHandle>,
    markers: Markers,
    origin: TypeOrigin,
    lineage: OnceLock<Lineage>,
}

impl TypeDescriptor {
    /// Start building a descriptor of the given kind.
    pub fn builder(name: impl Into<String>, kind: TypeKind) -> TypeDescriptorBuilder {
        TypeDescriptorBuilder {
            name: name.into(),
            kind,
            superclass: None,
            interfaces: Vec::new(),
            component: None,
            markers: Markers::default(),
            origin: TypeOrigin::Host,
        }
    }

    /// Start building a concrete class.
    pub fn class(name: impl Into<String>) -> TypeDescriptorBuilder {
        Self::builder(name, TypeKind::Class)
    }

    /// Start building an interface.
    pub fn interface(name: impl Into<String>) -> TypeDescriptorBuilder {
        Self::builder(name, TypeKind::Interface)
    }

    /// Build a primitive type.
    pub fn primitive(name: impl Into<String>) -> TypeHandle {
        Self::builder(name, TypeKind::Primitive).build()
    }

    /// Build the array type whose elements are `component`.
    ///
    /// The array is named after its component with a `[]` suffix.
    pub fn array_of(component: &TypeHandle) -> TypeHandle {
        Self::builder(format!("{}[]", component.name()), TypeKind::Array)
            .component(component)
            .build()
    }

    /// Fully qualified type name.
    pub fn name(&self) -> &str {
        &self.name
    }

    /// Structural category.
    pub fn kind(&self) -> TypeKind {
        self.kind
    }

    /// Direct superclass, if any.
    pub fn superclass(&self) -> Option<&TypeHandle> {
        self.superclass.as_ref()
    }

    /// Directly declared interfaces, in declaration order.
    pub fn interfaces(&self) -> &[TypeHandle] {
        &self.interfaces
    }

    /// Element type of an array.
    pub fn component(&self) -> Option<&TypeHandle> {
        self.component.as_ref()
    }

    /// Serialization markers on this declaration.
    pub fn markers(&self) -> &Markers {
        &self.markers
    }

    /// Where the host loaded this type from.
    pub fn origin(&self) -> TypeOrigin {
        self.origin
    }

    /// Whether the type can never be instantiated directly.
    ///
    /// Enums are excluded even when abstract at the host level.
    pub fn is_abstract_or_interface(&self) -> bool {
        matches!(self.kind, TypeKind::Interface | TypeKind::AbstractClass)
    }

    pub(crate) fn lineage_cell(&self) -> &OnceLock<Lineage> {
        &self.lineage
    }
}

impl fmt::Debug for TypeDescriptor {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let interfaces: Vec<&str> = self.interfaces.iter().map(|i| i.name()).collect();
        f.debug_struct("TypeDescriptor")
            .field("name", &self.name)
            .field("kind", &self.kind)
            .field("superclass", &self.superclass.as_ref().map(|s| s.name()))
            .field("interfaces", &interfaces)
            .field("component", &self.component.as_ref().map(|c| c.name()))
            .field("markers", &self.markers)
            .field("origin", &self.origin)
            .finish()
    }
}

impl fmt::Display for TypeDescriptor {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.name)
    }
}

/// Builder for [`TypeDescriptor`].
#[derive(Debug)]
pub struct TypeDescriptorBuilder {
    name: String,
    kind: TypeKind,
    superclass: Option<TypeHandle>,
    interfaces: Vec<TypeHandle>,
    component: Option<TypeHandle>,
    markers: Markers,
    origin: TypeOrigin,
}

impl TypeDescriptorBuilder {
    /// Set the direct superclass.
    pub fn superclass(mut self, superclass: &TypeHandle) -> Self {
        self.superclass = Some(Arc::clone(superclass));
        self
    }

    /// Append a directly declared interface.
    pub fn interface(mut self, interface: &TypeHandle) -> Self {
        self.interfaces.push(Arc::clone(interface));
        self
    }

    /// Set the array component type.
    pub fn component(mut self, component: &TypeHandle) -> Self {
        self.component = Some(Arc::clone(component));
        self
    }

    /// Mark the type as explicitly serializable.
    pub fn serializable(mut self) -> Self {
        self.markers.serializable = true;
        self
    }

    /// Declare that the type implements the custom serialization protocol.
    pub fn custom_serialization(mut self) -> Self {
        self.markers.custom_serialization = true;
        self
    }

    /// Name a default serializer for the type.
    pub fn default_serializer(mut self, serializer: impl Into<String>) -> Self {
        self.markers.default_serializer = Some(serializer.into());
        self
    }

    /// Replace all markers at once.
    pub fn markers(mut self, markers: Markers) -> Self {
        self.markers = markers;
        self
    }

    /// Set where the type was loaded from.
    pub fn origin(mut self, origin: TypeOrigin) -> Self {
        self.origin = origin;
        self
    }

    /// Finish the descriptor.
    pub fn build(self) -> TypeHandle {
        Arc::new(TypeDescriptor {
            name: self.name,
            kind: self.kind,
            superclass: self.superclass,
            interfaces: self.interfaces,
            component: self.component,
            markers: self.markers,
            origin: self.origin,
            lineage: OnceLock::new(),
        })
    }
}
