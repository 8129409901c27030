//! In-memory type catalog acting as the host's reflection facility.
//!
//! Types can be inserted programmatically or declared in a TOML document:
//!
//! ```toml
//! [[types]]
//! name = "com.acme.Order"
//! superclass = "java.lang.Object"
//! interfaces = ["java.io.Serializable"]
//! serializable = true
//! ```
//!
//! Entries may appear in any order and may refer to types already in the
//! catalog. A document is linked completely before anything is committed, so
//! a failing document leaves the catalog unchanged.

use std::collections::{HashMap, HashSet};
use std::path::Path;
use std::sync::Arc;

use serde::Deserialize;

use crate::policy::{SerializerRef, TypeHost};
use crate::types::{Markers, TypeDescriptor, TypeHandle, TypeKind, TypeOrigin};

/// Core host types: the root, primitives, string, the collection hierarchy
/// around the hash and empty containers, and the connection interfaces.
pub const JAVA_CORE_TYPES: &str = r#"
[[types]]
name = "java.lang.Object"

[[types]]
name = "java.io.Serializable"
kind = "interface"

[[types]]
name = "java.lang.Comparable"
kind = "interface"

[[types]]
name = "java.lang.CharSequence"
kind = "interface"

[[types]]
name = "java.lang.String"
superclass = "java.lang.Object"
interfaces = ["java.io.Serializable", "java.lang.Comparable", "java.lang.CharSequence"]

[[types]]
name = "java.lang.Enum"
kind = "abstract_class"
superclass = "java.lang.Object"
interfaces = ["java.lang.Comparable", "java.io.Serializable"]

[[types]]
name = "boolean"
kind = "primitive"

[[types]]
name = "byte"
kind = "primitive"

[[types]]
name = "char"
kind = "primitive"

[[types]]
name = "short"
kind = "primitive"

[[types]]
name = "int"
kind = "primitive"

[[types]]
name = "long"
kind = "primitive"

[[types]]
name = "float"
kind = "primitive"

[[types]]
name = "double"
kind = "primitive"

[[types]]
name = "java.lang.Iterable"
kind = "interface"

[[types]]
name = "java.util.Collection"
kind = "interface"
interfaces = ["java.lang.Iterable"]

[[types]]
name = "java.util.Set"
kind = "interface"
interfaces = ["java.util.Collection"]

[[types]]
name = "java.util.List"
kind = "interface"
interfaces = ["java.util.Collection"]

[[types]]
name = "java.util.Map"
kind = "interface"

[[types]]
name = "java.util.AbstractCollection"
kind = "abstract_class"
superclass = "java.lang.Object"
interfaces = ["java.util.Collection"]

[[types]]
name = "java.util.AbstractSet"
kind = "abstract_class"
superclass = "java.util.AbstractCollection"
interfaces = ["java.util.Set"]

[[types]]
name = "java.util.AbstractList"
kind = "abstract_class"
superclass = "java.util.AbstractCollection"
interfaces = ["java.util.List"]

[[types]]
name = "java.util.AbstractMap"
kind = "abstract_class"
superclass = "java.lang.Object"
interfaces = ["java.util.Map"]

[[types]]
name = "java.util.HashSet"
superclass = "java.util.AbstractSet"
interfaces = ["java.util.Set", "java.io.Serializable"]

[[types]]
name = "java.util.LinkedHashSet"
superclass = "java.util.HashSet"
interfaces = ["java.util.Set", "java.io.Serializable"]

[[types]]
name = "java.util.HashMap"
superclass = "java.util.AbstractMap"
interfaces = ["java.util.Map", "java.io.Serializable"]

[[types]]
name = "java.util.LinkedHashMap"
superclass = "java.util.HashMap"
interfaces = ["java.util.Map"]

[[types]]
name = "java.util.ArrayList"
superclass = "java.util.AbstractList"
interfaces = ["java.util.List", "java.io.Serializable"]

[[types]]
name = "java.util.Collections$EmptyList"
superclass = "java.util.AbstractList"
interfaces = ["java.io.Serializable"]

[[types]]
name = "java.util.Collections$EmptySet"
superclass = "java.util.AbstractSet"
interfaces = ["java.io.Serializable"]

[[types]]
name = "java.util.Collections$EmptyMap"
superclass = "java.util.AbstractMap"
interfaces = ["java.io.Serializable"]

[[types]]
name = "kotlin.collections.EmptyList"
superclass = "java.lang.Object"
interfaces = ["java.util.List", "java.io.Serializable"]

[[types]]
name = "kotlin.collections.EmptySet"
superclass = "java.lang.Object"
interfaces = ["java.util.Set", "java.io.Serializable"]

[[types]]
name = "kotlin.collections.EmptyMap"
superclass = "java.lang.Object"
interfaces = ["java.util.Map", "java.io.Serializable"]

[[types]]
name = "scala.collection.immutable.Nil$"
superclass = "java.lang.Object"
interfaces = ["java.util.List", "java.io.Serializable"]

[[types]]
name = "java.lang.AutoCloseable"
kind = "interface"

[[types]]
name = "java.sql.Wrapper"
kind = "interface"

[[types]]
name = "java.sql.Connection"
kind = "interface"
interfaces = ["java.sql.Wrapper", "java.lang.AutoCloseable"]
"#;

/// Errors from linking a type catalog document.
#[derive(Debug, thiserror::Error)]
pub enum CatalogError {
    /// The document is not valid TOML or does not match the schema.
    #[error("failed to parse type catalog: {0}")]
    Parse(#[from] toml::de::Error),

    /// A type name is declared twice, or is already in the catalog.
    #[error("type {0} is declared more than once")]
    Duplicate(String),

    /// A reference names a type that is neither declared nor known.
    #[error("type {referenced_by} refers to unknown type {name}")]
    Unknown {
        /// The missing type.
        name: String,
        /// The type holding the reference.
        referenced_by: String,
    },

    /// A superclass link is not allowed for this pair of kinds.
    #[error("type {name} cannot extend {superclass}: {reason}")]
    InvalidSuperclass {
        /// The extending type.
        name: String,
        /// The rejected superclass.
        superclass: String,
        /// Why the link is invalid.
        reason: &'static str,
    },

    /// An `interfaces` entry is not an interface.
    #[error("type {name} cannot implement {interface}: it is not an interface")]
    NotAnInterface {
        /// The implementing type.
        name: String,
        /// The rejected interface.
        interface: String,
    },

    /// An array has no component type.
    #[error("array type {0} has no component type")]
    MissingComponent(String),

    /// A non-array type declares a component type.
    #[error("type {0} is not an array but declares a component type")]
    UnexpectedComponent(String),

    /// Superclass, interface or component links form a cycle.
    #[error("inheritance cycle through {0}")]
    Cycle(String),
}

#[derive(Debug, Deserialize)]
struct CatalogDocument {
    #[serde(default)]
    types: Vec<TypeEntry>,
}

#[derive(Debug, Deserialize)]
#[serde(deny_unknown_fields)]
struct TypeEntry {
    name: String,
    #[serde(default)]
    kind: TypeKind,
    superclass: Option<String>,
    #[serde(default)]
    interfaces: Vec<String>,
    component: Option<String>,
    #[serde(default)]
    serializable: bool,
    #[serde(default)]
    custom_serialization: bool,
    default_serializer: Option<String>,
    #[serde(default)]
    origin: TypeOrigin,
}

/// Name-indexed set of type descriptors.
#[derive(Debug, Clone)]
pub struct TypeCatalog {
    types: HashMap<String, TypeHandle>,
    default_serializer: SerializerRef,
}

impl Default for TypeCatalog {
    fn default() -> Self {
        Self::new()
    }
}

impl TypeCatalog {
    /// Create an empty catalog.
    pub fn new() -> Self {
        Self {
            types: HashMap::new(),
            default_serializer: SerializerRef::default(),
        }
    }

    /// Catalog preloaded with [`JAVA_CORE_TYPES`].
    ///
    /// # Errors
    ///
    /// Returns an error if the built-in document fails to link.
    pub fn java_core() -> Result<Self, CatalogError> {
        Self::from_toml_str(JAVA_CORE_TYPES)
    }

    /// Catalog holding exactly the types declared in `src`.
    ///
    /// # Errors
    ///
    /// Returns an error if the document fails to parse or link.
    pub fn from_toml_str(src: &str) -> Result<Self, CatalogError> {
        let mut catalog = Self::new();
        catalog.extend_from_toml_str(src)?;
        Ok(catalog)
    }

    /// Load a catalog document from disk.
    ///
    /// # Errors
    ///
    /// Returns an error if the file cannot be read, parsed, or linked.
    pub fn load(path: &Path) -> anyhow::Result<Self> {
        let contents = std::fs::read_to_string(path).map_err(|e| {
            anyhow::anyhow!("failed to read type catalog at {}: {e}", path.display())
        })?;
        Self::from_toml_str(&contents).map_err(|e| {
            anyhow::anyhow!("failed to load type catalog at {}: {e}", path.display())
        })
    }

    /// Serializer reported for types that do not name their own.
    pub fn with_default_serializer(mut self, serializer: SerializerRef) -> Self {
        self.default_serializer = serializer;
        self
    }

    /// Link the types declared in `src` into this catalog.
    ///
    /// Returns the new handles in declaration order.
    ///
    /// # Errors
    ///
    /// Returns an error if the document fails to parse or link; the catalog
    /// is unchanged in that case.
    pub fn extend_from_toml_str(&mut self, src: &str) -> Result<Vec<TypeHandle>, CatalogError> {
        let document: CatalogDocument = toml::from_str(src)?;

        let mut order = Vec::with_capacity(document.types.len());
        let mut pending = HashMap::with_capacity(document.types.len());
        for entry in document.types {
            if self.types.contains_key(&entry.name) || pending.contains_key(&entry.name) {
                return Err(CatalogError::Duplicate(entry.name));
            }
            order.push(entry.name.clone());
            pending.insert(entry.name.clone(), entry);
        }

        let mut linker = Linker {
            existing: &self.types,
            pending: &pending,
            built: HashMap::new(),
            visiting: HashSet::new(),
        };
        for name in &order {
            linker.link(name)?;
        }
        let mut built = linker.built;

        let mut added = Vec::with_capacity(order.len());
        for name in order {
            if let Some(handle) = built.remove(&name) {
                added.push(Arc::clone(&handle));
                self.types.insert(name, handle);
            }
        }
        Ok(added)
    }

    /// Add a descriptor built elsewhere.
    ///
    /// # Errors
    ///
    /// Returns [`CatalogError::Duplicate`] if the name is already taken.
    pub fn insert(&mut self, ty: TypeHandle) -> Result<TypeHandle, CatalogError> {
        if self.types.contains_key(ty.name()) {
            return Err(CatalogError::Duplicate(ty.name().to_owned()));
        }
        self.types.insert(ty.name().to_owned(), Arc::clone(&ty));
        Ok(ty)
    }

    /// Look up a type by name.
    pub fn get(&self, name: &str) -> Option<TypeHandle> {
        self.types.get(name).cloned()
    }

    /// Number of types in the catalog.
    pub fn len(&self) -> usize {
        self.types.len()
    }

    /// Whether the catalog is empty.
    pub fn is_empty(&self) -> bool {
        self.types.is_empty()
    }
}

impl TypeHost for TypeCatalog {
    fn describe(&self, name: &str) -> Option<TypeHandle> {
        self.get(name)
    }

    fn default_serializer(&self, ty: &TypeDescriptor) -> SerializerRef {
        match &ty.markers().default_serializer {
            Some(name) => SerializerRef::named(name),
            None => self.default_serializer.clone(),
        }
    }
}

struct Linker<'a> {
    existing: &'a HashMap<String, TypeHandle>,
    pending: &'a HashMap<String, TypeEntry>,
    built: HashMap<String, TypeHandle>,
    visiting: HashSet<String>,
}

impl Linker<'_> {
    fn reference(&mut self, name: &str, referenced_by: &str) -> Result<TypeHandle, CatalogError> {
        if let Some(handle) = self.built.get(name).or_else(|| self.existing.get(name)) {
            return Ok(Arc::clone(handle));
        }
        if self.pending.contains_key(name) {
            return self.link(name);
        }
        Err(CatalogError::Unknown {
            name: name.to_owned(),
            referenced_by: referenced_by.to_owned(),
        })
    }

    fn link(&mut self, name: &str) -> Result<TypeHandle, CatalogError> {
        if let Some(handle) = self.built.get(name) {
            return Ok(Arc::clone(handle));
        }
        let pending = self.pending;
        let Some(entry) = pending.get(name) else {
            return Err(CatalogError::Unknown {
                name: name.to_owned(),
                referenced_by: name.to_owned(),
            });
        };
        if !self.visiting.insert(name.to_owned()) {
            return Err(CatalogError::Cycle(name.to_owned()));
        }

        let mut builder = TypeDescriptor::builder(&entry.name, entry.kind)
            .markers(Markers {
                serializable: entry.serializable,
                custom_serialization: entry.custom_serialization,
                default_serializer: entry.default_serializer.clone(),
            })
            .origin(entry.origin);

        if let Some(superclass_name) = &entry.superclass {
            let superclass = self.reference(superclass_name, name)?;
            check_superclass(entry, &superclass)?;
            builder = builder.superclass(&superclass);
        } else if entry.kind == TypeKind::EnumConstant {
            return Err(CatalogError::InvalidSuperclass {
                name: name.to_owned(),
                superclass: String::new(),
                reason: "enum constants extend their enum",
            });
        }

        for interface_name in &entry.interfaces {
            let interface = self.reference(interface_name, name)?;
            if interface.kind() != TypeKind::Interface {
                return Err(CatalogError::NotAnInterface {
                    name: name.to_owned(),
                    interface: interface_name.clone(),
                });
            }
            builder = builder.interface(&interface);
        }

        match (&entry.component, entry.kind) {
            (Some(component_name), TypeKind::Array) => {
                let component = self.reference(component_name, name)?;
                builder = builder.component(&component);
            }
            (None, TypeKind::Array) => return Err(CatalogError::MissingComponent(name.to_owned())),
            (Some(_), _) => return Err(CatalogError::UnexpectedComponent(name.to_owned())),
            (None, _) => {}
        }

        let handle = builder.build();
        self.visiting.remove(name);
        self.built.insert(name.to_owned(), Arc::clone(&handle));
        Ok(handle)
    }
}

fn check_superclass(entry: &TypeEntry, superclass: &TypeDescriptor) -> Result<(), CatalogError> {
    let reason = match (entry.kind, superclass.kind()) {
        (TypeKind::Interface, _) => Some("interfaces have no superclass"),
        (TypeKind::Primitive, _) | (TypeKind::Array, _) => Some("only classes have a superclass"),
        (_, TypeKind::Interface) => Some("it is an interface"),
        (_, TypeKind::Primitive) | (_, TypeKind::Array) => Some("it is not a class"),
        (TypeKind::EnumConstant, kind) if kind != TypeKind::Enum => {
            Some("enum constants extend their enum")
        }
        _ => None,
    };
    match reason {
        Some(reason) => Err(CatalogError::InvalidSuperclass {
            name: entry.name.clone(),
            superclass: superclass.name().to_owned(),
            reason,
        }),
        None => Ok(()),
    }
}
