//! Ancestor traversal over [`TypeDescriptor`] graphs.
//!
//! Order is fixed because denial messages name the *first* blacklisted
//! ancestor found: the superclass chain nearest-first, then the interfaces
//! declared by the type itself and by each superclass in chain order, each
//! interface followed depth-first by its own superinterfaces.

use std::collections::HashSet;
use std::fmt;
use std::sync::Arc;

use crate::types::{TypeDescriptor, TypeHandle, TypeKind};

/// How an ancestor was reached from the type being walked.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum AncestorKind {
    /// Reached through the superclass chain.
    Superclass,
    /// Reached through declared interfaces or their superinterfaces.
    Interface,
}

impl fmt::Display for AncestorKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Superclass => f.write_str("superclass"),
            Self::Interface => f.write_str("superinterface"),
        }
    }
}

/// One entry of an ancestor chain.
#[derive(Debug, Clone)]
pub struct Ancestor {
    /// The ancestor type.
    pub descriptor: TypeHandle,
    /// Whether it was reached as a superclass or an interface.
    pub kind: AncestorKind,
}

/// Every ancestor of `ty`, in traversal order. `ty` itself is not included.
///
/// Interfaces reachable along several paths are reported once, at their
/// first position.
pub fn ancestors_of(ty: &TypeDescriptor) -> Vec<Ancestor> {
    let superclasses = superclass_chain(ty);
    let mut ancestors: Vec<Ancestor> = superclasses
        .iter()
        .map(|class| Ancestor {
            descriptor: Arc::clone(class),
            kind: AncestorKind::Superclass,
        })
        .collect();

    let mut seen = HashSet::new();
    push_interfaces(ty, &mut seen, &mut ancestors);
    for class in &superclasses {
        push_interfaces(class, &mut seen, &mut ancestors);
    }
    ancestors
}

/// Superclasses of `ty`, nearest first, ending at the hierarchy root.
pub fn superclass_chain(ty: &TypeDescriptor) -> Vec<TypeHandle> {
    let mut chain = Vec::new();
    let mut current = ty.superclass();
    while let Some(class) = current {
        chain.push(Arc::clone(class));
        current = class.superclass();
    }
    chain
}

/// The type whose policy governs `ty`.
///
/// An enum constant with its own body is an anonymous subclass of its enum;
/// it resolves to that enum so every constant shares the enum's status.
/// Any other type governs itself.
pub fn declaring_type(ty: &TypeHandle) -> TypeHandle {
    if ty.kind() == TypeKind::EnumConstant {
        if let Some(parent) = ty.superclass() {
            if parent.kind() == TypeKind::Enum {
                return Arc::clone(parent);
            }
        }
    }
    Arc::clone(ty)
}

fn push_interfaces(ty: &TypeDescriptor, seen: &mut HashSet<String>, out: &mut Vec<Ancestor>) {
    for interface in ty.interfaces() {
        if !seen.insert(interface.name().to_owned()) {
            continue;
        }
        out.push(Ancestor {
            descriptor: Arc::clone(interface),
            kind: AncestorKind::Interface,
        });
        push_interfaces(interface, seen, out);
    }
}
