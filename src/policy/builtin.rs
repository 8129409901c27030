//! Built-in numeric ids and canonical empty-container aliases.
//!
//! Ids below [`FIRST_DYNAMIC_ID`] are reserved. Leaf types (the root, the
//! primitives and the string type) own fixed ids below
//! [`FIRST_BUILTIN_CONTAINER_ID`]; the canonical empty containers own fixed
//! ids from there up. Every other type receives a fresh id per resolver.

use std::collections::HashMap;
use std::ops::Range;

use crate::types::{ROOT_TYPE_NAME, STRING_TYPE_NAME};

/// Id of the hierarchy root.
pub const ROOT_ID: i32 = 0;
/// Id of the string type.
pub const STRING_ID: i32 = 9;
/// First id reserved for canonical empty containers.
pub const FIRST_BUILTIN_CONTAINER_ID: i32 = 10;
/// Id shared by every "empty sequence" singleton.
pub const EMPTY_LIST_ID: i32 = 10;
/// Id shared by every "empty set" singleton.
pub const EMPTY_SET_ID: i32 = 11;
/// Id shared by every "empty mapping" singleton.
pub const EMPTY_MAP_ID: i32 = 12;
/// First id handed out to ordinary types.
pub const FIRST_DYNAMIC_ID: i32 = 32;

/// Ids a configured builtin container may use.
pub const BUILTIN_CONTAINER_IDS: Range<i32> = FIRST_BUILTIN_CONTAINER_ID..FIRST_DYNAMIC_ID;

const PRIMITIVE_IDS: &[(&str, i32)] = &[
    ("boolean", 1),
    ("byte", 2),
    ("char", 3),
    ("short", 4),
    ("int", 5),
    ("long", 6),
    ("float", 7),
    ("double", 8),
];

/// Fixed id of a leaf type admitted without any policy check.
pub fn leaf_id(name: &str) -> Option<i32> {
    match name {
        ROOT_TYPE_NAME => Some(ROOT_ID),
        STRING_TYPE_NAME => Some(STRING_ID),
        _ => PRIMITIVE_IDS
            .iter()
            .find(|(primitive, _)| *primitive == name)
            .map(|(_, id)| *id),
    }
}

/// A public container type and the private singleton classes that stand in
/// for it.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct BuiltinAlias {
    /// Public type every alias serializes as.
    pub canonical: String,
    /// Well-known id of the canonical type.
    pub id: i32,
    /// Private implementation classes interchangeable with `canonical`.
    pub aliases: Vec<String>,
}

/// The default empty list, set and map aliases.
pub fn default_aliases() -> Vec<BuiltinAlias> {
    vec![
        BuiltinAlias {
            canonical: "java.util.Collections$EmptyList".to_owned(),
            id: EMPTY_LIST_ID,
            aliases: vec![
                "kotlin.collections.EmptyList".to_owned(),
                "scala.collection.immutable.Nil$".to_owned(),
            ],
        },
        BuiltinAlias {
            canonical: "java.util.Collections$EmptySet".to_owned(),
            id: EMPTY_SET_ID,
            aliases: vec![
                "kotlin.collections.EmptySet".to_owned(),
                "scala.collection.immutable.Set$EmptySet$".to_owned(),
            ],
        },
        BuiltinAlias {
            canonical: "java.util.Collections$EmptyMap".to_owned(),
            id: EMPTY_MAP_ID,
            aliases: vec![
                "kotlin.collections.EmptyMap".to_owned(),
                "scala.collection.immutable.Map$EmptyMap$".to_owned(),
            ],
        },
    ]
}

/// Lookup table from private singleton classes to their canonical type.
#[derive(Debug, Clone, Default)]
pub struct BuiltinTable {
    entries: Vec<BuiltinAlias>,
    by_alias: HashMap<String, usize>,
    by_canonical: HashMap<String, usize>,
}

impl BuiltinTable {
    /// Index the given aliases. Later entries win on conflicting names.
    pub fn new(entries: Vec<BuiltinAlias>) -> Self {
        let mut by_alias = HashMap::new();
        let mut by_canonical = HashMap::new();
        for (index, entry) in entries.iter().enumerate() {
            by_canonical.insert(entry.canonical.clone(), index);
            for alias in &entry.aliases {
                by_alias.insert(alias.clone(), index);
            }
        }
        Self {
            entries,
            by_alias,
            by_canonical,
        }
    }

    /// The canonical entry `name` is a private alias of.
    pub fn alias_of(&self, name: &str) -> Option<&BuiltinAlias> {
        self.by_alias
            .get(name)
            .and_then(|index| self.entries.get(*index))
    }

    /// Whether `name` is a private alias needing canonical registration.
    pub fn is_alias(&self, name: &str) -> bool {
        self.by_alias.contains_key(name)
    }

    /// Well-known id of a canonical container type.
    pub fn canonical_id(&self, name: &str) -> Option<i32> {
        self.by_canonical
            .get(name)
            .and_then(|index| self.entries.get(*index))
            .map(|entry| entry.id)
    }

    /// All configured entries.
    pub fn entries(&self) -> &[BuiltinAlias] {
        &self.entries
    }
}

impl From<Vec<BuiltinAlias>> for BuiltinTable {
    fn from(entries: Vec<BuiltinAlias>) -> Self {
        Self::new(entries)
    }
}
