//! Process-wide deny and force-allow lists.
//!
//! Both lists are plain name sets fixed at construction and read without
//! synchronization afterwards.

use std::collections::HashSet;

/// Types that must never be materialized from untrusted bytes.
///
/// Hash-based containers whose bucket layout is attacker-controlled, live
/// system resources, and reflective or class-loading machinery.
pub const DEFAULT_BLACKLIST: &[&str] = &[
    // Mutable hash-based containers.
    "java.util.HashSet",
    "java.util.HashMap",
    "java.util.Hashtable",
    "java.util.WeakHashMap",
    "java.util.Dictionary",
    "java.util.Properties",
    // Class loading and reflection.
    "java.lang.Class",
    "java.lang.ClassLoader",
    "java.lang.reflect.Method",
    "java.lang.reflect.Field",
    "java.lang.reflect.Constructor",
    "java.lang.invoke.MethodHandle",
    // Processes and threads.
    "java.lang.Runtime",
    "java.lang.Process",
    "java.lang.ProcessBuilder",
    "java.lang.Thread",
    "java.lang.ThreadGroup",
    "java.lang.System",
    // Files and sockets.
    "java.io.File",
    "java.io.FileDescriptor",
    "java.io.RandomAccessFile",
    "java.net.URL",
    "java.net.URLConnection",
    "java.net.Socket",
    "java.net.ServerSocket",
    "java.net.DatagramSocket",
    // Database connections.
    "java.sql.Connection",
    "java.sql.Statement",
    "java.sql.ResultSet",
    "javax.sql.DataSource",
];

/// Types admitted even though the default policy would not admit them.
///
/// The ordered hash-based containers are deterministic in iteration order,
/// unlike the hash containers they extend.
pub const DEFAULT_ALLOW_OVERRIDE: &[&str] = &[
    "java.util.LinkedHashSet",
    "java.util.LinkedHashMap",
    "java.util.LinkedHashMap$Entry",
];

/// Immutable deny-list with absolute precedence over every trust signal.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Blacklist {
    names: HashSet<String>,
}

impl Blacklist {
    /// Build a blacklist from type names.
    pub fn from_names<I, S>(names: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        Self {
            names: names.into_iter().map(Into::into).collect(),
        }
    }

    /// Whether `name` is blacklisted.
    pub fn is_blacklisted(&self, name: &str) -> bool {
        self.names.contains(name)
    }

    /// Number of listed names.
    pub fn len(&self) -> usize {
        self.names.len()
    }

    /// Whether the list is empty.
    pub fn is_empty(&self) -> bool {
        self.names.is_empty()
    }
}

/// Immutable set of type names admitted without a marker or whitelist entry.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct AllowOverride {
    names: HashSet<String>,
}

impl AllowOverride {
    /// Build an override list from type names.
    pub fn from_names<I, S>(names: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        Self {
            names: names.into_iter().map(Into::into).collect(),
        }
    }

    /// Whether `name` is force-allowed.
    pub fn is_force_allowed(&self, name: &str) -> bool {
        self.names.contains(name)
    }

    /// Number of listed names.
    pub fn len(&self) -> usize {
        self.names.len()
    }

    /// Whether the list is empty.
    pub fn is_empty(&self) -> bool {
        self.names.is_empty()
    }
}
