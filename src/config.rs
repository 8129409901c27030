//! Configuration loading and validation.
//!
//! The admission policy is configured from a single `policy.toml`. Every
//! section is optional; omitted sections fall back to the built-in lists.

use std::collections::{HashMap, HashSet};
use std::path::{Path, PathBuf};

use serde::Deserialize;

use crate::policy::builtin::{default_aliases, BuiltinAlias, BUILTIN_CONTAINER_IDS};
use crate::policy::class_list::{DEFAULT_ALLOW_OVERRIDE, DEFAULT_BLACKLIST};
use crate::policy::TrustContext;

/// Top-level policy configuration.
#[derive(Debug, Clone, Deserialize)]
pub struct PolicyConfig {
    /// Types refused regardless of any other signal.
    #[serde(default)]
    pub blacklist: BlacklistConfig,

    /// Types admitted without a marker or whitelist entry.
    #[serde(default)]
    pub allow_override: AllowOverrideConfig,

    /// Initial trust context.
    #[serde(default)]
    pub whitelist: WhitelistConfig,

    /// Canonical empty-container aliases.
    #[serde(default = "default_builtins")]
    pub builtins: Vec<BuiltinConfig>,
}

impl Default for PolicyConfig {
    fn default() -> Self {
        Self {
            blacklist: BlacklistConfig::default(),
            allow_override: AllowOverrideConfig::default(),
            whitelist: WhitelistConfig::default(),
            builtins: default_builtins(),
        }
    }
}

/// `[blacklist]` section.
#[derive(Debug, Clone, Deserialize)]
pub struct BlacklistConfig {
    /// Blacklisted type names.
    #[serde(default = "default_blacklist")]
    pub types: Vec<String>,
}

impl Default for BlacklistConfig {
    fn default() -> Self {
        Self {
            types: default_blacklist(),
        }
    }
}

/// `[allow_override]` section.
#[derive(Debug, Clone, Deserialize)]
pub struct AllowOverrideConfig {
    /// Force-allowed type names.
    #[serde(default = "default_allow_override")]
    pub types: Vec<String>,
}

impl Default for AllowOverrideConfig {
    fn default() -> Self {
        Self {
            types: default_allow_override(),
        }
    }
}

/// `[whitelist]` section.
#[derive(Debug, Clone, Default, Deserialize)]
pub struct WhitelistConfig {
    /// Trust every type that is not blacklisted.
    #[serde(default)]
    pub trust_all: bool,

    /// Explicitly whitelisted type names.
    #[serde(default)]
    pub types: Vec<String>,
}

/// One `[[builtins]]` entry.
#[derive(Debug, Clone, Deserialize)]
pub struct BuiltinConfig {
    /// Public type the aliases serialize as.
    pub canonical: String,

    /// Well-known id of the canonical type.
    pub id: i32,

    /// Private singleton classes standing in for `canonical`.
    #[serde(default)]
    pub aliases: Vec<String>,
}

impl PolicyConfig {
    /// Check the configuration for contradictions.
    ///
    /// # Errors
    ///
    /// Returns an error if a name is both blacklisted and force-allowed, a
    /// builtin id is outside the reserved container range or used twice, or
    /// an alias is claimed by two builtins.
    pub fn validate(&self) -> anyhow::Result<()> {
        let blacklisted: HashSet<&str> = self.blacklist.types.iter().map(String::as_str).collect();
        if let Some(name) = self
            .allow_override
            .types
            .iter()
            .find(|name| blacklisted.contains(name.as_str()))
        {
            anyhow::bail!("type {name} is both blacklisted and force-allowed");
        }

        let mut ids: HashMap<i32, &str> = HashMap::new();
        let mut aliases: HashMap<&str, &str> = HashMap::new();
        for builtin in &self.builtins {
            if !BUILTIN_CONTAINER_IDS.contains(&builtin.id) {
                anyhow::bail!(
                    "builtin {} uses id {} outside the reserved range {}..{}",
                    builtin.canonical,
                    builtin.id,
                    BUILTIN_CONTAINER_IDS.start,
                    BUILTIN_CONTAINER_IDS.end
                );
            }
            if let Some(previous) = ids.insert(builtin.id, builtin.canonical.as_str()) {
                anyhow::bail!(
                    "builtin id {} is used by both {previous} and {}",
                    builtin.id,
                    builtin.canonical
                );
            }
            for alias in &builtin.aliases {
                if let Some(previous) = aliases.insert(alias.as_str(), builtin.canonical.as_str()) {
                    anyhow::bail!(
                        "alias {alias} is claimed by both {previous} and {}",
                        builtin.canonical
                    );
                }
            }
        }
        Ok(())
    }

    /// Trust context described by the `[whitelist]` section.
    pub fn trust_context(&self) -> TrustContext {
        if self.whitelist.trust_all {
            TrustContext::all_but_blacklisted()
        } else {
            TrustContext::from_names(self.whitelist.types.iter().cloned())
        }
    }

    /// Builtin entries in policy form.
    pub fn builtin_aliases(&self) -> Vec<BuiltinAlias> {
        self.builtins
            .iter()
            .map(|builtin| BuiltinAlias {
                canonical: builtin.canonical.clone(),
                id: builtin.id,
                aliases: builtin.aliases.clone(),
            })
            .collect()
    }
}

// Default value functions for serde

fn default_blacklist() -> Vec<String> {
    DEFAULT_BLACKLIST.iter().map(|name| (*name).to_owned()).collect()
}
fn default_allow_override() -> Vec<String> {
    DEFAULT_ALLOW_OVERRIDE
        .iter()
        .map(|name| (*name).to_owned())
        .collect()
}
fn default_builtins() -> Vec<BuiltinConfig> {
    default_aliases()
        .into_iter()
        .map(|alias| BuiltinConfig {
            canonical: alias.canonical,
            id: alias.id,
            aliases: alias.aliases,
        })
        .collect()
}

/// Load the policy config from a TOML file.
///
/// # Errors
///
/// Returns an error if the file cannot be read or parsed.
pub fn load_config(path: &Path) -> anyhow::Result<PolicyConfig> {
    let contents = std::fs::read_to_string(path)
        .map_err(|e| anyhow::anyhow!("failed to read config at {}: {e}", path.display()))?;
    let config: PolicyConfig = toml::from_str(&contents)
        .map_err(|e| anyhow::anyhow!("failed to parse config at {}: {e}", path.display()))?;
    Ok(config)
}

/// Resolve the default config directory (`~/.classgate/`).
///
/// # Errors
///
/// Returns an error if the home directory cannot be determined.
pub fn config_dir() -> anyhow::Result<PathBuf> {
    let home = directories::BaseDirs::new()
        .ok_or_else(|| anyhow::anyhow!("cannot determine home directory"))?;
    Ok(home.home_dir().join(".classgate"))
}

/// Default location of `policy.toml`.
///
/// # Errors
///
/// Returns an error if the home directory cannot be determined.
pub fn default_config_path() -> anyhow::Result<PathBuf> {
    Ok(config_dir()?.join("policy.toml"))
}
