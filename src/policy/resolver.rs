//! Admission decisions and the per-instance registration cache.
//!
//! [`Resolver::resolve`] applies the policy steps in strict order:
//!
//! 1. leaf types (root, primitives, string) are admitted with a fixed id;
//! 2. arrays are admitted iff their innermost element type is;
//! 3. interfaces and abstract classes are admitted unconditionally;
//! 4. an enum constant with its own body is judged as its declaring enum;
//! 5. a blacklisted type or ancestor is refused;
//! 6. a force-allowed type is admitted;
//! 7. a marked type (own or inherited marker) is admitted;
//! 8. a type whitelisted by the [`TrustContext`] is admitted;
//! 9. anything else is refused as untrusted.
//!
//! Admitted types are memoized, so a type keeps its numeric id for the
//! lifetime of the resolver.

use std::collections::{HashMap, HashSet};
use std::fmt;
use std::hash::{Hash, Hasher};
use std::sync::atomic::{AtomicI32, Ordering};
use std::sync::{Arc, PoisonError, RwLock, RwLockReadGuard, RwLockWriteGuard};

use tracing::{debug, info, warn};

use super::builtin::{leaf_id, BuiltinAlias, FIRST_DYNAMIC_ID};
use super::error::AdmissionError;
use super::hierarchy::{ancestors_of, declaring_type};
use super::registration::{Registration, Resolution, SerializerRef};
use super::whitelist::TrustContext;
use super::AdmissionPolicy;
use crate::types::{TypeDescriptor, TypeHandle, TypeKind};

/// Facilities the resolver borrows from its host serialization engine.
pub trait TypeHost {
    /// Describe the type with the given name, if the host can load it.
    fn describe(&self, name: &str) -> Option<TypeHandle>;

    /// Serializer the host would use for `ty` by default.
    fn default_serializer(&self, ty: &TypeDescriptor) -> SerializerRef;
}

/// Cache key comparing descriptors by identity. Holding the handle keeps the
/// pointer alive for as long as the entry exists.
#[derive(Clone)]
struct TypeKey(TypeHandle);

impl TypeKey {
    fn of(ty: &TypeHandle) -> Self {
        Self(Arc::clone(ty))
    }
}

impl PartialEq for TypeKey {
    fn eq(&self, other: &Self) -> bool {
        Arc::ptr_eq(&self.0, &other.0)
    }
}

impl Eq for TypeKey {}

impl Hash for TypeKey {
    fn hash<H: Hasher>(&self, state: &mut H) {
        Arc::as_ptr(&self.0).hash(state);
    }
}

#[derive(Default)]
struct Cache {
    registrations: HashMap<TypeKey, Registration>,
    /// Types registered through [`Resolver::force_register`].
    manual: HashSet<TypeKey>,
    /// Canonical builtin types bound to the host's default serializer.
    host_bound: HashSet<TypeKey>,
}

impl Cache {
    /// Canonical registration that must not be rebound through the host.
    fn settled(&self, key: &TypeKey) -> Option<Registration> {
        if self.manual.contains(key) || self.host_bound.contains(key) {
            self.registrations.get(key).cloned()
        } else {
            None
        }
    }
}

/// Class-admission resolver bound to one [`TrustContext`].
///
/// Safe to share between threads. The policy and context are immutable; the
/// registration cache is populated insert-if-absent under a write lock, so
/// concurrent first resolutions of a type agree on one id. The cache is
/// keyed by descriptor identity: a different descriptor carrying the same
/// name is judged on its own.
pub struct Resolver {
    policy: Arc<AdmissionPolicy>,
    context: TrustContext,
    cache: RwLock<Cache>,
    next_id: AtomicI32,
}

impl fmt::Debug for Resolver {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let cache = self.read_cache();
        f.debug_struct("Resolver")
            .field("context", &self.context)
            .field("registrations", &cache.registrations.len())
            .field("manual", &cache.manual.len())
            .finish()
    }
}

impl Resolver {
    /// Create a resolver with an empty cache.
    pub fn new(policy: Arc<AdmissionPolicy>, context: TrustContext) -> Self {
        Self {
            policy,
            context,
            cache: RwLock::new(Cache::default()),
            next_id: AtomicI32::new(FIRST_DYNAMIC_ID),
        }
    }

    /// A fresh resolver sharing this policy under another context.
    pub fn with_context(&self, context: TrustContext) -> Self {
        Self::new(Arc::clone(&self.policy), context)
    }

    /// The trust context this resolver consults.
    pub fn context(&self) -> &TrustContext {
        &self.context
    }

    /// The process-wide policy.
    pub fn policy(&self) -> &AdmissionPolicy {
        &self.policy
    }

    /// Decide whether `ty` may be serialized.
    ///
    /// # Errors
    ///
    /// Returns [`AdmissionError::Blacklisted`] or
    /// [`AdmissionError::AncestorBlacklisted`] when the blacklist applies, and
    /// [`AdmissionError::Untrusted`] when no trust path admits the type.
    pub fn resolve(&self, ty: &TypeHandle) -> Result<Resolution, AdmissionError> {
        if let Some(registration) = self.registration(ty) {
            return Ok(Resolution::Registered(registration));
        }
        if self.policy.builtins().is_alias(ty.name()) {
            debug!(type_name = ty.name(), "builtin singleton not registered yet");
            return Ok(Resolution::Unregistered);
        }
        match self.admit(ty) {
            Ok(()) => {
                let registration = self.memoize(ty);
                debug!(
                    type_name = ty.name(),
                    id = registration.id(),
                    "type admitted"
                );
                Ok(Resolution::Registered(registration))
            }
            Err(err) => {
                match &err {
                    AdmissionError::AncestorBlacklisted { ancestor, kind, .. } => warn!(
                        type_name = ty.name(),
                        ancestor = ancestor.as_str(),
                        kind = %kind,
                        "type refused: blacklisted ancestor"
                    ),
                    _ => warn!(type_name = ty.name(), error = %err, "type refused"),
                }
                Err(err)
            }
        }
    }

    /// Registration for `ty`, registering builtin singletons implicitly.
    ///
    /// A private empty-container class is bound to the registration of its
    /// public canonical type, under the canonical type's well-known id and
    /// the host's default serializer for it. All aliases of one canonical
    /// type therefore share one registration. A canonical type memoized
    /// earlier by plain resolution keeps its id but is rebound to the host's
    /// serializer; a manual registration of it is left alone. Other types go
    /// through [`Resolver::resolve`].
    ///
    /// # Errors
    ///
    /// Returns the refusal from [`Resolver::resolve`] for ordinary types, or
    /// [`AdmissionError::UnknownBuiltin`] when the host cannot describe the
    /// canonical type.
    pub fn resolve_or_register_builtin(
        &self,
        ty: &TypeHandle,
        host: &dyn TypeHost,
    ) -> Result<Registration, AdmissionError> {
        if let Some(registration) = self.registration(ty) {
            return Ok(registration);
        }
        let Some(alias) = self.policy.builtins().alias_of(ty.name()) else {
            return self
                .resolve(ty)?
                .into_registration()
                .ok_or_else(|| AdmissionError::UnknownBuiltin(ty.name().to_owned()));
        };

        let canonical = self.canonical_registration(alias, host)?;
        let registration = self
            .write_cache()
            .registrations
            .entry(TypeKey::of(ty))
            .or_insert(canonical)
            .clone();
        debug!(
            type_name = ty.name(),
            canonical = registration.descriptor().name(),
            id = registration.id(),
            "builtin singleton registered as canonical type"
        );
        Ok(registration)
    }

    /// Install a registration chosen by the caller.
    ///
    /// This is an explicit trust assertion: force-allow, marker and whitelist
    /// are not consulted, but the blacklist still refuses. Registering a type
    /// again keeps its id and replaces the serializer.
    ///
    /// # Errors
    ///
    /// Returns a blacklist refusal when `ty` (or, for arrays, its element
    /// type) is blacklisted directly or through an ancestor.
    pub fn force_register(
        &self,
        ty: &TypeHandle,
        serializer: SerializerRef,
    ) -> Result<Registration, AdmissionError> {
        self.check_blacklist(&declaring_type(innermost_component(ty)))
            .inspect_err(|err| {
                warn!(type_name = ty.name(), error = %err, "manual registration refused");
            })?;

        let registration = {
            let mut cache = self.write_cache();
            let key = TypeKey::of(ty);
            let id = match cache.registrations.get(&key) {
                Some(existing) => existing.id(),
                None => self.id_for(ty.name()),
            };
            let registration = Registration::new(Arc::clone(ty), id, serializer);
            cache.registrations.insert(key.clone(), registration.clone());
            cache.manual.insert(key);
            registration
        };

        info!(
            type_name = ty.name(),
            id = registration.id(),
            serializer = %registration.serializer(),
            "manual registration installed"
        );
        Ok(registration)
    }

    /// Memoized registration for exactly this descriptor, if any.
    pub fn registration(&self, ty: &TypeHandle) -> Option<Registration> {
        self.read_cache()
            .registrations
            .get(&TypeKey::of(ty))
            .cloned()
    }

    /// Whether a caller has installed any manual registration.
    pub fn is_modified(&self) -> bool {
        !self.read_cache().manual.is_empty()
    }

    /// Whether exactly this descriptor was registered manually.
    pub fn has_manual_registration(&self, ty: &TypeHandle) -> bool {
        self.read_cache().manual.contains(&TypeKey::of(ty))
    }

    fn admit(&self, ty: &TypeHandle) -> Result<(), AdmissionError> {
        if ty.kind() == TypeKind::Primitive || leaf_id(ty.name()).is_some() {
            return Ok(());
        }
        if ty.kind() == TypeKind::Array {
            return match ty.component() {
                Some(component) => self.admit_element(component),
                None => Err(AdmissionError::Untrusted {
                    type_name: ty.name().to_owned(),
                }),
            };
        }
        if ty.is_abstract_or_interface() {
            return Ok(());
        }

        let target = declaring_type(ty);
        self.check_blacklist(&target)?;

        if self.policy.allow_override().is_force_allowed(target.name()) {
            return Ok(());
        }
        if self.policy.annotations().is_explicitly_allowed(&target) {
            return Ok(());
        }
        if self.context.is_whitelisted(target.name()) || self.context.is_whitelisted(ty.name()) {
            return Ok(());
        }
        Err(AdmissionError::Untrusted {
            type_name: target.name().to_owned(),
        })
    }

    fn admit_element(&self, element: &TypeHandle) -> Result<(), AdmissionError> {
        if self.registration(element).is_some() || self.policy.builtins().is_alias(element.name())
        {
            return Ok(());
        }
        self.admit(element)
    }

    fn check_blacklist(&self, ty: &TypeDescriptor) -> Result<(), AdmissionError> {
        let blacklist = self.policy.blacklist();
        let overrides = self.policy.allow_override();

        if blacklist.is_blacklisted(ty.name()) {
            return Err(AdmissionError::Blacklisted {
                type_name: ty.name().to_owned(),
            });
        }
        // An exact-name override exempts the type from inherited entries.
        if overrides.is_force_allowed(ty.name()) {
            return Ok(());
        }
        for ancestor in ancestors_of(ty) {
            let name = ancestor.descriptor.name();
            if blacklist.is_blacklisted(name) && !overrides.is_force_allowed(name) {
                return Err(AdmissionError::AncestorBlacklisted {
                    ancestor: name.to_owned(),
                    kind: ancestor.kind,
                    type_name: ty.name().to_owned(),
                });
            }
        }
        Ok(())
    }

    fn canonical_registration(
        &self,
        alias: &BuiltinAlias,
        host: &dyn TypeHost,
    ) -> Result<Registration, AdmissionError> {
        let canonical = host
            .describe(&alias.canonical)
            .ok_or_else(|| AdmissionError::UnknownBuiltin(alias.canonical.clone()))?;
        let key = TypeKey::of(&canonical);
        if let Some(registration) = self.read_cache().settled(&key) {
            return Ok(registration);
        }

        // The host is called without holding the cache lock.
        let serializer = host.default_serializer(&canonical);
        let mut cache = self.write_cache();
        if let Some(registration) = cache.settled(&key) {
            return Ok(registration);
        }
        let id = cache
            .registrations
            .get(&key)
            .map_or(alias.id, Registration::id);
        let registration = Registration::new(canonical, id, serializer);
        cache.registrations.insert(key.clone(), registration.clone());
        cache.host_bound.insert(key);
        debug!(
            type_name = alias.canonical.as_str(),
            id,
            serializer = %registration.serializer(),
            "canonical builtin bound to host serializer"
        );
        Ok(registration)
    }

    fn memoize(&self, ty: &TypeHandle) -> Registration {
        self.write_cache()
            .registrations
            .entry(TypeKey::of(ty))
            .or_insert_with(|| {
                Registration::new(Arc::clone(ty), self.id_for(ty.name()), SerializerRef::default())
            })
            .clone()
    }

    fn id_for(&self, name: &str) -> i32 {
        leaf_id(name)
            .or_else(|| self.policy.builtins().canonical_id(name))
            .unwrap_or_else(|| self.next_id.fetch_add(1, Ordering::Relaxed))
    }

    fn read_cache(&self) -> RwLockReadGuard<'_, Cache> {
        self.cache.read().unwrap_or_else(PoisonError::into_inner)
    }

    fn write_cache(&self) -> RwLockWriteGuard<'_, Cache> {
        self.cache.write().unwrap_or_else(PoisonError::into_inner)
    }
}

fn innermost_component(ty: &TypeHandle) -> &TypeHandle {
    let mut current = ty;
    while let Some(component) = current.component() {
        current = component;
    }
    current
}
