//! Host serialization engine façade.
//!
//! The wire format is not implemented here. The façade carries the parts of
//! an engine that interact with admission: explicit registration by callers,
//! registration lookup before a graph node is encoded or decoded, and
//! implicit registration of builtin singletons.

use tracing::debug;

use crate::policy::{AdmissionError, Registration, Resolution, Resolver, SerializerRef, TypeHost};
use crate::types::TypeHandle;

/// How [`SerializationEngine::register`] treats a caller's registration.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum RegistrationMode {
    /// Registration goes through the full admission policy, whitelist
    /// included.
    #[default]
    Checked,
    /// Registration is an explicit trust assertion and skips everything but
    /// the blacklist.
    Trusting,
}

/// A serialization engine instance bound to one resolver.
#[derive(Debug)]
pub struct SerializationEngine<H> {
    resolver: Resolver,
    host: H,
    mode: RegistrationMode,
}

impl<H: TypeHost> SerializationEngine<H> {
    /// Create an engine whose `register` consults the whitelist.
    pub fn new(resolver: Resolver, host: H) -> Self {
        Self::with_mode(resolver, host, RegistrationMode::Checked)
    }

    /// Create an engine with the given registration mode.
    pub fn with_mode(resolver: Resolver, host: H, mode: RegistrationMode) -> Self {
        Self {
            resolver,
            host,
            mode,
        }
    }

    /// Register `ty` with the host's default serializer.
    ///
    /// # Errors
    ///
    /// In [`RegistrationMode::Checked`] returns any refusal from the
    /// resolver; in [`RegistrationMode::Trusting`] only blacklist refusals.
    pub fn register(&self, ty: &TypeHandle) -> Result<Registration, AdmissionError> {
        match self.mode {
            RegistrationMode::Checked => match self.resolver.resolve(ty)? {
                Resolution::Registered(registration) => Ok(registration),
                Resolution::Unregistered => self.implicit_registration(ty),
            },
            RegistrationMode::Trusting => {
                let serializer = self.host.default_serializer(ty);
                self.resolver.force_register(ty, serializer)
            }
        }
    }

    /// Register `ty` with an explicit serializer, bypassing the whitelist.
    ///
    /// # Errors
    ///
    /// Returns a blacklist refusal if `ty` is blacklisted.
    pub fn register_with(
        &self,
        ty: &TypeHandle,
        serializer: SerializerRef,
    ) -> Result<Registration, AdmissionError> {
        self.resolver.force_register(ty, serializer)
    }

    /// Registration to use for a graph node of type `ty`.
    ///
    /// # Errors
    ///
    /// Returns the resolver's refusal.
    pub fn registration_for(&self, ty: &TypeHandle) -> Result<Resolution, AdmissionError> {
        self.resolver.resolve(ty)
    }

    /// Registration for a value whose plain lookup was
    /// [`Resolution::Unregistered`].
    ///
    /// # Errors
    ///
    /// Returns the resolver's refusal.
    pub fn implicit_registration(&self, ty: &TypeHandle) -> Result<Registration, AdmissionError> {
        let registration = self.resolver.resolve_or_register_builtin(ty, &self.host)?;
        debug!(
            type_name = ty.name(),
            id = registration.id(),
            "implicit registration"
        );
        Ok(registration)
    }

    /// Whether a caller has installed registrations on this engine.
    pub fn is_modified(&self) -> bool {
        self.resolver.is_modified()
    }

    /// The engine's resolver.
    pub fn resolver(&self) -> &Resolver {
        &self.resolver
    }

    /// The host type facility.
    pub fn host(&self) -> &H {
        &self.host
    }

    /// Registration mode.
    pub fn mode(&self) -> RegistrationMode {
        self.mode
    }
}
