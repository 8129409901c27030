//! Registration behaviour of the engine façade.

use classgate::catalog::TypeCatalog;
use classgate::engine::{RegistrationMode, SerializationEngine};
use classgate::policy::builtin::EMPTY_SET_ID;
use classgate::policy::{AdmissionError, Resolution, SerializerRef};

use crate::fixtures::{catalog, empty_whitelist, fixture, ty};

fn engine(mode: RegistrationMode) -> SerializationEngine<TypeCatalog> {
    let host = catalog().with_default_serializer(SerializerRef::named("host-default"));
    SerializationEngine::with_mode(empty_whitelist(), host, mode)
}

#[test]
fn checked_mode_is_the_default() {
    assert_eq!(RegistrationMode::default(), RegistrationMode::Checked);
    let engine = SerializationEngine::new(empty_whitelist(), catalog());
    assert_eq!(engine.mode(), RegistrationMode::Checked);
    assert!(!engine.is_modified());
}

#[test]
fn checked_registration_consults_whitelist() {
    let engine = engine(RegistrationMode::Checked);
    let unmarked = fixture(engine.host(), "NotSerializable");
    let result = engine.register(&unmarked);
    assert!(matches!(result, Err(AdmissionError::Untrusted { .. })), "{result:?}");

    let marked = fixture(engine.host(), "Element");
    let registration = match engine.register(&marked) {
        Ok(registration) => registration,
        Err(err) => panic!("marked type should register: {err}"),
    };
    assert_eq!(registration.id(), 32);
    assert!(!engine.is_modified());
}

#[test]
fn checked_registration_of_builtin_alias_uses_canonical_type() {
    let engine = engine(RegistrationMode::Checked);
    let empty_set = ty(engine.host(), "scala.collection.immutable.Set$EmptySet$");
    let registration = match engine.register(&empty_set) {
        Ok(registration) => registration,
        Err(err) => panic!("builtin alias should register: {err}"),
    };
    assert_eq!(registration.id(), EMPTY_SET_ID);
    assert_eq!(registration.serializer().name(), "host-default");
}

#[test]
fn trusting_registration_skips_whitelist_but_not_blacklist() {
    let engine = engine(RegistrationMode::Trusting);
    let unmarked = fixture(engine.host(), "NotSerializable");
    let registration = match engine.register(&unmarked) {
        Ok(registration) => registration,
        Err(err) => panic!("trusting registration should succeed: {err}"),
    };
    assert_eq!(registration.serializer().name(), "host-default");
    assert!(engine.is_modified());
    assert!(engine.resolver().has_manual_registration(&unmarked));

    let blacklisted = fixture(engine.host(), "SubHashSet");
    let err = match engine.register(&blacklisted) {
        Ok(registration) => panic!("blacklisted type registered: {registration:?}"),
        Err(err) => err,
    };
    assert_eq!(
        err.to_string(),
        "The superclass java.util.HashSet of net.acme.fixtures.SubHashSet is blacklisted, \
         so it cannot be used in serialization."
    );
}

#[test]
fn registered_type_is_found_by_lookup() {
    let engine = engine(RegistrationMode::Checked);
    let unmarked = fixture(engine.host(), "NotSerializable");
    let registration = match engine.register_with(&unmarked, SerializerRef::named("custom")) {
        Ok(registration) => registration,
        Err(err) => panic!("explicit registration should succeed: {err}"),
    };
    match engine.registration_for(&unmarked) {
        Ok(Resolution::Registered(found)) => assert_eq!(found, registration),
        other => panic!("expected registration, got {other:?}"),
    }
}

#[test]
fn reregistration_keeps_id_and_replaces_serializer() {
    let engine = engine(RegistrationMode::Checked);
    let element = fixture(engine.host(), "Element");
    let implicit = match engine.registration_for(&element) {
        Ok(Resolution::Registered(registration)) => registration,
        other => panic!("marked type should resolve, got {other:?}"),
    };
    assert!(!engine.is_modified());

    let explicit = match engine.register_with(&element, SerializerRef::named("custom")) {
        Ok(registration) => registration,
        Err(err) => panic!("explicit registration should succeed: {err}"),
    };
    assert_eq!(explicit.id(), implicit.id());
    assert_eq!(explicit.serializer().name(), "custom");
    assert!(engine.is_modified());

    let replaced = match engine.register_with(&element, SerializerRef::named("other")) {
        Ok(registration) => registration,
        Err(err) => panic!("second registration should succeed: {err}"),
    };
    assert_eq!(replaced.id(), implicit.id());
    assert_eq!(replaced.serializer().name(), "other");
}

#[test]
fn explicit_registration_of_array_checks_element_blacklist() {
    let engine = engine(RegistrationMode::Checked);
    let array = classgate::types::TypeDescriptor::array_of(&ty(engine.host(), "java.util.HashMap"));
    let result = engine.register_with(&array, SerializerRef::named("custom"));
    assert!(result.is_err_and(|err| err.is_blacklisted()));
    assert!(!engine.is_modified());
}
