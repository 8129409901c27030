//! Blacklist precedence and message tests.

use std::sync::Arc;

use classgate::policy::{
    AdmissionError, AdmissionPolicy, AllowOverride, AncestorKind, Blacklist, BuiltinTable,
    Resolution, Resolver, SerializerRef, TrustContext,
};
use classgate::types::TypeDescriptor;

use crate::fixtures::{all_but_blacklisted, catalog, empty_whitelist, fixture, ty};

fn refusal_message(resolver: &Resolver, name: &str) -> String {
    let types = catalog();
    match resolver.resolve(&ty(&types, name)) {
        Ok(resolution) => panic!("{name} should be refused, got {resolution:?}"),
        Err(err) => err.to_string(),
    }
}

#[test]
fn blacklisted_class_is_refused() {
    assert_eq!(
        refusal_message(&all_but_blacklisted(), "java.util.HashSet"),
        "Class java.util.HashSet is blacklisted, so it cannot be used in serialization."
    );
}

#[test]
fn blacklisted_subclass_names_superclass() {
    assert_eq!(
        refusal_message(&all_but_blacklisted(), "net.acme.fixtures.SubHashSet"),
        "The superclass java.util.HashSet of net.acme.fixtures.SubHashSet is blacklisted, \
         so it cannot be used in serialization."
    );
}

#[test]
fn blacklisted_subsubclass_names_blacklisted_superclass_not_parent() {
    assert_eq!(
        refusal_message(&all_but_blacklisted(), "net.acme.fixtures.SubSubHashSet"),
        "The superclass java.util.HashSet of net.acme.fixtures.SubSubHashSet is blacklisted, \
         so it cannot be used in serialization."
    );
}

#[test]
fn blacklisted_interface_impl_names_superinterface() {
    assert_eq!(
        refusal_message(&all_but_blacklisted(), "net.acme.fixtures.ConnectionImpl"),
        "The superinterface java.sql.Connection of net.acme.fixtures.ConnectionImpl is \
         blacklisted, so it cannot be used in serialization."
    );
}

#[test]
fn blacklisted_super_interface_impl_names_superinterface() {
    let types = catalog();
    let err = match all_but_blacklisted().resolve(&fixture(&types, "SubConnectionImpl")) {
        Ok(resolution) => panic!("should be refused, got {resolution:?}"),
        Err(err) => err,
    };
    assert_eq!(
        err,
        AdmissionError::AncestorBlacklisted {
            ancestor: "java.sql.Connection".to_owned(),
            kind: AncestorKind::Interface,
            type_name: "net.acme.fixtures.SubConnectionImpl".to_owned(),
        }
    );
    assert!(err.is_blacklisted());
}

#[test]
fn forcibly_allowed_type_is_admitted() {
    let types = catalog();
    for resolver in [all_but_blacklisted(), empty_whitelist()] {
        let resolution = resolver.resolve(&ty(&types, "java.util.LinkedHashSet"));
        assert!(
            matches!(resolution, Ok(Resolution::Registered(_))),
            "{resolution:?}"
        );
    }
}

#[test]
fn subclass_of_forcibly_allowed_type_is_not_exempt() {
    assert_eq!(
        refusal_message(&all_but_blacklisted(), "net.acme.fixtures.SubLinkedHashSet"),
        "The superclass java.util.HashSet of net.acme.fixtures.SubLinkedHashSet is blacklisted, \
         so it cannot be used in serialization."
    );
}

#[test]
fn blacklist_precedes_marker() {
    assert_eq!(
        refusal_message(&empty_whitelist(), "net.acme.fixtures.MarkedHashSet"),
        "The superclass java.util.HashSet of net.acme.fixtures.MarkedHashSet is blacklisted, \
         so it cannot be used in serialization."
    );
}

#[test]
fn blacklist_precedes_whitelist() {
    let resolver = crate::fixtures::resolver(
        TrustContext::empty().with_additional("net.acme.fixtures.SubHashSet"),
    );
    let message = refusal_message(&resolver, "net.acme.fixtures.SubHashSet");
    assert!(message.starts_with("The superclass java.util.HashSet"), "{message}");
}

#[test]
fn blacklisted_interface_itself_is_admitted_as_interface() {
    let types = catalog();
    let resolution = empty_whitelist().resolve(&ty(&types, "java.sql.Connection"));
    assert!(matches!(resolution, Ok(Resolution::Registered(_))));
}

#[test]
fn array_of_blacklisted_element_is_refused() {
    let types = catalog();
    let array = TypeDescriptor::array_of(&fixture(&types, "SubHashSet"));
    let result = all_but_blacklisted().resolve(&array);
    assert!(result.is_err_and(|err| err.is_blacklisted()));
}

#[test]
fn manual_registration_does_not_bypass_blacklist() {
    let types = catalog();
    let resolver = all_but_blacklisted();
    let result = resolver.force_register(
        &fixture(&types, "SubSubHashSet"),
        SerializerRef::named("custom"),
    );
    assert!(result.is_err_and(|err| err.is_blacklisted()));
    assert!(!resolver.is_modified());
}

#[test]
fn blacklisted_ancestor_that_is_force_allowed_is_skipped() {
    let types = catalog();
    let policy = AdmissionPolicy::new(
        Blacklist::from_names(["java.util.HashSet", "java.util.AbstractSet"]),
        AllowOverride::from_names(["java.util.AbstractSet"]),
        BuiltinTable::default(),
    );
    let resolver = Resolver::new(Arc::new(policy), TrustContext::all_but_blacklisted());
    let message = match resolver.resolve(&fixture(&types, "SubHashSet")) {
        Ok(resolution) => panic!("should be refused, got {resolution:?}"),
        Err(err) => err.to_string(),
    };
    // HashSet is reached first; AbstractSet would be skipped anyway.
    assert!(message.contains("superclass java.util.HashSet"), "{message}");

    let only_abstract = AdmissionPolicy::new(
        Blacklist::from_names(["java.util.AbstractSet"]),
        AllowOverride::from_names(["java.util.AbstractSet"]),
        BuiltinTable::default(),
    );
    let resolver = Resolver::new(Arc::new(only_abstract), TrustContext::all_but_blacklisted());
    assert!(resolver.resolve(&fixture(&types, "SubHashSet")).is_ok());
}
