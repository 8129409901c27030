//! Trust context behaviour.

use classgate::policy::{Resolution, TrustContext};

use crate::fixtures::{catalog, fixture, resolver};

#[test]
fn empty_context_whitelists_nothing() {
    let context = TrustContext::empty();
    assert!(!context.is_whitelisted("net.acme.fixtures.NotSerializable"));
    assert!(!context.trusts_all());
    assert_eq!(context.names().count(), 0);
}

#[test]
fn trust_all_whitelists_every_name() {
    let context = TrustContext::all_but_blacklisted();
    assert!(context.trusts_all());
    assert!(context.is_whitelisted("anything.at.All"));
    assert!(context.is_whitelisted("java.util.HashSet"));
}

#[test]
fn with_additional_leaves_original_untouched() {
    let original = TrustContext::from_names(["net.acme.A"]);
    let extended = original.with_additional("net.acme.B");

    assert!(original.is_whitelisted("net.acme.A"));
    assert!(!original.is_whitelisted("net.acme.B"));
    assert!(extended.is_whitelisted("net.acme.A"));
    assert!(extended.is_whitelisted("net.acme.B"));
    assert_eq!(extended.names().collect::<Vec<_>>(), vec!["net.acme.A", "net.acme.B"]);
}

#[test]
fn extending_trust_all_keeps_trust_all() {
    let extended = TrustContext::all_but_blacklisted().with_additional("net.acme.A");
    assert!(extended.trusts_all());
    assert_eq!(extended, TrustContext::all_but_blacklisted());
}

#[test]
fn whitelist_admits_unmarked_type() {
    let types = catalog();
    let unmarked = fixture(&types, "NotSerializable");

    assert!(resolver(TrustContext::empty()).resolve(&unmarked).is_err());

    let context = TrustContext::from_names(["net.acme.fixtures.NotSerializable"]);
    let resolution = resolver(context).resolve(&unmarked);
    assert!(matches!(resolution, Ok(Resolution::Registered(_))));
}

#[test]
fn whitelisting_an_enum_admits_its_constants() {
    let types = catalog();
    let context = TrustContext::empty().with_additional("net.acme.fixtures.BadFood");
    let resolution = resolver(context).resolve(&fixture(&types, "BadFood$Mud"));
    assert!(matches!(resolution, Ok(Resolution::Registered(_))));
}

#[test]
fn with_context_starts_a_fresh_cache() {
    let types = catalog();
    let unmarked = fixture(&types, "NotSerializable");
    let trusting = resolver(TrustContext::all_but_blacklisted());
    assert!(trusting.resolve(&unmarked).is_ok());

    let strict = trusting.with_context(TrustContext::empty());
    assert!(strict.registration(&unmarked).is_none());
    assert!(strict.resolve(&unmarked).is_err());
    assert!(!strict.context().trusts_all());
}
