use super::*;

#[test]
fn key_lowercases_dns_name() {
    let e = Endpoint::new("Foo.EXAMPLE.org", "A", vec!["1.2.3.4".into()]);
    assert_eq!(e.key().dns_name, "foo.example.org");
}

#[test]
fn table_hash_matches_wire_format() {
    let key = EndpointKey::new("foo.example.org", "A", "set-1");
    assert_eq!(key.table_hash(), "foo.example.org#A#set-1");
}

#[test]
fn same_targets_ignores_order() {
    let a = Endpoint::new("x.example.org", "A", vec!["1.1.1.1".into(), "2.2.2.2".into()]);
    let b = Endpoint::new("x.example.org", "A", vec!["2.2.2.2".into(), "1.1.1.1".into()]);
    assert!(a.same_targets(&b));
}

#[test]
fn same_targets_detects_difference() {
    let a = Endpoint::new("x.example.org", "A", vec!["1.1.1.1".into()]);
    let b = Endpoint::new("x.example.org", "A", vec!["2.2.2.2".into()]);
    assert!(!a.same_targets(&b));
}

#[test]
fn owner_roundtrip() {
    let mut e = Endpoint::new("x.example.org", "A", vec!["1.1.1.1".into()]);
    assert_eq!(e.owner(), None);
    e.set_owner("owner");
    assert!(e.is_owned_by("owner"));
    assert!(!e.is_owned_by("other"));
}

#[test]
fn check_unique_keys_detects_duplicate() {
    let a = Endpoint::new("dup.example.org", "A", vec!["1.1.1.1".into()]);
    let b = Endpoint::new("dup.example.org", "A", vec!["2.2.2.2".into()]);
    let err = check_unique_keys(&[a, b]).unwrap_err();
    assert_eq!(err.dns_name, "dup.example.org");
}

#[test]
fn check_unique_keys_accepts_distinct_set_identifiers() {
    let mut a = Endpoint::new("weighted.example.org", "A", vec!["1.1.1.1".into()]);
    a.set_identifier = "blue".into();
    let mut b = Endpoint::new("weighted.example.org", "A", vec!["2.2.2.2".into()]);
    b.set_identifier = "green".into();
    assert!(check_unique_keys(&[a, b]).is_ok());
}
