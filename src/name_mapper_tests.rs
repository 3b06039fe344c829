use super::*;

#[test]
fn new_rejects_prefix_and_suffix_both_set() {
    let err = NameMapper::new("txt.", "-txt", "").unwrap_err();
    assert!(matches!(err, ConfigError::PrefixAndSuffixSet));
}

#[test]
fn to_mark_name_legacy_prefix_matches_s1() {
    // Scenario S1 from the spec: prefix = "txt.".
    let mapper = NameMapper::new("txt.", "", "").unwrap();
    assert_eq!(
        mapper.to_mark_name("foo.example.org", "A"),
        "txt.a-foo.example.org"
    );
}

#[test]
fn to_mark_name_no_affix_still_embeds_type() {
    let mapper = NameMapper::new("", "", "").unwrap();
    assert_eq!(mapper.to_mark_name("foo.example.org", "A"), "a-foo.example.org");
}

#[test]
fn to_mark_name_suffix_form() {
    let mapper = NameMapper::new("", "-txt", "").unwrap();
    assert_eq!(
        mapper.to_mark_name("foo.example.org", "CNAME"),
        "cname-foo-txt.example.org"
    );
}

#[test]
fn to_mark_name_type_embedded_prefix_token() {
    let mapper = NameMapper::new("%{record_type}-txt.", "", "").unwrap();
    assert_eq!(
        mapper.to_mark_name("foo.example.org", "A"),
        "a-txt.foo.example.org"
    );
}

#[test]
fn to_mark_name_replaces_wildcard_leading_label() {
    let mapper = NameMapper::new("txt.", "", "wildcard").unwrap();
    assert_eq!(
        mapper.to_mark_name("*.example.org", "A"),
        "txt.a-wildcard.example.org"
    );
}

#[test]
fn roundtrip_legacy_prefix() {
    let mapper = NameMapper::new("txt.", "", "").unwrap();
    let mark = mapper.to_mark_name("foo.example.org", "A");
    let (endpoint_name, record_type) = mapper.to_endpoint_name(&mark);
    assert_eq!(endpoint_name, "foo.example.org");
    assert_eq!(record_type, "A");
}

#[test]
fn roundtrip_type_embedded() {
    let mapper = NameMapper::new("%{record_type}-txt.", "", "").unwrap();
    let mark = mapper.to_mark_name("foo.example.org", "CNAME");
    let (endpoint_name, record_type) = mapper.to_endpoint_name(&mark);
    assert_eq!(endpoint_name, "foo.example.org");
    assert_eq!(record_type, "CNAME");
}

#[test]
fn roundtrip_no_affix_apex_name() {
    let mapper = NameMapper::new("", "", "").unwrap();
    let mark = mapper.to_mark_name("example.org", "NS");
    let (endpoint_name, record_type) = mapper.to_endpoint_name(&mark);
    assert_eq!(endpoint_name, "example.org");
    assert_eq!(record_type, "NS");
}

#[test]
fn to_legacy_mark_name_matches_primary_for_static_affix() {
    let mapper = NameMapper::new("txt.", "", "").unwrap();
    assert_eq!(
        mapper.to_legacy_mark_name("foo.example.org", "A"),
        mapper.to_mark_name("foo.example.org", "A")
    );
}

#[test]
fn to_legacy_mark_name_drops_token_affix_to_bare_typed_form() {
    let mapper = NameMapper::new("%{record_type}-txt.", "", "").unwrap();
    assert_eq!(
        mapper.to_legacy_mark_name("foo.example.org", "A"),
        "a-foo.example.org"
    );
    assert_ne!(
        mapper.to_legacy_mark_name("foo.example.org", "A"),
        mapper.to_mark_name("foo.example.org", "A")
    );
}

#[test]
fn to_endpoint_name_returns_empty_on_no_match() {
    let mapper = NameMapper::new("txt.", "", "").unwrap();
    let (name, ty) = mapper.to_endpoint_name("unrelated.example.org");
    assert_eq!(name, "");
    assert_eq!(ty, "");
}
