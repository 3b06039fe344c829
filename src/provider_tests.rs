use super::*;

#[test]
fn changes_is_empty_when_all_vecs_empty() {
    assert!(Changes::default().is_empty());
}

#[test]
fn changes_is_not_empty_with_a_single_create() {
    let mut changes = Changes::default();
    changes.create.push(Endpoint::new("x.example.org", "A", vec!["1.1.1.1".into()]));
    assert!(!changes.is_empty());
}

#[test]
fn domain_filter_match_all_accepts_everything() {
    let filter = DomainFilter::match_all();
    assert!(filter.matches("anything.example.org"));
}

#[test]
fn domain_filter_include_restricts_to_suffixes() {
    let filter = DomainFilter {
        include: vec!["example.org".into()],
        exclude: vec![],
    };
    assert!(filter.matches("foo.example.org"));
    assert!(!filter.matches("foo.example.com"));
}

#[test]
fn domain_filter_exclude_wins_over_include() {
    let filter = DomainFilter {
        include: vec!["example.org".into()],
        exclude: vec!["internal.example.org".into()],
    };
    assert!(!filter.matches("foo.internal.example.org"));
}
