use super::*;

fn ep(name: &str, ty: &str, targets: &[&str]) -> Endpoint {
    Endpoint::new(name, ty, targets.iter().map(|s| s.to_string()).collect())
}

#[test]
fn filter_owned_drops_mismatched_owner() {
    let mut owned = ep("a.example.org", "A", &["1.1.1.1"]);
    owned.set_owner("owner");
    let mut foreign = ep("b.example.org", "A", &["2.2.2.2"]);
    foreign.set_owner("other");

    let filtered = filter_owned(&[owned.clone(), foreign], "owner");
    assert_eq!(filtered, vec![owned]);
}

#[test]
fn compose_create_is_superset_and_stamps_owner() {
    // Testable property 2: compose(changes).Create is a superset of
    // changes.Create.
    let mut changes = Changes::default();
    changes.create.push(ep("foo.example.org", "A", &["1.2.3.4"]));

    let composed = compose(&changes, "owner");
    assert_eq!(composed.endpoint_changes.create.len(), 1);
    assert_eq!(composed.mark_creates.len(), 1);
    assert_eq!(composed.endpoint_changes.create[0].owner(), Some("owner"));
}

#[test]
fn compose_does_not_filter_create() {
    // Create has no prior owner to filter against.
    let mut changes = Changes::default();
    changes.create.push(ep("foo.example.org", "A", &["1.2.3.4"]));
    let composed = compose(&changes, "owner");
    assert_eq!(composed.endpoint_changes.create.len(), 1);
}

#[test]
fn compose_filters_delete_by_owner_scenario_s3() {
    // Scenario S3: Delete=[{dnsName:"bar", labels:{owner:"other"}}].
    let mut changes = Changes::default();
    let mut bar = ep("bar", "A", &["1.1.1.1"]);
    bar.set_owner("other");
    changes.delete.push(bar);

    let composed = compose(&changes, "owner");
    assert!(composed.endpoint_changes.delete.is_empty());
    assert!(composed.mark_deletes.is_empty());
}

#[test]
fn compose_filters_update_pairs_by_old_owner() {
    let mut changes = Changes::default();
    let mut old = ep("x.example.org", "A", &["1.1.1.1"]);
    old.set_owner("other");
    let new = ep("x.example.org", "A", &["2.2.2.2"]);
    changes.update_old.push(old);
    changes.update_new.push(new);

    let composed = compose(&changes, "owner");
    assert!(composed.endpoint_changes.update_old.is_empty());
    assert!(composed.mark_updates.is_empty());
}

#[test]
fn compose_stamps_target_label_for_srv() {
    let mut changes = Changes::default();
    changes
        .create
        .push(ep("_sip._tcp.example.org", "SRV", &["10 60 5060 sip.example.org"]));

    let composed = compose(&changes, "owner");
    assert_eq!(
        composed.mark_creates[0].labels.get("target"),
        Some(&"10 60 5060 sip.example.org".to_string())
    );
}

#[test]
fn compose_preserves_unowned_endpoints_not_in_changes() {
    // Testable property 3 is enforced structurally: compose never touches
    // endpoints outside the change set it is given.
    let changes = Changes::default();
    let composed = compose(&changes, "owner");
    assert!(composed.endpoint_changes.is_empty());
}
