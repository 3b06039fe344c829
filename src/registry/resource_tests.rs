// Copyright (c) 2025 Erick Bourgeois, firestoned
// SPDX-License-Identifier: MIT

use super::*;

#[test]
fn scenario_s6_sanitized_name_embeds_set_identifier() {
    // S6: ownerId="owner", endpoint dnsName="sub.Example.Org", type="CNAME",
    // setIdentifier="myId-1".
    let name = sanitized_resource_name("owner", "sub.Example.Org", "CNAME", "myId-1");
    assert_eq!(name, "owner-sub-example-org-cname-myid-1");
}

#[test]
fn sanitized_name_omits_suffix_when_set_identifier_is_empty() {
    let name = sanitized_resource_name("owner", "sub.Example.Org", "CNAME", "");
    assert_eq!(name, "owner-sub-example-org-cname");
}

#[test]
fn build_mark_carries_correlation_labels() {
    let mut endpoint = Endpoint::new("sub.example.org", "CNAME", vec!["target.example.org".to_string()]);
    endpoint.labels.insert("resource".to_string(), "ingress/sub".to_string());

    let record = build_mark("owner", &endpoint);

    let labels = record.meta().labels.clone().unwrap();
    assert_eq!(labels.get(RESOURCE_LABEL_OWNER), Some(&"owner".to_string()));
    assert_eq!(
        labels.get(RESOURCE_LABEL_RECORD_NAME),
        Some(&"sub.example.org".to_string())
    );
    assert_eq!(labels.get(RESOURCE_LABEL_RECORD_TYPE), Some(&"CNAME".to_string()));
    assert_eq!(
        labels.get(RESOURCE_LABEL_RECORD_KEY),
        Some(&endpoint.key().table_hash())
    );
    assert_eq!(labels.get(RESOURCE_LABEL_RESOURCE), Some(&"ingress/sub".to_string()));
    assert_eq!(record.spec.endpoint, endpoint);
}

#[test]
fn build_mark_omits_resource_label_when_unset() {
    let endpoint = Endpoint::new("bare.example.org", "A", vec!["1.1.1.1".to_string()]);
    let record = build_mark("owner", &endpoint);
    let labels = record.meta().labels.clone().unwrap();
    assert!(!labels.contains_key(RESOURCE_LABEL_RESOURCE));
}
