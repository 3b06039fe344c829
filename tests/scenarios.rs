// Copyright (c) 2025 Erick Bourgeois, firestoned
// SPDX-License-Identifier: MIT

//! End-to-end coverage of the sidecar-TXT scenarios against the real
//! public API: [`DemoProvider`] (actual file I/O) wrapped by
//! [`TxtRegistry`] (no fakes).
//!
//! The side-table and resource-list scenarios (S4-S6) need a live
//! DynamoDB table or Kubernetes API respectively; those are covered at
//! the unit level in `registry/table_tests.rs` and
//! `registry/resource_tests.rs` against in-memory doubles instead, since
//! this crate never fabricates a client for either backend.

use std::time::Duration;

use zonekeeper::config::RegistryConfig;
use zonekeeper::demo_provider::DemoProvider;
use zonekeeper::endpoint::Endpoint;
use zonekeeper::provider::{Changes, DomainFilter};
use zonekeeper::registry::txt::TxtRegistry;
use zonekeeper::registry::Registry;

fn config(prefix: &str) -> RegistryConfig {
    RegistryConfig::new("owner", prefix, "", "", "", Duration::from_secs(0), false).unwrap()
}

#[tokio::test]
async fn scenario_s1_txt_create_writes_exact_wire_string() {
    let dir = tempfile::tempdir().unwrap();
    let path = dir.path().join("records.json");
    let provider = DemoProvider::load(&path, DomainFilter::match_all()).await.unwrap();
    let registry = TxtRegistry::new(provider, config("txt."));

    let mut endpoint = Endpoint::new("foo.example.org", "A", vec!["1.2.3.4".to_string()]);
    endpoint
        .labels
        .insert("resource".to_string(), "ingress/foo".to_string());
    let mut changes = Changes::default();
    changes.create.push(endpoint);
    registry.apply_changes(&changes).await.unwrap();

    let reloaded = DemoProvider::load(&path, DomainFilter::match_all()).await.unwrap();
    let raw = reloaded.records().await.unwrap();
    assert_eq!(raw.len(), 2);

    let txt = raw.iter().find(|e| e.record_type == "TXT").unwrap();
    assert_eq!(txt.dns_name, "txt.a-foo.example.org");
    assert_eq!(
        txt.targets[0],
        "\"heritage=external-dns,external-dns/owner=owner,external-dns/resource=ingress/foo\""
    );
}

#[tokio::test]
async fn scenario_s2_foreign_txt_passes_through_unowned() {
    let dir = tempfile::tempdir().unwrap();
    let path = dir.path().join("records.json");
    let foreign = Endpoint::new("qux.example.org", "TXT", vec!["hand-written note".to_string()]);
    tokio::fs::write(&path, serde_json::to_vec(&vec![foreign]).unwrap())
        .await
        .unwrap();

    let provider = DemoProvider::load(&path, DomainFilter::match_all()).await.unwrap();
    let registry = TxtRegistry::new(provider, config("txt."));

    let records = registry.records().await.unwrap();
    assert_eq!(records.len(), 1);
    assert_eq!(records[0].dns_name, "qux.example.org");
    assert_eq!(records[0].owner(), None);
}

#[tokio::test]
async fn scenario_s3_delete_filtered_when_owner_mismatched() {
    let dir = tempfile::tempdir().unwrap();
    let path = dir.path().join("records.json");

    let mut other_owned = Endpoint::new("shared.example.org", "A", vec!["5.5.5.5".to_string()]);
    other_owned.set_owner("someone-else");
    let mark = Endpoint::new(
        "txt.a-shared.example.org",
        "TXT",
        vec!["\"heritage=external-dns,external-dns/owner=someone-else\"".to_string()],
    );
    tokio::fs::write(&path, serde_json::to_vec(&vec![other_owned.clone(), mark]).unwrap())
        .await
        .unwrap();

    let provider = DemoProvider::load(&path, DomainFilter::match_all()).await.unwrap();
    let registry = TxtRegistry::new(provider, config("txt."));

    // The planner always feeds back the observed (mark-merged) endpoint, so
    // the delete request already carries the `owner=someone-else` label.
    let observed = registry.records().await.unwrap();
    let to_delete = observed
        .into_iter()
        .find(|e| e.dns_name == "shared.example.org" && e.record_type == "A")
        .unwrap();
    assert_eq!(to_delete.owner(), Some("someone-else"));

    let mut delete_changes = Changes::default();
    delete_changes.delete.push(to_delete);
    registry.apply_changes(&delete_changes).await.unwrap();

    let remaining = registry.records().await.unwrap();
    assert!(
        remaining.iter().any(|e| e.dns_name == "shared.example.org"),
        "a record owned by another controller must survive our delete request"
    );
}
