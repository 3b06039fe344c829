// Copyright (c) 2025 Erick Bourgeois, firestoned
// SPDX-License-Identifier: MIT

use std::collections::HashMap;
use std::sync::Mutex as StdMutex;
use std::time::Duration;

use super::*;
use crate::config::RegistryConfig;
use crate::endpoint::EndpointKey;
use crate::heritage;
use crate::provider::ProviderError;

struct FakeProvider {
    records: StdMutex<Vec<Endpoint>>,
    applied: StdMutex<Option<Changes>>,
}

impl FakeProvider {
    fn new(records: Vec<Endpoint>) -> Self {
        Self {
            records: StdMutex::new(records),
            applied: StdMutex::new(None),
        }
    }
}

#[async_trait]
impl Provider for FakeProvider {
    async fn records(&self) -> Result<Vec<Endpoint>, ProviderError> {
        Ok(self.records.lock().unwrap().clone())
    }

    async fn apply_changes(&self, changes: &Changes) -> Result<(), ProviderError> {
        *self.applied.lock().unwrap() = Some(changes.clone());
        Ok(())
    }
}

#[derive(Default)]
struct FakeBackend {
    rows: StdMutex<HashMap<String, (String, Labels)>>,
}

impl FakeBackend {
    fn seed(self, key: &str, owner: &str, labels: Labels) -> Self {
        self.rows
            .lock()
            .unwrap()
            .insert(key.to_string(), (owner.to_string(), labels));
        self
    }

    fn row(&self, key: &str) -> Option<(String, Labels)> {
        self.rows.lock().unwrap().get(key).cloned()
    }
}

#[async_trait]
impl Backend for FakeBackend {
    async fn validate_schema(&self) -> Result<(), StoreError> {
        Ok(())
    }

    async fn scan_owner_rows(&self, owner_id: &str) -> Result<HashMap<String, Labels>, StoreError> {
        Ok(self
            .rows
            .lock()
            .unwrap()
            .iter()
            .filter(|(_, (owner, _))| owner == owner_id)
            .map(|(k, (_, labels))| (k.clone(), labels.clone()))
            .collect())
    }

    async fn put_row(
        &self,
        key: &str,
        owner_id: &str,
        labels: &Labels,
        fail_if_exists: bool,
    ) -> Result<(), StoreError> {
        let mut rows = self.rows.lock().unwrap();
        if fail_if_exists && rows.contains_key(key) {
            return Err(StoreError::DuplicateClaim(key.to_string()));
        }
        rows.insert(key.to_string(), (owner_id.to_string(), labels.clone()));
        Ok(())
    }

    async fn delete_row(&self, key: &str) -> Result<(), StoreError> {
        self.rows.lock().unwrap().remove(key);
        Ok(())
    }
}

fn config() -> RegistryConfig {
    RegistryConfig::new("owner", "", "", "", "", Duration::from_secs(0), false).unwrap()
}

#[tokio::test]
async fn scenario_s4_duplicate_claim_drops_create() {
    // A second controller already claimed this key between our scan and our
    // own insert attempt; the create must be silently dropped, not surfaced
    // as an error, and the rest of the batch still applies.
    let key = EndpointKey::new("dup.example.org", "A", "").table_hash();
    let backend = FakeBackend::default().seed(&key, "other-owner", Labels::new());

    let provider = FakeProvider::new(vec![]);
    let registry = TableRegistry::new(provider, config(), backend);

    let mut dup = Endpoint::new("dup.example.org", "A", vec!["1.2.3.4".to_string()]);
    let mut ok = Endpoint::new("fine.example.org", "A", vec!["5.6.7.8".to_string()]);
    dup.labels.insert("resource".to_string(), "ingress/dup".to_string());
    ok.labels.insert("resource".to_string(), "ingress/ok".to_string());

    let mut changes = Changes::default();
    changes.create.push(dup);
    changes.create.push(ok);

    registry.apply_changes(&changes).await.unwrap();

    let applied = registry.provider.applied.lock().unwrap().clone().unwrap();
    assert_eq!(applied.create.len(), 1);
    assert_eq!(applied.create[0].dns_name, "fine.example.org");
}

#[tokio::test]
async fn scenario_s5_migration_hint_on_read() {
    // A stale sidecar-TXT mark exists for an A record that has no side-table
    // row yet: Records must attach its labels and flag needs-migration.
    let labels: Labels = [("owner".to_string(), "owner".to_string())].into_iter().collect();
    let mark_value = heritage::serialize(&labels, true, None);
    let txt = Endpoint::new("migrate.example.org", "TXT", vec![mark_value]);
    let a_record = Endpoint::new("migrate.example.org", "A", vec!["9.9.9.9".to_string()]);

    let provider = FakeProvider::new(vec![txt, a_record]);
    let registry = TableRegistry::new(provider, config(), FakeBackend::default());

    let records = registry.records().await.unwrap();
    let a = records.iter().find(|e| e.record_type == "A").unwrap();
    assert_eq!(a.owner(), Some("owner"));
    assert_eq!(
        a.provider_specific.get("needs-migration"),
        Some(&"true".to_string())
    );
}

#[tokio::test]
async fn migrated_update_inserts_row_and_invalidates_cache() {
    let backend = FakeBackend::default();
    let provider = FakeProvider::new(vec![]);
    let registry = TableRegistry::new(provider, config(), backend);

    registry.cache.set(vec![]).await;

    let mut old = Endpoint::new("migrate.example.org", "A", vec!["9.9.9.9".to_string()]);
    old.set_owner("owner");
    old.set_provider_specific("needs-migration", "true");
    let mut new = old.clone();
    new.provider_specific.remove("needs-migration");

    let mut changes = Changes::default();
    changes.update_old.push(old);
    changes.update_new.push(new.clone());

    registry.apply_changes(&changes).await.unwrap();

    let key = new.key().table_hash();
    let (owner, labels) = registry.backend.row(&key).unwrap();
    assert_eq!(owner, "owner");
    assert_eq!(labels.get("owner"), Some(&"owner".to_string()));
}

#[tokio::test]
async fn orphaned_rows_are_deleted_after_apply() {
    let key = EndpointKey::new("gone.example.org", "A", "").table_hash();
    let backend = FakeBackend::default().seed(&key, "owner", Labels::new());
    let provider = FakeProvider::new(vec![]);
    let registry = TableRegistry::new(provider, config(), backend);

    registry.populate_labels().await.unwrap();
    registry.apply_changes(&Changes::default()).await.unwrap();

    assert!(registry.backend.row(&key).is_none());
}
