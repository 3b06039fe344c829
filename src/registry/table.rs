// Copyright (c) 2025 Erick Bourgeois, firestoned
// SPDX-License-Identifier: MIT

//! Side-table ownership store (spec §4.6), backed by DynamoDB.
//!
//! Each row is `{k: "<dnsName>#<recordType>#<setIdentifier>", o: owner,
//! l: map<string,string>}`. The in-memory `labels`/`orphaned` state is
//! populated lazily from a consistent scan and mutated only by the
//! single reconciliation loop (spec §5); `Mutex` exists to satisfy
//! `&self` on the [`super::Registry`] trait, not to arbitrate real
//! contention.
//!
//! DynamoDB's `BatchWriteItem` has no conditional-write support, so the
//! duplicate-claim detection this backend needs (spec §7
//! `ErrDuplicateClaim`) is implemented as individual conditional
//! `PutItem`/`DeleteItem` calls rather than a true batch write,
//! preserving the ordering guarantee (claim-then-publish). The actual
//! wire calls live behind [`Backend`] so this ordering/migration logic
//! can be exercised against an in-memory fake without a live table.

use std::collections::{HashMap, HashSet};

use async_trait::async_trait;
use tokio::sync::Mutex;
use tracing::warn;

use crate::compose;
use crate::config::RegistryConfig;
use crate::constants::{HINT_NEEDS_MIGRATION, MAX_BATCH_SIZE};
use crate::endpoint::{Endpoint, Labels};
use crate::errors::{RegistryError, StoreError};
use crate::heritage;
use crate::metrics;
use crate::provider::{Changes, DomainFilter, Provider};

use super::{correlation_key, EndpointCache, Registry};

mod dynamo;
pub use dynamo::DynamoBackend;

/// The storage operations a side-table needs, kept narrow enough to be
/// backed either by DynamoDB ([`DynamoBackend`]) or an in-memory fake.
#[async_trait]
pub trait Backend: Send + Sync {
    /// Validates the table has a string hash key and no range key.
    async fn validate_schema(&self) -> Result<(), StoreError>;

    /// Consistent scan of every row owned by `owner_id`.
    async fn scan_owner_rows(&self, owner_id: &str) -> Result<HashMap<String, Labels>, StoreError>;

    /// Write a row. When `fail_if_exists` is set, the call must fail with
    /// [`StoreError::DuplicateClaim`] if the key is already present.
    async fn put_row(
        &self,
        key: &str,
        owner_id: &str,
        labels: &Labels,
        fail_if_exists: bool,
    ) -> Result<(), StoreError>;

    async fn delete_row(&self, key: &str) -> Result<(), StoreError>;

    /// Delete `keys` as a single batched write (spec §4.6 step 5: "execute
    /// it as a second batched transaction"). `keys` never exceeds
    /// [`crate::constants::MAX_BATCH_SIZE`] entries — the caller chunks.
    /// The default implementation deletes one row per call;
    /// [`DynamoBackend`] overrides it with a real `BatchWriteItem`.
    async fn delete_rows(&self, keys: &[String]) -> Result<(), StoreError> {
        for key in keys {
            self.delete_row(key).await?;
        }
        Ok(())
    }
}

#[derive(Default)]
struct TableState {
    populated: bool,
    labels: HashMap<String, Labels>,
    orphaned: HashSet<String>,
}

/// Side-table-backed [`Registry`].
pub struct TableRegistry<P: Provider, B: Backend = DynamoBackend> {
    provider: P,
    config: RegistryConfig,
    backend: B,
    state: Mutex<TableState>,
    cache: EndpointCache,
}

impl<P: Provider, B: Backend> TableRegistry<P, B> {
    #[must_use]
    pub fn new(provider: P, config: RegistryConfig, backend: B) -> Self {
        let cache = EndpointCache::new(config.cache_interval);
        Self {
            provider,
            config,
            backend,
            state: Mutex::new(TableState::default()),
            cache,
        }
    }

    /// Validate the table schema at startup (spec §4.6).
    ///
    /// # Errors
    /// Propagates [`StoreError::TableSchema`] from the backend.
    pub async fn validate_schema(&self) -> Result<(), StoreError> {
        self.backend.validate_schema().await
    }

    async fn populate_labels(&self) -> Result<(), StoreError> {
        {
            let state = self.state.lock().await;
            if state.populated {
                return Ok(());
            }
        }

        let labels = self.backend.scan_owner_rows(&self.config.owner_id).await?;
        let mut state = self.state.lock().await;
        state.orphaned = labels.keys().cloned().collect();
        state.labels = labels;
        state.populated = true;
        Ok(())
    }

    /// Discard in-memory label state and the endpoint cache so the next
    /// read re-scans the table (spec §4.6 steps 4-5, §7
    /// `ErrRemoteFatal`: "abort apply, invalidate caches").
    async fn invalidate_caches(&self, state: &mut TableState) {
        state.populated = false;
        state.labels.clear();
        state.orphaned.clear();
        self.cache.invalidate().await;
    }
}

#[async_trait]
impl<P: Provider, B: Backend> Registry for TableRegistry<P, B> {
    async fn records(&self) -> Result<Vec<Endpoint>, RegistryError> {
        if let Some(cached) = self.cache.get("side-table").await {
            return Ok(cached);
        }

        self.populate_labels().await?;

        let raw = self.provider.records().await.map_err(StoreError::from)?;
        let aes_key = self.config.aes_key();
        let mut migration_marks: HashMap<String, Labels> = HashMap::new();
        let mut result = Vec::with_capacity(raw.len());

        let mut state = self.state.lock().await;
        for record in &raw {
            if record.record_type == "TXT" && record.targets.len() == 1 {
                let hash = record.key().table_hash();
                if !state.labels.contains_key(&hash) {
                    match heritage::deserialize(&record.targets[0], aes_key) {
                        Ok(labels) => {
                            metrics::record_mark("side-table", "parsed");
                            migration_marks.insert(
                                correlation_key(&record.dns_name, &record.set_identifier, None),
                                labels,
                            );
                        }
                        Err(_) => metrics::record_mark("side-table", "foreign"),
                    }
                }
            }
        }

        for record in raw {
            let hash = record.key().table_hash();
            let mut endpoint = record;
            if let Some(labels) = state.labels.get(&hash) {
                endpoint.merge_labels(labels);
                state.orphaned.remove(&hash);
            } else if endpoint.record_type != "TXT" {
                let key = correlation_key(&endpoint.dns_name, &endpoint.set_identifier, None);
                if let Some(labels) = migration_marks.get(&key) {
                    endpoint.merge_labels(labels);
                    endpoint.set_provider_specific(HINT_NEEDS_MIGRATION, "true");
                }
            }
            result.push(endpoint);
        }
        for _ in 0..state.orphaned.len() {
            metrics::record_mark("side-table", "orphaned");
        }
        drop(state);

        self.cache.set(result.clone()).await;
        metrics::record_records_read("side-table", result.len());
        Ok(result)
    }

    async fn apply_changes(&self, changes: &Changes) -> Result<(), RegistryError> {
        self.populate_labels().await?;
        let composed = compose::compose(changes, &self.config.owner_id);

        let mut filtered_creates = Vec::with_capacity(composed.mark_creates.len());
        {
            let mut state = self.state.lock().await;
            for chunk in composed.mark_creates.chunks(MAX_BATCH_SIZE) {
                for create in chunk {
                    let hash = create.key().table_hash();
                    let is_orphan_reuse = state.orphaned.remove(&hash);
                    let result = self
                        .backend
                        .put_row(&hash, &self.config.owner_id, &create.labels, !is_orphan_reuse)
                        .await;
                    match result {
                        Ok(()) => {
                            state.labels.insert(hash, create.labels.clone());
                            filtered_creates.push(create.clone());
                        }
                        Err(StoreError::DuplicateClaim(_)) => {
                            warn!(key = %hash, "side-table insert lost a race, dropping create");
                            state.labels.remove(&hash);
                        }
                        Err(e) => {
                            self.invalidate_caches(&mut state).await;
                            metrics::record_apply("side-table", "failure");
                            return Err(e.into());
                        }
                    }
                }
                metrics::record_batch_size("put", chunk.len());
            }

            for chunk in composed.mark_updates.chunks(MAX_BATCH_SIZE) {
                for (old, new) in chunk {
                    let hash = new.key().table_hash();
                    if old.provider_specific.get(HINT_NEEDS_MIGRATION).is_some() {
                        if let Err(e) = self
                            .backend
                            .put_row(&hash, &self.config.owner_id, &new.labels, false)
                            .await
                        {
                            self.invalidate_caches(&mut state).await;
                            metrics::record_apply("side-table", "failure");
                            return Err(e.into());
                        }
                        self.cache.invalidate().await;
                    } else if state.labels.get(&hash) != Some(&new.labels) {
                        if let Err(e) = self
                            .backend
                            .put_row(&hash, &self.config.owner_id, &new.labels, false)
                            .await
                        {
                            self.invalidate_caches(&mut state).await;
                            metrics::record_apply("side-table", "failure");
                            return Err(e.into());
                        }
                    }
                    state.labels.insert(hash, new.labels.clone());
                }
                metrics::record_batch_size("put", chunk.len());
            }
        }

        let mut merged = composed.endpoint_changes.clone();
        merged.create = filtered_creates;

        if let Err(e) = self.provider.apply_changes(&merged).await {
            let mut state = self.state.lock().await;
            self.invalidate_caches(&mut state).await;
            metrics::record_apply("side-table", "failure");
            return Err(StoreError::from(e).into());
        }

        let mut state = self.state.lock().await;
        let mut delete_keys: Vec<String> =
            composed.mark_deletes.iter().map(|e| e.key().table_hash()).collect();
        delete_keys.extend(state.orphaned.iter().cloned());

        for chunk in delete_keys.chunks(MAX_BATCH_SIZE) {
            if let Err(e) = self.backend.delete_rows(chunk).await {
                warn!(keys = chunk.len(), error = %e, "failed to delete side-table row batch");
            }
            metrics::record_batch_size("delete", chunk.len());
            for key in chunk {
                state.labels.remove(key);
                state.orphaned.remove(key);
            }
        }

        self.cache.invalidate().await;
        metrics::record_apply("side-table", "success");
        Ok(())
    }

    fn adjust_endpoints(&self, endpoints: Vec<Endpoint>) -> Vec<Endpoint> {
        self.provider.adjust_endpoints(endpoints)
    }

    fn domain_filter(&self) -> DomainFilter {
        self.provider.domain_filter()
    }

    fn owner_id(&self) -> &str {
        &self.config.owner_id
    }
}

#[cfg(test)]
#[path = "table_tests.rs"]
mod table_tests;
