// Copyright (c) 2025 Erick Bourgeois, firestoned
// SPDX-License-Identifier: MIT

//! Sidecar-TXT ownership store (spec §4.5).
//!
//! Each owned endpoint has a sibling TXT record carrying its ownership
//! mark, addressed by [`crate::name_mapper::NameMapper`]. Unparseable or
//! foreign TXT records are passed through unchanged so that hand-managed
//! TXT records survive reconciliation untouched.

use std::collections::{HashMap, HashSet};

use async_trait::async_trait;

use crate::compose;
use crate::config::RegistryConfig;
use crate::constants::HINT_FORCE_UPDATE;
use crate::endpoint::{Endpoint, Labels};
use crate::errors::RegistryError;
use crate::heritage;
use crate::provider::{Changes, DomainFilter, Provider};

use super::{correlation_key, EndpointCache, Registry};

/// Sidecar-TXT backed [`Registry`].
pub struct TxtRegistry<P: Provider> {
    provider: P,
    config: RegistryConfig,
    cache: EndpointCache,
}

impl<P: Provider> TxtRegistry<P> {
    #[must_use]
    pub fn new(provider: P, config: RegistryConfig) -> Self {
        let cache = EndpointCache::new(config.cache_interval);
        Self {
            provider,
            config,
            cache,
        }
    }

    /// Classify provider records into real endpoints and ownership-mark
    /// label bags, then merge (spec §4.5 steps 2-5).
    fn merge_marks(&self, raw: Vec<Endpoint>) -> Vec<Endpoint> {
        let aes_key = self.config.aes_key();
        let mapper = &self.config.name_mapper;

        let mut type_embedded_map: HashMap<String, (Labels, String)> = HashMap::new();
        let mut legacy_map: HashMap<String, Labels> = HashMap::new();
        let mut mark_dns_names: HashSet<String> = HashSet::new();
        let mut result = Vec::with_capacity(raw.len());

        for record in &raw {
            if record.record_type != "TXT" || record.targets.len() != 1 {
                continue;
            }
            let Ok(labels) = heritage::deserialize(&record.targets[0], aes_key) else {
                // Foreign or absent heritage: pass through unchanged.
                crate::metrics::record_mark("sidecar-txt", "foreign");
                continue;
            };
            let (endpoint_name, record_type) = mapper.to_endpoint_name(&record.dns_name);
            if endpoint_name.is_empty() {
                // A mark we can't reverse-map; treat as foreign too.
                crate::metrics::record_mark("sidecar-txt", "foreign");
                continue;
            }
            crate::metrics::record_mark("sidecar-txt", "parsed");
            mark_dns_names.insert(record.dns_name.clone());
            if record_type.is_empty() {
                legacy_map.insert(
                    correlation_key(&endpoint_name, &record.set_identifier, None),
                    labels,
                );
            } else {
                type_embedded_map.insert(
                    correlation_key(&endpoint_name, &record.set_identifier, Some(&record_type)),
                    (labels, record_type),
                );
            }
        }

        for record in raw {
            if record.record_type == "TXT" && record.targets.len() == 1 {
                let is_mark = mark_dns_names.contains(&record.dns_name);
                if is_mark {
                    continue;
                }
            }

            let mut endpoint = record;
            let embedded_key = correlation_key(
                &endpoint.dns_name,
                &endpoint.set_identifier,
                Some(&endpoint.record_type),
            );
            if let Some((labels, _)) = type_embedded_map.get(&embedded_key) {
                endpoint.merge_labels(labels);
            } else if endpoint.record_type != "AAAA" {
                let legacy_key = correlation_key(&endpoint.dns_name, &endpoint.set_identifier, None);
                if let Some(labels) = legacy_map.get(&legacy_key) {
                    endpoint.merge_labels(labels);
                }
            }

            if endpoint.is_owned_by(&self.config.owner_id) {
                let expected_mark = mapper.to_mark_name(&endpoint.dns_name, &endpoint.record_type);
                if !mark_dns_names.contains(&expected_mark) {
                    endpoint.set_provider_specific(HINT_FORCE_UPDATE, "true");
                }
            }

            result.push(endpoint);
        }

        result
    }

    /// Build the companion mark(s) for `endpoint`: one, or two in
    /// legacy-compat mode so a reader still on the older (non-type-
    /// embedding) name mapper keeps seeing a mark it recognizes (spec
    /// §4.4). The second mark is skipped when it would collide with the
    /// first (the configured affix doesn't actually embed the record
    /// type, so both forms agree).
    fn mark_endpoints(&self, endpoint: &Endpoint, labels: &Labels) -> Vec<Endpoint> {
        let mapper = &self.config.name_mapper;
        let build = |name: String| {
            let mut mark = Endpoint::new(
                name,
                "TXT",
                vec![heritage::serialize(labels, true, self.config.aes_key())],
            );
            mark.set_identifier.clone_from(&endpoint.set_identifier);
            mark.ttl = endpoint.ttl;
            mark
        };

        let primary_name = mapper.to_mark_name(&endpoint.dns_name, &endpoint.record_type);
        let mut marks = vec![build(primary_name.clone())];

        if self.config.legacy_compat {
            let legacy_name = mapper.to_legacy_mark_name(&endpoint.dns_name, &endpoint.record_type);
            if legacy_name != primary_name {
                marks.push(build(legacy_name));
            }
        }

        marks
    }
}

#[async_trait]
impl<P: Provider> Registry for TxtRegistry<P> {
    async fn records(&self) -> Result<Vec<Endpoint>, RegistryError> {
        if let Some(cached) = self.cache.get("sidecar-txt").await {
            return Ok(cached);
        }

        let raw = self
            .provider
            .records()
            .await
            .map_err(crate::errors::StoreError::from)?;
        let merged = self.merge_marks(raw);
        self.cache.set(merged.clone()).await;
        crate::metrics::record_records_read("sidecar-txt", merged.len());
        Ok(merged)
    }

    async fn apply_changes(&self, changes: &Changes) -> Result<(), RegistryError> {
        let composed = compose::compose(changes, &self.config.owner_id);

        let mut merged = composed.endpoint_changes.clone();

        for create in &composed.mark_creates {
            merged.create.extend(self.mark_endpoints(create, &create.labels));
        }
        for delete in &composed.mark_deletes {
            merged.delete.extend(self.mark_endpoints(delete, &delete.labels));
        }
        for (old, new) in &composed.mark_updates {
            merged.update_old.extend(self.mark_endpoints(old, &old.labels));
            merged.update_new.extend(self.mark_endpoints(new, &new.labels));
        }

        let result = self.provider.apply_changes(&merged).await;
        self.cache.invalidate().await;

        match result {
            Ok(()) => {
                crate::metrics::record_apply("sidecar-txt", "success");
                Ok(())
            }
            Err(e) => {
                crate::metrics::record_apply("sidecar-txt", "failure");
                Err(crate::errors::StoreError::from(e).into())
            }
        }
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
#[path = "txt_tests.rs"]
mod txt_tests;
