// Copyright (c) 2025 Erick Bourgeois, firestoned
// SPDX-License-Identifier: MIT

//! Resource-list ownership store (spec §4.7), backed by the
//! `OwnershipRecord` custom resource.
//!
//! One `OwnershipRecord` exists per owned endpoint, named
//! `<ownerId>-<sanitized-dns-name>-<recordType>[-<setIdentifier>]` and labeled with
//! `owner`, `record-name`, `record-type`, `record-key`, and `resource`
//! (spec §6). Unlike the sidecar-TXT and side-table backends, marks
//! here never appear in the wrapped provider's own record set — they
//! are plain Kubernetes objects read and written through their own API.

use std::collections::HashMap;

use async_trait::async_trait;
use kube::api::{DeleteParams, ListParams, PostParams};
use kube::{Api, Resource, ResourceExt};

use crate::compose;
use crate::config::RegistryConfig;
use crate::constants::{
    RESOURCE_LABEL_OWNER, RESOURCE_LABEL_RECORD_KEY, RESOURCE_LABEL_RECORD_NAME,
    RESOURCE_LABEL_RECORD_TYPE, RESOURCE_LABEL_RESOURCE,
};
use crate::crd::{OwnershipRecord, OwnershipRecordSpec};
use crate::endpoint::Endpoint;
use crate::errors::{RegistryError, StoreError};
use crate::pagination::list_all_paginated;
use crate::provider::{Changes, DomainFilter, Provider};

use super::{correlation_key, EndpointCache, Registry};

/// The Kubernetes-object name an `OwnershipRecord` for `(owner_id,
/// dns_name, record_type, set_identifier)` must use. Lower-cased, with
/// `.` replaced by `-` so the DNS name is a valid object-name segment.
/// A non-empty `set_identifier` is appended so weighted/geo record sets
/// sharing `(dnsName, recordType)` don't collide on the same object
/// name (spec §3).
#[must_use]
pub fn sanitized_resource_name(owner_id: &str, dns_name: &str, record_type: &str, set_identifier: &str) -> String {
    let base = format!(
        "{}-{}-{}",
        owner_id.to_lowercase(),
        dns_name.to_lowercase().replace('.', "-"),
        record_type.to_lowercase()
    );
    if set_identifier.is_empty() {
        base
    } else {
        format!("{base}-{}", set_identifier.to_lowercase().replace('.', "-"))
    }
}

/// Build the `OwnershipRecord` that marks `endpoint` as owned by
/// `owner_id` (spec §4.7/§6).
#[must_use]
fn build_mark(owner_id: &str, endpoint: &Endpoint) -> OwnershipRecord {
    let name = sanitized_resource_name(
        owner_id,
        &endpoint.dns_name,
        &endpoint.record_type,
        &endpoint.set_identifier,
    );

    let mut labels = std::collections::BTreeMap::new();
    labels.insert(RESOURCE_LABEL_OWNER.to_string(), owner_id.to_string());
    labels.insert(RESOURCE_LABEL_RECORD_NAME.to_string(), endpoint.dns_name.clone());
    labels.insert(RESOURCE_LABEL_RECORD_TYPE.to_string(), endpoint.record_type.clone());
    labels.insert(RESOURCE_LABEL_RECORD_KEY.to_string(), endpoint.key().table_hash());
    if let Some(resource) = endpoint.labels.get("resource") {
        labels.insert(RESOURCE_LABEL_RESOURCE.to_string(), resource.clone());
    }

    let mut record = OwnershipRecord::new(
        &name,
        OwnershipRecordSpec {
            endpoint: endpoint.clone(),
        },
    );
    record.meta_mut().labels = Some(labels);
    record
}

/// `OwnershipRecord`-backed [`Registry`].
pub struct ResourceRegistry<P: Provider> {
    provider: P,
    config: RegistryConfig,
    api: Api<OwnershipRecord>,
    cache: EndpointCache,
}

impl<P: Provider> ResourceRegistry<P> {
    #[must_use]
    pub fn new(provider: P, config: RegistryConfig, api: Api<OwnershipRecord>) -> Self {
        let cache = EndpointCache::new(config.cache_interval);
        Self {
            provider,
            config,
            api,
            cache,
        }
    }

    async fn list_owned_marks(&self) -> Result<HashMap<String, OwnershipRecord>, StoreError> {
        let list_params =
            ListParams::default().labels(&format!("{RESOURCE_LABEL_OWNER}={}", self.config.owner_id));
        let records = list_all_paginated(&self.api, list_params)
            .await
            .map_err(|e| StoreError::RemoteFatal(e.to_string()))?;

        Ok(records
            .into_iter()
            .map(|record| {
                let key = correlation_key(
                    &record.spec.endpoint.dns_name,
                    &record.spec.endpoint.set_identifier,
                    Some(&record.spec.endpoint.record_type),
                );
                (key, record)
            })
            .collect())
    }

    async fn create_mark(&self, endpoint: &Endpoint) -> Result<(), StoreError> {
        let record = build_mark(&self.config.owner_id, endpoint);
        call_with_retry("ownership_record_create", || async {
            match self.api.create(&PostParams::default(), &record).await {
                Ok(_) => Ok(()),
                Err(kube::Error::Api(e)) if e.code == 409 => Ok(()),
                Err(e) => Err(e),
            }
        })
        .await
    }

    async fn delete_mark(&self, endpoint: &Endpoint) -> Result<(), StoreError> {
        let name = sanitized_resource_name(
            &self.config.owner_id,
            &endpoint.dns_name,
            &endpoint.record_type,
            &endpoint.set_identifier,
        );
        call_with_retry("ownership_record_delete", || async {
            match self.api.delete(&name, &DeleteParams::default()).await {
                Ok(_) => Ok(()),
                Err(kube::Error::Api(e)) if e.code == 404 => Ok(()),
                Err(e) => Err(e),
            }
        })
        .await
    }

    async fn update_mark(&self, endpoint: &Endpoint) -> Result<(), StoreError> {
        let record = build_mark(&self.config.owner_id, endpoint);
        let name = record.name_any();
        let needs_create = call_with_retry("ownership_record_replace", || async {
            match self.api.replace(&name, &PostParams::default(), &record).await {
                Ok(_) => Ok(false),
                Err(kube::Error::Api(e)) if e.code == 404 => Ok(true),
                Err(e) => Err(e),
            }
        })
        .await?;

        if needs_create {
            self.create_mark(endpoint).await
        } else {
            Ok(())
        }
    }

    async fn apply_marks_and_provider(&self, composed: &compose::ComposedChanges) -> Result<(), RegistryError> {
        for create in &composed.mark_creates {
            self.create_mark(create).await?;
        }
        for (_, new) in &composed.mark_updates {
            self.update_mark(new).await?;
        }
        for delete in &composed.mark_deletes {
            self.delete_mark(delete).await?;
        }

        self.provider
            .apply_changes(&composed.endpoint_changes)
            .await
            .map_err(StoreError::from)?;

        Ok(())
    }
}

#[async_trait]
impl<P: Provider> Registry for ResourceRegistry<P> {
    async fn records(&self) -> Result<Vec<Endpoint>, RegistryError> {
        if let Some(cached) = self.cache.get("resource-list").await {
            return Ok(cached);
        }

        let marks = self.list_owned_marks().await?;
        let raw = self.provider.records().await.map_err(StoreError::from)?;

        let result: Vec<Endpoint> = raw
            .into_iter()
            .map(|mut endpoint| {
                let key = correlation_key(
                    &endpoint.dns_name,
                    &endpoint.set_identifier,
                    Some(&endpoint.record_type),
                );
                if let Some(mark) = marks.get(&key) {
                    endpoint.merge_labels(&mark.spec.endpoint.labels);
                }
                endpoint
            })
            .collect();

        self.cache.set(result.clone()).await;
        crate::metrics::record_records_read("resource-list", result.len());
        Ok(result)
    }

    async fn apply_changes(&self, changes: &Changes) -> Result<(), RegistryError> {
        let composed = compose::compose(changes, &self.config.owner_id);

        let result = self.apply_marks_and_provider(&composed).await;
        self.cache.invalidate().await;

        match result {
            Ok(()) => {
                crate::metrics::record_apply("resource-list", "success");
                Ok(())
            }
            Err(e) => {
                crate::metrics::record_apply("resource-list", "failure");
                Err(e)
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

/// Run a Kubernetes API call through [`crate::retry::retry_api_call`],
/// classifying whatever escapes the backoff loop back into a
/// [`StoreError`] (spec §7).
async fn call_with_retry<T, F, Fut>(operation_name: &str, operation: F) -> Result<T, StoreError>
where
    F: FnMut() -> Fut,
    Fut: std::future::Future<Output = Result<T, kube::Error>>,
{
    crate::retry::retry_api_call(operation, operation_name)
        .await
        .map_err(|e| match e.downcast::<kube::Error>() {
            Ok(kube_err) => classify_kube_error(kube_err),
            Err(other) => StoreError::RemoteFatal(other.to_string()),
        })
}

fn classify_kube_error(err: kube::Error) -> StoreError {
    let transient = match &err {
        kube::Error::Api(e) => e.code == 429 || (500..600).contains(&e.code),
        kube::Error::Service(_) => true,
        _ => false,
    };
    if transient {
        StoreError::RemoteTransient(err.to_string())
    } else {
        StoreError::RemoteFatal(err.to_string())
    }
}

#[cfg(test)]
#[path = "resource_tests.rs"]
mod resource_tests;
