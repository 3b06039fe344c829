// Copyright (c) 2025 Erick Bourgeois, firestoned
// SPDX-License-Identifier: MIT

//! The ownership registry contract (spec §2, §6, §9) and its three
//! interchangeable backends.
//!
//! The planner only ever talks to a `Registry`; it never branches on
//! which backend is in use. [`txt`] is the sidecar-TXT store, [`table`]
//! is the DynamoDB-backed side-table store, and [`resource`] is the
//! `OwnershipRecord`-backed store.

pub mod resource;
pub mod table;
pub mod txt;

use async_trait::async_trait;
use std::time::{Duration, Instant};
use tokio::sync::Mutex;

use crate::endpoint::Endpoint;
use crate::errors::RegistryError;
use crate::provider::{Changes, DomainFilter};

/// Shared capability set every ownership store implements (spec §9
/// design note: "the client code for the planner must not branch on
/// variant").
#[async_trait]
pub trait Registry: Send + Sync {
    /// Returns all endpoints in managed zones with ownership labels
    /// merged; non-owned and foreign marks are passed through unchanged.
    async fn records(&self) -> Result<Vec<Endpoint>, RegistryError>;

    /// Executes a composed change set: companion mark operations plus
    /// the delegated `provider.ApplyChanges`.
    async fn apply_changes(&self, changes: &Changes) -> Result<(), RegistryError>;

    /// Provider-specific normalization pass-through.
    fn adjust_endpoints(&self, endpoints: Vec<Endpoint>) -> Vec<Endpoint> {
        endpoints
    }

    /// The zone filter understood by the wrapped provider.
    fn domain_filter(&self) -> DomainFilter {
        DomainFilter::match_all()
    }

    /// Identity of this registry instance.
    fn owner_id(&self) -> &str;

    /// Marks the registry wants the planner to (re-)emit, used by the
    /// legacy-TXT migration path (spec §4.5/§4.6). Empty unless a
    /// backend has pending migration hints.
    fn missing_records(&self) -> Vec<Endpoint> {
        Vec::new()
    }
}

/// A time-boxed cache of the merged endpoint list, shared by all three
/// backends (spec §5: owned exclusively by the registry's single
/// reconciliation loop; the lock here exists only to satisfy `&self`
/// trait methods, never to arbitrate real contention).
pub(crate) struct EndpointCache {
    interval: Duration,
    state: Mutex<Option<(Instant, Vec<Endpoint>)>>,
}

impl EndpointCache {
    pub(crate) fn new(interval: Duration) -> Self {
        Self {
            interval,
            state: Mutex::new(None),
        }
    }

    /// Returns the cached list if still within `interval`, else `None`.
    /// Records a cache hit/miss for `backend` (SPEC_FULL §9.5), skipped
    /// when caching itself is disabled.
    pub(crate) async fn get(&self, backend: &str) -> Option<Vec<Endpoint>> {
        if self.interval.is_zero() {
            return None;
        }
        let guard = self.state.lock().await;
        let result = match guard.as_ref() {
            Some((fetched_at, endpoints)) if fetched_at.elapsed() < self.interval => {
                Some(endpoints.clone())
            }
            _ => None,
        };
        crate::metrics::record_cache(backend, result.is_some());
        result
    }

    pub(crate) async fn set(&self, endpoints: Vec<Endpoint>) {
        if self.interval.is_zero() {
            return;
        }
        let mut guard = self.state.lock().await;
        *guard = Some((Instant::now(), endpoints));
    }

    /// Drop the cached value, forcing the next read to hit the backend.
    pub(crate) async fn invalidate(&self) {
        let mut guard = self.state.lock().await;
        *guard = None;
    }
}

/// Correlation key used to match a companion mark back to the endpoint
/// it describes: `(endpointName, setIdentifier)`, or with `recordType`
/// included for the type-embedding name-mapper form (spec §4.4).
#[must_use]
pub(crate) fn correlation_key(dns_name: &str, set_identifier: &str, record_type: Option<&str>) -> String {
    match record_type {
        Some(ty) => format!("{dns_name}#{set_identifier}#{ty}"),
        None => format!("{dns_name}#{set_identifier}"),
    }
}
