// Copyright (c) 2025 Erick Bourgeois, firestoned
// SPDX-License-Identifier: MIT

//! The `Provider` trait: the external DNS-backend collaborator the registry
//! wraps (spec §6). Out of scope per spec §1 — this module only defines the
//! boundary, not an implementation; [`crate::demo_provider`] ships a toy
//! JSON-file-backed implementation for the demonstration binary.

use async_trait::async_trait;
use serde::{Deserialize, Serialize};
use thiserror::Error;

use crate::endpoint::Endpoint;

/// A planner-produced change set: creates, deletes, and paired
/// old/new updates (spec §4.4).
#[derive(Clone, Debug, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Changes {
    pub create: Vec<Endpoint>,
    pub update_old: Vec<Endpoint>,
    pub update_new: Vec<Endpoint>,
    pub delete: Vec<Endpoint>,
}

impl Changes {
    /// Whether this change set has nothing to apply.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.create.is_empty()
            && self.update_old.is_empty()
            && self.update_new.is_empty()
            && self.delete.is_empty()
    }
}

/// Inclusion/exclusion suffix lists gating which zones a provider will
/// read or write (spec §1 calls the zone-filter machinery itself out of
/// scope, but `GetDomainFilter`'s existence is part of the registry
/// interface).
#[derive(Clone, Debug, Default, PartialEq)]
pub struct DomainFilter {
    pub include: Vec<String>,
    pub exclude: Vec<String>,
}

impl DomainFilter {
    /// A filter that matches every domain.
    #[must_use]
    pub fn match_all() -> Self {
        Self::default()
    }

    /// Whether `domain` passes this filter.
    #[must_use]
    pub fn matches(&self, domain: &str) -> bool {
        let domain = domain.to_lowercase();
        if self.exclude.iter().any(|s| domain.ends_with(&s.to_lowercase())) {
            return false;
        }
        if self.include.is_empty() {
            return true;
        }
        self.include.iter().any(|s| domain.ends_with(&s.to_lowercase()))
    }
}

/// Errors a [`Provider`] implementation may surface to the registry.
#[derive(Debug, Error)]
pub enum ProviderError {
    /// Transient failure; the caller should retry at the next reconcile.
    #[error("transient provider error: {0}")]
    Transient(String),

    /// Non-retryable failure.
    #[error("fatal provider error: {0}")]
    Fatal(String),
}

/// The external DNS backend consumed by the registry (spec §6).
///
/// Implementations own talking to the actual authoritative DNS service
/// (AWS Route 53, Pi-hole, OVH, ...); the registry never assumes anything
/// about that transport beyond this trait.
#[async_trait]
pub trait Provider: Send + Sync {
    /// List every record currently held by the provider, without any
    /// ownership classification applied.
    async fn records(&self) -> Result<Vec<Endpoint>, ProviderError>;

    /// Apply a (possibly registry-augmented) change set.
    async fn apply_changes(&self, changes: &Changes) -> Result<(), ProviderError>;

    /// Provider-specific normalization pass-through (spec §6).
    fn adjust_endpoints(&self, endpoints: Vec<Endpoint>) -> Vec<Endpoint> {
        endpoints
    }

    /// The zone filter this provider understands (spec §6).
    fn domain_filter(&self) -> DomainFilter {
        DomainFilter::match_all()
    }
}

#[cfg(test)]
#[path = "provider_tests.rs"]
mod provider_tests;
