// Copyright (c) 2025 Erick Bourgeois, firestoned
// SPDX-License-Identifier: MIT

//! Endpoint & label model (spec §4.1).
//!
//! Pure data: no behavior beyond equality, key derivation, and convenience
//! mutators. The key is computed deterministically from
//! `(lower(dnsName), recordType, setIdentifier)`.

use std::collections::BTreeMap;
use std::fmt;

use schemars::JsonSchema;
use serde::{Deserialize, Serialize};

use crate::constants::LABEL_OWNER;

/// A `string -> string` label bag. Reserved keys are documented on
/// [`crate::constants`].
pub type Labels = BTreeMap<String, String>;

/// The global identity used by the registry for correlation: the triple
/// `(dnsName, recordType, setIdentifier)`.
///
/// `dnsName` is always stored lower-cased; construction is the only place
/// that normalizes it so every other comparison can rely on the invariant.
#[derive(Clone, Debug, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
pub struct EndpointKey {
    pub dns_name: String,
    pub record_type: String,
    pub set_identifier: String,
}

impl EndpointKey {
    /// Build a key, lower-casing `dns_name` as the model requires.
    #[must_use]
    pub fn new(
        dns_name: impl Into<String>,
        record_type: impl Into<String>,
        set_identifier: impl Into<String>,
    ) -> Self {
        Self {
            dns_name: dns_name.into().to_lowercase(),
            record_type: record_type.into(),
            set_identifier: set_identifier.into(),
        }
    }

    /// Side-table row hash key: `"<dnsName>#<recordType>#<setIdentifier>"`
    /// (spec §6).
    #[must_use]
    pub fn table_hash(&self) -> String {
        format!("{}#{}#{}", self.dns_name, self.record_type, self.set_identifier)
    }
}

impl fmt::Display for EndpointKey {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.table_hash())
    }
}

/// One desired or observed DNS record.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize, JsonSchema)]
#[serde(rename_all = "camelCase")]
pub struct Endpoint {
    pub dns_name: String,
    pub record_type: String,
    #[serde(default)]
    pub set_identifier: String,
    pub targets: Vec<String>,
    #[serde(default)]
    pub ttl: i64,
    #[serde(default)]
    pub labels: Labels,
    #[serde(default)]
    pub provider_specific: Labels,
}

impl Endpoint {
    /// Construct a new endpoint, lower-casing `dns_name` per the model's
    /// invariant.
    #[must_use]
    pub fn new(
        dns_name: impl Into<String>,
        record_type: impl Into<String>,
        targets: Vec<String>,
    ) -> Self {
        Self {
            dns_name: dns_name.into().to_lowercase(),
            record_type: record_type.into(),
            set_identifier: String::new(),
            targets,
            ttl: 0,
            labels: Labels::new(),
            provider_specific: Labels::new(),
        }
    }

    /// The endpoint key, `(dnsName, recordType, setIdentifier)`.
    #[must_use]
    pub fn key(&self) -> EndpointKey {
        EndpointKey::new(&self.dns_name, &self.record_type, &self.set_identifier)
    }

    /// Compare targets irrespective of order, as multi-value types (A/AAAA)
    /// require.
    #[must_use]
    pub fn same_targets(&self, other: &Endpoint) -> bool {
        if self.targets.len() != other.targets.len() {
            return false;
        }
        let mut a = self.targets.clone();
        let mut b = other.targets.clone();
        a.sort();
        b.sort();
        a == b
    }

    /// The owner recorded in this endpoint's labels, if any.
    #[must_use]
    pub fn owner(&self) -> Option<&str> {
        self.labels.get(LABEL_OWNER).map(String::as_str)
    }

    /// Whether this endpoint's owner label matches `owner_id`.
    #[must_use]
    pub fn is_owned_by(&self, owner_id: &str) -> bool {
        self.owner() == Some(owner_id)
    }

    /// Stamp the owner label, overwriting any prior value.
    pub fn set_owner(&mut self, owner_id: &str) {
        self.labels
            .insert(LABEL_OWNER.to_string(), owner_id.to_string());
    }

    /// Set a provider-specific hint, e.g. `force-update` or
    /// `needs-migration`.
    pub fn set_provider_specific(&mut self, key: &str, value: &str) {
        self.provider_specific
            .insert(key.to_string(), value.to_string());
    }

    /// Merge a mark's label bag onto this endpoint, leaving existing keys
    /// untouched unless the mark overrides them.
    pub fn merge_labels(&mut self, labels: &Labels) {
        for (k, v) in labels {
            self.labels.insert(k.clone(), v.clone());
        }
    }

    /// First target, used by the composer for non-unique record
    /// disambiguation (spec §4.4).
    #[must_use]
    pub fn first_target(&self) -> Option<&str> {
        self.targets.first().map(String::as_str)
    }
}

/// Forbid two endpoints with the same key from appearing in a single change
/// set (spec §3 invariant).
///
/// # Errors
/// Returns the offending duplicate key, if any.
pub fn check_unique_keys(endpoints: &[Endpoint]) -> Result<(), EndpointKey> {
    let mut seen = std::collections::HashSet::new();
    for e in endpoints {
        let key = e.key();
        if !seen.insert(key.clone()) {
            return Err(key);
        }
    }
    Ok(())
}

#[cfg(test)]
#[path = "endpoint_tests.rs"]
mod endpoint_tests;
