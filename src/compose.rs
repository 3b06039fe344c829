// Copyright (c) 2025 Erick Bourgeois, firestoned
// SPDX-License-Identifier: MIT

//! Change composer & ownership filter (spec §4.4).
//!
//! [`filter_owned`] drops endpoints whose `owner` label does not match the
//! registry's configured owner id; it is applied to `UpdateNew`,
//! `UpdateOld`, and `Delete`, never to `Create` (new records have no prior
//! owner). [`compose`] turns a planner [`Changes`] into the augmented
//! change actually sent to the provider, plus the companion mark
//! operations each ownership store must perform — the concrete mark
//! representation (TXT endpoint, side-table row, resource object) is left
//! to the store.

use crate::constants::LABEL_TARGET;
use crate::endpoint::Endpoint;
use crate::provider::Changes;

/// Record types that may repeat by name and need the companion mark's
/// `target` label to disambiguate which endpoint target a reader should
/// correlate the mark to (spec §4.4).
const NON_UNIQUE_RECORD_TYPES: &[&str] = &["SRV"];

/// Drop any endpoint whose `labels.owner` differs from `owner_id`.
#[must_use]
pub fn filter_owned(endpoints: &[Endpoint], owner_id: &str) -> Vec<Endpoint> {
    endpoints
        .iter()
        .filter(|e| e.is_owned_by(owner_id))
        .cloned()
        .collect()
}

/// The augmented change set and the companion mark operations each
/// ownership store must perform to stay consistent with it.
#[derive(Clone, Debug, Default, PartialEq)]
pub struct ComposedChanges {
    /// The change set to hand to `provider.ApplyChanges` (owner-filtered,
    /// owner-stamped).
    pub endpoint_changes: Changes,
    /// Endpoints that need a new companion mark.
    pub mark_creates: Vec<Endpoint>,
    /// Endpoints whose companion mark must be removed.
    pub mark_deletes: Vec<Endpoint>,
    /// `(old, new)` pairs whose companion mark must be replaced. Stores
    /// that can cheaply compare label-bag equality (the side-table
    /// back-end) may elide a no-op pair; sidecar-TXT and resource-list
    /// always emit it.
    pub mark_updates: Vec<(Endpoint, Endpoint)>,
}

/// Compose a planner change set into the augmented form described above.
#[must_use]
pub fn compose(changes: &Changes, owner_id: &str) -> ComposedChanges {
    let mut result = ComposedChanges::default();

    let creates: Vec<Endpoint> = changes
        .create
        .iter()
        .cloned()
        .map(|mut e| {
            stamp_disambiguation_label(&mut e);
            e.set_owner(owner_id);
            e
        })
        .collect();
    result.mark_creates = creates.clone();
    result.endpoint_changes.create = creates;

    let deletes = filter_owned(&changes.delete, owner_id);
    result.mark_deletes = deletes.clone();
    result.endpoint_changes.delete = deletes;

    for (old, new) in changes.update_old.iter().zip(changes.update_new.iter()) {
        if !old.is_owned_by(owner_id) {
            continue;
        }
        let mut new = new.clone();
        stamp_disambiguation_label(&mut new);
        result.endpoint_changes.update_old.push(old.clone());
        result.endpoint_changes.update_new.push(new.clone());
        result.mark_updates.push((old.clone(), new));
    }

    result
}

fn stamp_disambiguation_label(endpoint: &mut Endpoint) {
    if NON_UNIQUE_RECORD_TYPES.contains(&endpoint.record_type.as_str()) {
        if let Some(target) = endpoint.first_target().map(str::to_string) {
            endpoint.labels.insert(LABEL_TARGET.to_string(), target);
        }
    }
}

#[cfg(test)]
#[path = "compose_tests.rs"]
mod compose_tests;
