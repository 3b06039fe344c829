// Copyright (c) 2025 Erick Bourgeois, firestoned
// SPDX-License-Identifier: MIT

//! Pagination helpers for Kubernetes API list operations.
//!
//! Used by the resource-list ownership store to page through
//! `OwnershipRecord` objects without loading an entire namespace into
//! memory at once.

use crate::constants::KUBE_LIST_PAGE_SIZE;
use anyhow::Result;
use kube::{api::ListParams, Api, Resource};
use serde::de::DeserializeOwned;
use std::fmt::Debug;
use tracing::debug;

/// Safety limit on the number of pages a single list may traverse before
/// it is treated as a runaway loop (a misbehaving API server that never
/// stops returning a continue token).
pub const MAX_REASONABLE_PAGES: u32 = 10_000;

/// List all resources with automatic pagination.
///
/// Fetches resources in pages of [`KUBE_LIST_PAGE_SIZE`] to bound memory
/// usage and API server load when a namespace holds many
/// `OwnershipRecord`s.
///
/// # Example
///
/// ```no_run
/// use kube::{Api, Client, api::ListParams};
/// use zonekeeper::crd::OwnershipRecord;
/// use zonekeeper::pagination::list_all_paginated;
///
/// # async fn example() -> anyhow::Result<()> {
/// let client = Client::try_default().await?;
/// let api: Api<OwnershipRecord> = Api::namespaced(client, "default");
///
/// let records = list_all_paginated(&api, ListParams::default()).await?;
/// println!("Found {} records", records.len());
/// # Ok(())
/// # }
/// ```
///
/// # Errors
/// Returns an error if Kubernetes API operations fail, or if the number
/// of pages traversed exceeds [`MAX_REASONABLE_PAGES`].
pub async fn list_all_paginated<K>(api: &Api<K>, mut list_params: ListParams) -> Result<Vec<K>>
where
    K: Resource<DynamicType = ()> + Clone + DeserializeOwned + Debug,
    K::DynamicType: Default,
{
    list_params.limit = Some(KUBE_LIST_PAGE_SIZE);

    let mut all_items = Vec::new();
    let mut page_count: u32 = 0;

    loop {
        page_count += 1;
        if page_count > MAX_REASONABLE_PAGES {
            anyhow::bail!(
                "list operation exceeded {MAX_REASONABLE_PAGES} pages, aborting to avoid an unbounded loop"
            );
        }

        let result = api.list(&list_params).await?;

        let item_count = result.items.len();
        all_items.extend(result.items);

        debug!(
            page = page_count,
            items_in_page = item_count,
            total_items = all_items.len(),
            "Fetched page from Kubernetes API"
        );

        let continue_token = result.metadata.continue_.filter(|token| !token.is_empty());
        match continue_token {
            Some(token) => list_params.continue_token = Some(token),
            None => break,
        }
    }

    debug!(
        total_pages = page_count,
        total_items = all_items.len(),
        "Completed paginated list operation"
    );

    Ok(all_items)
}

#[cfg(test)]
#[path = "pagination_tests.rs"]
mod pagination_tests;
