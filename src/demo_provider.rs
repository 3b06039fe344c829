// Copyright (c) 2025 Erick Bourgeois, firestoned
// SPDX-License-Identifier: MIT

//! A toy JSON-file-backed [`Provider`], used by the demonstration binary
//! in place of a real authoritative DNS backend (spec §1/§6 call an
//! actual provider out of scope).

use std::path::PathBuf;

use async_trait::async_trait;
use tokio::sync::Mutex;

use crate::endpoint::{check_unique_keys, Endpoint};
use crate::provider::{Changes, DomainFilter, Provider, ProviderError};

/// Reads and writes a JSON array of [`Endpoint`] to `path`, holding the
/// whole set in memory between calls.
pub struct DemoProvider {
    path: PathBuf,
    domain_filter: DomainFilter,
    records: Mutex<Vec<Endpoint>>,
}

impl DemoProvider {
    /// Load the initial record set from `path`. A missing file is treated
    /// as an empty zone.
    ///
    /// # Errors
    /// Returns an error if `path` exists but cannot be read or parsed.
    pub async fn load(path: impl Into<PathBuf>, domain_filter: DomainFilter) -> Result<Self, ProviderError> {
        let path = path.into();
        let records = match tokio::fs::read(&path).await {
            Ok(bytes) => serde_json::from_slice(&bytes)
                .map_err(|e| ProviderError::Fatal(format!("invalid record file {}: {e}", path.display())))?,
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => Vec::new(),
            Err(e) => return Err(ProviderError::Fatal(format!("reading {}: {e}", path.display()))),
        };
        Ok(Self {
            path,
            domain_filter,
            records: Mutex::new(records),
        })
    }

    async fn persist(&self, records: &[Endpoint]) -> Result<(), ProviderError> {
        let bytes = serde_json::to_vec_pretty(records)
            .map_err(|e| ProviderError::Fatal(format!("serializing record file: {e}")))?;
        tokio::fs::write(&self.path, bytes)
            .await
            .map_err(|e| ProviderError::Fatal(format!("writing {}: {e}", self.path.display())))
    }
}

#[async_trait]
impl Provider for DemoProvider {
    async fn records(&self) -> Result<Vec<Endpoint>, ProviderError> {
        Ok(self.records.lock().await.clone())
    }

    async fn apply_changes(&self, changes: &Changes) -> Result<(), ProviderError> {
        let mut records = self.records.lock().await;

        for old in &changes.update_old {
            records.retain(|e| e.key() != old.key());
        }
        for delete in &changes.delete {
            records.retain(|e| e.key() != delete.key());
        }
        records.extend(changes.create.iter().cloned());
        records.extend(changes.update_new.iter().cloned());

        check_unique_keys(&records)
            .map_err(|key| ProviderError::Fatal(format!("duplicate endpoint key after apply: {key}")))?;

        self.persist(&records).await?;
        Ok(())
    }

    fn domain_filter(&self) -> DomainFilter {
        self.domain_filter.clone()
    }
}

#[cfg(test)]
#[path = "demo_provider_tests.rs"]
mod demo_provider_tests;
