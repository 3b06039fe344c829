// Copyright (c) 2025 Erick Bourgeois, firestoned
// SPDX-License-Identifier: MIT

//! Error types for the ownership registry.
//!
//! Each concern gets its own `thiserror` enum; [`RegistryError`] aggregates
//! them for the public trait surface. `status_reason()` and `is_transient()`
//! exist for logging/metrics labeling, not for control flow.

use thiserror::Error;

/// Errors raised by the heritage codec (spec §4.2).
#[derive(Debug, Error)]
pub enum HeritageError {
    /// No `heritage=<token>` occurrence was found, its value was not the
    /// canonical token, or more than one occurrence was present.
    #[error("invalid heritage string: {0}")]
    InvalidHeritage(String),

    /// The string claimed to be encrypted but could not be base64-decoded.
    #[error("base64 decode failed: {0}")]
    Base64(#[from] base64::DecodeError),

    /// AES-256-GCM decryption failed (ciphertext forged, wrong key, etc).
    #[error("decryption failed")]
    Decrypt,
}

/// Construction-time configuration errors (spec §7).
#[derive(Debug, Error)]
pub enum ConfigError {
    /// `ownerId` was empty.
    #[error("owner id must not be empty")]
    EmptyOwnerId,

    /// The AES key was neither 32 raw bytes nor a base64 encoding of 32 bytes.
    #[error("AES key must be 32 bytes (raw or base64-encoded), got {0} bytes")]
    InvalidAesKeyLength(usize),

    /// Both a name-mapper prefix and suffix were set; they are mutually
    /// exclusive.
    #[error("name mapper prefix and suffix are mutually exclusive")]
    PrefixAndSuffixSet,

    /// The side-table backend was configured without a table name.
    #[error("side-table backend requires a table name")]
    MissingTableName,
}

/// Errors raised by an ownership store while talking to its backing storage
/// (spec §7).
#[derive(Debug, Error)]
pub enum StoreError {
    /// The side-table's schema does not match what the backend requires
    /// (missing hash key `k`, wrong type, or an unexpected range key).
    #[error("side-table schema mismatch: {0}")]
    TableSchema(String),

    /// A remote call failed in a way that is expected to succeed on retry
    /// (HTTP 429/5xx, network error, DynamoDB throttling).
    #[error("transient remote error: {0}")]
    RemoteTransient(String),

    /// A remote call failed in a way that will not succeed on retry.
    #[error("fatal remote error: {0}")]
    RemoteFatal(String),

    /// A side-table insert lost a race with another owner claiming the same
    /// key; the offending create is dropped, not the whole apply.
    #[error("duplicate claim for key {0}")]
    DuplicateClaim(String),

    /// Propagated from the wrapped [`crate::provider::Provider`].
    #[error(transparent)]
    Provider(#[from] crate::provider::ProviderError),

    /// Propagated from the Kubernetes client (Resource-list backend).
    #[error(transparent)]
    Kube(#[from] kube::Error),
}

impl StoreError {
    /// Whether the caller should retry at the next reconcile rather than
    /// surface the error.
    #[must_use]
    pub fn is_transient(&self) -> bool {
        matches!(self, StoreError::RemoteTransient(_))
    }

    /// Short machine-readable reason, suitable for a metrics label or a
    /// Kubernetes condition reason.
    #[must_use]
    pub fn status_reason(&self) -> &'static str {
        match self {
            StoreError::TableSchema(_) => "TableSchema",
            StoreError::RemoteTransient(_) => "RemoteTransient",
            StoreError::RemoteFatal(_) => "RemoteFatal",
            StoreError::DuplicateClaim(_) => "DuplicateClaim",
            StoreError::Provider(_) => "ProviderError",
            StoreError::Kube(_) => "KubeError",
        }
    }
}

/// Top-level error surfaced across the [`crate::registry::Registry`] trait.
#[derive(Debug, Error)]
pub enum RegistryError {
    /// A mark string could not be parsed. Benign — callers treat this as a
    /// pass-through signal, not a failure, except where propagation is
    /// explicitly required.
    #[error(transparent)]
    Heritage(#[from] HeritageError),

    /// Construction-time misconfiguration.
    #[error(transparent)]
    Config(#[from] ConfigError),

    /// Storage-backend failure.
    #[error(transparent)]
    Store(#[from] StoreError),
}

impl RegistryError {
    /// Whether the caller should retry at the next reconcile rather than
    /// surface the error.
    #[must_use]
    pub fn is_transient(&self) -> bool {
        matches!(self, RegistryError::Store(e) if e.is_transient())
    }

    /// Short machine-readable reason, suitable for a metrics label.
    #[must_use]
    pub fn status_reason(&self) -> &'static str {
        match self {
            RegistryError::Heritage(_) => "InvalidHeritage",
            RegistryError::Config(_) => "ConfigError",
            RegistryError::Store(e) => e.status_reason(),
        }
    }
}

#[cfg(test)]
#[path = "errors_tests.rs"]
mod errors_tests;
