// Copyright (c) 2025 Erick Bourgeois, firestoned
// SPDX-License-Identifier: MIT

//! Global constants for the zonekeeper ownership registry.
//!
//! This module contains all numeric and string constants used throughout the codebase.
//! Constants are organized by category for easy maintenance.

// ============================================================================
// API Constants
// ============================================================================

/// API group for the `OwnershipRecord` CRD.
pub const API_GROUP: &str = "zonekeeper.firestoned.io";

/// API version for the `OwnershipRecord` CRD.
pub const API_VERSION: &str = "v1alpha1";

/// Fully qualified API version (group/version).
pub const API_GROUP_VERSION: &str = "zonekeeper.firestoned.io/v1alpha1";

/// Kind name for the `OwnershipRecord` resource.
pub const KIND_OWNERSHIP_RECORD: &str = "OwnershipRecord";

// ============================================================================
// Heritage Wire Format Constants
// ============================================================================

/// The fixed heritage token identifying marks belonging to this system.
pub const HERITAGE_TOKEN: &str = "external-dns";

/// Reserved label key holding the owning controller id.
pub const LABEL_OWNER: &str = "owner";

/// Reserved label key holding a free-form origin descriptor.
pub const LABEL_RESOURCE: &str = "resource";

/// Reserved label key back-referencing the endpoint a mark belongs to.
pub const LABEL_OWNED_RECORD: &str = "owned-record";

/// Reserved label key disambiguating non-unique record kinds (e.g. SRV).
pub const LABEL_TARGET: &str = "target";

/// Provider-specific hint requesting the planner re-emit a record during
/// TXT-to-side-table migration.
pub const HINT_NEEDS_MIGRATION: &str = "needs-migration";

/// Provider-specific hint requesting the planner re-emit a record whose
/// companion mark is absent.
pub const HINT_FORCE_UPDATE: &str = "force-update";

/// Token substituted with the lower-cased record type in affix templates.
pub const RECORD_TYPE_TOKEN: &str = "%{record_type}";

/// AES-256 key length in raw bytes.
pub const AES_KEY_LEN: usize = 32;

// ============================================================================
// Side-table Constants
// ============================================================================

/// Hash-key attribute name of the side-table.
pub const TABLE_HASH_KEY_ATTR: &str = "k";

/// Owner attribute name of the side-table.
pub const TABLE_OWNER_ATTR: &str = "o";

/// Label-bag attribute name of the side-table.
pub const TABLE_LABELS_ATTR: &str = "l";

/// Maximum number of statements per batched side-table write (spec §5).
pub const MAX_BATCH_SIZE: usize = 25;

// ============================================================================
// Resource-list Constants
// ============================================================================

/// Label key carrying the owning controller id on an `OwnershipRecord`.
pub const RESOURCE_LABEL_OWNER: &str = "zonekeeper.firestoned.io/owner";

/// Label key carrying the endpoint DNS name on an `OwnershipRecord`.
pub const RESOURCE_LABEL_RECORD_NAME: &str = "zonekeeper.firestoned.io/record-name";

/// Label key carrying the endpoint record type on an `OwnershipRecord`.
pub const RESOURCE_LABEL_RECORD_TYPE: &str = "zonekeeper.firestoned.io/record-type";

/// Label key carrying the endpoint key on an `OwnershipRecord`.
pub const RESOURCE_LABEL_RECORD_KEY: &str = "zonekeeper.firestoned.io/record-key";

/// Label key carrying the source descriptor on an `OwnershipRecord`.
pub const RESOURCE_LABEL_RESOURCE: &str = "zonekeeper.firestoned.io/resource";

// ============================================================================
// Pagination Constants
// ============================================================================

/// Page size used when listing Kubernetes-style resources.
pub const KUBE_LIST_PAGE_SIZE: u32 = 500;

// ============================================================================
// Cache Constants
// ============================================================================

/// Default endpoint cache interval in seconds.
pub const DEFAULT_CACHE_INTERVAL_SECS: u64 = 0;

// ============================================================================
// Runtime Constants
// ============================================================================

/// Number of worker threads for the demonstration binary's Tokio runtime.
pub const TOKIO_WORKER_THREADS: usize = 4;

// ============================================================================
// Metrics Server Constants
// ============================================================================

/// Port for Prometheus metrics HTTP server.
pub const METRICS_SERVER_PORT: u16 = 8080;

/// Path for Prometheus metrics endpoint.
pub const METRICS_SERVER_PATH: &str = "/metrics";

/// Bind address for metrics HTTP server.
pub const METRICS_SERVER_BIND_ADDRESS: &str = "0.0.0.0";
