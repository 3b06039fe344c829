// Copyright (c) 2025 Erick Bourgeois, firestoned
// SPDX-License-Identifier: MIT

//! Custom Resource Definition for the resource-list ownership store.
//!
//! # Example
//!
//! ```rust,no_run
//! use zonekeeper::crd::{OwnershipRecord, OwnershipRecordSpec};
//! use zonekeeper::endpoint::Endpoint;
//!
//! let endpoint = Endpoint::new("sub.example.org", "CNAME", vec!["target.example.org".into()]);
//! let spec = OwnershipRecordSpec { endpoint };
//! ```

use kube::CustomResource;
use schemars::JsonSchema;
use serde::{Deserialize, Serialize};

use crate::endpoint::Endpoint;

/// One condition in a resource's status (spec §9's ambient status
/// convention, shared with the teacher's `Condition` type).
#[derive(Clone, Debug, Serialize, Deserialize, JsonSchema)]
#[serde(rename_all = "camelCase")]
pub struct Condition {
    /// Type of condition, e.g. `Ready`.
    pub r#type: String,
    /// Status of the condition: True, False, or Unknown.
    pub status: String,
    /// Brief CamelCase reason for the condition's last transition.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub reason: Option<String>,
    /// Human-readable detail.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub message: Option<String>,
    /// RFC3339 timestamp of the last transition.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub last_transition_time: Option<String>,
}

/// Status subresource for [`OwnershipRecord`].
#[derive(Clone, Debug, Serialize, Deserialize, Default, JsonSchema)]
#[serde(rename_all = "camelCase")]
pub struct OwnershipRecordStatus {
    #[serde(default)]
    pub conditions: Vec<Condition>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub observed_generation: Option<i64>,
}

/// `OwnershipRecord` is the resource-list backend's ownership mark: one
/// instance per owned endpoint, carrying the full endpoint in its spec
/// and correlation metadata in its labels (spec §4.7/§6):
/// `owner`, `record-name`, `record-type`, `record-key`, `resource`.
///
/// `metadata.name` is `<ownerId>-<sanitized-dns-name>-<recordType>`
/// (lower-cased, `.` replaced with `-`); see
/// [`crate::registry::resource::sanitized_resource_name`].
///
/// # Example
///
/// ```yaml
/// apiVersion: zonekeeper.firestoned.io/v1alpha1
/// kind: OwnershipRecord
/// metadata:
///   name: owner-sub-example-org-cname
///   labels:
///     owner: owner
///     record-name: sub.example.org
///     record-type: CNAME
///     record-key: sub.example.org#CNAME#
/// spec:
///   endpoint:
///     dnsName: sub.example.org
///     recordType: CNAME
///     targets: ["target.example.org"]
/// ```
#[derive(CustomResource, Clone, Debug, Serialize, Deserialize, JsonSchema)]
#[kube(
    group = "zonekeeper.firestoned.io",
    version = "v1alpha1",
    kind = "OwnershipRecord",
    namespaced,
    shortname = "ownrec",
    doc = "OwnershipRecord is a companion object that records which controller instance owns a DNS endpoint, used by the resource-list ownership store.",
    printcolumn = r#"{"name":"Owner","type":"string","jsonPath":".metadata.labels.owner"}"#,
    printcolumn = r#"{"name":"RecordName","type":"string","jsonPath":".metadata.labels.record-name"}"#,
    printcolumn = r#"{"name":"RecordType","type":"string","jsonPath":".metadata.labels.record-type"}"#,
    printcolumn = r#"{"name":"Ready","type":"string","jsonPath":".status.conditions[?(@.type=='Ready')].status"}"#
)]
#[kube(status = "OwnershipRecordStatus")]
#[serde(rename_all = "camelCase")]
pub struct OwnershipRecordSpec {
    /// The full endpoint this record tracks ownership for.
    pub endpoint: Endpoint,
}
