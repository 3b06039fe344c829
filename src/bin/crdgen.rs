// Copyright (c) 2025 Erick Bourgeois, firestoned
// SPDX-License-Identifier: MIT

//! CRD YAML Generator
//!
//! Generates the `OwnershipRecord` CRD YAML from the Rust type in
//! src/crd.rs so that the manifest in deploy/crds/ stays in sync with
//! the code.
//!
//! Usage:
//!   cargo run --bin crdgen

use kube::CustomResourceExt;
use std::fs;
use std::path::Path;
use zonekeeper::crd::OwnershipRecord;

const COPYRIGHT_HEADER: &str = "# Copyright (c) 2025 Erick Bourgeois, firestoned
# SPDX-License-Identifier: MIT
#
# This file is AUTO-GENERATED from src/crd.rs
# DO NOT EDIT MANUALLY - Run `cargo run --bin crdgen` to regenerate
#
";

fn main() -> Result<(), Box<dyn std::error::Error>> {
    let output_dir = Path::new("deploy/crds");
    fs::create_dir_all(output_dir)?;

    println!("Generating CRD YAML from src/crd.rs...");

    let crd = OwnershipRecord::crd();
    let yaml = serde_yaml::to_string(&crd)?;
    let content = format!("{COPYRIGHT_HEADER}{yaml}");

    let output_path = output_dir.join("ownershiprecords.crd.yaml");
    fs::write(&output_path, content)?;

    println!("  ✓ Generated ownershiprecords.crd.yaml");

    Ok(())
}
