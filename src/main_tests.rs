// Copyright (c) 2025 Erick Bourgeois, firestoned
// SPDX-License-Identifier: MIT

use super::*;

fn parse(args: &[&str]) -> Cli {
    Cli::try_parse_from(std::iter::once(&"zonekeeper").chain(args).copied()).unwrap()
}

#[test]
fn defaults_to_txt_backend() {
    let cli = parse(&["--owner-id", "owner", "records"]);
    assert!(matches!(cli.registry.backend, BackendKind::Txt));
    assert_eq!(cli.registry.owner_id, "owner");
    assert_eq!(cli.metrics_port, METRICS_SERVER_PORT);
}

#[test]
fn domain_filters_split_on_comma() {
    let cli = parse(&[
        "--owner-id",
        "owner",
        "--domain-include",
        "a.example.org,b.example.org",
        "records",
    ]);
    assert_eq!(
        cli.registry.domain_include,
        vec!["a.example.org".to_string(), "b.example.org".to_string()]
    );
}

#[test]
fn apply_subcommand_captures_changes_file() {
    let cli = parse(&["--owner-id", "owner", "apply", "changes.json"]);
    match cli.command {
        Command::Apply { changes_file } => assert_eq!(changes_file, PathBuf::from("changes.json")),
        _ => panic!("expected Apply subcommand"),
    }
}

#[test]
fn table_backend_selectable_via_flag() {
    let cli = parse(&[
        "--owner-id",
        "owner",
        "--backend",
        "table",
        "--dynamodb-table",
        "zone-owners",
        "records",
    ]);
    assert!(matches!(cli.registry.backend, BackendKind::Table));
    assert_eq!(cli.registry.dynamodb_table, "zone-owners");
}

#[test]
fn missing_owner_id_is_rejected() {
    let result = Cli::try_parse_from(["zonekeeper", "records"]);
    assert!(result.is_err());
}
