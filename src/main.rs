// Copyright (c) 2025 Erick Bourgeois, firestoned
// SPDX-License-Identifier: MIT

//! Demonstration CLI for the ownership registry.
//!
//! Wires a [`zonekeeper::registry::Registry`] backend in front of the
//! toy JSON-file [`zonekeeper::demo_provider::DemoProvider`] and exposes
//! it through three subcommands (`records`, `apply`, `serve`). This is
//! not a reconciliation controller — the planner that diffs desired vs.
//! observed state is out of scope (spec §1) — it only exercises the
//! registry surface end to end against a real provider trait object.

use std::path::PathBuf;
use std::time::Duration;

use anyhow::Result;
use axum::{routing::get, Router};
use clap::{Parser, Subcommand, ValueEnum};
use tracing::{debug, error, info};

use zonekeeper::config::RegistryConfig;
use zonekeeper::constants::{METRICS_SERVER_BIND_ADDRESS, METRICS_SERVER_PATH, METRICS_SERVER_PORT, TOKIO_WORKER_THREADS};
use zonekeeper::crd::OwnershipRecord;
use zonekeeper::demo_provider::DemoProvider;
use zonekeeper::metrics;
use zonekeeper::provider::DomainFilter;
use zonekeeper::registry::resource::ResourceRegistry;
use zonekeeper::registry::table::{DynamoBackend, TableRegistry};
use zonekeeper::registry::txt::TxtRegistry;
use zonekeeper::registry::Registry;

#[derive(Parser)]
#[command(name = "zonekeeper", version, about = "DNS ownership registry demonstration CLI")]
struct Cli {
    #[command(flatten)]
    registry: RegistryArgs,

    /// Port the `/metrics` endpoint listens on.
    #[arg(long, env = "ZONEKEEPER_METRICS_PORT", default_value_t = METRICS_SERVER_PORT)]
    metrics_port: u16,

    #[command(subcommand)]
    command: Command,
}

#[derive(clap::Args)]
struct RegistryArgs {
    /// Which ownership store backs this registry.
    #[arg(long, value_enum, env = "ZONEKEEPER_BACKEND", default_value = "txt")]
    backend: BackendKind,

    /// Identity of this registry instance; only records owned by this id
    /// are ever mutated.
    #[arg(long, env = "ZONEKEEPER_OWNER_ID")]
    owner_id: String,

    /// Sidecar-TXT mark name prefix (mutually exclusive with `--suffix`).
    #[arg(long, env = "ZONEKEEPER_PREFIX", default_value = "")]
    prefix: String,

    /// Sidecar-TXT mark name suffix (mutually exclusive with `--prefix`).
    #[arg(long, env = "ZONEKEEPER_SUFFIX", default_value = "")]
    suffix: String,

    /// Replacement for a leading `*.` wildcard label in mark names.
    #[arg(long, env = "ZONEKEEPER_WILDCARD_REPLACEMENT", default_value = "")]
    wildcard_replacement: String,

    /// AES-256 key (raw or base64) encrypting heritage strings. Empty
    /// disables encryption.
    #[arg(long, env = "ZONEKEEPER_AES_KEY", default_value = "")]
    aes_key: String,

    /// How long the merged endpoint list may be served from cache.
    #[arg(long, env = "ZONEKEEPER_CACHE_INTERVAL_SECS", default_value_t = 0)]
    cache_interval_secs: u64,

    /// Sidecar-TXT only: write a second, legacy-form companion mark
    /// alongside the primary one, for readers still on the older
    /// (non-type-embedding) name mapper.
    #[arg(long, env = "ZONEKEEPER_LEGACY_COMPAT", default_value_t = false)]
    legacy_compat: bool,

    /// Path to the demonstration provider's JSON record file.
    #[arg(long, env = "ZONEKEEPER_RECORDS_FILE", default_value = "records.json")]
    records_file: PathBuf,

    /// Zone suffixes the provider is allowed to touch.
    #[arg(long = "domain-include", env = "ZONEKEEPER_DOMAIN_INCLUDE", value_delimiter = ',')]
    domain_include: Vec<String>,

    /// Zone suffixes the provider must never touch.
    #[arg(long = "domain-exclude", env = "ZONEKEEPER_DOMAIN_EXCLUDE", value_delimiter = ',')]
    domain_exclude: Vec<String>,

    /// DynamoDB table name; required when `--backend table`.
    #[arg(long, env = "ZONEKEEPER_DYNAMODB_TABLE", default_value = "")]
    dynamodb_table: String,

    /// Namespace `OwnershipRecord` objects are read/written in; only used
    /// by `--backend resource`.
    #[arg(long, env = "ZONEKEEPER_NAMESPACE", default_value = "default")]
    namespace: String,
}

#[derive(Clone, Copy, Debug, ValueEnum)]
enum BackendKind {
    Txt,
    Table,
    Resource,
}

#[derive(Subcommand)]
enum Command {
    /// Print the merged endpoint list as JSON.
    Records,
    /// Apply a JSON-encoded change set from a file.
    Apply {
        /// Path to a JSON file holding a `Changes` value.
        changes_file: PathBuf,
    },
    /// Serve the Prometheus `/metrics` endpoint until interrupted.
    Serve,
}

fn main() -> Result<()> {
    let runtime = tokio::runtime::Builder::new_multi_thread()
        .worker_threads(TOKIO_WORKER_THREADS)
        .thread_name("zonekeeper")
        .enable_all()
        .build()?;

    runtime.block_on(async_main(Cli::parse()))
}

/// Initialize logging with custom format.
///
/// Respects `RUST_LOG` if set, otherwise defaults to INFO level.
/// Respects `RUST_LOG_FORMAT` for output format (json or text).
fn initialize_logging() {
    let env_filter = tracing_subscriber::EnvFilter::try_from_default_env()
        .unwrap_or_else(|_| tracing_subscriber::EnvFilter::new("info"));

    let log_format = std::env::var("RUST_LOG_FORMAT").unwrap_or_else(|_| "text".to_string());

    match log_format.to_lowercase().as_str() {
        "json" => {
            tracing_subscriber::fmt()
                .with_env_filter(env_filter)
                .with_file(true)
                .with_line_number(true)
                .with_thread_names(true)
                .with_target(false)
                .json()
                .init();
        }
        _ => {
            tracing_subscriber::fmt()
                .with_env_filter(env_filter)
                .with_file(true)
                .with_line_number(true)
                .with_thread_names(true)
                .with_target(false)
                .with_ansi(true)
                .compact()
                .init();
        }
    }

    info!("Starting zonekeeper");
    debug!("Logging initialized with file and line number tracking");
}

/// Start the Prometheus metrics HTTP server.
///
/// # Returns
/// A `JoinHandle` that can be used to monitor the server task.
fn start_metrics_server(port: u16) -> tokio::task::JoinHandle<()> {
    info!(
        bind_address = METRICS_SERVER_BIND_ADDRESS,
        port, path = METRICS_SERVER_PATH, "Starting Prometheus metrics HTTP server"
    );

    tokio::spawn(async move {
        async fn metrics_handler() -> String {
            match metrics::gather_metrics() {
                Ok(metrics_text) => metrics_text,
                Err(e) => {
                    error!("Failed to gather metrics: {}", e);
                    String::from("# Error gathering metrics\n")
                }
            }
        }

        let app = Router::new().route(METRICS_SERVER_PATH, get(metrics_handler));
        let bind_addr = format!("{METRICS_SERVER_BIND_ADDRESS}:{port}");
        let listener = match tokio::net::TcpListener::bind(&bind_addr).await {
            Ok(listener) => listener,
            Err(e) => {
                error!("Failed to bind metrics server to {bind_addr}: {e}");
                return;
            }
        };

        info!("Metrics server listening on http://{bind_addr}{METRICS_SERVER_PATH}");
        if let Err(e) = axum::serve(listener, app).await {
            error!("Metrics server error: {e}");
        }
    })
}

/// Build the provider and wrap it in the requested [`Registry`] backend.
async fn build_registry(args: &RegistryArgs) -> Result<Box<dyn Registry>> {
    let domain_filter = DomainFilter {
        include: args.domain_include.clone(),
        exclude: args.domain_exclude.clone(),
    };
    let provider = DemoProvider::load(&args.records_file, domain_filter).await?;
    let config = RegistryConfig::new(
        &args.owner_id,
        &args.prefix,
        &args.suffix,
        &args.wildcard_replacement,
        &args.aes_key,
        Duration::from_secs(args.cache_interval_secs),
        args.legacy_compat,
    )?;

    match args.backend {
        BackendKind::Txt => {
            debug!("using sidecar-TXT ownership store");
            Ok(Box::new(TxtRegistry::new(provider, config)))
        }
        BackendKind::Table => {
            debug!(table = %args.dynamodb_table, "using side-table ownership store");
            let aws_config = aws_config::load_defaults(aws_config::BehaviorVersion::latest()).await;
            let client = aws_sdk_dynamodb::Client::new(&aws_config);
            let backend = DynamoBackend::new(client, args.dynamodb_table.clone())?;
            let registry = TableRegistry::new(provider, config, backend);
            registry.validate_schema().await?;
            Ok(Box::new(registry))
        }
        BackendKind::Resource => {
            debug!(namespace = %args.namespace, "using resource-list ownership store");
            let client = kube::Client::try_default().await?;
            let api = kube::Api::<OwnershipRecord>::namespaced(client, &args.namespace);
            Ok(Box::new(ResourceRegistry::new(provider, config, api)))
        }
    }
}

async fn async_main(cli: Cli) -> Result<()> {
    initialize_logging();

    match cli.command {
        Command::Serve => {
            let handle = start_metrics_server(cli.metrics_port);
            info!("serving metrics; press Ctrl+C to stop");
            tokio::select! {
                result = tokio::signal::ctrl_c() => {
                    result?;
                    info!("received SIGINT, shutting down");
                }
                result = handle => {
                    result?;
                }
            }
        }
        Command::Records => {
            let registry = build_registry(&cli.registry).await?;
            let records = registry.records().await?;
            println!("{}", serde_json::to_string_pretty(&records)?);
        }
        Command::Apply { changes_file } => {
            let registry = build_registry(&cli.registry).await?;
            let bytes = tokio::fs::read(&changes_file).await?;
            let changes = serde_json::from_slice(&bytes)?;
            registry.apply_changes(&changes).await?;
            info!(file = %changes_file.display(), "applied change set");
        }
    }

    Ok(())
}

// Tests are in main_tests.rs
#[cfg(test)]
mod main_tests;
