//! titres-ingest - Excel import command
//!
//! Thin adapter over the ingestion pipeline: parses arguments, wires the
//! collaborators once, runs one import job, and reports the outcome. All
//! behavior lives in the library.

use anyhow::{bail, Context, Result};
use clap::Parser;
use std::path::PathBuf;
use std::sync::Arc;
use titres_common::config::TomlConfig;
use titres_common::events::EventBus;
use titres_ingest::api_client::TitleApiClient;
use titres_ingest::config::{resolve_settings, ConfigOverrides};
use titres_ingest::notify::NotificationCenter;
use titres_ingest::transport::HttpTransport;
use titres_ingest::validator::FileValidator;
use titres_ingest::views::{DashboardStatsView, TitleCountView, TitleTableView, ViewRegistry};
use titres_ingest::{IngestPipeline, OutcomeKind, SpreadsheetFile};
use tracing::info;
use tracing_subscriber::EnvFilter;

#[derive(Debug, Parser)]
#[command(name = "titres-ingest", version, about = "Import a titles spreadsheet into the backend")]
struct Args {
    /// Spreadsheet to import (.xlsx, .xls, optionally .csv)
    file: PathBuf,

    /// Actor label attached to the upload
    #[arg(long, env = "TITRES_ACTOR", default_value = "import-cli")]
    actor: String,

    /// Path to the TOML configuration file
    #[arg(long)]
    config: Option<PathBuf>,

    /// Backend API base URL (overrides ENV and TOML)
    #[arg(long)]
    base_url: Option<String>,

    /// Transport strategy: title-api or direct-upload
    #[arg(long)]
    transport: Option<String>,
}

#[tokio::main]
async fn main() -> Result<()> {
    let args = Args::parse();

    let toml_config = TomlConfig::load_or_default(args.config.as_deref())?;

    // RUST_LOG wins over the configured level
    let filter = EnvFilter::try_from_default_env()
        .unwrap_or_else(|_| EnvFilter::new(toml_config.logging.level.clone()));
    tracing_subscriber::fmt().with_env_filter(filter).init();

    info!("Starting titres-ingest");
    info!("Version: {}", env!("CARGO_PKG_VERSION"));

    let overrides = ConfigOverrides {
        base_url: args.base_url.clone(),
        transport: args
            .transport
            .as_deref()
            .map(str::parse)
            .transpose()?,
    };
    let settings = resolve_settings(&overrides, &toml_config)?;
    info!(base_url = %settings.base_url, transport = ?settings.transport, "Settings resolved");

    let file = SpreadsheetFile::from_path(&args.file)
        .with_context(|| format!("Cannot read {}", args.file.display()))?;

    // Composition root owns every collaborator; nothing is ambient.
    let bus = EventBus::new(100);
    let center = Arc::new(NotificationCenter::new(settings.auto_dismiss));
    let client = TitleApiClient::new(&settings.base_url, settings.timeout);

    let mut registry = ViewRegistry::new();
    let dashboard = Arc::new(DashboardStatsView::new(client.clone()));
    let table = Arc::new(TitleTableView::new(client.clone()));
    let count = Arc::new(TitleCountView::new(client.clone()));
    registry.register(dashboard.clone());
    registry.register(table.clone());
    registry.register(count.clone());

    let transport = Arc::new(HttpTransport::new(
        &settings.base_url,
        settings.transport,
        settings.timeout,
    ));
    let validator = FileValidator::new(settings.accept_csv, settings.max_file_size_bytes);

    let pipeline = IngestPipeline::new(validator, transport, bus, Arc::clone(&center));

    let outcome = match pipeline.run(file, &args.actor, &registry).await {
        Ok(outcome) => outcome,
        Err(e) => bail!("Import failed: {}", e),
    };

    match outcome.kind {
        OutcomeKind::Success => {
            info!(rows = outcome.succeeded, "Import completed");
        }
        OutcomeKind::Partial => {
            info!(
                succeeded = outcome.succeeded,
                failed = outcome.failed,
                "Import completed with row errors"
            );
            for entry in &outcome.errors {
                info!(error = %entry, "Rejected row");
            }
        }
        OutcomeKind::Failed => {
            bail!(
                "Import failed: {}",
                outcome
                    .failure_message
                    .unwrap_or_else(|| "server rejected the batch".to_string())
            );
        }
    }

    if let Some(stats) = dashboard.latest().await {
        info!(
            total = stats.total_titres,
            actifs = stats.titres_actifs,
            expires = stats.titres_expires,
            "Dashboard after import"
        );
    }

    Ok(())
}
