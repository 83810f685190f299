//! Address generation worker.
//!
//! Queries Photon for building results in a country's cities, filters and
//! assembles them into address documents, and stores them in Elasticsearch.

use std::path::PathBuf;
use std::sync::Arc;
use std::time::Duration;

use anyhow::{Context, Result};
use clap::Parser;
use indicatif::{ProgressBar, ProgressStyle};
use tracing::{error, info, warn};
use tracing_subscriber::{EnvFilter, FmtSubscriber};

use streetseed::elasticsearch::{EsAddressStore, EsClient};
use streetseed::error::ReferenceError;
use streetseed::geocoder::PhotonClient;
use streetseed::reference::CountryCityTable;
use streetseed::sink::{ErrorKind, ErrorSink};
use streetseed::store::{AddressStore, IndexMode, MemoryStore};
use streetseed::{GeneratorConfig, Generator};

/// How long to wait for the error sink to drain after generation
const SINK_DRAIN_LIMIT: Duration = Duration::from_secs(5);

#[derive(Parser, Debug)]
#[command(name = "generate")]
#[command(about = "Generate real-world addresses for a country and store them")]
struct Args {
    /// Country name as it appears in the country/city table
    country: String,

    /// Number of new addresses to store
    count: usize,

    /// TOML config file (optional)
    #[arg(short, long)]
    config: Option<PathBuf>,

    /// Elasticsearch URL (overrides config)
    #[arg(long)]
    es_url: Option<String>,

    /// Elasticsearch index name (overrides config)
    #[arg(long)]
    index: Option<String>,

    /// Worker identifier stamped on every document (overrides config)
    #[arg(long)]
    worker_id: Option<i64>,

    /// Keep documents in memory instead of writing to Elasticsearch
    #[arg(long)]
    dry_run: bool,
}

#[tokio::main]
async fn main() -> Result<()> {
    // Initialize logging; stdout is reserved for the report
    let subscriber = FmtSubscriber::builder()
        .with_env_filter(
            EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info")),
        )
        .with_writer(std::io::stderr)
        .finish();
    tracing::subscriber::set_global_default(subscriber)?;

    let args = Args::parse();

    let mut config = match &args.config {
        Some(path) => GeneratorConfig::load_from_file(path)
            .with_context(|| format!("Failed to load config from {}", path.display()))?,
        None => GeneratorConfig::default(),
    };
    if let Some(es_url) = args.es_url {
        config.es_url = es_url;
    }
    if let Some(index) = args.index {
        config.index = index;
    }
    if let Some(worker_id) = args.worker_id {
        config.worker_id = worker_id;
    }

    info!("Streetseed address generator");
    info!(
        "Country: {}, target: {}, worker: {}",
        args.country, args.count, config.worker_id
    );

    let (reporter, sink) = ErrorSink::spawn();

    let (table, load_error) = CountryCityTable::load_or_empty(&config.country_city_file);
    if let Some(e) = load_error {
        let kind = match &e {
            ReferenceError::Io { .. } => ErrorKind::FileNotFound,
            ReferenceError::Parse { .. } => ErrorKind::ReferenceData,
        };
        reporter.report(kind, e.to_string());
    }

    let api = PhotonClient::new(&config.photon_url, config.request_timeout())
        .context("Failed to build Photon client")?;

    let es_client = if args.dry_run {
        info!("Dry run: documents are kept in memory");
        None
    } else {
        let es_client = EsClient::new(&config.es_url, &config.index)
            .context("Failed to connect to Elasticsearch")?;
        if !es_client.health_check().await? {
            anyhow::bail!("Elasticsearch cluster is not healthy");
        }
        info!("Connected to Elasticsearch");
        Some(es_client)
    };

    let store: Arc<dyn AddressStore> = match &es_client {
        Some(es_client) => Arc::new(EsAddressStore::new(es_client.clone())),
        None => Arc::new(MemoryStore::new()),
    };

    if store.ensure_index(&reporter).await == IndexMode::NonUnique {
        warn!("Address index created with dynamic mapping; duplicates are still refused by document id");
    }

    let pb = ProgressBar::new(0);
    pb.set_style(
        ProgressStyle::default_bar()
            .template(
                "{spinner:.green} [{elapsed_precise}] [{bar:40.cyan/blue}] {pos}/{len} cities ({msg})",
            )?
            .progress_chars("#>-"),
    );

    let mut generator = Generator::new(
        Arc::new(api),
        store,
        Arc::new(table),
        config,
        reporter,
    )
    .with_progress(pb);

    let outcome = tokio::select! {
        outcome = generator.generate_addresses(&args.country, args.count) => outcome,
        _ = tokio::signal::ctrl_c() => {
            warn!("Generation cancelled");
            std::process::exit(1);
        }
    };

    // Dropping the generator releases the last reporter so the sink can drain
    drop(generator);
    let tally = sink.finish(SINK_DRAIN_LIMIT).await;

    let report = match outcome {
        Ok(report) => report,
        Err(e) => {
            error!("{}", e);
            std::process::exit(1);
        }
    };

    info!("Generation finished for {}", report.country);
    info!("  Cities processed: {}", report.processed_cities);
    info!("  Documents generated: {}", report.total_generated);
    info!(
        "  Saved: {}/{} ({} duplicates, {} errors)",
        report.total_saved, report.target_count, report.total_duplicates, report.total_errors
    );
    for (kind, count) in &tally {
        info!("  {}: {}", kind, count);
    }

    if let Some(es_client) = &es_client {
        match es_client.doc_count(Some(report.worker_id)).await {
            Ok(count) => info!(
                "  Index {} holds {} addresses from worker {}",
                es_client.index_name, count, report.worker_id
            ),
            Err(e) => warn!("Could not count stored addresses: {}", e),
        }
    }

    println!("{}", serde_json::to_string_pretty(&report)?);
    Ok(())
}
