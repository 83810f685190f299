//! Region validator for generated addresses.
//!
//! Checks whether a generated address lies in the region named by its seed
//! and prints the extracted city/country with the verdict.

use std::path::PathBuf;
use std::sync::Arc;

use anyhow::{Context, Result};
use clap::Parser;
use serde::Serialize;
use tracing::info;
use tracing_subscriber::{EnvFilter, FmtSubscriber};

use streetseed::reference::{CountryMapping, Gazetteer};
use streetseed::{GeneratorConfig, RegionValidator};

#[derive(Parser, Debug)]
#[command(name = "validate")]
#[command(about = "Check that a generated address matches its seed region")]
struct Args {
    /// Generated address
    generated: String,

    /// Seed region (city or country name)
    seed: String,

    /// Gazetteer cities file (JSON or .json.gz)
    #[arg(long, default_value = "cities.json.gz")]
    cities: PathBuf,

    /// Gazetteer countries file (JSON or .json.gz)
    #[arg(long, default_value = "countries.json")]
    countries: PathBuf,

    /// Extra country aliases as a JSON object
    #[arg(long)]
    country_mapping: Option<PathBuf>,

    /// TOML config file; supplies `country_mapping_file` when no mapping is given
    #[arg(short, long)]
    config: Option<PathBuf>,
}

#[derive(Debug, Serialize)]
struct Verdict {
    city: String,
    country: String,
    matched: bool,
}

fn main() -> Result<()> {
    let subscriber = FmtSubscriber::builder()
        .with_env_filter(
            EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info")),
        )
        .with_writer(std::io::stderr)
        .finish();
    tracing::subscriber::set_global_default(subscriber)?;

    let args = Args::parse();

    let mapping_path = match (&args.country_mapping, &args.config) {
        (Some(path), _) => Some(path.clone()),
        (None, Some(config)) => {
            GeneratorConfig::load_from_file(config)
                .with_context(|| format!("Failed to load config from {}", config.display()))?
                .country_mapping_file
        }
        (None, None) => None,
    };

    let mapping = match mapping_path {
        Some(path) => CountryMapping::load_from_file(&path)
            .with_context(|| format!("Failed to load country mapping {}", path.display()))?,
        None => CountryMapping::default(),
    };
    info!("Country mapping has {} aliases", mapping.len());

    let gazetteer = Gazetteer::load(&args.cities, &args.countries)
        .context("Failed to load gazetteer")?;

    let validator = RegionValidator::new(Arc::new(mapping), Arc::new(gazetteer));

    let (city, country) = validator.extract(&args.generated, args.seed.contains(','));
    let matched = validator.matches(&args.generated, &args.seed);
    info!(
        "'{}' vs seed '{}': {}",
        args.generated,
        args.seed,
        if matched { "match" } else { "mismatch" }
    );

    let verdict = Verdict {
        city,
        country,
        matched,
    };
    println!("{}", serde_json::to_string(&verdict)?);

    if !matched {
        std::process::exit(1);
    }
    Ok(())
}
