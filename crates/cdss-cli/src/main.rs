use std::io::Read;
use std::path::PathBuf;

use anyhow::{bail, Context};
use clap::{Parser, Subcommand};
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

use cdss_core::config::{DEFAULT_MODEL_DIR, DEFAULT_MODEL_VERSION};
use cdss_core::{parse_record, Database, PatientRecord, Predictor, PredictorConfig};

#[derive(Parser)]
#[command(name = "cdss")]
#[command(about = "Clinical decision support prediction CLI")]
struct Cli {
    /// Directory holding model artifacts (env: CDSS_MODEL_DIR)
    #[arg(long, global = true)]
    model_dir: Option<PathBuf>,
    /// Model version to load (env: CDSS_MODEL_VERSION)
    #[arg(long, global = true)]
    model_version: Option<String>,
    /// SQLite reference catalog (env: CDSS_CATALOG_DB)
    #[arg(long, global = true)]
    catalog_db: Option<PathBuf>,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Predict diagnoses for a JSON patient record
    Predict {
        /// Record file, or `-` for stdin
        #[arg(default_value = "-")]
        input: String,
    },
    /// Print the feature vector for a JSON patient record
    Encode {
        /// Record file, or `-` for stdin
        #[arg(default_value = "-")]
        input: String,
        /// Pair each value with its feature name
        #[arg(long)]
        names: bool,
    },
    /// Show how the predictor initialised
    Status,
    /// List the loaded catalog, or search diagnoses in the store
    Catalog {
        /// Description substring to search for
        #[arg(long)]
        search: Option<String>,
    },
}

fn main() -> anyhow::Result<()> {
    dotenvy::dotenv().ok();

    tracing_subscriber::registry()
        .with(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| tracing_subscriber::EnvFilter::new("info")),
        )
        .with(tracing_subscriber::fmt::layer().with_writer(std::io::stderr))
        .init();

    let cli = Cli::parse();
    let config = resolve_config(&cli)?;

    match cli.command {
        Commands::Predict { input } => {
            let record = read_record(&input)?;
            let predictor = Predictor::initialise(&config);
            let report = predictor.report(&record);
            println!("{}", report.to_json()?);
        }
        Commands::Encode { input, names } => {
            let record = read_record(&input)?;
            let predictor = Predictor::initialise(&config);
            let features = predictor.encode(&record);
            let output = if names {
                let named: serde_json::Map<String, serde_json::Value> = predictor
                    .encoder()
                    .feature_names()
                    .into_iter()
                    .zip(features.values())
                    .map(|(name, value)| (name, serde_json::json!(value)))
                    .collect();
                serde_json::Value::Object(named)
            } else {
                serde_json::json!(features.values())
            };
            println!("{}", serde_json::to_string_pretty(&output)?);
        }
        Commands::Status => {
            let predictor = Predictor::initialise(&config);
            println!("{}", serde_json::to_string_pretty(&predictor.status())?);
        }
        Commands::Catalog { search } => match search {
            Some(term) => {
                let Some(path) = config.catalog_db() else {
                    bail!("searching requires a catalog store (--catalog-db or CDSS_CATALOG_DB)");
                };
                let db = Database::open_read_only(path)
                    .with_context(|| format!("opening catalog store {}", path.display()))?;
                let results = db.search_diseases(&term)?;
                println!("{}", serde_json::to_string_pretty(&results)?);
            }
            None => {
                let predictor = Predictor::initialise(&config);
                let catalog = predictor.catalog();
                let output = serde_json::json!({
                    "version": catalog.version(),
                    "source": catalog.source(),
                    "diseases": catalog.diseases(),
                    "tests": catalog.tests(),
                    "medications": catalog.medications(),
                });
                println!("{}", serde_json::to_string_pretty(&output)?);
            }
        },
    }

    Ok(())
}

/// Flags override environment variables, which override defaults.
fn resolve_config(cli: &Cli) -> anyhow::Result<PredictorConfig> {
    let model_dir = cli
        .model_dir
        .clone()
        .or_else(|| std::env::var("CDSS_MODEL_DIR").ok().map(PathBuf::from))
        .unwrap_or_else(|| PathBuf::from(DEFAULT_MODEL_DIR));
    let model_version = cli
        .model_version
        .clone()
        .or_else(|| std::env::var("CDSS_MODEL_VERSION").ok())
        .unwrap_or_else(|| DEFAULT_MODEL_VERSION.to_string());
    let catalog_db = cli
        .catalog_db
        .clone()
        .or_else(|| std::env::var("CDSS_CATALOG_DB").ok().map(PathBuf::from));

    Ok(PredictorConfig::new(model_dir, model_version, catalog_db)?)
}

fn read_record(input: &str) -> anyhow::Result<PatientRecord> {
    let json = if input == "-" {
        let mut buf = String::new();
        std::io::stdin()
            .read_to_string(&mut buf)
            .context("reading record from stdin")?;
        buf
    } else {
        std::fs::read_to_string(input).with_context(|| format!("reading record {}", input))?
    };

    let record = parse_record(&json)?;
    tracing::debug!(
        symptoms = record.symptom_list.len(),
        history = record.pmh_list.len(),
        "Record accepted"
    );
    Ok(record)
}
