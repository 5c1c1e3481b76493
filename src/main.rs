use anyhow::Context;
use clap::{Parser, Subcommand};
use smartliving::{
    bootstrap, fit_and_save, source_for_path, ArtifactStore, BlendWeights, Catalog, Preferences,
    PropertyId, RecommenderConfig,
};
use std::path::PathBuf;
use tracing::info;
use tracing_subscriber::{EnvFilter, FmtSubscriber};

/// Hybrid real-estate recommender
#[derive(Parser, Debug)]
#[command(name = "smartliving")]
#[command(about = "Recommend properties by similarity, smart living score and affordability", long_about = None)]
struct Args {
    /// Property catalog (CSV, JSON or JSON Lines)
    #[arg(short, long, env = "SMARTLIVING_CATALOG")]
    catalog: PathBuf,

    /// Directory holding the fitted artifacts
    #[arg(short, long, env = "SMARTLIVING_ARTIFACT_DIR", default_value = "./models")]
    artifact_dir: PathBuf,

    /// Log level, used when RUST_LOG is unset
    #[arg(long, default_value = "info")]
    log_level: String,

    /// Number of results
    #[arg(short = 'n', long, default_value_t = smartliving_ranking::DEFAULT_TOP_N)]
    top_n: usize,

    /// Neighbors retrieved before filtering
    #[arg(long, default_value_t = smartliving_ranking::DEFAULT_CANDIDATE_POOL)]
    candidate_pool: usize,

    /// Weight of the similarity component
    #[arg(long)]
    w_sim: Option<f64>,

    /// Weight of the smart living component
    #[arg(long)]
    w_smart: Option<f64>,

    /// Weight of the affordability component
    #[arg(long)]
    w_aff: Option<f64>,

    #[command(subcommand)]
    command: Command,
}

#[derive(Subcommand, Debug)]
enum Command {
    /// Fit on the catalog and save artifacts, replacing any saved ones
    Fit,
    /// Recommend from a preferences JSON object, inline or as @path
    Recommend { preferences: String },
    /// Recommend properties similar to a catalog property
    Similar {
        #[arg(long)]
        id: PropertyId,
    },
}

impl Args {
    fn config(&self) -> RecommenderConfig {
        let defaults = BlendWeights::default();
        let weights = BlendWeights::new(
            self.w_sim.unwrap_or(defaults.similarity),
            self.w_smart.unwrap_or(defaults.smart),
            self.w_aff.unwrap_or(defaults.affordability),
        );
        RecommenderConfig {
            candidate_pool: self.candidate_pool,
            default_weights: weights,
            default_top_n: self.top_n,
        }
    }
}

fn main() -> anyhow::Result<()> {
    let args = Args::parse();

    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(&args.log_level));
    let subscriber = FmtSubscriber::builder()
        .with_env_filter(filter)
        .with_writer(std::io::stderr)
        .finish();
    tracing::subscriber::set_global_default(subscriber)?;

    info!("Starting SmartLiving v{}", env!("CARGO_PKG_VERSION"));
    info!("Catalog: {:?}", args.catalog);
    info!("Artifact directory: {:?}", args.artifact_dir);

    let config = args.config();
    config.default_weights.validate()?;
    let source = source_for_path(&args.catalog)?;
    let store = ArtifactStore::new(&args.artifact_dir);

    match &args.command {
        Command::Fit => {
            let catalog = Catalog::load(source.as_ref())?;
            let recommender = fit_and_save(catalog, &store, config)?;
            println!(
                "{}",
                serde_json::json!({
                    "properties": recommender.catalog().len(),
                    "features": recommender.index().dim(),
                    "artifact_dir": store.dir(),
                })
            );
        }
        Command::Recommend { preferences } => {
            let prefs = parse_preferences(preferences)?;
            let service = bootstrap(source.as_ref(), &store, config)?;
            let response = service.preference_response(&prefs, config.default_top_n, &config.default_weights)?;
            println!("{}", serde_json::to_string_pretty(&response)?);
        }
        Command::Similar { id } => {
            let service = bootstrap(source.as_ref(), &store, config)?;
            let response = service.similar_response(*id, config.default_top_n, &config.default_weights)?;
            println!("{}", serde_json::to_string_pretty(&response)?);
        }
    }

    Ok(())
}

fn parse_preferences(arg: &str) -> anyhow::Result<Preferences> {
    let text = match arg.strip_prefix('@') {
        Some(path) => std::fs::read_to_string(path)
            .with_context(|| format!("reading preferences from {}", path))?,
        None => arg.to_string(),
    };
    let value: serde_json::Value =
        serde_json::from_str(&text).context("preferences are not valid JSON")?;
    Ok(Preferences::from_value(&value)?)
}
