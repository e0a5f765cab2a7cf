// src/main.rs - Command-line driver for the meta-blocking library
use anyhow::{Context, Result};
use blocking_lib::comparison_cleaning::{create_cleaning_method, CleaningMethod};
use blocking_lib::datamodel::{BlockCollection, EntityBlockIndex, EntityProfile};
use blocking_lib::entity_clustering::{ConnectedComponentsClustering, SimilarityPairs};
use blocking_lib::schema_clustering::{AttributeClustering, AttributeSource};
use blocking_lib::tuning::{Tunable, TuningOutcome};
use blocking_lib::utils::config::PipelineConfig;
use blocking_lib::utils::env::load_env;
use blocking_lib::utils::progress::ProgressConfig;
use clap::{Parser, Subcommand};
use log::{info, warn};
use serde::de::DeserializeOwned;
use serde::Serialize;
use std::fs;
use std::path::{Path, PathBuf};
use std::time::Instant;

#[derive(Parser)]
#[command(author, version, about, long_about = None)]
struct Cli {
    #[command(subcommand)]
    command: Command,
}

#[derive(Subcommand)]
enum Command {
    /// Prune the comparisons implied by a JSON block collection
    Clean {
        /// Block collection produced by block building
        #[arg(long)]
        blocks: PathBuf,

        /// Cleaning method (overrides CLEANING_METHOD)
        #[arg(long)]
        method: Option<String>,

        /// Weighting scheme of node-pruning methods (overrides WEIGHTING_SCHEME)
        #[arg(long)]
        scheme: Option<String>,

        /// Apply the n-th grid configuration before cleaning
        #[arg(long, conflicts_with = "random_config")]
        grid_config: Option<usize>,

        /// Apply the n-th reproducible random configuration before cleaning
        #[arg(long)]
        random_config: Option<usize>,

        /// Write the pruned blocks here instead of stdout
        #[arg(long)]
        output: Option<PathBuf>,
    },

    /// Cluster the attributes of one or two profile collections
    Schema {
        #[arg(long)]
        profiles: PathBuf,

        /// Second dataset; enables Clean-Clean ER
        #[arg(long)]
        profiles2: Option<PathBuf>,

        /// name, value or holistic (overrides SCHEMA_ATTRIBUTE_SOURCE)
        #[arg(long)]
        source: Option<String>,

        #[arg(long)]
        grid_config: Option<usize>,

        #[arg(long)]
        output: Option<PathBuf>,
    },

    /// Group scored entity pairs into equivalence clusters
    Cluster {
        #[arg(long)]
        pairs: PathBuf,

        /// Minimum similarity of a retained edge (overrides CLUSTERING_SIMILARITY_THRESHOLD)
        #[arg(long)]
        threshold: Option<f64>,

        #[arg(long)]
        output: Option<PathBuf>,
    },

    /// Print the description and parameters of a method
    Describe {
        /// A cleaning method, an attribute source or "connected-components"
        #[arg(long)]
        method: String,
    },
}

fn main() -> Result<()> {
    env_logger::init();
    load_env();

    let cli = Cli::parse();
    let config = PipelineConfig::from_env();
    config.log_config();
    let progress = ProgressConfig::from_env();
    let start_time = Instant::now();

    match cli.command {
        Command::Clean {
            blocks,
            method,
            scheme,
            grid_config,
            random_config,
            output,
        } => {
            let method = match method {
                Some(method) => method.parse()?,
                None => config.cleaning_method,
            };
            let scheme = match scheme {
                Some(scheme) => scheme.parse()?,
                None => config.weighting_scheme,
            };
            let mut cleaner = create_cleaning_method(method, scheme, config.random_seed);
            apply_tuning(cleaner.as_mut(), grid_config, random_config)?;
            info!("{}", cleaner.method_info());
            info!("Configuration: {}", cleaner.method_configuration());

            let spinner = progress.spinner("Loading blocks...");
            let blocks: BlockCollection = read_json(&blocks)?;
            let index = EntityBlockIndex::from_blocks(&blocks);
            spinner.set_message(format!("Running {}...", cleaner.method_name()));
            let refined = cleaner
                .refine_blocks(&blocks, &index)
                .with_context(|| format!("{} failed", cleaner.method_name()))?;
            spinner.finish_with_message(format!(
                "{} kept {:.0} of {:.0} comparisons",
                cleaner.method_name(),
                refined.total_comparisons(),
                blocks.total_comparisons()
            ));
            write_json(&refined, output.as_deref())?;
        }
        Command::Schema {
            profiles,
            profiles2,
            source,
            grid_config,
            output,
        } => {
            let source: AttributeSource = match source {
                Some(source) => source.parse()?,
                None => config.attribute_source,
            };
            let mut clustering = AttributeClustering::new(
                source,
                config.representation_model,
                config.similarity_metric,
            )
            .with_random_seed(config.random_seed);
            apply_tuning(&mut clustering, grid_config, None)?;
            info!("Configuration: {}", clustering.method_configuration());

            let spinner = progress.spinner("Loading profiles...");
            let d1: Vec<EntityProfile> = read_json(&profiles)?;
            let d2: Option<Vec<EntityProfile>> = profiles2
                .as_deref()
                .map(read_json::<Vec<EntityProfile>>)
                .transpose()?;
            spinner.set_message(format!("Running {}...", clustering.method_name()));
            let clusters = clustering
                .get_clusters(&d1, d2.as_deref())
                .context("Attribute clustering failed")?;
            spinner.finish_with_message(format!(
                "Clustered the attributes of {} dataset(s)",
                clusters.len()
            ));
            write_json(&clusters, output.as_deref())?;
        }
        Command::Cluster {
            pairs,
            threshold,
            output,
        } => {
            let clustering = ConnectedComponentsClustering::new(
                threshold.unwrap_or(config.similarity_threshold),
            );
            let spinner = progress.spinner("Loading similarity pairs...");
            let pairs: SimilarityPairs = read_json(&pairs)?;
            spinner.set_message("Clustering entities...");
            let clusters = clustering.get_duplicates(&pairs)?;
            spinner.finish_with_message(format!("Formed {} clusters", clusters.len()));
            write_json(&clusters, output.as_deref())?;
        }
        Command::Describe { method } => describe(&method, &config)?,
    }

    info!("Finished in {:.2?}", start_time.elapsed());
    Ok(())
}

fn apply_tuning<T: Tunable + ?Sized>(
    method: &mut T,
    grid_config: Option<usize>,
    random_config: Option<usize>,
) -> Result<()> {
    let outcome = match (grid_config, random_config) {
        (Some(iteration), _) => method.set_numbered_grid_configuration(iteration)?,
        (None, Some(iteration)) => method.set_numbered_random_configuration(iteration)?,
        (None, None) => return Ok(()),
    };
    if outcome == TuningOutcome::Unsupported {
        warn!("{} keeps its only configuration", method.method_name());
    }
    Ok(())
}

fn describe(method: &str, config: &PipelineConfig) -> Result<()> {
    if let Ok(cleaning) = method.parse::<CleaningMethod>() {
        let cleaner = create_cleaning_method(cleaning, config.weighting_scheme, config.random_seed);
        return print_description(cleaner.as_ref());
    }
    if let Ok(source) = method.parse::<AttributeSource>() {
        return print_description(&AttributeClustering::new(
            source,
            config.representation_model,
            config.similarity_metric,
        ));
    }
    match method {
        "connected-components" | "ccc" => print_description(&ConnectedComponentsClustering::new(
            config.similarity_threshold,
        )),
        _ => anyhow::bail!("Unknown method '{}'", method),
    }
}

fn print_description<T: Tunable + ?Sized>(method: &T) -> Result<()> {
    println!("{}", method.method_info());
    println!("{}", method.method_parameters());
    println!("Grid configurations: {}", method.number_of_grid_configurations());
    println!(
        "{}",
        serde_json::to_string_pretty(&method.parameter_configuration())?
    );
    Ok(())
}

fn read_json<T: DeserializeOwned>(path: &Path) -> Result<T> {
    let raw = fs::read_to_string(path)
        .with_context(|| format!("Failed to read {}", path.display()))?;
    serde_json::from_str(&raw).with_context(|| format!("Failed to parse {}", path.display()))
}

fn write_json<T: Serialize>(value: &T, output: Option<&Path>) -> Result<()> {
    let json = serde_json::to_string_pretty(value)?;
    match output {
        Some(path) => {
            fs::write(path, json)
                .with_context(|| format!("Failed to write {}", path.display()))?;
            info!("Wrote {}", path.display());
        }
        None => println!("{}", json),
    }
    Ok(())
}
