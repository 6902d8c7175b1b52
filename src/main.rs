//! Command-line front end for the synthetic AML dataset generator.

use std::fs;
use std::path::{Path, PathBuf};

use clap::{Parser, Subcommand};
use color_eyre::eyre::{eyre, Context, Result};
use env_logger::Env;
use log::info;

use aml_datagen::config::Config;
use aml_datagen::config_loader::{self, CliOverrides};
use aml_datagen::dataset;
use aml_datagen::output::{self, CsvLayout, DatasetSummary, OutputFormat};
use aml_datagen::profiles;

#[derive(Parser, Debug)]
#[command(name = "aml-datagen")]
#[command(about = "Synthetic blockchain transaction datasets with labelled laundering patterns")]
#[command(version)]
struct Cli {
    #[command(subcommand)]
    command: Commands,

    /// Log level (trace, debug, info, warn, error)
    #[arg(long, default_value = "info", global = true)]
    log_level: String,

    /// Number of parallel workers (0 = auto-detect)
    #[arg(short = 'j', long, default_value = "0", global = true)]
    threads: usize,
}

#[derive(Subcommand, Debug)]
enum Commands {
    /// Generate one dataset from a configuration file
    Generate {
        /// Path to the generator configuration YAML file (defaults when omitted)
        #[arg(short, long)]
        config: Option<PathBuf>,

        /// Output file for the records
        #[arg(short, long)]
        output: Option<PathBuf>,

        #[arg(short, long, value_enum, default_value = "csv")]
        format: OutputFormat,

        /// CSV column set
        #[arg(long, value_enum, default_value = "basic")]
        layout: CsvLayout,

        /// Override the configured seed
        #[arg(long)]
        seed: Option<u64>,

        /// Override the target number of transactions
        #[arg(long)]
        target: Option<usize>,

        /// Override the wallet pool size
        #[arg(long)]
        wallets: Option<usize>,
    },

    /// Generate every built-in profile
    Profiles {
        /// Directory receiving one dataset per profile
        #[arg(short, long, default_value = "datasets")]
        output_dir: PathBuf,

        /// Only generate the named profile
        #[arg(long)]
        only: Option<String>,

        /// Seed shared by all profiles
        #[arg(long)]
        seed: Option<u64>,

        #[arg(short, long, value_enum, default_value = "csv")]
        format: OutputFormat,

        /// CSV column set
        #[arg(long, value_enum, default_value = "extended")]
        layout: CsvLayout,
    },

    /// List the built-in profiles
    ListProfiles,
}

fn main() -> Result<()> {
    color_eyre::install()?;
    let cli = Cli::parse();

    // Initialize logging
    env_logger::Builder::from_env(Env::default().default_filter_or(&cli.log_level)).init();

    // Set thread pool size
    if cli.threads > 0 {
        rayon::ThreadPoolBuilder::new()
            .num_threads(cli.threads)
            .build_global()
            .context("Failed to configure thread pool")?;
    }

    match cli.command {
        Commands::Generate {
            config,
            output,
            format,
            layout,
            seed,
            target,
            wallets,
        } => {
            let mut resolved = match &config {
                Some(path) => config_loader::load_config(path)?,
                None => {
                    info!("No configuration file given, using defaults");
                    Config::default()
                }
            };
            config_loader::apply_overrides(&mut resolved, &CliOverrides { seed, target, wallets })?;

            let output = output
                .unwrap_or_else(|| PathBuf::from(format!("synthetic_transactions.{}", format.extension())));
            let name = dataset_name(&output);
            generate_one(&name, &resolved, &output, format, layout)?;
        }
        Commands::Profiles {
            output_dir,
            only,
            seed,
            format,
            layout,
        } => {
            let selected: Vec<&profiles::Profile> = match &only {
                Some(name) => {
                    vec![profiles::find(name).ok_or_else(|| eyre!("Unknown profile: {}", name))?]
                }
                None => profiles::all().iter().collect(),
            };

            fs::create_dir_all(&output_dir)
                .with_context(|| format!("Failed to create output directory: {}", output_dir.display()))?;

            for profile in selected {
                info!("Generating profile {} ({})", profile.name, profile.project_name);
                let config = profile.to_config(seed)?;
                let path = output_dir.join(format!("{}.{}", profile.name, format.extension()));
                generate_one(profile.name, &config, &path, format, layout)?;
            }
        }
        Commands::ListProfiles => {
            for (i, profile) in profiles::all().iter().enumerate() {
                println!("{}. {}", i + 1, profile.name);
                println!("   Project: {}", profile.project_name);
                println!("   {}", profile.description);
                println!(
                    "   Config: {} wallets, {} background transactions",
                    profile.wallet_count, profile.normal_transactions
                );
                println!();
            }
        }
    }

    Ok(())
}

/// Assemble one dataset and write it with its resolved config and reports
fn generate_one(name: &str, config: &Config, path: &Path, format: OutputFormat, layout: CsvLayout) -> Result<()> {
    let dataset = dataset::assemble(config).with_context(|| format!("Failed to generate dataset {}", name))?;
    output::write_dataset(&dataset, path, format, layout)?;

    // Pin the seed actually used so the run can be repeated
    let mut resolved = config.clone();
    resolved.general.seed = Some(dataset.seed());
    config_loader::write_config(&resolved, &sibling(path, "config.yaml"))?;

    let summary = DatasetSummary::from_dataset(name, &dataset);
    output::write_summary_json(&summary, &sibling(path, "summary.json"))?;
    output::generate_text_report(&summary, &sibling(path, "report.txt"))?;
    output::print_summary(&summary);
    Ok(())
}

/// File stem of a dataset path, ignoring compound extensions like `.bin.zst`
fn dataset_name(path: &Path) -> String {
    let file_name = path.file_name().map(|n| n.to_string_lossy().into_owned()).unwrap_or_default();
    match file_name.split_once('.') {
        Some((stem, _)) if !stem.is_empty() => stem.to_string(),
        _ if !file_name.is_empty() => file_name,
        _ => "dataset".to_string(),
    }
}

/// `<dir>/<name>_<suffix>` next to the dataset file
fn sibling(path: &Path, suffix: &str) -> PathBuf {
    path.with_file_name(format!("{}_{}", dataset_name(path), suffix))
}
