//! # aml-datagen - Synthetic AML transaction dataset generator
//!
//! This library generates labelled blockchain-style transaction datasets for
//! benchmarking anti-money-laundering detection. Known laundering
//! topologies are embedded in a larger volume of random peer-to-peer noise,
//! and every record carries its ground-truth label.
//!
//! ## Key Features
//!
//! - **Seven Laundering Topologies**: fan-out/fan-in chains, circular loops,
//!   layering trees, structuring bursts, pass-through relays, peel chains and
//!   mixer round-trips
//! - **Ground Truth**: every record is tagged with its pattern kind and the
//!   topology instance that produced it
//! - **Reproducible**: a single seed determines the whole dataset, regardless
//!   of how many threads generate it
//! - **Built-in Profiles**: five ready-made network scenarios
//!
//! ## Architecture
//!
//! - `config`: Type-safe configuration structures and validation
//! - `config_loader`: YAML loading and CLI overrides
//! - `wallet`: Wallet identifiers and the per-run wallet pool
//! - `topology`: One generator per laundering pattern
//! - `background`: Random peer-to-peer noise
//! - `dataset`: Instance planning, parallel generation and merging
//! - `output`: CSV, JSON and binary writers plus run summaries
//! - `profiles`: Built-in dataset scenarios
//!
//! ## Example Usage
//!
//! ```rust,no_run
//! use aml_datagen::{config_loader, dataset, output};
//! use std::path::Path;
//!
//! let config = config_loader::load_config(Path::new("config.yaml"))?;
//! let dataset = dataset::assemble(&config)?;
//!
//! output::write_dataset(
//!     &dataset,
//!     Path::new("synthetic_transactions.csv"),
//!     output::OutputFormat::Csv,
//!     output::CsvLayout::Basic,
//! )?;
//! # Ok::<(), color_eyre::eyre::Error>(())
//! ```
//!
//! ## Configuration Format
//!
//! Every section is optional and falls back to defaults:
//!
//! ```yaml
//! general:
//!   seed: 42
//!   wallet_count: 500
//!   target_transactions: 10000
//!   start: "2024-01-01T00:00:00"
//!   end: "2024-12-31T00:00:00"
//!
//! patterns:
//!   fan_out_fan_in:
//!     count: 15
//!     intermediaries: { min: 4, max: 8 }
//!     hop_delay: { min: "5s", max: "5m" }
//!   mixer:
//!     count: 2
//!     mixing_delay: { min: "10m", max: "30m" }
//! ```
//!
//! ## Error Handling
//!
//! Generation returns [`error::GenerationError`]; file handling and the
//! binary use `color_eyre` for error reporting with context.

pub mod background;
pub mod config;
pub mod config_loader;
pub mod dataset;
pub mod error;
pub mod output;
pub mod profiles;
pub mod topology;
pub mod wallet;

pub use config::Config;
pub use dataset::{assemble, Dataset, TransactionRecord};
pub use error::GenerationError;
