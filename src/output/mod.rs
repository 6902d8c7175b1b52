//! Dataset writers.
//!
//! Generation never touches the filesystem; everything here takes a finished
//! [`Dataset`] and persists it as CSV, JSON or a compressed binary snapshot,
//! plus a run summary.

pub mod report;
pub mod snapshot;
pub mod table;

use std::fs::{self, File};
use std::io::{BufWriter, Write};
use std::path::Path;

use clap::ValueEnum;
use color_eyre::eyre::{Context, Result};

use crate::dataset::Dataset;

pub use report::{generate_text_report, print_summary, write_summary_json, DatasetSummary};
pub use snapshot::{read_snapshot, write_snapshot};
pub use table::{read_csv, write_csv};

/// On-disk format of the record listing
#[derive(Debug, Clone, Copy, PartialEq, Eq, ValueEnum)]
pub enum OutputFormat {
    Csv,
    Json,
    /// bincode encoded, zstd compressed
    #[value(name = "bin")]
    Binary,
}

impl OutputFormat {
    pub fn extension(&self) -> &'static str {
        match self {
            OutputFormat::Csv => "csv",
            OutputFormat::Json => "json",
            OutputFormat::Binary => "bin.zst",
        }
    }
}

/// Column set written for CSV output
#[derive(Debug, Clone, Copy, PartialEq, Eq, ValueEnum)]
pub enum CsvLayout {
    /// `Source_wallet,Dest_wallet,timestamp,amount,token_type`, no labels
    Basic,
    /// Every record field, labels included
    Extended,
}

/// Write `dataset` to `path` in the requested format, creating parent
/// directories as needed
pub fn write_dataset(dataset: &Dataset, path: &Path, format: OutputFormat, layout: CsvLayout) -> Result<()> {
    if let Some(parent) = path.parent().filter(|p| !p.as_os_str().is_empty()) {
        fs::create_dir_all(parent)
            .with_context(|| format!("Failed to create output directory: {}", parent.display()))?;
    }

    match format {
        OutputFormat::Csv => write_csv(dataset, path, layout)?,
        OutputFormat::Json => write_json(dataset, path)?,
        OutputFormat::Binary => write_snapshot(dataset, path)?,
    }

    log::info!("Wrote {} records to {}", dataset.len(), path.display());
    Ok(())
}

/// Write the records as a JSON array
pub fn write_json(dataset: &Dataset, path: &Path) -> Result<()> {
    let file = File::create(path).with_context(|| format!("Failed to create {}", path.display()))?;
    let mut writer = BufWriter::new(file);
    serde_json::to_writer(&mut writer, dataset.records())
        .with_context(|| format!("Failed to write JSON records to {}", path.display()))?;
    writer
        .flush()
        .with_context(|| format!("Failed to flush {}", path.display()))?;
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::Config;
    use crate::dataset::{assemble, TransactionRecord};
    use clap::ValueEnum;
    use tempfile::TempDir;

    fn small_dataset() -> Dataset {
        let mut config = Config::default();
        config.general.seed = Some(11);
        config.general.wallet_count = 60;
        config.general.target_transactions = 1200;
        assemble(&config).unwrap()
    }

    #[test]
    fn test_json_output_parses_back() {
        let dataset = small_dataset();
        let dir = TempDir::new().unwrap();
        let path = dir.path().join("nested/out.json");

        write_dataset(&dataset, &path, OutputFormat::Json, CsvLayout::Basic).unwrap();
        let content = fs::read_to_string(&path).unwrap();
        let records: Vec<TransactionRecord> = serde_json::from_str(&content).unwrap();
        assert_eq!(records.len(), dataset.len());
        for (read, written) in records.iter().zip(dataset.records()) {
            assert_eq!(read.tx_hash, written.tx_hash);
            assert_eq!(read.timestamp, written.timestamp);
            assert_eq!(read.pattern, written.pattern);
            assert!((read.amount - written.amount).abs() < 1e-9);
        }
    }

    #[test]
    fn test_format_extensions() {
        assert_eq!(OutputFormat::Csv.extension(), "csv");
        assert_eq!(OutputFormat::Binary.extension(), "bin.zst");
        assert_eq!(OutputFormat::from_str("bin", true).unwrap(), OutputFormat::Binary);
    }
}
