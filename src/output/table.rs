//! CSV output through the `csv` crate.

use std::path::Path;

use color_eyre::eyre::{Context, Result};
use csv::{ReaderBuilder, WriterBuilder};
use serde::Serialize;

use super::CsvLayout;
use crate::dataset::{Dataset, TransactionRecord};

const TIMESTAMP_FORMAT: &str = "%Y-%m-%dT%H:%M:%S";

/// Unlabelled five-column row, the shape detection tooling consumes
#[derive(Serialize)]
struct BasicRow<'a> {
    #[serde(rename = "Source_wallet")]
    source: &'a str,
    #[serde(rename = "Dest_wallet")]
    destination: &'a str,
    timestamp: String,
    amount: f64,
    token_type: &'a str,
}

impl<'a> From<&'a TransactionRecord> for BasicRow<'a> {
    fn from(record: &'a TransactionRecord) -> Self {
        Self {
            source: record.source.as_str(),
            destination: record.destination.as_str(),
            timestamp: record.timestamp.format(TIMESTAMP_FORMAT).to_string(),
            amount: record.amount,
            token_type: &record.token,
        }
    }
}

/// Write the dataset as CSV with a header row
pub fn write_csv(dataset: &Dataset, path: &Path, layout: CsvLayout) -> Result<()> {
    let mut writer = WriterBuilder::new()
        .has_headers(true)
        .from_path(path)
        .with_context(|| format!("Failed to create CSV file: {}", path.display()))?;

    for record in dataset.records() {
        let written = match layout {
            CsvLayout::Basic => writer.serialize(BasicRow::from(record)),
            CsvLayout::Extended => writer.serialize(record),
        };
        written.with_context(|| format!("Failed to write record {}", record.tx_hash))?;
    }

    writer
        .flush()
        .with_context(|| format!("Failed to flush CSV file: {}", path.display()))?;
    Ok(())
}

/// Read back a CSV file written with [`CsvLayout::Extended`]
pub fn read_csv(path: &Path) -> Result<Vec<TransactionRecord>> {
    let mut reader = ReaderBuilder::new()
        .has_headers(true)
        .from_path(path)
        .with_context(|| format!("Failed to open CSV file: {}", path.display()))?;

    let mut records = Vec::new();
    for (line, row) in reader.deserialize().enumerate() {
        let record: TransactionRecord =
            row.with_context(|| format!("Malformed record on line {} of {}", line + 2, path.display()))?;
        records.push(record);
    }
    Ok(records)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::Config;
    use crate::dataset::assemble;
    use crate::topology::PatternKind;
    use std::fs;
    use tempfile::TempDir;

    fn dataset() -> Dataset {
        let mut config = Config::default();
        config.general.seed = Some(23);
        config.general.wallet_count = 80;
        config.general.target_transactions = 800;
        assemble(&config).unwrap()
    }

    #[test]
    fn test_basic_layout_columns() {
        let dataset = dataset();
        let dir = TempDir::new().unwrap();
        let path = dir.path().join("basic.csv");
        write_csv(&dataset, &path, CsvLayout::Basic).unwrap();

        let content = fs::read_to_string(&path).unwrap();
        let mut lines = content.lines();
        assert_eq!(lines.next(), Some("Source_wallet,Dest_wallet,timestamp,amount,token_type"));

        let first = lines.next().unwrap();
        let fields: Vec<&str> = first.split(',').collect();
        assert_eq!(fields.len(), 5);
        assert_eq!(fields[0], dataset.records()[0].source.as_str());
        assert_eq!(
            fields[2],
            dataset.records()[0].timestamp.format(TIMESTAMP_FORMAT).to_string()
        );
        assert_eq!(content.lines().count(), dataset.len() + 1);
    }

    #[test]
    fn test_extended_layout_reads_back() {
        let dataset = dataset();
        let dir = TempDir::new().unwrap();
        let path = dir.path().join("extended.csv");
        write_csv(&dataset, &path, CsvLayout::Extended).unwrap();

        let records = read_csv(&path).unwrap();
        assert_eq!(records.len(), dataset.len());
        for (read, written) in records.iter().zip(dataset.records()) {
            assert_eq!(read.tx_hash, written.tx_hash);
            assert_eq!(read.source, written.source);
            assert_eq!(read.timestamp, written.timestamp);
            assert_eq!(read.pattern, written.pattern);
            assert_eq!(read.instance_id, written.instance_id);
        }
        assert!(records.iter().any(|r| r.pattern == PatternKind::Normal && r.instance_id.is_none()));
        assert!(records.iter().any(|r| r.pattern.is_suspicious() && r.instance_id.is_some()));
    }

    #[test]
    fn test_missing_file_reports_path() {
        let err = read_csv(Path::new("/nonexistent/records.csv")).unwrap_err();
        assert!(format!("{:?}", err).contains("/nonexistent/records.csv"));
    }
}
