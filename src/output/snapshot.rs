//! Compressed binary snapshots: bincode, then zstd.

use std::fs;
use std::path::Path;

use color_eyre::eyre::{Context, Result};

use crate::dataset::Dataset;

const COMPRESSION_LEVEL: i32 = 3;

/// Persist the whole dataset, summary counts and seed included
pub fn write_snapshot(dataset: &Dataset, path: &Path) -> Result<()> {
    let encoded = bincode::serialize(dataset).context("Failed to encode dataset snapshot")?;
    let compressed =
        zstd::encode_all(encoded.as_slice(), COMPRESSION_LEVEL).context("Failed to compress dataset snapshot")?;

    fs::write(path, &compressed).with_context(|| format!("Failed to write snapshot to {}", path.display()))?;
    log::debug!(
        "Snapshot {}: {} bytes encoded, {} bytes compressed",
        path.display(),
        encoded.len(),
        compressed.len()
    );
    Ok(())
}

pub fn read_snapshot(path: &Path) -> Result<Dataset> {
    let compressed = fs::read(path).with_context(|| format!("Failed to read snapshot {}", path.display()))?;
    let encoded = zstd::decode_all(compressed.as_slice()).context("Failed to decompress dataset snapshot")?;
    let dataset = bincode::deserialize(&encoded).context("Failed to decode dataset snapshot")?;
    Ok(dataset)
}
