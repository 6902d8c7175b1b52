//! Run summaries.
//!
//! Generates both a JSON summary and a human-readable text report.

use std::collections::{BTreeMap, HashSet};
use std::fs;
use std::path::Path;

use chrono::NaiveDateTime;
use color_eyre::eyre::{Context, Result};
use serde::{Deserialize, Serialize};

use crate::dataset::Dataset;
use crate::topology::PatternKind;

/// Headline numbers of one generated dataset
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct DatasetSummary {
    /// Profile or config name the dataset was built from
    pub name: String,
    pub seed: u64,
    pub total_transactions: usize,
    pub suspicious_transactions: usize,
    pub normal_transactions: usize,
    /// Suspicious share of all records, in percent
    pub suspicious_percent: f64,
    /// Size of the wallet pool
    pub wallet_pool: usize,
    /// Wallets that appear in at least one record
    pub active_wallets: usize,
    pub total_instances: usize,
    pub records_per_pattern: BTreeMap<PatternKind, usize>,
    pub instances_per_pattern: BTreeMap<PatternKind, usize>,
    pub first_timestamp: Option<NaiveDateTime>,
    pub last_timestamp: Option<NaiveDateTime>,
}

impl DatasetSummary {
    pub fn from_dataset(name: &str, dataset: &Dataset) -> Self {
        let total = dataset.len();
        let suspicious = dataset.suspicious_count();

        let mut active = HashSet::new();
        for record in dataset.records() {
            active.insert(&record.source);
            active.insert(&record.destination);
        }

        Self {
            name: name.to_string(),
            seed: dataset.seed(),
            total_transactions: total,
            suspicious_transactions: suspicious,
            normal_transactions: total - suspicious,
            suspicious_percent: if total == 0 {
                0.0
            } else {
                suspicious as f64 / total as f64 * 100.0
            },
            wallet_pool: dataset.wallet_count(),
            active_wallets: active.len(),
            total_instances: dataset.total_instances(),
            records_per_pattern: dataset.pattern_counts(),
            instances_per_pattern: dataset.instances().clone(),
            first_timestamp: dataset.first_timestamp(),
            last_timestamp: dataset.last_timestamp(),
        }
    }
}

/// Write the summary as pretty-printed JSON
pub fn write_summary_json(summary: &DatasetSummary, output_path: &Path) -> Result<()> {
    let json = serde_json::to_string_pretty(summary).context("Failed to serialize summary to JSON")?;

    fs::write(output_path, json)
        .with_context(|| format!("Failed to write JSON summary to {}", output_path.display()))?;

    log::info!("JSON summary written to {}", output_path.display());
    Ok(())
}

/// Render the text report
pub fn render_text_report(summary: &DatasetSummary) -> String {
    let mut lines: Vec<String> = Vec::new();

    // Header
    lines.push("=".repeat(80));
    lines.push("                    SYNTHETIC AML TRANSACTION DATASET".to_string());
    lines.push("=".repeat(80));
    lines.push(String::new());

    lines.push(format!("Dataset: {}", summary.name));
    lines.push(format!("Seed: {}", summary.seed));
    lines.push(format!("Total transactions: {}", summary.total_transactions));
    lines.push(format!(
        "Suspicious transactions: {} ({:.1}%)",
        summary.suspicious_transactions, summary.suspicious_percent
    ));
    lines.push(format!(
        "Normal transactions: {} ({:.1}%)",
        summary.normal_transactions,
        100.0 - summary.suspicious_percent
    ));
    lines.push(format!(
        "Wallets: {} in pool, {} active",
        summary.wallet_pool, summary.active_wallets
    ));
    if let (Some(first), Some(last)) = (summary.first_timestamp, summary.last_timestamp) {
        lines.push(format!("Date range: {} to {}", first.date(), last.date()));
    }
    lines.push(String::new());

    if summary.total_instances > 0 {
        lines.push("=".repeat(80));
        lines.push("                           PATTERN BREAKDOWN".to_string());
        lines.push("=".repeat(80));
        lines.push(String::new());
        lines.push(format!("{:<18} {:>10} {:>10}", "Pattern", "Instances", "Records"));
        lines.push("-".repeat(40));
        for kind in PatternKind::SUSPICIOUS {
            let instances = summary.instances_per_pattern.get(&kind).copied().unwrap_or(0);
            if instances == 0 {
                continue;
            }
            let records = summary.records_per_pattern.get(&kind).copied().unwrap_or(0);
            lines.push(format!("{:<18} {:>10} {:>10}", kind.as_str(), instances, records));
        }
        lines.push("-".repeat(40));
        lines.push(format!(
            "{:<18} {:>10} {:>10}",
            "total", summary.total_instances, summary.suspicious_transactions
        ));
        lines.push(String::new());
    }

    lines.push("=".repeat(80));
    lines.join("\n")
}

/// Write the text report to `output_path`
pub fn generate_text_report(summary: &DatasetSummary, output_path: &Path) -> Result<()> {
    fs::write(output_path, render_text_report(summary))
        .with_context(|| format!("Failed to write text report to {}", output_path.display()))?;

    log::info!("Text report written to {}", output_path.display());
    Ok(())
}

/// Print a short summary to stdout
pub fn print_summary(summary: &DatasetSummary) {
    println!("\n=== DATASET SUMMARY: {} ===\n", summary.name);
    println!("Transactions: {}", summary.total_transactions);
    println!(
        "  Suspicious: {} ({:.1}%)",
        summary.suspicious_transactions, summary.suspicious_percent
    );
    println!("  Normal: {}", summary.normal_transactions);
    println!("Instances: {}", summary.total_instances);
    println!("Active wallets: {}/{}", summary.active_wallets, summary.wallet_pool);
    println!();
}
