//! Transaction records and the assembled dataset.

use chrono::NaiveDateTime;
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;

use crate::topology::PatternKind;
use crate::wallet::Wallet;

/// One labelled transfer
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct TransactionRecord {
    pub tx_hash: String,
    pub source: Wallet,
    pub destination: Wallet,
    pub timestamp: NaiveDateTime,
    /// Token units, rounded to 6 decimals
    pub amount: f64,
    pub token: String,
    /// Rounded to 4 decimals
    pub gas_fee: f64,
    pub pattern: PatternKind,
    /// Topology instance that produced the record; `None` for background noise
    pub instance_id: Option<u32>,
}

impl TransactionRecord {
    pub fn is_suspicious(&self) -> bool {
        self.pattern.is_suspicious()
    }
}

/// The full, timestamp-ordered output of one generation run.
///
/// Read-only once assembled; restore a saved one with
/// [`read_snapshot`](crate::output::snapshot::read_snapshot).
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Dataset {
    seed: u64,
    wallet_count: usize,
    instances: BTreeMap<PatternKind, usize>,
    records: Vec<TransactionRecord>,
}

impl Dataset {
    pub(crate) fn new(
        seed: u64,
        wallet_count: usize,
        instances: BTreeMap<PatternKind, usize>,
        records: Vec<TransactionRecord>,
    ) -> Self {
        Self {
            seed,
            wallet_count,
            instances,
            records,
        }
    }

    pub(crate) fn with_seed(mut self, seed: u64) -> Self {
        self.seed = seed;
        self
    }

    /// Seed the run was generated from; rerunning with it reproduces the dataset
    pub fn seed(&self) -> u64 {
        self.seed
    }

    pub fn wallet_count(&self) -> usize {
        self.wallet_count
    }

    /// Instances generated per suspicious kind
    pub fn instances(&self) -> &BTreeMap<PatternKind, usize> {
        &self.instances
    }

    /// Records in timestamp order
    pub fn records(&self) -> &[TransactionRecord] {
        &self.records
    }

    pub fn len(&self) -> usize {
        self.records.len()
    }

    pub fn is_empty(&self) -> bool {
        self.records.is_empty()
    }

    pub fn suspicious_count(&self) -> usize {
        self.records.iter().filter(|r| r.is_suspicious()).count()
    }

    pub fn normal_count(&self) -> usize {
        self.len() - self.suspicious_count()
    }

    /// Records of one topology instance, in generation order
    pub fn instance_records(&self, instance_id: u32) -> Vec<&TransactionRecord> {
        self.records
            .iter()
            .filter(|r| r.instance_id == Some(instance_id))
            .collect()
    }

    /// Record counts keyed by pattern kind, background included
    pub fn pattern_counts(&self) -> BTreeMap<PatternKind, usize> {
        let mut counts = BTreeMap::new();
        for record in &self.records {
            *counts.entry(record.pattern).or_insert(0) += 1;
        }
        counts
    }

    pub fn total_instances(&self) -> usize {
        self.instances.values().sum()
    }

    pub fn first_timestamp(&self) -> Option<NaiveDateTime> {
        self.records.first().map(|r| r.timestamp)
    }

    pub fn last_timestamp(&self) -> Option<NaiveDateTime> {
        self.records.last().map(|r| r.timestamp)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_accessors_expose_assembled_state() {
        let mut instances = BTreeMap::new();
        instances.insert(PatternKind::PeelChain, 2);
        let dataset = Dataset::new(0, 40, instances, Vec::new()).with_seed(9);

        assert_eq!(dataset.seed(), 9);
        assert_eq!(dataset.wallet_count(), 40);
        assert_eq!(dataset.instances().get(&PatternKind::PeelChain), Some(&2));
        assert_eq!(dataset.total_instances(), 2);
        assert!(dataset.records().is_empty());
        assert!(dataset.first_timestamp().is_none());
    }
}
