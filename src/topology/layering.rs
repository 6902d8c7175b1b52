//! Layering trees: a fixed three-level branching structure
//! (1 -> 3 -> 6 -> 1) that splits value out and converges it again.
//!
//! Level 1 receives an even split of the total, each level-1 wallet feeds
//! exactly two level-2 wallets with half its value less `level_fee`, and all
//! six level-2 wallets converge on one aggregator less `aggregation_fee`.

use rand::Rng;

use super::builder::{jittered, InstanceBuilder};
use super::types::{InstanceContext, PatternKind};
use crate::dataset::TransactionRecord;
use crate::error::GenerationError;

/// Wallets on the first fan-out level
pub const LEVEL1_WIDTH: usize = 3;
/// Children fed by each level-1 wallet
pub const BRANCHING: usize = 2;
/// Wallets on the second fan-out level
pub const LEVEL2_WIDTH: usize = LEVEL1_WIDTH * BRANCHING;
/// Distinct wallets one instance needs: source, both levels, aggregator
pub const WALLETS: usize = 1 + LEVEL1_WIDTH + LEVEL2_WIDTH + 1;
/// Records one instance emits
pub const RECORDS: usize = LEVEL1_WIDTH + LEVEL2_WIDTH + LEVEL2_WIDTH;

pub fn generate<R: Rng + ?Sized>(
    ctx: &InstanceContext<'_>,
    rng: &mut R,
) -> Result<Vec<TransactionRecord>, GenerationError> {
    let cfg = &ctx.config.patterns.layering;
    let wallets = ctx.draw(PatternKind::Layering, WALLETS, rng)?;
    let source = &wallets[0];
    let level1 = &wallets[1..1 + LEVEL1_WIDTH];
    let level2 = &wallets[1 + LEVEL1_WIDTH..1 + LEVEL1_WIDTH + LEVEL2_WIDTH];
    let aggregator = &wallets[WALLETS - 1];

    let total = ctx.config.amounts.suspicious.sample(rng);
    let mut builder = InstanceBuilder::new(ctx, PatternKind::Layering, rng);

    let mut level1_values = Vec::with_capacity(LEVEL1_WIDTH);
    for wallet in level1 {
        let amount = jittered(builder.rng(), total / LEVEL1_WIDTH as f64, cfg.split_jitter);
        level1_values.push(builder.hop(&cfg.level1_delay, source, wallet, amount)?);
    }

    builder.pause(&cfg.level_pause);

    let mut level2_values = Vec::with_capacity(LEVEL2_WIDTH);
    for ((parent, value), children) in level1.iter().zip(&level1_values).zip(level2.chunks(BRANCHING)) {
        let amount = value / BRANCHING as f64 * (1.0 - cfg.level_fee);
        for child in children {
            level2_values.push(builder.hop(&cfg.level2_delay, parent, child, amount)?);
        }
    }

    builder.pause(&cfg.level_pause);

    for (wallet, value) in level2.iter().zip(level2_values) {
        builder.hop(&cfg.aggregation_delay, wallet, aggregator, value * (1.0 - cfg.aggregation_fee))?;
    }

    Ok(builder.finish())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::topology::test_support::{assert_instance_invariants, fixture};
    use std::collections::{HashMap, HashSet};

    #[test]
    fn test_tree_shape() {
        let (config, pool, mut rng) = fixture(30, 5);
        let ctx = InstanceContext::new(&pool, &config, 0, config.general.start);
        let records = generate(&ctx, &mut rng).unwrap();
        assert_eq!(records.len(), RECORDS);
        assert_eq!(RECORDS, 15);
        assert_instance_invariants(&records);

        let (level1, rest) = records.split_at(LEVEL1_WIDTH);
        let (level2, level3) = rest.split_at(LEVEL2_WIDTH);

        let source = &level1[0].source;
        assert!(level1.iter().all(|r| &r.source == source));

        let level1_wallets: HashSet<_> = level1.iter().map(|r| &r.destination).collect();
        let mut fan: HashMap<_, usize> = HashMap::new();
        for r in level2 {
            assert!(level1_wallets.contains(&r.source));
            *fan.entry(&r.source).or_default() += 1;
        }
        assert!(fan.values().all(|&n| n == BRANCHING));

        let aggregator = &level3[0].destination;
        assert!(level3.iter().all(|r| &r.destination == aggregator));
        let level2_wallets: HashSet<_> = level2.iter().map(|r| &r.destination).collect();
        let level3_sources: HashSet<_> = level3.iter().map(|r| &r.source).collect();
        assert_eq!(level2_wallets, level3_sources);

        // strict level ordering in time
        let last1 = level1.iter().map(|r| r.timestamp).max().unwrap();
        let first2 = level2.iter().map(|r| r.timestamp).min().unwrap();
        let last2 = level2.iter().map(|r| r.timestamp).max().unwrap();
        let first3 = level3.iter().map(|r| r.timestamp).min().unwrap();
        assert!(last1 < first2);
        assert!(last2 < first3);
    }

    #[test]
    fn test_value_shrinks_per_level() {
        let (config, pool, mut rng) = fixture(30, 8);
        for id in 0..50 {
            let ctx = InstanceContext::new(&pool, &config, id, config.general.start);
            let records = generate(&ctx, &mut rng).unwrap();
            let sum = |rs: &[TransactionRecord]| rs.iter().map(|r| r.amount).sum::<f64>();
            let l1 = sum(&records[..3]);
            let l2 = sum(&records[3..9]);
            let l3 = sum(&records[9..]);
            assert!((l2 - l1 * 0.95).abs() < 1e-4);
            assert!((l3 - l2 * 0.90).abs() < 1e-4);
        }
    }

    #[test]
    fn test_small_pool_rejected() {
        let (config, pool, mut rng) = fixture(5, 2);
        let ctx = InstanceContext::new(&pool, &config, 0, config.general.start);
        match generate(&ctx, &mut rng) {
            Err(GenerationError::InsufficientWallets { pattern, required, available }) => {
                assert_eq!(pattern, PatternKind::Layering);
                assert_eq!(required, WALLETS);
                assert_eq!(available, 5);
            }
            other => panic!("expected insufficient wallets, got {:?}", other),
        }
    }
}
