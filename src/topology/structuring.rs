//! Structuring (smurfing) bursts: one source issues many deposits that each
//! stay below a reporting threshold. Value is dispersed, never re-collected.

use rand::Rng;

use super::builder::{floor_units, from_units, InstanceBuilder};
use super::types::{InstanceContext, PatternKind};
use crate::dataset::TransactionRecord;
use crate::error::GenerationError;

pub fn generate<R: Rng + ?Sized>(
    ctx: &InstanceContext<'_>,
    rng: &mut R,
) -> Result<Vec<TransactionRecord>, GenerationError> {
    let cfg = &ctx.config.patterns.structuring;
    let count = cfg.destinations.sample(rng);
    let wallets = ctx.draw(PatternKind::Structuring, count + 1, rng)?;
    let source = &wallets[0];

    let mut builder = InstanceBuilder::new(ctx, PatternKind::Structuring, rng);
    for destination in &wallets[1..] {
        // truncate so rounding can never lift an amount onto the threshold
        let amount = from_units(floor_units(cfg.amount.sample(builder.rng())));
        builder.hop(&cfg.hop_delay, source, destination, amount)?;
    }

    Ok(builder.finish())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::topology::test_support::{assert_instance_invariants, fixture};
    use std::collections::HashSet;

    #[test]
    fn test_amounts_below_threshold() {
        let (config, pool, mut rng) = fixture(60, 4);
        let cfg = &config.patterns.structuring;
        for id in 0..100 {
            let ctx = InstanceContext::new(&pool, &config, id, config.general.start);
            let records = generate(&ctx, &mut rng).unwrap();
            assert_instance_invariants(&records);

            assert!((15..=25).contains(&records.len()));
            assert!(records.iter().all(|r| r.amount < cfg.threshold));
            assert!(records.iter().all(|r| r.amount >= cfg.amount.min));

            let source = &records[0].source;
            assert!(records.iter().all(|r| &r.source == source));
            let destinations: HashSet<_> = records.iter().map(|r| &r.destination).collect();
            assert_eq!(destinations.len(), records.len());

            for pair in records.windows(2) {
                let gap = (pair[1].timestamp - pair[0].timestamp).num_seconds();
                assert!((5..=30).contains(&gap));
            }
        }
    }

    #[test]
    fn test_threshold_edge_never_reached() {
        let (mut config, pool, mut rng) = fixture(30, 12);
        config.patterns.structuring.threshold = 10.0;
        config.patterns.structuring.amount = crate::config::Range::new(9.9999998, 9.9999999);
        let ctx = InstanceContext::new(&pool, &config, 0, config.general.start);
        let records = generate(&ctx, &mut rng).unwrap();
        assert!(records.iter().all(|r| r.amount < 10.0));
    }
}
