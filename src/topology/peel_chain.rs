//! Peel chains: value walks a linear sequence of wallets, and every hop
//! strips off a slice of what is carried forward.

use rand::Rng;

use super::builder::{from_units, to_units, InstanceBuilder};
use super::types::{InstanceContext, PatternKind};
use crate::dataset::TransactionRecord;
use crate::error::GenerationError;

pub fn generate<R: Rng + ?Sized>(
    ctx: &InstanceContext<'_>,
    rng: &mut R,
) -> Result<Vec<TransactionRecord>, GenerationError> {
    let cfg = &ctx.config.patterns.peel_chain;
    let len = cfg.length.sample(rng);
    let chain = ctx.draw(PatternKind::PeelChain, len, rng)?;
    let mut units = to_units(ctx.config.amounts.suspicious.sample(rng));

    let mut builder = InstanceBuilder::new(ctx, PatternKind::PeelChain, rng);
    for pair in chain.windows(2) {
        let peel = cfg.peel_fraction.sample(builder.rng());
        // whole units, so every hop is strictly smaller than the last
        let kept = (units as f64 * (1.0 - peel)).floor() as u64;
        units = kept.min(units.saturating_sub(1));
        builder.hop(&cfg.hop_delay, &pair[0], &pair[1], from_units(units))?;
    }

    Ok(builder.finish())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::Range;
    use crate::topology::test_support::{assert_instance_invariants, fixture};

    #[test]
    fn test_amounts_strictly_decrease() {
        let (config, pool, mut rng) = fixture(30, 17);
        for id in 0..200 {
            let ctx = InstanceContext::new(&pool, &config, id, config.general.start);
            let records = generate(&ctx, &mut rng).unwrap();
            assert_instance_invariants(&records);
            assert!((4..=7).contains(&records.len()));

            for pair in records.windows(2) {
                assert_eq!(pair[0].destination, pair[1].source);
                assert!(pair[1].amount < pair[0].amount);
                let ratio = pair[1].amount / pair[0].amount;
                assert!((0.80 - 1e-6..=0.90 + 1e-6).contains(&ratio));
            }
        }
    }

    #[test]
    fn test_tiny_amounts_never_stall_or_reach_zero() {
        let (mut config, pool, mut rng) = fixture(30, 6);
        config.amounts.suspicious = Range::new(0.000001, 0.00001);
        let mut underflows = 0;
        for id in 0..500 {
            let ctx = InstanceContext::new(&pool, &config, id, config.general.start);
            match generate(&ctx, &mut rng) {
                Ok(records) => {
                    assert_instance_invariants(&records);
                    for pair in records.windows(2) {
                        assert!(pair[1].amount < pair[0].amount);
                    }
                }
                Err(GenerationError::AmountUnderflow { pattern, instance_id }) => {
                    assert_eq!(pattern, PatternKind::PeelChain);
                    assert_eq!(instance_id, id);
                    underflows += 1;
                }
                Err(other) => panic!("unexpected error {:?}", other),
            }
        }
        assert!(underflows > 0);
    }

    #[test]
    fn test_seven_wallets_give_six_records() {
        let (mut config, pool, mut rng) = fixture(10, 2);
        config.patterns.peel_chain.length = Range::fixed(7);
        let ctx = InstanceContext::new(&pool, &config, 0, config.general.start);
        assert_eq!(generate(&ctx, &mut rng).unwrap().len(), 6);
    }
}
