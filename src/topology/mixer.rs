//! Mixer round-trips: users pool funds into one of the designated mixer
//! addresses, which after a long mixing delay pays out to a fresh, disjoint
//! set of output wallets.

use rand::Rng;

use super::builder::{from_units, split_units, to_units, InstanceBuilder};
use super::types::{InstanceContext, PatternKind};
use crate::dataset::TransactionRecord;
use crate::error::GenerationError;

pub fn generate<R: Rng + ?Sized>(
    ctx: &InstanceContext<'_>,
    rng: &mut R,
) -> Result<Vec<TransactionRecord>, GenerationError> {
    let cfg = &ctx.config.patterns.mixer;
    let user_count = cfg.users.sample(rng);

    let users = ctx.draw(PatternKind::Mixer, user_count, rng)?;
    let outputs = ctx.draw_excluding(PatternKind::Mixer, user_count, &users, rng)?;
    let mixer = ctx
        .pool
        .pick_mixer(rng)
        .map_err(|e| GenerationError::for_pattern(PatternKind::Mixer, e))?;

    let mut builder = InstanceBuilder::new(ctx, PatternKind::Mixer, rng);

    let mut pooled = 0u64;
    for user in &users {
        let amount = ctx.config.amounts.suspicious.sample(builder.rng());
        pooled += to_units(builder.hop(&cfg.inflow_delay, user, &mixer, amount)?);
    }

    builder.pause(&cfg.mixing_delay);

    let fee = cfg.fee.sample(builder.rng());
    let payout = ((pooled as f64 * (1.0 - fee)).floor() as u64).min(pooled);
    let shares = split_units(builder.rng(), payout, user_count, cfg.split_jitter);
    for (output, share) in outputs.iter().zip(shares) {
        builder.hop(&cfg.outflow_delay, &mixer, output, from_units(share))?;
    }

    Ok(builder.finish())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::Range;
    use crate::topology::builder::to_units;
    use crate::topology::test_support::{assert_instance_invariants, fixture};
    use crate::wallet::PoolError;
    use std::collections::HashSet;

    #[test]
    fn test_round_trip_through_known_mixer() {
        let (config, pool, mut rng) = fixture(40, 31);
        for id in 0..100 {
            let ctx = InstanceContext::new(&pool, &config, id, config.general.start);
            let records = generate(&ctx, &mut rng).unwrap();
            assert_instance_invariants(&records);

            let users = records.len() / 2;
            assert!((4..=7).contains(&users));
            let (inflow, outflow) = records.split_at(users);

            let mixer = &inflow[0].destination;
            assert!(pool.is_mixer(mixer));
            assert!(inflow.iter().all(|r| &r.destination == mixer));
            assert!(outflow.iter().all(|r| &r.source == mixer));

            let senders: HashSet<_> = inflow.iter().map(|r| &r.source).collect();
            let receivers: HashSet<_> = outflow.iter().map(|r| &r.destination).collect();
            assert_eq!(senders.len(), users);
            assert_eq!(receivers.len(), users);
            assert!(senders.is_disjoint(&receivers));

            let total_in: f64 = inflow.iter().map(|r| r.amount).sum();
            let total_out: f64 = outflow.iter().map(|r| r.amount).sum();
            let ratio = total_out / total_in;
            assert!((0.965 - 1e-6..=0.975 + 1e-6).contains(&ratio), "ratio {}", ratio);

            // mixing delay separates the two phases
            let gap = (outflow[0].timestamp - inflow[users - 1].timestamp).num_seconds();
            assert!(gap >= 600 + 20);
        }
    }

    #[test]
    fn test_missing_mixers_reported() {
        let (config, _, mut rng) = fixture(40, 1);
        let pool = crate::wallet::WalletPool::generate(40, 0, &mut rng);
        let ctx = InstanceContext::new(&pool, &config, 0, config.general.start);
        assert!(matches!(
            generate(&ctx, &mut rng),
            Err(GenerationError::Pool(PoolError::NoMixers))
        ));
    }

    #[test]
    fn test_zero_fee_pays_out_everything() {
        let (mut config, pool, mut rng) = fixture(40, 19);
        config.patterns.mixer.fee = Range::fixed(0.0);
        config.validate().unwrap();

        for id in 0..1000 {
            let ctx = InstanceContext::new(&pool, &config, id, config.general.start);
            let records = generate(&ctx, &mut rng).unwrap();
            let (inflow, outflow) = records.split_at(records.len() / 2);
            let pooled: u64 = inflow.iter().map(|r| to_units(r.amount)).sum();
            let paid: u64 = outflow.iter().map(|r| to_units(r.amount)).sum();
            assert_eq!(paid, pooled, "instance {}", id);
        }
    }
}
