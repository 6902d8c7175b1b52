//! Suspicious topology generators.
//!
//! Each submodule builds one instance of a money-laundering pattern: a short
//! sequence of labelled transfers over wallets drawn from the shared pool.
//! Instances never share state, so they can be generated independently and
//! merged afterwards.

pub mod builder;
pub mod circular;
pub mod fan_out_fan_in;
pub mod layering;
pub mod mixer;
pub mod pass_through;
pub mod peel_chain;
pub mod structuring;
pub mod types;

// Re-export key types for easier access
pub use builder::InstanceBuilder;
pub use types::{InstanceContext, PatternKind};

use rand::Rng;

use crate::dataset::TransactionRecord;
use crate::error::GenerationError;

/// Build one instance of `kind` starting at `ctx.start`.
///
/// `Normal` has no topology; background records come from
/// [`crate::background`] and this returns an empty list for it.
pub fn generate_instance<R: Rng + ?Sized>(
    kind: PatternKind,
    ctx: &InstanceContext<'_>,
    rng: &mut R,
) -> Result<Vec<TransactionRecord>, GenerationError> {
    match kind {
        PatternKind::Normal => Ok(Vec::new()),
        PatternKind::FanOutFanIn => fan_out_fan_in::generate(ctx, rng),
        PatternKind::Circular => circular::generate(ctx, rng),
        PatternKind::Layering => layering::generate(ctx, rng),
        PatternKind::Structuring => structuring::generate(ctx, rng),
        PatternKind::PassThrough => pass_through::generate(ctx, rng),
        PatternKind::PeelChain => peel_chain::generate(ctx, rng),
        PatternKind::Mixer => mixer::generate(ctx, rng),
    }
}

#[cfg(test)]
pub(crate) mod test_support {
    use rand::rngs::StdRng;
    use rand::SeedableRng;

    use crate::config::Config;
    use crate::dataset::TransactionRecord;
    use crate::wallet::WalletPool;

    /// Default config, a pool of `pool_size` wallets plus 3 mixers, and a
    /// seeded RNG
    pub fn fixture(pool_size: usize, seed: u64) -> (Config, WalletPool, StdRng) {
        let mut rng = StdRng::seed_from_u64(seed);
        let pool = WalletPool::generate(pool_size, 3, &mut rng);
        (Config::default(), pool, rng)
    }

    /// Properties every single instance must satisfy
    pub fn assert_instance_invariants(records: &[TransactionRecord]) {
        assert!(!records.is_empty(), "instance produced no records");
        let first = &records[0];
        for record in records {
            assert_ne!(record.source, record.destination, "self-transfer in {:?}", record);
            assert!(record.amount > 0.0, "non-positive amount in {:?}", record);
            assert_eq!(record.pattern, first.pattern);
            assert_eq!(record.instance_id, first.instance_id);
            assert!(record.instance_id.is_some());
        }
        for pair in records.windows(2) {
            assert!(pair[0].timestamp <= pair[1].timestamp, "timestamps out of order");
        }
    }
}

#[cfg(test)]
mod tests {
    use super::test_support::{assert_instance_invariants, fixture};
    use super::*;

    #[test]
    fn test_dispatch_covers_every_suspicious_kind() {
        let (config, pool, mut rng) = fixture(60, 99);
        for (id, &kind) in PatternKind::SUSPICIOUS.iter().enumerate() {
            let ctx = InstanceContext::new(&pool, &config, id as u32, config.general.start);
            let records = generate_instance(kind, &ctx, &mut rng).unwrap();
            assert_instance_invariants(&records);
            assert!(records.iter().all(|r| r.pattern == kind));
            assert!(config.patterns.records_per_instance(kind).contains(records.len()));
            assert!(records[0].timestamp > config.general.start);
        }
    }

    #[test]
    fn test_normal_has_no_topology() {
        let (config, pool, mut rng) = fixture(10, 1);
        let ctx = InstanceContext::new(&pool, &config, 0, config.general.start);
        assert!(generate_instance(PatternKind::Normal, &ctx, &mut rng).unwrap().is_empty());
    }
}
