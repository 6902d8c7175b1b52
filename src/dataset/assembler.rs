//! Plans, generates and merges a full dataset.
//!
//! The master RNG drives everything that must stay sequential: the wallet
//! pool, the shuffled instance plan, start times, one seed per instance and
//! the background noise. Instances are then generated in parallel, each from
//! its own `StdRng`, so the output only depends on the master seed and not on
//! how rayon schedules the work.

use chrono::{Duration, NaiveDateTime};
use rand::rngs::StdRng;
use rand::seq::SliceRandom;
use rand::{Rng, SeedableRng};
use rayon::prelude::*;
use std::collections::BTreeMap;

use super::types::{Dataset, TransactionRecord};
use crate::background;
use crate::config::Config;
use crate::error::GenerationError;
use crate::topology::{self, InstanceContext, PatternKind};
use crate::wallet::{PoolError, WalletPool};

/// Share of each instance window in which the instance may start
const START_SPREAD: f64 = 0.8;

/// One planned topology instance
#[derive(Debug, Clone)]
struct PlannedInstance {
    id: u32,
    kind: PatternKind,
    start: NaiveDateTime,
    seed: u64,
}

/// Generate a dataset from `config`, building a fresh wallet pool.
///
/// Uses `config.general.seed` when set and a random seed otherwise; the seed
/// actually used is stored on the returned [`Dataset`].
pub fn assemble(config: &Config) -> Result<Dataset, GenerationError> {
    let seed = config.general.seed.unwrap_or_else(rand::random);
    log::info!(
        "Assembling dataset: target {} transactions, {} suspicious instances, seed {}",
        config.general.target_transactions,
        config.patterns.total_instances(),
        seed
    );

    let mut rng = StdRng::seed_from_u64(seed);
    let pool = WalletPool::generate(config.general.wallet_count, config.general.mixer_count, &mut rng);
    let dataset = assemble_with_pool(config, &pool, &mut rng)?;
    Ok(dataset.with_seed(seed))
}

/// Generate a dataset over an existing pool, drawing from `rng`.
///
/// The configuration is validated first. The returned dataset's `seed` is 0;
/// [`assemble`] fills it in.
pub fn assemble_with_pool<R: Rng + ?Sized>(
    config: &Config,
    pool: &WalletPool,
    rng: &mut R,
) -> Result<Dataset, GenerationError> {
    config.validate()?;
    preflight(config, pool)?;

    let plan = plan_instances(config, rng);
    log::info!("Generating {} topology instances", plan.len());

    let generated: Vec<Vec<TransactionRecord>> = plan
        .par_iter()
        .map(|planned| {
            let ctx = InstanceContext::new(pool, config, planned.id, planned.start);
            let mut instance_rng = StdRng::seed_from_u64(planned.seed);
            topology::generate_instance(planned.kind, &ctx, &mut instance_rng)
        })
        .collect::<Result<_, _>>()?;

    let mut instances = BTreeMap::new();
    for planned in &plan {
        *instances.entry(planned.kind).or_insert(0) += 1;
    }

    let suspicious: usize = generated.iter().map(Vec::len).sum();
    let target = config.general.target_transactions;
    if suspicious > target {
        return Err(GenerationError::TargetTooSmall { target, suspicious });
    }
    let background_count = target - suspicious;
    log::info!(
        "Generated {} suspicious records; adding {} background records",
        suspicious,
        background_count
    );

    let mut records = Vec::with_capacity(target);
    for instance in generated {
        records.extend(instance);
    }
    records.extend(background::generate(pool, config, background_count, rng)?);

    // stable: ties keep instance order, then background order
    records.sort_by_key(|r| r.timestamp);

    if target > 0 && suspicious * 2 > target {
        log::warn!(
            "Suspicious records make up {:.1}% of the dataset",
            suspicious as f64 / target as f64 * 100.0
        );
    }

    Ok(Dataset::new(0, pool.len(), instances, records))
}

/// Reject configurations that cannot be satisfied before generating anything
fn preflight(config: &Config, pool: &WalletPool) -> Result<(), GenerationError> {
    let patterns = &config.patterns;
    for &kind in PatternKind::SUSPICIOUS.iter() {
        if patterns.count(kind) == 0 {
            continue;
        }
        let required = patterns.max_wallets(kind);
        if required > pool.len() {
            return Err(GenerationError::InsufficientWallets {
                pattern: kind,
                required,
                available: pool.len(),
            });
        }
    }

    if patterns.mixer.count > 0 && pool.mixers().is_empty() {
        return Err(GenerationError::Pool(PoolError::NoMixers));
    }

    let target = config.general.target_transactions;
    let minimum = patterns.min_suspicious_records();
    if minimum > target {
        return Err(GenerationError::TargetTooSmall {
            target,
            suspicious: minimum,
        });
    }

    Ok(())
}

/// Shuffle one entry per configured instance and spread their start times.
///
/// Instance `j` of `n` starts in the `j`-th equal window of the horizon, at
/// an offset within the first 80% of that window.
fn plan_instances<R: Rng + ?Sized>(config: &Config, rng: &mut R) -> Vec<PlannedInstance> {
    let mut kinds = Vec::with_capacity(config.patterns.total_instances());
    for &kind in PatternKind::SUSPICIOUS.iter() {
        for _ in 0..config.patterns.count(kind) {
            kinds.push(kind);
        }
    }
    kinds.shuffle(rng);

    let window = config.horizon_seconds() as f64 / kinds.len().max(1) as f64;
    let mut plan = Vec::with_capacity(kinds.len());
    for (j, kind) in kinds.into_iter().enumerate() {
        let offset = j as f64 * window + rng.gen_range(0.0..=window * START_SPREAD);
        plan.push(PlannedInstance {
            id: j as u32,
            kind,
            start: config.general.start + Duration::seconds(offset as i64),
            seed: rng.gen(),
        });
    }
    plan
}
