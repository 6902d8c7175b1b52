//! Fan-out/fan-in chains.
//!
//! A source splits a total across K intermediaries (each leg jittered), and
//! after a pause every intermediary forwards what it received, minus its own
//! fee, to a single aggregation wallet.

use rand::Rng;

use super::builder::{jittered, InstanceBuilder};
use super::types::{InstanceContext, PatternKind};
use crate::dataset::TransactionRecord;
use crate::error::GenerationError;

pub fn generate<R: Rng + ?Sized>(
    ctx: &InstanceContext<'_>,
    rng: &mut R,
) -> Result<Vec<TransactionRecord>, GenerationError> {
    let cfg = &ctx.config.patterns.fan_out_fan_in;
    let k = cfg.intermediaries.sample(rng);

    // source, K intermediaries, aggregator
    let wallets = ctx.draw(PatternKind::FanOutFanIn, k + 2, rng)?;
    let source = &wallets[0];
    let intermediaries = &wallets[1..=k];
    let aggregator = &wallets[k + 1];

    let total = ctx.config.amounts.suspicious.sample(rng);
    let share = total / k as f64;

    let mut builder = InstanceBuilder::new(ctx, PatternKind::FanOutFanIn, rng);

    let mut received = Vec::with_capacity(k);
    for intermediary in intermediaries {
        let amount = jittered(builder.rng(), share, cfg.split_jitter);
        received.push(builder.hop(&cfg.hop_delay, source, intermediary, amount)?);
    }

    builder.pause(&cfg.pause);

    for (intermediary, amount) in intermediaries.iter().zip(received) {
        let fee = cfg.fee.sample(builder.rng());
        builder.hop(&cfg.hop_delay, intermediary, aggregator, amount * (1.0 - fee))?;
    }

    Ok(builder.finish())
}
