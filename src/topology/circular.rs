//! Circular loops: value walks a cycle of wallets and returns to where it
//! started, shedding a small fee at every hop.

use rand::Rng;

use super::builder::InstanceBuilder;
use super::types::{InstanceContext, PatternKind};
use crate::dataset::TransactionRecord;
use crate::error::GenerationError;

pub fn generate<R: Rng + ?Sized>(
    ctx: &InstanceContext<'_>,
    rng: &mut R,
) -> Result<Vec<TransactionRecord>, GenerationError> {
    let cfg = &ctx.config.patterns.circular;
    let len = cfg.cycle_length.sample(rng);
    let cycle = ctx.draw(PatternKind::Circular, len, rng)?;
    let mut value = ctx.config.amounts.suspicious.sample(rng);

    let mut builder = InstanceBuilder::new(ctx, PatternKind::Circular, rng);
    for i in 0..len {
        let fee = cfg.fee.sample(builder.rng());
        let next = &cycle[(i + 1) % len];
        value = builder.hop(&cfg.hop_delay, &cycle[i], next, value * (1.0 - fee))?;
    }

    Ok(builder.finish())
}
