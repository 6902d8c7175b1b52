//! Pass-through relays: several sources feed one wallet which, after a short
//! delay, forwards most of the accumulated inflow to a disjoint set of
//! destinations.

use rand::Rng;

use super::builder::{from_units, split_units, to_units, InstanceBuilder};
use super::types::{InstanceContext, PatternKind};
use crate::dataset::TransactionRecord;
use crate::error::GenerationError;

pub fn generate<R: Rng + ?Sized>(
    ctx: &InstanceContext<'_>,
    rng: &mut R,
) -> Result<Vec<TransactionRecord>, GenerationError> {
    let cfg = &ctx.config.patterns.pass_through;
    let source_count = cfg.sources.sample(rng);
    let destination_count = cfg.destinations.sample(rng);

    // relay first, then its sources
    let inbound = ctx.draw(PatternKind::PassThrough, source_count + 1, rng)?;
    let destinations = ctx.draw_excluding(PatternKind::PassThrough, destination_count, &inbound, rng)?;
    let relay = &inbound[0];
    let sources = &inbound[1..];

    let mut builder = InstanceBuilder::new(ctx, PatternKind::PassThrough, rng);

    let mut inflow = 0u64;
    for source in sources {
        let amount = ctx.config.amounts.suspicious.sample(builder.rng());
        inflow += to_units(builder.hop(&cfg.inflow_delay, source, relay, amount)?);
    }

    builder.pause(&cfg.pause);

    // split in whole units so the recorded outflow never exceeds the inflow
    let fraction = cfg.forward_fraction.sample(builder.rng());
    let forwarded = ((inflow as f64 * fraction).floor() as u64).min(inflow);
    let shares = split_units(builder.rng(), forwarded, destination_count, cfg.split_jitter);
    for (destination, share) in destinations.iter().zip(shares) {
        builder.hop(&cfg.outflow_delay, relay, destination, from_units(share))?;
    }

    Ok(builder.finish())
}
