//! Shared "advance the clock, emit one record" step used by every generator.

use chrono::NaiveDateTime;
use rand::Rng;

use super::types::{InstanceContext, PatternKind};
use crate::config::{DelayRange, Range};
use crate::dataset::TransactionRecord;
use crate::error::GenerationError;
use crate::wallet::{random_tx_hash, Wallet};

/// Smallest representable amount; amounts are recorded in whole units of this
pub const AMOUNT_UNIT: f64 = 1e-6;

/// Round an amount to 6 decimal places
pub fn round_amount(amount: f64) -> f64 {
    (amount * 1e6).round() / 1e6
}

/// Round a gas fee to 4 decimal places
pub fn round_gas(fee: f64) -> f64 {
    (fee * 1e4).round() / 1e4
}

/// Amount as a whole number of [`AMOUNT_UNIT`]s, rounded to nearest
pub fn to_units(amount: f64) -> u64 {
    (amount * 1e6).round().max(0.0) as u64
}

/// Amount as a whole number of [`AMOUNT_UNIT`]s, rounded down
pub fn floor_units(amount: f64) -> u64 {
    (amount * 1e6).floor().max(0.0) as u64
}

pub fn from_units(units: u64) -> f64 {
    units as f64 / 1e6
}

/// Scale `base` by a factor drawn from `[1 - jitter, 1 + jitter]`
pub fn jittered<R: Rng + ?Sized>(rng: &mut R, base: f64, jitter: f64) -> f64 {
    base * rng.gen_range((1.0 - jitter)..=(1.0 + jitter))
}

/// Split `total` units into `parts` jittered shares summing to exactly
/// `total`. The last share takes whatever the floored others leave.
pub fn split_units<R: Rng + ?Sized>(rng: &mut R, total: u64, parts: usize, jitter: f64) -> Vec<u64> {
    let weights: Vec<f64> = (0..parts).map(|_| jittered(rng, 1.0, jitter)).collect();
    let sum: f64 = weights.iter().sum();

    let mut shares = Vec::with_capacity(parts);
    let mut assigned = 0u64;
    for w in weights.iter().take(parts.saturating_sub(1)) {
        let share = ((total as f64 * w / sum).floor() as u64).min(total - assigned);
        assigned += share;
        shares.push(share);
    }
    if parts > 0 {
        shares.push(total - assigned);
    }
    shares
}

/// Accumulates the records of one topology instance.
///
/// The instance clock starts at the context's start time and only moves
/// forward, so records come out in non-decreasing timestamp order.
pub struct InstanceBuilder<'a, R: Rng + ?Sized> {
    kind: PatternKind,
    instance_id: u32,
    token: &'a str,
    gas_fee: Range<f64>,
    clock: NaiveDateTime,
    rng: &'a mut R,
    records: Vec<TransactionRecord>,
}

impl<'a, R: Rng + ?Sized> InstanceBuilder<'a, R> {
    pub fn new(ctx: &InstanceContext<'a>, kind: PatternKind, rng: &'a mut R) -> Self {
        Self {
            kind,
            instance_id: ctx.instance_id,
            token: &ctx.config.tokens.suspicious,
            gas_fee: ctx.config.amounts.suspicious_gas_fee,
            clock: ctx.start,
            rng,
            records: Vec::new(),
        }
    }

    pub fn rng(&mut self) -> &mut R {
        &mut *self.rng
    }

    pub fn now(&self) -> NaiveDateTime {
        self.clock
    }

    /// Advance the clock by a delay drawn from `delay` without emitting
    pub fn pause(&mut self, delay: &DelayRange) {
        let step = delay.sample(&mut *self.rng);
        self.clock = self.clock + step;
    }

    /// Advance the clock by a sampled delay and emit one transfer.
    ///
    /// Returns the amount as recorded (rounded), which callers should carry
    /// forward so downstream hops conserve what was actually sent. Fails
    /// when the amount rounds to zero.
    pub fn hop(
        &mut self,
        delay: &DelayRange,
        source: &Wallet,
        destination: &Wallet,
        amount: f64,
    ) -> Result<f64, GenerationError> {
        self.pause(delay);
        self.emit(source, destination, amount)
    }

    fn emit(&mut self, source: &Wallet, destination: &Wallet, amount: f64) -> Result<f64, GenerationError> {
        debug_assert_ne!(source, destination, "self-transfer in {} instance", self.kind);

        let amount = round_amount(amount);
        if amount < AMOUNT_UNIT {
            return Err(GenerationError::AmountUnderflow {
                pattern: self.kind,
                instance_id: self.instance_id,
            });
        }
        let gas_fee = round_gas(self.gas_fee.sample(&mut *self.rng));
        self.records.push(TransactionRecord {
            tx_hash: random_tx_hash(&mut *self.rng),
            source: source.clone(),
            destination: destination.clone(),
            timestamp: self.clock,
            amount,
            token: self.token.to_string(),
            gas_fee,
            pattern: self.kind,
            instance_id: Some(self.instance_id),
        });
        Ok(amount)
    }

    pub fn finish(self) -> Vec<TransactionRecord> {
        log::debug!(
            "{} instance {} produced {} records ending at {}",
            self.kind,
            self.instance_id,
            self.records.len(),
            self.clock
        );
        self.records
    }
}
