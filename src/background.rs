//! Background peer-to-peer noise.
//!
//! Records are independent of each other and of the topology instances: two
//! distinct wallets, a timestamp uniform over the whole horizon, an amount
//! from the normal range and a random token.

use chrono::Duration;
use rand::seq::SliceRandom;
use rand::Rng;

use crate::config::Config;
use crate::dataset::TransactionRecord;
use crate::error::GenerationError;
use crate::topology::builder::{round_amount, round_gas};
use crate::topology::PatternKind;
use crate::wallet::{random_tx_hash, WalletPool};

/// Generate `count` background records
pub fn generate<R: Rng + ?Sized>(
    pool: &WalletPool,
    config: &Config,
    count: usize,
    rng: &mut R,
) -> Result<Vec<TransactionRecord>, GenerationError> {
    let horizon = config.horizon_seconds();
    let amounts = &config.amounts;

    let mut records = Vec::with_capacity(count);
    for _ in 0..count {
        let (source, destination) = pool
            .pick_pair(rng)
            .map_err(|e| GenerationError::for_pattern(PatternKind::Normal, e))?;
        let offset = rng.gen_range(0..=horizon);
        let token = config
            .tokens
            .types
            .choose(rng)
            .cloned()
            .unwrap_or_else(|| config.tokens.suspicious.clone());

        records.push(TransactionRecord {
            tx_hash: random_tx_hash(rng),
            source,
            destination,
            timestamp: config.general.start + Duration::seconds(offset),
            amount: round_amount(amounts.normal.sample(rng)),
            token,
            gas_fee: round_gas(amounts.normal_gas_fee.sample(rng)),
            pattern: PatternKind::Normal,
            instance_id: None,
        });
    }

    log::debug!("Generated {} background records", records.len());
    Ok(records)
}
