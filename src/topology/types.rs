//! Pattern kinds and the per-instance generation context.

use chrono::NaiveDateTime;
use rand::Rng;
use serde::{Deserialize, Serialize};
use std::fmt;

use crate::config::Config;
use crate::error::GenerationError;
use crate::wallet::{Wallet, WalletPool};

/// Category tag carried by every transaction record
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum PatternKind {
    /// Background peer-to-peer transfer
    Normal,
    /// One source splits to K intermediaries which recombine at one aggregator
    FanOutFanIn,
    /// Closed loop returning to its first wallet
    Circular,
    /// Fixed 1 -> 3 -> 6 -> 1 branching tree
    Layering,
    /// Burst of sub-threshold deposits from one source
    Structuring,
    /// Relay wallet forwarding most of what it receives
    PassThrough,
    /// Linear chain shedding value at every hop
    PeelChain,
    /// Users pooling into a mixer that pays out to fresh wallets
    Mixer,
}

impl PatternKind {
    /// Every suspicious kind, in generation order
    pub const SUSPICIOUS: [PatternKind; 7] = [
        PatternKind::FanOutFanIn,
        PatternKind::Circular,
        PatternKind::Layering,
        PatternKind::Structuring,
        PatternKind::PassThrough,
        PatternKind::PeelChain,
        PatternKind::Mixer,
    ];

    pub fn as_str(&self) -> &'static str {
        match self {
            PatternKind::Normal => "normal",
            PatternKind::FanOutFanIn => "fan_out_fan_in",
            PatternKind::Circular => "circular",
            PatternKind::Layering => "layering",
            PatternKind::Structuring => "structuring",
            PatternKind::PassThrough => "pass_through",
            PatternKind::PeelChain => "peel_chain",
            PatternKind::Mixer => "mixer",
        }
    }

    pub fn is_suspicious(&self) -> bool {
        !matches!(self, PatternKind::Normal)
    }
}

impl fmt::Display for PatternKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Everything a generator needs to build one topology instance
#[derive(Debug, Clone, Copy)]
pub struct InstanceContext<'a> {
    pub pool: &'a WalletPool,
    pub config: &'a Config,
    pub instance_id: u32,
    pub start: NaiveDateTime,
}

impl<'a> InstanceContext<'a> {
    pub fn new(pool: &'a WalletPool, config: &'a Config, instance_id: u32, start: NaiveDateTime) -> Self {
        Self {
            pool,
            config,
            instance_id,
            start,
        }
    }

    /// Draw `k` distinct wallets for a `kind` instance
    pub fn draw<R: Rng + ?Sized>(
        &self,
        kind: PatternKind,
        k: usize,
        rng: &mut R,
    ) -> Result<Vec<Wallet>, GenerationError> {
        self.pool
            .sample(k, rng)
            .map_err(|e| GenerationError::for_pattern(kind, e))
    }

    /// Draw `k` distinct wallets disjoint from `excluded`
    pub fn draw_excluding<R: Rng + ?Sized>(
        &self,
        kind: PatternKind,
        k: usize,
        excluded: &[Wallet],
        rng: &mut R,
    ) -> Result<Vec<Wallet>, GenerationError> {
        self.pool
            .sample_excluding(k, excluded, rng)
            .map_err(|e| match e {
                crate::wallet::PoolError::Exhausted { .. } => GenerationError::InsufficientWallets {
                    pattern: kind,
                    required: k + excluded.len(),
                    available: self.pool.len(),
                },
                other => GenerationError::for_pattern(kind, other),
            })
    }
}
