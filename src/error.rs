//! Error type for dataset generation.
//!
//! Every variant is terminal for a run. Pool and sizing failures carry the
//! pattern kind and the required vs. available counts so the offending
//! configuration value can be located directly from the message.

use crate::config::ValidationError;
use crate::topology::PatternKind;
use crate::wallet::PoolError;

#[derive(Debug, thiserror::Error)]
pub enum GenerationError {
    #[error(transparent)]
    InvalidConfig(#[from] ValidationError),

    #[error("insufficient distinct wallets for {pattern}: requires {required}, pool has {available}")]
    InsufficientWallets {
        pattern: PatternKind,
        required: usize,
        available: usize,
    },

    #[error(
        "target of {target} transactions is smaller than the {suspicious} suspicious records \
         the pattern mix produces"
    )]
    TargetTooSmall { target: usize, suspicious: usize },

    #[error("{pattern} instance {instance_id} produced an amount below 0.000001; raise the suspicious amount range")]
    AmountUnderflow { pattern: PatternKind, instance_id: u32 },

    #[error(transparent)]
    Pool(#[from] PoolError),
}

impl GenerationError {
    /// Attach a pattern kind to a raw pool failure
    pub fn for_pattern(pattern: PatternKind, err: PoolError) -> Self {
        match err {
            PoolError::Exhausted { requested, available } => Self::InsufficientWallets {
                pattern,
                required: requested,
                available,
            },
            other => Self::Pool(other),
        }
    }
}
