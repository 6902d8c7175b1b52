//! Wallet identifiers and the per-run wallet pool.
//!
//! Every topology generator and the background generator draw their
//! participants from a single [`WalletPool`]. The pool is built once per run
//! and only read afterwards, so it can be shared freely across workers.

pub mod address;
pub mod pool;

pub use address::{random_tx_hash, Wallet};
pub use pool::{PoolError, WalletPool};
