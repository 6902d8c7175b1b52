//! Opaque wallet identifiers.
//!
//! Identifiers are rendered Ethereum-style: `0x` followed by 40 lowercase hex
//! characters. Transaction hashes use the same scheme with 64 characters.

use rand::Rng;
use serde::{Deserialize, Serialize};
use std::fmt;

/// Length of an address payload in bytes
pub const ADDRESS_BYTES: usize = 20;

/// An opaque wallet identifier
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(transparent)]
pub struct Wallet(String);

impl Wallet {
    /// Draw a fresh random address
    pub fn random<R: Rng + ?Sized>(rng: &mut R) -> Self {
        let bytes: [u8; ADDRESS_BYTES] = rng.gen();
        Self(format!("0x{}", hex::encode(bytes)))
    }

    /// Wrap an externally supplied identifier
    pub fn new(address: impl Into<String>) -> Self {
        Self(address.into())
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl fmt::Display for Wallet {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

/// Draw a random 32-byte transaction hash
pub fn random_tx_hash<R: Rng + ?Sized>(rng: &mut R) -> String {
    let bytes: [u8; 32] = rng.gen();
    format!("0x{}", hex::encode(bytes))
}
