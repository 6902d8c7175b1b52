//! Fixed-size pool of unique wallets.
//!
//! Sampling is done over index sets with `rand::seq::index::sample`, so a draw
//! of `k` wallets is always `k` distinct slots and never loops waiting for a
//! fresh value.

use rand::seq::{index, SliceRandom};
use rand::Rng;
use std::collections::HashSet;

use super::address::Wallet;

/// Errors raised while drawing from the pool
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum PoolError {
    #[error("requested {requested} distinct wallets but only {available} are available")]
    Exhausted { requested: usize, available: usize },

    #[error("no mixer addresses are configured")]
    NoMixers,

    #[error("duplicate wallet identifier: {0}")]
    Duplicate(Wallet),
}

/// The run's wallet population plus a small auxiliary set of mixer addresses.
///
/// Mixer addresses are kept apart from the ordinary wallets: `sample` and
/// `sample_excluding` never return them, only `pick_mixer` does.
#[derive(Debug, Clone)]
pub struct WalletPool {
    wallets: Vec<Wallet>,
    mixers: Vec<Wallet>,
}

impl WalletPool {
    /// Build a pool of `count` ordinary wallets and `mixer_count` mixers,
    /// all pairwise distinct.
    pub fn generate<R: Rng + ?Sized>(count: usize, mixer_count: usize, rng: &mut R) -> Self {
        let mut seen = HashSet::with_capacity(count + mixer_count);
        let mut fresh = |rng: &mut R| loop {
            // 160-bit addresses; a repeat here is practically unreachable
            let wallet = Wallet::random(rng);
            if seen.insert(wallet.clone()) {
                return wallet;
            }
        };

        let mut wallets = Vec::with_capacity(count);
        for _ in 0..count {
            wallets.push(fresh(rng));
        }
        let mut mixers = Vec::with_capacity(mixer_count);
        for _ in 0..mixer_count {
            mixers.push(fresh(rng));
        }

        log::debug!("Created wallet pool with {} wallets and {} mixers", count, mixer_count);
        Self { wallets, mixers }
    }

    /// Build a pool from explicit identifiers, rejecting duplicates
    pub fn from_wallets(wallets: Vec<Wallet>, mixers: Vec<Wallet>) -> Result<Self, PoolError> {
        let mut seen = HashSet::with_capacity(wallets.len() + mixers.len());
        for wallet in wallets.iter().chain(mixers.iter()) {
            if !seen.insert(wallet) {
                return Err(PoolError::Duplicate(wallet.clone()));
            }
        }
        Ok(Self { wallets, mixers })
    }

    /// Number of ordinary wallets
    pub fn len(&self) -> usize {
        self.wallets.len()
    }

    pub fn is_empty(&self) -> bool {
        self.wallets.is_empty()
    }

    pub fn wallets(&self) -> &[Wallet] {
        &self.wallets
    }

    pub fn mixers(&self) -> &[Wallet] {
        &self.mixers
    }

    pub fn is_mixer(&self, wallet: &Wallet) -> bool {
        self.mixers.contains(wallet)
    }

    /// Draw `k` distinct ordinary wallets without replacement
    pub fn sample<R: Rng + ?Sized>(&self, k: usize, rng: &mut R) -> Result<Vec<Wallet>, PoolError> {
        if k > self.wallets.len() {
            return Err(PoolError::Exhausted {
                requested: k,
                available: self.wallets.len(),
            });
        }

        Ok(index::sample(rng, self.wallets.len(), k)
            .into_iter()
            .map(|i| self.wallets[i].clone())
            .collect())
    }

    /// Draw `k` distinct ordinary wallets, none of which is in `excluded`
    pub fn sample_excluding<R: Rng + ?Sized>(
        &self,
        k: usize,
        excluded: &[Wallet],
        rng: &mut R,
    ) -> Result<Vec<Wallet>, PoolError> {
        let candidates: Vec<usize> = (0..self.wallets.len())
            .filter(|&i| !excluded.contains(&self.wallets[i]))
            .collect();

        if k > candidates.len() {
            return Err(PoolError::Exhausted {
                requested: k,
                available: candidates.len(),
            });
        }

        Ok(index::sample(rng, candidates.len(), k)
            .into_iter()
            .map(|i| self.wallets[candidates[i]].clone())
            .collect())
    }

    /// Draw two distinct ordinary wallets
    pub fn pick_pair<R: Rng + ?Sized>(&self, rng: &mut R) -> Result<(Wallet, Wallet), PoolError> {
        let mut pair = self.sample(2, rng)?;
        let second = pair.pop();
        let first = pair.pop();
        match (first, second) {
            (Some(first), Some(second)) => Ok((first, second)),
            _ => Err(PoolError::Exhausted {
                requested: 2,
                available: self.wallets.len(),
            }),
        }
    }

    /// Pick one of the designated mixer addresses
    pub fn pick_mixer<R: Rng + ?Sized>(&self, rng: &mut R) -> Result<Wallet, PoolError> {
        self.mixers.choose(rng).cloned().ok_or(PoolError::NoMixers)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use rand::rngs::StdRng;
    use rand::SeedableRng;

    fn pool(count: usize) -> WalletPool {
        WalletPool::generate(count, 3, &mut StdRng::seed_from_u64(42))
    }

    #[test]
    fn test_generated_wallets_are_unique() {
        let pool = pool(1000);
        assert_eq!(pool.len(), 1000);
        assert_eq!(pool.mixers().len(), 3);

        let unique: HashSet<_> = pool.wallets().iter().chain(pool.mixers()).collect();
        assert_eq!(unique.len(), 1003);
    }

    #[test]
    fn test_sample_is_distinct() {
        let pool = pool(30);
        let mut rng = StdRng::seed_from_u64(7);
        for _ in 0..100 {
            let drawn = pool.sample(30, &mut rng).unwrap();
            let unique: HashSet<_> = drawn.iter().collect();
            assert_eq!(unique.len(), 30);
            assert!(drawn.iter().all(|w| !pool.is_mixer(w)));
        }
    }

    #[test]
    fn test_sample_too_large_fails() {
        let pool = pool(5);
        let err = pool.sample(6, &mut StdRng::seed_from_u64(1)).unwrap_err();
        assert_eq!(err, PoolError::Exhausted { requested: 6, available: 5 });
    }

    #[test]
    fn test_sample_excluding() {
        let pool = pool(10);
        let mut rng = StdRng::seed_from_u64(3);
        let excluded = pool.sample(4, &mut rng).unwrap();

        let drawn = pool.sample_excluding(6, &excluded, &mut rng).unwrap();
        assert_eq!(drawn.len(), 6);
        assert!(drawn.iter().all(|w| !excluded.contains(w)));

        let err = pool.sample_excluding(7, &excluded, &mut rng).unwrap_err();
        assert_eq!(err, PoolError::Exhausted { requested: 7, available: 6 });
    }

    #[test]
    fn test_pick_mixer() {
        let pool = pool(10);
        let mut rng = StdRng::seed_from_u64(11);
        for _ in 0..20 {
            let mixer = pool.pick_mixer(&mut rng).unwrap();
            assert!(pool.is_mixer(&mixer));
            assert!(!pool.wallets().contains(&mixer));
        }

        let empty = WalletPool::generate(10, 0, &mut rng);
        assert_eq!(empty.pick_mixer(&mut rng), Err(PoolError::NoMixers));
    }

    #[test]
    fn test_pick_pair_distinct() {
        let pool = pool(2);
        let mut rng = StdRng::seed_from_u64(8);
        for _ in 0..50 {
            let (a, b) = pool.pick_pair(&mut rng).unwrap();
            assert_ne!(a, b);
        }
    }

    #[test]
    fn test_from_wallets_rejects_duplicates() {
        let a = Wallet::new("0xaa");
        let b = Wallet::new("0xbb");
        assert!(WalletPool::from_wallets(vec![a.clone(), b.clone()], vec![]).is_ok());
        assert_eq!(
            WalletPool::from_wallets(vec![a.clone(), b], vec![a.clone()]).unwrap_err(),
            PoolError::Duplicate(a)
        );
    }
}
