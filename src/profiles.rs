//! Built-in dataset profiles.
//!
//! Each profile describes a fictional on-chain project: its size, value
//! scale, token set and which laundering behaviours it hides. Profiles turn
//! into ordinary [`Config`] values, so they go through the same validation
//! and assembly path as a YAML configuration.

use crate::config::{midnight, Config, Range, ValidationError};
use crate::topology::PatternKind;

/// A named, self-contained dataset scenario
#[derive(Debug, Clone)]
pub struct Profile {
    /// Identifier and output file stem
    pub name: &'static str,
    pub project_name: &'static str,
    pub description: &'static str,
    pub wallet_count: usize,
    /// Background records; the target is this plus the suspicious maximum
    pub normal_transactions: usize,
    pub start: (i32, u32, u32),
    pub end: (i32, u32, u32),
    pub tokens: &'static [&'static str],
    pub normal_amount: Range<f64>,
    pub suspicious_amount: Range<f64>,
    /// Fan-out/fan-in intermediary count
    pub intermediaries: Range<usize>,
    /// Instance counts; kinds not listed get zero
    pub mix: &'static [(PatternKind, usize)],
}

static PROFILES: [Profile; 5] = [
    Profile {
        name: "small_network",
        project_name: "LocalChain DEX",
        description: "Small decentralized exchange with minimal suspicious activity. \
                      Mostly peer-to-peer trading.",
        wallet_count: 150,
        normal_transactions: 2000,
        start: (2024, 1, 1),
        end: (2024, 3, 31),
        tokens: &["ETH", "USDC", "DAI"],
        normal_amount: Range::new(0.5, 25.0),
        suspicious_amount: Range::new(5.0, 30.0),
        intermediaries: Range::new(2, 4),
        mix: &[(PatternKind::FanOutFanIn, 2)],
    },
    Profile {
        name: "medium_network",
        project_name: "TechFund Treasury",
        description: "Medium-sized crypto fund with moderate transaction volume. \
                      Several suspicious fan-out patterns detected.",
        wallet_count: 400,
        normal_transactions: 5000,
        start: (2024, 1, 1),
        end: (2024, 6, 30),
        tokens: &["ETH", "BTC", "USDT", "USDC"],
        normal_amount: Range::new(1.0, 50.0),
        suspicious_amount: Range::new(20.0, 100.0),
        intermediaries: Range::new(3, 6),
        mix: &[(PatternKind::FanOutFanIn, 8), (PatternKind::PeelChain, 2)],
    },
    Profile {
        name: "high_volume_exchange",
        project_name: "CryptoHub Exchange",
        description: "High-volume exchange with sophisticated layering patterns. \
                      Multiple circular transaction loops detected.",
        wallet_count: 600,
        normal_transactions: 12000,
        start: (2024, 1, 1),
        end: (2024, 12, 31),
        tokens: &["ETH", "BTC", "USDT", "USDC", "DAI"],
        normal_amount: Range::new(0.1, 100.0),
        suspicious_amount: Range::new(50.0, 200.0),
        intermediaries: Range::new(4, 8),
        mix: &[
            (PatternKind::FanOutFanIn, 15),
            (PatternKind::Circular, 6),
            (PatternKind::Layering, 3),
        ],
    },
    Profile {
        name: "bridge_network",
        project_name: "CrossChain Bridge Protocol",
        description: "Cross-chain bridge with high-velocity pass-through transactions. \
                      Rapid fund movement patterns observed.",
        wallet_count: 250,
        normal_transactions: 6000,
        start: (2024, 3, 1),
        end: (2024, 9, 30),
        tokens: &["BTC", "USDT", "USDC"],
        normal_amount: Range::new(10.0, 150.0),
        suspicious_amount: Range::new(100.0, 500.0),
        intermediaries: Range::new(2, 5),
        mix: &[(PatternKind::FanOutFanIn, 10), (PatternKind::PassThrough, 6)],
    },
    Profile {
        name: "darkpool_network",
        project_name: "Privacy Wallet Ecosystem",
        description: "Privacy-focused platform with complex structuring patterns. \
                      Highly fragmented transactions with multiple mixer interactions.",
        wallet_count: 800,
        normal_transactions: 15000,
        start: (2024, 1, 1),
        end: (2024, 12, 31),
        tokens: &["ETH", "BTC", "USDT", "USDC", "DAI"],
        normal_amount: Range::new(0.01, 200.0),
        suspicious_amount: Range::new(75.0, 300.0),
        intermediaries: Range::new(5, 10),
        mix: &[
            (PatternKind::FanOutFanIn, 20),
            (PatternKind::Structuring, 5),
            (PatternKind::Mixer, 4),
            (PatternKind::PeelChain, 3),
        ],
    },
];

/// Every built-in profile, in a fixed order
pub fn all() -> &'static [Profile] {
    &PROFILES
}

/// Look a profile up by name
pub fn find(name: &str) -> Option<&'static Profile> {
    PROFILES.iter().find(|p| p.name == name)
}

impl Profile {
    /// Build the generator configuration for this profile
    pub fn to_config(&self, seed: Option<u64>) -> Result<Config, ValidationError> {
        let mut config = Config::default();

        config.general.seed = seed;
        config.general.wallet_count = self.wallet_count;
        config.general.start = self.date(self.start)?;
        config.general.end = self.date(self.end)?;

        config.tokens.types = self.tokens.iter().map(|t| t.to_string()).collect();
        config.amounts.normal = self.normal_amount;
        config.amounts.suspicious = self.suspicious_amount;
        config.patterns.fan_out_fan_in.intermediaries = self.intermediaries;

        for &kind in PatternKind::SUSPICIOUS.iter() {
            config.patterns.set_count(kind, 0);
        }
        for &(kind, count) in self.mix {
            config.patterns.set_count(kind, count);
        }

        config.general.target_transactions =
            self.normal_transactions + config.patterns.max_suspicious_records();
        Ok(config)
    }

    fn date(&self, (year, month, day): (i32, u32, u32)) -> Result<chrono::NaiveDateTime, ValidationError> {
        midnight(year, month, day).ok_or_else(|| {
            ValidationError::InvalidGeneral(format!(
                "profile {} has an impossible date {:04}-{:02}-{:02}",
                self.name, year, month, day
            ))
        })
    }
}
