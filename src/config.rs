use chrono::{NaiveDate, NaiveDateTime};
use rand::distributions::uniform::SampleUniform;
use rand::Rng;
use regex::Regex;
use serde::{Deserialize, Serialize};
use std::time::Duration;

use crate::topology::builder::AMOUNT_UNIT;
use crate::topology::PatternKind;

/// Top-level generator configuration
#[derive(Debug, Serialize, Deserialize, Clone, Default)]
pub struct Config {
    #[serde(default)]
    pub general: GeneralConfig,
    #[serde(default)]
    pub amounts: AmountConfig,
    #[serde(default)]
    pub tokens: TokenConfig,
    #[serde(default)]
    pub patterns: PatternConfig,
}

impl Config {
    /// Validate the configuration
    pub fn validate(&self) -> Result<(), ValidationError> {
        self.validate_general()?;
        self.validate_amounts()?;
        self.validate_tokens()?;
        self.patterns.validate(&self.amounts)?;

        if self.patterns.mixer.count > 0 && self.general.mixer_count == 0 {
            return Err(ValidationError::InvalidGeneral(
                "mixer_count must be at least 1 when mixer instances are configured".to_string(),
            ));
        }

        Ok(())
    }

    fn validate_general(&self) -> Result<(), ValidationError> {
        let general = &self.general;
        if general.wallet_count < 2 {
            return Err(ValidationError::InvalidGeneral(format!(
                "wallet_count must be at least 2, got {}",
                general.wallet_count
            )));
        }
        if general.end <= general.start {
            return Err(ValidationError::InvalidGeneral(format!(
                "end ({}) must be after start ({})",
                general.end, general.start
            )));
        }
        Ok(())
    }

    fn validate_amounts(&self) -> Result<(), ValidationError> {
        let checks = [
            ("normal", &self.amounts.normal, false),
            ("suspicious", &self.amounts.suspicious, false),
            ("normal_gas_fee", &self.amounts.normal_gas_fee, true),
            ("suspicious_gas_fee", &self.amounts.suspicious_gas_fee, true),
        ];
        for (name, range, allow_zero) in checks {
            if !range.is_ordered() {
                return Err(ValidationError::InvalidAmounts(format!(
                    "{} range is inverted ({} > {})",
                    name, range.min, range.max
                )));
            }
            // transfer amounts are recorded in whole units of AMOUNT_UNIT
            let too_small = if allow_zero { range.min < 0.0 } else { range.min < AMOUNT_UNIT };
            if too_small {
                return Err(ValidationError::InvalidAmounts(format!(
                    "{} minimum must be {}, got {}",
                    name,
                    if allow_zero { "non-negative".to_string() } else { format!("at least {}", AMOUNT_UNIT) },
                    range.min
                )));
            }
        }
        Ok(())
    }

    fn validate_tokens(&self) -> Result<(), ValidationError> {
        if self.tokens.types.is_empty() {
            return Err(ValidationError::InvalidTokens(
                "token type set cannot be empty".to_string(),
            ));
        }

        let symbol = Regex::new(r"^[A-Z0-9]{2,10}$")
            .map_err(|e| ValidationError::InvalidTokens(e.to_string()))?;
        for token in self.tokens.types.iter().chain(std::iter::once(&self.tokens.suspicious)) {
            if !symbol.is_match(token) {
                return Err(ValidationError::InvalidTokens(format!(
                    "'{}' is not a valid token symbol (expected 2-10 uppercase letters or digits)",
                    token
                )));
            }
        }
        Ok(())
    }

    /// Length of the simulated time horizon in whole seconds
    pub fn horizon_seconds(&self) -> i64 {
        (self.general.end - self.general.start).num_seconds()
    }
}

/// Run-wide settings
#[derive(Debug, Serialize, Deserialize, Clone)]
#[serde(default)]
pub struct GeneralConfig {
    /// Seed for the run RNG; drawn from entropy when absent
    #[serde(skip_serializing_if = "Option::is_none")]
    pub seed: Option<u64>,
    pub wallet_count: usize,
    /// Size of the auxiliary mixer address set
    pub mixer_count: usize,
    pub target_transactions: usize,
    pub start: NaiveDateTime,
    pub end: NaiveDateTime,
}

/// Amount and gas fee ranges, in token units
#[derive(Debug, Serialize, Deserialize, Clone)]
#[serde(default)]
pub struct AmountConfig {
    pub normal: Range<f64>,
    pub suspicious: Range<f64>,
    pub normal_gas_fee: Range<f64>,
    pub suspicious_gas_fee: Range<f64>,
}

/// Token labels used for background and suspicious transfers
#[derive(Debug, Serialize, Deserialize, Clone)]
#[serde(default)]
pub struct TokenConfig {
    pub types: Vec<String>,
    /// All suspicious instances move a single token type
    pub suspicious: String,
}

/// Inclusive numeric range
#[derive(Debug, Serialize, Deserialize, Clone, Copy, PartialEq)]
pub struct Range<T> {
    pub min: T,
    pub max: T,
}

impl<T: PartialOrd + Copy> Range<T> {
    pub const fn new(min: T, max: T) -> Self {
        Self { min, max }
    }

    /// A range holding exactly one value
    pub const fn fixed(value: T) -> Self {
        Self { min: value, max: value }
    }

    pub fn is_ordered(&self) -> bool {
        self.min <= self.max
    }

    pub fn contains(&self, value: T) -> bool {
        self.min <= value && value <= self.max
    }
}

impl<T: SampleUniform + PartialOrd + Copy> Range<T> {
    /// Draw a value uniformly from `[min, max]`
    pub fn sample<R: Rng + ?Sized>(&self, rng: &mut R) -> T {
        rng.gen_range(self.min..=self.max)
    }
}

/// Inclusive range of hop delays, written as humantime strings ("30s", "5m")
#[derive(Debug, Serialize, Deserialize, Clone, Copy, PartialEq)]
pub struct DelayRange {
    #[serde(with = "humantime_serde")]
    pub min: Duration,
    #[serde(with = "humantime_serde")]
    pub max: Duration,
}

impl DelayRange {
    pub const fn secs(min: u64, max: u64) -> Self {
        Self {
            min: Duration::from_secs(min),
            max: Duration::from_secs(max),
        }
    }

    pub fn is_ordered(&self) -> bool {
        self.min <= self.max
    }

    /// Draw a whole-second delay uniformly from the range
    pub fn sample<R: Rng + ?Sized>(&self, rng: &mut R) -> chrono::Duration {
        let secs = rng.gen_range(self.min.as_secs()..=self.max.as_secs());
        chrono::Duration::seconds(secs as i64)
    }
}

/// Per-pattern instance counts and shape parameters
#[derive(Debug, Serialize, Deserialize, Clone, Default)]
#[serde(default)]
pub struct PatternConfig {
    pub fan_out_fan_in: FanOutFanInConfig,
    pub circular: CircularConfig,
    pub layering: LayeringConfig,
    pub structuring: StructuringConfig,
    pub pass_through: PassThroughConfig,
    pub peel_chain: PeelChainConfig,
    pub mixer: MixerConfig,
}

#[derive(Debug, Serialize, Deserialize, Clone)]
#[serde(default)]
pub struct FanOutFanInConfig {
    pub count: usize,
    pub intermediaries: Range<usize>,
    /// Per-leg fee taken on the fan-in hop
    pub fee: Range<f64>,
    /// Relative jitter applied to each fan-out leg
    pub split_jitter: f64,
    pub hop_delay: DelayRange,
    pub pause: DelayRange,
}

#[derive(Debug, Serialize, Deserialize, Clone)]
#[serde(default)]
pub struct CircularConfig {
    pub count: usize,
    pub cycle_length: Range<usize>,
    pub fee: Range<f64>,
    pub hop_delay: DelayRange,
}

#[derive(Debug, Serialize, Deserialize, Clone)]
#[serde(default)]
pub struct LayeringConfig {
    pub count: usize,
    pub split_jitter: f64,
    /// Reduction applied on the level-1 to level-2 transition
    pub level_fee: f64,
    /// Reduction applied when level 2 converges on the aggregator
    pub aggregation_fee: f64,
    pub level1_delay: DelayRange,
    pub level2_delay: DelayRange,
    pub aggregation_delay: DelayRange,
    pub level_pause: DelayRange,
}

#[derive(Debug, Serialize, Deserialize, Clone)]
#[serde(default)]
pub struct StructuringConfig {
    pub count: usize,
    pub destinations: Range<usize>,
    /// Reporting threshold every deposit stays below
    pub threshold: f64,
    pub amount: Range<f64>,
    pub hop_delay: DelayRange,
}

#[derive(Debug, Serialize, Deserialize, Clone)]
#[serde(default)]
pub struct PassThroughConfig {
    pub count: usize,
    pub sources: Range<usize>,
    pub destinations: Range<usize>,
    /// Share of accumulated inflow that is forwarded
    pub forward_fraction: Range<f64>,
    pub split_jitter: f64,
    pub inflow_delay: DelayRange,
    pub pause: DelayRange,
    pub outflow_delay: DelayRange,
}

#[derive(Debug, Serialize, Deserialize, Clone)]
#[serde(default)]
pub struct PeelChainConfig {
    pub count: usize,
    /// Number of wallets in the chain
    pub length: Range<usize>,
    pub peel_fraction: Range<f64>,
    pub hop_delay: DelayRange,
}

#[derive(Debug, Serialize, Deserialize, Clone)]
#[serde(default)]
pub struct MixerConfig {
    pub count: usize,
    pub users: Range<usize>,
    /// Share of the pooled inflow the mixer keeps
    pub fee: Range<f64>,
    pub split_jitter: f64,
    pub inflow_delay: DelayRange,
    pub mixing_delay: DelayRange,
    pub outflow_delay: DelayRange,
}

impl PatternConfig {
    /// Configured instance count for a suspicious pattern kind
    pub fn count(&self, kind: PatternKind) -> usize {
        match kind {
            PatternKind::Normal => 0,
            PatternKind::FanOutFanIn => self.fan_out_fan_in.count,
            PatternKind::Circular => self.circular.count,
            PatternKind::Layering => self.layering.count,
            PatternKind::Structuring => self.structuring.count,
            PatternKind::PassThrough => self.pass_through.count,
            PatternKind::PeelChain => self.peel_chain.count,
            PatternKind::Mixer => self.mixer.count,
        }
    }

    pub fn set_count(&mut self, kind: PatternKind, count: usize) {
        match kind {
            PatternKind::Normal => {}
            PatternKind::FanOutFanIn => self.fan_out_fan_in.count = count,
            PatternKind::Circular => self.circular.count = count,
            PatternKind::Layering => self.layering.count = count,
            PatternKind::Structuring => self.structuring.count = count,
            PatternKind::PassThrough => self.pass_through.count = count,
            PatternKind::PeelChain => self.peel_chain.count = count,
            PatternKind::Mixer => self.mixer.count = count,
        }
    }

    /// Total number of configured suspicious instances
    pub fn total_instances(&self) -> usize {
        PatternKind::SUSPICIOUS.iter().map(|&kind| self.count(kind)).sum()
    }

    /// Distinct pool wallets the largest instance of `kind` draws.
    /// Mixer addresses live outside the pool and are not counted.
    pub fn max_wallets(&self, kind: PatternKind) -> usize {
        match kind {
            PatternKind::Normal => 2,
            PatternKind::FanOutFanIn => self.fan_out_fan_in.intermediaries.max + 2,
            PatternKind::Circular => self.circular.cycle_length.max,
            PatternKind::Layering => crate::topology::layering::WALLETS,
            PatternKind::Structuring => self.structuring.destinations.max + 1,
            PatternKind::PassThrough => {
                self.pass_through.sources.max + self.pass_through.destinations.max + 1
            }
            PatternKind::PeelChain => self.peel_chain.length.max,
            PatternKind::Mixer => self.mixer.users.max * 2,
        }
    }

    /// Records produced by one instance of `kind`, as an inclusive range
    pub fn records_per_instance(&self, kind: PatternKind) -> Range<usize> {
        match kind {
            PatternKind::Normal => Range::fixed(1),
            PatternKind::FanOutFanIn => {
                let k = self.fan_out_fan_in.intermediaries;
                Range::new(k.min * 2, k.max * 2)
            }
            PatternKind::Circular => self.circular.cycle_length,
            PatternKind::Layering => Range::fixed(crate::topology::layering::RECORDS),
            PatternKind::Structuring => self.structuring.destinations,
            PatternKind::PassThrough => {
                let p = &self.pass_through;
                Range::new(p.sources.min + p.destinations.min, p.sources.max + p.destinations.max)
            }
            PatternKind::PeelChain => {
                let l = self.peel_chain.length;
                Range::new(l.min.saturating_sub(1), l.max.saturating_sub(1))
            }
            PatternKind::Mixer => {
                let u = self.mixer.users;
                Range::new(u.min * 2, u.max * 2)
            }
        }
    }

    /// Fewest suspicious records the configured mix can produce
    pub fn min_suspicious_records(&self) -> usize {
        PatternKind::SUSPICIOUS
            .iter()
            .map(|&kind| self.count(kind) * self.records_per_instance(kind).min)
            .sum()
    }

    /// Most suspicious records the configured mix can produce
    pub fn max_suspicious_records(&self) -> usize {
        PatternKind::SUSPICIOUS
            .iter()
            .map(|&kind| self.count(kind) * self.records_per_instance(kind).max)
            .sum()
    }

    fn validate(&self, amounts: &AmountConfig) -> Result<(), ValidationError> {
        use PatternKind::*;

        let fan = &self.fan_out_fan_in;
        check_size(FanOutFanIn, "intermediaries", fan.intermediaries, 1)?;
        check_fraction(FanOutFanIn, "fee", fan.fee)?;
        check_jitter(FanOutFanIn, fan.split_jitter)?;
        check_delays(FanOutFanIn, &[("hop_delay", fan.hop_delay), ("pause", fan.pause)])?;

        let circular = &self.circular;
        check_size(Circular, "cycle_length", circular.cycle_length, 3)?;
        check_fraction(Circular, "fee", circular.fee)?;
        check_delays(Circular, &[("hop_delay", circular.hop_delay)])?;

        let layering = &self.layering;
        check_jitter(Layering, layering.split_jitter)?;
        check_fraction(Layering, "level_fee", Range::fixed(layering.level_fee))?;
        check_fraction(Layering, "aggregation_fee", Range::fixed(layering.aggregation_fee))?;
        check_delays(
            Layering,
            &[
                ("level1_delay", layering.level1_delay),
                ("level2_delay", layering.level2_delay),
                ("aggregation_delay", layering.aggregation_delay),
                ("level_pause", layering.level_pause),
            ],
        )?;

        let structuring = &self.structuring;
        check_size(Structuring, "destinations", structuring.destinations, 1)?;
        if !structuring.amount.is_ordered() || structuring.amount.min < AMOUNT_UNIT {
            return Err(invalid(Structuring, "amount range must be positive and ordered"));
        }
        if structuring.amount.max >= structuring.threshold {
            return Err(invalid(
                Structuring,
                &format!(
                    "amount maximum {} must stay below threshold {}",
                    structuring.amount.max, structuring.threshold
                ),
            ));
        }
        check_delays(Structuring, &[("hop_delay", structuring.hop_delay)])?;

        let pass = &self.pass_through;
        check_size(PassThrough, "sources", pass.sources, 1)?;
        check_size(PassThrough, "destinations", pass.destinations, 1)?;
        let forward = pass.forward_fraction;
        if !forward.is_ordered() || forward.min <= 0.0 || forward.max > 1.0 {
            return Err(invalid(PassThrough, "forward_fraction must lie within (0, 1]"));
        }
        check_jitter(PassThrough, pass.split_jitter)?;
        check_delays(
            PassThrough,
            &[
                ("inflow_delay", pass.inflow_delay),
                ("pause", pass.pause),
                ("outflow_delay", pass.outflow_delay),
            ],
        )?;

        let peel = &self.peel_chain;
        check_size(PeelChain, "length", peel.length, 2)?;
        check_fraction(PeelChain, "peel_fraction", peel.peel_fraction)?;
        if peel.peel_fraction.min <= 0.0 {
            return Err(invalid(PeelChain, "peel_fraction must be strictly positive"));
        }
        check_delays(PeelChain, &[("hop_delay", peel.hop_delay)])?;

        let mixer = &self.mixer;
        check_size(Mixer, "users", mixer.users, 1)?;
        check_fraction(Mixer, "fee", mixer.fee)?;
        check_jitter(Mixer, mixer.split_jitter)?;
        check_delays(
            Mixer,
            &[
                ("inflow_delay", mixer.inflow_delay),
                ("mixing_delay", mixer.mixing_delay),
                ("outflow_delay", mixer.outflow_delay),
            ],
        )?;

        if !amounts.suspicious.is_ordered() {
            return Err(ValidationError::InvalidAmounts(
                "suspicious range is inverted".to_string(),
            ));
        }

        Ok(())
    }
}

fn invalid(pattern: PatternKind, reason: &str) -> ValidationError {
    ValidationError::InvalidPattern {
        pattern,
        reason: reason.to_string(),
    }
}

fn check_size(
    pattern: PatternKind,
    name: &str,
    range: Range<usize>,
    minimum: usize,
) -> Result<(), ValidationError> {
    if !range.is_ordered() {
        return Err(invalid(pattern, &format!("{} range is inverted ({} > {})", name, range.min, range.max)));
    }
    if range.min < minimum {
        return Err(invalid(pattern, &format!("{} must be at least {}, got {}", name, minimum, range.min)));
    }
    Ok(())
}

fn check_fraction(pattern: PatternKind, name: &str, range: Range<f64>) -> Result<(), ValidationError> {
    if !range.is_ordered() || range.min < 0.0 || range.max >= 1.0 {
        return Err(invalid(
            pattern,
            &format!("{} must be an ordered range within [0, 1), got {}..{}", name, range.min, range.max),
        ));
    }
    Ok(())
}

fn check_jitter(pattern: PatternKind, jitter: f64) -> Result<(), ValidationError> {
    if !(0.0..1.0).contains(&jitter) {
        return Err(invalid(pattern, &format!("split_jitter must lie within [0, 1), got {}", jitter)));
    }
    Ok(())
}

fn check_delays(pattern: PatternKind, delays: &[(&str, DelayRange)]) -> Result<(), ValidationError> {
    for (name, delay) in delays {
        if !delay.is_ordered() {
            return Err(invalid(pattern, &format!("{} range is inverted", name)));
        }
    }
    Ok(())
}

/// Configuration validation errors
#[derive(Debug, thiserror::Error)]
pub enum ValidationError {
    #[error("Invalid general configuration: {0}")]
    InvalidGeneral(String),
    #[error("Invalid amount configuration: {0}")]
    InvalidAmounts(String),
    #[error("Invalid token configuration: {0}")]
    InvalidTokens(String),
    #[error("Invalid {pattern} configuration: {reason}")]
    InvalidPattern { pattern: PatternKind, reason: String },
}

/// Midnight on the given calendar day, `None` if the date does not exist
pub(crate) fn midnight(year: i32, month: u32, day: u32) -> Option<NaiveDateTime> {
    NaiveDate::from_ymd_opt(year, month, day).and_then(|date| date.and_hms_opt(0, 0, 0))
}

/// Default implementations
impl Default for GeneralConfig {
    fn default() -> Self {
        Self {
            seed: None,
            wallet_count: 500,
            mixer_count: 3,
            target_transactions: 10_000,
            // literal calendar dates; test_empty_config_uses_defaults pins them
            start: midnight(2024, 1, 1).unwrap_or_default(),
            end: midnight(2024, 12, 31).unwrap_or_default(),
        }
    }
}

impl Default for AmountConfig {
    fn default() -> Self {
        Self {
            normal: Range::new(0.1, 50.0),
            suspicious: Range::new(10.0, 100.0),
            normal_gas_fee: Range::new(0.001, 0.1),
            suspicious_gas_fee: Range::new(0.001, 0.05),
        }
    }
}

impl Default for TokenConfig {
    fn default() -> Self {
        Self {
            types: ["ETH", "BTC", "USDT", "USDC", "DAI"].iter().map(|t| t.to_string()).collect(),
            suspicious: "ETH".to_string(),
        }
    }
}

impl Default for FanOutFanInConfig {
    fn default() -> Self {
        Self {
            count: 15,
            intermediaries: Range::new(4, 8),
            fee: Range::new(0.01, 0.05),
            split_jitter: 0.05,
            hop_delay: DelayRange::secs(5, 300),
            pause: DelayRange::secs(60, 300),
        }
    }
}

impl Default for CircularConfig {
    fn default() -> Self {
        Self {
            count: 5,
            cycle_length: Range::new(3, 6),
            fee: Range::new(0.01, 0.03),
            hop_delay: DelayRange::secs(30, 180),
        }
    }
}

impl Default for LayeringConfig {
    fn default() -> Self {
        Self {
            count: 3,
            split_jitter: 0.02,
            level_fee: 0.05,
            aggregation_fee: 0.10,
            level1_delay: DelayRange::secs(20, 60),
            level2_delay: DelayRange::secs(15, 45),
            aggregation_delay: DelayRange::secs(10, 40),
            level_pause: DelayRange::secs(120, 400),
        }
    }
}

impl Default for StructuringConfig {
    fn default() -> Self {
        Self {
            count: 3,
            destinations: Range::new(15, 25),
            threshold: 10.0,
            amount: Range::new(9.0, 9.99),
            hop_delay: DelayRange::secs(5, 30),
        }
    }
}

impl Default for PassThroughConfig {
    fn default() -> Self {
        Self {
            count: 4,
            sources: Range::new(3, 6),
            destinations: Range::new(3, 6),
            forward_fraction: Range::new(0.90, 0.95),
            split_jitter: 0.05,
            inflow_delay: DelayRange::secs(10, 60),
            pause: DelayRange::secs(30, 120),
            outflow_delay: DelayRange::secs(10, 60),
        }
    }
}

impl Default for PeelChainConfig {
    fn default() -> Self {
        Self {
            count: 5,
            length: Range::new(5, 8),
            peel_fraction: Range::new(0.10, 0.20),
            hop_delay: DelayRange::secs(60, 300),
        }
    }
}

impl Default for MixerConfig {
    fn default() -> Self {
        Self {
            count: 2,
            users: Range::new(4, 7),
            fee: Range::new(0.025, 0.035),
            split_jitter: 0.05,
            inflow_delay: DelayRange::secs(30, 180),
            mixing_delay: DelayRange::secs(600, 1800),
            outflow_delay: DelayRange::secs(20, 120),
        }
    }
}
