use crate::config::Config;
use color_eyre::eyre::Context;
use color_eyre::Result;
use log::{info, warn};
use std::fs::{self, File};
use std::path::Path;

/// Load and parse configuration from a YAML file
pub fn load_config(config_path: &Path) -> Result<Config> {
    info!("Loading configuration from: {:?}", config_path);

    let file = File::open(config_path)
        .with_context(|| format!("Failed to open configuration file {}", config_path.display()))?;

    let config: Config = serde_yaml::from_reader(file)
        .with_context(|| format!("Failed to parse configuration file {}", config_path.display()))?;

    config.validate()?;

    info!(
        "Configuration loaded: {} wallets, {} suspicious instances, target {} transactions",
        config.general.wallet_count,
        config.patterns.total_instances(),
        config.general.target_transactions
    );
    Ok(config)
}

/// Write a resolved configuration as YAML, next to a generated dataset
pub fn write_config(config: &Config, config_path: &Path) -> Result<()> {
    let yaml = serde_yaml::to_string(config).context("Failed to serialize configuration")?;
    fs::write(config_path, yaml)
        .with_context(|| format!("Failed to write configuration to {}", config_path.display()))?;
    Ok(())
}

/// CLI arguments that can override YAML settings
#[derive(Debug, Clone, Default)]
pub struct CliOverrides {
    pub seed: Option<u64>,
    pub target: Option<usize>,
    pub wallets: Option<usize>,
}

/// Apply CLI overrides to a configuration
pub fn apply_overrides(config: &mut Config, overrides: &CliOverrides) -> Result<()> {
    if let Some(seed) = overrides.seed {
        info!("Overriding seed: {}", seed);
        config.general.seed = Some(seed);
    }

    if let Some(target) = overrides.target {
        info!(
            "Overriding target transactions: {} -> {}",
            config.general.target_transactions, target
        );
        config.general.target_transactions = target;
    }

    if let Some(wallets) = overrides.wallets {
        info!("Overriding wallet count: {} -> {}", config.general.wallet_count, wallets);
        config.general.wallet_count = wallets;
    }

    let minimum = config.patterns.max_suspicious_records();
    if config.general.target_transactions < minimum {
        warn!(
            "Target of {} transactions may be exceeded by up to {} suspicious records",
            config.general.target_transactions, minimum
        );
    }

    // Re-validate after applying overrides
    config.validate()?;

    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::topology::PatternKind;
    use std::io::Write;
    use std::time::Duration;
    use tempfile::{NamedTempFile, TempDir};

    #[test]
    fn test_load_config() {
        let yaml = r#"
general:
  seed: 42
  wallet_count: 200
  target_transactions: 3000
patterns:
  circular:
    count: 2
    hop_delay: { min: "1m", max: "2m" }
"#;

        let mut temp_file = NamedTempFile::new().unwrap();
        write!(temp_file, "{}", yaml).unwrap();

        let config = load_config(temp_file.path()).unwrap();
        assert_eq!(config.general.seed, Some(42));
        assert_eq!(config.general.wallet_count, 200);
        assert_eq!(config.patterns.count(PatternKind::Circular), 2);
        assert_eq!(config.patterns.circular.hop_delay.max, Duration::from_secs(120));
        // untouched sections keep their defaults
        assert_eq!(config.patterns.count(PatternKind::FanOutFanIn), 15);
    }

    #[test]
    fn test_load_rejects_invalid_config() {
        let yaml = r#"
tokens:
  types: ["eth"]
"#;

        let mut temp_file = NamedTempFile::new().unwrap();
        write!(temp_file, "{}", yaml).unwrap();

        let err = load_config(temp_file.path()).unwrap_err();
        assert!(err.to_string().contains("eth"));
    }

    #[test]
    fn test_load_missing_file() {
        let err = load_config(Path::new("/nonexistent/config.yaml")).unwrap_err();
        assert!(err.to_string().contains("Failed to open"));
    }

    #[test]
    fn test_apply_overrides() {
        let mut config = Config::default();
        let overrides = CliOverrides {
            seed: Some(9),
            target: Some(5000),
            wallets: Some(120),
        };

        apply_overrides(&mut config, &overrides).unwrap();
        assert_eq!(config.general.seed, Some(9));
        assert_eq!(config.general.target_transactions, 5000);
        assert_eq!(config.general.wallet_count, 120);

        let invalid = CliOverrides {
            wallets: Some(1),
            ..Default::default()
        };
        assert!(apply_overrides(&mut config, &invalid).is_err());
    }

    #[test]
    fn test_written_config_loads_back() {
        let mut config = Config::default();
        config.general.seed = Some(77);
        config.patterns.mixer.count = 6;

        let dir = TempDir::new().unwrap();
        let path = dir.path().join("resolved.yaml");
        write_config(&config, &path).unwrap();

        let loaded = load_config(&path).unwrap();
        assert_eq!(loaded.general.seed, Some(77));
        assert_eq!(loaded.patterns.mixer.count, 6);
        assert_eq!(loaded.patterns.mixer.mixing_delay, config.patterns.mixer.mixing_delay);
    }
}
