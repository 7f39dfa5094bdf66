//! Config loading and persistence.
//!
//! Supplies the unlock threshold, the retry budget and the default prize
//! set used at startup and by administrative resets. TOML on disk,
//! written atomically.

use std::fs;
use std::path::Path;

use serde::{Deserialize, Serialize};
use thiserror::Error;

use crate::core::{CoreError, Prize, PrizeId, Tier, validate_catalog};
use crate::coordinator::DEFAULT_MAX_ATTEMPTS;
use crate::error::{Effect, Transience};

#[derive(Debug, Error)]
#[error("config error: {reason}")]
pub struct ConfigError {
    pub reason: String,
}

impl ConfigError {
    pub fn transience(&self) -> Transience {
        Transience::Permanent
    }

    pub fn effect(&self) -> Effect {
        Effect::None
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct Config {
    /// Global draw count below which tier A stays locked.
    pub unlock_threshold: u64,
    /// Attempt budget for lost stock races within one logical draw.
    pub max_draw_attempts: u32,
    /// Default catalog, used at startup and restored by `reset_all`.
    pub prizes: Vec<PrizeSeed>,
}

impl Default for Config {
    fn default() -> Self {
        Self {
            unlock_threshold: 50,
            max_draw_attempts: DEFAULT_MAX_ATTEMPTS,
            prizes: default_prize_seeds(),
        }
    }
}

/// Serde-friendly prize definition as operators author it. Stock is a
/// single number: seeds always start at full stock.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct PrizeSeed {
    pub id: String,
    pub tier: Tier,
    pub weight: f64,
    pub stock: u32,
    pub title: String,
    #[serde(default)]
    pub description: String,
}

impl PrizeSeed {
    pub fn build(&self) -> Result<Prize, CoreError> {
        Prize::new(
            PrizeId::parse(self.id.clone())?,
            self.tier,
            self.weight,
            self.stock,
            self.title.clone(),
            self.description.clone(),
        )
    }
}

impl Config {
    /// Materialize and validate the default catalog.
    pub fn default_prizes(&self) -> Result<Vec<Prize>, CoreError> {
        let prizes = self
            .prizes
            .iter()
            .map(PrizeSeed::build)
            .collect::<Result<Vec<_>, _>>()?;
        validate_catalog(&prizes)?;
        Ok(prizes)
    }
}

fn default_prize_seeds() -> Vec<PrizeSeed> {
    vec![
        PrizeSeed {
            id: "grand".into(),
            tier: Tier::A,
            weight: 1.0,
            stock: 1,
            title: "Grand prize".into(),
            description: "Cash voucher".into(),
        },
        PrizeSeed {
            id: "lucky-gift".into(),
            tier: Tier::B,
            weight: 10.0,
            stock: 20,
            title: "Lucky gift".into(),
            description: "Gift set".into(),
        },
        PrizeSeed {
            id: "store-credit".into(),
            tier: Tier::C,
            weight: 45.0,
            stock: 200,
            title: "Participation prize".into(),
            description: "Store credit".into(),
        },
        PrizeSeed {
            id: "coupon".into(),
            tier: Tier::C,
            weight: 44.0,
            stock: 10,
            title: "Special prize".into(),
            description: "Free shipping coupon".into(),
        },
    ]
}

pub fn load(path: &Path) -> Result<Config, ConfigError> {
    let contents = fs::read_to_string(path)
        .map_err(|e| config_error(format!("failed to read {}: {e}", path.display())))?;
    toml::from_str(&contents)
        .map_err(|e| config_error(format!("failed to parse {}: {e}", path.display())))
}

/// Load from `path`, falling back to defaults (and writing them out) when
/// the file is missing or unreadable.
pub fn load_or_init(path: &Path) -> Config {
    if path.exists() {
        match load(path) {
            Ok(cfg) => return cfg,
            Err(e) => {
                tracing::warn!("config load failed, using defaults: {e}");
                return Config::default();
            }
        }
    }

    let cfg = Config::default();
    if let Err(e) = write_config(path, &cfg) {
        tracing::warn!("failed to write default config: {e}");
    }
    cfg
}

pub fn write_config(path: &Path, cfg: &Config) -> Result<(), ConfigError> {
    if let Some(dir) = path.parent() {
        fs::create_dir_all(dir)
            .map_err(|e| config_error(format!("failed to create {}: {e}", dir.display())))?;
    }
    let contents = toml::to_string_pretty(cfg)
        .map_err(|e| config_error(format!("failed to render config: {e}")))?;
    atomic_write(path, contents.as_bytes())
}

fn atomic_write(path: &Path, data: &[u8]) -> Result<(), ConfigError> {
    let dir = path
        .parent()
        .ok_or_else(|| config_error("config path missing parent directory".to_string()))?;
    let temp = tempfile::NamedTempFile::new_in(dir).map_err(|e| {
        config_error(format!(
            "failed to create temp file in {}: {e}",
            dir.display()
        ))
    })?;
    fs::write(temp.path(), data)
        .map_err(|e| config_error(format!("failed to write config temp file: {e}")))?;
    temp.persist(path).map_err(|e| {
        config_error(format!(
            "failed to persist config to {}: {e}",
            path.display()
        ))
    })?;
    Ok(())
}

fn config_error(reason: String) -> ConfigError {
    ConfigError { reason }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn config_roundtrip() {
        let dir = tempfile::tempdir().expect("tempdir");
        let path = dir.path().join("config.toml");
        let cfg = Config {
            unlock_threshold: 25,
            max_draw_attempts: 5,
            prizes: vec![PrizeSeed {
                id: "coupon".into(),
                tier: Tier::C,
                weight: 44.0,
                stock: 10,
                title: "Special prize".into(),
                description: String::new(),
            }],
        };
        write_config(&path, &cfg).expect("write config");
        let loaded = load(&path).expect("load config");
        assert_eq!(loaded.unlock_threshold, 25);
        assert_eq!(loaded.max_draw_attempts, 5);
        assert_eq!(loaded.prizes.len(), 1);
        assert_eq!(loaded.prizes[0].id, "coupon");
    }

    #[test]
    fn load_or_init_writes_defaults_for_missing_file() {
        let dir = tempfile::tempdir().expect("tempdir");
        let path = dir.path().join("config.toml");
        let cfg = load_or_init(&path);
        assert_eq!(cfg.unlock_threshold, 50);
        assert!(path.exists());
    }

    #[test]
    fn default_catalog_is_valid_and_gated_correctly() {
        let prizes = Config::default().default_prizes().expect("defaults valid");
        assert_eq!(prizes.len(), 4);
        assert_eq!(prizes.iter().filter(|p| p.tier.is_gated()).count(), 1);
        assert!(prizes.iter().all(|p| p.current_stock == p.total_stock));
    }

    #[test]
    fn bad_seed_id_is_rejected() {
        let mut cfg = Config::default();
        cfg.prizes[0].id = "Not Valid".into();
        assert!(cfg.default_prizes().is_err());
    }
}
