//! Engine configuration.
//!
//! Every threshold the engine applies lives here as a named constant, and can
//! be overridden from a TOML file. Sections that are absent from the file keep
//! their defaults.

use crate::error::{ConfigError, Result};
use crate::join::DistanceSource;
use serde::{Deserialize, Serialize};
use std::path::Path;

/// Kilometres driven since the last service after which a truck is due.
pub const SERVICE_INTERVAL_KM: f64 = 10_000.0;

/// A document expiring within this many days is flagged.
pub const EXPIRY_WARNING_DAYS: i64 = 30;

/// Multiplier applied to the current rate of an unprofitable high-volume route.
pub const PRICE_INCREASE_FACTOR: f64 = 1.15;

/// Routes whose total tonnage exceeds this quantile count as high volume.
pub const HIGH_VOLUME_PERCENTILE: f64 = 0.75;

/// Number of entries in the "least efficient" and "loss-making" insight lists.
pub const INSIGHTS_TOP_N: usize = 3;

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct ComplianceConfig {
    pub service_interval_km: f64,
    pub expiry_warning_days: i64,
}

impl Default for ComplianceConfig {
    fn default() -> Self {
        Self {
            service_interval_km: SERVICE_INTERVAL_KM,
            expiry_warning_days: EXPIRY_WARNING_DAYS,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct PricingConfig {
    pub price_increase_factor: f64,
    pub volume_percentile: f64,
}

impl Default for PricingConfig {
    fn default() -> Self {
        Self {
            price_increase_factor: PRICE_INCREASE_FACTOR,
            volume_percentile: HIGH_VOLUME_PERCENTILE,
        }
    }
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct JoinConfig {
    /// Where a trip's distance comes from. See [`DistanceSource`].
    pub distance_source: DistanceSource,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct InsightsConfig {
    pub top_n: usize,
}

impl Default for InsightsConfig {
    fn default() -> Self {
        Self {
            top_n: INSIGHTS_TOP_N,
        }
    }
}

/// File names of the five source tables inside the data directory.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct SourceFiles {
    pub operations: String,
    pub tracker: String,
    pub routes: String,
    pub trucks: String,
    pub costs: String,
}

impl Default for SourceFiles {
    fn default() -> Self {
        Self {
            operations: "operations.csv".to_string(),
            tracker: "tracker.csv".to_string(),
            routes: "loi.csv".to_string(),
            trucks: "truck_pak.csv".to_string(),
            costs: "vehicle_cost_schedule.csv".to_string(),
        }
    }
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct EngineConfig {
    pub compliance: ComplianceConfig,
    pub pricing: PricingConfig,
    pub join: JoinConfig,
    pub insights: InsightsConfig,
    pub sources: SourceFiles,
}

impl EngineConfig {
    /// Load a TOML config file. A missing file yields the defaults.
    pub fn load(path: &Path) -> Result<Self> {
        if !path.exists() {
            tracing::debug!("no config at {}, using defaults", path.display());
            return Ok(Self::default());
        }
        let content = std::fs::read_to_string(path)?;
        let config = Self::from_toml(&content)?;
        tracing::info!("loaded config from {}", path.display());
        Ok(config)
    }

    pub fn from_toml(content: &str) -> Result<Self> {
        let config: EngineConfig = toml::from_str(content)?;
        config.validate()?;
        Ok(config)
    }

    pub fn validate(&self) -> std::result::Result<(), ConfigError> {
        let factor = self.pricing.price_increase_factor;
        if !(factor.is_finite() && factor > 0.0) {
            return Err(ConfigError::InvalidPriceFactor(factor));
        }
        let q = self.pricing.volume_percentile;
        if !(0.0..=1.0).contains(&q) {
            return Err(ConfigError::InvalidPercentile(q));
        }
        let interval = self.compliance.service_interval_km;
        if !(interval.is_finite() && interval > 0.0) {
            return Err(ConfigError::InvalidServiceInterval(interval));
        }
        Ok(())
    }
}
