//! Analysis configuration: metric weights, tier quotas and report sizes.
//!
//! Stored as a JSON object on disk, every field optional:
//! ```json
//! {
//!   "weights": { "views": 1.0, "sales_velocity": 1.5, "revenue": 1.5, "hearts": 0.5, "recency": 0.5 },
//!   "tiers": { "a_capacity": 10, "per_keyword_cap": 3, "b_threshold": { "kind": "percentile", "value": 0.5 }, "spillover": false },
//!   "opportunity": { "competition_weight": 0.5 },
//!   "top_n": 5
//! }
//! ```

use anyhow::{Context, Result};
use serde::{Deserialize, Serialize};

use crate::error::ConfigError;

/// Weights for the composite score. Each weight scales one min-max
/// normalized metric; they need not sum to 1.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct WeightConfig {
    pub views: f64,
    pub sales_velocity: f64,
    pub revenue: f64,
    pub hearts: f64,
    pub recency: f64,
}

impl Default for WeightConfig {
    fn default() -> Self {
        Self {
            views: 1.0,
            sales_velocity: 1.5,
            revenue: 1.5,
            hearts: 0.5,
            recency: 0.5,
        }
    }
}

impl WeightConfig {
    /// Weight set that zeroes every component.
    pub fn zero() -> Self {
        Self {
            views: 0.0,
            sales_velocity: 0.0,
            revenue: 0.0,
            hearts: 0.0,
            recency: 0.0,
        }
    }

    pub fn named(&self) -> [(&'static str, f64); 5] {
        [
            ("views", self.views),
            ("sales_velocity", self.sales_velocity),
            ("revenue", self.revenue),
            ("hearts", self.hearts),
            ("recency", self.recency),
        ]
    }

    pub fn total(&self) -> f64 {
        self.named().iter().map(|(_, w)| w).sum()
    }

    pub fn validate(&self) -> Result<(), ConfigError> {
        for (name, value) in self.named() {
            if !value.is_finite() {
                return Err(ConfigError::NonFiniteWeight { name, value });
            }
            if value < 0.0 {
                return Err(ConfigError::NegativeWeight { name, value });
            }
        }

        // The composite never exceeds the weight sum, so a finite sum keeps it finite.
        let total = self.total();
        if !total.is_finite() {
            return Err(ConfigError::NonFiniteWeightTotal { total });
        }
        Ok(())
    }
}

/// Minimum composite score a non-A listing needs to land in tier B.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(tag = "kind", content = "value", rename_all = "snake_case")]
pub enum BThreshold {
    /// Percentile (0.0–1.0) of the pool's composite score distribution.
    Percentile(f64),
    /// Fraction (0.0–1.0) of the highest composite score in the pool.
    Relative(f64),
}

impl Default for BThreshold {
    fn default() -> Self {
        BThreshold::Percentile(0.5)
    }
}

impl BThreshold {
    fn value(&self) -> f64 {
        match *self {
            BThreshold::Percentile(v) | BThreshold::Relative(v) => v,
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct TierConfig {
    pub a_capacity: usize,
    pub per_keyword_cap: usize,
    pub b_threshold: BThreshold,
    /// Fill A slots left empty by the per-keyword cap from the remaining
    /// global order, ignoring the cap.
    pub spillover: bool,
}

impl Default for TierConfig {
    fn default() -> Self {
        Self {
            a_capacity: 10,
            per_keyword_cap: 3,
            b_threshold: BThreshold::default(),
            spillover: false,
        }
    }
}

impl TierConfig {
    pub fn validate(&self) -> Result<(), ConfigError> {
        if self.a_capacity == 0 {
            return Err(ConfigError::NonPositiveCapacity { name: "a_capacity" });
        }
        if self.per_keyword_cap == 0 {
            return Err(ConfigError::NonPositiveCapacity {
                name: "per_keyword_cap",
            });
        }
        let v = self.b_threshold.value();
        if !(0.0..=1.0).contains(&v) {
            return Err(ConfigError::ThresholdOutOfRange { value: v });
        }
        Ok(())
    }
}

/// Parameters of the opportunity blend:
/// `unit_composite * (1 - competition_weight * hearts_norm)`.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct OpportunityConfig {
    pub competition_weight: f64,
}

impl Default for OpportunityConfig {
    fn default() -> Self {
        Self {
            competition_weight: 0.5,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct AnalysisConfig {
    pub weights: WeightConfig,
    pub tiers: TierConfig,
    pub opportunity: OpportunityConfig,
    /// Length of the trending and evergreen lists.
    pub top_n: usize,
}

impl Default for AnalysisConfig {
    fn default() -> Self {
        Self {
            weights: WeightConfig::default(),
            tiers: TierConfig::default(),
            opportunity: OpportunityConfig::default(),
            top_n: 5,
        }
    }
}

impl AnalysisConfig {
    /// Loads the config from a JSON file at `path`. Missing keys take defaults.
    pub fn load(path: &str) -> Result<Self> {
        let content = std::fs::read_to_string(path)
            .with_context(|| format!("failed to read config file '{path}'"))?;
        let config: AnalysisConfig = serde_json::from_str(&content)
            .with_context(|| format!("invalid config JSON in '{path}'"))?;
        Ok(config)
    }

    pub fn validate(&self) -> Result<(), ConfigError> {
        self.weights.validate()?;
        self.tiers.validate()?;

        if self.top_n == 0 {
            return Err(ConfigError::NonPositiveCapacity { name: "top_n" });
        }

        let cw = self.opportunity.competition_weight;
        if !(0.0..=1.0).contains(&cw) {
            return Err(ConfigError::InvalidCompetitionWeight { value: cw });
        }
        Ok(())
    }
}
