//! Engine configuration.
//!
//! ## Float Normalization for Deterministic Hashing
//!
//! Floats are quantized to integers before hashing so that the
//! configuration fingerprint does not depend on float formatting.

use serde::{Deserialize, Serialize};
use std::path::PathBuf;

use crate::canonical::canonical_hash_hex;

/// Quantization factor for float normalization.
const FLOAT_QUANTIZATION_FACTOR: f64 = 1_000_000.0;

/// Environment variable naming the publication table.
pub const PUBLICATIONS_ENV: &str = "IMPRINT_PUBLICATIONS";
/// Environment variable naming the dynasty lookup table.
pub const DYNASTIES_ENV: &str = "IMPRINT_DYNASTIES";

/// Default publication table location.
pub const DEFAULT_PUBLICATIONS_PATH: &str = "data/Data_knihtisk.csv";
/// Default dynasty lookup location.
pub const DEFAULT_DYNASTIES_PATH: &str = "data/dynastie_přehled.csv";

/// Force-directed layout parameters.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct LayoutConfig {
    /// Seed for the initial node positions.
    pub seed: u64,
    /// Number of relaxation iterations.
    pub iterations: usize,
    /// Half-width of the output box; coordinates land in `[-scale, scale]`.
    pub scale: f64,
}

impl Default for LayoutConfig {
    fn default() -> Self {
        Self {
            seed: 42,
            iterations: 50,
            scale: 1.0,
        }
    }
}

/// Per-session filter memo settings.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct MemoConfig {
    /// Whether filter results are memoized.
    pub enabled: bool,
    /// Maximum number of memoized filter results.
    pub max_entries: usize,
}

impl Default for MemoConfig {
    fn default() -> Self {
        Self {
            enabled: true,
            max_entries: 64,
        }
    }
}

/// Top-level engine configuration.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct EngineConfig {
    /// Network layout settings.
    #[serde(default)]
    pub layout: LayoutConfig,
    /// Filter memo settings.
    #[serde(default)]
    pub memo: MemoConfig,
    /// Minimum rows and columns for a contingency table to be analyzable.
    #[serde(default = "default_min_contingency_dim")]
    pub min_contingency_dim: usize,
}

fn default_min_contingency_dim() -> usize {
    3
}

impl Default for EngineConfig {
    fn default() -> Self {
        Self {
            layout: LayoutConfig::default(),
            memo: MemoConfig::default(),
            min_contingency_dim: default_min_contingency_dim(),
        }
    }
}

impl EngineConfig {
    /// Stable fingerprint of the configuration.
    pub fn params_hash(&self) -> String {
        let quantized = QuantizedEngineConfig {
            seed: self.layout.seed,
            iterations: self.layout.iterations,
            scale: quantize_float(self.layout.scale),
            memo_enabled: self.memo.enabled,
            memo_max_entries: self.memo.max_entries,
            min_contingency_dim: self.min_contingency_dim,
        };
        canonical_hash_hex(&quantized)
    }
}

/// Quantized engine parameters for deterministic hashing.
#[derive(Serialize)]
struct QuantizedEngineConfig {
    seed: u64,
    iterations: usize,
    scale: i64,
    memo_enabled: bool,
    memo_max_entries: usize,
    min_contingency_dim: usize,
}

fn quantize_float(value: f64) -> i64 {
    (value * FLOAT_QUANTIZATION_FACTOR).round() as i64
}

/// Locations of the two backing tables.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct DataPaths {
    /// Publication fact table.
    pub publications: PathBuf,
    /// Printer → dynasty lookup table.
    pub dynasties: PathBuf,
}

impl DataPaths {
    /// Create from explicit paths.
    pub fn new(publications: impl Into<PathBuf>, dynasties: impl Into<PathBuf>) -> Self {
        Self {
            publications: publications.into(),
            dynasties: dynasties.into(),
        }
    }

    /// Read `IMPRINT_PUBLICATIONS` / `IMPRINT_DYNASTIES`, falling back to defaults.
    pub fn from_env() -> Self {
        let publications = std::env::var(PUBLICATIONS_ENV)
            .unwrap_or_else(|_| DEFAULT_PUBLICATIONS_PATH.to_string());
        let dynasties = std::env::var(DYNASTIES_ENV)
            .unwrap_or_else(|_| DEFAULT_DYNASTIES_PATH.to_string());
        Self::new(publications, dynasties)
    }
}

impl Default for DataPaths {
    fn default() -> Self {
        Self::new(DEFAULT_PUBLICATIONS_PATH, DEFAULT_DYNASTIES_PATH)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_params_hash_stable() {
        let a = EngineConfig::default();
        let b = EngineConfig::default();
        assert_eq!(a.params_hash(), b.params_hash());
    }

    #[test]
    fn test_params_hash_tracks_seed() {
        let a = EngineConfig::default();
        let mut b = EngineConfig::default();
        b.layout.seed = 7;
        assert_ne!(a.params_hash(), b.params_hash());
    }

    #[test]
    fn test_default_contingency_minimum() {
        let config = EngineConfig::default();
        assert_eq!(config.min_contingency_dim, 3);

        let empty = crate::aggregate::contingency(
            &crate::types::Relation::empty(),
            crate::types::Dimension::Genre,
            crate::types::Dimension::Language,
        );
        assert!(!empty.is_sufficient(config.min_contingency_dim));
    }

    #[test]
    fn test_partial_config_deserializes() {
        let config: EngineConfig = serde_json::from_str(r#"{"layout":{"seed":1,"iterations":10,"scale":2.0}}"#).unwrap();
        assert_eq!(config.layout.seed, 1);
        assert_eq!(config.memo, MemoConfig::default());
        assert_eq!(config.min_contingency_dim, 3);
    }
}
