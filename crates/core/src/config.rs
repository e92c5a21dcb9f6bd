use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;

use crate::ladder::DEFAULT_MAX_RUNGS_PER_LADDER;

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct AppConfig {
    /// Symbol -> USD per point per contract.
    pub instruments: BTreeMap<String, Decimal>,
    #[serde(default)]
    pub limits: LimitsConfig,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct LimitsConfig {
    pub max_rungs_per_ladder: usize,
}

impl Default for LimitsConfig {
    fn default() -> Self {
        Self {
            max_rungs_per_ladder: DEFAULT_MAX_RUNGS_PER_LADDER,
        }
    }
}

impl Default for AppConfig {
    fn default() -> Self {
        let mut instruments = BTreeMap::new();
        instruments.insert("NQ".to_string(), Decimal::from(20));
        instruments.insert("MNQ".to_string(), Decimal::from(2));
        Self {
            instruments,
            limits: LimitsConfig::default(),
        }
    }
}
