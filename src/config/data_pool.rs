use super::traits::{check_probability, ConfigManifest, ConfigSection, FieldManifest};
use crate::error::EvogeneError;
use serde::{Deserialize, Serialize};

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct DataPoolConfig {
    /// Max number of values kept per key
    pub max_size_data_pool: usize,
    /// Max edit distance for a fuzzy key match
    pub threshold_distance_for_data_pool: usize,
    /// Probability of seeding a gene from the pool when sampling
    pub probability_use_data_pool: f64,
}

impl Default for DataPoolConfig {
    fn default() -> Self {
        Self {
            max_size_data_pool: 100,
            threshold_distance_for_data_pool: 2,
            probability_use_data_pool: 0.8,
        }
    }
}

impl ConfigSection for DataPoolConfig {
    fn section_name() -> &'static str {
        "data_pool"
    }

    fn validate(&self) -> Result<(), EvogeneError> {
        if self.max_size_data_pool == 0 {
            return Err(EvogeneError::Configuration(
                "Data pool size must be at least 1".to_string(),
            ));
        }
        check_probability("Data pool usage probability", self.probability_use_data_pool)
    }

    fn to_manifest(&self) -> ConfigManifest {
        ConfigManifest {
            section: "Data Pool".to_string(),
            fields: vec![
                FieldManifest::new(
                    "max_size_data_pool",
                    "integer",
                    serde_json::json!(100),
                    (Some(1.0), None),
                    "Values kept per key, oldest evicted first",
                ),
                FieldManifest::new(
                    "threshold_distance_for_data_pool",
                    "integer",
                    serde_json::json!(2),
                    (Some(0.0), None),
                    "Edit distance tolerated when matching keys",
                ),
                FieldManifest::new(
                    "probability_use_data_pool",
                    "float",
                    serde_json::json!(0.8),
                    (Some(0.0), Some(1.0)),
                    "Chance of reusing an observed value",
                ),
            ],
        }
    }
}
