use super::traits::{check_probability, ConfigManifest, ConfigSection, FieldManifest};
use crate::error::EvogeneError;
use serde::{Deserialize, Serialize};

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct SearchConfig {
    /// Fixed seed for reproducible runs, entropy otherwise
    pub seed: Option<u64>,
    /// Fraction of the budget after which the search narrows down
    pub focused_search_activation_time: f64,
    /// Number of mutation/evaluation cycles in a session
    pub max_evaluations: usize,
    pub max_actions: usize,
}

impl Default for SearchConfig {
    fn default() -> Self {
        Self {
            seed: None,
            focused_search_activation_time: 0.8,
            max_evaluations: 1000,
            max_actions: 10,
        }
    }
}

impl ConfigSection for SearchConfig {
    fn section_name() -> &'static str {
        "search"
    }

    fn validate(&self) -> Result<(), EvogeneError> {
        check_probability(
            "Focused search activation time",
            self.focused_search_activation_time,
        )?;
        if self.max_evaluations == 0 {
            return Err(EvogeneError::Configuration(
                "Max evaluations must be positive".to_string(),
            ));
        }
        if self.max_actions == 0 {
            return Err(EvogeneError::Configuration(
                "Max actions must be positive".to_string(),
            ));
        }
        Ok(())
    }

    fn to_manifest(&self) -> ConfigManifest {
        ConfigManifest {
            section: "Search".to_string(),
            fields: vec![
                FieldManifest::new(
                    "seed",
                    "integer",
                    serde_json::Value::Null,
                    (Some(0.0), None),
                    "Seed of the random generator",
                ),
                FieldManifest::new(
                    "focused_search_activation_time",
                    "float",
                    serde_json::json!(0.8),
                    (Some(0.0), Some(1.0)),
                    "Used budget fraction after which the search is focused",
                ),
                FieldManifest::new(
                    "max_evaluations",
                    "integer",
                    serde_json::json!(1000),
                    (Some(1.0), None),
                    "Mutation/evaluation cycles per session",
                ),
                FieldManifest::new(
                    "max_actions",
                    "integer",
                    serde_json::json!(10),
                    (Some(1.0), None),
                    "Max actions in an individual",
                ),
            ],
        }
    }
}
