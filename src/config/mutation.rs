use super::traits::{check_probability, ConfigManifest, ConfigSection, FieldManifest};
use crate::error::EvogeneError;
use serde::{Deserialize, Serialize};

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct MutationConfig {
    pub taint_analysis_enabled: bool,
    /// Probability of replacing a string with a taint marker, before the floor is applied
    pub base_taint_analysis_probability: f64,
    /// Delegate leaf mutation to the archive-adaptive mutator
    pub adaptive_gene_mutation: bool,
}

impl Default for MutationConfig {
    fn default() -> Self {
        Self {
            taint_analysis_enabled: true,
            base_taint_analysis_probability: 0.9,
            adaptive_gene_mutation: false,
        }
    }
}

impl ConfigSection for MutationConfig {
    fn section_name() -> &'static str {
        "mutation"
    }

    fn validate(&self) -> Result<(), EvogeneError> {
        check_probability(
            "Base taint analysis probability",
            self.base_taint_analysis_probability,
        )?;
        Ok(())
    }

    fn to_manifest(&self) -> ConfigManifest {
        ConfigManifest {
            section: "Mutation".to_string(),
            fields: vec![
                FieldManifest::new(
                    "taint_analysis_enabled",
                    "boolean",
                    serde_json::json!(true),
                    (None, None),
                    "Replace strings with taint markers to discover specializations",
                ),
                FieldManifest::new(
                    "base_taint_analysis_probability",
                    "float",
                    serde_json::json!(0.9),
                    (Some(0.0), Some(1.0)),
                    "Probability of using a taint marker when mutating a string",
                ),
                FieldManifest::new(
                    "adaptive_gene_mutation",
                    "boolean",
                    serde_json::json!(false),
                    (None, None),
                    "Bias string mutation with per-target archive statistics",
                ),
            ],
        }
    }
}
