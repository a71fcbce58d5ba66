use super::{
    data_pool::DataPoolConfig, mutation::MutationConfig, search::SearchConfig,
    traits::ConfigSection,
};
use crate::error::EvogeneError;
use config::{Environment, File, FileFormat};
use serde::{Deserialize, Serialize};
use std::path::Path;
use std::sync::{Arc, RwLock};

const ENV_PREFIX: &str = "EVOGENE";

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct AppConfig {
    pub search: SearchConfig,
    pub mutation: MutationConfig,
    pub data_pool: DataPoolConfig,
}

impl AppConfig {
    pub fn validate(&self) -> Result<(), EvogeneError> {
        self.search.validate()?;
        self.mutation.validate()?;
        self.data_pool.validate()?;
        Ok(())
    }
}

pub struct ConfigManager {
    config: Arc<RwLock<AppConfig>>,
}

impl ConfigManager {
    pub fn new() -> Self {
        Self {
            config: Arc::new(RwLock::new(AppConfig::default())),
        }
    }

    /// Load a TOML or JSON file, overridden by `EVOGENE__<SECTION>__<FIELD>` variables
    pub fn load_from_file<P: AsRef<Path>>(&self, path: P) -> Result<(), EvogeneError> {
        let settings = config::Config::builder()
            .add_source(File::from(path.as_ref()))
            .add_source(
                Environment::with_prefix(ENV_PREFIX)
                    .separator("__")
                    .try_parsing(true),
            )
            .build()?;

        self.install(settings.try_deserialize()?)
    }

    pub fn load_from_toml_str(&self, contents: &str) -> Result<(), EvogeneError> {
        let settings = config::Config::builder()
            .add_source(File::from_str(contents, FileFormat::Toml))
            .build()?;

        self.install(settings.try_deserialize()?)
    }

    pub fn save_to_file<P: AsRef<Path>>(&self, path: P) -> Result<(), EvogeneError> {
        let toml_str = toml::to_string_pretty(&self.get())?;
        std::fs::write(path, toml_str)?;
        Ok(())
    }

    pub fn get(&self) -> AppConfig {
        self.config
            .read()
            .unwrap_or_else(|poisoned| poisoned.into_inner())
            .clone()
    }

    pub fn update<F>(&self, f: F) -> Result<(), EvogeneError>
    where
        F: FnOnce(&mut AppConfig),
    {
        let mut candidate = self.get();
        f(&mut candidate);
        self.install(candidate)
    }

    fn install(&self, config: AppConfig) -> Result<(), EvogeneError> {
        config.validate()?;
        *self
            .config
            .write()
            .unwrap_or_else(|poisoned| poisoned.into_inner()) = config;
        Ok(())
    }
}

impl Default for ConfigManager {
    fn default() -> Self {
        Self::new()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_defaults_are_valid() {
        assert!(AppConfig::default().validate().is_ok());
    }

    #[test]
    fn test_partial_toml_keeps_defaults() {
        let manager = ConfigManager::new();
        manager
            .load_from_toml_str("[data_pool]\nmax_size_data_pool = 3\n")
            .unwrap();

        let config = manager.get();
        assert_eq!(config.data_pool.max_size_data_pool, 3);
        assert_eq!(config.data_pool.threshold_distance_for_data_pool, 2);
        assert!(config.mutation.taint_analysis_enabled);
    }

    #[test]
    fn test_invalid_update_is_rejected() {
        let manager = ConfigManager::new();
        let result = manager.update(|c| c.mutation.base_taint_analysis_probability = 1.5);

        assert!(result.is_err());
        assert_eq!(manager.get().mutation.base_taint_analysis_probability, 0.9);
    }

    #[test]
    fn test_manifest_lists_fields() {
        let manifest = DataPoolConfig::default().to_manifest();
        assert_eq!(manifest.fields.len(), 3);
        assert_eq!(DataPoolConfig::section_name(), "data_pool");
    }
}
