//! Values observed at runtime, reused to build new inputs.
//!
//! Keys are case-insensitive and stemmed, so data read from `GET /users` under
//! `userId` can later seed the `id` path parameter of `DELETE /users/{id}`.

use crate::config::DataPoolConfig;
use crate::engines::binding::param_util::value_gene_mut;
use crate::engines::mutation::randomness::Randomness;
use crate::genes::{Gene, GeneKind};
use crate::utils::text::bounded_levenshtein;
use log::{debug, trace};
use rust_stemmers::{Algorithm, Stemmer};
use std::collections::{BTreeMap, VecDeque};
use std::fmt;

pub struct DataPool {
    config: DataPoolConfig,
    pool: BTreeMap<String, VecDeque<String>>,
    stemmer: Stemmer,
}

impl fmt::Debug for DataPool {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("DataPool")
            .field("config", &self.config)
            .field("pool", &self.pool)
            .finish()
    }
}

impl DataPool {
    pub fn new(config: DataPoolConfig) -> Self {
        Self {
            config,
            pool: BTreeMap::new(),
            stemmer: Stemmer::create(Algorithm::English),
        }
    }

    /// Lowercase then stem, e.g. "Pets" -> "pet"
    pub fn normalize(&self, s: &str) -> String {
        self.stemmer.stem(&s.to_lowercase()).into_owned()
    }

    pub fn add_value(&mut self, key: &str, data: &str) {
        let key = self.normalize(key);
        let max = self.config.max_size_data_pool;
        let queue = self.pool.entry(key).or_default();
        if queue.iter().any(|v| v == data) {
            return;
        }
        if queue.len() >= max {
            queue.pop_front();
        }
        queue.push_back(data.to_string());
    }

    /// A random value stored under the key closest to `key`, optionally
    /// qualified by the name of the object it belongs to
    pub fn extract_value(
        &self,
        key: &str,
        object_name: Option<&str>,
        rng: &mut Randomness,
    ) -> Option<String> {
        if self.pool.is_empty() {
            return None;
        }

        let k = self.normalize(key);
        let qualified = object_name.map(|name| format!("{}{}", self.normalize(name), k));

        let found = self
            .pool
            .get(&k)
            .map(|_| k.clone())
            .or_else(|| qualified.clone().filter(|q| self.pool.contains_key(q)))
            .or_else(|| self.closest_key(&k))
            .or_else(|| qualified.as_deref().and_then(|q| self.closest_key(q)))
            .or_else(|| {
                let lower = k.to_lowercase();
                self.pool.keys().find(|stored| lower.contains(stored.as_str())).cloned()
            });

        let Some(found) = found else {
            debug!("No pooled data for key {}", key);
            return None;
        };
        trace!("Key {} matched pooled key {}", key, found);
        let values = self.pool.get(&found)?;
        let index = rng.next_index(values.len());
        values.get(index).cloned()
    }

    /// Stored key with the smallest edit distance within the threshold
    fn closest_key(&self, k: &str) -> Option<String> {
        let threshold = self.config.threshold_distance_for_data_pool;
        self.pool
            .keys()
            .filter_map(|stored| bounded_levenshtein(stored, k, threshold).map(|d| (d, stored)))
            .min_by_key(|(d, _)| *d)
            .map(|(_, stored)| stored.clone())
    }

    /// Write a pooled value into `gene`, activating an enclosing optional.
    /// Returns whether the gene was changed.
    pub fn seed_gene(
        &self,
        gene: &mut Gene,
        key: &str,
        object_name: Option<&str>,
        rng: &mut Randomness,
    ) -> bool {
        if !rng.next_bool(self.config.probability_use_data_pool) {
            return false;
        }
        let Some(data) = self.extract_value(key, object_name, rng) else {
            return false;
        };

        let seeded = match &mut value_gene_mut(gene).kind {
            GeneKind::String(g) => {
                if !g.fits(&data) {
                    return false;
                }
                g.value = data;
                g.selected_specialization = None;
                true
            }
            GeneKind::Integer(g) => match data.trim().parse::<i32>() {
                Ok(v) if v >= g.min && v <= g.max => {
                    g.value = v;
                    true
                }
                _ => false,
            },
            GeneKind::Long(g) => match data.trim().parse::<i64>() {
                Ok(v) if v >= g.min && v <= g.max => {
                    g.value = v;
                    true
                }
                _ => false,
            },
            GeneKind::Double(g) => match data.trim().parse::<f64>() {
                Ok(v) => {
                    g.value = v;
                    true
                }
                Err(_) => false,
            },
            GeneKind::Float(g) => match data.trim().parse::<f32>() {
                Ok(v) => {
                    g.value = v;
                    true
                }
                Err(_) => false,
            },
            _ => false,
        };

        if seeded {
            if let GeneKind::Optional(g) = &mut gene.kind {
                g.is_active = true;
            }
        }
        seeded
    }

    /// Values stored under the normalized form of `key`
    pub fn values(&self, key: &str) -> Option<&VecDeque<String>> {
        self.pool.get(&self.normalize(key))
    }

    /// Number of keys
    pub fn len(&self) -> usize {
        self.pool.len()
    }

    pub fn is_empty(&self) -> bool {
        self.pool.is_empty()
    }
}
