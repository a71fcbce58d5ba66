use super::randomness::Randomness;
use crate::config::MutationConfig;

/// Moves mutation parameters from exploration to exploitation as the search
/// budget is consumed
#[derive(Debug, Clone)]
pub struct AdaptiveParameterControl {
    focused_search_activation_time: f64,
    config: MutationConfig,
    used_budget: f64,
}

impl AdaptiveParameterControl {
    pub fn new(focused_search_activation_time: f64, config: MutationConfig) -> Self {
        Self {
            focused_search_activation_time,
            config,
            used_budget: 0.0,
        }
    }

    pub fn config(&self) -> &MutationConfig {
        &self.config
    }

    pub fn record_progress(&mut self, used: usize, total: usize) {
        self.used_budget = if total == 0 {
            1.0
        } else {
            (used as f64 / total as f64).clamp(0.0, 1.0)
        };
    }

    pub fn used_budget(&self) -> f64 {
        self.used_budget
    }

    pub fn does_focus_search(&self) -> bool {
        self.used_budget >= self.focused_search_activation_time
    }

    /// Linear interpolation from `start` to `end`, reaching `end` when the
    /// focused phase begins
    pub fn exploratory_value(&self, start: u32, end: u32) -> u32 {
        if self.does_focus_search() || self.focused_search_activation_time <= 0.0 {
            return end;
        }
        let ratio = self.used_budget / self.focused_search_activation_time;
        let value = start as f64 + (end as f64 - start as f64) * ratio;
        value.round() as u32
    }

    pub fn base_taint_analysis_probability(&self, min: f64) -> f64 {
        if !self.config.taint_analysis_enabled {
            return 0.0;
        }
        self.config.base_taint_analysis_probability.max(min)
    }
}

/// A power of two in `[1, range]`, drawn among the first `k` exponents where
/// `k` shrinks from `start` to `end` over the search
pub fn delta(
    rng: &mut Randomness,
    apc: &AdaptiveParameterControl,
    range: u64,
    start: u32,
    end: u32,
) -> i64 {
    let k = apc.exploratory_value(start, end).max(1);
    let mut exponents = 1;
    while exponents < k && (1u64 << exponents) <= range {
        exponents += 1;
    }
    1i64 << rng.next_index(exponents as usize)
}
