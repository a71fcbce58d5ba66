use super::individual::Individual;
use crate::types::TargetId;
use log::{debug, info};
use std::collections::{BTreeMap, HashSet};

/// Heuristic value of a covered target
pub const COVERED: f64 = 1.0;

#[derive(Debug, Clone)]
pub struct ArchivedIndividual {
    pub individual: Individual,
    /// In [0, 1], [`COVERED`] once the target is reached
    pub heuristic: f64,
    /// Order of insertion into the archive
    pub discovered_at: u64,
}

impl ArchivedIndividual {
    /// Higher heuristic wins, then fewer calls, then earlier discovery
    fn is_better_than(&self, other: &ArchivedIndividual) -> bool {
        if self.heuristic != other.heuristic {
            return self.heuristic > other.heuristic;
        }
        if self.individual.size() != other.individual.size() {
            return self.individual.size() < other.individual.size();
        }
        self.discovered_at < other.discovered_at
    }
}

/// Best individual found so far for each coverage target
#[derive(Debug, Default)]
pub struct CoverageArchive {
    best: BTreeMap<TargetId, ArchivedIndividual>,
    seen_signatures: HashSet<String>,
    counter: u64,
}

impl CoverageArchive {
    pub fn new() -> Self {
        Self::default()
    }

    /// Offer an evaluated individual; returns whether it became the best
    /// for at least one target
    pub fn try_add(&mut self, individual: &Individual, heuristics: &BTreeMap<TargetId, f64>) -> bool {
        let signature = individual.canonical_string();
        if self.seen_signatures.contains(&signature) {
            return false;
        }

        self.counter += 1;
        let mut added = false;
        for (&target, &heuristic) in heuristics {
            if heuristic <= 0.0 {
                continue;
            }
            let candidate = ArchivedIndividual {
                individual: individual.clone(),
                heuristic,
                discovered_at: self.counter,
            };
            let replace = self
                .best
                .get(&target)
                .map_or(true, |current| candidate.is_better_than(current));
            if replace {
                debug!("Target {} now at heuristic {}", target, heuristic);
                self.best.insert(target, candidate);
                added = true;
            }
        }
        if added {
            self.seen_signatures.insert(signature);
        }
        added
    }

    pub fn best(&self, target: TargetId) -> Option<&ArchivedIndividual> {
        self.best.get(&target)
    }

    pub fn covered_targets(&self) -> Vec<TargetId> {
        self.best
            .iter()
            .filter(|(_, a)| a.heuristic >= COVERED)
            .map(|(t, _)| *t)
            .collect()
    }

    /// Current heuristic of every tracked target
    pub fn heuristics(&self) -> BTreeMap<TargetId, f64> {
        self.best.iter().map(|(t, a)| (*t, a.heuristic)).collect()
    }

    pub fn len(&self) -> usize {
        self.best.len()
    }

    pub fn is_empty(&self) -> bool {
        self.best.is_empty()
    }

    /// Replace the individual of each covered target by its shortest prefix
    /// of calls still covering it. Returns the number of shortened ones.
    pub fn minimize_actions_per_covered_target<F>(&mut self, mut evaluate: F) -> usize
    where
        F: FnMut(&Individual) -> BTreeMap<TargetId, f64>,
    {
        let mut minimized = 0;
        for target in self.covered_targets() {
            let Some(archived) = self.best.get_mut(&target) else {
                continue;
            };
            let size = archived.individual.size();
            for n in 1..size {
                let candidate = archived.individual.truncated(n);
                let covered = evaluate(&candidate)
                    .get(&target)
                    .map_or(false, |h| *h >= COVERED);
                if covered {
                    debug!("Target {} covered with {} of {} calls", target, n, size);
                    archived.individual = candidate;
                    minimized += 1;
                    break;
                }
            }
        }
        info!("Minimized {} covering individuals", minimized);
        minimized
    }
}
