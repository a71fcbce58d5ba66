//! Archive-adaptive string mutation.
//!
//! Each string gene keeps, per coverage target, how past edits affected the
//! heuristic of that target. Length edits (grow/shrink) and character edits
//! (per position, up/down) are tracked separately and turned into weights
//! that bias the next mutation.

use super::randomness::Randomness;
use crate::error::{EvogeneError, Result};
use crate::genes::StringGene;
use crate::types::{EvaluatedMutation, TargetId};
use log::{debug, trace, warn};
use std::collections::BTreeMap;

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct OutcomeStats {
    pub improved: u64,
    pub neutral: u64,
    pub worsened: u64,
}

impl OutcomeStats {
    pub fn record(&mut self, outcome: EvaluatedMutation) {
        match outcome {
            EvaluatedMutation::BetterThan => self.improved += 1,
            EvaluatedMutation::EqualWith => self.neutral += 1,
            EvaluatedMutation::WorseThan => self.worsened += 1,
        }
    }

    pub fn total(&self) -> u64 {
        self.improved + self.neutral + self.worsened
    }

    /// In (0, 1): 0.5 without history, towards 1 with improvements
    pub fn weight(&self) -> f64 {
        (2 * self.improved + self.neutral + 1) as f64 / (2 * self.total() + 2) as f64
    }

    fn merge(&mut self, other: &OutcomeStats) {
        self.improved += other.improved;
        self.neutral += other.neutral;
        self.worsened += other.worsened;
    }
}

#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct CharStats {
    pub up: OutcomeStats,
    pub down: OutcomeStats,
}

impl CharStats {
    fn total(&self) -> u64 {
        self.up.total() + self.down.total()
    }

    fn weight(&self) -> f64 {
        self.up.weight().max(self.down.weight())
    }
}

/// Record of one string gene for one coverage target
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct StringArchiveRecord {
    pub grow: OutcomeStats,
    pub shrink: OutcomeStats,
    /// Indexed by char position
    pub chars: Vec<CharStats>,
}

impl StringArchiveRecord {
    pub fn total_observations(&self) -> u64 {
        self.grow.total() + self.shrink.total() + self.chars.iter().map(CharStats::total).sum::<u64>()
    }

    fn char_stats_mut(&mut self, index: usize) -> &mut CharStats {
        if self.chars.len() <= index {
            self.chars.resize(index + 1, CharStats::default());
        }
        &mut self.chars[index]
    }

    fn char_stats(&self, index: usize) -> CharStats {
        self.chars.get(index).cloned().unwrap_or_default()
    }

    fn merge(&mut self, other: &StringArchiveRecord) {
        self.grow.merge(&other.grow);
        self.shrink.merge(&other.shrink);
        for (i, stats) in other.chars.iter().enumerate() {
            let mine = self.char_stats_mut(i);
            mine.up.merge(&stats.up);
            mine.down.merge(&stats.down);
        }
    }
}

/// The kind of edit between two string values
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum StringEdit {
    Unchanged,
    Length { grow: bool },
    /// Changed positions, with whether the code point went up
    Chars(Vec<(usize, bool)>),
}

impl StringEdit {
    /// An edit must be purely a length change or purely char replacements
    pub fn classify(previous: &str, mutated: &str) -> Result<StringEdit> {
        let a: Vec<char> = previous.chars().collect();
        let b: Vec<char> = mutated.chars().collect();

        if a.len() != b.len() {
            let shorter = a.len().min(b.len());
            let prefix = a.iter().zip(&b).take_while(|(x, y)| x == y).count();
            let suffix = a
                .iter()
                .rev()
                .zip(b.iter().rev())
                .take(shorter - prefix)
                .take_while(|(x, y)| x == y)
                .count();
            if prefix + suffix < shorter {
                return Err(EvogeneError::InvariantViolation(format!(
                    "'{}' -> '{}' changes both length and characters",
                    previous, mutated
                )));
            }
            return Ok(StringEdit::Length {
                grow: b.len() > a.len(),
            });
        }

        let diffs: Vec<(usize, bool)> = a
            .iter()
            .zip(&b)
            .enumerate()
            .filter(|(_, (x, y))| x != y)
            .map(|(i, (x, y))| (i, y > x))
            .collect();
        if diffs.is_empty() {
            Ok(StringEdit::Unchanged)
        } else {
            Ok(StringEdit::Chars(diffs))
        }
    }
}

/// Adaptive records of one string gene, keyed by coverage target
#[derive(Debug, Clone, Default)]
pub struct StringArchiveInfo {
    records: BTreeMap<TargetId, StringArchiveRecord>,
}

impl StringArchiveInfo {
    pub fn record(&self, target: TargetId) -> Option<&StringArchiveRecord> {
        self.records.get(&target)
    }

    pub fn total_observations(&self, target: TargetId) -> u64 {
        self.records
            .get(&target)
            .map_or(0, StringArchiveRecord::total_observations)
    }

    pub fn is_empty(&self) -> bool {
        self.records.is_empty()
    }

    /// Sum of the records of `targets`, or of all records if none given
    pub fn merged(&self, targets: &[TargetId]) -> StringArchiveRecord {
        let mut merged = StringArchiveRecord::default();
        if targets.is_empty() {
            self.records.values().for_each(|r| merged.merge(r));
        } else {
            targets
                .iter()
                .filter_map(|t| self.records.get(t))
                .for_each(|r| merged.merge(r));
        }
        merged
    }

    /// Fold the outcome of `previous -> mutated` into the records of every
    /// evaluated target
    pub fn update(
        &mut self,
        previous: &str,
        mutated: &str,
        evaluated: &BTreeMap<TargetId, EvaluatedMutation>,
    ) {
        let edit = match StringEdit::classify(previous, mutated) {
            Ok(edit) => edit,
            Err(e) => {
                warn!("Skipping archive update: {}", e);
                return;
            }
        };

        for (target, outcome) in evaluated {
            match &edit {
                StringEdit::Unchanged => {
                    debug!("No string edit to record for target {}", target);
                    return;
                }
                StringEdit::Length { grow } => {
                    let record = self.records.entry(*target).or_default();
                    if *grow {
                        record.grow.record(*outcome);
                    } else {
                        record.shrink.record(*outcome);
                    }
                }
                StringEdit::Chars(diffs) => {
                    let record = self.records.entry(*target).or_default();
                    for (index, up) in diffs {
                        let stats = record.char_stats_mut(*index);
                        if *up {
                            stats.up.record(*outcome);
                        } else {
                            stats.down.record(*outcome);
                        }
                    }
                }
            }
        }
    }
}

/// Mutates strings according to their adaptive records
#[derive(Debug, Clone, Default)]
pub struct ArchiveGeneMutator;

impl ArchiveGeneMutator {
    pub fn new() -> Self {
        Self
    }

    pub fn mutate_string(
        &self,
        gene: &mut StringGene,
        targets: &[TargetId],
        rng: &mut Randomness,
    ) -> bool {
        let record = gene.mutation_info.merged(targets);
        let len = gene.length();
        let can_grow = len < gene.max_length;
        let can_shrink = len > gene.min_length && len > 0;

        let grow_weight = if can_grow { record.grow.weight() } else { 0.0 };
        let shrink_weight = if can_shrink { record.shrink.weight() } else { 0.0 };
        let char_weights: Vec<f64> = (0..len).map(|i| record.char_stats(i).weight()).collect();
        let char_weight = char_weights.iter().cloned().fold(0.0, f64::max);

        // the raw value is what gets edited and recorded
        gene.selected_specialization = None;

        let changed = match rng.choose_weighted(&[grow_weight.max(shrink_weight), char_weight]) {
            Some(0) => {
                if rng.choose_weighted(&[grow_weight, shrink_weight]) == Some(0) {
                    trace!("Adaptive append to '{}'", gene.value);
                    gene.value.push(rng.next_word_char());
                } else {
                    trace!("Adaptive removal from '{}'", gene.value);
                    gene.value.pop();
                }
                true
            }
            Some(_) => match rng.choose_weighted(&char_weights) {
                Some(index) => {
                    let stats = record.char_stats(index);
                    let up = rng.choose_weighted(&[stats.up.weight(), stats.down.weight()]) == Some(0);
                    shift_char_at(gene, index, up, rng);
                    true
                }
                None => false,
            },
            None => false,
        };

        gene.repair();
        changed
    }
}

fn shift_char_at(gene: &mut StringGene, index: usize, up: bool, rng: &mut Randomness) {
    let mut chars: Vec<char> = gene.value.chars().collect();
    let Some(c) = chars.get(index).copied() else {
        return;
    };
    let code = c as u32;
    let shifted = if up {
        code.checked_add(1).and_then(char::from_u32)
    } else {
        code.checked_sub(1).filter(|v| *v > 0).and_then(char::from_u32)
    };
    chars[index] = shifted.unwrap_or_else(|| rng.next_word_char());
    gene.value = chars.into_iter().collect();
}
