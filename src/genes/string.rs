use super::specialization::{build_specialization_genes, is_addable};
use super::Gene;
use crate::engines::mutation::apc::delta;
use crate::engines::mutation::archive::StringArchiveInfo;
use crate::engines::mutation::context::MutationContext;
use crate::engines::mutation::randomness::Randomness;
use crate::engines::mutation::taint::is_taint_input;
use crate::types::{SpecializationKind, StringSpecializationInfo};
use log::trace;
use std::collections::BTreeSet;

/// Probability of switching away from, or dropping, the selected specialization
const PROB_CHANGE_SPEC: f64 = 0.1;
const MIN_P_FOR_TAINT: f64 = 0.1;

/// Strings can grow large through mutation, but sampling stays short
pub const MAX_FOR_RANDOMIZATION: usize = 16;

pub const DEFAULT_MAX_LENGTH: usize = 16;

#[derive(Debug, Clone)]
pub struct StringGene {
    pub value: String,
    /// Inclusive, in chars
    pub min_length: usize,
    /// Inclusive, in chars
    pub max_length: usize,
    invalid_chars: Vec<char>,
    valid_char: Option<char>,
    specializations: BTreeSet<StringSpecializationInfo>,
    pub specialization_genes: Vec<Gene>,
    pub selected_specialization: Option<usize>,
    pub selection_updated_since_last_mutation: bool,
    /// Whether this gene already carried a taint marker
    pub tainted: bool,
    /// Genes sharing any of these ids are kept equal
    pub binding_ids: BTreeSet<String>,
    pub mutation_info: StringArchiveInfo,
}

impl StringGene {
    pub fn new(value: impl Into<String>) -> Self {
        Self::with_bounds(value, 0, DEFAULT_MAX_LENGTH)
    }

    pub fn with_bounds(value: impl Into<String>, min_length: usize, max_length: usize) -> Self {
        Self {
            value: value.into(),
            min_length,
            max_length: max_length.max(min_length),
            invalid_chars: Vec::new(),
            valid_char: None,
            specializations: BTreeSet::new(),
            specialization_genes: Vec::new(),
            selected_specialization: None,
            selection_updated_since_last_mutation: false,
            tainted: false,
            binding_ids: BTreeSet::new(),
            mutation_info: StringArchiveInfo::default(),
        }
    }

    /// Characters that must never appear, e.g. '/' in a path element
    pub fn with_invalid_chars(mut self, invalid_chars: Vec<char>) -> Self {
        self.valid_char = ('a'..='z').find(|c| !invalid_chars.contains(c));
        self.invalid_chars = invalid_chars;
        self.repair();
        self
    }

    pub fn invalid_chars(&self) -> &[char] {
        &self.invalid_chars
    }

    pub fn specializations(&self) -> &BTreeSet<StringSpecializationInfo> {
        &self.specializations
    }

    pub fn length(&self) -> usize {
        self.value.chars().count()
    }

    pub fn specialization_gene(&self) -> Option<&Gene> {
        self.selected_specialization
            .and_then(|i| self.specialization_genes.get(i))
    }

    /// Effective value, delegated to the selected specialization if any
    pub fn raw_value(&self) -> String {
        match self.specialization_gene() {
            Some(gene) => gene.value_as_raw_string(),
            None => self.value.clone(),
        }
    }

    pub fn is_mutable(&self) -> bool {
        match self.specialization_gene() {
            Some(gene) => self.specialization_genes.len() > 1 || gene.is_mutable(),
            None => true,
        }
    }

    pub fn fits(&self, candidate: &str) -> bool {
        let len = candidate.chars().count();
        len >= self.min_length
            && len <= self.max_length
            && !candidate.chars().any(|c| self.invalid_chars.contains(&c))
    }

    pub fn randomize(&mut self, rng: &mut Randomness, force_new_value: bool) {
        let max = self.max_length.min(MAX_FOR_RANDOMIZATION).max(self.min_length);
        let previous = self.value.clone();
        for _ in 0..3 {
            self.value = rng.next_word_string(self.min_length, max);
            self.repair();
            if !force_new_value || self.value != previous {
                break;
            }
        }
        self.selected_specialization = None;
    }

    pub fn mutate(&mut self, ctx: &mut MutationContext<'_>) -> bool {
        if let Some(adaptive) = ctx.archive {
            adaptive.mutator.mutate_string(self, adaptive.targets, ctx.rng);
            self.handle_binding(ctx);
            return true;
        }

        if self.specialization_gene().is_none()
            && !self.specialization_genes.is_empty()
            && ctx.rng.next_bool(0.5)
        {
            let last = self.specialization_genes.len() as i64 - 1;
            self.selected_specialization = Some(ctx.rng.next_int(0, last) as usize);
            self.selection_updated_since_last_mutation = false;
            self.handle_binding(ctx);
            return true;
        }

        if let Some(current) = self.selected_specialization.filter(|&i| i < self.specialization_genes.len()) {
            let size = self.specialization_genes.len();
            if self.selection_updated_since_last_mutation && ctx.rng.next_bool(0.5) {
                // favour the most recently discovered specialization, but not always
                self.selected_specialization = Some(size - 1);
            } else if size > 1 && ctx.rng.next_bool(PROB_CHANGE_SPEC) {
                let other = ctx.rng.next_int_excluding(0, size as i64 - 1, current as i64);
                self.selected_specialization = Some(other as usize);
            } else if ctx.rng.next_bool(PROB_CHANGE_SPEC) {
                self.selected_specialization = None;
            } else {
                let gene = &mut self.specialization_genes[current];
                ctx.in_child(current, |ctx| gene.standard_mutation(ctx));
            }
            self.selection_updated_since_last_mutation = false;
            self.handle_binding(ctx);
            return true;
        }

        if self.try_taint(ctx) {
            self.handle_binding(ctx);
            return true;
        }

        if self.tainted && ctx.rng.next_bool(0.5) && is_taint_input(&self.value) {
            self.randomize(ctx.rng, true);
            self.handle_binding(ctx);
            return true;
        }

        let changed = self.mutate_chars(ctx);
        self.repair();
        self.handle_binding(ctx);
        changed
    }

    fn try_taint(&mut self, ctx: &mut MutationContext<'_>) -> bool {
        if ctx.apc.does_focus_search() {
            return false;
        }
        let tp = ctx.apc.base_taint_analysis_probability(MIN_P_FOR_TAINT);
        if tp <= 0.0 {
            return false;
        }
        let p = if self.tainted {
            // a previous marker led to no specialization
            (tp / 2.0).max(MIN_P_FOR_TAINT)
        } else {
            tp
        };
        if !ctx.rng.next_bool(p) {
            return false;
        }
        let marker = ctx.taint.next_name();
        if !self.fits(&marker) {
            trace!("taint marker {} does not fit string constraints", marker);
            return false;
        }
        self.value = marker;
        self.tainted = true;
        true
    }

    /*
        Fitness on strings is based on left-aligned equality, so changing
        chars is rewarded more than deleting/adding, and deletion/insertion
        are preferably done at the end
     */
    fn mutate_chars(&mut self, ctx: &mut MutationContext<'_>) -> bool {
        let p = ctx.rng.next_double();
        let len = self.length();

        let others: Vec<String> = ctx
            .string_pool()
            .iter()
            .filter(|v| **v != self.value && !is_taint_input(v) && self.fits(v))
            .cloned()
            .collect();

        if p < 0.02 && !others.is_empty() {
            if let Some(seed) = ctx.rng.choose(&others) {
                self.value = seed.clone();
                return true;
            }
        }

        if p < 0.8 && len > 0 {
            let delta = delta(ctx.rng, ctx.apc, u64::MAX, 6, 3);
            let sign = if ctx.rng.next_boolean() { 1 } else { -1 };
            let i = ctx.rng.next_index(len);
            let mut chars: Vec<char> = self.value.chars().collect();
            trace!("Changing char in: {}", self.value);
            let shifted = shift_char(chars[i], sign * delta)
                .or_else(|| shift_char(chars[i], -sign * delta));
            chars[i] = match shifted {
                Some(c) => c,
                None => ctx.rng.next_word_char(),
            };
            self.value = chars.into_iter().collect();
            return true;
        }

        if p < 0.9 && len > 0 && len > self.min_length {
            self.value.pop();
            return true;
        }

        if len < self.max_length {
            let c = ctx.rng.next_word_char();
            if len == 0 || ctx.rng.next_bool(0.8) {
                self.value.push(c);
            } else {
                trace!("Inserting char");
                let i = ctx.rng.next_index(len);
                let byte_index = self
                    .value
                    .char_indices()
                    .nth(i)
                    .map(|(b, _)| b)
                    .unwrap_or(self.value.len());
                self.value.insert(byte_index, c);
            }
            return true;
        }

        false
    }

    fn handle_binding(&self, ctx: &mut MutationContext<'_>) {
        if self.binding_ids.is_empty() {
            return;
        }
        ctx.request_binding(&self.binding_ids, self.raw_value());
    }

    /// Make sure no invalid char is used
    pub fn repair(&mut self) {
        if self.invalid_chars.is_empty() {
            return;
        }
        let Some(valid) = self.valid_char else {
            return;
        };
        if self.value.chars().any(|c| self.invalid_chars.contains(&c)) {
            self.value = self
                .value
                .chars()
                .map(|c| if self.invalid_chars.contains(&c) { valid } else { c })
                .collect();
        }
    }

    /// Register taint-analysis hints, creating typed alternative genes for them
    pub fn add_specializations(
        &mut self,
        name: &str,
        specs: &[StringSpecializationInfo],
        rng: &mut Randomness,
    ) {
        let to_add: Vec<StringSpecializationInfo> = specs
            .iter()
            .filter(|s| !self.specializations.contains(*s))
            .filter(|s| is_addable(s, &self.invalid_chars, self.min_length))
            .cloned()
            .collect();

        let mut genes = build_specialization_genes(name, &to_add);
        if !genes.is_empty() {
            self.selection_updated_since_last_mutation = true;
            for gene in genes.iter_mut() {
                gene.randomize(rng, false);
            }
            self.specialization_genes.append(&mut genes);
        }

        for spec in to_add {
            if spec.kind == SpecializationKind::Equal {
                self.binding_ids.insert(spec.value.clone());
            }
            self.specializations.insert(spec);
        }
    }

    pub fn copy_value_from(&mut self, other: &StringGene) {
        self.value = other.value.clone();
        self.selected_specialization = other.selected_specialization;
        self.specializations = other.specializations.clone();
        self.specialization_genes = other.specialization_genes.clone();
        self.tainted = other.tainted;
        self.binding_ids = other.binding_ids.clone();
    }

    pub fn contains_same_value_as(&self, other: &StringGene) -> bool {
        match (self.specialization_gene(), other.specialization_gene()) {
            (None, None) => self.value == other.value,
            (Some(a), Some(b)) => a.contains_same_value_as(b).unwrap_or(false),
            _ => false,
        }
    }

    pub fn mutation_weight(&self) -> f64 {
        if self.specialization_genes.is_empty() {
            1.0
        } else {
            self.specialization_genes
                .iter()
                .map(Gene::mutation_weight)
                .sum::<f64>()
                * PROB_CHANGE_SPEC
                + 1.0
        }
    }
}

fn shift_char(c: char, delta: i64) -> Option<char> {
    let code = c as i64 + delta;
    if code <= 0 || code > u32::MAX as i64 {
        return None;
    }
    char::from_u32(code as u32)
}
