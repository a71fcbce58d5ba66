use super::apc::AdaptiveParameterControl;
use super::archive::ArchiveGeneMutator;
use super::context::{AdaptiveSelection, MutationContext};
use super::randomness::Randomness;
use super::taint::TaintNames;
use crate::engines::search::individual::{GeneAddress, Individual};
use crate::genes::GeneKind;
use crate::types::{EvaluatedMutation, TargetId};
use log::{debug, warn};
use std::collections::BTreeMap;

/// Applies standard or archive-adaptive mutation to individuals and keeps
/// the session state this requires
#[derive(Debug, Default)]
pub struct GeneMutator {
    archive_mutator: ArchiveGeneMutator,
    taint: TaintNames,
}

impl GeneMutator {
    pub fn new() -> Self {
        Self::default()
    }

    /// Mutate each mutable root gene with probability 1/n, at least one.
    /// Returns the addresses of the mutated root genes.
    pub fn mutate_individual(
        &mut self,
        individual: &mut Individual,
        rng: &mut Randomness,
        apc: &AdaptiveParameterControl,
        targets: &[TargetId],
    ) -> Vec<GeneAddress> {
        let candidates: Vec<GeneAddress> = individual
            .root_addresses()
            .into_iter()
            .filter(|a| individual.gene_at(a).map_or(false, |g| g.is_mutable()))
            .collect();
        if candidates.is_empty() {
            debug!("No mutable gene in individual");
            return Vec::new();
        }

        let p = 1.0 / candidates.len() as f64;
        let mut selected: Vec<GeneAddress> = candidates
            .iter()
            .filter(|_| rng.next_bool(p))
            .cloned()
            .collect();
        if selected.is_empty() {
            let i = rng.next_index(candidates.len());
            selected.push(candidates[i].clone());
        }

        let string_pool = individual.string_values();
        for address in &selected {
            self.mutate_gene_at(individual, address, rng, apc, targets, &string_pool);
        }
        selected
    }

    /// Mutate the gene at `address`, then propagate the bindings its string
    /// genes requested
    pub fn mutate_gene_at(
        &mut self,
        individual: &mut Individual,
        address: &GeneAddress,
        rng: &mut Randomness,
        apc: &AdaptiveParameterControl,
        targets: &[TargetId],
        string_pool: &[String],
    ) -> bool {
        let Some(gene) = individual.gene_at_mut(address) else {
            warn!("No gene at {:?}", address);
            return false;
        };

        let mut ctx = MutationContext::new(rng, apc, &mut self.taint)
            .with_string_pool(string_pool.to_vec());
        if apc.config().adaptive_gene_mutation {
            ctx = ctx.with_archive(AdaptiveSelection {
                mutator: &self.archive_mutator,
                targets,
            });
        }

        let changed = gene.standard_mutation(&mut ctx);
        let pending = ctx.take_pending_bindings();

        for binding in pending {
            let origin = address.descendant(&binding.path);
            individual.sync_bindings(&origin, &binding.binding_ids, &binding.value);
        }
        changed
    }

    /// Fold the evaluation of `mutated` against `original` into the adaptive
    /// records of the string genes below `addresses`, in both individuals
    pub fn archive_mutation_update(
        &self,
        original: &mut Individual,
        mutated: &mut Individual,
        addresses: &[GeneAddress],
        evaluated: &BTreeMap<TargetId, EvaluatedMutation>,
    ) {
        for root in addresses {
            let (Some(before), Some(after)) = (original.gene_at(root), mutated.gene_at(root)) else {
                warn!("Mutated gene {:?} missing from an individual", root);
                continue;
            };
            let before = before.copy();
            let after = after.copy();

            let leaves: Vec<Vec<usize>> = after
                .flat_view_with_paths(|_| false)
                .filter(|(_, g)| matches!(g.kind, GeneKind::String(_)))
                .map(|(path, _)| path)
                .collect();

            for path in leaves {
                let (Some(b), Some(a)) = (before.get_at(&path), after.get_at(&path)) else {
                    continue;
                };
                let address = root.descendant(&path);
                for individual in [&mut *original, &mut *mutated] {
                    if let Some(gene) = individual.gene_at_mut(&address) {
                        gene.archive_mutation_update(b, a, evaluated);
                    }
                }
            }
        }
    }
}
