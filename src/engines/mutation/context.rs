use super::apc::AdaptiveParameterControl;
use super::archive::ArchiveGeneMutator;
use super::randomness::Randomness;
use super::taint::TaintNames;
use crate::types::TargetId;
use std::collections::BTreeSet;

/// Archive-adaptive mutation turned on for the current mutation
#[derive(Debug, Clone, Copy)]
pub struct AdaptiveSelection<'a> {
    pub mutator: &'a ArchiveGeneMutator,
    /// Targets whose records bias the mutation; all records when empty
    pub targets: &'a [TargetId],
}

/// Value a string gene asked to share with the genes bound to it
#[derive(Debug, Clone, PartialEq)]
pub struct PendingBinding {
    /// Child-index path of the requesting gene, relative to the mutated gene
    pub path: Vec<usize>,
    pub binding_ids: BTreeSet<String>,
    pub value: String,
}

/// State threaded through one mutation of a gene subtree.
///
/// Genes have no access to their individual, so binding propagation is
/// recorded here and applied by the caller once the mutation returns.
pub struct MutationContext<'a> {
    pub rng: &'a mut Randomness,
    pub apc: &'a AdaptiveParameterControl,
    pub taint: &'a mut TaintNames,
    pub archive: Option<AdaptiveSelection<'a>>,
    string_pool: Vec<String>,
    path: Vec<usize>,
    pending: Vec<PendingBinding>,
}

impl<'a> MutationContext<'a> {
    pub fn new(
        rng: &'a mut Randomness,
        apc: &'a AdaptiveParameterControl,
        taint: &'a mut TaintNames,
    ) -> Self {
        Self {
            rng,
            apc,
            taint,
            archive: None,
            string_pool: Vec::new(),
            path: Vec::new(),
            pending: Vec::new(),
        }
    }

    pub fn with_archive(mut self, selection: AdaptiveSelection<'a>) -> Self {
        self.archive = Some(selection);
        self
    }

    /// Values of the other string genes of the individual, used for seeding
    pub fn with_string_pool(mut self, pool: Vec<String>) -> Self {
        self.string_pool = pool;
        self
    }

    pub fn string_pool(&self) -> &[String] {
        &self.string_pool
    }

    pub fn in_child<R>(&mut self, index: usize, f: impl FnOnce(&mut Self) -> R) -> R {
        self.path.push(index);
        let result = f(self);
        self.path.pop();
        result
    }

    pub fn request_binding(&mut self, binding_ids: &BTreeSet<String>, value: String) {
        self.pending.push(PendingBinding {
            path: self.path.clone(),
            binding_ids: binding_ids.clone(),
            value,
        });
    }

    pub fn take_pending_bindings(&mut self) -> Vec<PendingBinding> {
        std::mem::take(&mut self.pending)
    }
}
