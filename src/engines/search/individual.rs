use crate::engines::binding::param_util::bind_param;
use crate::engines::binding::{Action, DbAction};
use crate::engines::mutation::randomness::Randomness;
use crate::genes::{Gene, GeneKind};
use log::debug;
use std::collections::BTreeSet;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub enum ActionRef {
    Db(usize),
    Call(usize),
}

/// Location of a gene: a root gene of an action, then child indices
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct GeneAddress {
    pub action: ActionRef,
    /// Index among the action's genes (parameters of a call, columns of a row)
    pub gene: usize,
    pub path: Vec<usize>,
}

impl GeneAddress {
    pub fn root(action: ActionRef, gene: usize) -> Self {
        Self {
            action,
            gene,
            path: Vec::new(),
        }
    }

    pub fn descendant(&self, relative: &[usize]) -> GeneAddress {
        let mut path = self.path.clone();
        path.extend_from_slice(relative);
        GeneAddress {
            action: self.action,
            gene: self.gene,
            path,
        }
    }
}

/// A test case: rows to insert first, then calls
#[derive(Debug, Clone, Default)]
pub struct Individual {
    pub db_actions: Vec<DbAction>,
    pub actions: Vec<Action>,
}

impl Individual {
    pub fn new(db_actions: Vec<DbAction>, actions: Vec<Action>) -> Self {
        Self {
            db_actions,
            actions,
        }
    }

    /// Number of calls
    pub fn size(&self) -> usize {
        self.actions.len()
    }

    pub fn root_addresses(&self) -> Vec<GeneAddress> {
        let db = self.db_actions.iter().enumerate().flat_map(|(a, action)| {
            (0..action.genes.len()).map(move |g| GeneAddress::root(ActionRef::Db(a), g))
        });
        let calls = self.actions.iter().enumerate().flat_map(|(a, action)| {
            (0..action.params.len()).map(move |g| GeneAddress::root(ActionRef::Call(a), g))
        });
        db.chain(calls).collect()
    }

    fn root_gene(&self, action: ActionRef, gene: usize) -> Option<&Gene> {
        match action {
            ActionRef::Db(a) => self.db_actions.get(a)?.genes.get(gene),
            ActionRef::Call(a) => self.actions.get(a)?.params.get(gene).map(|p| &p.gene),
        }
    }

    fn root_gene_mut(&mut self, action: ActionRef, gene: usize) -> Option<&mut Gene> {
        match action {
            ActionRef::Db(a) => self.db_actions.get_mut(a)?.genes.get_mut(gene),
            ActionRef::Call(a) => self
                .actions
                .get_mut(a)?
                .params
                .get_mut(gene)
                .map(|p| &mut p.gene),
        }
    }

    pub fn gene_at(&self, address: &GeneAddress) -> Option<&Gene> {
        self.root_gene(address.action, address.gene)?
            .get_at(&address.path)
    }

    pub fn gene_at_mut(&mut self, address: &GeneAddress) -> Option<&mut Gene> {
        self.root_gene_mut(address.action, address.gene)?
            .get_at_mut(&address.path)
    }

    /// Every gene of the individual with its address, in pre-order per root
    pub fn addressed_genes(&self) -> Vec<(GeneAddress, &Gene)> {
        let mut out = Vec::new();
        for root in self.root_addresses() {
            if let Some(gene) = self.root_gene(root.action, root.gene) {
                for (path, g) in gene.flat_view_with_paths(|_| false) {
                    out.push((root.descendant(&path), g));
                }
            }
        }
        out
    }

    /// Raw values of all string genes, without duplicates
    pub fn string_values(&self) -> Vec<String> {
        let mut values: Vec<String> = Vec::new();
        for (_, gene) in self.addressed_genes() {
            if let GeneKind::String(g) = &gene.kind {
                let v = g.raw_value();
                if !values.contains(&v) {
                    values.push(v);
                }
            }
        }
        values
    }

    pub fn randomize(&mut self, rng: &mut Randomness) {
        for action in self.db_actions.iter_mut() {
            action.genes.iter_mut().for_each(|g| g.randomize(rng, false));
        }
        for action in self.actions.iter_mut() {
            action
                .params
                .iter_mut()
                .for_each(|p| p.gene.randomize(rng, false));
        }

        // the first gene of each binding group sets the value of the group
        let mut synced: BTreeSet<GeneAddress> = BTreeSet::new();
        let bound: Vec<(GeneAddress, BTreeSet<String>, String)> = self
            .addressed_genes()
            .into_iter()
            .filter_map(|(address, gene)| match &gene.kind {
                GeneKind::String(g) if !g.binding_ids.is_empty() => {
                    Some((address, g.binding_ids.clone(), g.raw_value()))
                }
                _ => None,
            })
            .collect();
        for (address, ids, value) in bound {
            if synced.contains(&address) {
                continue;
            }
            synced.insert(address.clone());
            synced.extend(self.sync_bindings(&address, &ids, &value));
        }
    }

    /// Give `value` to every other string gene sharing one of `binding_ids`,
    /// clearing their specialization. Returns the updated addresses.
    pub fn sync_bindings(
        &mut self,
        origin: &GeneAddress,
        binding_ids: &BTreeSet<String>,
        value: &str,
    ) -> Vec<GeneAddress> {
        let bound: Vec<GeneAddress> = self
            .addressed_genes()
            .into_iter()
            .filter(|(address, _)| address != origin)
            .filter_map(|(address, gene)| match &gene.kind {
                GeneKind::String(g) if !g.binding_ids.is_disjoint(binding_ids) => Some(address),
                _ => None,
            })
            .collect();

        if bound.is_empty() {
            debug!("No gene left bound to {:?}", binding_ids);
        }

        for address in &bound {
            if let Some(g) = self.gene_at_mut(address).and_then(Gene::as_string_mut) {
                g.value = value.to_string();
                g.selected_specialization = None;
            }
        }
        bound
    }

    /// Bind the parameters of call `target` to those of call `source`.
    /// Returns the number of parameters that got a value.
    pub fn bind_action_params(&mut self, target: usize, source: usize) -> usize {
        if target == source || target >= self.actions.len() || source >= self.actions.len() {
            return 0;
        }
        let (target_action, source_action) = if target < source {
            let (left, right) = self.actions.split_at_mut(source);
            (&mut left[target], &right[0])
        } else {
            let (left, right) = self.actions.split_at_mut(target);
            (&mut right[0], &left[source])
        };

        let mut bound = 0;
        for param in target_action.params.iter_mut() {
            if bind_param(
                param,
                &target_action.path,
                &source_action.path,
                &source_action.params,
                false,
            ) {
                bound += 1;
            }
        }
        bound
    }

    /// Individual made of the first `n` calls
    pub fn truncated(&self, n: usize) -> Individual {
        Individual {
            db_actions: self.db_actions.clone(),
            actions: self.actions.iter().take(n).cloned().collect(),
        }
    }

    /// Stable textual form, used to detect duplicates
    pub fn canonical_string(&self) -> String {
        let db = self.db_actions.iter().map(|a| {
            let values: Vec<String> = a.genes.iter().map(Gene::value_as_printable_string).collect();
            format!("INSERT {} {}", a.table, values.join(","))
        });
        let calls = self.actions.iter().map(|a| {
            let values: Vec<String> = a
                .params
                .iter()
                .map(|p| format!("{}={}", p.name, p.gene.value_as_printable_string()))
                .collect();
            format!("{} {} {}", a.name, a.path, values.join("&"))
        });
        db.chain(calls).collect::<Vec<_>>().join("\n")
    }
}
