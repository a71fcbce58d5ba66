use super::Gene;
use crate::engines::mutation::context::MutationContext;
use crate::engines::mutation::randomness::Randomness;
use crate::error::{EvogeneError, Result};
use log::trace;
use std::collections::BTreeSet;

/// Collections sampled at random are kept small
const MAX_RANDOM_ELEMENTS: usize = 5;

const P_DEACTIVATE_OPTIONAL: f64 = 0.05;

/// Named fields, in declaration order
#[derive(Debug, Clone)]
pub struct ObjectGene {
    pub fields: Vec<Gene>,
}

impl ObjectGene {
    pub fn new(fields: Vec<Gene>) -> Result<Self> {
        let mut names = BTreeSet::new();
        for f in &fields {
            if !names.insert(f.name.as_str()) {
                return Err(EvogeneError::InvariantViolation(format!(
                    "duplicate field name '{}'",
                    f.name
                )));
            }
        }
        Ok(Self { fields })
    }

    pub fn field(&self, name: &str) -> Option<&Gene> {
        self.fields.iter().find(|f| f.name == name)
    }

    pub fn field_mut(&mut self, name: &str) -> Option<&mut Gene> {
        self.fields.iter_mut().find(|f| f.name == name)
    }

    /// Field-by-field copy, matched by name. Nothing is copied unless every
    /// field can be.
    pub fn copy_value_from(&mut self, other: &ObjectGene) -> Result<()> {
        let mut fields = self.fields.clone();
        for field in fields.iter_mut() {
            let source = other.field(&field.name).ok_or_else(|| {
                EvogeneError::type_mismatch(
                    &format!("object with field '{}'", field.name),
                    "object without it",
                )
            })?;
            field.copy_value_from(source)?;
        }
        self.fields = fields;
        Ok(())
    }

    pub fn contains_same_value_as(&self, other: &ObjectGene) -> Result<bool> {
        if self.fields.len() != other.fields.len() {
            return Ok(false);
        }
        for field in &self.fields {
            match other.field(&field.name) {
                Some(o) if field.contains_same_value_as(o)? => {}
                _ => return Ok(false),
            }
        }
        Ok(true)
    }

    /// Mutates each mutable field with probability 1/n, at least one
    pub fn mutate(&mut self, ctx: &mut MutationContext<'_>) -> bool {
        let candidates: Vec<usize> = self
            .fields
            .iter()
            .enumerate()
            .filter(|(_, f)| f.is_mutable())
            .map(|(i, _)| i)
            .collect();
        if candidates.is_empty() {
            return false;
        }

        let p = 1.0 / candidates.len() as f64;
        let mut selected: Vec<usize> = candidates
            .iter()
            .copied()
            .filter(|_| ctx.rng.next_bool(p))
            .collect();
        if selected.is_empty() {
            selected.push(candidates[ctx.rng.next_index(candidates.len())]);
        }

        let mut changed = false;
        for i in selected {
            let field = &mut self.fields[i];
            changed |= ctx.in_child(i, |ctx| field.standard_mutation(ctx));
        }
        changed
    }
}

/// Homogeneous list of elements built from a template
#[derive(Debug, Clone)]
pub struct ArrayGene {
    pub template: Box<Gene>,
    pub elements: Vec<Gene>,
    pub min_size: usize,
    pub max_size: usize,
}

impl ArrayGene {
    pub fn new(template: Gene, min_size: usize, max_size: usize) -> Self {
        Self {
            template: Box::new(template),
            elements: Vec::new(),
            min_size,
            max_size: max_size.max(min_size),
        }
    }

    pub fn is_mutable(&self) -> bool {
        self.max_size > self.min_size || self.elements.iter().any(Gene::is_mutable)
    }

    fn new_element(&self, rng: &mut Randomness) -> Gene {
        let mut element = self.template.copy();
        element.randomize(rng, false);
        element
    }

    pub fn randomize(&mut self, rng: &mut Randomness, _force_new_value: bool) {
        let upper = self.max_size.min(self.min_size + MAX_RANDOM_ELEMENTS);
        let size = rng.next_int(self.min_size as i64, upper as i64) as usize;
        self.elements = (0..size).map(|_| self.new_element(rng)).collect();
    }

    pub fn mutate(&mut self, ctx: &mut MutationContext<'_>) -> bool {
        let len = self.elements.len();
        let can_add = len < self.max_size;
        let can_remove = len > self.min_size;

        if can_add && (len == 0 || ctx.rng.next_bool(1.0 / 3.0)) {
            let element = self.new_element(ctx.rng);
            self.elements.push(element);
            return true;
        }
        if can_remove && ctx.rng.next_bool(0.5) {
            let i = ctx.rng.next_index(len);
            trace!("Removing array element {}", i);
            self.elements.remove(i);
            return true;
        }
        if len == 0 {
            return false;
        }
        let i = ctx.rng.next_index(len);
        let element = &mut self.elements[i];
        ctx.in_child(i, |ctx| element.standard_mutation(ctx))
    }
}

/// Elements keyed by their gene names, which are kept unique
#[derive(Debug, Clone)]
pub struct MapGene {
    pub template: Box<Gene>,
    pub elements: Vec<Gene>,
    pub max_size: usize,
}

impl MapGene {
    pub fn new(template: Gene, max_size: usize) -> Self {
        Self {
            template: Box::new(template),
            elements: Vec::new(),
            max_size,
        }
    }

    pub fn is_mutable(&self) -> bool {
        self.max_size > 0
    }

    fn new_element(&self, rng: &mut Randomness) -> Gene {
        let mut element = self.template.copy();
        element.randomize(rng, false);
        let mut key = rng.next_word_string(1, 8);
        while self.elements.iter().any(|e| e.name == key) {
            key.push(rng.next_word_char());
        }
        element.name = key;
        element
    }

    pub fn randomize(&mut self, rng: &mut Randomness, _force_new_value: bool) {
        self.elements.clear();
        let size = rng.next_int(0, self.max_size.min(MAX_RANDOM_ELEMENTS) as i64) as usize;
        for _ in 0..size {
            let element = self.new_element(rng);
            self.elements.push(element);
        }
    }

    pub fn mutate(&mut self, ctx: &mut MutationContext<'_>) -> bool {
        let len = self.elements.len();
        if len < self.max_size && (len == 0 || ctx.rng.next_bool(1.0 / 3.0)) {
            let element = self.new_element(ctx.rng);
            self.elements.push(element);
            return true;
        }
        if len == 0 {
            return false;
        }
        if ctx.rng.next_bool(0.5) {
            self.elements.remove(ctx.rng.next_index(len));
            return true;
        }
        let i = ctx.rng.next_index(len);
        let element = &mut self.elements[i];
        ctx.in_child(i, |ctx| element.standard_mutation(ctx))
    }
}

/// A gene that may be left out of the call
#[derive(Debug, Clone)]
pub struct OptionalGene {
    pub gene: Box<Gene>,
    pub is_active: bool,
}

impl OptionalGene {
    pub fn new(gene: Gene) -> Self {
        Self {
            gene: Box::new(gene),
            is_active: true,
        }
    }

    pub fn randomize(&mut self, rng: &mut Randomness, force_new_value: bool) {
        if !force_new_value {
            self.is_active = rng.next_boolean();
        }
        self.gene.randomize(rng, force_new_value);
    }

    pub fn mutate(&mut self, ctx: &mut MutationContext<'_>) -> bool {
        if !self.is_active {
            self.is_active = true;
            return true;
        }
        if ctx.rng.next_bool(P_DEACTIVATE_OPTIONAL) {
            self.is_active = false;
            return true;
        }
        let gene = &mut self.gene;
        ctx.in_child(0, |ctx| gene.standard_mutation(ctx))
    }
}

/// Wrapper whose content may be mutated into invalid data, with `probability`
#[derive(Debug, Clone)]
pub struct DisruptiveGene {
    pub gene: Box<Gene>,
    pub probability: f64,
}

impl DisruptiveGene {
    /// Name of every disruptive wrapper, also a marker in binding keys
    pub const NAME: &'static str = "d_";

    pub fn new(gene: Gene, probability: f64) -> Self {
        Self {
            gene: Box::new(gene),
            probability: probability.clamp(0.0, 1.0),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_duplicate_field_names_rejected() {
        let result = ObjectGene::new(vec![Gene::integer("a", 1), Gene::string("a", "x")]);
        assert!(matches!(result, Err(EvogeneError::InvariantViolation(_))));
    }

    #[test]
    fn test_copy_by_field_name() {
        let mut a = ObjectGene::new(vec![Gene::integer("x", 1), Gene::string("y", "a")]).unwrap();
        let b = ObjectGene::new(vec![
            Gene::string("y", "b"),
            Gene::integer("x", 2),
            Gene::boolean("z", true),
        ])
        .unwrap();
        a.copy_value_from(&b).unwrap();
        assert_eq!(a.field("x").unwrap().value_as_raw_string(), "2");
        assert_eq!(a.field("y").unwrap().value_as_raw_string(), "b");
        assert!(!a.contains_same_value_as(&b).unwrap());
        let mut c = b.clone();
        assert!(c.copy_value_from(&a).is_err());
    }

    #[test]
    fn test_failed_copy_leaves_fields_untouched() {
        let mut target = ObjectGene::new(vec![Gene::string("y", "orig"), Gene::integer("z", 7)]).unwrap();
        let source = ObjectGene::new(vec![Gene::string("y", "new")]).unwrap();
        assert!(target.copy_value_from(&source).is_err());
        assert_eq!(target.field("y").unwrap().value_as_raw_string(), "orig");
        assert_eq!(target.field("z").unwrap().value_as_raw_string(), "7");

        // a type mismatch on a later field behaves the same
        let source = ObjectGene::new(vec![Gene::string("y", "new"), Gene::string("z", "x")]).unwrap();
        assert!(target.copy_value_from(&source).is_err());
        assert_eq!(target.field("y").unwrap().value_as_raw_string(), "orig");
    }

    #[test]
    fn test_map_keys_stay_unique() {
        let mut rng = Randomness::new(Some(12));
        let mut map = MapGene::new(Gene::integer("v", 0), 5);
        for _ in 0..10 {
            map.randomize(&mut rng, false);
            let keys: BTreeSet<&str> = map.elements.iter().map(|e| e.name.as_str()).collect();
            assert_eq!(keys.len(), map.elements.len());
        }
    }

    #[test]
    fn test_array_randomize_within_sizes() {
        let mut rng = Randomness::new(Some(6));
        let mut array = ArrayGene::new(Gene::integer("v", 0), 1, 3);
        for _ in 0..20 {
            array.randomize(&mut rng, false);
            assert!((1..=3).contains(&array.elements.len()));
        }
    }
}
