//! Recursive value representation of test inputs.
//!
//! Every mutable value of an individual is a [`Gene`]: a name plus one
//! [`GeneKind`] variant. Composite variants own their children, so cloning a
//! gene is a deep, independent copy. There is no parent back-reference;
//! ancestry is recovered by walking from a root with child-index paths.

pub mod base64;
pub mod composite;
pub mod datetime;
pub mod flat_view;
pub mod numeric;
pub mod primitives;
pub mod regex;
pub mod specialization;
pub mod sql;
pub mod string;

use crate::engines::mutation::context::MutationContext;
use crate::engines::mutation::randomness::Randomness;
use crate::error::{EvogeneError, Result};
use crate::types::{EvaluatedMutation, TargetId};
use log::warn;
use std::collections::BTreeMap;

pub use self::base64::Base64Gene;
pub use self::composite::{ArrayGene, DisruptiveGene, MapGene, ObjectGene, OptionalGene};
pub use self::datetime::{DateGene, DateTimeGene, TimeGene};
pub use self::flat_view::{FlatPaths, FlatView};
pub use self::numeric::{DoubleGene, FloatGene, IntegerGene, LongGene};
pub use self::primitives::{BooleanGene, EnumGene};
pub use self::regex::RegexGene;
pub use self::sql::{ImmutableDataHolderGene, SqlForeignKeyGene, SqlPrimaryKeyGene};
pub use self::string::StringGene;

#[derive(Debug, Clone)]
pub struct Gene {
    pub name: String,
    pub kind: GeneKind,
}

#[derive(Debug, Clone)]
pub enum GeneKind {
    String(StringGene),
    Integer(IntegerGene),
    Long(LongGene),
    Float(FloatGene),
    Double(DoubleGene),
    Boolean(BooleanGene),
    Enum(EnumGene),
    Date(DateGene),
    Time(TimeGene),
    DateTime(DateTimeGene),
    Base64(Base64Gene),
    Regex(RegexGene),
    ImmutableData(ImmutableDataHolderGene),
    SqlAutoIncrement,
    SqlPrimaryKey(SqlPrimaryKeyGene),
    SqlForeignKey(SqlForeignKeyGene),
    Object(ObjectGene),
    Array(ArrayGene),
    Map(MapGene),
    Optional(OptionalGene),
    Disruptive(DisruptiveGene),
    /// Placeholder that stops an infinitely recursive schema
    CycleObject,
}

impl GeneKind {
    pub fn type_name(&self) -> &'static str {
        match self {
            GeneKind::String(_) => "StringGene",
            GeneKind::Integer(_) => "IntegerGene",
            GeneKind::Long(_) => "LongGene",
            GeneKind::Float(_) => "FloatGene",
            GeneKind::Double(_) => "DoubleGene",
            GeneKind::Boolean(_) => "BooleanGene",
            GeneKind::Enum(_) => "EnumGene",
            GeneKind::Date(_) => "DateGene",
            GeneKind::Time(_) => "TimeGene",
            GeneKind::DateTime(_) => "DateTimeGene",
            GeneKind::Base64(_) => "Base64StringGene",
            GeneKind::Regex(_) => "RegexGene",
            GeneKind::ImmutableData(_) => "ImmutableDataHolderGene",
            GeneKind::SqlAutoIncrement => "SqlAutoIncrementGene",
            GeneKind::SqlPrimaryKey(_) => "SqlPrimaryKeyGene",
            GeneKind::SqlForeignKey(_) => "SqlForeignKeyGene",
            GeneKind::Object(_) => "ObjectGene",
            GeneKind::Array(_) => "ArrayGene",
            GeneKind::Map(_) => "MapGene",
            GeneKind::Optional(_) => "OptionalGene",
            GeneKind::Disruptive(_) => "DisruptiveGene",
            GeneKind::CycleObject => "CycleObjectGene",
        }
    }

    /// Primary/foreign keys, auto-increments and immutable holders
    pub fn is_key_like(&self) -> bool {
        matches!(
            self,
            GeneKind::SqlPrimaryKey(_)
                | GeneKind::SqlForeignKey(_)
                | GeneKind::SqlAutoIncrement
                | GeneKind::ImmutableData(_)
        )
    }

    /// Wrappers and containers, i.e. genes without a value of their own
    pub fn is_structural(&self) -> bool {
        matches!(
            self,
            GeneKind::Object(_)
                | GeneKind::Array(_)
                | GeneKind::Map(_)
                | GeneKind::Optional(_)
                | GeneKind::Disruptive(_)
        )
    }
}

impl Gene {
    pub fn new(name: impl Into<String>, kind: GeneKind) -> Self {
        Self {
            name: name.into(),
            kind,
        }
    }

    pub fn string(name: impl Into<String>, value: impl Into<String>) -> Self {
        Self::new(name, GeneKind::String(StringGene::new(value)))
    }

    pub fn integer(name: impl Into<String>, value: i32) -> Self {
        Self::new(name, GeneKind::Integer(IntegerGene::new(value)))
    }

    pub fn long(name: impl Into<String>, value: i64) -> Self {
        Self::new(name, GeneKind::Long(LongGene::new(value)))
    }

    pub fn float(name: impl Into<String>, value: f32) -> Self {
        Self::new(name, GeneKind::Float(FloatGene::new(value)))
    }

    pub fn double(name: impl Into<String>, value: f64) -> Self {
        Self::new(name, GeneKind::Double(DoubleGene::new(value)))
    }

    pub fn boolean(name: impl Into<String>, value: bool) -> Self {
        Self::new(name, GeneKind::Boolean(BooleanGene::new(value)))
    }

    pub fn enumeration(name: impl Into<String>, values: Vec<String>) -> Self {
        Self::new(name, GeneKind::Enum(EnumGene::new(values)))
    }

    pub fn object(name: impl Into<String>, fields: Vec<Gene>) -> Result<Self> {
        Ok(Self::new(name, GeneKind::Object(ObjectGene::new(fields)?)))
    }

    pub fn optional(name: impl Into<String>, gene: Gene) -> Self {
        Self::new(name, GeneKind::Optional(OptionalGene::new(gene)))
    }

    pub fn disruptive(gene: Gene, probability: f64) -> Self {
        Self::new(
            DisruptiveGene::NAME,
            GeneKind::Disruptive(DisruptiveGene::new(gene, probability)),
        )
    }

    /// Deep copy, sharing no mutable state with `self`
    pub fn copy(&self) -> Gene {
        self.clone()
    }

    pub fn type_name(&self) -> &'static str {
        self.kind.type_name()
    }

    pub fn as_string(&self) -> Option<&StringGene> {
        match &self.kind {
            GeneKind::String(g) => Some(g),
            _ => None,
        }
    }

    pub fn as_string_mut(&mut self) -> Option<&mut StringGene> {
        match &mut self.kind {
            GeneKind::String(g) => Some(g),
            _ => None,
        }
    }

    pub fn children(&self) -> Vec<&Gene> {
        match &self.kind {
            GeneKind::String(g) => g.specialization_genes.iter().collect(),
            GeneKind::Base64(g) => vec![g.data()],
            GeneKind::SqlPrimaryKey(g) => vec![&*g.gene],
            GeneKind::Object(g) => g.fields.iter().collect(),
            GeneKind::Array(g) => g.elements.iter().collect(),
            GeneKind::Map(g) => g.elements.iter().collect(),
            GeneKind::Optional(g) => vec![&*g.gene],
            GeneKind::Disruptive(g) => vec![&*g.gene],
            _ => Vec::new(),
        }
    }

    pub fn child(&self, index: usize) -> Option<&Gene> {
        self.children().into_iter().nth(index)
    }

    pub fn child_mut(&mut self, index: usize) -> Option<&mut Gene> {
        match &mut self.kind {
            GeneKind::String(g) => g.specialization_genes.get_mut(index),
            GeneKind::Base64(g) if index == 0 => Some(g.data_mut()),
            GeneKind::SqlPrimaryKey(g) if index == 0 => Some(&mut *g.gene),
            GeneKind::Object(g) => g.fields.get_mut(index),
            GeneKind::Array(g) => g.elements.get_mut(index),
            GeneKind::Map(g) => g.elements.get_mut(index),
            GeneKind::Optional(g) if index == 0 => Some(&mut *g.gene),
            GeneKind::Disruptive(g) if index == 0 => Some(&mut *g.gene),
            _ => None,
        }
    }

    pub fn get_at(&self, path: &[usize]) -> Option<&Gene> {
        path.iter().try_fold(self, |gene, &i| gene.child(i))
    }

    pub fn get_at_mut(&mut self, path: &[usize]) -> Option<&mut Gene> {
        let mut gene = self;
        for &i in path {
            gene = gene.child_mut(i)?;
        }
        Some(gene)
    }

    /// All genes of this subtree in pre-order
    pub fn flat_view(&self) -> FlatView<'_, fn(&Gene) -> bool> {
        FlatView::new(self, |_| false)
    }

    /// Pre-order walk that does not descend below genes matching `exclude`
    pub fn flat_view_excluding<F>(&self, exclude: F) -> FlatView<'_, F>
    where
        F: Fn(&Gene) -> bool,
    {
        FlatView::new(self, exclude)
    }

    pub fn flat_view_with_paths<F>(&self, exclude: F) -> FlatPaths<'_, F>
    where
        F: Fn(&Gene) -> bool,
    {
        FlatPaths::new(self, exclude)
    }

    /// Mutable visit of every gene of the subtree, in pre-order
    pub fn visit_mut<F>(&mut self, f: &mut F)
    where
        F: FnMut(&mut Gene),
    {
        f(self);
        let mut i = 0;
        while let Some(child) = self.child_mut(i) {
            child.visit_mut(f);
            i += 1;
        }
    }

    pub fn is_mutable(&self) -> bool {
        match &self.kind {
            GeneKind::String(g) => g.is_mutable(),
            GeneKind::Integer(g) => g.min < g.max,
            GeneKind::Long(g) => g.min < g.max,
            GeneKind::Enum(g) => g.values.len() > 1,
            GeneKind::Base64(g) => g.data().is_mutable(),
            GeneKind::ImmutableData(_)
            | GeneKind::SqlAutoIncrement
            | GeneKind::SqlForeignKey(_)
            | GeneKind::CycleObject => false,
            GeneKind::SqlPrimaryKey(g) => g.gene.is_mutable(),
            GeneKind::Object(g) => g.fields.iter().any(Gene::is_mutable),
            GeneKind::Array(g) => g.is_mutable(),
            GeneKind::Map(g) => g.is_mutable(),
            GeneKind::Optional(_) => true,
            GeneKind::Disruptive(g) => g.probability > 0.0 && g.gene.is_mutable(),
            _ => true,
        }
    }

    /// Assign a fresh value within the gene's constraints.
    ///
    /// With `force_new_value` the previous value is avoided whenever the
    /// constraints leave another option. String binding synchronization is
    /// done by the owner of the tree, see `Individual::randomize`.
    pub fn randomize(&mut self, rng: &mut Randomness, force_new_value: bool) {
        match &mut self.kind {
            GeneKind::String(g) => g.randomize(rng, force_new_value),
            GeneKind::Integer(g) => g.randomize(rng, force_new_value),
            GeneKind::Long(g) => g.randomize(rng, force_new_value),
            GeneKind::Float(g) => g.randomize(rng, force_new_value),
            GeneKind::Double(g) => g.randomize(rng, force_new_value),
            GeneKind::Boolean(g) => g.randomize(rng, force_new_value),
            GeneKind::Enum(g) => g.randomize(rng, force_new_value),
            GeneKind::Date(g) => g.randomize(rng, force_new_value),
            GeneKind::Time(g) => g.randomize(rng, force_new_value),
            GeneKind::DateTime(g) => g.randomize(rng, force_new_value),
            GeneKind::Base64(g) => g.data_mut().randomize(rng, force_new_value),
            GeneKind::Regex(g) => g.randomize(rng, force_new_value),
            GeneKind::SqlPrimaryKey(g) => g.gene.randomize(rng, force_new_value),
            GeneKind::Object(g) => g
                .fields
                .iter_mut()
                .for_each(|f| f.randomize(rng, force_new_value)),
            GeneKind::Array(g) => g.randomize(rng, force_new_value),
            GeneKind::Map(g) => g.randomize(rng, force_new_value),
            GeneKind::Optional(g) => g.randomize(rng, force_new_value),
            GeneKind::Disruptive(g) => g.gene.randomize(rng, force_new_value),
            GeneKind::ImmutableData(_)
            | GeneKind::SqlAutoIncrement
            | GeneKind::SqlForeignKey(_)
            | GeneKind::CycleObject => {}
        }
    }

    /// Apply one meaningful change, returns whether the value changed
    pub fn standard_mutation(&mut self, ctx: &mut MutationContext<'_>) -> bool {
        match &mut self.kind {
            GeneKind::String(g) => g.mutate(ctx),
            GeneKind::Integer(g) => g.mutate(ctx.rng, ctx.apc),
            GeneKind::Long(g) => g.mutate(ctx.rng, ctx.apc),
            GeneKind::Float(g) => g.mutate(ctx.rng, ctx.apc),
            GeneKind::Double(g) => g.mutate(ctx.rng, ctx.apc),
            GeneKind::Boolean(g) => g.mutate(),
            GeneKind::Enum(g) => g.mutate(ctx.rng),
            GeneKind::Date(g) => g.mutate(ctx.rng, ctx.apc),
            GeneKind::Time(g) => g.mutate(ctx.rng, ctx.apc),
            GeneKind::DateTime(g) => g.mutate(ctx.rng, ctx.apc),
            GeneKind::Base64(g) => ctx.in_child(0, |ctx| g.data_mut().standard_mutation(ctx)),
            GeneKind::Regex(g) => {
                g.randomize(ctx.rng, true);
                true
            }
            GeneKind::SqlPrimaryKey(g) => ctx.in_child(0, |ctx| g.gene.standard_mutation(ctx)),
            GeneKind::Object(g) => g.mutate(ctx),
            GeneKind::Array(g) => g.mutate(ctx),
            GeneKind::Map(g) => g.mutate(ctx),
            GeneKind::Optional(g) => g.mutate(ctx),
            GeneKind::Disruptive(g) => {
                if g.probability <= 0.0 {
                    return false;
                }
                ctx.in_child(0, |ctx| g.gene.standard_mutation(ctx))
            }
            GeneKind::ImmutableData(_)
            | GeneKind::SqlAutoIncrement
            | GeneKind::SqlForeignKey(_)
            | GeneKind::CycleObject => false,
        }
    }

    /// Bring the value back within its constraints
    pub fn repair(&mut self) {
        self.visit_mut(&mut |gene| match &mut gene.kind {
            GeneKind::String(g) => g.repair(),
            GeneKind::Integer(g) => g.repair(),
            GeneKind::Long(g) => g.repair(),
            GeneKind::Date(g) => g.repair(),
            GeneKind::Time(g) => g.repair(),
            GeneKind::DateTime(g) => g.repair(),
            _ => {}
        });
    }

    /// Relative weight of this gene when choosing what to mutate
    pub fn mutation_weight(&self) -> f64 {
        match &self.kind {
            GeneKind::String(g) => g.mutation_weight(),
            GeneKind::Disruptive(g) => g.probability * g.gene.mutation_weight(),
            GeneKind::Object(g) => g.fields.iter().map(Gene::mutation_weight).sum::<f64>().max(1.0),
            _ => 1.0,
        }
    }

    /// Overwrite this gene's value from a gene of the same variant
    pub fn copy_value_from(&mut self, other: &Gene) -> Result<()> {
        let expected = self.type_name();
        match (&mut self.kind, &other.kind) {
            (GeneKind::String(a), GeneKind::String(b)) => a.copy_value_from(b),
            (GeneKind::Integer(a), GeneKind::Integer(b)) => a.value = b.value,
            (GeneKind::Long(a), GeneKind::Long(b)) => a.value = b.value,
            (GeneKind::Float(a), GeneKind::Float(b)) => a.value = b.value,
            (GeneKind::Double(a), GeneKind::Double(b)) => a.value = b.value,
            (GeneKind::Boolean(a), GeneKind::Boolean(b)) => a.value = b.value,
            (GeneKind::Enum(a), GeneKind::Enum(b)) => a.copy_value_from(b),
            (GeneKind::Date(a), GeneKind::Date(b)) => a.copy_value_from(b),
            (GeneKind::Time(a), GeneKind::Time(b)) => a.copy_value_from(b),
            (GeneKind::DateTime(a), GeneKind::DateTime(b)) => {
                a.date.copy_value_from(&b.date);
                a.time.copy_value_from(&b.time);
            }
            (GeneKind::Base64(a), GeneKind::Base64(b)) => a.data_mut().copy_value_from(b.data())?,
            (GeneKind::Regex(a), GeneKind::Regex(b)) => a.value = b.value.clone(),
            (GeneKind::ImmutableData(a), GeneKind::ImmutableData(b)) => a.value = b.value.clone(),
            (GeneKind::SqlAutoIncrement, GeneKind::SqlAutoIncrement) => {}
            (GeneKind::SqlPrimaryKey(a), GeneKind::SqlPrimaryKey(b)) => a.gene.copy_value_from(&b.gene)?,
            (GeneKind::SqlForeignKey(a), GeneKind::SqlForeignKey(b)) => {
                a.unique_id_of_primary_key = b.unique_id_of_primary_key
            }
            (GeneKind::Object(a), GeneKind::Object(b)) => a.copy_value_from(b)?,
            (GeneKind::Array(a), GeneKind::Array(b)) => a.elements = b.elements.clone(),
            (GeneKind::Map(a), GeneKind::Map(b)) => a.elements = b.elements.clone(),
            (GeneKind::Optional(a), GeneKind::Optional(b)) => {
                a.gene.copy_value_from(&b.gene)?;
                a.is_active = b.is_active;
            }
            (GeneKind::Disruptive(a), GeneKind::Disruptive(b)) => a.gene.copy_value_from(&b.gene)?,
            (GeneKind::CycleObject, GeneKind::CycleObject) => {}
            (_, actual) => return Err(EvogeneError::type_mismatch(expected, actual.type_name())),
        }
        Ok(())
    }

    /// Value equality with a gene of the same variant
    pub fn contains_same_value_as(&self, other: &Gene) -> Result<bool> {
        let same = match (&self.kind, &other.kind) {
            (GeneKind::String(a), GeneKind::String(b)) => a.contains_same_value_as(b),
            (GeneKind::Integer(a), GeneKind::Integer(b)) => a.value == b.value,
            (GeneKind::Long(a), GeneKind::Long(b)) => a.value == b.value,
            (GeneKind::Float(a), GeneKind::Float(b)) => a.value == b.value,
            (GeneKind::Double(a), GeneKind::Double(b)) => a.value == b.value,
            (GeneKind::Boolean(a), GeneKind::Boolean(b)) => a.value == b.value,
            (GeneKind::Enum(a), GeneKind::Enum(b)) => a.value() == b.value(),
            (GeneKind::Date(a), GeneKind::Date(b)) => a.raw_value() == b.raw_value(),
            (GeneKind::Time(a), GeneKind::Time(b)) => a.raw_value() == b.raw_value(),
            (GeneKind::DateTime(a), GeneKind::DateTime(b)) => a.raw_value() == b.raw_value(),
            (GeneKind::Base64(a), GeneKind::Base64(b)) => a.data().contains_same_value_as(b.data())?,
            (GeneKind::Regex(a), GeneKind::Regex(b)) => a.value == b.value,
            (GeneKind::ImmutableData(a), GeneKind::ImmutableData(b)) => a.value == b.value,
            (GeneKind::SqlAutoIncrement, GeneKind::SqlAutoIncrement) => true,
            (GeneKind::SqlPrimaryKey(a), GeneKind::SqlPrimaryKey(b)) => {
                a.gene.contains_same_value_as(&b.gene)?
            }
            (GeneKind::SqlForeignKey(a), GeneKind::SqlForeignKey(b)) => {
                a.unique_id_of_primary_key == b.unique_id_of_primary_key
            }
            (GeneKind::Object(a), GeneKind::Object(b)) => a.contains_same_value_as(b)?,
            (GeneKind::Array(a), GeneKind::Array(b)) => same_elements(&a.elements, &b.elements)?,
            (GeneKind::Map(a), GeneKind::Map(b)) => same_elements(&a.elements, &b.elements)?,
            (GeneKind::Optional(a), GeneKind::Optional(b)) => {
                a.is_active == b.is_active && a.gene.contains_same_value_as(&b.gene)?
            }
            (GeneKind::Disruptive(a), GeneKind::Disruptive(b)) => {
                a.gene.contains_same_value_as(&b.gene)?
            }
            (GeneKind::CycleObject, GeneKind::CycleObject) => true,
            (expected, actual) => {
                return Err(EvogeneError::type_mismatch(
                    expected.type_name(),
                    actual.type_name(),
                ))
            }
        };
        Ok(same)
    }

    /// Effective value as JSON; inactive optionals are omitted from containers
    pub fn to_json_value(&self) -> serde_json::Value {
        use serde_json::Value;

        match &self.kind {
            GeneKind::String(g) => Value::String(g.raw_value()),
            GeneKind::Integer(g) => Value::from(g.value),
            GeneKind::Long(g) => Value::from(g.value),
            GeneKind::Float(g) => float_json(g.value as f64),
            GeneKind::Double(g) => float_json(g.value),
            GeneKind::Boolean(g) => Value::Bool(g.value),
            GeneKind::Enum(g) => g.value().map(|v| Value::String(v.to_string())).unwrap_or(Value::Null),
            GeneKind::Date(g) => Value::String(g.raw_value()),
            GeneKind::Time(g) => Value::String(g.raw_value()),
            GeneKind::DateTime(g) => Value::String(g.raw_value()),
            GeneKind::Base64(g) => Value::String(g.encoded()),
            GeneKind::Regex(g) => Value::String(g.value.clone()),
            GeneKind::ImmutableData(g) => Value::String(g.value.clone()),
            GeneKind::SqlAutoIncrement | GeneKind::CycleObject => Value::Null,
            GeneKind::SqlPrimaryKey(g) => g.gene.to_json_value(),
            GeneKind::SqlForeignKey(g) => Value::from(g.unique_id_of_primary_key),
            GeneKind::Object(g) => Value::Object(
                g.fields
                    .iter()
                    .filter(|f| f.is_printable())
                    .map(|f| (f.name.clone(), f.to_json_value()))
                    .collect(),
            ),
            GeneKind::Array(g) => Value::Array(
                g.elements
                    .iter()
                    .filter(|e| e.is_printable())
                    .map(Gene::to_json_value)
                    .collect(),
            ),
            GeneKind::Map(g) => Value::Object(
                g.elements
                    .iter()
                    .filter(|e| e.is_printable())
                    .map(|e| (e.name.clone(), e.to_json_value()))
                    .collect(),
            ),
            GeneKind::Optional(g) if g.is_active => g.gene.to_json_value(),
            GeneKind::Optional(_) => Value::Null,
            GeneKind::Disruptive(g) => g.gene.to_json_value(),
        }
    }

    pub fn value_as_printable_string(&self) -> String {
        self.to_json_value().to_string()
    }

    pub fn value_as_raw_string(&self) -> String {
        match &self.kind {
            GeneKind::String(g) => g.raw_value(),
            GeneKind::Integer(g) => g.value.to_string(),
            GeneKind::Long(g) => g.value.to_string(),
            GeneKind::Float(g) => format!("{:?}", g.value),
            GeneKind::Double(g) => format!("{:?}", g.value),
            GeneKind::Boolean(g) => g.value.to_string(),
            GeneKind::Enum(g) => g.value().unwrap_or_default().to_string(),
            GeneKind::Date(g) => g.raw_value(),
            GeneKind::Time(g) => g.raw_value(),
            GeneKind::DateTime(g) => g.raw_value(),
            GeneKind::Base64(g) => g.encoded(),
            GeneKind::Regex(g) => g.value.clone(),
            GeneKind::ImmutableData(g) => g.value.clone(),
            GeneKind::SqlAutoIncrement | GeneKind::CycleObject => "null".to_string(),
            GeneKind::SqlPrimaryKey(g) => g.gene.value_as_raw_string(),
            GeneKind::SqlForeignKey(g) => g.unique_id_of_primary_key.to_string(),
            GeneKind::Optional(g) if !g.is_active => String::new(),
            GeneKind::Optional(g) => g.gene.value_as_raw_string(),
            GeneKind::Disruptive(g) => g.gene.value_as_raw_string(),
            GeneKind::Object(_) | GeneKind::Array(_) | GeneKind::Map(_) => {
                self.value_as_printable_string()
            }
        }
    }

    /// Fold the outcome of an evaluated mutation into the adaptive records.
    ///
    /// Only string-backed genes keep records; other variants ignore the call.
    pub fn archive_mutation_update(
        &mut self,
        original: &Gene,
        mutated: &Gene,
        evaluated: &BTreeMap<TargetId, EvaluatedMutation>,
    ) {
        match &mut self.kind {
            GeneKind::String(g) => match (&original.kind, &mutated.kind) {
                (GeneKind::String(o), GeneKind::String(m)) => {
                    g.mutation_info.update(&o.value, &m.value, evaluated)
                }
                (o, m) => warn!(
                    "archive update of StringGene '{}' with {} and {}",
                    self.name,
                    o.type_name(),
                    m.type_name()
                ),
            },
            GeneKind::Base64(g) => match (&original.kind, &mutated.kind) {
                (GeneKind::Base64(o), GeneKind::Base64(m)) => {
                    g.data_mut().archive_mutation_update(o.data(), m.data(), evaluated)
                }
                (o, m) => warn!(
                    "archive update of Base64StringGene '{}' with {} and {}",
                    self.name,
                    o.type_name(),
                    m.type_name()
                ),
            },
            _ => {}
        }
    }

    fn is_printable(&self) -> bool {
        !matches!(&self.kind, GeneKind::Optional(g) if !g.is_active)
    }
}

fn float_json(value: f64) -> serde_json::Value {
    serde_json::Number::from_f64(value)
        .map(serde_json::Value::Number)
        .unwrap_or(serde_json::Value::Null)
}

fn same_elements(a: &[Gene], b: &[Gene]) -> Result<bool> {
    if a.len() != b.len() {
        return Ok(false);
    }
    for (x, y) in a.iter().zip(b) {
        if x.name != y.name || !x.contains_same_value_as(y)? {
            return Ok(false);
        }
    }
    Ok(true)
}

#[cfg(test)]
mod tests {
    use super::*;

    fn sample_object() -> Gene {
        Gene::object(
            "pet",
            vec![
                Gene::string("name", "rex"),
                Gene::integer("age", 3),
                Gene::optional("tag", Gene::string("tag", "dog")),
            ],
        )
        .unwrap()
    }

    #[test]
    fn test_flat_view_is_pre_order() {
        let gene = sample_object();
        let names: Vec<&str> = gene.flat_view().map(|g| g.name.as_str()).collect();
        assert_eq!(names, vec!["pet", "name", "age", "tag", "tag"]);
    }

    #[test]
    fn test_flat_view_excluding_keeps_excluded_gene() {
        let gene = sample_object();
        let names: Vec<&str> = gene
            .flat_view_excluding(|g| matches!(g.kind, GeneKind::Optional(_)))
            .map(|g| g.name.as_str())
            .collect();
        assert_eq!(names, vec!["pet", "name", "age", "tag"]);
    }

    #[test]
    fn test_flat_view_is_restartable() {
        let gene = sample_object();
        let view = gene.flat_view();
        assert_eq!(view.clone().count(), view.count());
    }

    #[test]
    fn test_paths_resolve_to_same_gene() {
        let gene = sample_object();
        for (path, g) in gene.flat_view_with_paths(|_| false) {
            assert_eq!(gene.get_at(&path).map(|x| x.name.clone()), Some(g.name.clone()));
        }
    }

    #[test]
    fn test_copy_value_type_mismatch() {
        let mut a = Gene::integer("a", 1);
        let b = Gene::string("b", "x");
        let err = a.copy_value_from(&b).unwrap_err();
        assert!(matches!(err, EvogeneError::TypeMismatch { .. }));
        assert!(a.contains_same_value_as(&b).is_err());
    }

    #[test]
    fn test_inactive_optional_not_printed() {
        let mut gene = sample_object();
        if let GeneKind::Object(o) = &mut gene.kind {
            if let GeneKind::Optional(opt) = &mut o.fields[2].kind {
                opt.is_active = false;
            }
        }
        assert_eq!(gene.value_as_printable_string(), r#"{"name":"rex","age":3}"#);
    }

    #[test]
    fn test_failed_optional_copy_keeps_activation() {
        let mut target = Gene::optional("a", Gene::integer("a", 1));
        let mut source = Gene::optional("a", Gene::string("a", "x"));
        if let GeneKind::Optional(opt) = &mut source.kind {
            opt.is_active = false;
        }
        assert!(target.copy_value_from(&source).is_err());
        assert!(matches!(&target.kind, GeneKind::Optional(opt) if opt.is_active));
    }

    #[test]
    fn test_fields_printed_in_declaration_order() {
        let gene = Gene::object("pet", vec![Gene::integer("zeta", 1), Gene::boolean("alpha", true)]).unwrap();
        assert_eq!(gene.value_as_printable_string(), r#"{"zeta":1,"alpha":true}"#);
    }
}
