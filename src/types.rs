use serde::{Deserialize, Serialize};

/// Identifier of a coverage target (branch, line, status code...)
pub type TargetId = u32;

/// Outcome of a mutation with respect to one coverage target
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum EvaluatedMutation {
    BetterThan,
    EqualWith,
    WorseThan,
}

impl EvaluatedMutation {
    /// Classify a change of heuristic value, higher is better
    pub fn from_heuristics(before: f64, after: f64) -> Self {
        if after > before {
            EvaluatedMutation::BetterThan
        } else if after < before {
            EvaluatedMutation::WorseThan
        } else {
            EvaluatedMutation::EqualWith
        }
    }

    pub fn is_improved(self) -> bool {
        self == EvaluatedMutation::BetterThan
    }
}

/// Where a parameter lives in an outgoing call
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum ParamKind {
    Path,
    Query,
    Form,
    Header,
    Body,
}

/// Kind of usage hint produced by taint analysis on a tainted string
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub enum SpecializationKind {
    Constant,
    ConstantIgnoreCase,
    RegexWhole,
    RegexPartial,
    DateYyyyMmDd,
    Boolean,
    Integer,
    Long,
    Float,
    Double,
    /// Two inputs are compared for equality; the literal is a binding id
    Equal,
}

/// One specialization hint: a kind plus the literal observed at runtime
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub struct StringSpecializationInfo {
    pub kind: SpecializationKind,
    pub value: String,
}

impl StringSpecializationInfo {
    pub fn new(kind: SpecializationKind, value: impl Into<String>) -> Self {
        Self {
            kind,
            value: value.into(),
        }
    }
}
