//! Builds the typed alternative genes a string can switch to once taint
//! analysis tells how the system under test uses it.

use super::regex::{ignore_case_regex, strip_anchors, RegexGene};
use super::{Gene, GeneKind};
use super::{BooleanGene, DateGene, DoubleGene, EnumGene, FloatGene, IntegerGene, LongGene};
use crate::types::{SpecializationKind, StringSpecializationInfo};
use log::{debug, warn};

/// Regexes that accept anything and so carry no information
const MEANINGLESS_REGEXES: [&str; 8] = [
    ".*",
    "(.*)",
    "^(.*)",
    "(.*)$",
    "^(.*)$",
    "^((.*))",
    "((.*))$",
    "^((.*))$",
];

pub(crate) fn is_addable(
    spec: &StringSpecializationInfo,
    invalid_chars: &[char],
    min_length: usize,
) -> bool {
    if spec.kind != SpecializationKind::Constant {
        return true;
    }
    !spec.value.chars().any(|c| invalid_chars.contains(&c))
        && spec.value.chars().count() >= min_length
}

pub(crate) fn is_meaningless_regex(pattern: &str) -> bool {
    MEANINGLESS_REGEXES.contains(&pattern)
}

/// One gene per group of hints; constants are merged into a single enum and
/// full-match regexes into a single disjunction.
pub(crate) fn build_specialization_genes(
    name: &str,
    specs: &[StringSpecializationInfo],
) -> Vec<Gene> {
    let mut genes = Vec::new();

    let of_kind = |kind: SpecializationKind| -> Vec<&str> {
        specs
            .iter()
            .filter(|s| s.kind == kind)
            .map(|s| s.value.as_str())
            .collect()
    };

    let constants = of_kind(SpecializationKind::Constant);
    if !constants.is_empty() {
        let values = constants.iter().map(|c| c.to_string()).collect();
        genes.push(Gene::new(name, GeneKind::Enum(EnumGene::new(values))));
    }

    let ignore_case = of_kind(SpecializationKind::ConstantIgnoreCase);
    if !ignore_case.is_empty() {
        let pattern = ignore_case
            .iter()
            .map(|c| ignore_case_regex(c))
            .collect::<Vec<_>>()
            .join("|");
        push_regex(&mut genes, name, &pattern);
    }

    for spec in specs {
        let kind = match spec.kind {
            SpecializationKind::DateYyyyMmDd => GeneKind::Date(DateGene::default()),
            SpecializationKind::Boolean => GeneKind::Boolean(BooleanGene::new(false)),
            SpecializationKind::Integer => GeneKind::Integer(IntegerGene::new(0)),
            SpecializationKind::Long => GeneKind::Long(LongGene::new(0)),
            SpecializationKind::Float => GeneKind::Float(FloatGene::new(0.0)),
            SpecializationKind::Double => GeneKind::Double(DoubleGene::new(0.0)),
            SpecializationKind::RegexPartial => {
                debug!("partial regex match on '{}' is not handled", spec.value);
                continue;
            }
            _ => continue,
        };
        genes.push(Gene::new(name, kind));
    }

    let regexes: Vec<String> = of_kind(SpecializationKind::RegexWhole)
        .into_iter()
        .filter(|r| !is_meaningless_regex(r))
        .map(|r| format!("({})", strip_anchors(r)))
        .collect();
    if !regexes.is_empty() {
        push_regex(&mut genes, name, &regexes.join("|"));
    }

    genes
}

fn push_regex(genes: &mut Vec<Gene>, name: &str, pattern: &str) {
    match RegexGene::new(pattern) {
        Ok(gene) => genes.push(Gene::new(name, GeneKind::Regex(gene))),
        Err(e) => warn!("Skipping regex specialization for '{}': {}", name, e),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn spec(kind: SpecializationKind, value: &str) -> StringSpecializationInfo {
        StringSpecializationInfo::new(kind, value)
    }

    #[test]
    fn test_constants_merge_into_one_enum() {
        let genes = build_specialization_genes(
            "status",
            &[
                spec(SpecializationKind::Constant, "open"),
                spec(SpecializationKind::Constant, "closed"),
                spec(SpecializationKind::Integer, ""),
            ],
        );
        assert_eq!(genes.len(), 2);
        match &genes[0].kind {
            GeneKind::Enum(e) => assert_eq!(e.values, vec!["open", "closed"]),
            other => panic!("unexpected {}", other.type_name()),
        }
        assert!(matches!(genes[1].kind, GeneKind::Integer(_)));
    }

    #[test]
    fn test_meaningless_regex_is_dropped() {
        let genes = build_specialization_genes(
            "x",
            &[
                spec(SpecializationKind::RegexWhole, "^(.*)$"),
                spec(SpecializationKind::RegexPartial, "abc"),
            ],
        );
        assert!(genes.is_empty());
    }

    #[test]
    fn test_constant_with_invalid_char_not_addable() {
        let hint = spec(SpecializationKind::Constant, "a/b");
        assert!(!is_addable(&hint, &['/'], 0));
        assert!(!is_addable(&spec(SpecializationKind::Constant, "ab"), &[], 3));
        assert!(is_addable(&spec(SpecializationKind::Boolean, "a/b"), &['/'], 3));
    }
}
