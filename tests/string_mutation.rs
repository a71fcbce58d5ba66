use evogene::config::MutationConfig;
use evogene::engines::mutation::{is_taint_input, AdaptiveParameterControl, MutationContext, Randomness, TaintNames};
use evogene::genes::StringGene;
use evogene::types::{SpecializationKind, StringSpecializationInfo};

fn apc_with(config: MutationConfig) -> AdaptiveParameterControl {
    AdaptiveParameterControl::new(0.8, config)
}

fn mutate(gene: &mut StringGene, rng: &mut Randomness, apc: &AdaptiveParameterControl, taint: &mut TaintNames) {
    let mut ctx = MutationContext::new(rng, apc, taint);
    gene.mutate(&mut ctx);
}

#[test]
fn test_mutation_keeps_length_and_char_constraints() {
    let mut rng = Randomness::new(Some(42));
    let apc = apc_with(MutationConfig::default());
    let mut taint = TaintNames::new();
    let mut gene = StringGene::with_bounds("bcd", 2, 6).with_invalid_chars(vec!['/', 'a']);

    for _ in 0..500 {
        mutate(&mut gene, &mut rng, &apc, &mut taint);
        let len = gene.length();
        assert!(len >= 2 && len <= 6, "length {} of '{}'", len, gene.value);
        assert!(!gene.value.contains('/') && !gene.value.contains('a'));
        // the taint marker never fits in six chars
        assert!(!gene.tainted);
    }
}

#[test]
fn test_taint_marker_written_early_in_search() {
    let mut rng = Randomness::new(Some(7));
    let apc = apc_with(MutationConfig::default());
    let mut taint = TaintNames::new();
    let mut gene = StringGene::new("foo");

    for _ in 0..20 {
        mutate(&mut gene, &mut rng, &apc, &mut taint);
        if gene.tainted {
            break;
        }
    }
    assert!(gene.tainted);
}

#[test]
fn test_no_taint_when_disabled() {
    let mut rng = Randomness::new(Some(7));
    let apc = apc_with(MutationConfig {
        taint_analysis_enabled: false,
        ..MutationConfig::default()
    });
    let mut taint = TaintNames::new();
    let mut gene = StringGene::new("foo");

    for _ in 0..200 {
        mutate(&mut gene, &mut rng, &apc, &mut taint);
        assert!(!gene.tainted);
        assert!(!is_taint_input(&gene.value));
    }
}

#[test]
fn test_no_taint_in_focused_search() {
    let mut rng = Randomness::new(Some(3));
    let mut apc = apc_with(MutationConfig::default());
    apc.record_progress(90, 100);
    let mut taint = TaintNames::new();
    let mut gene = StringGene::new("foo");

    for _ in 0..200 {
        mutate(&mut gene, &mut rng, &apc, &mut taint);
        assert!(!gene.tainted);
    }
}

#[test]
fn test_selected_specialization_always_exists() {
    let mut rng = Randomness::new(Some(99));
    let apc = apc_with(MutationConfig::default());
    let mut taint = TaintNames::new();
    let mut gene = StringGene::new("foo");
    gene.add_specializations(
        "foo",
        &[
            StringSpecializationInfo::new(SpecializationKind::Constant, "red"),
            StringSpecializationInfo::new(SpecializationKind::Constant, "blue"),
            StringSpecializationInfo::new(SpecializationKind::Integer, "42"),
        ],
        &mut rng,
    );
    // constants share one enum, the integer hint gets its own gene
    assert_eq!(gene.specialization_genes.len(), 2);
    assert!(gene.selection_updated_since_last_mutation);

    let mut selected_once = false;
    for _ in 0..300 {
        mutate(&mut gene, &mut rng, &apc, &mut taint);
        if let Some(i) = gene.selected_specialization {
            assert!(i < gene.specialization_genes.len());
            selected_once = true;
            let raw = gene.raw_value();
            assert_eq!(gene.specialization_gene().map(|g| g.value_as_raw_string()), Some(raw));
        }
    }
    assert!(selected_once);
}

#[test]
fn test_known_specializations_not_added_twice() {
    let mut rng = Randomness::new(Some(1));
    let mut gene = StringGene::new("foo");
    let spec = StringSpecializationInfo::new(SpecializationKind::Boolean, "true");

    gene.add_specializations("foo", &[spec.clone()], &mut rng);
    gene.add_specializations("foo", &[spec], &mut rng);
    assert_eq!(gene.specialization_genes.len(), 1);
    assert_eq!(gene.specializations().len(), 1);
}

#[test]
fn test_equality_hint_becomes_binding() {
    let mut rng = Randomness::new(Some(1));
    let mut gene = StringGene::new("foo");
    gene.add_specializations(
        "foo",
        &[StringSpecializationInfo::new(SpecializationKind::Equal, "b1")],
        &mut rng,
    );
    assert!(gene.binding_ids.contains("b1"));
    assert!(gene.specialization_genes.is_empty());
}

#[test]
fn test_binding_requested_on_mutation() {
    let mut rng = Randomness::new(Some(5));
    let apc = apc_with(MutationConfig::default());
    let mut taint = TaintNames::new();
    let mut gene = StringGene::new("foo");
    gene.binding_ids.insert("b1".to_string());

    let mut ctx = MutationContext::new(&mut rng, &apc, &mut taint);
    gene.mutate(&mut ctx);
    let pending = ctx.take_pending_bindings();

    assert_eq!(pending.len(), 1);
    assert!(pending[0].path.is_empty());
    assert_eq!(pending[0].value, gene.raw_value());
}

fn without_taint() -> AdaptiveParameterControl {
    apc_with(MutationConfig {
        taint_analysis_enabled: false,
        ..MutationConfig::default()
    })
}

#[test]
fn test_stale_taint_marker_is_replaced() {
    let apc = without_taint();
    let mut replaced = 0;

    for seed in 0..20 {
        let mut rng = Randomness::new(Some(seed));
        let mut taint = TaintNames::new();
        // char edits keep nine chars or more, a fresh random value has at most four
        let mut gene = StringGene::with_bounds("_EM_0_XYZ_", 0, 4);
        gene.tainted = true;

        mutate(&mut gene, &mut rng, &apc, &mut taint);
        if gene.length() <= 4 {
            assert!(!is_taint_input(&gene.value));
            replaced += 1;
        }
    }
    assert!(replaced > 0);
}

#[test]
fn test_untainted_marker_value_is_only_edited() {
    let apc = without_taint();
    for seed in 0..20 {
        let mut rng = Randomness::new(Some(seed));
        let mut taint = TaintNames::new();
        let mut gene = StringGene::with_bounds("_EM_0_XYZ_", 0, 4);

        mutate(&mut gene, &mut rng, &apc, &mut taint);
        assert!(gene.length() >= 9, "'{}'", gene.value);
    }
}

#[test]
fn test_value_seeded_from_other_strings() {
    let mut rng = Randomness::new(Some(11));
    let apc = without_taint();
    let mut taint = TaintNames::new();
    let mut gene = StringGene::with_bounds("abc", 0, 10);
    let pool = vec!["zzzzzzzz".to_string(), "x".repeat(30), "_EM_3_XYZ_".to_string()];

    let mut seeded = false;
    for _ in 0..2000 {
        let mut ctx = MutationContext::new(&mut rng, &apc, &mut taint).with_string_pool(pool.clone());
        gene.mutate(&mut ctx);
        // too long and marker values are never copied
        assert!(gene.value != pool[1] && !is_taint_input(&gene.value));
        if gene.value == pool[0] {
            seeded = true;
            break;
        }
    }
    assert!(seeded);
}
