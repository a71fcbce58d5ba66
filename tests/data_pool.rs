use evogene::config::DataPoolConfig;
use evogene::data::DataPool;
use evogene::engines::binding::param_util::object_gene_mut;
use evogene::engines::mutation::Randomness;
use evogene::genes::{Gene, GeneKind};

fn pool_with(threshold: usize) -> DataPool {
    DataPool::new(DataPoolConfig {
        max_size_data_pool: 10,
        threshold_distance_for_data_pool: threshold,
        probability_use_data_pool: 1.0,
    })
}

#[test]
fn test_exact_key_after_normalization() {
    let mut pool = pool_with(2);
    let mut rng = Randomness::new(Some(42));
    pool.add_value("pet", "cat");

    assert_eq!(pool.extract_value("Pets", None, &mut rng), Some("cat".to_string()));
}

#[test]
fn test_key_qualified_by_object_name() {
    let mut pool = pool_with(0);
    let mut rng = Randomness::new(Some(42));
    pool.add_value("petid", "5");

    // "id" alone is unknown, but "pet" + "id" is stored
    assert_eq!(pool.extract_value("id", Some("pet"), &mut rng), Some("5".to_string()));
    assert_eq!(pool.extract_value("id", None, &mut rng), None);
}

#[test]
fn test_fuzzy_key_within_threshold() {
    let mut pool = pool_with(1);
    let mut rng = Randomness::new(Some(42));
    pool.add_value("pet", "cat");

    assert_eq!(pool.extract_value("pot", None, &mut rng), Some("cat".to_string()));
    assert_eq!(pool.extract_value("xyz", None, &mut rng), None);
}

#[test]
fn test_stored_key_contained_in_requested_key() {
    let mut pool = pool_with(0);
    let mut rng = Randomness::new(Some(42));
    pool.add_value("pet", "cat");

    assert_eq!(pool.extract_value("mypets", None, &mut rng), Some("cat".to_string()));
}

#[test]
fn test_empty_pool_has_nothing() {
    let pool = pool_with(2);
    let mut rng = Randomness::new(Some(42));
    assert!(pool.is_empty());
    assert_eq!(pool.extract_value("pet", None, &mut rng), None);
}

#[test]
fn test_oldest_value_evicted_when_full() {
    let mut pool = DataPool::new(DataPoolConfig {
        max_size_data_pool: 2,
        ..DataPoolConfig::default()
    });
    pool.add_value("pet", "a");
    pool.add_value("pet", "b");
    pool.add_value("pet", "c");

    let values: Vec<&String> = pool.values("pet").map(|v| v.iter().collect()).unwrap_or_default();
    assert_eq!(values, vec!["b", "c"]);
    assert_eq!(pool.len(), 1);
}

#[test]
fn test_seed_activates_optional() {
    let mut pool = pool_with(2);
    let mut rng = Randomness::new(Some(42));
    pool.add_value("name", "rex");

    let mut gene = Gene::optional("name", Gene::string("name", "foo"));
    if let GeneKind::Optional(g) = &mut gene.kind {
        g.is_active = false;
    }

    assert!(pool.seed_gene(&mut gene, "name", None, &mut rng));
    match &gene.kind {
        GeneKind::Optional(g) => {
            assert!(g.is_active);
            assert_eq!(g.gene.value_as_raw_string(), "rex");
        }
        _ => panic!("expected an optional gene"),
    }
}

#[test]
fn test_seed_rejects_unparsable_number() {
    let mut pool = pool_with(2);
    let mut rng = Randomness::new(Some(42));
    pool.add_value("age", "old");

    let mut gene = Gene::integer("age", 3);
    assert!(!pool.seed_gene(&mut gene, "age", None, &mut rng));
    assert_eq!(gene.value_as_raw_string(), "3");
}

#[test]
fn test_seed_never_used_with_zero_probability() {
    let mut pool = DataPool::new(DataPoolConfig {
        probability_use_data_pool: 0.0,
        ..DataPoolConfig::default()
    });
    let mut rng = Randomness::new(Some(42));
    pool.add_value("name", "rex");

    let mut gene = Gene::string("name", "foo");
    assert!(!pool.seed_gene(&mut gene, "name", None, &mut rng));
    assert_eq!(gene.value_as_raw_string(), "foo");
}

#[test]
fn test_body_field_seeded_by_name() {
    let mut pool = pool_with(0);
    let mut rng = Randomness::new(Some(42));
    pool.add_value("name", "rex");
    let mut body = Gene::object("body", vec![Gene::integer("id", 0), Gene::string("name", "pet")]).unwrap();

    // the object itself holds no value to seed
    assert!(!pool.seed_gene(&mut body, "name", Some("pet"), &mut rng));

    let field = object_gene_mut(&mut body).and_then(|o| o.field_mut("name")).unwrap();
    assert!(pool.seed_gene(field, "name", Some("pet"), &mut rng));
    assert_eq!(body.value_as_printable_string(), r#"{"id":0,"name":"rex"}"#);
}
