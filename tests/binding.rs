use evogene::config::MutationConfig;
use evogene::engines::binding::param_util::{
    bind_param_to_db_action, bind_param_with_db_action, bind_param_with_matched_target,
    exist_body_param, is_all_body_param,
};
use evogene::engines::binding::{score_of_match, Action, DbAction, Param};
use evogene::engines::mutation::{AdaptiveParameterControl, GeneMutator, Randomness};
use evogene::engines::search::Individual;
use evogene::genes::{Gene, GeneKind, RegexGene, SqlPrimaryKeyGene, StringGene};
use evogene::types::ParamKind;

fn bound_string(name: &str, value: &str, id: &str) -> Gene {
    let mut gene = StringGene::new(value);
    gene.binding_ids.insert(id.to_string());
    Gene::new(name, GeneKind::String(gene))
}

fn raw(individual: &Individual, action: usize) -> String {
    individual.actions[action].params[0].gene.value_as_raw_string()
}

fn bound_pair() -> Individual {
    Individual::new(
        Vec::new(),
        vec![
            Action::new(
                "GET",
                "/users",
                vec![Param::new("q", ParamKind::Query, bound_string("q", "foo", "b1"))],
            ),
            Action::new(
                "GET",
                "/items",
                vec![Param::new("x-user", ParamKind::Header, bound_string("x-user", "bar", "b1"))],
            ),
        ],
    )
}

#[test]
fn test_randomize_synchronizes_binding_groups() {
    let mut individual = bound_pair();
    let mut rng = Randomness::new(Some(8));
    individual.randomize(&mut rng);
    assert_eq!(raw(&individual, 0), raw(&individual, 1));
}

#[test]
fn test_bound_strings_stay_equal_under_mutation() {
    let mut individual = bound_pair();
    let mut rng = Randomness::new(Some(21));
    let apc = AdaptiveParameterControl::new(0.8, MutationConfig::default());
    let mut mutator = GeneMutator::new();
    individual.randomize(&mut rng);

    for _ in 0..200 {
        let mutated = mutator.mutate_individual(&mut individual, &mut rng, &apc, &[]);
        assert!(!mutated.is_empty());
        assert_eq!(raw(&individual, 0), raw(&individual, 1));
    }
}

#[test]
fn test_bound_strings_stay_equal_under_adaptive_mutation() {
    let mut individual = bound_pair();
    let mut rng = Randomness::new(Some(4));
    let apc = AdaptiveParameterControl::new(
        0.8,
        MutationConfig {
            adaptive_gene_mutation: true,
            ..MutationConfig::default()
        },
    );
    let mut mutator = GeneMutator::new();

    for _ in 0..100 {
        mutator.mutate_individual(&mut individual, &mut rng, &apc, &[1]);
        assert_eq!(raw(&individual, 0), raw(&individual, 1));
    }
}

#[test]
fn test_unbound_strings_are_independent() {
    let mut individual = Individual::new(
        Vec::new(),
        vec![Action::new(
            "GET",
            "/users",
            vec![
                Param::new("a", ParamKind::Query, bound_string("a", "same", "b1")),
                Param::new("b", ParamKind::Query, Gene::string("b", "same")),
            ],
        )],
    );
    let origin = individual.root_addresses()[0].clone();
    let updated = individual.sync_bindings(&origin, &["b1".to_string()].into(), "new");
    assert!(updated.is_empty());
    assert_eq!(individual.actions[0].params[1].gene.value_as_raw_string(), "same");
}

#[test]
fn test_path_param_bound_from_created_body() {
    let body = Gene::object("body", vec![Gene::integer("id", 42), Gene::string("name", "rex")]).unwrap();
    let mut individual = Individual::new(
        Vec::new(),
        vec![
            Action::new("POST", "/pets", vec![Param::new("body", ParamKind::Body, body)]),
            Action::new(
                "GET",
                "/pets/{id}",
                vec![Param::new("id", ParamKind::Path, Gene::disruptive(Gene::string("id", "x"), 0.5))],
            ),
        ],
    );

    assert_eq!(individual.bind_action_params(1, 0), 1);
    assert_eq!(raw(&individual, 1), "42");
}

#[test]
fn test_query_param_bound_by_name() {
    let mut individual = Individual::new(
        Vec::new(),
        vec![
            Action::new("GET", "/pets", vec![Param::new("limit", ParamKind::Query, Gene::integer("limit", 5))]),
            Action::new("GET", "/toys", vec![Param::new("limit", ParamKind::Query, Gene::long("limit", 0))]),
        ],
    );
    assert_eq!(individual.bind_action_params(1, 0), 1);
    assert_eq!(raw(&individual, 1), "5");
}

#[test]
fn test_body_bound_only_from_covering_body() {
    let small = || Gene::object("body", vec![Gene::string("name", "a")]).unwrap();
    let large = || {
        Gene::object("body", vec![Gene::string("name", "b"), Gene::boolean("vip", true)]).unwrap()
    };

    let mut individual = Individual::new(
        Vec::new(),
        vec![
            Action::new("POST", "/users", vec![Param::new("body", ParamKind::Body, large())]),
            Action::new("PUT", "/users", vec![Param::new("body", ParamKind::Body, small())]),
        ],
    );

    // the small body cannot give a value to "vip"
    assert_eq!(individual.bind_action_params(0, 1), 0);
    assert_eq!(individual.bind_action_params(1, 0), 1);
    assert_eq!(individual.actions[1].params[0].gene.value_as_printable_string(), r#"{"name":"b"}"#);
}

#[test]
fn test_score_counts_unmatched_tokens() {
    assert_eq!(score_of_match("id@toys@pets", "id@pets", false), 1);
    assert_eq!(score_of_match("name@pets", "id@pets", false), -1);
    assert_eq!(score_of_match("id@d_@pets", "id@pets", false), 0);
}

fn pets_row(existing: bool) -> DbAction {
    DbAction::new(
        "pets",
        vec![
            Gene::new(
                "id",
                GeneKind::SqlPrimaryKey(SqlPrimaryKeyGene::new("pets", 1, Gene::long("id", 11))),
            ),
            Gene::string("name", "rex"),
        ],
        existing,
    )
}

fn regex_gene(name: &str, value: &str) -> Gene {
    let mut gene = RegexGene::new("[a-z]+").unwrap();
    gene.value = value.to_string();
    Gene::new(name, GeneKind::Regex(gene))
}

#[test]
fn test_existing_row_gives_value_to_param() {
    let mut db = Gene::integer("age", 5);
    let mut param = Gene::integer("age", 9);
    assert!(bind_param_with_db_action(&mut db, &mut param, true, false));
    assert_eq!(param.value_as_raw_string(), "5");
    assert_eq!(db.value_as_raw_string(), "5");
}

#[test]
fn test_new_row_takes_value_from_param() {
    let mut db = Gene::integer("age", 5);
    let mut param = Gene::integer("age", 9);
    assert!(bind_param_with_db_action(&mut db, &mut param, false, false));
    assert_eq!(db.value_as_raw_string(), "9");
    assert_eq!(param.value_as_raw_string(), "9");
}

#[test]
fn test_flexible_binding_follows_rank() {
    // an integer column is a stronger source than a string param
    let mut db = Gene::integer("age", 5);
    let mut param = Gene::string("age", "abc");
    assert!(bind_param_with_db_action(&mut db, &mut param, false, true));
    assert_eq!(param.value_as_raw_string(), "5");

    let mut db = Gene::string("age", "abc");
    let mut param = Gene::integer("age", 9);
    assert!(bind_param_with_db_action(&mut db, &mut param, false, true));
    assert_eq!(db.value_as_raw_string(), "9");
    assert_eq!(param.value_as_raw_string(), "9");
}

#[test]
fn test_unranked_genes_copy_into_new_row() {
    let mut db = regex_gene("code", "abc");
    let mut param = regex_gene("code", "xyz");
    assert!(bind_param_with_db_action(&mut db, &mut param, false, true));
    assert_eq!(db.value_as_raw_string(), "xyz");
    assert_eq!(param.value_as_raw_string(), "xyz");
}

#[test]
fn test_param_bound_to_most_similar_column() {
    let mut row = pets_row(false);
    let mut param = Param::new("name", ParamKind::Query, Gene::string("name", "bob"));
    assert!(bind_param_to_db_action(&mut row, &mut param, "pets", false));
    assert_eq!(row.genes[1].value_as_raw_string(), "bob");

    let mut row = pets_row(true);
    let mut param = Param::new("name", ParamKind::Query, Gene::string("name", "bob"));
    assert!(bind_param_to_db_action(&mut row, &mut param, "pets", true));
    assert_eq!(param.gene.value_as_raw_string(), "rex");
    assert_eq!(row.genes[1].value_as_raw_string(), "rex");
}

#[test]
fn test_general_column_name_qualified_by_table() {
    let mut row = pets_row(false);
    let mut param = Param::new("petId", ParamKind::Path, Gene::long("petId", 0));
    assert!(bind_param_to_db_action(&mut row, &mut param, "owners", false));
    // the key always gives its value
    assert_eq!(param.gene.value_as_raw_string(), "11");
}

#[test]
fn test_dissimilar_param_left_unbound() {
    let mut row = pets_row(false);
    let mut param = Param::new("colour", ParamKind::Query, Gene::string("colour", "red"));
    assert!(!bind_param_to_db_action(&mut row, &mut param, "pets", false));
    assert_eq!(param.gene.value_as_raw_string(), "red");
    assert_eq!(row.genes[1].value_as_raw_string(), "rex");
}

#[test]
fn test_table_target_selects_primary_key() {
    let mut row = pets_row(false);
    let mut param = Param::new("id", ParamKind::Path, Gene::string("id", "x"));
    assert!(bind_param_with_matched_target(&mut row, &mut param, "Pets", false));
    assert_eq!(param.gene.value_as_raw_string(), "11");
}

#[test]
fn test_column_target_matched_by_name() {
    let mut row = pets_row(false);
    let mut param = Param::new("petName", ParamKind::Query, Gene::string("petName", "bob"));
    assert!(bind_param_with_matched_target(&mut row, &mut param, "NAME", false));
    assert_eq!(row.genes[1].value_as_raw_string(), "bob");

    let mut param = Param::new("petName", ParamKind::Query, Gene::string("petName", "bob"));
    assert!(!bind_param_with_matched_target(&mut row, &mut param, "owner", false));
}

#[test]
fn test_body_param_detection() {
    let body = || Param::new("body", ParamKind::Body, Gene::object("body", Vec::new()).unwrap());
    let query = || Param::new("q", ParamKind::Query, Gene::string("q", "x"));

    assert!(is_all_body_param(&[body()]));
    assert!(exist_body_param(&[query(), body()]));
    assert!(!is_all_body_param(&[query(), body()]));
    assert!(!exist_body_param(&[query()]));
}
