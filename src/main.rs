use anyhow::Context;
use evogene::config::{AppConfig, ConfigManager};
use evogene::data::DataPool;
use evogene::engines::binding::param_util::{object_gene, object_gene_mut};
use evogene::engines::binding::{Action, Param};
use evogene::engines::mutation::{AdaptiveParameterControl, GeneMutator, Randomness};
use evogene::engines::search::{CoverageArchive, Individual};
use evogene::genes::Gene;
use evogene::types::{EvaluatedMutation, ParamKind, TargetId};
use log::info;
use std::collections::BTreeMap;

const NAME_LENGTH: TargetId = 1;
const MAGIC_ID: TargetId = 2;
const SAME_PET: TargetId = 3;

fn main() -> anyhow::Result<()> {
    env_logger::init();

    let manager = ConfigManager::new();
    if let Some(path) = std::env::args().nth(1) {
        manager
            .load_from_file(&path)
            .with_context(|| format!("loading configuration from {}", path))?;
    }
    let config = manager.get();

    let mut rng = Randomness::new(config.search.seed);
    let mut apc = AdaptiveParameterControl::new(
        config.search.focused_search_activation_time,
        config.mutation.clone(),
    );
    let mut mutator = GeneMutator::new();
    let mut archive = CoverageArchive::new();

    let mut pool = DataPool::new(config.data_pool.clone());
    pool.add_value("name", "rex");
    pool.add_value("names", "garfield");

    let mut current = sample_individual(&config)?;
    current.randomize(&mut rng);
    let pet_name = current.actions[0]
        .params
        .get_mut(0)
        .and_then(|p| object_gene_mut(&mut p.gene))
        .and_then(|body| body.field_mut("name"));
    if let Some(gene) = pet_name {
        pool.seed_gene(gene, "name", Some("pet"), &mut rng);
    }
    current.bind_action_params(1, 0);
    archive.try_add(&current, &evaluate(&current));

    let max = config.search.max_evaluations;
    for i in 0..max {
        apc.record_progress(i, max);

        let mut mutated = current.clone();
        let before = evaluate(&current);
        let targets: Vec<TargetId> = before.keys().copied().collect();
        let addresses = mutator.mutate_individual(&mut mutated, &mut rng, &apc, &targets);
        mutated.bind_action_params(1, 0);

        let after = evaluate(&mutated);
        let evaluated: BTreeMap<TargetId, EvaluatedMutation> = after
            .iter()
            .map(|(t, h)| {
                let previous = before.get(t).copied().unwrap_or(0.0);
                (*t, EvaluatedMutation::from_heuristics(previous, *h))
            })
            .collect();
        mutator.archive_mutation_update(&mut current, &mut mutated, &addresses, &evaluated);

        if archive.try_add(&mutated, &after) && evaluated.values().any(|e| e.is_improved()) {
            current = mutated;
        }
    }

    let minimized = archive.minimize_actions_per_covered_target(evaluate);
    info!(
        "Covered targets {:?} ({} minimized), heuristics {:?}",
        archive.covered_targets(),
        minimized,
        archive.heuristics()
    );
    info!("Best individual:\n{}", current.canonical_string());
    Ok(())
}

/// POST /pets with a body, then GET /pets/{id}
fn sample_individual(config: &AppConfig) -> anyhow::Result<Individual> {
    let body = Gene::object(
        "body",
        vec![
            Gene::integer("id", 0),
            Gene::string("name", "pet"),
            Gene::optional("tag", Gene::string("tag", "")),
        ],
    )?;
    let id = Gene::disruptive(Gene::integer("id", 0), 0.5);

    let mut actions = vec![
        Action::new("POST", "/pets", vec![Param::new("body", ParamKind::Body, body)]),
        Action::new("GET", "/pets/{id}", vec![Param::new("id", ParamKind::Path, id)]),
    ];
    actions.truncate(config.search.max_actions);
    Ok(Individual::new(Vec::new(), actions))
}

/// Toy heuristics standing in for the system under test
fn evaluate(individual: &Individual) -> BTreeMap<TargetId, f64> {
    let body = individual
        .actions
        .first()
        .and_then(|a| a.params.first())
        .and_then(|p| object_gene(&p.gene));
    let field = |name: &str| body.and_then(|o| o.field(name)).map(Gene::value_as_raw_string);

    let mut heuristics = BTreeMap::new();

    let name_len = field("name").map_or(0, |n| n.chars().count());
    heuristics.insert(NAME_LENGTH, (name_len as f64 / 8.0).min(1.0));

    let id: Option<i64> = field("id").and_then(|v| v.parse().ok());
    if let Some(id) = id {
        heuristics.insert(MAGIC_ID, 1.0 / (1.0 + (id - 42).abs() as f64));
    }

    let path_id: Option<i64> = individual
        .actions
        .get(1)
        .and_then(|a| a.params.first())
        .and_then(|p| p.gene.value_as_raw_string().parse().ok());
    if let (Some(a), Some(b)) = (id, path_id) {
        heuristics.insert(SAME_PET, 1.0 / (1.0 + (a - b).abs() as f64));
    }
    heuristics
}
