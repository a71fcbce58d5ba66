//! Binding of parameter values between dependent actions.
//!
//! Genes are matched through "name keys": the names on the way from a leaf
//! gene up to its parameter, followed by the reversed static tokens of the
//! action path, all joined with `@`. For example the `id` field of the body
//! of `POST /pets` gets the key `id@pets`.

use super::params::{DbAction, Param, RestPath};
use crate::error::{EvogeneError, Result};
use crate::genes::{DisruptiveGene, Gene, GeneKind, ObjectGene};
use crate::types::ParamKind;
use crate::utils::text::similarity;
use log::{debug, info, warn};

pub const DISRUPTIVE_NAME: &str = DisruptiveGene::NAME;
pub const BODY_GENE_NAME: &str = "body";
pub const SEPARATOR: &str = "@";

/// Names too generic to identify a resource on their own
const GENERAL_NAMES: [&str; 2] = ["id", "name"];

/// Names of database columns and parameters are considered the same above this
pub const SIMILARITY_THRESHOLD: f64 = 0.6;

pub fn append_param(params_text: &str, param: &str) -> String {
    if params_text.trim().is_empty() {
        param.to_string()
    } else {
        format!("{}{}{}", params_text, SEPARATOR, param)
    }
}

pub fn generate_param_text<S: AsRef<str>>(params: &[S]) -> String {
    params
        .iter()
        .map(|p| p.as_ref())
        .collect::<Vec<_>>()
        .join(SEPARATOR)
}

pub fn parse_params(params: &str) -> Vec<String> {
    params.split(SEPARATOR).map(str::to_string).collect()
}

/// e.g. `id@pets` for the `id` parameter of `/pets/{id}`
pub fn param_id(param: &Param, path: &RestPath) -> String {
    let mut tokens = vec![param.name.clone()];
    tokens.extend(path.static_tokens().into_iter().rev());
    generate_param_text(&tokens)
}

pub fn is_all_body_param(params: &[Param]) -> bool {
    params.iter().all(Param::is_body)
}

pub fn exist_body_param(params: &[Param]) -> bool {
    params.iter().any(Param::is_body)
}

pub fn is_general_name(text: &str) -> bool {
    GENERAL_NAMES.iter().any(|g| g.eq_ignore_ascii_case(text))
}

/// e.g. `petId`, but not `id` itself
pub fn contain_general_name(text: &str) -> bool {
    let lower = text.to_lowercase();
    GENERAL_NAMES.iter().any(|g| lower.contains(g)) && !is_general_name(text)
}

/// The gene holding the actual value, below optional/disruptive wrappers and
/// non auto-increment primary keys
pub fn value_gene(gene: &Gene) -> &Gene {
    match &gene.kind {
        GeneKind::Optional(g) => value_gene(&g.gene),
        GeneKind::Disruptive(g) => value_gene(&g.gene),
        GeneKind::SqlPrimaryKey(g) if !g.is_auto_increment() => value_gene(&g.gene),
        _ => gene,
    }
}

pub fn value_gene_mut(gene: &mut Gene) -> &mut Gene {
    let descend = match &gene.kind {
        GeneKind::Optional(_) | GeneKind::Disruptive(_) => true,
        GeneKind::SqlPrimaryKey(g) => !g.is_auto_increment(),
        _ => false,
    };
    if !descend {
        return gene;
    }
    match gene {
        Gene {
            kind: GeneKind::Optional(g),
            ..
        } => value_gene_mut(&mut g.gene),
        Gene {
            kind: GeneKind::Disruptive(g),
            ..
        } => value_gene_mut(&mut g.gene),
        Gene {
            kind: GeneKind::SqlPrimaryKey(g),
            ..
        } => value_gene_mut(&mut g.gene),
        other => other,
    }
}

pub fn object_gene(gene: &Gene) -> Option<&ObjectGene> {
    match &gene.kind {
        GeneKind::Object(g) => Some(g),
        GeneKind::Optional(g) => object_gene(&g.gene),
        GeneKind::Disruptive(g) => object_gene(&g.gene),
        _ => None,
    }
}

pub fn object_gene_mut(gene: &mut Gene) -> Option<&mut ObjectGene> {
    match &mut gene.kind {
        GeneKind::Object(g) => Some(g),
        GeneKind::Optional(g) => object_gene_mut(&mut g.gene),
        GeneKind::Disruptive(g) => object_gene_mut(&mut g.gene),
        _ => None,
    }
}

/// Bind the value of `target` (of an action on `target_path`) to the
/// parameters `params` of an action on `source_path`.
///
/// Returns whether at least one value was copied.
pub fn bind_param(
    target: &mut Param,
    target_path: &RestPath,
    source_path: &RestPath,
    params: &[Param],
    inner: bool,
) -> bool {
    match target.kind {
        ParamKind::Body => bind_body_param(target, target_path, source_path, params, inner),
        ParamKind::Path => bind_path_param(target, target_path, source_path, params, inner),
        ParamKind::Query => bind_query_param(target, target_path, source_path, params, inner),
        ParamKind::Form | ParamKind::Header => {
            match params.iter().find(|p| p.kind == target.kind && p.name == target.name) {
                Some(source) => copy_gene(&mut target.gene, &source.gene),
                None => false,
            }
        }
    }
}

fn bind_path_param(
    target: &mut Param,
    target_path: &RestPath,
    source_path: &RestPath,
    params: &[Param],
    inner: bool,
) -> bool {
    if let Some(source) = params
        .iter()
        .find(|p| p.kind == ParamKind::Path && p.name == target.name)
    {
        return copy_gene(&mut target.gene, &source.gene);
    }
    match params.first() {
        Some(body) if is_all_body_param(params) => {
            bind_other_from_body(target, target_path, body, source_path, inner)
        }
        _ => false,
    }
}

fn bind_query_param(
    target: &mut Param,
    target_path: &RestPath,
    source_path: &RestPath,
    params: &[Param],
    inner: bool,
) -> bool {
    match params.first() {
        Some(body) if is_all_body_param(params) => {
            bind_other_from_body(target, target_path, body, source_path, inner)
        }
        _ => match params
            .iter()
            .find(|p| !p.is_body() && p.name == target.name)
        {
            Some(source) => copy_gene(&mut target.gene, &source.gene),
            None => false,
        },
    }
}

fn bind_body_param(
    target: &mut Param,
    target_path: &RestPath,
    source_path: &RestPath,
    params: &[Param],
    inner: bool,
) -> bool {
    if !is_all_body_param(params) {
        let mut bound = false;
        for other in params.iter().filter(|p| !p.is_body()) {
            bound |= bind_body_from_other(target, target_path, other, source_path, inner);
        }
        return bound;
    }

    let Some(source) = params.first() else {
        return false;
    };
    let Some(source_object) = object_gene(&source.gene) else {
        debug!("body param {} without object gene", source.name);
        return false;
    };
    let Some(target_object) = object_gene_mut(&mut target.gene) else {
        debug!("body param {} without object gene", target.name);
        return false;
    };

    // only a source describing at least all the target's fields is trusted
    let covers_target = target_object
        .fields
        .iter()
        .all(|f| source_object.field(&f.name).is_some());
    if !covers_target {
        return false;
    }

    let mut bound = false;
    for field in target_object.fields.iter_mut() {
        if let Some(source_field) = source_object.field(&field.name) {
            bound |= copy_gene(field, source_field);
        }
    }
    bound
}

/// Non-body parameter `other` takes its values from the fields of `body`
fn bind_other_from_body(
    other: &mut Param,
    other_path: &RestPath,
    body: &Param,
    body_path: &RestPath,
    inner: bool,
) -> bool {
    let pairs = matched_genes(other, other_path, body, body_path, inner);
    let mut bound = false;
    for (other_gene, body_gene) in pairs {
        if let (Some(dest), Some(src)) = (other.gene.get_at_mut(&other_gene), body.gene.get_at(&body_gene)) {
            bound |= copy_gene(dest, src);
        }
    }
    bound
}

/// Fields of `body` take their values from the non-body parameter `other`
fn bind_body_from_other(
    body: &mut Param,
    body_path: &RestPath,
    other: &Param,
    other_path: &RestPath,
    inner: bool,
) -> bool {
    let pairs = matched_genes(other, other_path, body, body_path, inner);
    let mut bound = false;
    for (other_gene, body_gene) in pairs {
        if let (Some(dest), Some(src)) = (body.gene.get_at_mut(&body_gene), other.gene.get_at(&other_gene)) {
            bound |= copy_gene(dest, src);
        }
    }
    bound
}

/// Pairs of (gene path in `other`, gene path in `body`) whose name keys match
fn matched_genes(
    other: &Param,
    other_path: &RestPath,
    body: &Param,
    body_path: &RestPath,
    inner: bool,
) -> Vec<(Vec<usize>, Vec<usize>)> {
    let other_map = gene_name_map(other, other_path);
    let body_map = gene_name_map(body, body_path);

    let mut pairs = Vec::new();
    for (key, other_gene) in other_map {
        let matched = body_map
            .iter()
            .find(|(k, _)| *k == key)
            .or_else(|| body_map.iter().find(|(k, _)| score_of_match(&key, k, inner) == 0));
        match matched {
            Some((_, body_gene)) => pairs.push((other_gene, body_gene.clone())),
            None => debug!("cannot find {} in body {}", key, body.name),
        }
    }
    pairs
}

/// Leaf genes of a parameter with their name keys, in pre-order
pub fn gene_name_map(param: &Param, path: &RestPath) -> Vec<(String, Vec<usize>)> {
    let tokens: Vec<String> = path.static_tokens().into_iter().rev().collect();
    let mut map: Vec<(String, Vec<usize>)> = Vec::new();

    let leaf_holders = |g: &Gene| {
        matches!(
            g.kind,
            GeneKind::DateTime(_) | GeneKind::String(_) | GeneKind::Base64(_) | GeneKind::SqlPrimaryKey(_)
        )
    };
    for (gene_path, gene) in param.gene.flat_view_with_paths(leaf_holders) {
        if gene.kind.is_structural() {
            continue;
        }
        let mut names = gene_names_in_path(&param.gene, &gene_path);
        names.extend(tokens.iter().cloned());
        let key = generate_param_text(&names);
        match map.iter_mut().find(|(k, _)| *k == key) {
            Some(entry) => entry.1 = gene_path,
            None => map.push((key, gene_path)),
        }
    }
    map
}

/// Names from the gene at `path` up to `root`, skipping repeated names
pub fn gene_names_in_path(root: &Gene, path: &[usize]) -> Vec<String> {
    let mut names = Vec::new();
    let mut gene = root;
    for &i in path {
        let Some(child) = gene.child(i) else {
            break;
        };
        match &gene.kind {
            GeneKind::Object(_) | GeneKind::Map(_) => names.push(child.name.clone()),
            GeneKind::Optional(_) | GeneKind::Disruptive(_) => names.push(gene.name.clone()),
            _ => {}
        }
        gene = child;
    }
    names.push(gene.name.clone());
    names.reverse();
    names.dedup();
    names
}

/// How well two name keys match: 0 is a match, -1 a mismatch, otherwise the
/// number of tokens found on one side only
pub fn score_of_match(target: &str, source: &str, inner: bool) -> i32 {
    let targets: Vec<&str> = target.split(SEPARATOR).filter(|t| *t != DISRUPTIVE_NAME).collect();
    let sources: Vec<&str> = source.split(SEPARATOR).filter(|t| *t != DISRUPTIVE_NAME).collect();
    let target_lower = target.to_lowercase();

    let all_in_target = |tokens: &[&str]| {
        unique(tokens)
            .iter()
            .all(|s| target_lower.contains(&s.to_lowercase()))
    };

    if inner && all_in_target(&sources) {
        return 0;
    }
    if unique(&targets).len() == unique(&sources).len() && sources.iter().all(|s| targets.contains(s)) {
        return 0;
    }
    if sources.contains(&BODY_GENE_NAME) {
        let without_body: Vec<&str> = sources.iter().copied().filter(|s| *s != BODY_GENE_NAME).collect();
        if all_in_target(&without_body) {
            return 0;
        }
    }
    if targets.first() != sources.first() {
        return -1;
    }
    targets
        .iter()
        .chain(sources.iter())
        .filter(|t| targets.contains(*t) != sources.contains(*t))
        .count() as i32
}

fn unique<'a>(tokens: &[&'a str]) -> Vec<&'a str> {
    let mut out: Vec<&str> = Vec::new();
    for t in tokens {
        if !out.contains(t) {
            out.push(t);
        }
    }
    out
}

/// Copy the value of `src` into `dest`, converting between primitive kinds
/// when they differ. Failures leave `dest` untouched.
pub fn copy_gene(dest: &mut Gene, src: &Gene) -> bool {
    let dest = value_gene_mut(dest);
    let src = value_gene(src);

    if dest.type_name() == src.type_name() {
        return match dest.copy_value_from(src) {
            Ok(()) => true,
            Err(e) => {
                warn!("Failed to copy {} into {}: {}", src.name, dest.name, e);
                false
            }
        };
    }
    match copy_with_type_adapter(dest, src) {
        Ok(()) => true,
        Err(e) => {
            info!("{} fails to copy value from gene {}: {}", dest.name, src.name, e);
            false
        }
    }
}

enum SourceValue {
    Int(i64),
    Real(f64),
    Text(String),
}

fn source_value(src: &Gene) -> Option<SourceValue> {
    let value = match &src.kind {
        GeneKind::Integer(g) => SourceValue::Int(g.value as i64),
        GeneKind::Long(g) => SourceValue::Int(g.value),
        GeneKind::Float(g) => SourceValue::Real(g.value as f64),
        GeneKind::Double(g) => SourceValue::Real(g.value),
        GeneKind::String(g) => SourceValue::Text(g.raw_value()),
        GeneKind::ImmutableData(g) => SourceValue::Text(g.value.clone()),
        GeneKind::SqlPrimaryKey(g) => SourceValue::Int(g.unique_id),
        GeneKind::SqlForeignKey(g) => SourceValue::Int(g.unique_id_of_primary_key),
        _ => return None,
    };
    Some(value)
}

/// Assign `src` to a numeric or string `dest` of another variant
pub fn copy_with_type_adapter(dest: &mut Gene, src: &Gene) -> Result<()> {
    let from = format!("{} '{}'", src.type_name(), src.value_as_raw_string());
    let to = format!("{} '{}'", dest.type_name(), dest.name);
    let unsupported = || EvogeneError::UnsupportedConversion {
        from: from.clone(),
        to: to.clone(),
    };

    if let GeneKind::String(d) = &mut dest.kind {
        let text = match &src.kind {
            GeneKind::SqlPrimaryKey(g) => g.unique_id.to_string(),
            GeneKind::SqlForeignKey(g) => g.unique_id_of_primary_key.to_string(),
            GeneKind::SqlAutoIncrement | GeneKind::CycleObject => return Err(unsupported()),
            kind if kind.is_structural() => return Err(unsupported()),
            _ => src.value_as_raw_string(),
        };
        d.value = text;
        d.selected_specialization = None;
        d.repair();
        return Ok(());
    }

    let value = source_value(src).ok_or_else(unsupported)?;
    match &mut dest.kind {
        GeneKind::Double(d) => {
            d.value = match value {
                SourceValue::Int(v) => v as f64,
                SourceValue::Real(v) => v,
                SourceValue::Text(s) => s.trim().parse().map_err(|_| unsupported())?,
            }
        }
        GeneKind::Float(d) => {
            d.value = match value {
                SourceValue::Int(v) => v as f32,
                SourceValue::Real(v) => v as f32,
                SourceValue::Text(s) => s.trim().parse().map_err(|_| unsupported())?,
            }
        }
        GeneKind::Integer(d) => {
            let v: i32 = match value {
                SourceValue::Int(v) => i32::try_from(v).map_err(|_| unsupported())?,
                SourceValue::Real(v) => v as i32,
                SourceValue::Text(s) => s.trim().parse().map_err(|_| unsupported())?,
            };
            if v < d.min || v > d.max {
                return Err(unsupported());
            }
            d.value = v;
        }
        GeneKind::Long(d) => {
            let v: i64 = match value {
                SourceValue::Int(v) => v,
                SourceValue::Real(v) => v as i64,
                SourceValue::Text(s) => s.trim().parse().map_err(|_| unsupported())?,
            };
            if v < d.min || v > d.max {
                return Err(unsupported());
            }
            d.value = v;
        }
        _ => return Err(unsupported()),
    }
    Ok(())
}

/// Rank of a gene as a value source, 0 being the strongest
pub fn binding_priority(gene: &Gene) -> Option<u8> {
    let priority = match &gene.kind {
        GeneKind::SqlPrimaryKey(_)
        | GeneKind::SqlAutoIncrement
        | GeneKind::SqlForeignKey(_)
        | GeneKind::ImmutableData(_) => 0,
        GeneKind::DateTime(_) | GeneKind::Date(_) | GeneKind::Time(_) => 1,
        GeneKind::Boolean(_) => 2,
        GeneKind::Integer(_) => 3,
        GeneKind::Long(_) => 4,
        GeneKind::Float(_) => 5,
        GeneKind::Double(_) => 6,
        GeneKind::Array(_)
        | GeneKind::Object(_)
        | GeneKind::Enum(_)
        | GeneKind::CycleObject
        | GeneKind::Map(_) => 7,
        GeneKind::String(_) | GeneKind::Base64(_) => 8,
        _ => return None,
    };
    Some(priority)
}

/// Whether `a` should copy from `b`, None when either rank is unknown
fn check_bind_sequence(a: &Gene, b: &Gene) -> Option<bool> {
    Some(binding_priority(a)? >= binding_priority(b)?)
}

fn is_db_key(gene: &Gene) -> bool {
    matches!(
        gene.kind,
        GeneKind::SqlPrimaryKey(_) | GeneKind::SqlForeignKey(_) | GeneKind::SqlAutoIncrement
    )
}

/// Bind a database gene and a parameter gene.
///
/// Keys always govern. Otherwise existing rows govern, and for new rows the
/// weaker-ranked side copies from the other when `flexible`, or the row
/// copies from the parameter.
pub fn bind_param_with_db_action(
    db_gene: &mut Gene,
    param_gene: &mut Gene,
    existing: bool,
    flexible: bool,
) -> bool {
    if is_db_key(db_gene) {
        return copy_gene(param_gene, db_gene);
    }
    let db_from_param = !existing
        && (!flexible
            || check_bind_sequence(value_gene(db_gene), value_gene(param_gene)).unwrap_or(true));
    if db_from_param {
        copy_gene(db_gene, param_gene)
    } else {
        copy_gene(param_gene, db_gene)
    }
}

/// Similarity of a column and a parameter name; general names such as
/// `id` are also tried qualified by the table or by the previous path token
pub fn compare_db_gene(table: &str, gene_name: &str, param_name: &str, previous_token: &str) -> f64 {
    let direct = similarity(gene_name, param_name);
    if direct == 1.0 || !is_general_name(gene_name) {
        return direct;
    }
    let with_table = similarity(&format!("{}{}", table, gene_name), param_name);
    let with_token = similarity(gene_name, &format!("{}{}", previous_token, param_name));
    direct.max(with_table).max(with_token)
}

/// Bind `param` to the most similarly named gene of `db_action`
pub fn bind_param_to_db_action(
    db_action: &mut DbAction,
    param: &mut Param,
    previous_token: &str,
    existing: bool,
) -> bool {
    let mut best: Option<(usize, f64)> = None;
    for (i, gene) in db_action.genes.iter().enumerate() {
        let score = compare_db_gene(&db_action.table, &gene.name, &param.name, previous_token);
        if best.map_or(true, |(_, s)| score > s) {
            best = Some((i, score));
        }
    }
    match best {
        Some((index, score)) if score > SIMILARITY_THRESHOLD => {
            bind_matched_gene(&mut db_action.genes[index], param, existing)
        }
        _ => false,
    }
}

/// Bind `param` to the gene of `db_action` previously matched to `target`,
/// the table itself standing for its primary key
pub fn bind_param_with_matched_target(
    db_action: &mut DbAction,
    param: &mut Param,
    target: &str,
    existing: bool,
) -> bool {
    let index = if target.eq_ignore_ascii_case(&db_action.table) {
        db_action
            .genes
            .iter()
            .position(|g| matches!(g.kind, GeneKind::SqlPrimaryKey(_)))
            .or_else(|| db_action.genes.iter().position(|g| contain_general_name(&g.name)))
    } else {
        db_action
            .genes
            .iter()
            .position(|g| g.name.eq_ignore_ascii_case(target))
    };
    match index {
        Some(i) => bind_matched_gene(&mut db_action.genes[i], param, existing),
        None => false,
    }
}

fn bind_matched_gene(db_gene: &mut Gene, param: &mut Param, existing: bool) -> bool {
    if is_db_key(db_gene) || existing {
        copy_gene(&mut param.gene, db_gene)
    } else {
        copy_gene(db_gene, &param.gene)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::genes::{IntegerGene, SqlPrimaryKeyGene};

    #[test]
    fn test_score_of_match() {
        assert_eq!(score_of_match("id@pet", "id@pet@d_", false), 0);
        assert_eq!(score_of_match("id@pets", "name@pets", false), -1);
        assert_eq!(score_of_match("id@toys@pets", "id@pets", false), 1);
        assert_eq!(score_of_match("petid@pets", "id@body", false), 0);
    }

    #[test]
    fn test_param_text() {
        assert_eq!(append_param("", "id"), "id");
        assert_eq!(append_param("id", "pets"), "id@pets");
        assert_eq!(parse_params("id@pets"), vec!["id", "pets"]);
        assert_eq!(generate_param_text(&["a", "b"]), "a@b");
    }

    #[test]
    fn test_general_names() {
        assert!(is_general_name("ID"));
        assert!(contain_general_name("petId"));
        assert!(!contain_general_name("id"));
    }

    #[test]
    fn test_value_gene_unwraps() {
        let pk = Gene::new(
            "id",
            GeneKind::SqlPrimaryKey(SqlPrimaryKeyGene::new("pets", 1, Gene::long("id", 5))),
        );
        let wrapped = Gene::optional("id", Gene::disruptive(pk, 0.5));
        assert_eq!(value_gene(&wrapped).type_name(), "LongGene");

        let auto = Gene::new(
            "id",
            GeneKind::SqlPrimaryKey(SqlPrimaryKeyGene::new(
                "pets",
                1,
                Gene::new("id", GeneKind::SqlAutoIncrement),
            )),
        );
        assert_eq!(value_gene(&auto).type_name(), "SqlPrimaryKeyGene");
    }

    #[test]
    fn test_copy_reaches_wrapped_value() {
        let pk = Gene::new(
            "id",
            GeneKind::SqlPrimaryKey(SqlPrimaryKeyGene::new("pets", 1, Gene::long("id", 5))),
        );
        let mut wrapped = Gene::optional("id", Gene::disruptive(pk, 0.5));
        assert!(copy_gene(&mut wrapped, &Gene::long("src", 9)));
        assert_eq!(value_gene(&wrapped).value_as_raw_string(), "9");

        let mut auto = Gene::new(
            "id",
            GeneKind::SqlPrimaryKey(SqlPrimaryKeyGene::new(
                "pets",
                1,
                Gene::new("id", GeneKind::SqlAutoIncrement),
            )),
        );
        assert!(!copy_gene(&mut auto, &Gene::long("src", 9)));
        assert_eq!(value_gene_mut(&mut auto).type_name(), "SqlPrimaryKeyGene");
    }

    #[test]
    fn test_key_gene_is_never_destination() {
        let mut key = Gene::new("fk", GeneKind::SqlForeignKey(crate::genes::SqlForeignKeyGene::new("pets", 7)));
        let mut param = Gene::new("petId", GeneKind::Integer(IntegerGene::new(1)));
        assert!(bind_param_with_db_action(&mut key, &mut param, false, true));
        assert_eq!(param.value_as_raw_string(), "7");
    }

    #[test]
    fn test_names_in_path_skip_repeats() {
        let body = Gene::object("body", vec![Gene::string("id", "x")]).unwrap();
        assert_eq!(gene_names_in_path(&body, &[0]), vec!["id"]);

        let path_param = Gene::disruptive(Gene::string("id", "x"), 0.5);
        assert_eq!(gene_names_in_path(&path_param, &[0]), vec!["id", "d_"]);
    }
}
