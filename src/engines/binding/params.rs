use crate::genes::Gene;
use crate::types::ParamKind;
use std::fmt;

#[derive(Debug, Clone)]
pub struct Param {
    pub name: String,
    pub kind: ParamKind,
    pub gene: Gene,
}

impl Param {
    pub fn new(name: impl Into<String>, kind: ParamKind, gene: Gene) -> Self {
        Self {
            name: name.into(),
            kind,
            gene,
        }
    }

    pub fn is_body(&self) -> bool {
        self.kind == ParamKind::Body
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
enum PathElement {
    Static(String),
    Variable(String),
}

/// Templated resource path such as `/api/pets/{id}`
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RestPath {
    elements: Vec<PathElement>,
}

impl RestPath {
    pub fn parse(path: &str) -> Self {
        let elements = path
            .split('/')
            .filter(|s| !s.is_empty())
            .map(|s| match s.strip_prefix('{').and_then(|v| v.strip_suffix('}')) {
                Some(var) => PathElement::Variable(var.to_string()),
                None => PathElement::Static(s.to_string()),
            })
            .collect();
        Self { elements }
    }

    /// Non-templated segments, in path order
    pub fn static_tokens(&self) -> Vec<String> {
        self.elements
            .iter()
            .filter_map(|e| match e {
                PathElement::Static(s) => Some(s.clone()),
                PathElement::Variable(_) => None,
            })
            .collect()
    }

    pub fn variables(&self) -> Vec<String> {
        self.elements
            .iter()
            .filter_map(|e| match e {
                PathElement::Variable(v) => Some(v.clone()),
                PathElement::Static(_) => None,
            })
            .collect()
    }

    /// The static token right before the last variable, e.g. `pets` in `/pets/{id}`
    pub fn token_before_last_variable(&self) -> Option<String> {
        let last_var = self
            .elements
            .iter()
            .rposition(|e| matches!(e, PathElement::Variable(_)))?;
        self.elements[..last_var].iter().rev().find_map(|e| match e {
            PathElement::Static(s) => Some(s.clone()),
            PathElement::Variable(_) => None,
        })
    }
}

impl fmt::Display for RestPath {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        if self.elements.is_empty() {
            return write!(f, "/");
        }
        for e in &self.elements {
            match e {
                PathElement::Static(s) => write!(f, "/{}", s)?,
                PathElement::Variable(v) => write!(f, "/{{{}}}", v)?,
            }
        }
        Ok(())
    }
}

/// A call towards the system under test
#[derive(Debug, Clone)]
pub struct Action {
    /// Verb, e.g. `POST`
    pub name: String,
    pub path: RestPath,
    pub params: Vec<Param>,
}

impl Action {
    pub fn new(name: impl Into<String>, path: &str, params: Vec<Param>) -> Self {
        Self {
            name: name.into(),
            path: RestPath::parse(path),
            params,
        }
    }
}

/// Insertion of a row, or a reference to a row that already exists
#[derive(Debug, Clone)]
pub struct DbAction {
    pub table: String,
    pub genes: Vec<Gene>,
    pub existing: bool,
}

impl DbAction {
    pub fn new(table: impl Into<String>, genes: Vec<Gene>, existing: bool) -> Self {
        Self {
            table: table.into(),
            genes,
            existing,
        }
    }
}
