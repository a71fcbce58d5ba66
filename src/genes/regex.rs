use crate::engines::mutation::randomness::Randomness;
use crate::error::{EvogeneError, Result};
use log::warn;

/// Bound on unbounded quantifiers such as `*` and `+`
const MAX_REPEAT: u32 = 10;

/// String constrained to match a regular expression
#[derive(Debug, Clone)]
pub struct RegexGene {
    pub pattern: String,
    pub value: String,
}

impl RegexGene {
    pub fn new(pattern: &str) -> Result<Self> {
        let pattern = strip_anchors(pattern).to_string();
        compile(&pattern)?;
        Ok(Self {
            pattern,
            value: String::new(),
        })
    }

    pub fn matches(&self, candidate: &str) -> bool {
        regex::Regex::new(&format!("^(?:{})$", self.pattern))
            .map(|re| re.is_match(candidate))
            .unwrap_or(false)
    }

    pub fn randomize(&mut self, rng: &mut Randomness, force_new_value: bool) {
        let generator = match compile(&self.pattern) {
            Ok(g) => g,
            Err(e) => {
                warn!("Cannot sample from regex: {}", e);
                return;
            }
        };
        let previous = std::mem::take(&mut self.value);
        for _ in 0..5 {
            self.value = rng.sample(&generator);
            if !force_new_value || self.value != previous {
                return;
            }
        }
    }
}

fn compile(pattern: &str) -> Result<rand_regex::Regex> {
    rand_regex::Regex::compile(pattern, MAX_REPEAT)
        .map_err(|e| EvogeneError::InvalidRegex(format!("{}: {}", pattern, e)))
}

/// Values are matched in full, so leading `^` and trailing `$` are redundant
pub fn strip_anchors(pattern: &str) -> &str {
    let stripped = pattern.strip_prefix('^').unwrap_or(pattern);
    match stripped.strip_suffix('$') {
        Some(s) if !s.ends_with('\\') => s,
        _ => stripped,
    }
}

/// Regex matching `text` in any letter case, e.g. "a1" -> "[aA]1"
pub fn ignore_case_regex(text: &str) -> String {
    let mut out = String::new();
    for c in text.chars() {
        if c.is_alphabetic() && c.to_lowercase().ne(c.to_uppercase()) {
            out.push('[');
            out.extend(c.to_lowercase());
            out.extend(c.to_uppercase());
            out.push(']');
        } else {
            out.push_str(&regex::escape(&c.to_string()));
        }
    }
    out
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_ignore_case_regex() {
        assert_eq!(ignore_case_regex("a1."), "[aA]1\\.");
    }

    #[test]
    fn test_strip_anchors() {
        assert_eq!(strip_anchors("^abc$"), "abc");
        assert_eq!(strip_anchors("abc\\$"), "abc\\$");
    }

    #[test]
    fn test_sampled_value_matches() {
        let mut gene = RegexGene::new("^[a-c]{3}-\\d$").unwrap();
        let mut rng = Randomness::new(Some(7));
        for _ in 0..20 {
            gene.randomize(&mut rng, true);
            assert!(gene.matches(&gene.value), "{}", gene.value);
        }
    }

    #[test]
    fn test_invalid_pattern_rejected() {
        assert!(matches!(
            RegexGene::new("(abc"),
            Err(EvogeneError::InvalidRegex(_))
        ));
    }
}
