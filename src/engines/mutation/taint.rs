use once_cell::sync::Lazy;
use regex::Regex;

const TAINT_PREFIX: &str = "_EM_";
const TAINT_POSTFIX: &str = "_XYZ_";

static TAINT_PATTERN: Lazy<Option<Regex>> = Lazy::new(|| Regex::new(r"(?i)^_EM_\d+_XYZ_$").ok());

/// Hands out unique taint markers for one search session
#[derive(Debug, Default)]
pub struct TaintNames {
    counter: u64,
}

impl TaintNames {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn next_name(&mut self) -> String {
        let name = format!("{}{}{}", TAINT_PREFIX, self.counter, TAINT_POSTFIX);
        self.counter += 1;
        name
    }
}

/// Whether `value` is, ignoring case, a taint marker
pub fn is_taint_input(value: &str) -> bool {
    TAINT_PATTERN
        .as_ref()
        .map_or(false, |pattern| pattern.is_match(value))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_markers_are_unique_and_recognized() {
        let mut names = TaintNames::new();
        let a = names.next_name();
        let b = names.next_name();
        assert_ne!(a, b);
        assert!(is_taint_input(&a));
        assert!(is_taint_input(&b.to_lowercase()));
        assert!(!is_taint_input("_EM_x_XYZ_"));
        assert!(!is_taint_input("foo_EM_1_XYZ_"));
    }
}
