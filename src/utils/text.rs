/// Levenshtein distance between `a` and `b`, or None once it exceeds `threshold`
pub fn bounded_levenshtein(a: &str, b: &str, threshold: usize) -> Option<usize> {
    if a.chars().count().abs_diff(b.chars().count()) > threshold {
        return None;
    }
    let distance = strsim::levenshtein(a, b);
    (distance <= threshold).then_some(distance)
}

pub fn levenshtein(a: &str, b: &str) -> usize {
    strsim::levenshtein(a, b)
}

/// Case-insensitive similarity in [0, 1], 1 meaning equal
pub fn similarity(a: &str, b: &str) -> f64 {
    strsim::normalized_levenshtein(&a.to_lowercase(), &b.to_lowercase())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_levenshtein() {
        assert_eq!(levenshtein("kitten", "sitting"), 3);
        assert_eq!(levenshtein("", "abc"), 3);
        assert_eq!(levenshtein("pet", "pet"), 0);
    }

    #[test]
    fn test_bounded_levenshtein_stops_at_threshold() {
        assert_eq!(bounded_levenshtein("pet", "pot", 1), Some(1));
        assert_eq!(bounded_levenshtein("kitten", "sitting", 2), None);
        assert_eq!(bounded_levenshtein("kitten", "sitting", 3), Some(3));
        assert_eq!(bounded_levenshtein("a", "abcd", 2), None);
    }

    #[test]
    fn test_similarity_ignores_case() {
        assert_eq!(similarity("PetId", "petid"), 1.0);
        assert_eq!(similarity("", ""), 1.0);
        assert!(similarity("petId", "id") < 0.6);
        assert!(similarity("petid", "petsid") > 0.6);
    }
}
