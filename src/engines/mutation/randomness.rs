use rand::distributions::{Distribution, WeightedIndex};
use rand::rngs::StdRng;
use rand::seq::SliceRandom;
use rand::{Rng, SeedableRng};

const WORD_CHARS: &[u8] = b"abcdefghijklmnopqrstuvwxyzABCDEFGHIJKLMNOPQRSTUVWXYZ0123456789_";

/// Single random source of a search session
#[derive(Debug, Clone)]
pub struct Randomness {
    rng: StdRng,
}

impl Randomness {
    pub fn new(seed: Option<u64>) -> Self {
        let rng = match seed {
            Some(s) => StdRng::seed_from_u64(s),
            None => StdRng::from_entropy(),
        };
        Self { rng }
    }

    /// True with probability `p`, values outside [0, 1] are saturated
    pub fn next_bool(&mut self, p: f64) -> bool {
        if p <= 0.0 {
            return false;
        }
        if p >= 1.0 {
            return true;
        }
        self.rng.gen_bool(p)
    }

    pub fn next_boolean(&mut self) -> bool {
        self.rng.gen()
    }

    /// Uniform in [0, 1)
    pub fn next_double(&mut self) -> f64 {
        self.rng.gen()
    }

    /// Uniform in [min, max], both inclusive
    pub fn next_int(&mut self, min: i64, max: i64) -> i64 {
        if min >= max {
            return min;
        }
        self.rng.gen_range(min..=max)
    }

    /// Uniform in [min, max] but different from `exclude`, when possible
    pub fn next_int_excluding(&mut self, min: i64, max: i64, exclude: i64) -> i64 {
        if min >= max {
            return min;
        }
        if !(min..=max).contains(&exclude) {
            return self.next_int(min, max);
        }
        // draw among max - min values and skip over the excluded one
        let k = self.rng.gen_range(min..max);
        if k >= exclude {
            k + 1
        } else {
            k
        }
    }

    /// Uniform index in [0, len); `len` must be positive
    pub fn next_index(&mut self, len: usize) -> usize {
        self.rng.gen_range(0..len.max(1))
    }

    pub fn choose<'a, T>(&mut self, items: &'a [T]) -> Option<&'a T> {
        items.choose(&mut self.rng)
    }

    /// Index picked proportionally to `weights`; None if no weight is positive
    pub fn choose_weighted(&mut self, weights: &[f64]) -> Option<usize> {
        WeightedIndex::new(weights)
            .ok()
            .map(|dist| dist.sample(&mut self.rng))
    }

    /// One of `[a-zA-Z0-9_]`
    pub fn next_word_char(&mut self) -> char {
        WORD_CHARS[self.rng.gen_range(0..WORD_CHARS.len())] as char
    }

    pub fn next_word_string(&mut self, min: usize, max: usize) -> String {
        let len = self.next_int(min as i64, max.max(min) as i64) as usize;
        (0..len).map(|_| self.next_word_char()).collect()
    }

    pub fn sample<T, D: Distribution<T>>(&mut self, distribution: &D) -> T {
        distribution.sample(&mut self.rng)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_excluding_never_returns_excluded() {
        let mut rng = Randomness::new(Some(42));
        for _ in 0..200 {
            let v = rng.next_int_excluding(0, 3, 2);
            assert!((0..=3).contains(&v));
            assert_ne!(v, 2);
        }
    }

    #[test]
    fn test_same_seed_same_sequence() {
        let mut a = Randomness::new(Some(11));
        let mut b = Randomness::new(Some(11));
        assert_eq!(a.next_word_string(5, 10), b.next_word_string(5, 10));
    }

    #[test]
    fn test_weighted_choice_skips_zero_weight() {
        let mut rng = Randomness::new(Some(1));
        for _ in 0..50 {
            assert_eq!(rng.choose_weighted(&[0.0, 1.0, 0.0]), Some(1));
        }
        assert_eq!(rng.choose_weighted(&[0.0, 0.0]), None);
    }
}
