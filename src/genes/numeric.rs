use crate::engines::mutation::apc::{delta, AdaptiveParameterControl};
use crate::engines::mutation::randomness::Randomness;

/// Random values of unbounded numbers are taken around zero
const RANDOMIZATION_SPAN: i64 = 1000;

/// Ranges at most this wide are mutated by picking a different value
const SMALL_RANGE: i128 = 10;

const P_FRACTION_MUTATION: f64 = 0.2;

#[derive(Debug, Clone)]
pub struct IntegerGene {
    pub value: i32,
    pub min: i32,
    pub max: i32,
}

impl IntegerGene {
    pub fn new(value: i32) -> Self {
        Self::with_bounds(value, i32::MIN, i32::MAX)
    }

    pub fn with_bounds(value: i32, min: i32, max: i32) -> Self {
        let (min, max) = if min <= max { (min, max) } else { (max, min) };
        Self {
            value: value.clamp(min, max),
            min,
            max,
        }
    }

    pub fn randomize(&mut self, rng: &mut Randomness, force_new_value: bool) {
        self.value = randomize_bounded(
            self.value as i64,
            self.min as i64,
            self.max as i64,
            rng,
            force_new_value,
        ) as i32;
    }

    pub fn mutate(&mut self, rng: &mut Randomness, apc: &AdaptiveParameterControl) -> bool {
        let previous = self.value;
        self.value = mutate_bounded(
            self.value as i64,
            self.min as i64,
            self.max as i64,
            rng,
            apc,
        ) as i32;
        self.value != previous
    }

    pub fn repair(&mut self) {
        self.value = self.value.clamp(self.min, self.max);
    }
}

#[derive(Debug, Clone)]
pub struct LongGene {
    pub value: i64,
    pub min: i64,
    pub max: i64,
}

impl LongGene {
    pub fn new(value: i64) -> Self {
        Self::with_bounds(value, i64::MIN, i64::MAX)
    }

    pub fn with_bounds(value: i64, min: i64, max: i64) -> Self {
        let (min, max) = if min <= max { (min, max) } else { (max, min) };
        Self {
            value: value.clamp(min, max),
            min,
            max,
        }
    }

    pub fn randomize(&mut self, rng: &mut Randomness, force_new_value: bool) {
        self.value = randomize_bounded(self.value, self.min, self.max, rng, force_new_value);
    }

    pub fn mutate(&mut self, rng: &mut Randomness, apc: &AdaptiveParameterControl) -> bool {
        let previous = self.value;
        self.value = mutate_bounded(self.value, self.min, self.max, rng, apc);
        self.value != previous
    }

    pub fn repair(&mut self) {
        self.value = self.value.clamp(self.min, self.max);
    }
}

#[derive(Debug, Clone)]
pub struct FloatGene {
    pub value: f32,
    pub min: Option<f32>,
    pub max: Option<f32>,
}

impl FloatGene {
    pub fn new(value: f32) -> Self {
        Self {
            value,
            min: None,
            max: None,
        }
    }

    pub fn randomize(&mut self, rng: &mut Randomness, force_new_value: bool) {
        self.value = randomize_real(
            self.value as f64,
            self.min.map(f64::from),
            self.max.map(f64::from),
            rng,
            force_new_value,
        ) as f32;
    }

    pub fn mutate(&mut self, rng: &mut Randomness, apc: &AdaptiveParameterControl) -> bool {
        let previous = self.value;
        self.value = mutate_real(
            self.value as f64,
            self.min.map(f64::from),
            self.max.map(f64::from),
            rng,
            apc,
        ) as f32;
        self.value != previous
    }
}

#[derive(Debug, Clone)]
pub struct DoubleGene {
    pub value: f64,
    pub min: Option<f64>,
    pub max: Option<f64>,
}

impl DoubleGene {
    pub fn new(value: f64) -> Self {
        Self {
            value,
            min: None,
            max: None,
        }
    }

    pub fn randomize(&mut self, rng: &mut Randomness, force_new_value: bool) {
        self.value = randomize_real(self.value, self.min, self.max, rng, force_new_value);
    }

    pub fn mutate(&mut self, rng: &mut Randomness, apc: &AdaptiveParameterControl) -> bool {
        let previous = self.value;
        self.value = mutate_real(self.value, self.min, self.max, rng, apc);
        self.value != previous
    }
}

fn randomize_bounded(
    value: i64,
    min: i64,
    max: i64,
    rng: &mut Randomness,
    force_new_value: bool,
) -> i64 {
    let low = min.max(-RANDOMIZATION_SPAN);
    let high = max.min(RANDOMIZATION_SPAN);
    let (low, high) = if low <= high { (low, high) } else { (min, max) };
    if force_new_value && low < high && (low..=high).contains(&value) {
        rng.next_int_excluding(low, high, value)
    } else {
        rng.next_int(low, high)
    }
}

fn mutate_bounded(
    value: i64,
    min: i64,
    max: i64,
    rng: &mut Randomness,
    apc: &AdaptiveParameterControl,
) -> i64 {
    let range = max as i128 - min as i128;
    if range == 0 {
        return value;
    }
    if range <= SMALL_RANGE {
        return rng.next_int_excluding(min, max, value.clamp(min, max));
    }

    let range = u64::try_from(range).unwrap_or(u64::MAX);
    let step = delta(rng, apc, range, 6, 3);
    let sign = if rng.next_boolean() { 1 } else { -1 };

    let shifted = |s: i64| (value as i128 + s as i128 * step as i128).clamp(min as i128, max as i128) as i64;
    let res = shifted(sign);
    if res == value {
        shifted(-sign)
    } else {
        res
    }
}

fn randomize_real(
    value: f64,
    min: Option<f64>,
    max: Option<f64>,
    rng: &mut Randomness,
    force_new_value: bool,
) -> f64 {
    let low = min.unwrap_or(-(RANDOMIZATION_SPAN as f64));
    let high = max.unwrap_or(RANDOMIZATION_SPAN as f64).max(low);
    let mut res = low + rng.next_double() * (high - low);
    if force_new_value && res == value && high > low {
        res = low + rng.next_double() * (high - low);
    }
    res
}

fn mutate_real(
    value: f64,
    min: Option<f64>,
    max: Option<f64>,
    rng: &mut Randomness,
    apc: &AdaptiveParameterControl,
) -> f64 {
    let clamp = |v: f64| {
        let v = min.map_or(v, |m| v.max(m));
        max.map_or(v, |m| v.min(m))
    };

    let sign = if rng.next_boolean() { 1.0 } else { -1.0 };
    let step = if rng.next_bool(P_FRACTION_MUTATION) {
        rng.next_double()
    } else {
        delta(rng, apc, u64::MAX, 6, 3) as f64
    };

    let res = clamp(value + sign * step);
    if res == value {
        clamp(value - sign * step)
    } else {
        res
    }
}
