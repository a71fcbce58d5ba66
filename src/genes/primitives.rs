use crate::engines::mutation::randomness::Randomness;

#[derive(Debug, Clone)]
pub struct BooleanGene {
    pub value: bool,
}

impl BooleanGene {
    pub fn new(value: bool) -> Self {
        Self { value }
    }

    pub fn randomize(&mut self, rng: &mut Randomness, force_new_value: bool) {
        self.value = if force_new_value {
            !self.value
        } else {
            rng.next_boolean()
        };
    }

    pub fn mutate(&mut self) -> bool {
        self.value = !self.value;
        true
    }
}

/// One constant out of a fixed set
#[derive(Debug, Clone)]
pub struct EnumGene {
    pub values: Vec<String>,
    pub index: usize,
}

impl EnumGene {
    pub fn new(values: Vec<String>) -> Self {
        Self { values, index: 0 }
    }

    pub fn value(&self) -> Option<&str> {
        self.values.get(self.index).map(String::as_str)
    }

    pub fn randomize(&mut self, rng: &mut Randomness, force_new_value: bool) {
        if self.values.is_empty() {
            return;
        }
        let last = self.values.len() as i64 - 1;
        self.index = if force_new_value {
            rng.next_int_excluding(0, last, self.index as i64) as usize
        } else {
            rng.next_int(0, last) as usize
        };
    }

    pub fn mutate(&mut self, rng: &mut Randomness) -> bool {
        if self.values.len() < 2 {
            return false;
        }
        self.randomize(rng, true);
        true
    }

    /// Select the same constant as `other`, if this gene knows it
    pub fn copy_value_from(&mut self, other: &EnumGene) {
        match other.value().and_then(|v| self.values.iter().position(|x| x == v)) {
            Some(i) => self.index = i,
            None => self.index = other.index.min(self.values.len().saturating_sub(1)),
        }
    }
}
