use super::numeric::IntegerGene;
use crate::engines::mutation::apc::AdaptiveParameterControl;
use crate::engines::mutation::randomness::Randomness;
use chrono::NaiveDate;

/// Zero-padded to `len` chars, sign included
pub fn padded(value: i32, len: usize) -> String {
    if value < 0 {
        format!("-{:0>width$}", -(value as i64), width = len.saturating_sub(1))
    } else {
        format!("{:0>width$}", value, width = len)
    }
}

#[derive(Debug, Clone)]
pub struct DateGene {
    pub year: IntegerGene,
    pub month: IntegerGene,
    pub day: IntegerGene,
}

impl Default for DateGene {
    fn default() -> Self {
        Self::new(2016, 3, 12)
    }
}

impl DateGene {
    pub fn new(year: i32, month: i32, day: i32) -> Self {
        let mut gene = Self {
            year: IntegerGene::with_bounds(year, 1900, 2100),
            month: IntegerGene::with_bounds(month, 1, 12),
            day: IntegerGene::with_bounds(day, 1, 31),
        };
        gene.repair();
        gene
    }

    pub fn randomize(&mut self, rng: &mut Randomness, force_new_value: bool) {
        self.year.randomize(rng, force_new_value);
        self.month.randomize(rng, force_new_value);
        self.day.randomize(rng, force_new_value);
        self.repair();
    }

    pub fn mutate(&mut self, rng: &mut Randomness, apc: &AdaptiveParameterControl) -> bool {
        let before = self.raw_value();
        match rng.next_index(3) {
            0 => self.year.mutate(rng, apc),
            1 => self.month.mutate(rng, apc),
            _ => self.day.mutate(rng, apc),
        };
        self.repair();
        self.raw_value() != before
    }

    /// Clamp the day to the length of the month
    pub fn repair(&mut self) {
        self.year.repair();
        self.month.repair();
        self.day.repair();
        while self.day.value > 28
            && NaiveDate::from_ymd_opt(self.year.value, self.month.value as u32, self.day.value as u32)
                .is_none()
        {
            self.day.value -= 1;
        }
    }

    pub fn copy_value_from(&mut self, other: &DateGene) {
        self.year.value = other.year.value;
        self.month.value = other.month.value;
        self.day.value = other.day.value;
    }

    /// YYYY-MM-DD
    pub fn raw_value(&self) -> String {
        format!(
            "{}-{}-{}",
            padded(self.year.value, 4),
            padded(self.month.value, 2),
            padded(self.day.value, 2)
        )
    }
}

#[derive(Debug, Clone)]
pub struct TimeGene {
    pub hour: IntegerGene,
    pub minute: IntegerGene,
    pub second: IntegerGene,
}

impl Default for TimeGene {
    fn default() -> Self {
        Self::new(0, 0, 0)
    }
}

impl TimeGene {
    pub fn new(hour: i32, minute: i32, second: i32) -> Self {
        Self {
            hour: IntegerGene::with_bounds(hour, 0, 23),
            minute: IntegerGene::with_bounds(minute, 0, 59),
            second: IntegerGene::with_bounds(second, 0, 59),
        }
    }

    pub fn randomize(&mut self, rng: &mut Randomness, force_new_value: bool) {
        self.hour.randomize(rng, force_new_value);
        self.minute.randomize(rng, force_new_value);
        self.second.randomize(rng, force_new_value);
    }

    pub fn mutate(&mut self, rng: &mut Randomness, apc: &AdaptiveParameterControl) -> bool {
        match rng.next_index(3) {
            0 => self.hour.mutate(rng, apc),
            1 => self.minute.mutate(rng, apc),
            _ => self.second.mutate(rng, apc),
        }
    }

    pub fn repair(&mut self) {
        self.hour.repair();
        self.minute.repair();
        self.second.repair();
    }

    pub fn copy_value_from(&mut self, other: &TimeGene) {
        self.hour.value = other.hour.value;
        self.minute.value = other.minute.value;
        self.second.value = other.second.value;
    }

    /// HH:MM:SS
    pub fn raw_value(&self) -> String {
        format!(
            "{}:{}:{}",
            padded(self.hour.value, 2),
            padded(self.minute.value, 2),
            padded(self.second.value, 2)
        )
    }
}

#[derive(Debug, Clone, Default)]
pub struct DateTimeGene {
    pub date: DateGene,
    pub time: TimeGene,
}

impl DateTimeGene {
    pub fn randomize(&mut self, rng: &mut Randomness, force_new_value: bool) {
        self.date.randomize(rng, force_new_value);
        self.time.randomize(rng, force_new_value);
    }

    pub fn mutate(&mut self, rng: &mut Randomness, apc: &AdaptiveParameterControl) -> bool {
        if rng.next_boolean() {
            self.date.mutate(rng, apc)
        } else {
            self.time.mutate(rng, apc)
        }
    }

    pub fn repair(&mut self) {
        self.date.repair();
        self.time.repair();
    }

    /// YYYY-MM-DDTHH:MM:SS
    pub fn raw_value(&self) -> String {
        format!("{}T{}", self.date.raw_value(), self.time.raw_value())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_padded() {
        assert_eq!(padded(9, 2), "09");
        assert_eq!(padded(-2, 3), "-02");
        assert_eq!(padded(2016, 4), "2016");
    }

    #[test]
    fn test_repair_clamps_day_of_month() {
        let gene = DateGene::new(1998, 4, 31);
        assert_eq!(gene.raw_value(), "1998-04-30");
        let gene = DateGene::new(2001, 2, 30);
        assert_eq!(gene.raw_value(), "2001-02-28");
    }

    #[test]
    fn test_datetime_format() {
        let gene = DateTimeGene {
            date: DateGene::new(2020, 1, 2),
            time: TimeGene::new(3, 4, 5),
        };
        assert_eq!(gene.raw_value(), "2020-01-02T03:04:05");
    }
}
