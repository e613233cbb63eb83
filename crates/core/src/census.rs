//! Per-kind aggregation of container layouts
//!
//! A `Census` is a running tally of [`LayoutInfo`] records: how many maps,
//! sequences and tuples were seen, how many bytes each kind accounts for,
//! and how full the map tables are overall.
//!
//! The tree accumulator fills one while it walks, giving a breakdown of the
//! total. A flat census over an arbitrary population (each container counted
//! once, nothing recursed into) answers "how much do all my maps cost".

use crate::layout::LayoutInfo;
use crate::size_model::SizeModel;
use crate::value::Value;
use serde::Serialize;

/// Count and estimated bytes for one container kind
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize)]
pub struct KindTotals {
    pub count: usize,
    pub bytes: usize,
}

impl KindTotals {
    fn add(&mut self, bytes: usize) {
        self.count += 1;
        self.bytes = self.bytes.saturating_add(bytes);
    }

    fn merge(&mut self, other: &KindTotals) {
        self.count += other.count;
        self.bytes = self.bytes.saturating_add(other.bytes);
    }
}

/// Aggregated layout statistics across many containers
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
pub struct Census {
    pub maps: KindTotals,
    pub sequences: KindTotals,
    pub tuples: KindTotals,
    /// Live entries across all recorded maps
    pub map_used: usize,
    /// Table slots across all recorded maps
    pub map_slots: usize,
    /// Maps whose table is embedded in the header
    pub inline_maps: usize,
    /// Leaf values offered to `record_value` and ignored
    pub skipped: usize,
}

impl Census {
    pub fn new() -> Self {
        Self::default()
    }

    /// Flat census: each value priced on its own, nothing recursed into
    pub fn of_values<'a, I>(values: I, model: &SizeModel) -> Self
    where
        I: IntoIterator<Item = &'a Value>,
    {
        let mut census = Census::new();
        for value in values {
            census.record_value(value, model);
        }
        census
    }

    pub fn record(&mut self, info: &LayoutInfo) {
        let bytes = info.estimated_bytes();
        match info {
            LayoutInfo::Map(m) => {
                self.maps.add(bytes);
                self.map_used += m.used;
                self.map_slots += m.capacity;
                if m.inline {
                    self.inline_maps += 1;
                }
            }
            LayoutInfo::Sequence(_) => self.sequences.add(bytes),
            LayoutInfo::Tuple(_) => self.tuples.add(bytes),
        }
    }

    /// Record a container; returns false (and counts it skipped) for a leaf
    pub fn record_value(&mut self, value: &Value, model: &SizeModel) -> bool {
        match value.as_container().layout(model) {
            Some(info) => {
                self.record(&info);
                true
            }
            None => {
                self.skipped += 1;
                false
            }
        }
    }

    pub fn merge(&mut self, other: &Census) {
        self.maps.merge(&other.maps);
        self.sequences.merge(&other.sequences);
        self.tuples.merge(&other.tuples);
        self.map_used += other.map_used;
        self.map_slots += other.map_slots;
        self.inline_maps += other.inline_maps;
        self.skipped += other.skipped;
    }

    pub fn total_bytes(&self) -> usize {
        self.maps
            .bytes
            .saturating_add(self.sequences.bytes)
            .saturating_add(self.tuples.bytes)
    }

    /// Containers recorded (leaves excluded)
    pub fn total_count(&self) -> usize {
        self.maps.count + self.sequences.count + self.tuples.count
    }

    /// Live entries per allocated slot across all maps
    pub fn map_load_factor(&self) -> Option<f64> {
        if self.map_slots == 0 {
            None
        } else {
            Some(self.map_used as f64 / self.map_slots as f64)
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::map::Map;
    use crate::sequence::Sequence;
    use crate::tuple::Tuple;

    fn sample() -> Vec<Value> {
        let small = Map::try_from_pairs([(Value::Int(1), Value::Int(2))]).unwrap();
        let large = Map::try_from_pairs((0..6).map(|i| (Value::Int(i), Value::None))).unwrap();
        vec![
            Value::Map(small),
            Value::Map(large),
            Value::Sequence(Sequence::from(vec![Value::Int(1), Value::Int(2)])),
            Value::Tuple(Tuple::new(vec![Value::None])),
            Value::Int(9),
            Value::from("leaf"),
        ]
    }

    #[test]
    fn test_flat_census() {
        let model = SizeModel::lp64();
        let census = Census::of_values(&sample(), &model);

        assert_eq!(census.maps.count, 2);
        assert_eq!(census.maps.bytes, 248 + (248 + 32 * 24));
        assert_eq!(census.sequences, KindTotals { count: 1, bytes: 40 + 2 * 8 });
        assert_eq!(census.tuples, KindTotals { count: 1, bytes: 24 + 8 });
        assert_eq!(census.skipped, 2);
        assert_eq!(census.inline_maps, 1);
        assert_eq!(census.total_count(), 4);
        assert_eq!(
            census.total_bytes(),
            census.maps.bytes + census.sequences.bytes + census.tuples.bytes
        );
    }

    #[test]
    fn test_load_factor() {
        let model = SizeModel::lp64();
        assert_eq!(Census::new().map_load_factor(), None);

        let census = Census::of_values(&sample(), &model);
        assert_eq!(census.map_used, 7);
        assert_eq!(census.map_slots, 8 + 32);
        let load = census.map_load_factor().unwrap();
        assert!((load - 7.0 / 40.0).abs() < f64::EPSILON);
    }

    #[test]
    fn test_merge_adds_everything() {
        let model = SizeModel::lp64();
        let values = sample();
        let (left, right) = values.split_at(3);

        let mut merged = Census::of_values(left, &model);
        merged.merge(&Census::of_values(right, &model));

        assert_eq!(merged, Census::of_values(&values, &model));
    }
}
