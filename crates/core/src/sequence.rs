//! Growable sequence with explicit over-allocation
//!
//! The element storage itself is a `Vec`, but the *reported* capacity is
//! tracked separately so that it follows a dynamic-runtime growth curve
//! (`0, 4, 8, 16, 25, 35, 46, ...`) instead of whatever `Vec` happens to do.
//! That keeps estimates deterministic across Rust versions and platforms.

use crate::value::Value;

/// Ordered, growable elements with a tracked slot allocation
#[derive(Debug, Clone, Default)]
pub struct Sequence {
    items: Vec<Value>,
    /// Allocated element slots, always >= items.len()
    allocated: usize,
}

impl Sequence {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn len(&self) -> usize {
        self.items.len()
    }

    pub fn is_empty(&self) -> bool {
        self.items.is_empty()
    }

    /// Allocated element slots (>= `len()`)
    pub fn capacity(&self) -> usize {
        self.allocated
    }

    pub fn get(&self, index: usize) -> Option<&Value> {
        self.items.get(index)
    }

    pub fn iter(&self) -> std::slice::Iter<'_, Value> {
        self.items.iter()
    }

    pub fn as_slice(&self) -> &[Value] {
        &self.items
    }

    pub fn push(&mut self, value: Value) {
        self.resize(self.items.len() + 1);
        self.items.push(value);
    }

    pub fn pop(&mut self) -> Option<Value> {
        let value = self.items.pop()?;
        self.resize(self.items.len());
        Some(value)
    }

    /// Insert before `index`; an index past the end appends
    pub fn insert(&mut self, index: usize, value: Value) {
        let index = index.min(self.items.len());
        self.resize(self.items.len() + 1);
        self.items.insert(index, value);
    }

    pub fn remove(&mut self, index: usize) -> Option<Value> {
        if index >= self.items.len() {
            return None;
        }
        let value = self.items.remove(index);
        self.resize(self.items.len());
        Some(value)
    }

    /// Append all values, growing once for the whole batch
    pub fn extend<I: IntoIterator<Item = Value>>(&mut self, values: I) {
        let values: Vec<Value> = values.into_iter().collect();
        if values.is_empty() {
            return;
        }
        self.resize(self.items.len() + values.len());
        self.items.extend(values);
    }

    pub fn truncate(&mut self, len: usize) {
        if len >= self.items.len() {
            return;
        }
        self.items.truncate(len);
        self.resize(len);
    }

    /// Drop every element and release the slot array
    pub fn clear(&mut self) {
        self.items.clear();
        self.allocated = 0;
    }

    /// Account for a length change to `new_len`
    ///
    /// Keeps the allocation while it still fits and is at least half used;
    /// otherwise over-allocates by roughly 1/8 plus a small constant.
    fn resize(&mut self, new_len: usize) {
        if self.allocated >= new_len && new_len >= (self.allocated >> 1) {
            return;
        }
        self.allocated = if new_len == 0 {
            0
        } else {
            new_len + (new_len >> 3) + if new_len < 9 { 3 } else { 6 }
        };
    }
}

impl From<Vec<Value>> for Sequence {
    /// Literal construction: allocated exactly to length
    fn from(items: Vec<Value>) -> Self {
        let allocated = items.len();
        Sequence { items, allocated }
    }
}

impl FromIterator<Value> for Sequence {
    fn from_iter<I: IntoIterator<Item = Value>>(iter: I) -> Self {
        Sequence::from(iter.into_iter().collect::<Vec<_>>())
    }
}

impl<'a> IntoIterator for &'a Sequence {
    type Item = &'a Value;
    type IntoIter = std::slice::Iter<'a, Value>;

    fn into_iter(self) -> Self::IntoIter {
        self.iter()
    }
}

// Equality is over elements only; two equal sequences may differ in headroom
impl PartialEq for Sequence {
    fn eq(&self, other: &Self) -> bool {
        self.items == other.items
    }
}

impl Eq for Sequence {}
