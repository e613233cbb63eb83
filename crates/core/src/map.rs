//! Associative map with slot-table bookkeeping
//!
//! Entries live in a `HashMap`, while the *modeled* storage follows an
//! open-addressing table the way a dynamic runtime lays it out:
//!
//! ```text
//! ┌──────────────────────────── header ───────────────────────────┐
//! │ used │ fill │ mask │ table ptr │ inline table [8 slots]       │
//! └───────────────────────────────────────────────────────────────┘
//!                          │
//!                          └─ once grown: heap table [2^k slots]
//! ```
//!
//! - Small maps keep their slots inside the header (inline storage).
//! - When `fill` reaches 2/3 of the slots, the table is rebuilt with room
//!   for four times the live entries (two times past 50k entries).
//! - Removals leave tombstones: they count toward `fill` until the next
//!   rebuild and the table never shrinks on its own.

use crate::error::Error;
use crate::value::Value;
use std::collections::HashMap;
use tracing::trace;

/// Slots in the inline table embedded in the map header
pub const MIN_SLOTS: usize = 8;

/// Past this many live entries, growth slows from 4x to 2x
const FAST_GROWTH_LIMIT: usize = 50_000;

/// Key/value pairs with unique, hashable keys
#[derive(Debug, Clone)]
pub struct Map {
    entries: HashMap<Value, Value>,
    /// Slots in the active table (power of two, >= MIN_SLOTS)
    slots: usize,
    /// Live entries plus tombstones since the last rebuild
    fill: usize,
}

impl Default for Map {
    fn default() -> Self {
        Self::new()
    }
}

impl Map {
    pub fn new() -> Self {
        Map {
            entries: HashMap::new(),
            slots: MIN_SLOTS,
            fill: 0,
        }
    }

    /// Build a map by inserting pairs in order
    pub fn try_from_pairs<I>(pairs: I) -> Result<Self, Error>
    where
        I: IntoIterator<Item = (Value, Value)>,
    {
        let mut map = Map::new();
        for (key, value) in pairs {
            map.insert(key, value)?;
        }
        Ok(map)
    }

    /// Number of live entries
    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    /// Slots in the active table
    pub fn slots(&self) -> usize {
        self.slots
    }

    /// Whether the active table is the one embedded in the header
    pub fn is_inline(&self) -> bool {
        self.slots == MIN_SLOTS
    }

    /// Insert or overwrite an entry, returning the previous value
    ///
    /// # Errors
    /// Returns `UnhashableKey` if the key is (or contains) a map or sequence.
    pub fn insert(&mut self, key: Value, value: Value) -> Result<Option<Value>, Error> {
        if let Some(type_name) = key.unhashable_part() {
            return Err(Error::UnhashableKey { type_name });
        }

        if let Some(slot) = self.entries.get_mut(&key) {
            return Ok(Some(std::mem::replace(slot, value)));
        }

        self.entries.insert(key, value);
        self.fill += 1;
        if self.fill * 3 >= self.slots * 2 {
            self.rebuild();
        }
        Ok(None)
    }

    pub fn get(&self, key: &Value) -> Option<&Value> {
        self.entries.get(key)
    }

    pub fn contains_key(&self, key: &Value) -> bool {
        self.entries.contains_key(key)
    }

    /// Remove an entry; its slot stays occupied by a tombstone
    pub fn remove(&mut self, key: &Value) -> Option<Value> {
        self.entries.remove(key)
    }

    /// Drop every entry and fall back to the inline table
    pub fn clear(&mut self) {
        self.entries.clear();
        self.slots = MIN_SLOTS;
        self.fill = 0;
    }

    /// Entries in native (unspecified) iteration order
    pub fn iter(&self) -> impl Iterator<Item = (&Value, &Value)> {
        self.entries.iter()
    }

    pub fn keys(&self) -> impl Iterator<Item = &Value> {
        self.entries.keys()
    }

    pub fn values(&self) -> impl Iterator<Item = &Value> {
        self.entries.values()
    }

    /// Size the table for the current live entries and drop tombstones
    fn rebuild(&mut self) {
        let used = self.entries.len();
        let min_used = if used > FAST_GROWTH_LIMIT {
            used * 2
        } else {
            used * 4
        };

        let mut slots = MIN_SLOTS;
        while slots <= min_used {
            slots <<= 1;
        }

        trace!(used, from = self.slots, to = slots, "map table rebuilt");
        self.slots = slots;
        self.fill = used;
    }
}

// Equality is over entries only; table geometry is bookkeeping
impl PartialEq for Map {
    fn eq(&self, other: &Self) -> bool {
        self.entries == other.entries
    }
}

impl Eq for Map {}
