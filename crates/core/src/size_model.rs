//! Per-variant byte constants
//!
//! The estimator never looks at real allocations. Each container kind is
//! priced with a fixed header plus a per-slot cost taken from a `SizeModel`.
//! Models are versioned so a stored estimate can say which constants
//! produced it.
//!
//! | preset  | map header | map entry | sequence header | tuple header | pointer |
//! |---------|-----------:|----------:|----------------:|-------------:|--------:|
//! | `lp64`  | 248        | 24        | 40              | 24           | 8       |
//! | `ilp32` | 124        | 12        | 20              | 12           | 4       |

use serde::{Deserialize, Serialize};

/// Byte sizes used to price each container kind
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct SizeModel {
    /// Preset or user-chosen name
    pub name: String,
    /// Bumped whenever the constants of a named model change
    pub version: u32,
    /// Map header, including the inline slot table
    pub map_header: usize,
    /// One slot of a heap-allocated map table (hash, key, value)
    pub map_entry: usize,
    /// Sequence header (length, capacity, slot array pointer)
    pub sequence_header: usize,
    /// Tuple header (length); elements follow inline
    pub tuple_header: usize,
    /// One element slot in a sequence or tuple
    pub pointer: usize,
}

/// Names accepted by [`SizeModel::preset`]
pub const PRESET_NAMES: &[&str] = &["lp64", "ilp32"];

/// Largest byte constant a configured model may carry (1 MiB)
pub const MAX_CONSTANT: usize = 1 << 20;

impl SizeModel {
    /// 64-bit pointers, 8-byte words
    pub fn lp64() -> Self {
        SizeModel {
            name: "lp64".to_string(),
            version: 1,
            map_header: 248,
            map_entry: 24,
            sequence_header: 40,
            tuple_header: 24,
            pointer: 8,
        }
    }

    /// 32-bit pointers, 4-byte words
    pub fn ilp32() -> Self {
        SizeModel {
            name: "ilp32".to_string(),
            version: 1,
            map_header: 124,
            map_entry: 12,
            sequence_header: 20,
            tuple_header: 12,
            pointer: 4,
        }
    }

    /// Check every constant against [`MAX_CONSTANT`]
    ///
    /// Estimates of any tree that fits in memory stay far from `usize`
    /// overflow once the constants are bounded.
    pub fn validate(&self) -> Result<(), String> {
        let constants = [
            ("map_header", self.map_header),
            ("map_entry", self.map_entry),
            ("sequence_header", self.sequence_header),
            ("tuple_header", self.tuple_header),
            ("pointer", self.pointer),
        ];
        for (field, bytes) in constants {
            if bytes > MAX_CONSTANT {
                return Err(format!(
                    "Size model '{}': {} = {} exceeds the {} byte limit",
                    self.name, field, bytes, MAX_CONSTANT
                ));
            }
        }
        Ok(())
    }

    /// Look up a built-in model by name
    pub fn preset(name: &str) -> Option<Self> {
        match name {
            "lp64" => Some(Self::lp64()),
            "ilp32" => Some(Self::ilp32()),
            _ => None,
        }
    }
}

impl Default for SizeModel {
    fn default() -> Self {
        Self::lp64()
    }
}
