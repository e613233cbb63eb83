//! meminfo: estimated memory footprint of nested containers
//!
//! Answers two questions about trees built from maps, sequences and tuples:
//! - What does one container's storage look like (header, slot size,
//!   occupancy, capacity, inline or heap table)?
//! - How many bytes does everything reachable from a root tuple cost,
//!   within a bounded nesting depth?
//!
//! Estimates come from structural bookkeeping priced with a [`SizeModel`],
//! never from allocator queries. Scalars and strings are free.
//!
//! # Modules
//!
//! - `value`: `Value` enum and the `Container` dispatch view
//! - `map` / `sequence` / `tuple`: containers with storage bookkeeping
//! - `size_model`: versioned per-kind byte constants
//! - `config`: depth budget and model, loadable from TOML
//! - `layout`: Layout Inspector
//! - `tree`: Bounded Tree Accumulator
//! - `census`: per-kind aggregation of layouts
//! - `estimator`: configured entry points
//! - `notation`: literal syntax parser and printer
//! - `error`: inspection/traversal errors
//!
//! # Example
//!
//! ```
//! use meminfo_core::{accumulate, inspect, notation};
//!
//! let value = notation::parse("([1, 2, 3],)").unwrap();
//! let meminfo_core::Value::Tuple(root) = &value else { unreachable!() };
//!
//! // tuple header + 1 slot, sequence header + 3 slots
//! assert_eq!(accumulate(root, 16).unwrap(), (24 + 8) + (40 + 3 * 8));
//! assert!(inspect(&meminfo_core::Value::Int(1)).is_err());
//! ```

pub mod census;
pub mod config;
pub mod error;
pub mod estimator;
pub mod layout;
pub mod map;
pub mod notation;
pub mod sequence;
pub mod size_model;
pub mod tree;
pub mod tuple;
pub mod value;

pub use census::{Census, KindTotals};
pub use config::{Config, DEFAULT_MAX_DEPTH};
pub use error::Error;
pub use estimator::Estimator;
pub use layout::{ArrayLayout, LayoutInfo, MapLayout};
pub use map::Map;
pub use sequence::Sequence;
pub use size_model::SizeModel;
pub use tree::TreeSummary;
pub use tuple::Tuple;
pub use value::{Container, Value};

/// Layout of one container under the default size model
///
/// # Errors
/// `UnsupportedType` for anything that is not a map, sequence, or tuple.
pub fn inspect(value: &Value) -> Result<LayoutInfo, Error> {
    layout::inspect_with(value, &SizeModel::default())
}

/// Estimated bytes of every container under `root`, default size model
///
/// # Errors
/// `DepthExceeded` if the tree nests deeper than `max_depth`.
pub fn accumulate(root: &Tuple, max_depth: usize) -> Result<usize, Error> {
    Ok(tree::walk(root, max_depth, &SizeModel::default())?.total_bytes)
}
