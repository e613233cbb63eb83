//! Bounded Tree Accumulator
//!
//! Walks every container reachable from a root tuple and sums the estimated
//! bytes of each node. There is no visited-set: a value reachable from two
//! parents is priced twice, and the depth budget is the only guard against
//! runaway structures.
//!
//! # Depth budget
//!
//! The root is visited with the full budget and each descent costs one unit.
//! Visiting a container with nothing left fails the whole walk, so a chain
//! of `N` nested tuples fits in a budget of `N` and fails with `N - 1`.
//! Leaves are never descended into and never fail.
//!
//! # Work stack
//!
//! The walk keeps its own `(container, remaining)` stack instead of
//! recursing, so the host call stack stays flat no matter how large the
//! budget is.

use crate::census::Census;
use crate::error::Error;
use crate::layout::{LayoutInfo, slots_layout};
use crate::size_model::SizeModel;
use crate::tuple::Tuple;
use crate::value::{Container, Value};
use serde::Serialize;
use tracing::{debug, trace, warn};

/// Result of a successful walk
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
pub struct TreeSummary {
    /// Sum of every visited node's estimated bytes
    pub total_bytes: usize,
    /// Deepest nesting level visited (the root is level 1)
    pub deepest: usize,
    /// Per-kind breakdown of the total
    pub census: Census,
}

impl TreeSummary {
    fn add(&mut self, info: &LayoutInfo, level: usize) {
        let bytes = info.estimated_bytes();
        trace!(kind = info.kind(), bytes, level, "visit");
        self.total_bytes = self.total_bytes.saturating_add(bytes);
        self.census.record(info);
        self.deepest = self.deepest.max(level);
    }
}

/// Walk `root` and price every reachable container
///
/// # Errors
/// `DepthExceeded` carrying `max_depth` if any container sits deeper than
/// the budget allows. No partial total is returned.
pub fn walk(root: &Tuple, max_depth: usize, model: &SizeModel) -> Result<TreeSummary, Error> {
    walk_elements(root.as_slice(), max_depth, model)
}

/// Walk `items` as the elements of an implicit root tuple
///
/// Prices exactly like [`walk`] on a tuple holding `items`, without
/// building that tuple.
pub fn walk_elements(
    items: &[Value],
    max_depth: usize,
    model: &SizeModel,
) -> Result<TreeSummary, Error> {
    if max_depth == 0 {
        warn!(max_depth, "depth budget exhausted at the root");
        return Err(Error::DepthExceeded { max_depth });
    }

    let mut summary = TreeSummary::default();
    summary.add(&LayoutInfo::Tuple(slots_layout(items.len(), model)), 1);

    let mut pending: Vec<(Container<'_>, usize)> = Vec::new();
    for item in items.iter().rev() {
        push_child(&mut pending, item, max_depth - 1);
    }

    while let Some((node, remaining)) = pending.pop() {
        let Some(info) = node.layout(model) else {
            continue;
        };

        if remaining == 0 {
            warn!(max_depth, "depth budget exhausted during traversal");
            return Err(Error::DepthExceeded { max_depth });
        }

        summary.add(&info, max_depth - remaining + 1);

        let child_budget = remaining - 1;
        match node {
            Container::Map(map) => {
                for (key, value) in map.iter() {
                    push_child(&mut pending, value, child_budget);
                    push_child(&mut pending, key, child_budget);
                }
            }
            Container::Sequence(seq) => {
                for item in seq.iter().rev() {
                    push_child(&mut pending, item, child_budget);
                }
            }
            Container::Tuple(tuple) => {
                for item in tuple.iter().rev() {
                    push_child(&mut pending, item, child_budget);
                }
            }
            Container::Other(_) => {}
        }
    }

    debug!(
        total_bytes = summary.total_bytes,
        nodes = summary.census.total_count(),
        deepest = summary.deepest,
        "tree accumulated"
    );
    Ok(summary)
}

/// Queue a child for pricing; leaves are dropped here
fn push_child<'a>(pending: &mut Vec<(Container<'a>, usize)>, value: &'a Value, budget: usize) {
    let node = value.as_container();
    if !matches!(node, Container::Other(_)) {
        pending.push((node, budget));
    }
}
