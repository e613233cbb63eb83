//! Configured entry points
//!
//! An `Estimator` bundles a size model and a default depth budget so callers
//! do not thread both through every call. It holds no state between calls;
//! sharing one across threads is fine.

use crate::census::Census;
use crate::config::Config;
use crate::error::Error;
use crate::layout::{LayoutInfo, inspect_with};
use crate::size_model::SizeModel;
use crate::tree::{TreeSummary, walk, walk_elements};
use crate::tuple::Tuple;
use crate::value::Value;

#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Estimator {
    config: Config,
}

impl Estimator {
    pub fn new(config: Config) -> Self {
        Estimator { config }
    }

    pub fn config(&self) -> &Config {
        &self.config
    }

    pub fn model(&self) -> &SizeModel {
        &self.config.model
    }

    pub fn max_depth(&self) -> usize {
        self.config.max_depth
    }

    /// Layout of a single container
    pub fn inspect(&self, value: &Value) -> Result<LayoutInfo, Error> {
        inspect_with(value, &self.config.model)
    }

    /// Total estimated bytes under `root` with the configured budget
    pub fn accumulate(&self, root: &Tuple) -> Result<usize, Error> {
        self.accumulate_with_depth(root, self.config.max_depth)
    }

    pub fn accumulate_with_depth(&self, root: &Tuple, max_depth: usize) -> Result<usize, Error> {
        Ok(self.summarize(root, max_depth)?.total_bytes)
    }

    /// Total plus per-kind breakdown
    pub fn summarize(&self, root: &Tuple, max_depth: usize) -> Result<TreeSummary, Error> {
        walk(root, max_depth, &self.config.model)
    }

    /// Accumulate from a dynamically typed root
    ///
    /// # Errors
    /// `RootNotTuple` if `root` is anything but a tuple.
    pub fn accumulate_value(&self, root: &Value, max_depth: usize) -> Result<usize, Error> {
        match root {
            Value::Tuple(tuple) => self.accumulate_with_depth(tuple, max_depth),
            other => Err(Error::RootNotTuple {
                type_name: other.type_name(),
            }),
        }
    }

    /// Accumulate `values` as if they were the elements of one root tuple
    pub fn accumulate_all(&self, values: &[Value], max_depth: usize) -> Result<usize, Error> {
        Ok(walk_elements(values, max_depth, &self.config.model)?.total_bytes)
    }

    /// Flat census: each value priced on its own
    pub fn census<'a, I>(&self, values: I) -> Census
    where
        I: IntoIterator<Item = &'a Value>,
    {
        Census::of_values(values, &self.config.model)
    }
}
