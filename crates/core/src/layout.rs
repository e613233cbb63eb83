//! Layout Inspector
//!
//! Reports the structural metadata of a single container: header size,
//! slot size, occupancy, capacity, and (for maps) whether the slot table is
//! embedded in the header. No recursion happens here.
//!
//! Sequences and tuples share the four-field [`ArrayLayout`] shape. A tuple
//! reports its length as its capacity because it is allocated exactly.

use crate::error::Error;
use crate::map::Map;
use crate::sequence::Sequence;
use crate::size_model::SizeModel;
use crate::tuple::Tuple;
use crate::value::{Container, Value};
use serde::Serialize;

/// Layout of a map's slot table
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub struct MapLayout {
    pub header_size: usize,
    pub entry_size: usize,
    /// Live entries
    pub used: usize,
    /// Slots in the active table
    pub capacity: usize,
    /// The table lives inside the header, not in a separate allocation
    pub inline: bool,
}

/// Layout of a contiguous array of element slots
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub struct ArrayLayout {
    pub header_size: usize,
    pub slot_size: usize,
    pub length: usize,
    pub capacity: usize,
}

/// Structural metadata for one container
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(tag = "kind", rename_all = "snake_case")]
pub enum LayoutInfo {
    Map(MapLayout),
    Sequence(ArrayLayout),
    Tuple(ArrayLayout),
}

impl LayoutInfo {
    /// Estimated bytes owned by this node alone
    ///
    /// An inline map table is already part of the header, so only a
    /// heap-allocated table adds `capacity * entry_size`. Saturates at
    /// `usize::MAX` for models that skipped [`SizeModel::validate`].
    pub fn estimated_bytes(&self) -> usize {
        match self {
            LayoutInfo::Map(m) if m.inline => m.header_size,
            LayoutInfo::Map(m) => m
                .header_size
                .saturating_add(m.capacity.saturating_mul(m.entry_size)),
            LayoutInfo::Sequence(a) | LayoutInfo::Tuple(a) => a
                .header_size
                .saturating_add(a.capacity.saturating_mul(a.slot_size)),
        }
    }

    /// Logical element count (entries for maps)
    pub fn len(&self) -> usize {
        match self {
            LayoutInfo::Map(m) => m.used,
            LayoutInfo::Sequence(a) | LayoutInfo::Tuple(a) => a.length,
        }
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    /// Allocated slots
    pub fn capacity(&self) -> usize {
        match self {
            LayoutInfo::Map(m) => m.capacity,
            LayoutInfo::Sequence(a) | LayoutInfo::Tuple(a) => a.capacity,
        }
    }

    pub fn kind(&self) -> &'static str {
        match self {
            LayoutInfo::Map(_) => "map",
            LayoutInfo::Sequence(_) => "sequence",
            LayoutInfo::Tuple(_) => "tuple",
        }
    }
}

pub fn map_layout(map: &Map, model: &SizeModel) -> MapLayout {
    MapLayout {
        header_size: model.map_header,
        entry_size: model.map_entry,
        used: map.len(),
        capacity: map.slots(),
        inline: map.is_inline(),
    }
}

pub fn sequence_layout(seq: &Sequence, model: &SizeModel) -> ArrayLayout {
    ArrayLayout {
        header_size: model.sequence_header,
        slot_size: model.pointer,
        length: seq.len(),
        capacity: seq.capacity(),
    }
}

pub fn tuple_layout(tuple: &Tuple, model: &SizeModel) -> ArrayLayout {
    slots_layout(tuple.len(), model)
}

/// Layout of a tuple holding `len` elements
pub(crate) fn slots_layout(len: usize, model: &SizeModel) -> ArrayLayout {
    ArrayLayout {
        header_size: model.tuple_header,
        slot_size: model.pointer,
        length: len,
        capacity: len,
    }
}

impl Container<'_> {
    /// Layout of this node, or `None` for a leaf
    pub fn layout(&self, model: &SizeModel) -> Option<LayoutInfo> {
        match self {
            Container::Map(m) => Some(LayoutInfo::Map(map_layout(m, model))),
            Container::Sequence(s) => Some(LayoutInfo::Sequence(sequence_layout(s, model))),
            Container::Tuple(t) => Some(LayoutInfo::Tuple(tuple_layout(t, model))),
            Container::Other(_) => None,
        }
    }
}

/// Inspect one value with an explicit size model
///
/// # Errors
/// `UnsupportedType` when the value is not a map, sequence, or tuple.
pub fn inspect_with(value: &Value, model: &SizeModel) -> Result<LayoutInfo, Error> {
    value
        .as_container()
        .layout(model)
        .ok_or(Error::UnsupportedType {
            type_name: value.type_name(),
        })
}
