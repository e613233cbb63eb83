use crate::map::Map;
use crate::sequence::Sequence;
use crate::tuple::Tuple;
use std::hash::{Hash, Hasher};

/// Value: what the estimator walks over
///
/// Scalars and strings are opaque leaves: they are carried so trees look
/// like real data, but they never contribute to a size estimate.
/// Only the three container variants own structural storage.
///
/// # Equality
///
/// Floats compare by bit pattern so that `Value` can be a map key with a
/// lawful `Eq`: `NaN == NaN`, while `0.0 != -0.0`.
#[derive(Debug, Clone, Default)]
pub enum Value {
    #[default]
    None,

    Bool(bool),

    Int(i64),

    /// IEEE 754 double; compared and hashed by bits
    Float(f64),

    Str(String),

    /// Associative map with slot-table bookkeeping
    Map(Map),

    /// Growable ordered sequence with over-allocation bookkeeping
    Sequence(Sequence),

    /// Fixed-size ordered elements, capacity == length
    Tuple(Tuple),
}

/// Borrowed view of a value, split by container kind
///
/// This is the single dispatch point shared by the inspector and the tree
/// accumulator. Anything that is not a container lands in `Other`.
#[derive(Debug, Clone, Copy)]
pub enum Container<'a> {
    Map(&'a Map),
    Sequence(&'a Sequence),
    Tuple(&'a Tuple),
    Other(&'a Value),
}

impl Value {
    /// Runtime type name used in diagnostics
    pub fn type_name(&self) -> &'static str {
        match self {
            Value::None => "none",
            Value::Bool(_) => "bool",
            Value::Int(_) => "int",
            Value::Float(_) => "float",
            Value::Str(_) => "str",
            Value::Map(_) => "map",
            Value::Sequence(_) => "sequence",
            Value::Tuple(_) => "tuple",
        }
    }

    pub fn as_container(&self) -> Container<'_> {
        match self {
            Value::Map(m) => Container::Map(m),
            Value::Sequence(s) => Container::Sequence(s),
            Value::Tuple(t) => Container::Tuple(t),
            other => Container::Other(other),
        }
    }

    pub fn is_container(&self) -> bool {
        !matches!(self.as_container(), Container::Other(_))
    }

    /// Type name of the first part of this value that cannot be hashed
    ///
    /// Maps and sequences are mutable and never hashable; a tuple is
    /// hashable only if all of its elements are.
    pub fn unhashable_part(&self) -> Option<&'static str> {
        match self {
            Value::Map(_) | Value::Sequence(_) => Some(self.type_name()),
            Value::Tuple(t) => t.iter().find_map(Value::unhashable_part),
            _ => None,
        }
    }

    pub fn is_hashable(&self) -> bool {
        self.unhashable_part().is_none()
    }
}

impl PartialEq for Value {
    fn eq(&self, other: &Self) -> bool {
        match (self, other) {
            (Value::None, Value::None) => true,
            (Value::Bool(a), Value::Bool(b)) => a == b,
            (Value::Int(a), Value::Int(b)) => a == b,
            (Value::Float(a), Value::Float(b)) => a.to_bits() == b.to_bits(),
            (Value::Str(a), Value::Str(b)) => a == b,
            (Value::Map(a), Value::Map(b)) => a == b,
            (Value::Sequence(a), Value::Sequence(b)) => a == b,
            (Value::Tuple(a), Value::Tuple(b)) => a == b,
            _ => false,
        }
    }
}

impl Eq for Value {}

impl Hash for Value {
    fn hash<H: Hasher>(&self, state: &mut H) {
        std::mem::discriminant(self).hash(state);
        match self {
            Value::None => {}
            Value::Bool(b) => b.hash(state),
            Value::Int(n) => n.hash(state),
            Value::Float(f) => f.to_bits().hash(state),
            Value::Str(s) => s.hash(state),
            // Maps are rejected as keys; length keeps Hash consistent with Eq
            Value::Map(m) => m.len().hash(state),
            Value::Sequence(s) => {
                for item in s.iter() {
                    item.hash(state);
                }
            }
            Value::Tuple(t) => t.hash(state),
        }
    }
}

impl From<bool> for Value {
    fn from(b: bool) -> Self {
        Value::Bool(b)
    }
}

impl From<i64> for Value {
    fn from(n: i64) -> Self {
        Value::Int(n)
    }
}

impl From<f64> for Value {
    fn from(f: f64) -> Self {
        Value::Float(f)
    }
}

impl From<&str> for Value {
    fn from(s: &str) -> Self {
        Value::Str(s.to_string())
    }
}

impl From<String> for Value {
    fn from(s: String) -> Self {
        Value::Str(s)
    }
}

impl From<Map> for Value {
    fn from(m: Map) -> Self {
        Value::Map(m)
    }
}

impl From<Sequence> for Value {
    fn from(s: Sequence) -> Self {
        Value::Sequence(s)
    }
}

impl From<Tuple> for Value {
    fn from(t: Tuple) -> Self {
        Value::Tuple(t)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::collections::HashSet;

    #[test]
    fn test_container_dispatch() {
        let seq = Value::Sequence(Sequence::from(vec![Value::Int(1)]));
        assert!(matches!(seq.as_container(), Container::Sequence(_)));
        assert!(matches!(
            Value::Tuple(Tuple::empty()).as_container(),
            Container::Tuple(_)
        ));
        assert!(matches!(Value::Map(Map::new()).as_container(), Container::Map(_)));
        assert!(matches!(Value::Int(3).as_container(), Container::Other(_)));
        assert!(!Value::from("leaf").is_container());
    }

    #[test]
    fn test_hashability() {
        assert!(Value::Int(1).is_hashable());
        assert!(Value::Tuple(Tuple::new(vec![Value::Int(1), Value::from("a")])).is_hashable());

        let nested = Value::Tuple(Tuple::new(vec![Value::Sequence(Sequence::new())]));
        assert_eq!(nested.unhashable_part(), Some("sequence"));
        assert_eq!(Value::Map(Map::new()).unhashable_part(), Some("map"));
    }

    #[test]
    fn test_float_keys_compare_by_bits() {
        let mut set = HashSet::new();
        set.insert(Value::Float(f64::NAN));
        assert!(set.contains(&Value::Float(f64::NAN)));
        assert_ne!(Value::Float(0.0), Value::Float(-0.0));
    }

    #[test]
    fn test_cross_variant_inequality() {
        assert_ne!(Value::Int(1), Value::Bool(true));
        assert_ne!(Value::Int(1), Value::Float(1.0));
        assert_eq!(Value::None, Value::default());
    }
}
