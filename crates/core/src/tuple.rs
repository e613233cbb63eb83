use crate::value::Value;

/// Fixed-size, immutable ordered elements
///
/// A tuple is allocated at exactly its length, so it never carries slack.
#[derive(Debug, Clone, Default, PartialEq, Eq, Hash)]
pub struct Tuple(Box<[Value]>);

impl Tuple {
    pub fn new(items: Vec<Value>) -> Self {
        Tuple(items.into_boxed_slice())
    }

    pub fn empty() -> Self {
        Self::default()
    }

    pub fn len(&self) -> usize {
        self.0.len()
    }

    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }

    pub fn get(&self, index: usize) -> Option<&Value> {
        self.0.get(index)
    }

    pub fn iter(&self) -> std::slice::Iter<'_, Value> {
        self.0.iter()
    }

    pub fn as_slice(&self) -> &[Value] {
        &self.0
    }
}

impl FromIterator<Value> for Tuple {
    fn from_iter<I: IntoIterator<Item = Value>>(iter: I) -> Self {
        Tuple(iter.into_iter().collect())
    }
}

impl From<Vec<Value>> for Tuple {
    fn from(items: Vec<Value>) -> Self {
        Tuple::new(items)
    }
}

impl<'a> IntoIterator for &'a Tuple {
    type Item = &'a Value;
    type IntoIter = std::slice::Iter<'a, Value>;

    fn into_iter(self) -> Self::IntoIter {
        self.iter()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_tuple_basics() {
        let t: Tuple = (1..=3).map(Value::Int).collect();
        assert_eq!(t.len(), 3);
        assert_eq!(t.get(1), Some(&Value::Int(2)));
        assert_eq!(t.get(3), None);
        assert!(Tuple::empty().is_empty());
    }
}
