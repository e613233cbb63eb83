//! Errors raised by inspection and traversal
//!
//! Every failure aborts the current call. Nothing here is retried or
//! recovered internally: the caller decides whether to raise the depth
//! budget, pick a different root, or give up.

/// Error from [`inspect`](crate::inspect) or [`accumulate`](crate::accumulate)
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Error {
    /// Value handed to the inspector is not a map, sequence, or tuple
    UnsupportedType { type_name: &'static str },
    /// Traversal needed to descend past the configured depth budget
    DepthExceeded { max_depth: usize },
    /// Dynamic traversal root is not a tuple
    RootNotTuple { type_name: &'static str },
    /// Map key cannot be hashed (maps, sequences, or tuples holding them)
    UnhashableKey { type_name: &'static str },
}

impl std::fmt::Display for Error {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Error::UnsupportedType { type_name } => write!(f, "Unhandled type: <{}>", type_name),
            Error::DepthExceeded { max_depth } => {
                write!(f, "Traversal depth exceeded: <{}>", max_depth)
            }
            Error::RootNotTuple { type_name } => {
                write!(f, "Traversal root must be a tuple, got <{}>", type_name)
            }
            Error::UnhashableKey { type_name } => {
                write!(f, "Unhashable map key: <{}>", type_name)
            }
        }
    }
}

impl std::error::Error for Error {}
