//! Lifecycle errors for [`LabeledCollection`](crate::LabeledCollection).

use std::fmt;

use thiserror::Error;

/// Lifecycle phase of a collection.
#[derive(PartialEq, Eq, Copy, Clone, Debug)]
pub enum CollectionState {
    Uninitialized,
    Active,
    Drained,
}

impl fmt::Display for CollectionState {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let s = match self {
            CollectionState::Uninitialized => "uninitialized",
            CollectionState::Active => "active",
            CollectionState::Drained => "drained",
        };
        f.write_str(s)
    }
}

/// Operations that are only valid in some states. `cleanup` is absent: it never fails.
#[derive(PartialEq, Eq, Copy, Clone, Debug)]
pub enum Operation {
    Init,
    Insert,
    Drain,
}

impl fmt::Display for Operation {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let s = match self {
            Operation::Init => "init",
            Operation::Insert => "insert into",
            Operation::Drain => "drain",
        };
        f.write_str(s)
    }
}

/// An operation was invoked outside its valid lifecycle state.
///
/// This is a caller contract violation. The collection is left untouched.
#[derive(Debug, Error, PartialEq, Eq, Copy, Clone)]
#[error("cannot {operation} a collection that is {state}")]
pub struct StateError {
    pub operation: Operation,
    pub state: CollectionState,
}

#[cfg(test)]
mod tests {
    use super::{CollectionState, Operation, StateError};

    #[test]
    fn test_state_error_message() {
        let err = StateError {
            operation: Operation::Insert,
            state: CollectionState::Drained,
        };
        assert_eq!(
            err.to_string(),
            "cannot insert into a collection that is drained"
        );

        let err = StateError {
            operation: Operation::Init,
            state: CollectionState::Active,
        };
        assert_eq!(err.to_string(), "cannot init a collection that is active");
    }
}
