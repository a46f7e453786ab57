//! A string-keyed collection that many threads fill concurrently and one
//! consumer drains, once, into a key-sorted `Vec`.
//!
//! ```
//! use labeledcollection::LabeledCollection;
//!
//! let collection = LabeledCollection::new();
//! collection.init().unwrap();
//! collection.insert("banana", "yellow", 0).unwrap();
//! collection.insert("apple", "red", 1).unwrap();
//! let sorted = collection.drain_sorted().unwrap();
//! assert_eq!(sorted[0].key(), "apple");
//! collection.cleanup();
//! ```

use std::mem;

use parking_lot::Mutex;
use tracing::{debug, trace, warn};

pub use error::{CollectionState, Operation, StateError};
pub use record::Record;

mod error;
pub mod generator;
mod record;

/// Upper bound on the slots reserved up front; the buffer still grows past it on demand.
pub const MAX_RESERVED: usize = 1024 * 1024;

// ---Lifecycle phase----------------------------------------------------------------------------------
// The buffer lives inside the Active variant, so no other phase can hold records.
#[derive(Debug)]
enum Phase {
    Uninitialized,
    Active(Vec<Record>),
    Drained,
}

impl Phase {
    fn state(&self) -> CollectionState {
        match self {
            Phase::Uninitialized => CollectionState::Uninitialized,
            Phase::Active(_) => CollectionState::Active,
            Phase::Drained => CollectionState::Drained,
        }
    }
}

fn rejected(operation: Operation, state: CollectionState) -> StateError {
    warn!(%operation, %state, "operation rejected");
    StateError { operation, state }
}

// ---Collection---------------------------------------------------------------------------------------
/// Thread-safe append-only buffer of [`Record`]s with a one-shot sorted drain.
///
/// Share it between producers with `Arc<LabeledCollection>`; every operation takes `&self`.
/// The lifecycle is `Uninitialized -> Active -> Drained`, and [`cleanup`](Self::cleanup)
/// returns to `Uninitialized` from anywhere.
///
/// Calling [`init`](Self::init) on a collection that is not `Uninitialized` is an error,
/// not a no-op.
#[derive(Debug)]
pub struct LabeledCollection {
    inner: Mutex<Phase>,
}

impl Default for LabeledCollection {
    fn default() -> Self {
        LabeledCollection::new()
    }
}

impl LabeledCollection {
    pub fn new() -> LabeledCollection {
        LabeledCollection {
            inner: Mutex::new(Phase::Uninitialized),
        }
    }

    /// Uninitialized -> Active.
    pub fn init(&self) -> Result<(), StateError> {
        self.init_with(Vec::new())
    }

    /// Like [`init`](Self::init), reserving room for `capacity` records up front.
    ///
    /// The reservation is clamped to [`MAX_RESERVED`].
    pub fn init_with_capacity(&self, capacity: usize) -> Result<(), StateError> {
        self.init_with(Vec::with_capacity(capacity.min(MAX_RESERVED)))
    }

    fn init_with(&self, buffer: Vec<Record>) -> Result<(), StateError> {
        let mut phase = self.inner.lock();
        match *phase {
            Phase::Uninitialized => {
                debug!(capacity = buffer.capacity(), "collection initialized");
                *phase = Phase::Active(buffer);
                Ok(())
            }
            ref other => Err(rejected(Operation::Init, other.state())),
        }
    }

    pub fn insert<K: Into<String>, P: Into<String>>(
        &self,
        key: K,
        payload: P,
        origin: u32,
    ) -> Result<(), StateError> {
        self.insert_record(Record::new(key, payload, origin))
    }

    /// Appends `record` under the lock. Valid only while Active; on error the record is dropped.
    pub fn insert_record(&self, record: Record) -> Result<(), StateError> {
        let mut phase = self.inner.lock();
        match &mut *phase {
            Phase::Active(buffer) => {
                trace!(key = record.key(), origin = record.origin(), "insert");
                buffer.push(record);
                Ok(())
            }
            other => Err(rejected(Operation::Insert, other.state())),
        }
    }

    /// Active -> Drained, handing every stored record to the caller ordered by key.
    ///
    /// Keys compare as bytes (`str`'s `Ord`). The sort is stable: records with equal keys
    /// keep the order in which their inserts completed under the lock.
    pub fn drain_sorted(&self) -> Result<Vec<Record>, StateError> {
        let mut records = {
            let mut phase = self.inner.lock();
            match mem::replace(&mut *phase, Phase::Drained) {
                Phase::Active(buffer) => buffer,
                other => {
                    let state = other.state();
                    *phase = other;
                    return Err(rejected(Operation::Drain, state));
                }
            }
        };
        records.sort_by(|a, b| a.key().cmp(b.key()));
        debug!(records = records.len(), "collection drained");
        Ok(records)
    }

    /// Any state -> Uninitialized, dropping whatever is still stored. Never fails.
    pub fn cleanup(&self) {
        let previous = mem::replace(&mut *self.inner.lock(), Phase::Uninitialized);
        if let Phase::Active(buffer) = &previous {
            debug!(discarded = buffer.len(), "cleanup dropped undrained records");
        }
        debug!(from = %previous.state(), "collection cleaned up");
    }

    pub fn state(&self) -> CollectionState {
        self.inner.lock().state()
    }

    /// Records currently held; always 0 unless Active.
    pub fn len(&self) -> usize {
        match &*self.inner.lock() {
            Phase::Active(buffer) => buffer.len(),
            _ => 0,
        }
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }
}

/****************************************************************************
 * Tests
 ****************************************************************************/
