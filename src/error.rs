use std::collections::TryReserveError;
use std::fmt;

use thiserror::Error;

/// Failure to construct a [`CircularDeque`](crate::CircularDeque).
#[derive(Debug, Error)]
pub enum CreateError {
    #[error("capacity must be at least one slot")]
    ZeroCapacity,
    #[error("could not allocate backing storage for {capacity} slots")]
    Allocation {
        capacity: usize,
        #[source]
        source: TryReserveError,
    },
}

/// An insert was attempted on a saturated deque.
///
/// The rejected element is handed back so the caller can retry, evict, or drop it.
#[derive(Clone, Copy, PartialEq, Eq, Error)]
#[error("deque is full")]
pub struct Full<T>(pub T);

impl<T> Full<T> {
    /// Returns the element that could not be inserted.
    pub fn into_inner(self) -> T {
        self.0
    }
}

// no `T: Debug` bound so the error works for opaque handles
impl<T> fmt::Debug for Full<T> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Full").finish_non_exhaustive()
    }
}

/// The handle passed to [`remove`](crate::CircularDeque::remove) is not stored in the deque.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Error)]
#[error("element not found in deque")]
pub struct NotFound;

/// The leg of a two-deque transfer that could not proceed.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Error)]
pub enum TransferError {
    #[error("source deque is empty")]
    Empty,
    #[error("destination deque is full")]
    Full,
}
