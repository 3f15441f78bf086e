//! `ringlock` provides [`CircularDeque`], a fixed-capacity double-ended queue backed by a circular
//! buffer and guarded by one lock per instance. It is meant as a building block for
//! producer/consumer and work-stealing style code: every operation is a short critical section
//! that either succeeds or reports why it could not (full, empty, not found) without waiting.
//!
//! Elements are treated as opaque handles. Lookups compare them by identity through [`Handle`],
//! and the deque never runs a release action on them except the one passed to
//! [`CircularDeque::traverse_and_clear`].
//!
//! # Examples
//! ```
//! use ringlock::{CircularDeque, TransferError};
//! use std::sync::Arc;
//!
//! let work = CircularDeque::with_capacity(4).unwrap();
//! let stolen = CircularDeque::with_capacity(4).unwrap();
//! for job in 0..4 {
//!     work.push_back(Arc::new(job)).unwrap();
//! }
//!
//! work.transfer_back_to_front(&stolen).unwrap();
//! assert_eq!(stolen.peek_front().as_deref(), Some(&3));
//! assert_eq!(work.len(), 3);
//!
//! let empty = CircularDeque::<Arc<i32>>::with_capacity(1).unwrap();
//! assert_eq!(empty.transfer_front_to_back(&work), Err(TransferError::Empty));
//!
//! let mut released = Vec::new();
//! work.traverse_and_clear(|job| released.push(*job));
//! assert_eq!(released, [0, 1, 2]);
//! ```

mod deque;
mod error;
mod identity;
pub mod settings;

pub use deque::CircularDeque;
pub use error::{CreateError, Full, NotFound, TransferError};
pub use identity::Handle;
pub use settings::{BackToFront, ClearOrder, FrontToBack};

#[cfg(test)]
mod property_tests;
