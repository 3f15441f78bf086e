//! A [`CircularDeque`] is a fixed-capacity double-ended queue backed by a circular buffer.
//! Every instance owns its slot array and one lock; each public operation holds that lock for its
//! whole duration and never waits for space or elements. A full or empty deque is reported to the
//! caller instead.
//!
//! The deque stores *handles* (`Arc`s, references, pointers, ...) and compares them by identity
//! through [`Handle`]. It never applies any release action to a handle except through
//! [`CircularDeque::traverse_and_clear`], where the caller supplies that action.

use crate::error::{CreateError, Full, NotFound, TransferError};
use crate::identity::Handle;
use crate::settings::ClearOrder;
use crate::FrontToBack;
use parking_lot::{Mutex, MutexGuard};
use std::fmt::Debug;
use std::sync::atomic::{AtomicU64, Ordering};
use tracing::{debug, trace};

static NEXT_ID: AtomicU64 = AtomicU64::new(0);

/// A fixed-capacity, thread-safe double-ended queue backed by a circular buffer.
///
/// # Examples
/// ```
/// use ringlock::CircularDeque;
/// let deque = CircularDeque::with_capacity(3).unwrap();
/// deque.push_back(2).unwrap();
/// deque.push_front(1).unwrap();
/// deque.push_back(3).unwrap();
/// assert!(deque.is_full());
/// assert!(deque.push_back(4).is_err());
/// assert_eq!(deque.to_vec(), [1, 2, 3]);
/// ```
///
/// # Clear Order
/// The default clear order is front-to-back: [`clear`](Self::clear) and dropping the deque release
/// the remaining handles in the same order iteration would visit them.
/// Use [`BackToFront`](crate::BackToFront) to release them newest-first instead.
///
/// # Sharing
/// All operations take `&self`, so an instance is shared between threads by wrapping it in an
/// [`Arc`](std::sync::Arc).
pub struct CircularDeque<T, Order = FrontToBack>
where
    Order: ClearOrder,
{
    id: u64,
    capacity: usize,
    ring: Mutex<Ring<T>>,
    clear_order: Order,
}

/// The unlocked ring state. Only ever touched through the owning deque's lock.
struct Ring<T> {
    slots: Box<[Option<T>]>,
    head: usize,
    len: usize,
}

// snapshot of the raw ring, used to check that failed operations leave no trace
#[cfg(test)]
#[derive(Debug, Clone, PartialEq)]
pub(crate) struct RingDebug<T> {
    pub(crate) slots: Vec<Option<T>>,
    pub(crate) head: usize,
    pub(crate) len: usize,
}

impl<T> Ring<T> {
    fn with_capacity(capacity: usize) -> Result<Self, CreateError> {
        if capacity == 0 {
            return Err(CreateError::ZeroCapacity);
        }
        let mut slots = Vec::new();
        slots
            .try_reserve_exact(capacity)
            .map_err(|source| CreateError::Allocation { capacity, source })?;
        slots.resize_with(capacity, || None);
        Ok(Ring {
            slots: slots.into_boxed_slice(),
            head: 0,
            len: 0,
        })
    }

    #[inline]
    fn capacity(&self) -> usize {
        self.slots.len()
    }

    #[inline]
    fn is_full(&self) -> bool {
        self.len == self.capacity()
    }

    /// Physical slot of the element `offset` places behind the front.
    #[inline]
    fn slot(&self, offset: usize) -> usize {
        (self.head + offset) % self.capacity()
    }

    #[inline]
    fn prev(&self, index: usize) -> usize {
        (index + self.capacity() - 1) % self.capacity()
    }

    #[inline]
    fn next(&self, index: usize) -> usize {
        (index + 1) % self.capacity()
    }

    // only meaningful while len > 0
    #[inline]
    fn tail(&self) -> usize {
        self.slot(self.len + self.capacity() - 1)
    }

    fn iter(&self) -> impl Iterator<Item = &T> + '_ {
        (0..self.len).filter_map(move |offset| {
            let elem = self.slots[self.slot(offset)].as_ref();
            debug_assert!(elem.is_some(), "live offset {} holds no element", offset);
            elem
        })
    }

    // callers must have checked that a slot is free
    fn write_back(&mut self, elem: T) {
        let slot = self.slot(self.len);
        self.slots[slot] = Some(elem);
        self.len += 1;
    }

    // callers must have checked that a slot is free
    fn write_front(&mut self, elem: T) {
        self.head = self.prev(self.head);
        self.slots[self.head] = Some(elem);
        self.len += 1;
    }

    fn push_back(&mut self, elem: T) -> Result<(), Full<T>> {
        if self.is_full() {
            return Err(Full(elem));
        }
        self.write_back(elem);
        Ok(())
    }

    fn push_front(&mut self, elem: T) -> Result<(), Full<T>> {
        if self.is_full() {
            return Err(Full(elem));
        }
        self.write_front(elem);
        Ok(())
    }

    fn pop_front(&mut self) -> Option<T> {
        if self.len == 0 {
            return None;
        }
        let elem = self.slots[self.head].take();
        self.head = self.next(self.head);
        self.len -= 1;
        elem
    }

    fn pop_back(&mut self) -> Option<T> {
        if self.len == 0 {
            return None;
        }
        let tail = self.tail();
        let elem = self.slots[tail].take();
        self.len -= 1;
        elem
    }

    fn front(&self) -> Option<&T> {
        if self.len == 0 {
            return None;
        }
        self.slots[self.head].as_ref()
    }

    fn back(&self) -> Option<&T> {
        if self.len == 0 {
            return None;
        }
        self.slots[self.tail()].as_ref()
    }

    fn reset(&mut self) {
        self.head = 0;
        self.len = 0;
    }

    fn clear_with_order(&mut self, drop_from_back: bool) {
        while (if drop_from_back {
            self.pop_back()
        } else {
            self.pop_front()
        })
        .is_some()
        {
            // drop the element
        }
        self.reset();
    }
}

impl<T: Handle> Ring<T> {
    fn position(&self, target: &T) -> Option<usize> {
        self.iter().position(|elem| elem.same_handle(target))
    }

    /// Takes the element at `offset` and closes the gap by shifting every later element one slot
    /// toward the front. The vacated slot ends up at the old tail.
    fn remove_at(&mut self, offset: usize) -> Option<T> {
        let removed = self.slots[self.slot(offset)].take();
        for i in offset..self.len - 1 {
            let (to, from) = (self.slot(i), self.slot(i + 1));
            self.slots.swap(to, from);
        }
        self.len -= 1;
        removed
    }
}

impl<T> CircularDeque<T, FrontToBack> {
    /// Creates an empty deque holding at most `capacity` elements, releasing leftover handles
    /// front-to-back.
    ///
    /// The slot array is allocated up front and never grows.
    ///
    /// # Errors
    /// [`CreateError::ZeroCapacity`] if `capacity` is 0, [`CreateError::Allocation`] if the slot
    /// array cannot be allocated.
    ///
    /// # Examples
    /// ```
    /// use ringlock::{CircularDeque, CreateError};
    /// let deque = CircularDeque::<u32>::with_capacity(8).unwrap();
    /// assert_eq!(deque.capacity(), 8);
    /// assert!(matches!(
    ///     CircularDeque::<u32>::with_capacity(0),
    ///     Err(CreateError::ZeroCapacity)
    /// ));
    /// ```
    pub fn with_capacity(capacity: usize) -> Result<Self, CreateError> {
        Self::with_capacity_and_clear_order::<FrontToBack>(capacity)
    }

    /// Creates an empty deque with a specified capacity and clear order.
    ///
    /// # Examples
    /// ```
    /// # use ringlock::{BackToFront, CircularDeque};
    /// let deque = CircularDeque::<i32>::with_capacity_and_clear_order::<BackToFront>(4).unwrap();
    /// deque.push_back(1).unwrap();
    /// assert_eq!(deque.len(), 1);
    /// ```
    pub fn with_capacity_and_clear_order<O>(
        capacity: usize,
    ) -> Result<CircularDeque<T, O>, CreateError>
    where
        O: ClearOrder,
    {
        let ring = Ring::with_capacity(capacity)?;
        let id = NEXT_ID.fetch_add(1, Ordering::Relaxed);
        debug!(id, capacity, "created circular deque");
        Ok(CircularDeque {
            id,
            capacity,
            ring: Mutex::new(ring),
            clear_order: O::default(),
        })
    }
}

impl<T, Order> CircularDeque<T, Order>
where
    Order: ClearOrder,
{
    #[inline]
    fn lock(&self) -> MutexGuard<'_, Ring<T>> {
        self.ring.lock()
    }

    /// Locks `self` and `other` in ascending id order and returns the guards as `(self, other)`.
    fn lock_pair<'a>(
        &'a self,
        other: &'a Self,
    ) -> (MutexGuard<'a, Ring<T>>, MutexGuard<'a, Ring<T>>) {
        if self.id < other.id {
            let mine = self.lock();
            let theirs = other.lock();
            (mine, theirs)
        } else {
            let theirs = other.lock();
            let mine = self.lock();
            (mine, theirs)
        }
    }

    /// Returns the order in which [`clear`](Self::clear) and the destructor release handles.
    pub fn clear_order(&self) -> Order {
        self.clear_order
    }

    /// Returns the maximum number of elements the deque can hold. Fixed at construction.
    pub fn capacity(&self) -> usize {
        self.capacity
    }

    /// Returns the number of elements in the deque.
    pub fn len(&self) -> usize {
        self.lock().len
    }

    /// Returns true if the deque contains no elements.
    ///
    /// # Examples
    /// ```
    /// # use ringlock::CircularDeque;
    /// let deque = CircularDeque::with_capacity(2).unwrap();
    /// assert!(deque.is_empty());
    ///
    /// deque.push_back(1).unwrap();
    /// assert!(!deque.is_empty());
    /// ```
    pub fn is_empty(&self) -> bool {
        self.lock().len == 0
    }

    /// Returns true if every slot is occupied.
    pub fn is_full(&self) -> bool {
        self.lock().is_full()
    }

    /// Pushes an element to the front of the deque.
    ///
    /// # Errors
    /// Hands `elem` back inside [`Full`] if the deque is full; the deque is left untouched.
    ///
    /// # Examples
    /// ```
    /// # use ringlock::{CircularDeque, Full};
    /// let deque = CircularDeque::with_capacity(2).unwrap();
    /// deque.push_front(1).unwrap();
    /// deque.push_front(2).unwrap();
    /// assert_eq!(deque.push_front(3), Err(Full(3)));
    /// assert_eq!(deque.to_vec(), [2, 1]);
    /// ```
    pub fn push_front(&self, elem: T) -> Result<(), Full<T>> {
        self.lock().push_front(elem)
    }

    /// Pushes an element to the back of the deque.
    ///
    /// # Errors
    /// Hands `elem` back inside [`Full`] if the deque is full; the deque is left untouched.
    pub fn push_back(&self, elem: T) -> Result<(), Full<T>> {
        self.lock().push_back(elem)
    }

    /// Pops an element from the front of the deque, returning `None` if it is empty.
    ///
    /// # Examples
    /// ```
    /// # use ringlock::CircularDeque;
    /// let deque = CircularDeque::with_capacity(2).unwrap();
    /// deque.push_back(42).unwrap();
    /// deque.push_back(10).unwrap();
    /// assert_eq!(deque.pop_front(), Some(42));
    /// assert_eq!(deque.pop_front(), Some(10));
    /// assert_eq!(deque.pop_front(), None);
    /// ```
    pub fn pop_front(&self) -> Option<T> {
        self.lock().pop_front()
    }

    /// Pops an element from the back of the deque, returning `None` if it is empty.
    pub fn pop_back(&self) -> Option<T> {
        self.lock().pop_back()
    }

    /// Pushes an element to the back, evicting the front element first if the deque is full.
    /// Never fails.
    ///
    /// Returns the evicted element, or `None` if there was room.
    ///
    /// # Examples
    /// ```
    /// # use ringlock::CircularDeque;
    /// let deque = CircularDeque::with_capacity(2).unwrap();
    /// assert_eq!(deque.push_back_evict_front(1), None);
    /// assert_eq!(deque.push_back_evict_front(2), None);
    /// assert_eq!(deque.push_back_evict_front(3), Some(1));
    /// assert_eq!(deque.to_vec(), [2, 3]);
    /// ```
    pub fn push_back_evict_front(&self, elem: T) -> Option<T> {
        let mut ring = self.lock();
        let evicted = if ring.is_full() {
            trace!(id = self.id, "evicting front element");
            ring.pop_front()
        } else {
            None
        };
        ring.write_back(elem);
        evicted
    }

    /// Pushes an element to the front, evicting the back element first if the deque is full.
    /// Never fails.
    ///
    /// Returns the evicted element, or `None` if there was room.
    pub fn push_front_evict_back(&self, elem: T) -> Option<T> {
        let mut ring = self.lock();
        let evicted = if ring.is_full() {
            trace!(id = self.id, "evicting back element");
            ring.pop_back()
        } else {
            None
        };
        ring.write_front(elem);
        evicted
    }

    /// Calls `apply` on every element, front to back, without modifying the deque.
    ///
    /// The lock is held for the whole traversal: `apply` must not call back into this deque.
    ///
    /// # Examples
    /// ```
    /// # use ringlock::CircularDeque;
    /// let deque = CircularDeque::with_capacity(4).unwrap();
    /// deque.push_back(1).unwrap();
    /// deque.push_back(2).unwrap();
    /// let mut sum = 0;
    /// deque.traverse(|x| sum += *x);
    /// assert_eq!(sum, 3);
    /// ```
    pub fn traverse<F>(&self, mut apply: F)
    where
        F: FnMut(&T),
    {
        let ring = self.lock();
        for elem in ring.iter() {
            apply(elem);
        }
    }

    /// Removes every element front to back, handing each to `apply`, then resets the deque to
    /// the empty state.
    ///
    /// This is the place to run a release action on the stored handles. The lock is held for the
    /// whole operation: `apply` must not call back into this deque.
    ///
    /// # Examples
    /// ```
    /// # use ringlock::CircularDeque;
    /// let deque = CircularDeque::with_capacity(4).unwrap();
    /// deque.push_back(Box::new(1)).unwrap();
    /// deque.push_back(Box::new(2)).unwrap();
    /// let mut released = Vec::new();
    /// deque.traverse_and_clear(|b| released.push(*b));
    /// assert_eq!(released, [1, 2]);
    /// assert!(deque.is_empty());
    /// ```
    pub fn traverse_and_clear<F>(&self, mut apply: F)
    where
        F: FnMut(T),
    {
        let mut ring = self.lock();
        trace!(id = self.id, len = ring.len, "draining deque");
        while let Some(elem) = ring.pop_front() {
            apply(elem);
        }
        ring.reset();
    }

    /// Drops every element in this deque's clear order and resets it to the empty state.
    pub fn clear(&self) {
        self.lock().clear_with_order(Order::IS_INVERTED);
    }

    /// Moves the front element of `self` to the back of `dest`.
    ///
    /// Both deques are locked for the duration, always in the same global order, so opposing
    /// transfers between the same pair of deques cannot deadlock. Transferring a deque into
    /// itself rotates its front element to the back.
    ///
    /// # Errors
    /// [`TransferError::Empty`] if `self` is empty, [`TransferError::Full`] if `dest` is full.
    /// Neither deque is modified on failure.
    ///
    /// # Examples
    /// ```
    /// # use ringlock::{CircularDeque, TransferError};
    /// let a = CircularDeque::with_capacity(2).unwrap();
    /// let b = CircularDeque::with_capacity(1).unwrap();
    /// a.push_back(1).unwrap();
    /// a.push_back(2).unwrap();
    /// a.transfer_front_to_back(&b).unwrap();
    /// assert_eq!(b.peek_back(), Some(1));
    /// assert_eq!(a.transfer_front_to_back(&b), Err(TransferError::Full));
    /// ```
    pub fn transfer_front_to_back(&self, dest: &Self) -> Result<(), TransferError> {
        if self.id == dest.id {
            let mut ring = self.lock();
            let elem = ring.pop_front().ok_or(TransferError::Empty)?;
            ring.write_back(elem);
            return Ok(());
        }
        let (mut source, mut target) = self.lock_pair(dest);
        check_transfer(&source, &target).map_err(|err| {
            trace!(source = self.id, dest = dest.id, %err, "transfer rejected");
            err
        })?;
        if let Some(elem) = source.pop_front() {
            target.write_back(elem);
        }
        Ok(())
    }

    /// Moves the back element of `self` to the front of `dest`.
    ///
    /// Locking and failure behave as in [`transfer_front_to_back`](Self::transfer_front_to_back).
    pub fn transfer_back_to_front(&self, dest: &Self) -> Result<(), TransferError> {
        if self.id == dest.id {
            let mut ring = self.lock();
            let elem = ring.pop_back().ok_or(TransferError::Empty)?;
            ring.write_front(elem);
            return Ok(());
        }
        let (mut source, mut target) = self.lock_pair(dest);
        check_transfer(&source, &target).map_err(|err| {
            trace!(source = self.id, dest = dest.id, %err, "transfer rejected");
            err
        })?;
        if let Some(elem) = source.pop_back() {
            target.write_front(elem);
        }
        Ok(())
    }

    #[cfg(test)]
    pub(crate) fn debug(&self) -> RingDebug<T>
    where
        T: Clone,
    {
        let ring = self.lock();
        RingDebug {
            slots: ring.slots.to_vec(),
            head: ring.head,
            len: ring.len,
        }
    }
}

fn check_transfer<T>(source: &Ring<T>, target: &Ring<T>) -> Result<(), TransferError> {
    if source.len == 0 {
        Err(TransferError::Empty)
    } else if target.is_full() {
        Err(TransferError::Full)
    } else {
        Ok(())
    }
}

impl<T: Clone, Order> CircularDeque<T, Order>
where
    Order: ClearOrder,
{
    /// Returns a copy of the front handle without removing it.
    pub fn peek_front(&self) -> Option<T> {
        self.lock().front().cloned()
    }

    /// Returns a copy of the back handle without removing it.
    ///
    /// # Examples
    /// ```
    /// # use ringlock::CircularDeque;
    /// let deque = CircularDeque::with_capacity(3).unwrap();
    /// assert_eq!(deque.peek_back(), None);
    /// deque.push_back('a').unwrap();
    /// deque.push_back('b').unwrap();
    /// assert_eq!(deque.peek_back(), Some('b'));
    /// assert_eq!(deque.peek_front(), Some('a'));
    /// ```
    pub fn peek_back(&self) -> Option<T> {
        self.lock().back().cloned()
    }

    /// Copies the elements out, front to back, as one consistent snapshot.
    pub fn to_vec(&self) -> Vec<T> {
        self.lock().iter().cloned().collect()
    }
}

impl<T: Handle, Order> CircularDeque<T, Order>
where
    Order: ClearOrder,
{
    /// Returns the distance from the front of the first element that is the same handle as
    /// `target`, or `None` if it is not stored.
    ///
    /// # Examples
    /// ```
    /// # use ringlock::CircularDeque;
    /// use std::sync::Arc;
    /// let deque = CircularDeque::with_capacity(3).unwrap();
    /// let (a, b) = (Arc::new(1), Arc::new(1));
    /// deque.push_back(a.clone()).unwrap();
    /// deque.push_back(b.clone()).unwrap();
    /// assert_eq!(deque.search(&b), Some(1));
    /// assert_eq!(deque.search(&Arc::new(1)), None);
    /// ```
    pub fn search(&self, target: &T) -> Option<usize> {
        self.lock().position(target)
    }

    /// Returns true if `target` is stored in the deque.
    pub fn contains(&self, target: &T) -> bool {
        self.lock().position(target).is_some()
    }

    /// Removes the first element (front to back) that is the same handle as `target`, shifting
    /// every later element one place toward the front. The relative order of the remaining
    /// elements is unchanged.
    ///
    /// # Errors
    /// [`NotFound`] if `target` is not stored.
    pub fn remove(&self, target: &T) -> Result<T, NotFound> {
        let mut ring = self.lock();
        let offset = ring.position(target).ok_or(NotFound)?;
        ring.remove_at(offset).ok_or(NotFound)
    }
}

impl<T: Debug, Order> Debug for CircularDeque<T, Order>
where
    Order: ClearOrder,
{
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        let ring = self.lock();
        f.debug_list().entries(ring.iter()).finish()
    }
}

impl<T, Order> Drop for CircularDeque<T, Order>
where
    Order: ClearOrder,
{
    fn drop(&mut self) {
        self.ring.get_mut().clear_with_order(Order::IS_INVERTED);
    }
}
