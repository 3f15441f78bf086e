//! Identity comparison for the handles a [`CircularDeque`](crate::CircularDeque) stores.
//!
//! The deque never looks inside an element: [`search`](crate::CircularDeque::search) and
//! [`remove`](crate::CircularDeque::remove) ask whether two handles refer to the *same*
//! object, not whether the objects hold equal values.

use std::ptr::NonNull;
use std::rc::Rc;
use std::sync::Arc;

/// A handle whose equality is defined by what it points at.
///
/// # Examples
/// ```
/// use ringlock::Handle;
/// use std::sync::Arc;
///
/// let a = Arc::new(7);
/// let b = Arc::new(7);
/// assert!(a.same_handle(&a.clone()));
/// assert!(!a.same_handle(&b));
/// ```
pub trait Handle {
    /// Returns `true` if `self` and `other` refer to the same object.
    fn same_handle(&self, other: &Self) -> bool;
}

impl<T: ?Sized> Handle for Arc<T> {
    #[inline]
    fn same_handle(&self, other: &Self) -> bool {
        Arc::ptr_eq(self, other)
    }
}

impl<T: ?Sized> Handle for Rc<T> {
    #[inline]
    fn same_handle(&self, other: &Self) -> bool {
        Rc::ptr_eq(self, other)
    }
}

impl<T: ?Sized> Handle for &T {
    #[inline]
    fn same_handle(&self, other: &Self) -> bool {
        std::ptr::eq(*self, *other)
    }
}

impl<T: ?Sized> Handle for NonNull<T> {
    #[inline]
    fn same_handle(&self, other: &Self) -> bool {
        std::ptr::eq(self.as_ptr(), other.as_ptr())
    }
}

impl<T: ?Sized> Handle for *const T {
    #[inline]
    fn same_handle(&self, other: &Self) -> bool {
        std::ptr::eq(*self, *other)
    }
}

impl<T: ?Sized> Handle for *mut T {
    #[inline]
    fn same_handle(&self, other: &Self) -> bool {
        std::ptr::eq(*self, *other)
    }
}
