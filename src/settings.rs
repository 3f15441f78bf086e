use std::fmt::Debug;

/// Remaining handles are dropped starting at the front.
#[derive(Copy, Clone, Debug, Default)]
pub struct FrontToBack;

/// Remaining handles are dropped starting at the back.
#[derive(Copy, Clone, Debug, Default)]
pub struct BackToFront;

/// Order in which [`CircularDeque::clear`](crate::CircularDeque::clear) and the
/// deque's destructor release the handles still stored in it.
pub trait ClearOrder: seal_clear_order::Sealed + Debug + Copy + Default + Send + Sync {}

pub(crate) mod seal_clear_order {
    pub trait Sealed {
        const IS_INVERTED: bool;
    }
}

impl ClearOrder for FrontToBack {}
impl ClearOrder for BackToFront {}

impl seal_clear_order::Sealed for FrontToBack {
    const IS_INVERTED: bool = false;
}
impl seal_clear_order::Sealed for BackToFront {
    const IS_INVERTED: bool = true;
}
