use {
    core::{cell::RefCell, fmt, ops::DerefMut},
    std::sync,
};

/// Exclusive access to the bus: at most one transaction at a time.
pub trait Mutex {
    type Item;
    type Error: fmt::Display;
    fn new(item: Self::Item) -> Self;
    fn lock(&self) -> Result<impl DerefMut<Target = Self::Item>, Self::Error>;
}

impl<T> Mutex for RefCell<T> {
    type Item = T;
    type Error = core::cell::BorrowMutError;

    #[inline(always)]
    fn new(item: T) -> Self {
        RefCell::new(item)
    }

    #[inline(always)]
    fn lock(&self) -> Result<impl DerefMut<Target = T>, Self::Error> {
        self.try_borrow_mut()
    }
}

#[derive(Clone, Copy, Debug, Eq, PartialEq, thiserror::Error)]
#[error("another thread panicked while holding the bus")]
pub struct Poisoned;

impl<T> Mutex for sync::Mutex<T> {
    type Item = T;
    type Error = Poisoned;

    #[inline(always)]
    fn new(item: T) -> Self {
        sync::Mutex::new(item)
    }

    #[inline(always)]
    fn lock(&self) -> Result<impl DerefMut<Target = T>, Self::Error> {
        sync::Mutex::lock(self).map_err(|_| Poisoned)
    }
}
