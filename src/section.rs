
use std::sync::{Mutex, MutexGuard, PoisonError, RwLock, RwLockReadGuard};

/// A region entered around the resampling hot loop.
///
/// Callers that share state with other threads can pass a lock here so it is
/// held only while samples are being accumulated, not while coefficients
/// are planned or buffers allocated. The section is always left when the
/// guard drops, including on unwind.
pub trait Section {
    type Guard<'a>
    where
        Self: 'a;

    fn enter(&self) -> Self::Guard<'_>;
}

/// A section that does nothing.
#[derive(Debug, Clone, Copy, Default)]
pub struct Unsynchronized;

impl Section for Unsynchronized {
    type Guard<'a> = ();

    #[inline]
    fn enter(&self) -> Self::Guard<'_> {}
}

/// Holds a shared read lock.
impl<T> Section for RwLock<T> {
    type Guard<'a>
        = RwLockReadGuard<'a, T>
    where
        Self: 'a;

    fn enter(&self) -> Self::Guard<'_> {
        self.read().unwrap_or_else(PoisonError::into_inner)
    }
}

/// Holds the lock exclusively.
impl<T> Section for Mutex<T> {
    type Guard<'a>
        = MutexGuard<'a, T>
    where
        Self: 'a;

    fn enter(&self) -> Self::Guard<'_> {
        self.lock().unwrap_or_else(PoisonError::into_inner)
    }
}
