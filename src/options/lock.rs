#[cfg(feature = "std")]
use std::sync as impl_;

#[cfg(not(feature = "std"))]
use spin as impl_;

/// A global slot holding a value that can be installed once and replaced
/// later.
///
/// Uses `std::sync::RwLock` when the `std` feature is enabled and
/// `spin::RwLock` otherwise.
#[repr(transparent)]
pub(crate) struct OptionsLock<T: 'static + Copy + Send + Sync>(impl_::RwLock<Option<T>>);

impl<T: 'static + Copy + Send + Sync> OptionsLock<T> {
    #[must_use]
    pub(crate) const fn new() -> Self {
        Self(impl_::RwLock::new(None))
    }

    #[inline]
    pub(crate) fn get(&'static self) -> Option<T> {
        #[cfg(not(feature = "std"))]
        let guard = self.0.read();

        // The slot only ever holds a `Copy` value, so a poisoned lock still
        // contains a complete one.
        #[cfg(feature = "std")]
        let guard = self.0.read().unwrap_or_else(impl_::PoisonError::into_inner);

        *guard
    }

    /// Stores `value` if the slot is empty, otherwise hands it back.
    #[inline]
    pub(crate) fn install(&'static self, value: T) -> Result<(), T> {
        let mut guard = self.write();
        match *guard {
            Some(_) => Err(value),
            None => {
                *guard = Some(value);
                Ok(())
            }
        }
    }

    #[inline]
    pub(crate) fn replace(&'static self, value: T) -> Option<T> {
        self.write().replace(value)
    }

    #[inline]
    fn write(&'static self) -> impl_::RwLockWriteGuard<'static, Option<T>> {
        #[cfg(not(feature = "std"))]
        let guard = self.0.write();

        #[cfg(feature = "std")]
        let guard = self.0.write().unwrap_or_else(impl_::PoisonError::into_inner);

        guard
    }
}
