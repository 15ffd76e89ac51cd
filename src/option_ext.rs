//! Extension trait for `Option` types.
//!
//! [`OptionExt`] covers two uses of `Option`:
//!
//! - A nullable error, `Option<E>`, where `None` means "no error". Wrapping it
//!   with [`wrap`](OptionExt::wrap) or [`wrap_with`](OptionExt::wrap_with)
//!   keeps `None` as `None`, so it can be done unconditionally.
//! - A missing value, `Option<V>`, which
//!   [`ok_or_fault`](OptionExt::ok_or_fault) turns into a [`Fault`] wrapping a
//!   [`NoneError`].
//!
//! ```
//! use faultline::{OptionExt, msg};
//!
//! fn validate(name: &str) -> Option<&'static str> {
//!     name.is_empty().then_some("name is empty")
//! }
//!
//! assert!(validate("ada").wrap_with([msg::with("invalid user")]).is_none());
//!
//! let err = validate("").wrap_with([msg::with("invalid user")]).unwrap();
//! assert_eq!(err.to_string(), "invalid user: name is empty");
//! ```

use core::fmt;

use crate::fault::{BoxError, Decorator, Fault, wrap};

/// Error type representing a missing `Option` value.
///
/// Created by [`OptionExt::ok_or_fault`]. Captures the type name of the
/// expected value.
///
/// # Examples
///
/// ```
/// use faultline::option_ext::NoneError;
///
/// let error = NoneError::new::<String>();
/// assert!(format!("{error}").contains("String"));
/// ```
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct NoneError {
    type_name: &'static str,
}

impl NoneError {
    /// Creates a new `NoneError` for the given type.
    #[must_use]
    pub fn new<T: ?Sized>() -> Self {
        Self {
            type_name: core::any::type_name::<T>(),
        }
    }
}

impl fmt::Display for NoneError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "expected value of type {}, but found None",
            self.type_name
        )
    }
}

impl core::error::Error for NoneError {}

/// Extension trait for `Option`.
///
/// See the [module documentation](self) for an overview.
pub trait OptionExt<T> {
    /// Wraps a present error in a bare [`Fault`]. `None` stays `None`.
    #[track_caller]
    fn wrap(self) -> Option<Fault>
    where
        T: Into<BoxError>;

    /// Wraps a present error with the given decorators, see
    /// [`wrap`](crate::wrap). `None` stays `None`.
    #[track_caller]
    fn wrap_with<I>(self, decorators: I) -> Option<Fault>
    where
        T: Into<BoxError>,
        I: IntoIterator<Item = Decorator>;

    /// Converts `None` into a [`Fault`] wrapping a [`NoneError`], with the
    /// given decorators applied.
    ///
    /// # Examples
    ///
    /// ```
    /// use faultline::{OptionExt, Tag, tag};
    ///
    /// let port: Option<u16> = None;
    /// let err = port.ok_or_fault([tag::with(Tag::FAILED_PRECONDITION)]).unwrap_err();
    /// assert!(err.to_string().contains("u16"));
    /// assert_eq!(tag::get(&err), Some(&Tag::FAILED_PRECONDITION));
    /// ```
    #[track_caller]
    fn ok_or_fault<I>(self, decorators: I) -> Result<T, Fault>
    where
        I: IntoIterator<Item = Decorator>;
}

impl<T> OptionExt<T> for Option<T> {
    #[inline(always)]
    fn wrap(self) -> Option<Fault>
    where
        T: Into<BoxError>,
    {
        match self {
            Some(e) => Some(Fault::wrap(e)),
            None => None,
        }
    }

    #[inline(always)]
    fn wrap_with<I>(self, decorators: I) -> Option<Fault>
    where
        T: Into<BoxError>,
        I: IntoIterator<Item = Decorator>,
    {
        match self {
            Some(e) => Some(wrap(e, decorators)),
            None => None,
        }
    }

    #[inline(always)]
    fn ok_or_fault<I>(self, decorators: I) -> Result<T, Fault>
    where
        I: IntoIterator<Item = Decorator>,
    {
        match self {
            Some(v) => Ok(v),
            None => Err(wrap(NoneError::new::<T>(), decorators)),
        }
    }
}
