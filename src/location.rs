//! Source code locations captured when errors are created or wrapped.
//!
//! Every [`Fault`] records the place in the application where it was
//! constructed. The location is captured with
//! [`core::panic::Location::caller()`], so every function between the
//! application and the capture point is `#[track_caller]` and the recorded
//! line is always the line that called into this crate.
//!
//! Locations render as `file:line`:
//!
//! ```
//! use faultline::Location;
//!
//! let location = Location::caller();
//! assert_eq!(location.to_string(), format!("{}:{}", file!(), line!() - 1));
//! ```
//!
//! [`Fault`]: crate::Fault

use core::fmt;

/// Source code location information.
///
/// A thin copyable handle to a `'static` [`core::panic::Location`]. Two
/// locations compare equal when they point at the same file, line and column.
#[derive(Copy, Clone, PartialEq, Eq, Hash)]
pub struct Location(&'static core::panic::Location<'static>);

impl Location {
    /// Captures the location of the caller.
    ///
    /// Because this function is `#[track_caller]`, calling it from another
    /// `#[track_caller]` function reports that function's caller instead.
    #[must_use]
    #[track_caller]
    #[inline]
    pub fn caller() -> Self {
        Self(core::panic::Location::caller())
    }

    /// The source file path.
    #[must_use]
    pub fn file(&self) -> &'static str {
        self.0.file()
    }

    /// The line number.
    #[must_use]
    pub fn line(&self) -> u32 {
        self.0.line()
    }

    /// The column number.
    #[must_use]
    pub fn column(&self) -> u32 {
        self.0.column()
    }
}

impl From<&'static core::panic::Location<'static>> for Location {
    fn from(location: &'static core::panic::Location<'static>) -> Self {
        Self(location)
    }
}

impl fmt::Display for Location {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}:{}", self.0.file(), self.0.line())
    }
}

impl fmt::Debug for Location {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        fmt::Display::fmt(self, f)
    }
}

impl serde::Serialize for Location {
    fn serialize<S: serde::Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        serializer.collect_str(self)
    }
}
