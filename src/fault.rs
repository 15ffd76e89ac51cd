use alloc::{borrow::Cow, boxed::Box};
use core::{error::Error, fmt};

use crate::{flatten::flatten, info::ErrorInfo, location::Location};

/// A boxed, thread-safe error trait object.
///
/// This is the representation of every cause held inside the chain. Any
/// `Error + Send + Sync + 'static` type, as well as `&str` and `String`,
/// converts into it with [`Into`].
pub type BoxError = Box<dyn Error + Send + Sync + 'static>;

/// A located link in an error chain.
///
/// A `Fault` records the source location where it was created and, for
/// faults created with [`Fault::new`], a message. Faults created by
/// [`wrap`](crate::wrap) or [`Fault::wrap`] carry no message of their own:
/// they exist to record where the error passed through on its way up the
/// call stack.
///
/// Faults are immutable. Once constructed, the location, message and cause
/// never change.
///
/// # Examples
///
/// ```
/// use faultline::{Fault, flatten, msg};
///
/// let root = Fault::new("db error");
/// let err = faultline::wrap(root, [msg::with("failed to get user")]);
///
/// assert_eq!(err.to_string(), "failed to get user: db error");
///
/// let chain = flatten(&err);
/// let messages: Vec<_> = chain.iter().map(|step| step.message()).collect();
/// assert_eq!(messages, ["db error", "failed to get user"]);
/// ```
pub struct Fault {
    cause: Option<BoxError>,
    location: Location,
    message: Option<Cow<'static, str>>,
}

impl Fault {
    /// Creates a new root fault with a message and the caller's location.
    #[must_use]
    #[track_caller]
    pub fn new(message: impl Into<Cow<'static, str>>) -> Self {
        Self {
            cause: None,
            location: Location::caller(),
            message: Some(message.into()),
        }
    }

    /// Wraps `cause` in a bare fault that only records the caller's location.
    ///
    /// This is [`wrap`](crate::wrap) without decorators.
    #[must_use]
    #[track_caller]
    pub fn wrap(cause: impl Into<BoxError>) -> Self {
        Self {
            cause: Some(cause.into()),
            location: Location::caller(),
            message: None,
        }
    }

    /// The location where this fault was created.
    #[must_use]
    pub fn location(&self) -> Location {
        self.location
    }

    /// The message given to [`Fault::new`], or `None` for a bare wrap.
    #[must_use]
    pub fn message(&self) -> Option<&str> {
        self.message.as_deref()
    }

    /// The wrapped error, or `None` for a root fault.
    #[must_use]
    pub fn cause(&self) -> Option<&(dyn Error + Send + Sync + 'static)> {
        self.cause.as_deref()
    }

    /// Builds the serializable summary of this fault.
    ///
    /// Shorthand for [`ErrorInfo::new`].
    #[must_use]
    pub fn info(&self) -> ErrorInfo {
        ErrorInfo::new(self)
    }
}

impl fmt::Display for Fault {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let message = self.message.as_deref().unwrap_or_default();
        f.write_str(message)?;
        if let Some(cause) = &self.cause {
            if !message.is_empty() {
                f.write_str(": ")?;
            }
            fmt::Display::fmt(cause, f)?;
        }
        Ok(())
    }
}

/// Renders the flattened chain: one message per line, each followed by the
/// indented location it was attached at.
impl fmt::Debug for Fault {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        fmt::Display::fmt(&flatten(self), f)
    }
}

impl Error for Fault {
    fn source(&self) -> Option<&(dyn Error + 'static)> {
        self.cause
            .as_deref()
            .map(|cause| cause as &(dyn Error + 'static))
    }
}

impl serde::Serialize for Fault {
    fn serialize<S: serde::Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        self.info().serialize(serializer)
    }
}

/// A function that decorates an error with additional information.
///
/// Decorators are passed to [`wrap`](crate::wrap) and applied in order,
/// each one wrapping the result of the previous one. The built-in
/// decorators live in [`msg`](crate::msg), [`tag`](crate::tag),
/// [`values`](crate::values) and [`context`](crate::context).
///
/// # Examples
///
/// A custom decorator that wraps the error in a third-party type:
///
/// ```
/// use faultline::{BoxError, Decorator, flatten};
///
/// #[derive(Debug)]
/// struct Retryable(BoxError);
///
/// impl std::fmt::Display for Retryable {
///     fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
///         write!(f, "retryable")
///     }
/// }
///
/// impl std::error::Error for Retryable {
///     fn source(&self) -> Option<&(dyn std::error::Error + 'static)> {
///         Some(&*self.0)
///     }
/// }
///
/// let retryable = Decorator::new(|err| Box::new(Retryable(err)));
/// let err = faultline::wrap("timed out", [retryable]);
/// assert_eq!(flatten(&err).len(), 2);
/// ```
pub struct Decorator(Box<dyn FnOnce(BoxError) -> BoxError + Send>);

impl Decorator {
    /// Creates a decorator from a closure.
    pub fn new<F>(decorate: F) -> Self
    where
        F: FnOnce(BoxError) -> BoxError + Send + 'static,
    {
        Self(Box::new(decorate))
    }

    /// Applies the decorator to an error.
    #[must_use]
    pub fn apply(self, err: BoxError) -> BoxError {
        (self.0)(err)
    }
}

impl fmt::Debug for Decorator {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str("Decorator")
    }
}

/// Wraps an error with the given decorators and records the caller's
/// location.
///
/// The decorators are applied in order, each wrapping the previous result,
/// and the outcome is wrapped in a bare [`Fault`] whose location is the line
/// that called `wrap`. Wrapping never fails.
///
/// To wrap only when an operation actually failed, use
/// [`ResultExt::wrap_with`](crate::ResultExt::wrap_with) or
/// [`OptionExt::wrap_with`](crate::OptionExt::wrap_with).
///
/// # Examples
///
/// ```
/// use faultline::{Tag, msg, tag};
///
/// let err = faultline::wrap(
///     std::io::Error::other("connection reset"),
///     [msg::with("failed to load profile"), tag::with(Tag::UNAVAILABLE)],
/// );
///
/// assert_eq!(tag::get(&err), Some(&Tag::UNAVAILABLE));
/// assert_eq!(err.to_string(), "failed to load profile: connection reset");
/// ```
#[must_use]
#[track_caller]
pub fn wrap<E, I>(cause: E, decorators: I) -> Fault
where
    E: Into<BoxError>,
    I: IntoIterator<Item = Decorator>,
{
    let location = Location::caller();
    let cause = decorators
        .into_iter()
        .fold(cause.into(), |err, decorator| decorator.apply(err));

    Fault {
        cause: Some(cause),
        location,
        message: None,
    }
}

#[cfg(test)]
mod tests {
    use alloc::string::{String, ToString};

    use super::*;

    #[test]
    fn test_debug_renders_flattened_chain() {
        let (root, l1) = (Fault::new("db error"), line!());
        let (err, l2) = (wrap(root, [crate::msg::with("failed to get user")]), line!());

        assert_eq!(
            alloc::format!("{err:?}"),
            alloc::format!(
                "db error\n\t{file}:{l1}\nfailed to get user\n\t{file}:{l2}",
                file = file!()
            )
        );
    }

    #[test]
    fn test_fault_send_sync() {
        static_assertions::assert_impl_all!(Fault: Send, Sync, Unpin, Error);
        static_assertions::assert_not_impl_any!(Fault: Clone);
        static_assertions::assert_impl_all!(Decorator: Send);
    }

    #[test]
    fn test_new_is_root() {
        let (fault, line) = (Fault::new("db error"), line!());
        assert_eq!(fault.message(), Some("db error"));
        assert_eq!(fault.location().line(), line);
        assert!(fault.cause().is_none());
        assert!(fault.source().is_none());
        assert_eq!(fault.to_string(), "db error");
    }

    #[test]
    fn test_reads_are_stable() {
        let fault = Fault::new(String::from("stable"));
        let first = (fault.location(), fault.message().map(String::from));
        let second = (fault.location(), fault.message().map(String::from));
        assert_eq!(first, second);
    }

    #[test]
    fn test_bare_wrap_display_is_transparent() {
        let fault = Fault::wrap(Fault::wrap("inner"));
        assert_eq!(fault.message(), None);
        assert_eq!(fault.to_string(), "inner");
    }

    #[test]
    fn test_wrap_applies_decorators_in_order() {
        let outer = Decorator::new(|err| format_error("outer", err));
        let inner = Decorator::new(|err| format_error("inner", err));
        let fault = wrap("root", [inner, outer]);
        assert_eq!(fault.to_string(), "outer(inner(root))");
    }

    #[test]
    fn test_wrap_location_is_call_site() {
        let (fault, line) = (wrap("root", [Decorator::new(|err| err)]), line!());
        assert_eq!(fault.location().file(), file!());
        assert_eq!(fault.location().line(), line);
    }

    fn format_error(name: &str, err: BoxError) -> BoxError {
        alloc::format!("{name}({err})").into()
    }
}
