use crate::fault::{BoxError, Decorator, Fault, wrap};

mod sealed {
    pub trait Sealed {}
    impl<V, E> Sealed for Result<V, E> {}
}

/// Extension trait for wrapping the error of a `Result`.
///
/// `Ok` values pass through untouched, so these methods can be used
/// unconditionally after a fallible call. The location recorded for an `Err`
/// is the line that called the method.
///
/// # Examples
///
/// ```
/// use faultline::{ResultExt, Tag, msg, tag};
///
/// fn parse_port(raw: &str) -> Result<u16, faultline::Fault> {
///     raw.parse::<u16>()
///         .wrap_with([msg::with("invalid port"), tag::with(Tag::INVALID_ARGUMENT)])
/// }
///
/// assert_eq!(parse_port("8080").unwrap(), 8080);
///
/// let err = parse_port("eighty").unwrap_err();
/// assert_eq!(tag::get(&err), Some(&Tag::INVALID_ARGUMENT));
/// ```
pub trait ResultExt<V, E>: sealed::Sealed {
    /// Wraps the error in a bare [`Fault`] recording the caller's location.
    #[track_caller]
    fn wrap(self) -> Result<V, Fault>
    where
        E: Into<BoxError>;

    /// Wraps the error with the given decorators, see
    /// [`wrap`](crate::wrap).
    #[track_caller]
    fn wrap_with<I>(self, decorators: I) -> Result<V, Fault>
    where
        E: Into<BoxError>,
        I: IntoIterator<Item = Decorator>;

    /// Like [`wrap_with`](ResultExt::wrap_with), but only builds the
    /// decorators if the result is an `Err`.
    #[track_caller]
    fn wrap_lazy<I, F>(self, decorators: F) -> Result<V, Fault>
    where
        E: Into<BoxError>,
        I: IntoIterator<Item = Decorator>,
        F: FnOnce(&E) -> I;
}

impl<V, E> ResultExt<V, E> for Result<V, E> {
    #[inline(always)]
    fn wrap(self) -> Result<V, Fault>
    where
        E: Into<BoxError>,
    {
        match self {
            Ok(v) => Ok(v),
            Err(e) => Err(Fault::wrap(e)),
        }
    }

    #[inline(always)]
    fn wrap_with<I>(self, decorators: I) -> Result<V, Fault>
    where
        E: Into<BoxError>,
        I: IntoIterator<Item = Decorator>,
    {
        match self {
            Ok(v) => Ok(v),
            Err(e) => Err(wrap(e, decorators)),
        }
    }

    #[inline(always)]
    fn wrap_lazy<I, F>(self, decorators: F) -> Result<V, Fault>
    where
        E: Into<BoxError>,
        I: IntoIterator<Item = Decorator>,
        F: FnOnce(&E) -> I,
    {
        match self {
            Ok(v) => Ok(v),
            Err(e) => {
                let decorators = decorators(&e);
                Err(wrap(e, decorators))
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use alloc::{format, string::ToString};

    use super::*;
    use crate::{msg, values};

    #[test]
    fn test_ok_passes_through() {
        let result: Result<u8, &str> = Ok(1);
        assert_eq!(result.wrap().unwrap(), 1);
        let result: Result<u8, &str> = Ok(2);
        assert_eq!(result.wrap_with([msg::with("unused")]).unwrap(), 2);
    }

    #[test]
    fn test_err_location_is_call_site() {
        let result: Result<(), &str> = Err("failed");
        let (err, line) = (result.wrap().unwrap_err(), line!());
        assert_eq!(err.location().line(), line);
        assert_eq!(err.location().file(), file!());
        assert_eq!(err.to_string(), "failed");
    }

    #[test]
    fn test_wrap_lazy_sees_error() {
        let result: Result<(), &str> = Err("boom");
        let err = result
            .wrap_lazy(|e| [values::pairs(&["cause", *e]), msg::with(format!("while {e}"))])
            .unwrap_err();
        assert_eq!(err.to_string(), "while boom: boom");
        assert_eq!(values::get(&err)["cause"], serde_json::json!("boom"));
    }

    #[test]
    fn test_wrap_lazy_not_called_on_ok() {
        let result: Result<u8, &str> = Ok(3);
        let value = result
            .wrap_lazy(|_| -> [Decorator; 0] { panic!("decorators built for Ok") })
            .unwrap();
        assert_eq!(value, 3);
    }
}
