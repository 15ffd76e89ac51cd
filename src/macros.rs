/// Creates a new root [`Fault`](crate::Fault) with a formatted message.
///
/// When invoked with a string literal, the arguments are interpreted the same
/// way as by [`format!()`]. A literal without arguments is stored without
/// allocating. Any other single expression is passed to
/// [`Fault::new`](crate::Fault::new) as is.
///
/// The location of the fault is the line of the macro invocation.
///
/// [`format!()`]: std::format
///
/// # Examples
///
/// ```
/// use faultline::fault;
///
/// let err = fault!("connection refused");
/// assert_eq!(err.message(), Some("connection refused"));
///
/// let port = 5432;
/// let err = fault!("connection to port {port} refused");
/// assert_eq!(err.to_string(), "connection to port 5432 refused");
///
/// let err = fault!("{} retries left", 0);
/// assert_eq!(err.to_string(), "0 retries left");
///
/// let reason = String::from("shutting down");
/// let err = fault!(reason);
/// assert_eq!(err.to_string(), "shutting down");
/// ```
#[macro_export]
macro_rules! fault {
    ($msg:literal $(,)?) => {
        $crate::Fault::new($crate::__private::format_message($crate::__private::format_args!($msg)))
    };
    ($message:expr $(,)?) => {
        $crate::Fault::new($message)
    };
    ($fmt:expr, $($arg:tt)*) => {
        $crate::Fault::new($crate::__private::format!($fmt, $($arg)*))
    };
}

/// Return early with a new root [`Fault`](crate::Fault).
///
/// Takes the same arguments as [`fault!`] and is equivalent to writing
/// `return Err(fault!(...).into());`.
///
/// # Examples
///
/// ```
/// use faultline::{Fault, bail};
///
/// fn check_balance(balance: i64) -> Result<(), Fault> {
///     if balance < 0 {
///         bail!("balance must be non-negative, got {balance}");
///     }
///     Ok(())
/// }
///
/// assert!(check_balance(10).is_ok());
/// assert_eq!(
///     check_balance(-1).unwrap_err().to_string(),
///     "balance must be non-negative, got -1"
/// );
/// ```
#[macro_export]
macro_rules! bail {
    ($($args:tt)*) => {
        return $crate::__private::Err($crate::fault!($($args)*).into())
    };
}
