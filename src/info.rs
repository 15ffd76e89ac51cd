//! A serializable summary of an error.

use alloc::{string::String, string::ToString, vec::Vec};
use core::error::Error;

use crate::{
    flatten::{Step, flatten, owned_steps},
    values::{self, Values},
};

/// Everything a logger or API response needs to know about an error.
///
/// Serializes as
/// `{"message": ..., "values": {...}, "trace": [{"message": ..., "location": ...}]}`,
/// where `values` and `trace` are omitted when empty.
///
/// # Examples
///
/// ```
/// use faultline::{ErrorInfo, Fault, msg, values};
/// use serde_json::json;
///
/// let err = faultline::wrap(
///     Fault::new("db error"),
///     [msg::with("failed to get user"), values::pairs(&["user_id", "42"])],
/// );
///
/// let info = ErrorInfo::new(&err);
/// let json = serde_json::to_value(&info).unwrap();
///
/// assert_eq!(json["message"], json!("failed to get user: db error"));
/// assert_eq!(json["values"], json!({ "user_id": "42" }));
/// assert_eq!(json["trace"][0]["message"], json!("db error"));
/// assert_eq!(json["trace"][1]["message"], json!("failed to get user"));
/// ```
#[derive(Clone, Debug, PartialEq, serde::Serialize)]
pub struct ErrorInfo {
    /// The full `Display` rendering of the error.
    pub message: String,
    /// All key/value and context metadata, see [`values::get`].
    #[serde(skip_serializing_if = "Values::is_empty")]
    pub values: Values,
    /// The flattened chain, root cause first.
    #[serde(skip_serializing_if = "Vec::is_empty")]
    pub trace: Vec<Step<'static>>,
}

impl ErrorInfo {
    /// Collects the summary of an error.
    #[must_use]
    pub fn new(err: &(dyn Error + 'static)) -> Self {
        Self {
            message: err.to_string(),
            values: values::get(err),
            trace: owned_steps(flatten(err)),
        }
    }
}

impl<E: Error + 'static> From<&E> for ErrorInfo {
    fn from(err: &E) -> Self {
        Self::new(err)
    }
}

#[cfg(test)]
mod tests {
    use serde_json::json;

    use super::*;
    use crate::{Fault, wrap};

    #[derive(Debug)]
    struct Plain;

    impl core::fmt::Display for Plain {
        fn fmt(&self, f: &mut core::fmt::Formatter<'_>) -> core::fmt::Result {
            f.write_str("plain")
        }
    }

    impl Error for Plain {}

    #[test]
    fn test_empty_fields_are_omitted() {
        let info = ErrorInfo::new(&Plain);
        assert_eq!(
            serde_json::to_value(&info).unwrap(),
            json!({ "message": "plain", "trace": [{ "message": "plain", "location": "" }] })
        );
    }

    #[test]
    fn test_fault_serializes_as_info() {
        let (err, line) = (wrap(Plain, [crate::values::pairs(&["k", "v"])]), line!());
        let json = serde_json::to_value(&err).unwrap();
        assert_eq!(json, serde_json::to_value(ErrorInfo::from(&err)).unwrap());
        assert_eq!(
            json["trace"][0]["location"],
            json!(alloc::format!("{}:{line}", file!()))
        );
        assert_eq!(json["values"]["k"], json!("v"));
    }

    #[test]
    fn test_info_outlives_error() {
        let info = {
            let err = wrap(Fault::new("gone"), []);
            err.info()
        };
        assert_eq!(info.message, "gone");
        assert_eq!(info.trace[0].message(), "gone");
    }
}
