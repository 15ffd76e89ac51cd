//! Categorical tags for errors.
//!
//! A tag classifies an error so that code far away from where it happened can
//! decide how to respond, for example which HTTP status to return. Tags are
//! attached with [`with`] and read back with [`get`], which returns the most
//! recently attached tag.
//!
//! The predefined tags mirror the gRPC status codes. Any other string can be
//! used with [`Tag::new`].
//!
//! ```
//! use faultline::{Tag, tag};
//!
//! let err = faultline::wrap("no such row", [tag::with(Tag::NOT_FOUND)]);
//! let err = faultline::wrap(err, [tag::with(Tag::INTERNAL)]);
//!
//! assert_eq!(tag::get(&err), Some(&Tag::INTERNAL));
//! assert_eq!(tag::get(&err).map(Tag::http_status), Some(500));
//! ```

use alloc::{borrow::Cow, boxed::Box, vec::Vec};
use core::{error::Error, fmt};

use crate::{
    fault::Decorator,
    node::{Annotated, Annotation, Node, links},
};

/// A categorical tag.
#[derive(Clone, Debug, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub struct Tag(Cow<'static, str>);

impl Tag {
    /// The operation was cancelled, typically by the caller.
    pub const CANCELLED: Self = Self::from_static("cancelled");
    /// An unknown error.
    pub const UNKNOWN: Self = Self::from_static("unknown");
    /// The client specified an invalid argument.
    pub const INVALID_ARGUMENT: Self = Self::from_static("invalid_argument");
    /// The deadline expired before the operation could complete.
    pub const DEADLINE_EXCEEDED: Self = Self::from_static("deadline_exceeded");
    /// A requested entity was not found.
    pub const NOT_FOUND: Self = Self::from_static("not_found");
    /// The entity that a client attempted to create already exists.
    pub const ALREADY_EXISTS: Self = Self::from_static("already_exists");
    /// The caller does not have permission to execute the operation.
    pub const PERMISSION_DENIED: Self = Self::from_static("permission_denied");
    /// Some resource has been exhausted, such as a per-user quota.
    pub const RESOURCE_EXHAUSTED: Self = Self::from_static("resource_exhausted");
    /// The system is not in a state required for the operation.
    pub const FAILED_PRECONDITION: Self = Self::from_static("failed_precondition");
    /// The operation was aborted, typically due to a concurrency issue.
    pub const ABORTED: Self = Self::from_static("aborted");
    /// The operation was attempted past the valid range.
    pub const OUT_OF_RANGE: Self = Self::from_static("out_of_range");
    /// The operation is not implemented or supported.
    pub const UNIMPLEMENTED: Self = Self::from_static("unimplemented");
    /// An internal invariant was broken.
    pub const INTERNAL: Self = Self::from_static("internal");
    /// The service is currently unavailable.
    pub const UNAVAILABLE: Self = Self::from_static("unavailable");
    /// Unrecoverable data loss or corruption.
    pub const DATA_LOSS: Self = Self::from_static("data_loss");
    /// The request does not have valid authentication credentials.
    pub const UNAUTHENTICATED: Self = Self::from_static("unauthenticated");

    /// Creates a custom tag.
    pub fn new(tag: impl Into<Cow<'static, str>>) -> Self {
        Self(tag.into())
    }

    const fn from_static(tag: &'static str) -> Self {
        Self(Cow::Borrowed(tag))
    }

    /// The tag as a string.
    #[must_use]
    pub fn as_str(&self) -> &str {
        &self.0
    }

    /// The HTTP status code conventionally used for errors with this tag.
    ///
    /// Custom tags map to `500`.
    #[must_use]
    pub fn http_status(&self) -> u16 {
        match self.as_str() {
            "cancelled" => 499,
            "invalid_argument" | "failed_precondition" | "out_of_range" => 400,
            "deadline_exceeded" => 504,
            "not_found" => 404,
            "already_exists" | "aborted" => 409,
            "permission_denied" => 403,
            "resource_exhausted" => 429,
            "unimplemented" => 501,
            "unavailable" => 503,
            "unauthenticated" => 401,
            _ => 500,
        }
    }
}

impl fmt::Display for Tag {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

impl AsRef<str> for Tag {
    fn as_ref(&self) -> &str {
        &self.0
    }
}

impl serde::Serialize for Tag {
    fn serialize<S: serde::Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        serializer.serialize_str(&self.0)
    }
}

/// A decorator that tags the error.
///
/// An empty tag leaves the error unchanged.
#[must_use]
pub fn with(tag: Tag) -> Decorator {
    Decorator::new(move |err| {
        if tag.as_str().is_empty() {
            err
        } else {
            Box::new(Annotated::new(err, Annotation::Tag(tag)))
        }
    })
}

/// The most recently attached tag, or `None` if the error was never tagged.
///
/// Callers decide the fallback for untagged errors.
#[must_use]
pub fn get<'a>(err: &'a (dyn Error + 'static)) -> Option<&'a Tag> {
    all(err).into_iter().next()
}

/// Every tag attached to the error, most recent first.
#[must_use]
pub fn all<'a>(err: &'a (dyn Error + 'static)) -> Vec<&'a Tag> {
    links(err)
        .filter_map(|link| match Node::classify(link) {
            Node::Annotated(annotated) => match annotated.annotation() {
                Annotation::Tag(tag) => Some(tag),
                _ => None,
            },
            _ => None,
        })
        .collect()
}

#[cfg(test)]
mod tests {
    use alloc::string::ToString;

    use super::*;
    use crate::{Fault, wrap};

    fn outermost<'a>(err: &'a Fault) -> Option<&'a Tag> {
        get(err)
    }

    #[test]
    fn test_tags_borrow_from_the_error() {
        let err = wrap(Fault::new("root"), [with(Tag::ABORTED)]);
        let tags: Vec<&Tag> = all(&err);
        assert_eq!(outermost(&err), tags.first().copied());
        assert_eq!(tags, [&Tag::ABORTED]);
    }

    #[test]
    fn test_most_recent_tag_wins() {
        let err = wrap(Fault::new("root"), [with(Tag::INTERNAL)]);
        let err = wrap(err, [with(Tag::INTERNAL)]);
        let err = wrap(err, [with(Tag::INVALID_ARGUMENT)]);
        let err = wrap(err, [with(Tag::NOT_FOUND)]);

        assert_eq!(get(&err), Some(&Tag::NOT_FOUND));
        assert_eq!(
            all(&err),
            [
                &Tag::NOT_FOUND,
                &Tag::INVALID_ARGUMENT,
                &Tag::INTERNAL,
                &Tag::INTERNAL
            ]
        );
    }

    #[test]
    fn test_untagged_is_none() {
        let err = wrap(Fault::new("root"), []);
        assert_eq!(get(&err), None);
    }

    #[test]
    fn test_empty_tag_is_noop() {
        let err = wrap(Fault::new("root"), [with(Tag::new(""))]);
        assert_eq!(get(&err), None);
        assert_eq!(crate::links(&err).count(), 2);
    }

    #[test]
    fn test_custom_tag() {
        let tag = Tag::new("rate_limited");
        assert_eq!(tag.to_string(), "rate_limited");
        assert_eq!(tag.http_status(), 500);
        assert_eq!(Tag::new("not_found"), Tag::NOT_FOUND);
    }

    #[test]
    fn test_http_status() {
        assert_eq!(Tag::NOT_FOUND.http_status(), 404);
        assert_eq!(Tag::UNAUTHENTICATED.http_status(), 401);
        assert_eq!(Tag::INTERNAL.http_status(), 500);
        assert_eq!(Tag::UNKNOWN.http_status(), 500);
        assert_eq!(Tag::DATA_LOSS.http_status(), 500);
    }

    #[test]
    fn test_tag_serializes_as_string() {
        assert_eq!(
            serde_json::to_value(Tag::NOT_FOUND).unwrap(),
            serde_json::json!("not_found")
        );
    }
}
