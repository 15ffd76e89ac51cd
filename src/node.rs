//! The links of an error chain and how they are classified.
//!
//! An error chain is the linked list formed by [`Error::source`], starting at
//! the most recently wrapped error and ending at the root cause. Every link is
//! one of three kinds of [`Node`]:
//!
//! - a [`Fault`], created by [`Fault::new`] or [`wrap`](crate::wrap), which
//!   carries a source location and optionally a message;
//! - an [`Annotated`] error, created by one of the built-in decorators, which
//!   carries a message, a tag or key/value metadata;
//! - any other error, which is opaque and only contributes its `Display`
//!   text.
//!
//! ```
//! use faultline::{Fault, Node, links, msg};
//!
//! let err = faultline::wrap(Fault::new("db error"), [msg::with("failed to get user")]);
//!
//! let kinds: Vec<&str> = links(&err)
//!     .map(|link| match Node::classify(link) {
//!         Node::Located(_) => "located",
//!         Node::Annotated(_) => "annotated",
//!         Node::Opaque(_) => "opaque",
//!     })
//!     .collect();
//! assert_eq!(kinds, ["located", "annotated", "located"]);
//! ```

use alloc::{borrow::Cow, string::ToString, vec::Vec};
use core::{error::Error, fmt, iter::FusedIterator};

use crate::{
    context::Context,
    fault::{BoxError, Fault},
    location::Location,
    tag::Tag,
    values::Values,
};

/// A classified link of an error chain.
///
/// Exposes the capabilities every link shares: a cause, an optional location
/// and an optional message.
#[derive(Copy, Clone, Debug)]
pub enum Node<'a> {
    /// A fault created by this crate.
    Located(&'a Fault),
    /// An error created by one of the built-in decorators.
    Annotated(&'a Annotated),
    /// Any other error.
    Opaque(&'a (dyn Error + 'static)),
}

impl<'a> Node<'a> {
    /// Classifies a link of an error chain.
    pub fn classify(err: &'a (dyn Error + 'static)) -> Self {
        if let Some(fault) = err.downcast_ref::<Fault>() {
            Self::Located(fault)
        } else if let Some(annotated) = err.downcast_ref::<Annotated>() {
            Self::Annotated(annotated)
        } else {
            Self::Opaque(err)
        }
    }

    /// The classified link as a plain error.
    #[must_use]
    pub fn as_error(self) -> &'a (dyn Error + 'static) {
        match self {
            Self::Located(fault) => fault,
            Self::Annotated(annotated) => annotated,
            Self::Opaque(err) => err,
        }
    }

    /// The next link of the chain, or `None` for the root.
    #[must_use]
    pub fn cause(self) -> Option<&'a (dyn Error + 'static)> {
        self.as_error().source()
    }

    /// The location recorded by this link. Only faults have one.
    #[must_use]
    pub fn location(self) -> Option<Location> {
        match self {
            Self::Located(fault) => Some(fault.location()),
            Self::Annotated(_) | Self::Opaque(_) => None,
        }
    }

    /// The message this link contributes to a flattened chain.
    ///
    /// - A fault contributes the message given to [`Fault::new`], and nothing
    ///   for a bare wrap.
    /// - An annotated error contributes the internal text of a message
    ///   annotation, and nothing for tags and metadata.
    /// - An opaque error contributes its whole `Display` rendering.
    ///
    /// Empty messages are reported as `None`.
    #[must_use]
    pub fn message(self) -> Option<Cow<'a, str>> {
        let message = match self {
            Self::Located(fault) => Cow::Borrowed(fault.message()?),
            Self::Annotated(annotated) => Cow::Borrowed(annotated.internal_message()?),
            Self::Opaque(err) => Cow::Owned(err.to_string()),
        };
        (!message.is_empty()).then_some(message)
    }
}

/// The information an [`Annotated`] error attaches to its cause.
#[derive(Clone, Debug)]
pub enum Annotation {
    /// A message, created by [`msg::with`](crate::msg::with) and
    /// [`msg::with_desc`](crate::msg::with_desc).
    Message {
        /// Diagnostic text, part of the flattened chain.
        internal: Cow<'static, str>,
        /// Text safe to show to end users, see
        /// [`msg::user_messages`](crate::msg::user_messages).
        external: Option<Cow<'static, str>>,
    },
    /// A tag, created by [`tag::with`](crate::tag::with).
    Tag(Tag),
    /// Key/value metadata, created by [`values::with`](crate::values::with)
    /// and [`values::pairs`](crate::values::pairs).
    Values(Values),
    /// A snapshot of context metadata, created by
    /// [`context::with`](crate::context::with).
    Context(Context),
}

/// An error annotated by one of the built-in decorators.
///
/// Annotations never change the identity of the error they wrap: the cause is
/// always reachable through [`Error::source`].
pub struct Annotated {
    cause: BoxError,
    annotation: Annotation,
}

impl Annotated {
    pub(crate) fn new(cause: BoxError, annotation: Annotation) -> Self {
        Self { cause, annotation }
    }

    /// The annotation carried by this error.
    #[must_use]
    pub fn annotation(&self) -> &Annotation {
        &self.annotation
    }

    /// The annotated error.
    #[must_use]
    pub fn cause(&self) -> &(dyn Error + Send + Sync + 'static) {
        &*self.cause
    }

    fn internal_message(&self) -> Option<&str> {
        match &self.annotation {
            Annotation::Message { internal, .. } if !internal.is_empty() => Some(internal.as_ref()),
            _ => None,
        }
    }
}

impl fmt::Display for Annotated {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        if let Some(internal) = self.internal_message() {
            write!(f, "{internal}: ")?;
        }
        fmt::Display::fmt(&self.cause, f)
    }
}

impl fmt::Debug for Annotated {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Annotated")
            .field("annotation", &self.annotation)
            .field("cause", &self.cause)
            .finish()
    }
}

impl Error for Annotated {
    fn source(&self) -> Option<&(dyn Error + 'static)> {
        Some(&*self.cause)
    }
}

/// An iterator over the links of an error chain, from the given error to the
/// root cause.
///
/// Created by [`links`].
#[must_use]
#[derive(Clone)]
#[allow(missing_copy_implementations, reason = "iterators should not be Copy")]
pub struct Links<'a> {
    next: Option<&'a (dyn Error + 'static)>,
}

impl<'a> Iterator for Links<'a> {
    type Item = &'a (dyn Error + 'static);

    fn next(&mut self) -> Option<Self::Item> {
        let current = self.next?;
        self.next = current.source();
        Some(current)
    }
}

impl FusedIterator for Links<'_> {}

/// Iterates over `err` and every error reachable from it through
/// [`Error::source`], outermost first.
pub fn links<'a>(err: &'a (dyn Error + 'static)) -> Links<'a> {
    Links { next: Some(err) }
}

/// The innermost error of the chain, the one with no further cause.
///
/// # Examples
///
/// ```
/// use faultline::{msg, root_cause};
///
/// let io = std::io::Error::other("disk full");
/// let err = faultline::wrap(io, [msg::with("failed to save")]);
///
/// let root = root_cause(&err);
/// assert!(root.source().is_none());
/// assert_eq!(root.downcast_ref::<std::io::Error>().unwrap().to_string(), "disk full");
/// ```
#[must_use]
pub fn root_cause<'a>(err: &'a (dyn Error + 'static)) -> &'a (dyn Error + 'static) {
    links(err).last().unwrap_or(err)
}

/// Finds the outermost error of type `T` in the chain.
#[must_use]
pub fn find<'a, T: Error + 'static>(err: &'a (dyn Error + 'static)) -> Option<&'a T> {
    links(err).find_map(|link| link.downcast_ref::<T>())
}

/// The locations of every fault in the chain, outermost first.
///
/// Unlike a flattened chain, this lists every recorded call site in the order
/// the error passed through them on its way up.
#[must_use]
pub fn locations(err: &(dyn Error + 'static)) -> Vec<Location> {
    links(err)
        .filter_map(|link| Node::classify(link).location())
        .collect()
}
