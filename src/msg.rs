//! Messages attached to errors.
//!
//! Every message has an internal part, which becomes a step of the flattened
//! chain and is meant for developers and logs. A message created with
//! [`with_desc`] also has an external part, which is safe to show to the end
//! user. External messages are only ever exposed through [`user_messages`]
//! and [`user_message`], which never include locations or internal text.
//!
//! ```
//! use faultline::msg;
//!
//! let err = faultline::wrap(
//!     "duplicate key value violates unique constraint",
//!     [msg::with_desc("failed to insert account", "That username is taken.")],
//! );
//! let err = faultline::wrap(
//!     err,
//!     [msg::with_desc("failed to register", "Please choose another one.")],
//! );
//!
//! assert_eq!(
//!     msg::user_message(&err),
//!     "Please choose another one. That username is taken."
//! );
//! ```

use alloc::{borrow::Cow, boxed::Box, string::String, vec::Vec};
use core::error::Error;

use crate::{
    fault::Decorator,
    node::{Annotated, Annotation, Node, links},
};

/// A decorator that attaches an internal message to the error.
#[must_use]
pub fn with(internal: impl Into<Cow<'static, str>>) -> Decorator {
    message(internal.into(), None)
}

/// A decorator that attaches an internal message and a message for the end
/// user to the error.
#[must_use]
pub fn with_desc(
    internal: impl Into<Cow<'static, str>>,
    external: impl Into<Cow<'static, str>>,
) -> Decorator {
    let external = external.into();
    message(internal.into(), (!external.is_empty()).then_some(external))
}

fn message(internal: Cow<'static, str>, external: Option<Cow<'static, str>>) -> Decorator {
    Decorator::new(move |err| {
        if internal.is_empty() && external.is_none() {
            err
        } else {
            Box::new(Annotated::new(err, Annotation::Message { internal, external }))
        }
    })
}

/// Every end-user message attached to the error, most recent first.
#[must_use]
pub fn user_messages<'a>(err: &'a (dyn Error + 'static)) -> Vec<&'a str> {
    links(err)
        .filter_map(|link| match Node::classify(link) {
            Node::Annotated(annotated) => match annotated.annotation() {
                Annotation::Message {
                    external: Some(external),
                    ..
                } => Some(external.as_ref()),
                _ => None,
            },
            _ => None,
        })
        .collect()
}

/// Every end-user message attached to the error, most recent first, joined
/// with a space.
///
/// Empty if no end-user message was attached.
#[must_use]
pub fn user_message(err: &(dyn Error + 'static)) -> String {
    user_messages(err).join(" ")
}

#[cfg(test)]
mod tests {
    use alloc::string::ToString;

    use super::*;
    use crate::{Fault, flatten, wrap};

    fn first_user_message<'a>(err: &'a Fault) -> Option<&'a str> {
        user_messages(err).into_iter().next()
    }

    #[test]
    fn test_user_messages_borrow_from_the_error() {
        let err = wrap(Fault::new("root"), [with_desc("failed", "Please retry.")]);
        assert_eq!(first_user_message(&err), Some("Please retry."));
    }

    #[test]
    fn test_internal_message_in_chain() {
        let err = wrap(Fault::new("root"), [with("outer")]);
        assert_eq!(err.to_string(), "outer: root");
        let messages: Vec<_> = flatten(&err).iter().map(|s| s.message().to_string()).collect();
        assert_eq!(messages, ["root", "outer"]);
        assert!(user_messages(&err).is_empty());
        assert_eq!(user_message(&err), "");
    }

    #[test]
    fn test_user_messages_outer_to_inner() {
        let err = wrap(Fault::new("root"), [with_desc("a", "First.")]);
        let err = wrap(err, [with("b")]);
        let err = wrap(err, [with_desc("c", "Second.")]);

        assert_eq!(user_messages(&err), ["Second.", "First."]);
        assert_eq!(user_message(&err), "Second. First.");
    }

    #[test]
    fn test_user_messages_never_expose_internals() {
        let err = wrap(Fault::new("secret root"), [with_desc("internal detail", "Oops.")]);
        let message = user_message(&err);
        assert_eq!(message, "Oops.");
        assert!(!message.contains(file!()));
    }

    #[test]
    fn test_external_only_message() {
        let err = wrap(Fault::new("root"), [with_desc("", "Try again later.")]);
        assert_eq!(user_message(&err), "Try again later.");
        assert_eq!(err.to_string(), "root");
        let chain = flatten(&err);
        let messages: Vec<_> = chain.iter().filter(|s| !s.is_placeholder()).collect();
        assert_eq!(messages.len(), 1);
        assert_eq!(messages[0].message(), "root");
    }

    #[test]
    fn test_empty_message_is_noop() {
        let err = wrap(Fault::new("root"), [with(""), with_desc("", "")]);
        assert_eq!(crate::links(&err).count(), 2);
    }
}
