//! Metadata collected before an error happens.
//!
//! A [`Context`] is an immutable set of string key/value pairs that is built
//! up while a request or task is processed, for example the ID of the user it
//! runs for. When an error occurs, [`with`] snapshots the context onto the
//! error so that the metadata shows up in [`values::get`](crate::values::get)
//! and in the serialized error.
//!
//! Extending a context never modifies it: [`Context::with_meta`] returns a
//! new context and leaves the receiver, and every other clone of it,
//! unchanged. Contexts are cheap to clone.
//!
//! ```
//! use faultline::context::{self, Context};
//!
//! let ctx = Context::new().with_meta(&["user_id", "42"]);
//! let err = faultline::wrap("permission denied", [context::with(&ctx, &["action", "delete"])]);
//!
//! let meta = context::metadata(&err).unwrap();
//! assert_eq!(meta["user_id"], "42");
//! assert_eq!(meta["action"], "delete");
//! ```

use alloc::{boxed::Box, string::String};
use core::{error::Error, fmt};

use rustc_hash::FxBuildHasher;
use triomphe::Arc;

use crate::{
    fault::Decorator,
    node::{Annotated, Annotation, Node, links},
};

/// Insertion-ordered string metadata.
pub type Meta = indexmap::IndexMap<String, String, FxBuildHasher>;

/// An immutable, cheaply clonable set of metadata.
#[derive(Clone, Default, PartialEq, Eq)]
pub struct Context(Arc<Meta>);

impl Context {
    /// Creates an empty context.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Returns a new context with the pairs of a flat `key, value, ...` list
    /// added, overriding existing keys.
    ///
    /// The receiver is not modified. A trailing key without a value is
    /// dropped.
    #[must_use]
    pub fn with_meta(&self, kv: &[&str]) -> Self {
        let mut context = self.clone();
        let mut pairs = kv.chunks_exact(2).peekable();
        if pairs.peek().is_some() {
            let meta = Arc::make_mut(&mut context.0);
            for pair in pairs {
                meta.insert(String::from(pair[0]), String::from(pair[1]));
            }
        }
        context
    }

    /// The metadata of this context.
    #[must_use]
    pub fn meta(&self) -> &Meta {
        &self.0
    }

    /// Whether this context holds no metadata.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }
}

impl fmt::Debug for Context {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_map().entries(self.0.iter()).finish()
    }
}

impl serde::Serialize for Context {
    fn serialize<S: serde::Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        serde::Serialize::serialize(&*self.0, serializer)
    }
}

/// A decorator that attaches a snapshot of `ctx`, extended with the pairs of
/// `kv`, to the error.
///
/// Leaves the error unchanged if there is no metadata to attach.
#[must_use]
pub fn with(ctx: &Context, kv: &[&str]) -> Decorator {
    let snapshot = ctx.with_meta(kv);
    Decorator::new(move |err| {
        if snapshot.is_empty() {
            err
        } else {
            Box::new(Annotated::new(err, Annotation::Context(snapshot)))
        }
    })
}

/// Merges every context snapshot attached to the error, the most recent value
/// of each key winning.
///
/// Returns `None` when no context metadata was attached.
#[must_use]
pub fn metadata(err: &(dyn Error + 'static)) -> Option<Meta> {
    let mut merged = Meta::default();
    for link in links(err) {
        if let Node::Annotated(annotated) = Node::classify(link)
            && let Annotation::Context(context) = annotated.annotation()
        {
            for (key, value) in context.meta() {
                merged.entry(key.clone()).or_insert_with(|| value.clone());
            }
        }
    }
    (!merged.is_empty()).then_some(merged)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::{Fault, wrap};

    #[test]
    fn test_with_meta_is_copy_on_write() {
        let parent = Context::new().with_meta(&["request_id", "abc"]);
        let left = parent.with_meta(&["branch", "left"]);
        let right = parent.with_meta(&["branch", "right"]);

        assert_eq!(parent.meta().len(), 1);
        assert!(!parent.meta().contains_key("branch"));
        assert_eq!(left.meta()["branch"], "left");
        assert_eq!(right.meta()["branch"], "right");
        assert_eq!(left.meta()["request_id"], "abc");
    }

    #[test]
    fn test_with_meta_overrides_and_drops_odd_key() {
        let ctx = Context::new()
            .with_meta(&["a", "1"])
            .with_meta(&["a", "2", "dangling"]);
        assert_eq!(ctx.meta().len(), 1);
        assert_eq!(ctx.meta()["a"], "2");
    }

    #[test]
    fn test_metadata_most_recent_wins() {
        let ctx = Context::new().with_meta(&["user_id", "42"]);
        let err = wrap(Fault::new("root"), [with(&ctx, &["step", "inner"])]);
        let err = wrap(err, [with(&ctx, &["step", "outer"])]);

        let meta = metadata(&err).unwrap();
        assert_eq!(meta["user_id"], "42");
        assert_eq!(meta["step"], "outer");
    }

    #[test]
    fn test_metadata_empty_is_none() {
        let err = wrap(Fault::new("root"), [with(&Context::new(), &[])]);
        assert_eq!(metadata(&err), None);
        assert_eq!(crate::links(&err).count(), 2);
    }

    #[test]
    fn test_snapshot_does_not_follow_context() {
        let ctx = Context::new().with_meta(&["a", "1"]);
        let err = wrap(Fault::new("root"), [with(&ctx, &[])]);
        let _extended = ctx.with_meta(&["b", "2"]);

        let meta = metadata(&err).unwrap();
        assert_eq!(meta.len(), 1);
    }

    #[test]
    fn test_context_traits() {
        static_assertions::assert_impl_all!(Context: Send, Sync, Clone);
    }
}
