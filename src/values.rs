//! Key/value metadata attached to errors.
//!
//! Metadata is attached with [`with`] or [`pairs`] and collected with [`get`],
//! which merges every map in the chain. When the same key is attached more
//! than once, the most recently attached value wins.
//!
//! ```
//! use faultline::values;
//! use serde_json::json;
//!
//! let err = faultline::wrap("not found", [values::pairs(&["user_id", "42"])]);
//! let err = faultline::wrap(err, [values::pairs(&["user_id", "43", "region", "eu"])]);
//!
//! let values = values::get(&err);
//! assert_eq!(values["user_id"], json!("43"));
//! assert_eq!(values["region"], json!("eu"));
//! ```
//!
//! Context metadata attached with [`context::with`](crate::context::with) is
//! merged into the same map.

use alloc::{boxed::Box, string::String};
use core::error::Error;

use rustc_hash::FxBuildHasher;

use crate::{
    fault::Decorator,
    node::{Annotated, Annotation, Node, links},
};

/// Insertion-ordered key/value metadata.
pub type Values = indexmap::IndexMap<String, serde_json::Value, FxBuildHasher>;

/// A decorator that attaches a map of values to the error.
///
/// An empty map leaves the error unchanged.
#[must_use]
pub fn with(values: Values) -> Decorator {
    Decorator::new(move |err| {
        if values.is_empty() {
            err
        } else {
            Box::new(Annotated::new(err, Annotation::Values(values)))
        }
    })
}

/// A decorator that attaches string values from a flat `key, value, ...`
/// list.
///
/// A trailing key without a value is dropped.
#[must_use]
pub fn pairs(kv: &[&str]) -> Decorator {
    with(
        kv.chunks_exact(2)
            .map(|pair| (String::from(pair[0]), serde_json::Value::from(pair[1])))
            .collect(),
    )
}

/// Merges every value and context metadata map attached to the error.
///
/// The most recently attached value of each key wins.
#[must_use]
pub fn get(err: &(dyn Error + 'static)) -> Values {
    let mut values = Values::default();
    for link in links(err) {
        let Node::Annotated(annotated) = Node::classify(link) else {
            continue;
        };
        match annotated.annotation() {
            Annotation::Values(attached) => {
                for (key, value) in attached {
                    values.entry(key.clone()).or_insert_with(|| value.clone());
                }
            }
            Annotation::Context(context) => {
                for (key, value) in context.meta() {
                    values
                        .entry(key.clone())
                        .or_insert_with(|| serde_json::Value::from(value.as_str()));
                }
            }
            Annotation::Message { .. } | Annotation::Tag(_) => {}
        }
    }
    values
}
