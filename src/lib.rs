#![cfg_attr(not(doc), no_std)]
#![deny(
    missing_docs,
    unsafe_code,
    clippy::alloc_instead_of_core,
    clippy::std_instead_of_alloc,
    clippy::std_instead_of_core,
    rustdoc::invalid_rust_codeblocks,
    rustdoc::broken_intra_doc_links,
    missing_copy_implementations,
    unused_doc_comments
)]
// Make docs.rs generate better docs
#![cfg_attr(docsrs, feature(doc_cfg))]

//! Annotate errors as they travel up the call stack, then flatten them into
//! a structured trace.
//!
//! ## Overview
//!
//! An error that bubbles up through several layers of an application usually
//! loses the information needed to understand it: which call sites it passed
//! through, which user it happened to, what category of failure it is, and
//! what can safely be shown to the end user. This crate lets every layer
//! annotate the error on its way up, without changing its type or hiding the
//! original error, and reconstructs the accumulated information at the top.
//!
//! ## Quick Example
//!
//! ```
//! use faultline::{Fault, ResultExt, Tag, flatten, msg, tag, values};
//!
//! fn query_user(id: u64) -> Result<String, Fault> {
//!     Err(Fault::new("connection reset by peer"))
//! }
//!
//! fn get_user(id: u64) -> Result<String, Fault> {
//!     query_user(id).wrap_with([
//!         msg::with_desc("failed to get user", "We could not load your profile."),
//!         tag::with(Tag::UNAVAILABLE),
//!         values::pairs(&["user_id", id.to_string().as_str()]),
//!     ])
//! }
//!
//! let err = get_user(42).unwrap_err();
//!
//! // The message chain, for logs.
//! assert_eq!(err.to_string(), "failed to get user: connection reset by peer");
//!
//! // Each message with the line it was attached at, root cause first.
//! let chain = flatten(&err);
//! assert_eq!(chain.steps()[0].message(), "connection reset by peer");
//! assert_eq!(chain.steps()[1].message(), "failed to get user");
//!
//! // Structured data for the caller.
//! assert_eq!(tag::get(&err), Some(&Tag::UNAVAILABLE));
//! assert_eq!(values::get(&err)["user_id"], "42");
//! assert_eq!(msg::user_message(&err), "We could not load your profile.");
//! ```
//!
//! ## Core Concepts
//!
//! An error chain is the linked list formed by
//! [`Error::source`](core::error::Error::source). This crate adds two kinds
//! of links to it:
//!
//! - A [`Fault`] records a source location, captured with
//!   `#[track_caller]`, and optionally a message. [`Fault::new`] and
//!   [`fault!`] create a root fault, while [`wrap`] and [`ResultExt`] wrap an
//!   existing error in a fault that only records where it passed through.
//! - An annotated error, created by a [`Decorator`], carries a message
//!   ([`msg`]), a [`Tag`] ([`tag`]), key/value metadata ([`values`]) or a
//!   snapshot of a [`Context`](context::Context) ([`context`]).
//!
//! Any other error in the chain, from the standard library or a third-party
//! crate, is kept as is and contributes its `Display` text.
//!
//! [`flatten`] walks the chain and produces a [`Chain`]: a list of [`Step`]s,
//! each a message with the location it was attached at. [`ErrorInfo`]
//! combines the flattened chain with the error's metadata into a single value
//! that serializes with [`serde`].
//!
//! ## Features
//!
//! - `std` (default): uses `std::sync::RwLock` for the global
//!   [`FlattenOptions`](options::FlattenOptions). Without it the crate is
//!   `no_std` and uses a spin lock.

extern crate alloc;

#[cfg(feature = "std")]
extern crate std;

#[macro_use]
mod macros;

pub mod context;
pub mod msg;
pub mod option_ext;
pub mod options;
pub mod prelude;
pub mod tag;
pub mod values;

mod fault;
mod flatten;
mod info;
mod location;
mod node;
mod result_ext;

pub use self::{
    fault::{BoxError, Decorator, Fault, wrap},
    flatten::{Chain, Step, flatten, flatten_with},
    info::ErrorInfo,
    location::Location,
    node::{Annotated, Annotation, Links, Node, find, links, locations, root_cause},
    option_ext::OptionExt,
    result_ext::ResultExt,
    tag::Tag,
};

/// A [`Result`](core::result::Result) type alias where the error defaults to
/// [`Fault`].
///
/// # Examples
///
/// ```
/// fn might_fail() -> faultline::Result<String> {
///     Ok("success".to_string())
/// }
/// ```
pub type Result<T, E = Fault> = core::result::Result<T, E>;

// Not public API. Referenced by macro-generated code.
#[doc(hidden)]
pub mod __private {
    use alloc::{borrow::Cow, fmt};
    #[doc(hidden)]
    pub use alloc::format;
    #[doc(hidden)]
    pub use core::{format_args, result::Result::Err};

    #[doc(hidden)]
    #[inline]
    #[must_use]
    pub fn format_message(args: fmt::Arguments<'_>) -> Cow<'static, str> {
        match args.as_str() {
            Some(message) => Cow::Borrowed(message),
            None => Cow::Owned(fmt::format(args)),
        }
    }
}
