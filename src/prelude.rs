//! Commonly used items for convenient importing.
//!
//! ```rust
//! use faultline::prelude::*;
//!
//! fn divide(a: i32, b: i32) -> Result<i32, Fault> {
//!     if b == 0 {
//!         bail!("cannot divide by zero");
//!     }
//!     Ok(a / b)
//! }
//!
//! let err = divide(1, 0).wrap_with([msg::with("failed to compute ratio")]).unwrap_err();
//! assert_eq!(flatten(&err).len(), 2);
//! ```
//!
//! This prelude includes:
//!
//! - **[`Fault`]** and **[`wrap`]**: creating and wrapping errors
//! - **[`ResultExt`]** and **[`OptionExt`]**: wrapping inside method chains
//! - **[`fault!`]** and **[`bail!`]**: macros for creating and returning errors
//! - **[`flatten`]**: reconstructing the annotated chain
//! - **[`msg`]**, **[`tag`]** and **[`values`]**: the common decorators, plus
//!   [`Tag`] itself

pub use crate::{
    Fault, OptionExt, ResultExt, Tag, bail, fault, flatten, msg, tag, values, wrap,
};
