//! Process-wide configuration of the flatten algorithm.
//!
//! Two behaviours of [`flatten`](crate::flatten) are configurable:
//!
//! - [`NestedMessages`] decides what happens when a third-party error
//!   re-renders the message of the error it wraps, such as an error type whose
//!   `Display` prints `"query failed: connection reset"` while its source
//!   prints `"connection reset"`.
//! - [`BareLocations`] decides what happens to the location of a bare wrap
//!   (a [`wrap`](crate::wrap) with no message) that cannot be attached to a
//!   message of its own.
//!
//! The defaults never drop a location and never repeat a message. To change
//! them for the whole program, install options once at startup:
//!
//! ```rust
//! use faultline::options::{BareLocations, FlattenOptions};
//!
//! FlattenOptions::new()
//!     .bare_locations(BareLocations::Merge)
//!     .install()
//!     .expect("failed to install flatten options");
//!
//! assert_eq!(FlattenOptions::current().bare_locations, BareLocations::Merge);
//! ```
//!
//! To use different options for a single call, pass them to
//! [`flatten_with`](crate::flatten_with) instead.

mod lock;

use core::fmt;

use self::lock::OptionsLock;

static OPTIONS: OptionsLock<FlattenOptions> = OptionsLock::new();

/// How an opaque error that repeats the message of its source is flattened.
#[derive(Copy, Clone, Debug, Default, PartialEq, Eq, Hash)]
pub enum NestedMessages {
    /// Skip an opaque error whose message equals the message of the next
    /// outer message-bearing error. When that outer error is itself opaque,
    /// also skip it if it is the `": "`-separated tail of the outer message.
    ///
    /// This keeps the most descriptive rendering, the outermost one, and drops
    /// the inner repetitions.
    #[default]
    Collapse,
    /// Strip the rendering of an opaque error's source from the end of its
    /// message, so that each step only shows the text that layer added.
    ///
    /// An opaque error whose message is exactly the message of its source
    /// contributes no step at all.
    Trim,
}

/// What happens to the location of a bare wrap that has no message to
/// attach to.
///
/// A bare wrap's location is normally attached to the next message-bearing
/// error further down the chain. When two bare wraps follow each other, or a
/// bare wrap precedes a message that is skipped, only one location can be
/// attached.
#[derive(Copy, Clone, Debug, Default, PartialEq, Eq, Hash)]
pub enum BareLocations {
    /// Record the location that could not be attached as a placeholder step
    /// with an empty message. No location is ever lost.
    #[default]
    Placeholder,
    /// Keep only the location closest to the message. Produces shorter traces
    /// at the cost of losing intermediate call sites.
    Merge,
}

/// Options controlling the flatten algorithm.
///
/// # Examples
///
/// ```rust
/// use faultline::options::{BareLocations, FlattenOptions, NestedMessages};
///
/// let options = FlattenOptions::new()
///     .nested_messages(NestedMessages::Trim)
///     .bare_locations(BareLocations::Merge);
///
/// assert_eq!(options.nested_messages, NestedMessages::Trim);
/// assert_ne!(options, FlattenOptions::default());
/// ```
#[derive(Copy, Clone, Debug, Default, PartialEq, Eq, Hash)]
pub struct FlattenOptions {
    /// Handling of opaque errors that repeat their source's message.
    pub nested_messages: NestedMessages,
    /// Handling of bare-wrap locations that have no message of their own.
    pub bare_locations: BareLocations,
}

/// Error returned when attempting to install flatten options when options
/// are already installed.
///
/// Contains the options that were attempted to be installed.
#[derive(Clone, Copy)]
pub struct OptionsAlreadyInstalledError(pub FlattenOptions);

impl fmt::Debug for OptionsAlreadyInstalledError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_tuple("OptionsAlreadyInstalledError")
            .field(&self.0)
            .finish()
    }
}

impl fmt::Display for OptionsAlreadyInstalledError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "flatten options are already installed globally")
    }
}

impl core::error::Error for OptionsAlreadyInstalledError {}

impl FlattenOptions {
    /// Creates the default options.
    #[must_use]
    pub const fn new() -> Self {
        Self {
            nested_messages: NestedMessages::Collapse,
            bare_locations: BareLocations::Placeholder,
        }
    }

    /// Sets the handling of nested messages.
    #[must_use]
    pub const fn nested_messages(mut self, nested_messages: NestedMessages) -> Self {
        self.nested_messages = nested_messages;
        self
    }

    /// Sets the handling of unattached bare-wrap locations.
    #[must_use]
    pub const fn bare_locations(mut self, bare_locations: BareLocations) -> Self {
        self.bare_locations = bare_locations;
        self
    }

    /// Installs the options globally.
    ///
    /// If options are already installed, returns an error
    /// [`OptionsAlreadyInstalledError`] containing the options that were
    /// attempted to be installed.
    ///
    /// See also [`replace`](Self::replace) which will replace any existing
    /// options without erroring.
    pub fn install(self) -> Result<(), OptionsAlreadyInstalledError> {
        OPTIONS.install(self).map_err(OptionsAlreadyInstalledError)
    }

    /// Replaces the currently installed options with `self`.
    ///
    /// Returns the previously installed options, if any.
    pub fn replace(self) -> Option<FlattenOptions> {
        OPTIONS.replace(self)
    }

    /// The globally installed options, or the defaults if none were
    /// installed.
    #[must_use]
    pub fn current() -> Self {
        OPTIONS.get().unwrap_or_default()
    }
}
