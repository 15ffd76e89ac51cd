//! Flattening an error chain into an ordered list of located messages.
//!
//! [`flatten`] walks a chain from the most recently wrapped error down to the
//! root cause and reconstructs the story of the error as a list of [`Step`]s,
//! root cause first:
//!
//! ```
//! use faultline::{Fault, flatten, msg};
//!
//! fn query() -> Result<(), Fault> {
//!     Err(Fault::new("connection reset"))
//! }
//!
//! fn get_user() -> Result<(), Fault> {
//!     query().map_err(|err| faultline::wrap(err, [msg::with("failed to get user")]))
//! }
//!
//! let err = get_user().unwrap_err();
//! let chain = flatten(&err);
//!
//! assert_eq!(chain.len(), 2);
//! assert_eq!(chain.steps()[0].message(), "connection reset");
//! assert_eq!(chain.steps()[1].message(), "failed to get user");
//! assert!(chain.iter().all(|step| step.location().is_some()));
//! ```
//!
//! The walk associates the location of every bare wrap with the next
//! message-bearing error further down the chain, and skips opaque errors that
//! only repeat a message that is already part of the chain. Both behaviours
//! are configurable through [`FlattenOptions`].

use alloc::{
    borrow::{Cow, ToOwned},
    string::ToString,
    vec::Vec,
};
use core::{error::Error, fmt};

use crate::{
    location::Location,
    node::{Node, links},
    options::{BareLocations, FlattenOptions, NestedMessages},
};

/// One entry of a flattened chain: a message and the location it was
/// attached at.
///
/// A step with an empty message is a placeholder that only records a
/// location.
#[derive(Clone, Debug, PartialEq, Eq, Hash)]
pub struct Step<'a> {
    location: Option<Location>,
    message: Cow<'a, str>,
}

impl<'a> Step<'a> {
    /// Creates a step.
    pub fn new(location: Option<Location>, message: impl Into<Cow<'a, str>>) -> Self {
        Self {
            location,
            message: message.into(),
        }
    }

    fn placeholder(location: Location) -> Self {
        Self {
            location: Some(location),
            message: Cow::Borrowed(""),
        }
    }

    /// The location the message was attached at, if known.
    #[must_use]
    pub fn location(&self) -> Option<Location> {
        self.location
    }

    /// The message, empty for placeholders.
    #[must_use]
    pub fn message(&self) -> &str {
        &self.message
    }

    /// Whether this step only records a location.
    #[must_use]
    pub fn is_placeholder(&self) -> bool {
        self.message.is_empty()
    }

    /// Converts the step into one that owns its message.
    #[must_use]
    pub fn into_owned(self) -> Step<'static> {
        Step {
            location: self.location,
            message: Cow::Owned(self.message.into_owned()),
        }
    }
}

impl fmt::Display for Step<'_> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.message)?;
        if let Some(location) = self.location {
            write!(f, "\n\t{location}")?;
        }
        Ok(())
    }
}

/// Serializes as `{"message": ..., "location": ...}`, with an empty string
/// for an unknown location.
impl serde::Serialize for Step<'_> {
    fn serialize<S: serde::Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        use serde::ser::SerializeStruct;

        struct OptionalLocation(Option<Location>);

        impl serde::Serialize for OptionalLocation {
            fn serialize<S: serde::Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
                match self.0 {
                    Some(location) => location.serialize(serializer),
                    None => serializer.serialize_str(""),
                }
            }
        }

        let mut state = serializer.serialize_struct("Step", 2)?;
        state.serialize_field("message", &self.message)?;
        state.serialize_field("location", &OptionalLocation(self.location))?;
        state.end()
    }
}

/// A flattened error chain.
///
/// Holds the [`Step`]s of the chain ordered root cause first, most recently
/// wrapped last, together with a reference to the root cause itself.
#[derive(Clone, Default)]
pub struct Chain<'a> {
    root: Option<&'a (dyn Error + 'static)>,
    steps: Vec<Step<'a>>,
}

impl<'a> Chain<'a> {
    /// The innermost error of the chain, `None` for an empty chain.
    ///
    /// The root is the original error value, so sentinel comparisons and
    /// downcasts work on it.
    #[must_use]
    pub fn root(&self) -> Option<&'a (dyn Error + 'static)> {
        self.root
    }

    /// The steps of the chain, root cause first.
    #[must_use]
    pub fn steps(&self) -> &[Step<'a>] {
        &self.steps
    }

    /// Iterates over the steps of the chain, root cause first.
    pub fn iter(&self) -> core::slice::Iter<'_, Step<'a>> {
        self.steps.iter()
    }

    /// The number of steps.
    #[must_use]
    pub fn len(&self) -> usize {
        self.steps.len()
    }

    /// Whether the chain has no steps.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.steps.is_empty()
    }

    /// Consumes the chain, returning its steps.
    #[must_use]
    pub fn into_steps(self) -> Vec<Step<'a>> {
        self.steps
    }
}

impl<'a> From<Option<&'a (dyn Error + 'static)>> for Chain<'a> {
    /// Flattens the error with the current global options, or returns an
    /// empty chain for `None`.
    fn from(err: Option<&'a (dyn Error + 'static)>) -> Self {
        err.map(flatten).unwrap_or_default()
    }
}

impl<'a> IntoIterator for Chain<'a> {
    type Item = Step<'a>;
    type IntoIter = alloc::vec::IntoIter<Step<'a>>;

    fn into_iter(self) -> Self::IntoIter {
        self.steps.into_iter()
    }
}

impl<'b, 'a> IntoIterator for &'b Chain<'a> {
    type Item = &'b Step<'a>;
    type IntoIter = core::slice::Iter<'b, Step<'a>>;

    fn into_iter(self) -> Self::IntoIter {
        self.steps.iter()
    }
}

/// Renders one step per line, each located step followed by its indented
/// location.
impl fmt::Display for Chain<'_> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        for (index, step) in self.steps.iter().enumerate() {
            if index > 0 {
                f.write_str("\n")?;
            }
            fmt::Display::fmt(step, f)?;
        }
        Ok(())
    }
}

impl fmt::Debug for Chain<'_> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Chain")
            .field("root", &self.root)
            .field("steps", &self.steps)
            .finish()
    }
}

impl serde::Serialize for Chain<'_> {
    fn serialize<S: serde::Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        serializer.collect_seq(&self.steps)
    }
}

/// Flattens an error chain using the globally installed [`FlattenOptions`].
///
/// See the [module documentation](self) for an overview. Flattening never
/// fails; a chain made only of opaque errors yields one location-less step
/// per distinct message.
///
/// With the default [`BareLocations::Placeholder`], a bare wrap above a
/// fault that has its own location adds an empty placeholder step, so
/// `Fault::wrap(wrap(Fault::new("db error"), [msg::with(..)]))` flattens to
/// three steps. Install [`BareLocations::Merge`] to drop such locations and
/// get only the two message steps.
#[must_use]
pub fn flatten<'a>(err: &'a (dyn Error + 'static)) -> Chain<'a> {
    flatten_with(err, FlattenOptions::current())
}

/// Flattens an error chain using the given options.
///
/// # Examples
///
/// ```
/// use faultline::{
///     Fault, flatten_with,
///     options::{BareLocations, FlattenOptions},
/// };
///
/// let err = Fault::wrap(Fault::wrap(Fault::new("timeout")));
///
/// // Each bare wrap whose location cannot be attached to a message becomes a
/// // placeholder.
/// let chain = flatten_with(&err, FlattenOptions::new());
/// assert_eq!(chain.len(), 3);
/// assert!(chain.steps()[2].is_placeholder());
///
/// // Merging keeps only the location of the fault itself.
/// let options = FlattenOptions::new().bare_locations(BareLocations::Merge);
/// let chain = flatten_with(&err, options);
/// assert_eq!(chain.len(), 1);
/// ```
#[must_use]
pub fn flatten_with<'a>(err: &'a (dyn Error + 'static), options: FlattenOptions) -> Chain<'a> {
    let mut flattener = Flattener::new(options);
    let mut root = err;
    for link in links(err) {
        flattener.visit(link);
        root = link;
    }
    flattener.finish(root)
}

/// The state of a walk from the outermost error to the root.
///
/// Steps are collected outermost first and reversed at the end.
struct Flattener<'a> {
    options: FlattenOptions,
    /// Location of a bare wrap waiting for the next message.
    pending: Option<Location>,
    /// The last message-bearing link, for collapsing repeated messages.
    previous: Option<Previous<'a>>,
    steps: Vec<Step<'a>>,
}

struct Previous<'a> {
    message: Cow<'a, str>,
    /// Only an opaque error's text can embed the rendering of its source.
    opaque: bool,
}

impl Previous<'_> {
    fn repeats(&self, message: &str) -> bool {
        if self.opaque {
            is_repetition(&self.message, message)
        } else {
            self.message == message
        }
    }
}

impl<'a> Flattener<'a> {
    fn new(options: FlattenOptions) -> Self {
        Self {
            options,
            pending: None,
            previous: None,
            steps: Vec::new(),
        }
    }

    fn visit(&mut self, link: &'a (dyn Error + 'static)) {
        match Node::classify(link) {
            Node::Located(fault) => match fault.message() {
                Some(message) if !message.is_empty() => {
                    self.push(Some(fault.location()), Cow::Borrowed(message));
                }
                _ => self.mark(fault.location()),
            },
            node @ Node::Annotated(_) => {
                if let Some(message) = node.message() {
                    self.push(None, message);
                }
            }
            node @ Node::Opaque(err) => {
                let Some(message) = node.message() else {
                    return;
                };
                match self.options.nested_messages {
                    NestedMessages::Collapse => self.visit_collapsing(message),
                    NestedMessages::Trim => self.visit_trimming(err, message),
                }
            }
        }
    }

    fn visit_collapsing(&mut self, message: Cow<'a, str>) {
        let repeated = self
            .previous
            .as_ref()
            .is_some_and(|previous| previous.repeats(&message));

        if repeated {
            self.skip();
            self.previous = Some(Previous {
                message,
                opaque: true,
            });
        } else {
            self.push(None, message);
            if let Some(previous) = &mut self.previous {
                previous.opaque = true;
            }
        }
    }

    fn visit_trimming(&mut self, err: &(dyn Error + 'static), message: Cow<'a, str>) {
        let Some(source) = err.source() else {
            self.push(None, message);
            return;
        };

        let rendered_source = source.to_string();
        if *message == rendered_source {
            return;
        }

        let trimmed = message
            .strip_suffix(rendered_source.as_str())
            .and_then(|prefix| prefix.strip_suffix(": "))
            .filter(|prefix| !prefix.is_empty())
            .map(ToOwned::to_owned);
        match trimmed {
            Some(prefix) => self.push(None, Cow::Owned(prefix)),
            None => self.push(None, message),
        }
    }

    /// Records the location of a bare wrap.
    fn mark(&mut self, location: Location) {
        if let Some(previous) = self.pending.replace(location) {
            self.unattached(previous);
        }
    }

    /// Emits a message step.
    ///
    /// A link without its own location takes the pending one. A link with its
    /// own location leaves the pending one unattached.
    fn push(&mut self, own: Option<Location>, message: Cow<'a, str>) {
        let location = match own {
            Some(location) => {
                if let Some(pending) = self.pending.take() {
                    self.unattached(pending);
                }
                Some(location)
            }
            None => self.pending.take(),
        };
        self.previous = Some(Previous {
            message: message.clone(),
            opaque: false,
        });
        self.steps.push(Step { location, message });
    }

    /// Handles a link whose message is already part of the chain.
    fn skip(&mut self) {
        let Some(pending) = self.pending.take() else {
            return;
        };
        match self.options.bare_locations {
            BareLocations::Placeholder => self.steps.push(Step::placeholder(pending)),
            BareLocations::Merge => self.attach_to_last(pending),
        }
    }

    fn unattached(&mut self, location: Location) {
        if self.options.bare_locations == BareLocations::Placeholder {
            self.steps.push(Step::placeholder(location));
        }
    }

    fn attach_to_last(&mut self, location: Location) {
        if let Some(step) = self.steps.last_mut()
            && step.location.is_none()
        {
            step.location = Some(location);
        }
    }

    fn finish(mut self, root: &'a (dyn Error + 'static)) -> Chain<'a> {
        if let Some(pending) = self.pending.take() {
            match self.options.bare_locations {
                BareLocations::Placeholder => self.steps.push(Step::placeholder(pending)),
                BareLocations::Merge => self.attach_to_last(pending),
            }
        }
        self.steps.reverse();
        Chain {
            root: Some(root),
            steps: self.steps,
        }
    }
}

/// Whether `inner` only repeats `outer`: either the same text or the part of
/// `outer` after a `": "` separator.
fn is_repetition(outer: &str, inner: &str) -> bool {
    outer == inner
        || outer
            .strip_suffix(inner)
            .is_some_and(|prefix| prefix.ends_with(": "))
}

/// Owned copy of a flattened chain's steps.
pub(crate) fn owned_steps(chain: Chain<'_>) -> Vec<Step<'static>> {
    chain.into_iter().map(Step::into_owned).collect()
}
