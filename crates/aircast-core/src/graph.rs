//! The seam between the control plane and the media engine.
//!
//! Everything aircast knows about the engine fits in two traits:
//! [`MediaEngine`] builds a graph from a cleaned template string, and
//! [`MediaGraph`] exposes the live graph — named elements with typed
//! properties, an optional running clock, per-property interpolation
//! sources, and state/event plumbing. The real engine lives behind these
//! traits; the [`offline`](crate::offline) module provides the in-memory
//! implementation used by tests and headless runs.

use crate::time::ClockTime;
use crate::value::PropertyValue;

/// Addresses one property reachable from the control plane: a property of
/// a named element, or of a named pad on that element.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct TargetPath {
    /// Element name as resolved by the template parser.
    pub element: String,
    /// Pad name, for `pad::property` paths.
    pub pad: Option<String>,
    /// Property name.
    pub property: String,
}

impl TargetPath {
    /// Address a property on the element itself.
    pub fn new(element: impl Into<String>, property: impl Into<String>) -> Self {
        TargetPath {
            element: element.into(),
            pad: None,
            property: property.into(),
        }
    }

    /// Address a property on a named pad of the element.
    pub fn on_pad(
        element: impl Into<String>,
        pad: impl Into<String>,
        property: impl Into<String>,
    ) -> Self {
        TargetPath {
            element: element.into(),
            pad: Some(pad.into()),
            property: property.into(),
        }
    }
}

impl std::fmt::Display for TargetPath {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match &self.pad {
            Some(pad) => write!(f, "{}.{}::{}", self.element, pad, self.property),
            None => write!(f, "{}.{}", self.element, self.property),
        }
    }
}

/// Handle to an interpolation source created by
/// [`MediaGraph::create_interpolation`].
///
/// Ids are issued sequentially per graph and never reused.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct InterpolationId(pub(crate) u32);

impl InterpolationId {
    /// Raw numeric identifier.
    pub fn index(self) -> u32 {
        self.0
    }
}

/// Lifecycle state of a graph or of a single element.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub enum GraphState {
    /// Torn down, no resources held.
    #[default]
    Null,
    /// Allocated but not processing.
    Ready,
    /// Processing suspended.
    Paused,
    /// Live.
    Playing,
}

/// Events the control plane can post into the graph.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum EventKind {
    /// End-of-stream: drain and finalize.
    Eos,
}

/// Errors reported by the media engine.
#[derive(Debug, thiserror::Error)]
pub enum EngineError {
    /// The graph description did not build.
    #[error("failed to build graph: {0}")]
    Build(String),
    /// A named element does not exist in the graph.
    #[error("no such element '{element}'")]
    NoSuchElement {
        /// The missing element name.
        element: String,
    },
    /// An element exists but has no pad of the given name.
    #[error("element '{element}' has no pad '{pad}'")]
    NoSuchPad {
        /// Element name.
        element: String,
        /// The missing pad name.
        pad: String,
    },
    /// An element exists but has no property of the given name.
    #[error("element '{element}' has no property '{property}'")]
    NoSuchProperty {
        /// Element name.
        element: String,
        /// The missing property name.
        property: String,
    },
    /// A write carried a value of the wrong type for the property.
    #[error("property '{property}' on '{element}' expects {expected}, got {got}")]
    TypeMismatch {
        /// Element name.
        element: String,
        /// Property name.
        property: String,
        /// Declared property type.
        expected: &'static str,
        /// Type of the rejected value.
        got: &'static str,
    },
    /// Interpolation was requested for a property the engine cannot
    /// control continuously.
    #[error("property '{property}' on '{element}' is not controllable")]
    NotControllable {
        /// Element name.
        element: String,
        /// Property name.
        property: String,
    },
    /// An [`InterpolationId`] that this graph never issued.
    #[error("unknown interpolation source #{0}")]
    UnknownInterpolation(u32),
}

/// A live media-processing graph.
///
/// Object-safe: the control plane holds `&mut dyn MediaGraph` and never
/// owns element handles — a missing element is an absent target, not an
/// error (see the registry's classification rules).
pub trait MediaGraph {
    /// Whether an element of this name exists.
    fn has_element(&self, name: &str) -> bool;

    /// Whether the element exists and has a pad of this name.
    fn has_pad(&self, element: &str, pad: &str) -> bool;

    /// Current value of a property, `None` if element/pad/property is
    /// absent.
    fn property(&self, target: &TargetPath) -> Option<PropertyValue>;

    /// Write a property. Type-checked by the engine: a declared float
    /// property rejects strings, which is what drives the control plane's
    /// candidate-coercion loop.
    fn set_property(&mut self, target: &TargetPath, value: &PropertyValue)
    -> Result<(), EngineError>;

    /// Whether the engine can drive this element property continuously
    /// (the precondition for interpolation).
    fn is_controllable(&self, element: &str, property: &str) -> bool;

    /// Create a linear interpolation source bound to the target, seeded
    /// with `initial` at offset zero.
    fn create_interpolation(
        &mut self,
        target: &TargetPath,
        initial: f64,
    ) -> Result<InterpolationId, EngineError>;

    /// Schedule the source to reach `value` at absolute clock time `at`.
    fn schedule(
        &mut self,
        source: InterpolationId,
        at: ClockTime,
        value: f64,
    ) -> Result<(), EngineError>;

    /// Current engine clock, `None` when no clock is running (graph not
    /// yet live).
    fn clock_time(&self) -> Option<ClockTime>;

    /// Change the state of the whole graph.
    fn set_state(&mut self, state: GraphState);

    /// Change the state of one element. Returns false if the element is
    /// absent.
    fn element_set_state(&mut self, element: &str, state: GraphState) -> bool;

    /// Re-align an element's state with the graph state. Returns false if
    /// the element is absent.
    fn sync_element_state(&mut self, element: &str) -> bool;

    /// Post an event to the whole graph.
    fn post_event(&mut self, event: EventKind);

    /// Post an event to one element. Returns false if the element is
    /// absent.
    fn element_post_event(&mut self, element: &str, event: EventKind) -> bool;
}

/// Builds graphs from cleaned template strings.
pub trait MediaEngine {
    /// The graph type this engine produces.
    type Graph: MediaGraph;

    /// Build a graph from a cleaned, macro-expanded template.
    ///
    /// # Errors
    ///
    /// Returns [`EngineError::Build`] when the description is malformed —
    /// the MalformedInput case, propagated to the caller rather than
    /// absorbed.
    fn build_graph(&self, description: &str) -> Result<Self::Graph, EngineError>;
}
