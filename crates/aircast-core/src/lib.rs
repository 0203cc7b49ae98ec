//! Aircast core — engine-facing abstractions for the broadcast console.
//!
//! The aircast control plane (template parsing, control routing,
//! configuration snapshots) never talks to a media stack directly. This
//! crate defines the seam:
//!
//! - [`MediaEngine`] / [`MediaGraph`] — the external engine: build a graph
//!   from a cleaned template, look up named elements, read/write typed
//!   properties, create interpolation sources, read the clock, post
//!   events.
//! - [`PropertyValue`] — dynamically typed property values.
//! - [`ClockTime`] — engine clock, nanosecond resolution.
//! - [`BusMessage`] / [`MessageKind`] / [`MessageStructure`] — messages
//!   the engine bus delivers to the event router.
//! - [`offline`] — an in-memory engine implementation for tests, demos,
//!   and headless runs.

mod graph;
mod message;
mod time;
mod value;

/// In-memory media engine.
pub mod offline;

pub use graph::{
    EngineError, EventKind, GraphState, InterpolationId, MediaEngine, MediaGraph, TargetPath,
};
pub use message::{BusMessage, MessageKind, MessageStructure};
pub use time::ClockTime;
pub use value::PropertyValue;
