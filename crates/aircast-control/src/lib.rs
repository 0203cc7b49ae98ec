//! Control-channel routing for the aircast broadcast console.
//!
//! Bridges the parsed template's control map and the engine's live graph:
//!
//! - [`ControlRegistry::classify`] resolves every bound `(element,
//!   property)` pair once, into interpolated or settable targets.
//! - [`ControlRegistry::set_control`] routes a `(channel, value,
//!   duration)` request: best-effort smooth ramp, always-correct
//!   immediate write.
//! - [`set_property`] is the one-shot initialization path with
//!   first-success-wins value coercion.
//! - [`EventRouter`] dispatches engine bus messages by kind and
//!   structured fields by key.

mod events;
mod registry;
mod setter;

pub use events::{EventRouter, FieldHandler, FieldHandlerUpdate, HandlerUpdate, MessageHandler};
pub use registry::{ChannelTargets, ControlRegistry, InterpolatedTarget, SettableTarget};
pub use setter::set_property;
