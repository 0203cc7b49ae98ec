//! Pipeline template language for the aircast broadcast console.
//!
//! A broadcast pipeline is described as text: element chunks separated by
//! `!`, `key=value` assignments, `@KEY@` macro placeholders, and
//! `prop[CHANNEL]` control annotations. This crate turns that text into
//! something the engine can build and the control plane can route on:
//!
//! 1. [`expand_macros`] substitutes `@KEY@` placeholders (flat, total,
//!    no recursion).
//! 2. [`parse_template`] splits elements, gives every element a unique
//!    `name=`, and extracts the annotations into a [`ControlMap`].
//! 3. [`ParsedTemplate::cleaned`] is the graph-build instruction handed
//!    to the engine.
//!
//! File-level helpers: [`read_template`] (line continuations + macro
//! expansion) and [`read_control_file`] (the side-car `.ctl` variant of
//! control bindings).

mod control_file;
mod control_map;
mod error;
mod expand;
mod parser;
mod reader;

pub use control_file::{control_file_for, parse_control_lines, read_control_file};
pub use control_map::{ChannelBindings, ControlMap, ElementBindings};
pub use error::TemplateError;
pub use expand::expand_macros;
pub use parser::{ElementDescriptor, ParsedTemplate, parse_template};
pub use reader::read_template;
