//! Operator settings for the aircast broadcast console.
//!
//! Settings live in sectioned slots of raw strings ([`Settings`]) with a
//! fixed per-option coercion table applied on read, layered loading
//! (later candidate files override earlier ones per option), and TOML
//! persistence that passes unrecognized sections and options through
//! untouched.
//!
//! [`SettingsStore`] holds two owned slots — active and backup — and
//! implements the console's apply/revert commit semantics as whole-slot
//! deep copies.

mod error;
mod settings;
mod store;

pub use error::SettingsError;
pub use settings::{SettingValue, Settings};
pub use store::SettingsStore;
