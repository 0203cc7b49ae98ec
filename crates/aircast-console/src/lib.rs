//! Aircast console — the operator façade of the broadcast control plane.
//!
//! One call, [`Console::start`], assembles the stack: settings snapshots
//! (aircast-config), template expansion and parsing (aircast-pipeline),
//! graph construction through the engine seam (aircast-core), control
//! classification and routing (aircast-control). The resulting [`Console`]
//! is the only surface a UI layer needs: gain/delay/text setters with
//! unit conversion and clamping, apply/revert with output re-driving,
//! transport and recording control, and bus-event registration.
//!
//! ```no_run
//! use aircast_console::{Console, ConsoleOptions};
//! use aircast_core::offline::OfflineEngine;
//!
//! let engine = OfflineEngine::new();
//! let options = ConsoleOptions::new("pipelines/live.pipe")
//!     .with_config_path("/etc/aircast/aircast.conf")
//!     .with_config_path("aircast.conf");
//! let mut console = Console::start(&engine, options).unwrap();
//! console.run(true);
//! console.set_a_gain(-6.0);
//! ```

mod console;
mod error;

pub use console::{Console, ConsoleOptions};
pub use error::ConsoleError;
