//! Side-car control file loading.
//!
//! Instead of inline `prop[CHANNEL]` annotations, a template `live.pipe`
//! may ship a `live.ctl` next to it: one line per channel, first token the
//! channel name, remaining tokens `elementName.propertyName`:
//!
//! ```text
//! audio.gain   amplifier_0.amplification
//! posY.piece   titleoverlay.ypos  titleshadow.ypos
//! ```
//!
//! The property part may itself be a `pad::property` path
//! (`mixer.sink_1::alpha`).

use std::path::{Path, PathBuf};

use crate::control_map::ControlMap;

/// Template file extension that carries a side-car.
const TEMPLATE_EXTENSION: &str = "pipe";
/// Side-car extension.
const CONTROL_EXTENSION: &str = "ctl";

/// The side-car path for a template path, if the template uses the
/// conventional extension.
pub fn control_file_for(template: impl AsRef<Path>) -> Option<PathBuf> {
    let template = template.as_ref();
    if template.extension().is_some_and(|e| e == TEMPLATE_EXTENSION) {
        Some(template.with_extension(CONTROL_EXTENSION))
    } else {
        None
    }
}

/// Read a side-car control file into a [`ControlMap`].
///
/// Best effort: an unreadable file yields `None`, never an error — a
/// template without a side-car is the common case.
pub fn read_control_file(path: impl AsRef<Path>) -> Option<ControlMap> {
    let text = std::fs::read_to_string(path.as_ref()).ok()?;
    Some(parse_control_lines(&text))
}

/// Parse side-car text. Blank lines are skipped; a target token without a
/// `.` separator is dropped with a warning.
pub fn parse_control_lines(text: &str) -> ControlMap {
    let mut map = ControlMap::new();
    for line in text.lines() {
        let mut tokens = line.split_whitespace();
        let Some(channel) = tokens.next() else {
            continue;
        };
        for target in tokens {
            match target.split_once('.') {
                Some((element, property)) if !property.is_empty() => {
                    map.bind(channel, element, property);
                }
                _ => {
                    tracing::warn!(channel, target, "control file: not element.property, dropped");
                }
            }
        }
    }
    map
}
