//! One settings slot: sectioned raw strings with typed reads.
//!
//! Writes always store the string form; the declared type of an option is
//! applied when it is *read*. That keeps unknown sections and options
//! flowing through load → save untouched, which matters because settings
//! files are shared with tools this crate knows nothing about.
//!
//! Recognized options and their types:
//!
//! | option                          | type           |
//! |---------------------------------|----------------|
//! | `URL`, `source`, `text.face`    | string         |
//! | `gain`, `text.size`, `text.X`, `text.Y` | float  |
//! | `delay`                         | int (via float)|
//! | anything else                   | string         |

use std::collections::BTreeMap;
use std::path::{Path, PathBuf};

use serde::{Deserialize, Serialize};

use crate::error::SettingsError;

/// A typed value read from a settings slot.
#[derive(Debug, Clone, PartialEq)]
pub enum SettingValue {
    /// String-typed option (the default).
    Str(String),
    /// Float-typed option.
    Float(f64),
    /// Integer-typed option.
    Int(i64),
}

impl SettingValue {
    /// The value as a float, widening integers.
    pub fn as_float(&self) -> Option<f64> {
        match self {
            SettingValue::Float(f) => Some(*f),
            SettingValue::Int(i) => Some(*i as f64),
            SettingValue::Str(_) => None,
        }
    }

    /// The value as an integer.
    pub fn as_int(&self) -> Option<i64> {
        match self {
            SettingValue::Int(i) => Some(*i),
            SettingValue::Float(_) | SettingValue::Str(_) => None,
        }
    }

    /// The value as a string slice.
    pub fn as_str(&self) -> Option<&str> {
        match self {
            SettingValue::Str(s) => Some(s),
            SettingValue::Float(_) | SettingValue::Int(_) => None,
        }
    }
}

#[derive(Debug, Clone, Copy)]
enum Coercion {
    Str,
    Float,
    /// Parsed as float, truncated to integer — `"2.5"` reads as `2`.
    IntViaFloat,
}

fn coercion_for(option: &str) -> Coercion {
    match option {
        "gain" | "text.size" | "text.X" | "text.Y" => Coercion::Float,
        "delay" => Coercion::IntViaFloat,
        _ => Coercion::Str,
    }
}

type Sections = BTreeMap<String, BTreeMap<String, String>>;

/// One complete sectioned settings snapshot plus its remembered
/// persistence target.
///
/// `Clone` is a full deep copy — sections, options, and the target path —
/// which is exactly what the snapshot store's apply/revert needs. The
/// serialized form is the sections alone: one TOML table per section,
/// every value a string.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct Settings {
    #[serde(flatten)]
    sections: Sections,
    #[serde(skip)]
    target: Option<PathBuf>,
}

impl Settings {
    /// An empty slot with no persistence target.
    pub fn new() -> Self {
        Self::default()
    }

    /// Load from candidate files in order, later files overriding earlier
    /// ones per option.
    ///
    /// Best effort: unreadable or unparseable candidates are skipped with
    /// a warning, never an error. The persistence target becomes the last
    /// file actually read — or, when none was, the second candidate (the
    /// conventional user-writable location), falling back to the first
    /// when only one was given.
    pub fn load<P: AsRef<Path>>(paths: &[P]) -> Self {
        let mut settings = Settings::new();
        settings.target = match paths.len() {
            0 => None,
            1 => Some(paths[0].as_ref().to_path_buf()),
            _ => Some(paths[1].as_ref().to_path_buf()),
        };

        for path in paths {
            let path = path.as_ref();
            let Ok(text) = std::fs::read_to_string(path) else {
                tracing::debug!(path = %path.display(), "settings candidate absent, skipped");
                continue;
            };
            let parsed: Settings = match toml::from_str(&text) {
                Ok(parsed) => parsed,
                Err(e) => {
                    tracing::warn!(path = %path.display(), error = %e, "settings candidate unparseable, skipped");
                    continue;
                }
            };
            for (section, options) in parsed.sections {
                let slot = settings.sections.entry(section).or_default();
                for (option, value) in options {
                    slot.insert(option, value);
                }
            }
            settings.target = Some(path.to_path_buf());
            tracing::debug!(path = %path.display(), "settings loaded");
        }
        settings
    }

    /// Typed read. `Ok(None)` when the section or option is absent;
    /// `Err` only when a stored string fails its declared coercion.
    pub fn get(&self, section: &str, option: &str) -> Result<Option<SettingValue>, SettingsError> {
        let Some(raw) = self.sections.get(section).and_then(|s| s.get(option)) else {
            return Ok(None);
        };
        let coerce_err = |expected| SettingsError::Coerce {
            section: section.to_string(),
            option: option.to_string(),
            value: raw.clone(),
            expected,
        };
        let value = match coercion_for(option) {
            Coercion::Str => SettingValue::Str(raw.clone()),
            Coercion::Float => {
                SettingValue::Float(raw.trim().parse().map_err(|_| coerce_err("float"))?)
            }
            Coercion::IntViaFloat => {
                let f: f64 = raw.trim().parse().map_err(|_| coerce_err("int"))?;
                SettingValue::Int(f as i64)
            }
        };
        Ok(Some(value))
    }

    /// Float read with integer widening; absent or non-numeric → `None`.
    pub fn get_float(&self, section: &str, option: &str) -> Result<Option<f64>, SettingsError> {
        Ok(self.get(section, option)?.and_then(|v| v.as_float()))
    }

    /// Integer read; absent or non-integer → `None`.
    pub fn get_int(&self, section: &str, option: &str) -> Result<Option<i64>, SettingsError> {
        Ok(self.get(section, option)?.and_then(|v| v.as_int()))
    }

    /// String read; absent or non-string-typed → `None`. Never fails —
    /// string coercion is total.
    pub fn get_str(&self, section: &str, option: &str) -> Option<String> {
        match self.get(section, option) {
            Ok(Some(SettingValue::Str(s))) => Some(s),
            _ => None,
        }
    }

    /// Store the string form of `value`, creating the section on demand.
    pub fn set(&mut self, section: &str, option: &str, value: impl ToString) {
        self.sections
            .entry(section.to_string())
            .or_default()
            .insert(option.to_string(), value.to_string());
    }

    /// Raw string snapshot of one section; empty if absent.
    pub fn section_dict(&self, section: &str) -> BTreeMap<String, String> {
        self.sections.get(section).cloned().unwrap_or_default()
    }

    /// Whether a section exists.
    pub fn has_section(&self, section: &str) -> bool {
        self.sections.contains_key(section)
    }

    /// Overlay defaults keyed `"section:option"`, touching only sections
    /// that already exist — defaults never create a section.
    pub fn apply_defaults<K: AsRef<str>, V: AsRef<str>>(&mut self, defaults: &[(K, V)]) {
        for (key, value) in defaults {
            let key = key.as_ref();
            let Some((section, option)) = key.split_once(':') else {
                tracing::warn!(key, "default key is not section:option, dropped");
                continue;
            };
            match self.sections.get_mut(section) {
                Some(slot) => {
                    slot.insert(option.to_string(), value.as_ref().to_string());
                }
                None => {
                    tracing::debug!(section, option, "default for absent section, dropped");
                }
            }
        }
    }

    /// Write the full slot to `path`, or to the remembered target when
    /// `path` is `None`.
    ///
    /// Returns `Ok(false)` — no write happened — when neither is known.
    /// An explicit path becomes the new remembered target.
    pub fn save(&mut self, path: Option<&Path>) -> Result<bool, SettingsError> {
        let Some(path) = path.map(Path::to_path_buf).or_else(|| self.target.clone()) else {
            return Ok(false);
        };
        let text = toml::to_string_pretty(self)?;
        std::fs::write(&path, text).map_err(|e| SettingsError::write_file(&path, e))?;
        tracing::info!(path = %path.display(), "settings saved");
        self.target = Some(path);
        Ok(true)
    }

    /// The remembered persistence target.
    pub fn target(&self) -> Option<&Path> {
        self.target.as_deref()
    }
}
