//! The operator façade.
//!
//! [`Console::start`] wires the whole control plane together: load
//! settings, expand and parse the pipeline template, build the graph,
//! classify control targets, seed the event router, drive startup
//! defaults. The methods below are the surface the UI layer calls —
//! everything routes through control channels, so the UI never touches
//! the graph directly.
//!
//! Audio gain travels as dB on this surface and is converted to a linear
//! factor before routing; delays travel as milliseconds and are clamped
//! and converted to the engine's units here.

use std::collections::HashMap;
use std::path::PathBuf;

use aircast_config::{SettingValue, SettingsStore};
use aircast_control::{
    ControlRegistry, EventRouter, FieldHandlerUpdate, HandlerUpdate, set_property,
};
use aircast_core::{
    BusMessage, EventKind, GraphState, MediaEngine, MediaGraph, PropertyValue,
};
use aircast_pipeline::{control_file_for, parse_template, read_control_file, read_template};

use crate::error::ConsoleError;

/// dB → linear factor exponent base: `exp(ln(10)/20 · dB) = 10^(dB/20)`.
const DB: f64 = std::f64::consts::LN_10 / 20.0;

/// Gain values at or below this floor mute outright.
const GAIN_FLOOR_DB: f64 = -100.0;

/// Delay clamp range, milliseconds.
const MAX_DELAY_MS: i64 = 1000;

/// The element name the record control drives.
const RECORDER: &str = "recorder";

/// Text overlay identifiers with persisted font and position settings.
const TEXT_IDS: [&str; 3] = ["piece", "composer", "interpret"];

fn gain_factor(db: f64) -> f64 {
    if db > GAIN_FLOOR_DB { (DB * db).exp() } else { 0.0 }
}

/// Everything [`Console::start`] needs besides the engine.
#[derive(Debug, Clone)]
pub struct ConsoleOptions {
    /// Settings candidates, earliest first (see `Settings::load`).
    pub config_paths: Vec<PathBuf>,
    /// Defaults keyed `"section:option"`, applied to existing sections.
    pub config_defaults: Vec<(String, String)>,
    /// Macro values overlaid on the settings' `[pipeline]` section.
    pub macro_overrides: HashMap<String, String>,
    /// Startup values keyed `"element.property"`, driven through both the
    /// channel router and the one-shot setter.
    pub pipe_defaults: Vec<(String, PropertyValue)>,
    /// Template path used when the `stream.pipeline` setting is absent.
    pub fallback_template: PathBuf,
}

impl ConsoleOptions {
    /// Options with only the fallback template set.
    pub fn new(fallback_template: impl Into<PathBuf>) -> Self {
        ConsoleOptions {
            config_paths: Vec::new(),
            config_defaults: Vec::new(),
            macro_overrides: HashMap::new(),
            pipe_defaults: Vec::new(),
            fallback_template: fallback_template.into(),
        }
    }

    /// Append a settings candidate file.
    pub fn with_config_path(mut self, path: impl Into<PathBuf>) -> Self {
        self.config_paths.push(path.into());
        self
    }

    /// Append a `"section:option"` default.
    pub fn with_config_default(mut self, key: impl Into<String>, value: impl Into<String>) -> Self {
        self.config_defaults.push((key.into(), value.into()));
        self
    }

    /// Set a macro value, overriding the `[pipeline]` section.
    pub fn with_macro(mut self, key: impl Into<String>, value: impl Into<String>) -> Self {
        self.macro_overrides.insert(key.into(), value.into());
        self
    }

    /// Append an `"element.property"` startup value.
    pub fn with_pipe_default(
        mut self,
        key: impl Into<String>,
        value: impl Into<PropertyValue>,
    ) -> Self {
        self.pipe_defaults.push((key.into(), value.into()));
        self
    }
}

/// The live console: settings snapshots, the built graph, the control
/// registry, and the event router, behind an operator-shaped API.
pub struct Console<G: MediaGraph> {
    store: SettingsStore,
    graph: G,
    registry: ControlRegistry,
    events: EventRouter,
}

impl<G: MediaGraph> std::fmt::Debug for Console<G> {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Console").finish_non_exhaustive()
    }
}

impl<G: MediaGraph> Console<G> {
    /// Build the whole control plane and bring the graph up (in
    /// [`GraphState::Null`]; call [`run`](Self::run) to go live).
    ///
    /// # Errors
    ///
    /// Propagates template read/parse failures and engine build failures;
    /// settings candidates and control side-cars are best-effort.
    pub fn start<E>(engine: &E, options: ConsoleOptions) -> Result<Self, ConsoleError>
    where
        E: MediaEngine<Graph = G>,
    {
        let store = SettingsStore::load(&options.config_paths, &options.config_defaults);

        // Macro values: the [pipeline] section, keys uppercased, under
        // caller overrides.
        let mut macros: HashMap<String, String> = store
            .active()
            .section_dict("pipeline")
            .into_iter()
            .map(|(k, v)| (k.to_uppercase(), v))
            .collect();
        macros.extend(options.macro_overrides.clone());

        let template_path = store
            .active()
            .get_str("stream", "pipeline")
            .map(PathBuf::from)
            .unwrap_or_else(|| options.fallback_template.clone());
        tracing::info!(path = %template_path.display(), "loading pipeline template");

        let text = read_template(&template_path, &macros)?;
        let parsed = parse_template(&text)?;

        let mut controls = parsed.controls.clone();
        if let Some(side_car) = control_file_for(&template_path)
            && let Some(extra) = read_control_file(&side_car)
        {
            tracing::info!(path = %side_car.display(), channels = extra.len(), "control side-car loaded");
            controls.merge(&extra);
        }

        let mut graph = engine.build_graph(&parsed.cleaned())?;
        let registry = ControlRegistry::classify(&mut graph, &controls);
        let events = EventRouter::new();

        let mut console = Console {
            store,
            graph,
            registry,
            events,
        };

        for (key, value) in &options.pipe_defaults {
            console
                .registry
                .set_control(&mut console.graph, key, value, 0.0);
            match key.split_once('.') {
                Some((element, property)) => {
                    set_property(&mut console.graph, element, property, value);
                }
                None => {
                    tracing::warn!(key, "pipe default is not element.property, setter skipped");
                }
            }
        }
        console.show_text(false);

        Ok(console)
    }

    // --- control surface ---

    /// Route a raw control request (see `ControlRegistry::set_control`).
    pub fn set_control(
        &mut self,
        channel: &str,
        value: impl Into<PropertyValue>,
        duration_secs: f64,
    ) {
        self.registry
            .set_control(&mut self.graph, channel, &value.into(), duration_secs);
    }

    /// One-shot property write with candidate coercion.
    pub fn set_property(&mut self, element: &str, property: &str, value: impl Into<PropertyValue>) {
        set_property(&mut self.graph, element, property, &value.into());
    }

    /// Set the audio gain in dB. Values at or below −100 dB mute; the
    /// routed value is the linear factor `10^(dB/20)`.
    pub fn set_a_gain(&mut self, db: f64) {
        tracing::debug!(db, "audio gain");
        self.store.active_mut().set("audio", "gain", db);
        self.set_control("audio.gain", gain_factor(db), 0.0);
    }

    /// Set the audio delay in milliseconds, clamped to `0..=1000`,
    /// routed in nanoseconds.
    pub fn set_a_delay(&mut self, ms: i64) {
        let ms = ms.clamp(0, MAX_DELAY_MS);
        tracing::debug!(ms, "audio delay");
        self.store.active_mut().set("audio", "delay", ms);
        self.set_control("audio.delay", ms * 1_000_000, 0.0);
    }

    /// Set the video delay in milliseconds, clamped to `0..=1000`,
    /// routed in the video queue's 10 µs units.
    pub fn set_v_delay(&mut self, ms: i64) {
        let ms = ms.clamp(0, MAX_DELAY_MS);
        tracing::debug!(ms, "video delay");
        self.store.active_mut().set("video", "delay", ms);
        self.set_control("video.delay", ms * 10_000, 0.0);
    }

    /// Set an overlay's font face and size, routed as one "face size"
    /// description on `font.<id>`.
    pub fn set_text_font(&mut self, id: &str, face: &str, size: f64) {
        let desc = format!("{face} {size}");
        tracing::debug!(id, desc, "overlay font");
        self.store.active_mut().set(id, "text.face", face);
        self.store.active_mut().set(id, "text.size", size);
        self.set_control(&format!("font.{id}"), desc, 0.0);
    }

    /// Set an overlay's vertical position, routed on `posY.<id>`.
    pub fn set_text_position(&mut self, id: &str, y: f64) {
        tracing::debug!(id, y, "overlay position");
        self.store.active_mut().set(id, "text.Y", y);
        self.set_control(&format!("posY.{id}"), y, 0.0);
    }

    /// Set an overlay's text on `text.<id>`. Not persisted — text comes
    /// from the running show, not the settings.
    pub fn set_text(&mut self, id: &str, text: &str) {
        self.set_control(&format!("text.{id}"), text, 0.0);
    }

    /// Show or hide all text overlays via the `text.hide` channel.
    pub fn show_text(&mut self, visible: bool) {
        self.set_control("text.hide", !visible, 0.0);
    }

    /// Fade the video feed in or out over one second; audio follows
    /// immediately (it is just a gain).
    pub fn show_video(&mut self, visible: bool) {
        let level = if visible { 1.0 } else { 0.0 };
        tracing::debug!(visible, level, "show video");
        self.set_control("video.mute", level, 1.0);
        self.set_control("audio.mute", level, 0.0);
    }

    // --- settings surface ---

    /// Stored audio gain in dB.
    pub fn a_gain(&self) -> Result<Option<f64>, ConsoleError> {
        Ok(self.store.active().get_float("audio", "gain")?)
    }

    /// Stored audio delay in milliseconds.
    pub fn a_delay(&self) -> Result<Option<i64>, ConsoleError> {
        Ok(self.store.active().get_int("audio", "delay")?)
    }

    /// Stored video delay in milliseconds.
    pub fn v_delay(&self) -> Result<Option<i64>, ConsoleError> {
        Ok(self.store.active().get_int("video", "delay")?)
    }

    /// Stored font face and size of an overlay.
    pub fn text_font(&self, id: &str) -> Result<(Option<String>, Option<f64>), ConsoleError> {
        let face = self.store.active().get_str(id, "text.face");
        let size = self.store.active().get_float(id, "text.size")?;
        Ok((face, size))
    }

    /// Stored vertical position of an overlay.
    pub fn text_position(&self, id: &str) -> Result<Option<f64>, ConsoleError> {
        Ok(self.store.active().get_float(id, "text.Y")?)
    }

    /// Arbitrary typed setting read.
    pub fn config(&self, section: &str, option: &str) -> Result<Option<SettingValue>, ConsoleError> {
        let value = self.store.active().get(section, option)?;
        tracing::debug!(section, option, ?value, "config read");
        Ok(value)
    }

    /// Commit the operator's edits: active settings become the backup.
    pub fn apply(&mut self) {
        self.store.apply();
    }

    /// Roll back to the last applied settings and re-drive every output
    /// that depends on them: gain, delay, and the overlay fonts and
    /// positions.
    pub fn revert(&mut self) -> Result<(), ConsoleError> {
        self.store.revert();

        if let Some(gain) = self.store.active().get_float("audio", "gain")? {
            self.set_a_gain(gain);
        }
        if let Some(delay) = self.store.active().get_int("audio", "delay")? {
            self.set_a_delay(delay);
        }
        for id in TEXT_IDS {
            let face = self.store.active().get_str(id, "text.face");
            let size = self.store.active().get_float(id, "text.size")?;
            if let (Some(face), Some(size)) = (face, size) {
                self.set_text_font(id, &face, size);
            }
            if let Some(y) = self.store.active().get_float(id, "text.Y")? {
                self.set_text_position(id, y);
            }
        }
        Ok(())
    }

    // --- transport ---

    /// Go live (`true`) or drop back to ready (`false`).
    pub fn run(&mut self, live: bool) {
        self.graph.set_state(if live {
            GraphState::Playing
        } else {
            GraphState::Ready
        });
    }

    /// Pause or resume the whole graph, or one element. For an element,
    /// resuming re-aligns it with the graph state. Returns false if the
    /// element is absent.
    pub fn pause(&mut self, paused: bool, element: Option<&str>) -> bool {
        match element {
            None => {
                self.graph.set_state(if paused {
                    GraphState::Paused
                } else {
                    GraphState::Playing
                });
                true
            }
            Some(name) => {
                if paused {
                    self.graph.element_set_state(name, GraphState::Paused)
                } else {
                    self.graph.sync_element_state(name)
                }
            }
        }
    }

    /// Pause or resume the element named `stream`.
    pub fn stream_pause(&mut self, paused: bool) -> bool {
        self.pause(paused, Some("stream"))
    }

    /// Start recording to `filename`, or stop when `None`. Drives the
    /// element named `recorder`; returns false when the pipeline has
    /// none.
    pub fn record(&mut self, filename: Option<&str>) -> bool {
        if !self.graph.has_element(RECORDER) {
            tracing::warn!("no recorder element in this pipeline");
            return false;
        }
        match filename {
            Some(filename) => {
                tracing::info!(filename, "recording started");
                set_property(
                    &mut self.graph,
                    RECORDER,
                    "location",
                    &PropertyValue::from(filename),
                );
                self.graph.element_set_state(RECORDER, GraphState::Playing)
            }
            None => {
                tracing::info!("recording stopped");
                self.graph.element_post_event(RECORDER, EventKind::Eos);
                self.graph.element_set_state(RECORDER, GraphState::Paused)
            }
        }
    }

    /// Post end-of-stream to the whole graph.
    pub fn end_of_stream(&mut self) {
        tracing::info!("posting end of stream");
        self.graph.post_event(EventKind::Eos);
    }

    /// Persist the active settings and leave the live state.
    pub fn teardown(&mut self) -> Result<(), ConsoleError> {
        self.store.save()?;
        self.graph.set_state(GraphState::Ready);
        Ok(())
    }

    // --- events ---

    /// Dispatch one bus message. Returns whether the engine's watch
    /// should stay installed.
    pub fn handle_message(&mut self, msg: &BusMessage) -> bool {
        self.events.dispatch(&mut self.graph, msg)
    }

    /// Merge or reset kind handlers (see [`EventRouter`]).
    pub fn register_handlers(&mut self, update: HandlerUpdate) {
        self.events.register_handlers(update);
    }

    /// Merge or reset structured field handlers.
    pub fn register_field_handlers(&mut self, update: FieldHandlerUpdate) {
        self.events.register_field_handlers(update);
    }

    // --- introspection ---

    /// The live graph.
    pub fn graph(&self) -> &G {
        &self.graph
    }

    /// The live graph, writable — the engine side of the seam.
    pub fn graph_mut(&mut self) -> &mut G {
        &mut self.graph
    }

    /// The classified control targets.
    pub fn registry(&self) -> &ControlRegistry {
        &self.registry
    }

    /// The settings snapshots.
    pub fn settings(&self) -> &SettingsStore {
        &self.store
    }
}
