//! Target classification and control routing.
//!
//! After the engine builds the graph, every `(element, property)` pair in
//! the control map is classified exactly once: **interpolated** if the
//! engine can drive the property continuously and its current value is a
//! float, **settable** otherwise. The classification is exclusive — a
//! target lands in one list, never both — and is never re-queried at
//! routing time.
//!
//! Routing is two-tier: a numeric control request on a channel with
//! interpolated targets becomes a ramp (reach the value at
//! `clock + duration`); everything else — non-numeric values, channels
//! without interpolated targets, scheduling failures, a missing clock —
//! degrades to immediate writes on the settable targets. Callers never
//! need to know which tier a channel resolved to.

use aircast_core::{ClockTime, InterpolationId, MediaGraph, PropertyValue, TargetPath};
use aircast_pipeline::ControlMap;

/// A target driven through an engine interpolation source.
#[derive(Debug)]
pub struct InterpolatedTarget {
    target: TargetPath,
    source: InterpolationId,
}

impl InterpolatedTarget {
    /// The bound property path.
    pub fn target(&self) -> &TargetPath {
        &self.target
    }

    /// The interpolation source driving it.
    pub fn source(&self) -> InterpolationId {
        self.source
    }
}

/// A target written immediately on every request.
#[derive(Debug)]
pub struct SettableTarget {
    target: TargetPath,
}

impl SettableTarget {
    /// The bound property path.
    pub fn target(&self) -> &TargetPath {
        &self.target
    }
}

/// All resolved targets of one channel.
#[derive(Debug)]
pub struct ChannelTargets {
    channel: String,
    interpolated: Vec<InterpolatedTarget>,
    settable: Vec<SettableTarget>,
}

impl ChannelTargets {
    /// Channel name.
    pub fn channel(&self) -> &str {
        &self.channel
    }

    /// Ramp-capable targets.
    pub fn interpolated(&self) -> &[InterpolatedTarget] {
        &self.interpolated
    }

    /// Immediate-write targets.
    pub fn settable(&self) -> &[SettableTarget] {
        &self.settable
    }
}

/// Per-channel target lists, computed once from a built graph.
#[derive(Debug, Default)]
pub struct ControlRegistry {
    channels: Vec<ChannelTargets>,
}

/// Resolve a raw property path against an element.
///
/// A `pad::property` path resolves to the named pad when the element has
/// one; otherwise the whole string falls back to an element property name.
fn resolve_path(graph: &dyn MediaGraph, element: &str, raw: &str) -> TargetPath {
    if let Some((pad, property)) = raw.split_once("::")
        && graph.has_pad(element, pad)
    {
        return TargetPath::on_pad(element, pad, property);
    }
    TargetPath::new(element, raw)
}

impl ControlRegistry {
    /// Classify every binding in `controls` against the built graph.
    ///
    /// Missing elements are skipped silently — a template may bind
    /// channels to optional elements that were compiled out. Pad targets
    /// are always settable (the interpolation facility is element-level).
    pub fn classify(graph: &mut dyn MediaGraph, controls: &ControlMap) -> Self {
        let mut channels = Vec::new();

        for bindings in controls.channels() {
            let mut interpolated = Vec::new();
            let mut settable = Vec::new();

            for element in &bindings.elements {
                if !graph.has_element(&element.element) {
                    tracing::debug!(
                        channel = %bindings.channel,
                        element = %element.element,
                        "absent element, bindings skipped"
                    );
                    continue;
                }
                for raw in &element.properties {
                    let target = resolve_path(graph, &element.element, raw);
                    if target.pad.is_none()
                        && graph.is_controllable(&target.element, &target.property)
                        && let Some(PropertyValue::Float(current)) = graph.property(&target)
                    {
                        match graph.create_interpolation(&target, current) {
                            Ok(source) => {
                                tracing::debug!(channel = %bindings.channel, %target, "interpolated target");
                                interpolated.push(InterpolatedTarget { target, source });
                                continue;
                            }
                            Err(e) => {
                                tracing::warn!(%target, error = %e, "interpolation refused, treating as settable");
                            }
                        }
                    }
                    tracing::debug!(channel = %bindings.channel, %target, "settable target");
                    settable.push(SettableTarget { target });
                }
            }

            if !interpolated.is_empty() || !settable.is_empty() {
                channels.push(ChannelTargets {
                    channel: bindings.channel.clone(),
                    interpolated,
                    settable,
                });
            }
        }

        ControlRegistry { channels }
    }

    /// Targets of one channel, if any resolved.
    pub fn channel(&self, name: &str) -> Option<&ChannelTargets> {
        self.channels.iter().find(|c| c.channel == name)
    }

    /// All channels with resolved targets, in control-map order.
    pub fn channels(&self) -> impl Iterator<Item = &ChannelTargets> {
        self.channels.iter()
    }

    /// Route a control request: ramp if possible, write if not.
    ///
    /// A zero `duration_secs` ramps "to now", which the engine applies
    /// immediately. Re-issuing a request for the same channel supersedes
    /// the previous ramp — last writer wins.
    pub fn set_control(
        &self,
        graph: &mut dyn MediaGraph,
        channel: &str,
        value: &PropertyValue,
        duration_secs: f64,
    ) {
        if self.try_interpolate(graph, channel, value, duration_secs) {
            return;
        }
        self.set_immediate(graph, channel, value);
    }

    /// Tier 1: schedule a ramp on every interpolated target.
    ///
    /// Returns false — caller falls through to immediate writes — when
    /// the channel has no interpolated targets, the value is not numeric,
    /// the graph has no clock, or any schedule call fails.
    fn try_interpolate(
        &self,
        graph: &mut dyn MediaGraph,
        channel: &str,
        value: &PropertyValue,
        duration_secs: f64,
    ) -> bool {
        let Some(targets) = self.channel(channel) else {
            return false;
        };
        if targets.interpolated.is_empty() {
            return false;
        }
        let Some(value) = value.as_float() else {
            return false;
        };
        let Some(now) = graph.clock_time() else {
            tracing::debug!(channel, "no clock, falling back to immediate writes");
            return false;
        };

        let at = now + ClockTime::from_secs_f64(duration_secs);
        let mut scheduled = true;
        for target in &targets.interpolated {
            match graph.schedule(target.source, at, value) {
                Ok(()) => {
                    tracing::debug!(channel, target = %target.target, value, at = at.nanos(), "ramp scheduled");
                }
                Err(e) => {
                    tracing::warn!(channel, target = %target.target, error = %e, "schedule failed");
                    scheduled = false;
                }
            }
        }
        scheduled
    }

    /// Tier 2: write the value to every settable target, ignoring the
    /// duration. Absent elements and rejected writes are no-ops.
    fn set_immediate(&self, graph: &mut dyn MediaGraph, channel: &str, value: &PropertyValue) {
        let Some(targets) = self.channel(channel) else {
            return;
        };
        for target in &targets.settable {
            match graph.set_property(&target.target, value) {
                Ok(()) => {
                    tracing::debug!(channel, target = %target.target, %value, "written");
                }
                Err(e) => {
                    tracing::debug!(channel, target = %target.target, error = %e, "write skipped");
                }
            }
        }
    }
}
