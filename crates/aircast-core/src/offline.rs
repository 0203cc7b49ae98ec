//! In-memory media engine.
//!
//! [`OfflineEngine`] implements [`MediaEngine`] against plain property
//! bags instead of a media stack: element types are declared up front as
//! [`ElementSpec`]s, [`build_graph`](MediaEngine::build_graph) parses a
//! cleaned template into named elements, and the resulting
//! [`OfflineGraph`] records every interpolation schedule and posted event
//! where tests (and headless tools) can observe them.
//!
//! The clock is manual: it starts when the graph goes to
//! [`GraphState::Playing`] and can be moved or removed with
//! [`OfflineGraph::set_clock`].

use std::collections::{BTreeMap, BTreeSet, HashMap};

use crate::graph::{
    EngineError, EventKind, GraphState, InterpolationId, MediaEngine, MediaGraph, TargetPath,
};
use crate::time::ClockTime;
use crate::value::PropertyValue;

/// Declares one property of an offline element type.
#[derive(Debug, Clone)]
pub struct PropertySpec {
    /// Property name.
    pub name: String,
    /// Default value; also fixes the property's type.
    pub default: PropertyValue,
    /// Whether the engine can drive this property continuously.
    pub controllable: bool,
}

/// Declares one pad of an offline element type.
#[derive(Debug, Clone)]
pub struct PadSpec {
    /// Pad name.
    pub name: String,
    /// Properties exposed on the pad.
    pub properties: Vec<PropertySpec>,
}

impl PadSpec {
    /// A pad with no properties.
    pub fn new(name: impl Into<String>) -> Self {
        PadSpec {
            name: name.into(),
            properties: Vec::new(),
        }
    }

    /// Add a pad property (builder style).
    pub fn with_property(mut self, name: impl Into<String>, default: impl Into<PropertyValue>) -> Self {
        self.properties.push(PropertySpec {
            name: name.into(),
            default: default.into(),
            controllable: false,
        });
        self
    }
}

/// Declares an element type the offline engine can instantiate.
#[derive(Debug, Clone)]
pub struct ElementSpec {
    /// Type token as it appears in templates.
    pub type_name: String,
    /// Element properties.
    pub properties: Vec<PropertySpec>,
    /// Pads.
    pub pads: Vec<PadSpec>,
}

impl ElementSpec {
    /// A spec with no properties or pads.
    pub fn new(type_name: impl Into<String>) -> Self {
        ElementSpec {
            type_name: type_name.into(),
            properties: Vec::new(),
            pads: Vec::new(),
        }
    }

    /// Add a plain (write-only) property.
    pub fn with_property(mut self, name: impl Into<String>, default: impl Into<PropertyValue>) -> Self {
        self.properties.push(PropertySpec {
            name: name.into(),
            default: default.into(),
            controllable: false,
        });
        self
    }

    /// Add a continuously controllable property.
    pub fn with_controllable(
        mut self,
        name: impl Into<String>,
        default: impl Into<PropertyValue>,
    ) -> Self {
        self.properties.push(PropertySpec {
            name: name.into(),
            default: default.into(),
            controllable: true,
        });
        self
    }

    /// Add a pad.
    pub fn with_pad(mut self, pad: PadSpec) -> Self {
        self.pads.push(pad);
        self
    }
}

/// Engine that builds [`OfflineGraph`]s from registered element specs.
#[derive(Debug, Default)]
pub struct OfflineEngine {
    specs: HashMap<String, ElementSpec>,
}

impl OfflineEngine {
    /// An engine with no element types registered.
    pub fn new() -> Self {
        Self::default()
    }

    /// Register an element type (builder style).
    pub fn with_element(mut self, spec: ElementSpec) -> Self {
        self.register(spec);
        self
    }

    /// Register an element type.
    pub fn register(&mut self, spec: ElementSpec) {
        self.specs.insert(spec.type_name.clone(), spec);
    }
}

#[derive(Debug)]
struct OfflineElement {
    properties: BTreeMap<String, PropertyValue>,
    controllable: BTreeSet<String>,
    pads: BTreeMap<String, BTreeMap<String, PropertyValue>>,
    /// Explicit per-element state; `None` means "follows the graph".
    state_override: Option<GraphState>,
}

#[derive(Debug)]
struct Interpolation {
    target: TargetPath,
    points: Vec<(ClockTime, f64)>,
}

/// A built offline graph. See the module docs for the observation API.
#[derive(Debug, Default)]
pub struct OfflineGraph {
    elements: BTreeMap<String, OfflineElement>,
    interpolations: Vec<Interpolation>,
    clock: Option<ClockTime>,
    state: GraphState,
    events: Vec<EventKind>,
    element_events: Vec<(String, EventKind)>,
}

/// Coerce a template literal to the declared type of a property.
fn coerce_literal(declared: &PropertyValue, raw: &str) -> Result<PropertyValue, String> {
    match declared {
        PropertyValue::Float(_) => raw
            .parse::<f64>()
            .map(PropertyValue::Float)
            .map_err(|_| format!("'{raw}' is not a float")),
        PropertyValue::Int(_) => raw
            .parse::<i64>()
            .map(PropertyValue::Int)
            .map_err(|_| format!("'{raw}' is not an integer")),
        PropertyValue::Bool(_) => match raw {
            "true" | "1" => Ok(PropertyValue::Bool(true)),
            "false" | "0" => Ok(PropertyValue::Bool(false)),
            _ => Err(format!("'{raw}' is not a boolean")),
        },
        PropertyValue::Str(_) => Ok(PropertyValue::Str(raw.to_string())),
    }
}

impl MediaEngine for OfflineEngine {
    type Graph = OfflineGraph;

    fn build_graph(&self, description: &str) -> Result<OfflineGraph, EngineError> {
        let mut graph = OfflineGraph::default();

        for chunk in description.split('!') {
            let mut tokens = chunk.split_whitespace();
            let Some(type_name) = tokens.next() else {
                continue;
            };
            let spec = self
                .specs
                .get(type_name)
                .ok_or_else(|| EngineError::Build(format!("no such element type '{type_name}'")))?;

            let mut properties: BTreeMap<String, PropertyValue> = spec
                .properties
                .iter()
                .map(|p| (p.name.clone(), p.default.clone()))
                .collect();
            let controllable: BTreeSet<String> = spec
                .properties
                .iter()
                .filter(|p| p.controllable)
                .map(|p| p.name.clone())
                .collect();
            let pads: BTreeMap<String, BTreeMap<String, PropertyValue>> = spec
                .pads
                .iter()
                .map(|pad| {
                    let bag = pad
                        .properties
                        .iter()
                        .map(|p| (p.name.clone(), p.default.clone()))
                        .collect();
                    (pad.name.clone(), bag)
                })
                .collect();

            let mut name: Option<String> = None;
            for token in tokens {
                let Some((key, value)) = token.split_once('=') else {
                    return Err(EngineError::Build(format!(
                        "expected key=value, got '{token}' in '{type_name}'"
                    )));
                };
                if key == "name" {
                    name = Some(value.to_string());
                    continue;
                }
                let declared = properties.get(key).ok_or_else(|| {
                    EngineError::Build(format!("element '{type_name}' has no property '{key}'"))
                })?;
                let coerced = coerce_literal(declared, value).map_err(|e| {
                    EngineError::Build(format!("property '{key}' on '{type_name}': {e}"))
                })?;
                properties.insert(key.to_string(), coerced);
            }

            let name = name.unwrap_or_else(|| type_name.to_string());
            if graph.elements.contains_key(&name) {
                return Err(EngineError::Build(format!("duplicate element name '{name}'")));
            }
            tracing::debug!(element = %name, type_name, "offline_build: element");
            graph.elements.insert(
                name,
                OfflineElement {
                    properties,
                    controllable,
                    pads,
                    state_override: None,
                },
            );
        }

        if graph.elements.is_empty() {
            return Err(EngineError::Build("empty graph description".to_string()));
        }
        Ok(graph)
    }
}

impl OfflineGraph {
    fn bag(&self, target: &TargetPath) -> Option<&BTreeMap<String, PropertyValue>> {
        let element = self.elements.get(&target.element)?;
        match &target.pad {
            Some(pad) => element.pads.get(pad),
            None => Some(&element.properties),
        }
    }

    fn bag_mut(&mut self, target: &TargetPath) -> Result<&mut BTreeMap<String, PropertyValue>, EngineError> {
        let element = self
            .elements
            .get_mut(&target.element)
            .ok_or_else(|| EngineError::NoSuchElement {
                element: target.element.clone(),
            })?;
        match &target.pad {
            Some(pad) => element.pads.get_mut(pad).ok_or_else(|| EngineError::NoSuchPad {
                element: target.element.clone(),
                pad: pad.clone(),
            }),
            None => Ok(&mut element.properties),
        }
    }

    /// Move, start, or remove the clock.
    pub fn set_clock(&mut self, clock: Option<ClockTime>) {
        self.clock = clock;
    }

    /// Scheduled control points of an interpolation source, in schedule
    /// order, including the seed point at offset zero.
    pub fn scheduled_points(&self, source: InterpolationId) -> Option<&[(ClockTime, f64)]> {
        self.interpolations
            .get(source.0 as usize)
            .map(|i| i.points.as_slice())
    }

    /// The target an interpolation source is bound to.
    pub fn interpolation_target(&self, source: InterpolationId) -> Option<&TargetPath> {
        self.interpolations.get(source.0 as usize).map(|i| &i.target)
    }

    /// Number of interpolation sources created on this graph.
    pub fn interpolation_count(&self) -> usize {
        self.interpolations.len()
    }

    /// Current graph state.
    pub fn state(&self) -> GraphState {
        self.state
    }

    /// Effective state of one element (its override, else the graph
    /// state). `None` if the element is absent.
    pub fn element_state(&self, element: &str) -> Option<GraphState> {
        self.elements
            .get(element)
            .map(|e| e.state_override.unwrap_or(self.state))
    }

    /// Events posted to the whole graph, in order.
    pub fn events(&self) -> &[EventKind] {
        &self.events
    }

    /// Events posted to single elements, in order.
    pub fn element_events(&self) -> &[(String, EventKind)] {
        &self.element_events
    }

    /// Names of all elements, in lexical order.
    pub fn element_names(&self) -> impl Iterator<Item = &str> {
        self.elements.keys().map(String::as_str)
    }
}

impl MediaGraph for OfflineGraph {
    fn has_element(&self, name: &str) -> bool {
        self.elements.contains_key(name)
    }

    fn has_pad(&self, element: &str, pad: &str) -> bool {
        self.elements
            .get(element)
            .is_some_and(|e| e.pads.contains_key(pad))
    }

    fn property(&self, target: &TargetPath) -> Option<PropertyValue> {
        self.bag(target)?.get(&target.property).cloned()
    }

    fn set_property(
        &mut self,
        target: &TargetPath,
        value: &PropertyValue,
    ) -> Result<(), EngineError> {
        let element = target.element.clone();
        let property = target.property.clone();
        let bag = self.bag_mut(target)?;
        let declared = bag.get(&property).ok_or_else(|| EngineError::NoSuchProperty {
            element: element.clone(),
            property: property.clone(),
        })?;
        let stored = match (declared, value) {
            (PropertyValue::Float(_), PropertyValue::Float(_))
            | (PropertyValue::Int(_), PropertyValue::Int(_))
            | (PropertyValue::Bool(_), PropertyValue::Bool(_))
            | (PropertyValue::Str(_), PropertyValue::Str(_)) => value.clone(),
            // Ints widen into float properties, nothing else converts.
            (PropertyValue::Float(_), PropertyValue::Int(i)) => PropertyValue::Float(*i as f64),
            (declared, got) => {
                return Err(EngineError::TypeMismatch {
                    element,
                    property,
                    expected: declared.type_name(),
                    got: got.type_name(),
                });
            }
        };
        bag.insert(property, stored);
        Ok(())
    }

    fn is_controllable(&self, element: &str, property: &str) -> bool {
        self.elements
            .get(element)
            .is_some_and(|e| e.controllable.contains(property))
    }

    fn create_interpolation(
        &mut self,
        target: &TargetPath,
        initial: f64,
    ) -> Result<InterpolationId, EngineError> {
        if !self.has_element(&target.element) {
            return Err(EngineError::NoSuchElement {
                element: target.element.clone(),
            });
        }
        if target.pad.is_some() || !self.is_controllable(&target.element, &target.property) {
            return Err(EngineError::NotControllable {
                element: target.element.clone(),
                property: target.property.clone(),
            });
        }
        let id = InterpolationId(self.interpolations.len() as u32);
        self.interpolations.push(Interpolation {
            target: target.clone(),
            points: vec![(ClockTime::ZERO, initial)],
        });
        Ok(id)
    }

    fn schedule(
        &mut self,
        source: InterpolationId,
        at: ClockTime,
        value: f64,
    ) -> Result<(), EngineError> {
        let interpolation = self
            .interpolations
            .get_mut(source.0 as usize)
            .ok_or(EngineError::UnknownInterpolation(source.0))?;
        tracing::debug!(target = %interpolation.target, at = at.nanos(), value, "offline_schedule");
        interpolation.points.push((at, value));
        Ok(())
    }

    fn clock_time(&self) -> Option<ClockTime> {
        self.clock
    }

    fn set_state(&mut self, state: GraphState) {
        self.state = state;
        if state == GraphState::Playing && self.clock.is_none() {
            self.clock = Some(ClockTime::ZERO);
        }
    }

    fn element_set_state(&mut self, element: &str, state: GraphState) -> bool {
        match self.elements.get_mut(element) {
            Some(e) => {
                e.state_override = Some(state);
                true
            }
            None => false,
        }
    }

    fn sync_element_state(&mut self, element: &str) -> bool {
        match self.elements.get_mut(element) {
            Some(e) => {
                e.state_override = None;
                true
            }
            None => false,
        }
    }

    fn post_event(&mut self, event: EventKind) {
        self.events.push(event);
    }

    fn element_post_event(&mut self, element: &str, event: EventKind) -> bool {
        if self.elements.contains_key(element) {
            self.element_events.push((element.to_string(), event));
            true
        } else {
            false
        }
    }
}
