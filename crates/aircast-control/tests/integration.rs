//! End-to-end control routing: template text → parse → offline build →
//! classify → route.

use aircast_control::ControlRegistry;
use aircast_core::offline::{ElementSpec, OfflineEngine, OfflineGraph};
use aircast_core::{ClockTime, GraphState, MediaEngine, MediaGraph, PropertyValue, TargetPath};
use aircast_pipeline::parse_template;

fn engine() -> OfflineEngine {
    OfflineEngine::new()
        .with_element(ElementSpec::new("avsrc"))
        .with_element(ElementSpec::new("amplifier").with_controllable("amplification", 1.0))
        .with_element(
            ElementSpec::new("titleoverlay")
                .with_property("text", "")
                .with_property("ypos", 0.9),
        )
        .with_element(ElementSpec::new("avsink"))
}

fn build(template: &str) -> (OfflineGraph, ControlRegistry) {
    let parsed = parse_template(template).unwrap();
    let mut graph = engine().build_graph(&parsed.cleaned()).unwrap();
    let registry = ControlRegistry::classify(&mut graph, &parsed.controls);
    (graph, registry)
}

/// A channel whose sole target is interpolable schedules the value to be
/// reached `duration` after the current engine time — it does not write
/// the property.
#[test]
fn interpolable_channel_ramps() {
    let (mut graph, registry) =
        build("avsrc ! amplifier amplification[X]=1.0 ! avsink");
    graph.set_state(GraphState::Playing);
    graph.set_clock(Some(ClockTime::from_secs_f64(30.0)));

    registry.set_control(&mut graph, "X", &PropertyValue::Float(50.0), 2.0);

    let source = registry.channel("X").unwrap().interpolated()[0].source();
    let points = graph.scheduled_points(source).unwrap();
    assert_eq!(points.last(), Some(&(ClockTime::from_secs_f64(32.0), 50.0)));
    assert_eq!(
        graph.property(&TargetPath::new("amplifier_0", "amplification")),
        Some(PropertyValue::Float(1.0))
    );
}

/// The same call against a non-interpolable channel writes immediately,
/// ignoring the duration.
#[test]
fn non_interpolable_channel_writes_immediately() {
    let (mut graph, registry) = build("avsrc ! titleoverlay ypos[X]=0.9 ! avsink");
    graph.set_state(GraphState::Playing);

    registry.set_control(&mut graph, "X", &PropertyValue::Float(50.0), 2.0);

    assert_eq!(
        graph.property(&TargetPath::new("titleoverlay_0", "ypos")),
        Some(PropertyValue::Float(50.0))
    );
    assert_eq!(graph.interpolation_count(), 0);
}

/// One channel fanning out to several elements drives all of them.
#[test]
fn channel_fans_out_across_elements() {
    let (mut graph, registry) = build(
        "titleoverlay name=title text[TXT]=a ! titleoverlay name=shadow text[TXT]=a",
    );
    registry.set_control(&mut graph, "TXT", &PropertyValue::from("live"), 0.0);

    for element in ["title", "shadow"] {
        assert_eq!(
            graph.property(&TargetPath::new(element, "text")),
            Some(PropertyValue::from("live"))
        );
    }
}

/// Re-issuing a request supersedes the previous ramp: both schedules are
/// recorded against the same source, last writer wins at the engine.
#[test]
fn reissued_ramp_supersedes() {
    let (mut graph, registry) = build("amplifier amplification[GAIN]=1.0");
    graph.set_clock(Some(ClockTime::ZERO));

    registry.set_control(&mut graph, "GAIN", &PropertyValue::Float(0.0), 5.0);
    registry.set_control(&mut graph, "GAIN", &PropertyValue::Float(2.0), 1.0);

    let source = registry.channel("GAIN").unwrap().interpolated()[0].source();
    let points = graph.scheduled_points(source).unwrap();
    assert_eq!(points.len(), 3);
    assert_eq!(points[2], (ClockTime::from_secs_f64(1.0), 2.0));
}
