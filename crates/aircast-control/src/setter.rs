//! One-shot property initialization.
//!
//! Used to push startup defaults into the graph before any channel
//! routing exists. The caller hands over a raw value without knowing the
//! property's type; an ordered list of candidate interpretations is tried
//! against the engine and the first accepted one wins.

use aircast_core::{MediaGraph, PropertyValue, TargetPath};

/// Candidate interpretations of a raw value, in trial order: the value
/// as given, its string form, float, integer via float truncation.
fn candidates(raw: &PropertyValue) -> Vec<PropertyValue> {
    let mut out = vec![raw.clone()];
    let display = raw.to_string();
    if !matches!(raw, PropertyValue::Str(_)) {
        out.push(PropertyValue::Str(display.clone()));
    }
    if let Ok(f) = display.trim().parse::<f64>() {
        if !matches!(raw, PropertyValue::Float(_)) {
            out.push(PropertyValue::Float(f));
        }
        if !matches!(raw, PropertyValue::Int(_)) {
            out.push(PropertyValue::Int(f as i64));
        }
    }
    out
}

/// Write `raw` to `element.property`, trying candidate interpretations in
/// order until the engine accepts one.
///
/// An absent element is a no-op; a value no interpretation of which the
/// property accepts is silently dropped (with a debug log). This mirrors
/// the routing tier's resilience: one-shot initialization must survive a
/// partially-available graph.
pub fn set_property(graph: &mut dyn MediaGraph, element: &str, property: &str, raw: &PropertyValue) {
    if !graph.has_element(element) {
        tracing::debug!(element, property, "absent element, set skipped");
        return;
    }
    let target = TargetPath::new(element, property);
    for candidate in candidates(raw) {
        if graph.set_property(&target, &candidate).is_ok() {
            tracing::debug!(%target, value = %candidate, "property set");
            return;
        }
    }
    tracing::debug!(%target, value = %raw, "no accepted interpretation, dropped");
}

#[cfg(test)]
mod tests {
    use super::*;
    use aircast_core::MediaEngine;
    use aircast_core::offline::{ElementSpec, OfflineEngine};

    fn graph() -> aircast_core::offline::OfflineGraph {
        OfflineEngine::new()
            .with_element(
                ElementSpec::new("overlay")
                    .with_property("text", "")
                    .with_property("xpos", 0.0)
                    .with_property("lines", 0i64),
            )
            .build_graph("overlay name=ov")
            .unwrap()
    }

    #[test]
    fn string_value_lands_in_string_property() {
        let mut g = graph();
        set_property(&mut g, "ov", "text", &PropertyValue::from("hello"));
        assert_eq!(
            g.property(&TargetPath::new("ov", "text")),
            Some(PropertyValue::from("hello"))
        );
    }

    #[test]
    fn numeric_string_coerces_into_float_property() {
        let mut g = graph();
        set_property(&mut g, "ov", "xpos", &PropertyValue::from("12.5"));
        assert_eq!(
            g.property(&TargetPath::new("ov", "xpos")),
            Some(PropertyValue::Float(12.5))
        );
    }

    #[test]
    fn numeric_string_truncates_into_int_property() {
        let mut g = graph();
        set_property(&mut g, "ov", "lines", &PropertyValue::from("3.9"));
        assert_eq!(
            g.property(&TargetPath::new("ov", "lines")),
            Some(PropertyValue::Int(3))
        );
    }

    #[test]
    fn float_value_renders_into_string_property() {
        let mut g = graph();
        set_property(&mut g, "ov", "text", &PropertyValue::Float(7.25));
        assert_eq!(
            g.property(&TargetPath::new("ov", "text")),
            Some(PropertyValue::from("7.25"))
        );
    }

    #[test]
    fn unconvertible_value_is_dropped() {
        let mut g = graph();
        set_property(&mut g, "ov", "xpos", &PropertyValue::from("wide"));
        assert_eq!(
            g.property(&TargetPath::new("ov", "xpos")),
            Some(PropertyValue::Float(0.0))
        );
    }

    #[test]
    fn absent_element_is_a_no_op() {
        let mut g = graph();
        set_property(&mut g, "ghost", "text", &PropertyValue::from("x"));
    }

    #[test]
    fn candidate_order_prefers_the_value_as_given() {
        let list = candidates(&PropertyValue::from("1.5"));
        assert_eq!(list[0], PropertyValue::from("1.5"));
        assert_eq!(list[1], PropertyValue::Float(1.5));
        assert_eq!(list[2], PropertyValue::Int(1));
    }
}
