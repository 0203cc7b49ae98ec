//! Template parsing and control-annotation extraction.
//!
//! A template is a `!`-separated sequence of element chunks. The first
//! whitespace-delimited token of a chunk is the element type; the rest are
//! `key=value` (or bare `key`) assignments. A key may carry a bracketed
//! control annotation, `prop[CHANNEL]`, which binds that property to the
//! named channel and is stripped from the cleaned output:
//!
//! ```text
//! src ! overlay xpos[X]=0 ! sink
//! ```
//!
//! cleans to `src name=src_0 ! overlay xpos=0 name=overlay_0 ! sink
//! name=sink_0` with channel `X` bound to `overlay_0.xpos`. Every element
//! ends up with an explicit `name=` — either the one written in the
//! template or a synthesized `type_N` — because the control map refers to
//! elements by name and the cleaned text is what the engine builds from.
//!
//! Known limitation carried over from the format: values cannot contain
//! whitespace (there is no quoting).

use std::collections::HashSet;

use crate::control_map::ControlMap;
use crate::error::TemplateError;

/// One parsed element: type, resolved name, ordered assignments.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ElementDescriptor {
    /// Element type token.
    pub type_name: String,
    /// Resolved unique name (explicit `name=` value or synthesized).
    pub name: String,
    /// Assignments in source order, annotation brackets stripped. A `None`
    /// value is a bare key. Includes the `name=` assignment.
    pub assignments: Vec<(String, Option<String>)>,
}

impl ElementDescriptor {
    /// Render this element as a cleaned chunk.
    fn render(&self) -> String {
        let mut out = self.type_name.clone();
        for (key, value) in &self.assignments {
            out.push(' ');
            out.push_str(key);
            if let Some(value) = value {
                out.push('=');
                out.push_str(value);
            }
        }
        out
    }
}

/// Result of [`parse_template`]: the ordered elements plus the extracted
/// control bindings.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ParsedTemplate {
    /// Elements in template order.
    pub elements: Vec<ElementDescriptor>,
    /// Channel → element → property bindings.
    pub controls: ControlMap,
}

impl ParsedTemplate {
    /// The cleaned template: annotations stripped, every element named,
    /// original element and assignment order preserved. This string is
    /// what gets handed to the engine's graph builder.
    pub fn cleaned(&self) -> String {
        let chunks: Vec<String> = self.elements.iter().map(ElementDescriptor::render).collect();
        chunks.join(" ! ")
    }
}

/// Split an assignment token into key, optional channel, optional value.
///
/// `xpos[X]=0` → (`xpos`, `X`, `0`). An empty value (`text=`) degrades to
/// a bare key.
fn split_token(token: &str) -> (&str, Option<&str>, Option<&str>) {
    let (key_raw, value) = match token.split_once('=') {
        Some((k, v)) => (k, Some(v)),
        None => (token, None),
    };
    let (key, channel) = match key_raw.split_once('[') {
        Some((k, c)) => (k, Some(c.trim_end_matches(']'))),
        None => (key_raw, None),
    };
    (key, channel.filter(|c| !c.is_empty()), value.filter(|v| !v.is_empty()))
}

/// The explicit `name=` value of a chunk, if any. Last one wins.
fn explicit_name(chunk: &str) -> Option<&str> {
    let mut name = None;
    for token in chunk.split_whitespace().skip(1) {
        let (key, _, value) = split_token(token);
        if key == "name"
            && let Some(value) = value
        {
            name = Some(value);
        }
    }
    name
}

/// Parse a macro-expanded template into elements and control bindings.
///
/// Elements without an explicit `name=` get a synthesized `type_N` name,
/// N the smallest non-negative integer that does not collide with any
/// other name in the template — explicit names are collected in a
/// pre-pass so a later `name=` can never clash with an earlier synthesized
/// one.
///
/// # Errors
///
/// [`TemplateError::Empty`] if the input holds no elements at all, and
/// [`TemplateError::EmptyElement`] if a chunk between separators is blank
/// — both malformed input the caller must not hand to the engine.
pub fn parse_template(input: &str) -> Result<ParsedTemplate, TemplateError> {
    if input.trim().is_empty() {
        return Err(TemplateError::Empty);
    }

    let chunks: Vec<&str> = input.split('!').map(str::trim).collect();

    let mut used: HashSet<String> = chunks
        .iter()
        .filter_map(|chunk| explicit_name(chunk))
        .map(str::to_string)
        .collect();

    let mut elements = Vec::with_capacity(chunks.len());
    let mut controls = ControlMap::new();

    for (index, chunk) in chunks.iter().enumerate() {
        let mut tokens = chunk.split_whitespace();
        let Some(type_name) = tokens.next() else {
            return Err(TemplateError::EmptyElement { index });
        };

        let mut assignments = Vec::new();
        let mut annotations: Vec<(String, String)> = Vec::new();
        let mut name: Option<String> = None;

        for token in tokens {
            let (key, channel, value) = split_token(token);
            if key == "name" {
                // An element name, never a control annotation — even when
                // someone writes name[CHAN]=x.
                if let Some(value) = value {
                    name = Some(value.to_string());
                }
            } else if let Some(channel) = channel {
                annotations.push((key.to_string(), channel.to_string()));
            }
            assignments.push((key.to_string(), value.map(str::to_string)));
        }

        let name = match name {
            Some(name) => name,
            None => {
                let mut idx = 0usize;
                let mut candidate = format!("{type_name}_{idx}");
                while used.contains(&candidate) {
                    idx += 1;
                    candidate = format!("{type_name}_{idx}");
                }
                used.insert(candidate.clone());
                assignments.push(("name".to_string(), Some(candidate.clone())));
                candidate
            }
        };

        for (property, channel) in annotations {
            controls.bind(&channel, &name, &property);
        }

        elements.push(ElementDescriptor {
            type_name: type_name.to_string(),
            name,
            assignments,
        });
    }

    tracing::debug!(
        elements = elements.len(),
        channels = controls.len(),
        "parsed template"
    );
    Ok(ParsedTemplate { elements, controls })
}

#[cfg(test)]
mod tests {
    use super::*;

    // --- cleaning and naming ---

    #[test]
    fn annotation_is_stripped_and_name_synthesized() {
        let parsed = parse_template("src ! overlay xpos[X]=0 ! sink").unwrap();
        assert_eq!(
            parsed.cleaned(),
            "src name=src_0 ! overlay xpos=0 name=overlay_0 ! sink name=sink_0"
        );
        let x = parsed.controls.channel("X").unwrap();
        assert_eq!(x.element("overlay_0").unwrap().properties, vec!["xpos"]);
    }

    #[test]
    fn explicit_name_is_kept_in_place() {
        let parsed = parse_template("overlay name=title text=hi").unwrap();
        assert_eq!(parsed.cleaned(), "overlay name=title text=hi");
        assert_eq!(parsed.elements[0].name, "title");
    }

    #[test]
    fn synthesized_names_count_per_type() {
        let parsed = parse_template("overlay ! filter ! overlay").unwrap();
        let names: Vec<_> = parsed.elements.iter().map(|e| e.name.as_str()).collect();
        assert_eq!(names, vec!["overlay_0", "filter_0", "overlay_1"]);
    }

    #[test]
    fn synthesized_name_avoids_later_explicit_name() {
        let parsed = parse_template("overlay ! overlay name=overlay_0").unwrap();
        assert_eq!(parsed.elements[0].name, "overlay_1");
        assert_eq!(parsed.elements[1].name, "overlay_0");

        let names: HashSet<_> = parsed.elements.iter().map(|e| &e.name).collect();
        assert_eq!(names.len(), parsed.elements.len());
    }

    #[test]
    fn element_with_no_properties_still_gets_a_name() {
        let parsed = parse_template("src").unwrap();
        assert_eq!(parsed.cleaned(), "src name=src_0");
    }

    #[test]
    fn order_is_preserved_exactly() {
        let parsed = parse_template("mix b=2 a=1 ! src").unwrap();
        assert_eq!(parsed.cleaned(), "mix b=2 a=1 name=mix_0 ! src name=src_0");
    }

    // --- annotations ---

    #[test]
    fn multiple_properties_per_channel_accumulate() {
        let parsed = parse_template("overlay xpos[POS]=0 ypos[POS]=0").unwrap();
        let pos = parsed.controls.channel("POS").unwrap();
        assert_eq!(
            pos.element("overlay_0").unwrap().properties,
            vec!["xpos", "ypos"]
        );
    }

    #[test]
    fn same_channel_across_elements() {
        let parsed = parse_template("overlay xpos[X]=0 ! overlay xpos[X]=5").unwrap();
        let x = parsed.controls.channel("X").unwrap();
        assert_eq!(x.elements.len(), 2);
        assert!(x.element("overlay_0").is_some());
        assert!(x.element("overlay_1").is_some());
    }

    #[test]
    fn pad_paths_pass_through_to_the_map() {
        let parsed = parse_template("mixer sink_1::alpha[FADE]=1.0").unwrap();
        let fade = parsed.controls.channel("FADE").unwrap();
        assert_eq!(
            fade.element("mixer_0").unwrap().properties,
            vec!["sink_1::alpha"]
        );
        assert_eq!(parsed.cleaned(), "mixer sink_1::alpha=1.0 name=mixer_0");
    }

    #[test]
    fn bracketed_name_is_not_an_annotation() {
        let parsed = parse_template("overlay name[X]=ov xpos=1").unwrap();
        assert_eq!(parsed.elements[0].name, "ov");
        assert!(parsed.controls.channel("X").is_none());
    }

    #[test]
    fn bare_keys_survive_cleaning() {
        let parsed = parse_template("demux async").unwrap();
        assert_eq!(parsed.cleaned(), "demux async name=demux_0");
    }

    #[test]
    fn empty_bracket_strips_without_binding() {
        let parsed = parse_template("overlay xpos[]=3").unwrap();
        assert_eq!(parsed.cleaned(), "overlay xpos=3 name=overlay_0");
        assert!(parsed.controls.is_empty());
    }

    // --- errors ---

    #[test]
    fn empty_template_is_an_error() {
        assert!(matches!(parse_template(""), Err(TemplateError::Empty)));
        assert!(matches!(parse_template("  \n "), Err(TemplateError::Empty)));
    }

    #[test]
    fn blank_chunk_is_an_error() {
        let err = parse_template("src ! ! sink").unwrap_err();
        assert!(matches!(err, TemplateError::EmptyElement { index: 1 }));
        assert!(matches!(
            parse_template("src !"),
            Err(TemplateError::EmptyElement { index: 1 })
        ));
    }

    // --- idempotence ---

    #[test]
    fn reparsing_cleaned_output_is_stable() {
        let first = parse_template("src ! overlay xpos[X]=0 ypos[Y]=2 ! volume gain[G]=1 ! sink")
            .unwrap();
        let second = parse_template(&first.cleaned()).unwrap();
        assert_eq!(second.cleaned(), first.cleaned());

        let first_names: Vec<_> = first.elements.iter().map(|e| &e.name).collect();
        let second_names: Vec<_> = second.elements.iter().map(|e| &e.name).collect();
        assert_eq!(first_names, second_names);
        // The annotations were stripped, so the second pass binds nothing.
        assert!(second.controls.is_empty());
    }
}
