//! Channel → element → property bindings extracted from a template.

/// Properties of one element listening on a channel.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ElementBindings {
    /// Resolved element name.
    pub element: String,
    /// Property paths (`prop` or `pad::prop`), in annotation order.
    pub properties: Vec<String>,
}

/// All bindings of one control channel.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ChannelBindings {
    /// Channel name as written in the annotation.
    pub channel: String,
    /// Per-element property lists, in first-appearance order.
    pub elements: Vec<ElementBindings>,
}

impl ChannelBindings {
    /// Bindings for one element on this channel.
    pub fn element(&self, name: &str) -> Option<&ElementBindings> {
        self.elements.iter().find(|e| e.element == name)
    }
}

/// Mapping from channel name to the (element, property) targets bound to
/// it.
///
/// Backed by vectors rather than hash maps: iteration order is the order
/// channels and elements first appeared in the template, which keeps
/// registry classification and event logs deterministic.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ControlMap {
    channels: Vec<ChannelBindings>,
}

impl ControlMap {
    /// An empty map.
    pub fn new() -> Self {
        Self::default()
    }

    /// Append a binding. Repeated calls for the same channel/element
    /// accumulate properties in call order.
    pub fn bind(&mut self, channel: &str, element: &str, property: &str) {
        let bindings = match self.channels.iter_mut().find(|c| c.channel == channel) {
            Some(c) => c,
            None => {
                self.channels.push(ChannelBindings {
                    channel: channel.to_string(),
                    elements: Vec::new(),
                });
                self.channels.last_mut().unwrap()
            }
        };
        let element_bindings = match bindings.elements.iter_mut().find(|e| e.element == element) {
            Some(e) => e,
            None => {
                bindings.elements.push(ElementBindings {
                    element: element.to_string(),
                    properties: Vec::new(),
                });
                bindings.elements.last_mut().unwrap()
            }
        };
        element_bindings.properties.push(property.to_string());
    }

    /// All channels, in first-appearance order.
    pub fn channels(&self) -> impl Iterator<Item = &ChannelBindings> {
        self.channels.iter()
    }

    /// Bindings of one channel.
    pub fn channel(&self, name: &str) -> Option<&ChannelBindings> {
        self.channels.iter().find(|c| c.channel == name)
    }

    /// Number of channels.
    pub fn len(&self) -> usize {
        self.channels.len()
    }

    /// Whether no channel is bound.
    pub fn is_empty(&self) -> bool {
        self.channels.is_empty()
    }

    /// Fold another map into this one, appending bindings in the other
    /// map's order.
    pub fn merge(&mut self, other: &ControlMap) {
        for channel in other.channels() {
            for element in &channel.elements {
                for property in &element.properties {
                    self.bind(&channel.channel, &element.element, property);
                }
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn bind_accumulates_in_order() {
        let mut map = ControlMap::new();
        map.bind("X", "overlay_0", "xpos");
        map.bind("X", "overlay_0", "ypos");
        map.bind("Y", "overlay_0", "ypos");
        map.bind("X", "overlay_1", "xpos");

        let x = map.channel("X").unwrap();
        assert_eq!(x.elements.len(), 2);
        assert_eq!(x.elements[0].properties, vec!["xpos", "ypos"]);
        assert_eq!(x.elements[1].element, "overlay_1");

        let order: Vec<_> = map.channels().map(|c| c.channel.as_str()).collect();
        assert_eq!(order, vec!["X", "Y"]);
    }

    #[test]
    fn merge_appends() {
        let mut a = ControlMap::new();
        a.bind("X", "e", "p");
        let mut b = ControlMap::new();
        b.bind("X", "e", "q");
        b.bind("Z", "f", "r");

        a.merge(&b);
        assert_eq!(a.channel("X").unwrap().elements[0].properties, vec!["p", "q"]);
        assert!(a.channel("Z").is_some());
    }
}
