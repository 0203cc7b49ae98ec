//! Bus messages delivered from the engine to the control plane.
//!
//! The engine's cooperative loop hands each message to the event router.
//! A message has a kind, a source element, and — for element-originated
//! messages — a structured payload of named fields.

use crate::value::PropertyValue;

/// Kind of a bus message. Dispatch is keyed on this.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum MessageKind {
    /// End of stream reached.
    Eos,
    /// An element reported an error.
    Error,
    /// An element reported a warning.
    Warning,
    /// A state transition completed.
    StateChanged,
    /// Element-specific structured message (level meters, QoS, custom
    /// plugins). Field handlers fire on these.
    Element,
}

/// Structured payload of an [`MessageKind::Element`] message: a name plus
/// ordered named fields.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct MessageStructure {
    name: String,
    fields: Vec<(String, PropertyValue)>,
}

impl MessageStructure {
    /// Create an empty structure.
    pub fn new(name: impl Into<String>) -> Self {
        MessageStructure {
            name: name.into(),
            fields: Vec::new(),
        }
    }

    /// Structure name.
    pub fn name(&self) -> &str {
        &self.name
    }

    /// Append a field (builder style).
    pub fn with_field(mut self, key: impl Into<String>, value: impl Into<PropertyValue>) -> Self {
        self.fields.push((key.into(), value.into()));
        self
    }

    /// Whether a field of this name is present.
    pub fn has_field(&self, key: &str) -> bool {
        self.fields.iter().any(|(k, _)| k == key)
    }

    /// Value of a field, if present.
    pub fn field(&self, key: &str) -> Option<&PropertyValue> {
        self.fields.iter().find(|(k, _)| k == key).map(|(_, v)| v)
    }
}

/// One message from the engine bus.
#[derive(Debug, Clone, PartialEq)]
pub struct BusMessage {
    /// Message kind; dispatch key.
    pub kind: MessageKind,
    /// Name of the element the message originated from.
    pub source: String,
    /// Structured payload, present on element messages.
    pub structure: Option<MessageStructure>,
}

impl BusMessage {
    /// A message with no structured payload.
    pub fn new(kind: MessageKind, source: impl Into<String>) -> Self {
        BusMessage {
            kind,
            source: source.into(),
            structure: None,
        }
    }

    /// Attach a structured payload (builder style).
    pub fn with_structure(mut self, structure: MessageStructure) -> Self {
        self.structure = Some(structure);
        self
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn structure_field_lookup() {
        let s = MessageStructure::new("level")
            .with_field("rms", -20.0)
            .with_field("peak", -6.0);
        assert!(s.has_field("rms"));
        assert!(!s.has_field("decay"));
        assert_eq!(s.field("peak"), Some(&PropertyValue::Float(-6.0)));
    }

    #[test]
    fn message_builder() {
        let msg = BusMessage::new(MessageKind::Element, "meter")
            .with_structure(MessageStructure::new("level").with_field("rms", -20.0));
        assert_eq!(msg.kind, MessageKind::Element);
        assert_eq!(msg.source, "meter");
        assert!(msg.structure.is_some());
    }
}
