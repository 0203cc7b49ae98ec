//! Bus-event dispatch.
//!
//! The engine's cooperative loop feeds every bus message through
//! [`EventRouter::dispatch`]. Dispatch is keyed on message kind; the
//! handler table is updated cumulatively — a merge replaces only the
//! kinds it names — and an explicit reset restores the single built-in
//! End-Of-Stream handler (which tears the graph down to
//! [`GraphState::Null`]).
//!
//! Element-kind messages additionally drive the field table: every
//! registered `(field, handler)` pair whose field is present in the
//! message structure fires, in registration order. Several field handlers
//! may fire for one message.

use std::collections::HashMap;

use aircast_core::{BusMessage, GraphState, MediaGraph, MessageKind, PropertyValue};

/// Handler for one message kind.
///
/// Receives the live graph and the message. The return value steers the
/// engine's watch: `Some(false)` removes it, anything else continues —
/// "no explicit answer" is a continue, so simple handlers just return
/// `None`.
pub type MessageHandler = Box<dyn FnMut(&mut dyn MediaGraph, &BusMessage) -> Option<bool>>;

/// Handler for one structured field: `(graph, value, field_key)`.
pub type FieldHandler = Box<dyn FnMut(&mut dyn MediaGraph, &PropertyValue, &str)>;

/// Cumulative update to the kind-handler table.
pub enum HandlerUpdate {
    /// Replace the handlers for exactly these kinds; others untouched.
    Merge(HashMap<MessageKind, MessageHandler>),
    /// Restore the table to only the built-in End-Of-Stream handler.
    Reset,
}

/// Cumulative update to the field-handler table.
pub enum FieldHandlerUpdate {
    /// Add or replace handlers for these fields; others untouched.
    Merge(Vec<(String, FieldHandler)>),
    /// Drop all field handlers.
    Reset,
}

/// The built-in End-Of-Stream reaction: tear the graph down.
fn built_in_eos(graph: &mut dyn MediaGraph, _msg: &BusMessage) -> Option<bool> {
    tracing::info!("end of stream, tearing graph down");
    graph.set_state(GraphState::Null);
    None
}

/// Dispatches bus messages to registered handlers.
pub struct EventRouter {
    handlers: HashMap<MessageKind, MessageHandler>,
    field_handlers: Vec<(String, FieldHandler)>,
    fallback: MessageHandler,
}

impl Default for EventRouter {
    fn default() -> Self {
        Self::new()
    }
}

impl EventRouter {
    /// A router with the built-in EOS handler and a no-op fallback.
    pub fn new() -> Self {
        let mut router = EventRouter {
            handlers: HashMap::new(),
            field_handlers: Vec::new(),
            fallback: Box::new(|_, _| None),
        };
        router.register_handlers(HandlerUpdate::Reset);
        router
    }

    /// Merge new kind handlers into the table, or reset it.
    pub fn register_handlers(&mut self, update: HandlerUpdate) {
        match update {
            HandlerUpdate::Merge(map) => {
                for (kind, handler) in map {
                    self.handlers.insert(kind, handler);
                }
            }
            HandlerUpdate::Reset => {
                self.handlers.clear();
                self.handlers.insert(MessageKind::Eos, Box::new(built_in_eos));
            }
        }
    }

    /// Merge new field handlers into the table, or reset it.
    ///
    /// A merged handler for an already-registered field replaces it in
    /// place, keeping its original firing position.
    pub fn register_field_handlers(&mut self, update: FieldHandlerUpdate) {
        match update {
            FieldHandlerUpdate::Merge(entries) => {
                for (key, handler) in entries {
                    match self.field_handlers.iter_mut().find(|(k, _)| *k == key) {
                        Some(slot) => slot.1 = handler,
                        None => self.field_handlers.push((key, handler)),
                    }
                }
            }
            FieldHandlerUpdate::Reset => self.field_handlers.clear(),
        }
    }

    /// Override the catch-all for kinds with no registered handler.
    pub fn set_fallback(&mut self, fallback: MessageHandler) {
        self.fallback = fallback;
    }

    /// Dispatch one message. Returns whether the engine's watch should
    /// stay installed.
    pub fn dispatch(&mut self, graph: &mut dyn MediaGraph, msg: &BusMessage) -> bool {
        let verdict = match self.handlers.get_mut(&msg.kind) {
            Some(handler) => handler(graph, msg),
            None => (self.fallback)(graph, msg),
        };

        if msg.kind == MessageKind::Element {
            self.dispatch_fields(graph, msg);
        }

        verdict.unwrap_or(true)
    }

    fn dispatch_fields(&mut self, graph: &mut dyn MediaGraph, msg: &BusMessage) {
        let Some(structure) = &msg.structure else {
            return;
        };
        for (key, handler) in &mut self.field_handlers {
            if let Some(value) = structure.field(key) {
                handler(graph, value, key);
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use aircast_core::MediaEngine;
    use aircast_core::offline::{ElementSpec, OfflineEngine, OfflineGraph};
    use aircast_core::{MessageStructure, TargetPath};
    use std::cell::RefCell;
    use std::rc::Rc;

    fn graph() -> OfflineGraph {
        OfflineEngine::new()
            .with_element(ElementSpec::new("src").with_property("seen", 0i64))
            .build_graph("src name=src_0")
            .unwrap()
    }

    #[test]
    fn built_in_eos_tears_down() {
        let mut g = graph();
        g.set_state(GraphState::Playing);
        let mut router = EventRouter::new();

        let keep = router.dispatch(&mut g, &BusMessage::new(MessageKind::Eos, "src_0"));
        assert!(keep);
        assert_eq!(g.state(), GraphState::Null);
    }

    #[test]
    fn merge_replaces_only_named_kinds() {
        let mut g = graph();
        g.set_state(GraphState::Playing);
        let mut router = EventRouter::new();

        let errors = Rc::new(RefCell::new(0));
        let seen = errors.clone();
        router.register_handlers(HandlerUpdate::Merge(HashMap::from([(
            MessageKind::Error,
            Box::new(move |_: &mut dyn MediaGraph, _: &BusMessage| {
                *seen.borrow_mut() += 1;
                None
            }) as MessageHandler,
        )])));

        router.dispatch(&mut g, &BusMessage::new(MessageKind::Error, "src_0"));
        assert_eq!(*errors.borrow(), 1);

        // The built-in EOS handler is still in place.
        router.dispatch(&mut g, &BusMessage::new(MessageKind::Eos, "src_0"));
        assert_eq!(g.state(), GraphState::Null);
    }

    #[test]
    fn reset_restores_only_the_builtin() {
        let mut g = graph();
        let mut router = EventRouter::new();

        let hits = Rc::new(RefCell::new(0));
        let seen = hits.clone();
        router.register_handlers(HandlerUpdate::Merge(HashMap::from([(
            MessageKind::Warning,
            Box::new(move |_: &mut dyn MediaGraph, _: &BusMessage| {
                *seen.borrow_mut() += 1;
                None
            }) as MessageHandler,
        )])));
        router.register_handlers(HandlerUpdate::Reset);

        router.dispatch(&mut g, &BusMessage::new(MessageKind::Warning, "src_0"));
        assert_eq!(*hits.borrow(), 0);

        g.set_state(GraphState::Playing);
        router.dispatch(&mut g, &BusMessage::new(MessageKind::Eos, "src_0"));
        assert_eq!(g.state(), GraphState::Null);
    }

    #[test]
    fn handler_verdict_controls_the_watch() {
        let mut g = graph();
        let mut router = EventRouter::new();
        router.register_handlers(HandlerUpdate::Merge(HashMap::from([(
            MessageKind::Error,
            Box::new(|_: &mut dyn MediaGraph, _: &BusMessage| Some(false)) as MessageHandler,
        )])));

        assert!(!router.dispatch(&mut g, &BusMessage::new(MessageKind::Error, "src_0")));
        // No explicit answer means continue.
        assert!(router.dispatch(&mut g, &BusMessage::new(MessageKind::StateChanged, "src_0")));
    }

    #[test]
    fn fallback_catches_unhandled_kinds() {
        let mut g = graph();
        let mut router = EventRouter::new();

        let caught = Rc::new(RefCell::new(Vec::new()));
        let seen = caught.clone();
        router.set_fallback(Box::new(move |_, msg| {
            seen.borrow_mut().push(msg.kind);
            None
        }));

        router.dispatch(&mut g, &BusMessage::new(MessageKind::StateChanged, "src_0"));
        assert_eq!(*caught.borrow(), vec![MessageKind::StateChanged]);
    }

    #[test]
    fn field_handlers_fire_per_present_field() {
        let mut g = graph();
        let mut router = EventRouter::new();

        let seen = Rc::new(RefCell::new(Vec::new()));
        let a = seen.clone();
        let b = seen.clone();
        router.register_field_handlers(FieldHandlerUpdate::Merge(vec![
            (
                "rms".to_string(),
                Box::new(move |_: &mut dyn MediaGraph, v: &PropertyValue, k: &str| {
                    a.borrow_mut().push((k.to_string(), v.clone()));
                }) as FieldHandler,
            ),
            (
                "peak".to_string(),
                Box::new(move |_: &mut dyn MediaGraph, v: &PropertyValue, k: &str| {
                    b.borrow_mut().push((k.to_string(), v.clone()));
                }) as FieldHandler,
            ),
        ]));

        let msg = BusMessage::new(MessageKind::Element, "meter").with_structure(
            MessageStructure::new("level")
                .with_field("rms", -20.0)
                .with_field("decay", -30.0),
        );
        router.dispatch(&mut g, &msg);

        // Only the present field fired; "peak" was absent, "decay" has no
        // handler.
        assert_eq!(
            *seen.borrow(),
            vec![("rms".to_string(), PropertyValue::Float(-20.0))]
        );
    }

    #[test]
    fn field_handlers_may_mutate_the_graph() {
        let mut g = graph();
        let mut router = EventRouter::new();
        router.register_field_handlers(FieldHandlerUpdate::Merge(vec![(
            "count".to_string(),
            Box::new(|graph: &mut dyn MediaGraph, v: &PropertyValue, _: &str| {
                let _ = graph.set_property(&TargetPath::new("src_0", "seen"), v);
            }) as FieldHandler,
        )]));

        let msg = BusMessage::new(MessageKind::Element, "src_0")
            .with_structure(MessageStructure::new("stats").with_field("count", 7i64));
        router.dispatch(&mut g, &msg);
        assert_eq!(
            g.property(&TargetPath::new("src_0", "seen")),
            Some(PropertyValue::Int(7))
        );
    }

    #[test]
    fn field_reset_clears_the_table() {
        let mut g = graph();
        let mut router = EventRouter::new();

        let hits = Rc::new(RefCell::new(0));
        let seen = hits.clone();
        router.register_field_handlers(FieldHandlerUpdate::Merge(vec![(
            "rms".to_string(),
            Box::new(move |_: &mut dyn MediaGraph, _: &PropertyValue, _: &str| {
                *seen.borrow_mut() += 1;
            }) as FieldHandler,
        )]));
        router.register_field_handlers(FieldHandlerUpdate::Reset);

        let msg = BusMessage::new(MessageKind::Element, "meter")
            .with_structure(MessageStructure::new("level").with_field("rms", -20.0));
        router.dispatch(&mut g, &msg);
        assert_eq!(*hits.borrow(), 0);
    }
}
