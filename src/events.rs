//! Event declarations and the global table of resolved bindings.
//!
//! Events carry no uniqueness rules: any number of declarations may share a
//! primary name, and every one of them fires. The global [`EventRegistry`]
//! is append-only and records bindings in the order types were bound, which
//! is the order adapters deliver them in.

use std::cell::RefCell;
use std::rc::Rc;

use indexmap::IndexMap;
use serde_json::Value;

use crate::adapter::EventHandler;

/// An event method on a handler type. Receives the payload untouched.
pub type EventFn<H> = fn(&mut H, &Value);

/// One event declaration on a handler type.
#[derive(Debug)]
pub struct EventDef<H> {
    /// Distinct event names, in declaration order; `names[0]` is primary.
    pub names: Vec<String>,
    /// Method invoked when any of the names fires.
    pub handler: EventFn<H>,
}

/// Per-type event table: primary name to declarations, in declaration order.
pub type EventTable<H> = IndexMap<String, Vec<EventDef<H>>>;

/// A resolved event binding: the declared names and the shared closure
/// subscribed under each of them.
pub struct EventBinding {
    /// Every name the declaration listens on.
    pub names: Vec<String>,
    /// The instance-bound closure.
    pub handler: EventHandler,
}

/// Global, append-only table of resolved bindings keyed by primary name.
///
/// Populated at binding time: declarations on types that were never bound do
/// not appear here.
#[derive(Default)]
pub struct EventRegistry {
    entries: IndexMap<String, Vec<EventBinding>>,
}

impl EventRegistry {
    /// Creates an empty registry.
    pub fn new() -> Self {
        Self::default()
    }

    /// Appends one resolved binding under its primary name.
    pub(crate) fn append(&mut self, primary: &str, binding: EventBinding) {
        self.entries
            .entry(primary.to_string())
            .or_default()
            .push(binding);
    }

    /// Returns the bindings recorded under a primary name, in append order.
    pub fn bindings(&self, primary: &str) -> &[EventBinding] {
        self.entries.get(primary).map(Vec::as_slice).unwrap_or(&[])
    }

    /// Iterates primary names in first-appearance order.
    pub fn primary_names(&self) -> impl Iterator<Item = &str> {
        self.entries.keys().map(String::as_str)
    }
}

/// Wraps an event method into a closure over the bound instance.
pub(crate) fn resolve<H: 'static>(def: &EventDef<H>, instance: &Rc<RefCell<H>>) -> EventHandler {
    let handler = def.handler;
    let instance = Rc::clone(instance);
    Rc::new(RefCell::new(move |payload: &Value| {
        handler(&mut *instance.borrow_mut(), payload);
    }))
}
