//! Collaborator traits between the wiring engine and its host.
//!
//! The engine never owns a transport. During binding it hands ready-made
//! closures to a [`SubscriptionAdapter`], and the adapter guarantees it will
//! invoke them whenever a matching line or event arrives. The only outbound
//! surface is [`ChatOutput`], used by the group help fallback.

use std::cell::RefCell;
use std::rc::Rc;

use serde_json::Value;

/// The session that triggered a command, and the recipient of any reply text.
///
/// Hosts construct one per connected user (or a single one for a console).
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Caller {
    /// Host-assigned session id.
    pub id: u64,
    /// Display name used when replying.
    pub name: String,
}

impl Caller {
    /// Creates a caller with the given id and display name.
    pub fn new(id: u64, name: impl Into<String>) -> Self {
        Self {
            id,
            name: name.into(),
        }
    }
}

/// A live command binding: invoked with the caller and the already-tokenized
/// arguments (the command name itself is not included).
pub type CommandHandler = Box<dyn FnMut(&Caller, &[String])>;

/// A live event binding, invoked with whatever payload the host delivers.
///
/// Shared (`Rc`) so a single resolved callable can be subscribed under every
/// name an event declaration carries.
pub type EventHandler = Rc<RefCell<dyn FnMut(&Value)>>;

/// Host-side subscription primitives.
///
/// Implementations own the actual transport: a chat server's native command
/// hook, an event bus, or the console loop in this crate's binary. For
/// events, the adapter must invoke every handler subscribed under a name in
/// subscription order.
pub trait SubscriptionAdapter {
    /// Registers a handler for one top-level command name.
    fn subscribe_command(&mut self, name: &str, handler: CommandHandler);

    /// Registers a handler for one event name.
    fn subscribe_event(&mut self, name: &str, handler: EventHandler);
}

/// Outbound text channel used by the group help fallback.
pub trait ChatOutput {
    /// Sends one line of text to the given caller.
    fn send_text(&mut self, to: &Caller, text: &str);
}
