//! Crier - a declarative command and event wiring engine for chat-style hosts.
//!
//! Handler types declare the text commands (optionally grouped into
//! subcommands) and named events they respond to; declarations are validated
//! globally at startup, and the first bound instance of each type is wired
//! into live closures subscribed with the host's [`adapter`]. The library
//! exposes the core modules for use by hosts and integration tests.

pub mod adapter;
pub mod commands;
pub mod config;
pub mod error;
pub mod events;
pub mod hub;
pub mod logging;

pub use adapter::{Caller, ChatOutput, CommandHandler, EventHandler, SubscriptionAdapter};
pub use error::{BindingError, ConfigError, RegistrationError};
pub use hub::{CommandDecls, EventDecls, Hub, Registrant};
