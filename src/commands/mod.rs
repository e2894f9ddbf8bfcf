//! Command declaration, validation and dispatch.
//!
//! This module separates the plain declaration data from the global
//! validation table and from the closures that do the actual routing, so
//! each piece can be tested without a live adapter.

pub mod definitions;
pub mod dispatch;
pub mod registry;

pub use definitions::{
    CommandDef, CommandEntry, CommandFn, CommandOptions, CommandTable, ALIAS_PLACEHOLDER,
    GROUP_PLACEHOLDER,
};
pub use dispatch::split_line;
pub use registry::{CommandMeta, CommandRegistry, RegisteredEntry};
