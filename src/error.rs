//! Error types for Crier.
//!
//! Declaration and binding problems are programmer errors detected during
//! startup; they must reach the caller's initialization code rather than be
//! swallowed, so every registration path returns a `Result` with one of the
//! enums below.

use std::path::PathBuf;
use thiserror::Error;

/// Errors raised while declaring commands and events.
#[derive(Error, Debug)]
pub enum RegistrationError {
    /// A command declaration carried neither aliases nor a group name.
    #[error("command declaration has no aliases and no group")]
    MissingName,

    /// A grouped declaration must still carry at least one subcommand alias.
    #[error("group \"{0}\" declaration has no aliases")]
    EmptyGroup(String),

    /// An alias (or main name) is already taken by another command.
    #[error("duplicate command \"{0}\"")]
    Duplicate(String),

    /// An alias is already taken by another member of the same group.
    #[error("duplicate commands \"{aliases}\" in group \"{group}\"")]
    DuplicateInGroup {
        /// Comma-joined list of the clashing aliases.
        aliases: String,
        /// The group both declarations target.
        group: String,
    },

    /// A group was declared under a name an existing plain command owns.
    #[error("group \"{0}\" name is taken by an existing command")]
    GroupShadowsCommand(String),

    /// An event declaration carried no names.
    #[error("event declaration has no names")]
    MissingEventName,

    /// `Hub::declare` was called twice for the same handler type.
    #[error("handler type \"{0}\" declared twice")]
    Redeclared(&'static str),
}

/// Errors raised while binding the first instance of a handler type.
#[derive(Error, Debug)]
pub enum BindingError {
    /// The type was never declared, so there is nothing to wire.
    #[error("handler type \"{0}\" was never declared")]
    Undeclared(&'static str),
}

/// Errors raised while loading the host configuration file.
#[derive(Error, Debug)]
pub enum ConfigError {
    /// The config file exists but could not be read.
    #[error("failed to read config file {}: {source}", path.display())]
    Read {
        /// Path that was being read.
        path: PathBuf,
        /// Underlying I/O error.
        source: std::io::Error,
    },

    /// The config file is not valid TOML for the expected schema.
    #[error("configuration error in {}:\n  {message}", path.display())]
    Parse {
        /// Path that was being parsed.
        path: PathBuf,
        /// Parser diagnostic.
        message: String,
    },
}
