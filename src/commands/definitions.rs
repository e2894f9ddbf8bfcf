//! Declarative command metadata.
//!
//! A [`CommandDef`] is plain data describing one declaration: the aliases
//! that trigger it, the usage line rendered for each alias, the optional
//! group it belongs to, and the typed handler invoked when it matches.
//! Normalization and usage-text rendering live here so the registry and the
//! per-type tables agree on both.

use indexmap::IndexMap;

use crate::adapter::Caller;

/// Placeholder substituted with the triggering alias in description templates.
pub const ALIAS_PLACEHOLDER: &str = "{{cmdName}}";

/// Placeholder substituted with the group name in description templates.
pub const GROUP_PLACEHOLDER: &str = "{{groupName}}";

/// A command method on a handler type.
///
/// Receives the caller, the usage line for the alias that was invoked, and
/// the whitespace-split arguments. All arguments are strings; coercion is a
/// handler concern.
pub type CommandFn<H> = fn(&mut H, &Caller, &str, &[String]);

/// One command declaration on a handler type.
#[derive(Debug)]
pub struct CommandDef<H> {
    /// Distinct trigger names, in declaration order.
    pub aliases: Vec<String>,
    /// Usage line per alias, index-aligned with `aliases`.
    pub descriptions: Vec<String>,
    /// Group this definition belongs to, if any.
    pub group: Option<String>,
    /// Method invoked when an alias matches.
    pub handler: CommandFn<H>,
}

/// A main-name table slot: a standalone command or a group of subcommands.
#[derive(Debug)]
pub enum CommandEntry<H> {
    /// A standalone command, dispatched by any of its aliases.
    Single(CommandDef<H>),
    /// Members sharing one top-level name, dispatched by a second token.
    Group(Vec<CommandDef<H>>),
}

/// Per-type command table, keyed by main name in declaration order.
pub type CommandTable<H> = IndexMap<String, CommandEntry<H>>;

/// Optional declaration parameters: a group name and/or a description
/// template.
///
/// A bare `&str` converts to a group-only options value, mirroring the
/// shorthand the declaration surface supports for grouped commands.
#[derive(Debug, Clone, Default)]
pub struct CommandOptions {
    pub(crate) group: Option<String>,
    pub(crate) description: Option<String>,
}

impl CommandOptions {
    /// Creates empty options: standalone command, default usage text.
    pub fn new() -> Self {
        Self::default()
    }

    /// Places the command in the named group.
    pub fn group(mut self, name: impl Into<String>) -> Self {
        self.group = Some(name.into());
        self
    }

    /// Sets a description template.
    ///
    /// The first `{{cmdName}}` is replaced with the triggering alias and,
    /// for grouped commands, the first `{{groupName}}` with the group name.
    pub fn description(mut self, template: impl Into<String>) -> Self {
        self.description = Some(template.into());
        self
    }
}

impl From<&str> for CommandOptions {
    fn from(group: &str) -> Self {
        Self::new().group(group)
    }
}

/// Normalizes an alias list: keeps first occurrences, drops duplicates and
/// empty strings.
pub(crate) fn normalize_names(names: &[&str]) -> Vec<String> {
    let mut out: Vec<String> = Vec::with_capacity(names.len());
    for name in names {
        if !name.is_empty() && !out.iter().any(|n| n == name) {
            out.push((*name).to_string());
        }
    }
    out
}

/// Renders one usage line per alias.
///
/// With a template, substitutes the first occurrence of each placeholder;
/// `{{groupName}}` is only substituted when a group is present. Without a
/// template, falls back to `Usage /<alias>` or `Usage /<group> <alias>`.
pub(crate) fn render_descriptions(
    aliases: &[String],
    group: Option<&str>,
    template: Option<&str>,
) -> Vec<String> {
    aliases
        .iter()
        .map(|alias| match template {
            Some(template) => {
                let rendered = template.replacen(ALIAS_PLACEHOLDER, alias, 1);
                match group {
                    Some(group) => rendered.replacen(GROUP_PLACEHOLDER, group, 1),
                    None => rendered,
                }
            }
            None => match group {
                Some(group) => format!("Usage /{group} {alias}"),
                None => format!("Usage /{alias}"),
            },
        })
        .collect()
}
