//! Process-wide command validation table.
//!
//! Every command declaration, whatever handler type it lives on, passes
//! through one [`CommandRegistry`]. The registry rejects conflicting
//! declarations while the process is still initializing: a structurally
//! invalid command table must never run.

use indexmap::map::Entry;
use indexmap::IndexMap;
use tracing::debug;

use super::definitions::{normalize_names, render_descriptions};
use crate::error::RegistrationError;

/// Handler-free view of one declaration: what the registry stores.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CommandMeta {
    /// Distinct trigger names, in declaration order.
    pub aliases: Vec<String>,
    /// Usage line per alias, index-aligned with `aliases`.
    pub descriptions: Vec<String>,
}

/// A registered main name: one command, or the members of one group.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum RegisteredEntry {
    /// A standalone command.
    Command(CommandMeta),
    /// Group members, in declaration order.
    Group(Vec<CommandMeta>),
}

/// Global table from main name to registered entry, in registration order.
#[derive(Debug, Default)]
pub struct CommandRegistry {
    entries: IndexMap<String, RegisteredEntry>,
}

impl CommandRegistry {
    /// Creates an empty registry.
    pub fn new() -> Self {
        Self::default()
    }

    /// Validates one declaration and records it.
    ///
    /// Returns the normalized aliases and rendered usage lines so the caller
    /// can build its typed definition from the same data.
    ///
    /// The conflict rules are deliberately asymmetric and are pinned by the
    /// tests below:
    /// - a standalone declaration fails if its first alias is any existing
    ///   main name, or if any of its aliases is held by an existing
    ///   standalone command (group members are not scanned);
    /// - a grouped declaration fails only against its own group's members,
    ///   or when the group name is an existing standalone command's main
    ///   name.
    pub fn register(
        &mut self,
        aliases: &[&str],
        group: Option<&str>,
        template: Option<&str>,
    ) -> Result<CommandMeta, RegistrationError> {
        let aliases = normalize_names(aliases);
        // An empty group string means "no group".
        let group = group.filter(|g| !g.is_empty());

        match group {
            None => self.register_standalone(aliases, template),
            Some(group) => self.register_grouped(aliases, group, template),
        }
    }

    fn register_standalone(
        &mut self,
        aliases: Vec<String>,
        template: Option<&str>,
    ) -> Result<CommandMeta, RegistrationError> {
        let main = match aliases.first() {
            Some(main) => main.clone(),
            None => return Err(RegistrationError::MissingName),
        };

        if self.entries.contains_key(&main) {
            return Err(RegistrationError::Duplicate(main));
        }

        let clashes: Vec<&str> = aliases
            .iter()
            .filter(|alias| {
                self.entries.values().any(|entry| match entry {
                    RegisteredEntry::Command(meta) => meta.aliases.contains(*alias),
                    RegisteredEntry::Group(_) => false,
                })
            })
            .map(String::as_str)
            .collect();
        if !clashes.is_empty() {
            return Err(RegistrationError::Duplicate(clashes.join(",")));
        }

        let meta = CommandMeta {
            descriptions: render_descriptions(&aliases, None, template),
            aliases,
        };
        debug!(command = %main, aliases = meta.aliases.len(), "registered command");
        self.entries
            .insert(main, RegisteredEntry::Command(meta.clone()));
        Ok(meta)
    }

    fn register_grouped(
        &mut self,
        aliases: Vec<String>,
        group: &str,
        template: Option<&str>,
    ) -> Result<CommandMeta, RegistrationError> {
        if aliases.is_empty() {
            return Err(RegistrationError::EmptyGroup(group.to_string()));
        }

        match self.entries.get(group) {
            Some(RegisteredEntry::Group(members)) => {
                let taken: Vec<&String> =
                    members.iter().flat_map(|m| m.aliases.iter()).collect();
                let clashes: Vec<&str> = aliases
                    .iter()
                    .filter(|alias| taken.contains(alias))
                    .map(String::as_str)
                    .collect();
                if !clashes.is_empty() {
                    return Err(RegistrationError::DuplicateInGroup {
                        aliases: clashes.join(","),
                        group: group.to_string(),
                    });
                }
            }
            Some(RegisteredEntry::Command(_)) => {
                return Err(RegistrationError::GroupShadowsCommand(group.to_string()));
            }
            None => {}
        }

        let meta = CommandMeta {
            descriptions: render_descriptions(&aliases, Some(group), template),
            aliases,
        };
        debug!(group = %group, aliases = meta.aliases.len(), "registered group member");
        match self.entries.entry(group.to_string()) {
            Entry::Occupied(mut slot) => {
                if let RegisteredEntry::Group(members) = slot.get_mut() {
                    members.push(meta.clone());
                }
            }
            Entry::Vacant(slot) => {
                slot.insert(RegisteredEntry::Group(vec![meta.clone()]));
            }
        }
        Ok(meta)
    }

    /// Returns true if a main name is registered.
    pub fn contains(&self, name: &str) -> bool {
        self.entries.contains_key(name)
    }

    /// Iterates entries in registration order.
    pub fn entries(&self) -> impl Iterator<Item = (&str, &RegisteredEntry)> {
        self.entries.iter().map(|(name, entry)| (name.as_str(), entry))
    }

    /// Renders every registered usage line, one per row, in table order.
    pub fn help_text(&self) -> String {
        let mut lines: Vec<&str> = Vec::new();
        for entry in self.entries.values() {
            match entry {
                RegisteredEntry::Command(meta) => {
                    lines.extend(meta.descriptions.iter().map(String::as_str));
                }
                RegisteredEntry::Group(members) => {
                    for member in members {
                        lines.extend(member.descriptions.iter().map(String::as_str));
                    }
                }
            }
        }
        lines.join("\n")
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;

    #[test]
    fn test_register_standalone() {
        let mut registry = CommandRegistry::new();
        let meta = registry.register(&["foo", "f"], None, None).unwrap();
        assert_eq!(meta.aliases, vec!["foo", "f"]);
        assert_eq!(meta.descriptions, vec!["Usage /foo", "Usage /f"]);
        assert!(registry.contains("foo"));
        assert!(!registry.contains("f"));
    }

    #[test]
    fn test_missing_name_rejected() {
        let mut registry = CommandRegistry::new();
        assert!(matches!(
            registry.register(&[], None, None),
            Err(RegistrationError::MissingName)
        ));
        assert!(matches!(
            registry.register(&["", ""], None, None),
            Err(RegistrationError::MissingName)
        ));
    }

    #[test]
    fn test_empty_group_string_means_no_group() {
        let mut registry = CommandRegistry::new();
        assert!(matches!(
            registry.register(&[], Some(""), None),
            Err(RegistrationError::MissingName)
        ));
        let meta = registry.register(&["foo"], Some(""), None).unwrap();
        assert_eq!(meta.descriptions, vec!["Usage /foo"]);
    }

    #[test]
    fn test_grouped_declaration_needs_aliases() {
        let mut registry = CommandRegistry::new();
        assert!(matches!(
            registry.register(&[], Some("admin"), None),
            Err(RegistrationError::EmptyGroup(g)) if g == "admin"
        ));
    }

    #[test]
    fn test_duplicate_main_name_rejected() {
        let mut registry = CommandRegistry::new();
        registry.register(&["foo"], None, None).unwrap();
        assert!(matches!(
            registry.register(&["foo"], None, None),
            Err(RegistrationError::Duplicate(name)) if name == "foo"
        ));
    }

    #[test]
    fn test_intersecting_alias_sets_rejected_either_order() {
        let mut registry = CommandRegistry::new();
        registry.register(&["foo", "f"], None, None).unwrap();
        assert!(matches!(
            registry.register(&["bar", "f"], None, None),
            Err(RegistrationError::Duplicate(name)) if name == "f"
        ));

        let mut registry = CommandRegistry::new();
        registry.register(&["bar", "f"], None, None).unwrap();
        assert!(matches!(
            registry.register(&["foo", "f"], None, None),
            Err(RegistrationError::Duplicate(name)) if name == "f"
        ));
    }

    #[test]
    fn test_duplicate_inside_group_rejected() {
        let mut registry = CommandRegistry::new();
        registry.register(&["kick"], Some("admin"), None).unwrap();
        assert!(matches!(
            registry.register(&["kick", "k"], Some("admin"), None),
            Err(RegistrationError::DuplicateInGroup { aliases, group })
                if aliases == "kick" && group == "admin"
        ));
    }

    #[test]
    fn test_same_alias_in_different_groups_allowed() {
        let mut registry = CommandRegistry::new();
        registry.register(&["kick"], Some("admin"), None).unwrap();
        registry.register(&["kick"], Some("mod"), None).unwrap();
        assert!(registry.contains("admin"));
        assert!(registry.contains("mod"));
    }

    #[test]
    fn test_group_name_taken_by_command_rejected() {
        let mut registry = CommandRegistry::new();
        registry.register(&["admin"], None, None).unwrap();
        assert!(matches!(
            registry.register(&["kick"], Some("admin"), None),
            Err(RegistrationError::GroupShadowsCommand(name)) if name == "admin"
        ));
    }

    #[test]
    fn test_command_main_name_taken_by_group_rejected() {
        let mut registry = CommandRegistry::new();
        registry.register(&["kick"], Some("admin"), None).unwrap();
        assert!(matches!(
            registry.register(&["admin"], None, None),
            Err(RegistrationError::Duplicate(name)) if name == "admin"
        ));
    }

    #[test]
    fn test_secondary_alias_may_shadow_group_name() {
        // The scan deliberately skips group entries: only the first alias is
        // checked against existing main names.
        let mut registry = CommandRegistry::new();
        registry.register(&["kick"], Some("admin"), None).unwrap();
        assert!(registry.register(&["audit", "admin"], None, None).is_ok());
    }

    #[test]
    fn test_group_member_aliases_exempt_from_standalone_scan() {
        let mut registry = CommandRegistry::new();
        registry.register(&["kick"], Some("admin"), None).unwrap();
        // "kick" lives inside a group, so a standalone "kick" under a
        // different main name passes the scan.
        assert!(registry.register(&["boot", "kick"], None, None).is_ok());
    }

    #[test]
    fn test_group_members_accumulate_in_order() {
        let mut registry = CommandRegistry::new();
        registry.register(&["kick"], Some("admin"), None).unwrap();
        registry.register(&["ban", "b"], Some("admin"), None).unwrap();

        let (_, entry) = registry.entries().next().unwrap();
        let RegisteredEntry::Group(members) = entry else {
            panic!("expected a group entry");
        };
        assert_eq!(members.len(), 2);
        assert_eq!(members[0].aliases, vec!["kick"]);
        assert_eq!(members[1].aliases, vec!["ban", "b"]);
    }

    #[test]
    fn test_help_text_lists_descriptions_in_table_order() {
        let mut registry = CommandRegistry::new();
        registry.register(&["foo", "f"], None, None).unwrap();
        registry.register(&["kick"], Some("admin"), None).unwrap();
        registry
            .register(&["ban", "b"], Some("admin"), None)
            .unwrap();

        assert_eq!(
            registry.help_text(),
            "Usage /foo\n\
             Usage /f\n\
             Usage /admin kick\n\
             Usage /admin ban\n\
             Usage /admin b"
        );
    }

    #[test]
    fn test_custom_template_rendered_per_alias() {
        let mut registry = CommandRegistry::new();
        let meta = registry
            .register(
                &["ban", "b"],
                Some("admin"),
                Some("Usage: /{{groupName}} {{cmdName}} <id>"),
            )
            .unwrap();
        assert_eq!(
            meta.descriptions,
            vec!["Usage: /admin ban <id>", "Usage: /admin b <id>"]
        );
    }
}
